//! Process-wide error type.
//!
//! Exit-code conventions:
//!
//! - 2: configuration / filesystem problems (bad flags, missing env, unwritable paths)
//! - 3: data validation failures (label cardinality, empty inputs, shape mismatches)
//! - 4: external services (dataset fetch, translation, remote model endpoint)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Configuration or filesystem error (exit code 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Data validation error (exit code 3).
    pub fn data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// External service error (exit code 4).
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
