//! Single-route web form for interactive classification.
//!
//! `GET /` renders the form; `POST /` cleans the submitted sentence the same
//! way the training loader does, runs it through the loaded artifact pair, and
//! answers with the predicted label as plain text.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use tracing::debug;

use crate::data::clean_sentence;
use crate::serve::AppState;

const FORM_HTML: &str = r#"<!doctype html>
<html>
  <head><title>finsent</title></head>
  <body>
    <h1>Financial news sentiment</h1>
    <form method="post" action="/">
      <input type="text" name="sentence" size="80"
             placeholder="Paste a financial news sentence" required>
      <button type="submit">Classify</button>
    </form>
  </body>
</html>
"#;

/// `GET /` — render the input form.
pub async fn render() -> Html<&'static str> {
    Html(FORM_HTML)
}

#[derive(Debug, Deserialize)]
pub struct ClassifyForm {
    pub sentence: String,
}

/// `POST /` — classify the submitted sentence.
pub async fn classify(State(state): State<Arc<AppState>>, Form(form): Form<ClassifyForm>) -> String {
    let cleaned = clean_sentence(&form.sentence);
    let row = state.artifacts.feature_space.vectorize(&cleaned);
    let label = state.artifacts.model.predict(&row);
    debug!(sentence = %cleaned, label = label.display_name(), "form classification");
    label.display_name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Label;
    use crate::features::FeatureSpace;
    use crate::io::ArtifactPair;
    use crate::models::{SentimentModel, DEFAULT_ALPHA};
    use crate::serve::RegressionConfig;
    use axum::extract::State;
    use uuid::Uuid;

    fn test_state() -> Arc<AppState> {
        let texts = vec![
            "profit rose sharply beating estimates".to_string(),
            "profit fell sharply missing estimates".to_string(),
            "company operates in helsinki finland".to_string(),
        ];
        let labels = vec![Label::Positive, Label::Negative, Label::Neutral];
        let feature_space = FeatureSpace::fit(&texts).unwrap();
        let rows = feature_space.transform(&texts);
        let model =
            SentimentModel::fit(&rows, &labels, feature_space.vocab_len(), DEFAULT_ALPHA).unwrap();

        Arc::new(AppState {
            regression: RegressionConfig {
                beta: 2.0,
                intercept: 1.0,
            },
            remote: None,
            artifacts: ArtifactPair {
                run_id: Uuid::new_v4(),
                feature_space,
                model,
            },
            http: reqwest::Client::new(),
        })
    }

    #[tokio::test]
    async fn form_input_is_cleaned_before_prediction() {
        let state = test_state();
        // Mixed case and punctuation must not affect the prediction.
        let label = classify(
            State(state),
            Form(ClassifyForm {
                sentence: "Profit ROSE sharply, beating estimates!".to_string(),
            }),
        )
        .await;
        assert_eq!(label, "positive");
    }

    #[tokio::test]
    async fn get_renders_the_form() {
        let Html(page) = render().await;
        assert!(page.contains("name=\"sentence\""));
        assert!(page.contains("method=\"post\""));
    }
}
