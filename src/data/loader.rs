//! Dataset loading from the Hugging Face datasets-server API (or a local file).
//!
//! The remote source is the `financial_phrasebank` dataset, `sentences_allagree`
//! configuration (only sentences where all annotators agree), `train` split.
//! The datasets-server `/rows` endpoint is paged, so we fetch until the
//! advertised row total is exhausted.
//!
//! Every sentence is cleaned at load time: lower-cased and stripped of
//! punctuation. Downstream stages rely on this normalization (the serving
//! form applies the same cleaning before prediction).

use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::domain::{Label, Record};
use crate::error::AppError;

const BASE_URL: &str = "https://datasets-server.huggingface.co/rows";
const DATASET: &str = "financial_phrasebank";
const CONFIG: &str = "sentences_allagree";
const SPLIT: &str = "train";
const PAGE_SIZE: usize = 100;

pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch and clean the full split, page by page.
    pub fn fetch_all(&self) -> Result<Vec<Record>, AppError> {
        let mut records = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.fetch_page(offset)?;
            let page_len = page.rows.len();
            if page_len == 0 {
                break;
            }

            for entry in page.rows {
                records.push(clean_row(&entry.row)?);
            }

            offset += page_len;
            if offset >= page.num_rows_total {
                break;
            }
        }

        if records.is_empty() {
            return Err(AppError::external("Dataset fetch returned no rows."));
        }

        info!(n = records.len(), "loaded dataset rows");
        Ok(records)
    }

    fn fetch_page(&self, offset: usize) -> Result<RowsResponse, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("dataset", DATASET),
                ("config", CONFIG),
                ("split", SPLIT),
                ("offset", &offset.to_string()),
                ("length", &PAGE_SIZE.to_string()),
            ])
            .send()
            .map_err(|e| AppError::external(format!("Dataset request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::external(format!(
                "Dataset request failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::external(format!("Failed to parse dataset response: {e}")))
    }
}

impl Default for DatasetClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Load records from a local JSON file (array of `{"sentence": ..., "label": n}`).
pub fn load_local_json(path: &Path) -> Result<Vec<Record>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open dataset '{}': {e}", path.display())))?;
    let rows: Vec<PhraseRow> = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid dataset JSON '{}': {e}", path.display())))?;

    if rows.is_empty() {
        return Err(AppError::data(format!(
            "Dataset '{}' contains no rows.",
            path.display()
        )));
    }

    let records = rows
        .iter()
        .map(clean_row)
        .collect::<Result<Vec<_>, _>>()?;
    info!(n = records.len(), path = %path.display(), "loaded local dataset");
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: PhraseRow,
}

#[derive(Debug, Deserialize)]
struct PhraseRow {
    sentence: String,
    label: u8,
}

fn clean_row(row: &PhraseRow) -> Result<Record, AppError> {
    let label = Label::from_code(row.label)
        .ok_or_else(|| AppError::data(format!("Unknown label code {} in dataset.", row.label)))?;
    Ok(Record::new(clean_sentence(&row.sentence), label))
}

/// Lower-case a sentence and strip ASCII punctuation.
pub fn clean_sentence(sentence: &str) -> String {
    sentence
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}
