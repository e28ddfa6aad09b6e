//! Quality filter: drop degenerate records, assert the label-set cardinality.
//!
//! Two rules, both from the upstream data checks:
//!
//! - sentences shorter than [`MIN_TEXT_CHARS`] characters are discarded
//! - after filtering, exactly [`EXPECTED_CLASSES`] distinct labels must remain,
//!   since downstream evaluation assumes a 3-class problem; anything else
//!   aborts the run

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{Label, Record};
use crate::error::AppError;

/// Minimum sentence length (in characters) for a record to be kept.
pub const MIN_TEXT_CHARS: usize = 20;

/// Number of distinct labels the filtered dataset must contain.
pub const EXPECTED_CLASSES: usize = 3;

/// Drop too-short records and verify the surviving label set.
pub fn quality_filter(records: Vec<Record>) -> Result<Vec<Record>, AppError> {
    let total = records.len();
    let mut kept = Vec::with_capacity(total);

    for record in records {
        if record.text.chars().count() < MIN_TEXT_CHARS {
            debug!(text = %record.text, "dropping too-short sentence");
            continue;
        }
        kept.push(record);
    }

    let labels: BTreeSet<Label> = kept.iter().map(|r| r.label).collect();
    if labels.len() != EXPECTED_CLASSES {
        let names: Vec<&str> = labels.iter().map(|l| l.display_name()).collect();
        return Err(AppError::data(format!(
            "Expected {EXPECTED_CLASSES} distinct labels after filtering, found {} ({}).",
            labels.len(),
            names.join(", ")
        )));
    }

    debug!(kept = kept.len(), dropped = total - kept.len(), "quality filter done");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, label: Label) -> Record {
        Record::new(text, label)
    }

    #[test]
    fn short_sentences_are_dropped_and_long_ones_kept() {
        let records = vec![
            record("short txt", Label::Negative), // 9 chars: dropped
            record("exactly twenty-five chars", Label::Negative), // 25 chars: kept
            record("a perfectly reasonable neutral sentence", Label::Neutral),
            record("a perfectly reasonable positive sentence", Label::Positive),
        ];
        let kept = quality_filter(records).unwrap();
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.text.chars().count() >= MIN_TEXT_CHARS));
    }

    #[test]
    fn aborts_when_label_cardinality_is_not_three() {
        let records = vec![
            record("a perfectly reasonable negative sentence", Label::Negative),
            record("a perfectly reasonable neutral sentence", Label::Neutral),
        ];
        let err = quality_filter(records).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("distinct labels"));
    }

    #[test]
    fn filtering_can_remove_a_class_entirely() {
        // The only positive sentence is too short, so the cardinality check fires.
        let records = vec![
            record("a perfectly reasonable negative sentence", Label::Negative),
            record("a perfectly reasonable neutral sentence", Label::Neutral),
            record("profit up", Label::Positive),
        ];
        assert!(quality_filter(records).is_err());
    }
}
