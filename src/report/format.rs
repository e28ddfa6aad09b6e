//! Formatted terminal output for evaluation reports and perturbation cases.

use crate::domain::{EvaluationReport, PerturbationCase};

/// Format a classification report as a small fixed-width table.
pub fn format_report(report: &EvaluationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Classification report: {} ===\n", report.name));
    out.push_str(&format!(
        "{:<10} {:>9} {:>9} {:>9} {:>9}\n",
        "label", "precision", "recall", "f1", "support"
    ));
    for (label, m) in &report.per_class {
        out.push_str(&format!(
            "{:<10} {:>9.3} {:>9.3} {:>9.3} {:>9}\n",
            label.display_name(),
            m.precision,
            m.recall,
            m.f1,
            m.support
        ));
    }
    out.push_str(&format!(
        "accuracy: {:.3} (n={})\n",
        report.accuracy, report.n
    ));

    out
}

/// Format perturbation diagnostics, one block per sampled case.
pub fn format_perturbations(cases: &[PerturbationCase]) -> String {
    let mut out = String::new();

    out.push_str("=== Perturbation tests ===\n");
    if cases.is_empty() {
        out.push_str("(no cases sampled)\n");
        return out;
    }

    for case in cases {
        out.push_str(&format!("original:   '{}'\n", case.original));
        out.push_str(&format!("paraphrase: '{}'\n", case.paraphrase));
        out.push_str(&format!(
            "prediction: {} -> {}{}\n\n",
            case.original_label.display_name(),
            case.new_label.display_name(),
            if case.flipped() { "  [LABEL FLIPPED]" } else { "" }
        ));
    }

    out
}
