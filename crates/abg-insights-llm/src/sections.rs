//! Section parser for full-analysis replies.
//!
//! A reply is expected to carry three `##` headed sections. Missing or empty
//! sections degrade to fixed placeholder text; parsing never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder when the interpretation section is missing.
pub const INTERPRETATION_FALLBACK: &str = "Interpretation not available";
/// Placeholder when the conditions section is missing.
pub const CONDITIONS_FALLBACK: &str = "Condition suggestions not available";
/// Placeholder when the treatment section is missing.
pub const TREATMENT_FALLBACK: &str = "Treatment recommendations not available";

static INTERPRETATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#+\s*INTERPRETATION\b").expect("interpretation heading pattern")
});
static CONDITIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#+\s*SUGGESTED\s+CONDITIONS\b").expect("conditions heading pattern")
});
static TREATMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#+\s*TREATMENT\s+RECOMMENDATIONS\b").expect("treatment heading pattern")
});
/// Start of the next section: any `##`, or a line opening with `#` and a
/// word. `#1 Secure airway` is content, not a heading.
static BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#+\s*[A-Za-z]|##").expect("section boundary pattern")
});

/// The three text blocks of an analysis reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSections {
    pub interpretation: String,
    pub suggested_conditions: String,
    pub treatment_recommendations: String,
}

impl AnalysisSections {
    /// True when no slot holds placeholder text.
    pub fn is_complete(&self) -> bool {
        self.interpretation != INTERPRETATION_FALLBACK
            && self.suggested_conditions != CONDITIONS_FALLBACK
            && self.treatment_recommendations != TREATMENT_FALLBACK
    }
}

/// Split a raw reply into its three sections.
pub fn parse_sections(text: &str) -> AnalysisSections {
    let sections = AnalysisSections {
        interpretation: extract_section(text, &INTERPRETATION_RE)
            .unwrap_or_else(|| INTERPRETATION_FALLBACK.to_string()),
        suggested_conditions: extract_section(text, &CONDITIONS_RE)
            .unwrap_or_else(|| CONDITIONS_FALLBACK.to_string()),
        treatment_recommendations: extract_section(text, &TREATMENT_RE)
            .unwrap_or_else(|| TREATMENT_FALLBACK.to_string()),
    };

    if !sections.is_complete() {
        tracing::debug!(reply_len = text.len(), "Reply is missing one or more sections");
    }

    sections
}

/// Content after the first heading match, up to the next boundary.
fn extract_section(text: &str, heading: &Regex) -> Option<String> {
    let start = heading.find(text)?.end();
    let rest = &text[start..];
    let end = BOUNDARY_RE.find(rest).map_or(rest.len(), |m| m.start());

    let content = rest[..end].trim_start_matches(':').trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}
