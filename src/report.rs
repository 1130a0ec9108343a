//! Human-readable wording for an estimate.

use std::fmt;

use crate::sampling::Estimate;

pub const TITLE: &str = "How Much Must We Verify to Trust a Bill?";

pub const NOTES: [&str; 2] = [
    "Checking more than this number yields diminishing returns.",
    "This approach is widely used in quality control, polling, and auditing.",
];

/// Wording for one estimate. `Display` renders the full sentence.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    estimate: &'a Estimate,
}

impl<'a> Report<'a> {
    pub fn new(estimate: &'a Estimate) -> Self {
        Self { estimate }
    }

    /// "169 out of 300 records"
    pub fn headline(&self) -> String {
        format!(
            "{} out of {} records",
            self.estimate.sample_size, self.estimate.request.population
        )
    }

    /// Headline plus the share of the bill it represents.
    pub fn coverage(&self) -> String {
        format!("{:.1}% of the bill", self.estimate.coverage_percent())
    }

    /// Full report as plain text: title, sentence, then the notes as bullets.
    pub fn to_text(&self) -> String {
        let mut lines = vec![TITLE.to_string(), String::new(), self.to_string(), String::new()];
        lines.extend(NOTES.iter().map(|note| format!("- {}", note)));
        lines.join("\n")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let req = &self.estimate.request;
        write!(
            f,
            "To be {} confident that your bill is accurate within ±{} margin of error, \
             you need to check at least {}.",
            req.confidence,
            req.margin,
            self.headline()
        )
    }
}
