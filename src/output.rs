//! Run reports and their terminal rendering.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output.

use serde::Serialize;

use crate::error::RecordedError;
use crate::models::ObservedCall;

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Calls in arrival order.
    pub observed: Vec<ObservedCall>,
    /// Every recorded failure, in the order it was found.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<RecordedError>,
    /// Commit from the latest `mark_as_processed` call.
    pub commit: Option<String>,
}

impl RunReport {
    /// A run passes when nothing was recorded in the error list.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[RecordedError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for RunReport {
    fn pretty_print(&self) -> String {
        let header = if self.passed() {
            "Run: passed".to_string()
        } else {
            format!("Run: failed ({} errors)", self.errors.len())
        };
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Calls:          {}", self.observed.len()),
        ];

        if let Some(ref commit) = self.commit {
            lines.push(format!("Commit:         {}", commit));
        }

        for (i, call) in self.observed.iter().enumerate() {
            let marker = if call.is_decoded() { "" } else { " (undecoded)" };
            lines.push(format!("  {:>3}. {}{}", i + 1, call.kind, marker));
        }

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        lines.join("\n")
    }
}
