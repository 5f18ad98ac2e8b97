//! Comparison report
//!
//! Collects run results in execution order and renders them as text.

use serde::Serialize;
use std::fmt::Write;

use crate::core::{Outcome, RunResult};

/// Ordered results of one benchmark session
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonReport {
    results: Vec<RunResult>,
}

impl ComparisonReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result; order of calls is order of rendering
    pub fn add(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// Results in execution order
    pub fn entries(&self) -> &[RunResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Absolute elapsed-time difference, defined only for exactly two runs
    pub fn difference_seconds(&self) -> Option<f64> {
        match self.results.as_slice() {
            [first, second] => Some((first.elapsed_seconds() - second.elapsed_seconds()).abs()),
            _ => None,
        }
    }

    /// Render the report as human-readable text
    pub fn render(&self) -> String {
        let mut output = String::new();
        let separator = "=".repeat(80);

        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                let _ = writeln!(output, "\n{}\n", separator);
            }

            let kind = result.backend_kind();
            let _ = writeln!(output, "{} Time: {:.2}s", kind, result.elapsed_seconds());
            match result.outcome() {
                Outcome::Success { text } => {
                    let _ = writeln!(output, "{} Result:\n{}", kind, text);
                }
                Outcome::Failure { error_description } => {
                    let _ = writeln!(output, "{} Error:\n{}", kind, error_description);
                }
            }
        }

        let _ = writeln!(output, "\nTime Comparison:");
        for result in &self.results {
            let label = format!("{}:", result.backend_kind());
            let _ = writeln!(output, "{:<26} {:.2}s", label, result.elapsed_seconds());
        }

        if let Some(diff) = self.difference_seconds() {
            let _ = writeln!(output, "{:<26} {:.2}s", "Difference:", diff);
        }

        output
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BackendKind;

    fn sample() -> ComparisonReport {
        let mut report = ComparisonReport::new();
        report.add(RunResult::new(
            BackendKind::HttpAgentService,
            2.0,
            Outcome::success("Blue Origin: Princeton"),
        ));
        report.add(RunResult::new(
            BackendKind::InProcessBrowserAgent,
            3.5,
            Outcome::failure("navigation timeout"),
        ));
        report
    }

    #[test]
    fn test_render_two_runs_includes_difference() {
        let rendered = sample().render();
        assert!(rendered.contains("http-agent-service Time: 2.00s"));
        assert!(rendered.contains("http-agent-service Result:\nBlue Origin: Princeton"));
        assert!(rendered.contains("in-process-browser-agent Error:\nnavigation timeout"));
        assert!(rendered.contains("Difference:"));
        assert!(rendered.contains("1.50s"));
    }

    #[test]
    fn test_render_preserves_insertion_order() {
        let rendered = sample().render();
        let http = rendered.find("http-agent-service Time").unwrap();
        let browser = rendered.find("in-process-browser-agent Time").unwrap();
        assert!(http < browser);
    }

    #[test]
    fn test_render_single_run_has_no_difference() {
        let mut report = ComparisonReport::new();
        report.add(RunResult::new(
            BackendKind::InProcessBrowserAgent,
            12.345,
            Outcome::success("done"),
        ));

        let rendered = report.render();
        assert!(rendered.contains("in-process-browser-agent:"));
        assert!(rendered.contains("12.35s") || rendered.contains("12.34s"));
        assert!(!rendered.contains("Difference"));
        assert_eq!(report.difference_seconds(), None);
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample();
        assert_eq!(report.render(), report.render());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut report = sample();
        report.add(report.entries()[0].clone());
        assert_eq!(report.len(), 3);
        assert_eq!(report.difference_seconds(), None);
    }

    #[test]
    fn test_json_output() {
        let json: serde_json::Value =
            serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["backend_kind"], "http-agent-service");
        assert_eq!(json["results"][1]["outcome"]["status"], "failure");
    }
}
