//! JSON reporter for machine-readable output

use crate::QuizResult;
use crate::ValidationError;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Render any response body
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }

    /// Render a batch of scored submissions with a summary
    pub fn render_batch(&self, results: &[Result<QuizResult, ValidationError>]) -> String {
        let entries: Vec<BatchEntry> = results
            .iter()
            .enumerate()
            .map(|(index, r)| match r {
                Ok(result) => BatchEntry {
                    index,
                    result: Some(result),
                    error: None,
                },
                Err(e) => BatchEntry {
                    index,
                    result: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        let scored = entries.iter().filter(|e| e.result.is_some()).count();
        self.render(&BatchOutput {
            summary: BatchSummary {
                submissions: entries.len(),
                scored,
                rejected: entries.len() - scored,
            },
            results: entries,
        })
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchOutput<'a> {
    results: Vec<BatchEntry<'a>>,
    summary: BatchSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry<'a> {
    index: usize,
    #[serde(flatten)]
    result: Option<&'a QuizResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchSummary {
    submissions: usize,
    scored: usize,
    rejected: usize,
}
