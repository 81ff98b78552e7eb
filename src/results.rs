//! Quiz result persistence - stored in .brandscaling-results.json

use crate::{QuizAnswer, QuizResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

pub const RESULTS_FILENAME: &str = ".brandscaling-results.json";

/// One row of the results store, keyed by user id and creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResult {
    pub user_id: String,
    #[serde(flatten)]
    pub result: QuizResult,
    pub responses: Vec<QuizAnswer>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResultsFile {
    pub results: Vec<StoredResult>,
}

impl ResultsFile {
    /// Most recent result for a user. Rows are unordered, so compare timestamps.
    pub fn latest_for_user(&self, user_id: &str) -> Option<&StoredResult> {
        self.results
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
    }

    pub fn count_for_user(&self, user_id: &str) -> usize {
        self.results.iter().filter(|r| r.user_id == user_id).count()
    }

    pub fn append(&mut self, result: StoredResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Load results. A missing file is an empty store; an unreadable or
/// unparseable file is an error so that it is never overwritten.
pub fn load_results(path: &Path) -> Result<ResultsFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no results file, starting empty");
            return Ok(ResultsFile::default());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read results: {}", path.display()));
        }
    };
    serde_json::from_str::<ResultsFile>(&content).with_context(|| {
        warn!(path = %path.display(), "results file is corrupt, refusing to use it");
        format!("Invalid results file: {}", path.display())
    })
}

pub fn save_results(path: &Path, results: &ResultsFile) -> Result<()> {
    let content =
        serde_json::to_string_pretty(results).context("Failed to serialize quiz results")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write results: {}", path.display()))?;
    debug!(path = %path.display(), rows = results.len(), "saved quiz results");
    Ok(())
}
