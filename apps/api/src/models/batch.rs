use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// No files were uploaded; nothing was started.
    AwaitingInput,
    Processing,
    /// Finished with at least one record; a CSV is available.
    Done,
    /// Finished without any record; there is nothing to download.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedType,
    Unreadable,
    NoText,
    ExtractionFailed,
    InvalidArchive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub file_name: String,
    pub reason: SkipReason,
    pub detail: String,
}

impl SkippedDocument {
    pub fn new(file_name: impl Into<String>, reason: SkipReason, detail: impl ToString) -> Self {
        Self {
            file_name: file_name.into(),
            reason,
            detail: detail.to_string(),
        }
    }
}

/// Status surface returned to clients for one upload batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Option<Uuid>,
    pub status: BatchStatus,
    pub documents_seen: usize,
    pub record_count: usize,
    pub skipped: Vec<SkippedDocument>,
    pub download_url: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchReport {
    pub fn awaiting_input() -> Self {
        Self {
            batch_id: None,
            status: BatchStatus::AwaitingInput,
            documents_seen: 0,
            record_count: 0,
            skipped: vec![],
            download_url: None,
            message: "Upload resumes to begin".to_string(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn processing(batch_id: Uuid, uploads: usize) -> Self {
        Self {
            batch_id: Some(batch_id),
            status: BatchStatus::Processing,
            documents_seen: 0,
            record_count: 0,
            skipped: vec![],
            download_url: None,
            message: format!("Analyzing {uploads} uploaded file(s)"),
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}
