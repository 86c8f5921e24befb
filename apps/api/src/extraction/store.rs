//! Transient, in-memory registry of upload batches and their CSV output.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::extraction::pipeline::BatchOutcome;
use crate::models::batch::{BatchReport, BatchStatus};

#[derive(Debug, Clone)]
struct BatchEntry {
    report: BatchReport,
    csv: Option<Arc<Vec<u8>>>,
}

/// What a download request finds for a batch id.
#[derive(Debug, Clone)]
pub enum Download {
    Ready(Arc<Vec<u8>>),
    Processing,
    Empty,
}

#[derive(Clone)]
pub struct BatchStore {
    inner: Arc<RwLock<HashMap<Uuid, BatchEntry>>>,
    max_retained: usize,
}

impl BatchStore {
    pub fn new(max_retained: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_retained: max_retained.max(1),
        }
    }

    /// Registers a new batch in `processing` state and returns its id and report.
    pub async fn start(&self, uploads: usize) -> (Uuid, BatchReport) {
        let batch_id = Uuid::new_v4();
        let report = BatchReport::processing(batch_id, uploads);

        let mut batches = self.inner.write().await;
        evict_finished(&mut batches, self.max_retained.saturating_sub(1));
        batches.insert(
            batch_id,
            BatchEntry {
                report: report.clone(),
                csv: None,
            },
        );
        (batch_id, report)
    }

    /// Records the outcome of a finished batch.
    pub async fn finish(&self, batch_id: Uuid, outcome: BatchOutcome) {
        let mut batches = self.inner.write().await;
        let Some(entry) = batches.get_mut(&batch_id) else {
            debug!("Batch {batch_id} was evicted before it finished");
            return;
        };

        let record_count = outcome.records.len();
        let report = &mut entry.report;
        report.documents_seen = outcome.documents_seen;
        report.record_count = record_count;
        report.skipped = outcome.skipped;
        report.finished_at = Some(Utc::now());

        match outcome.csv {
            Some(csv) => {
                report.status = BatchStatus::Done;
                report.download_url = Some(download_url(batch_id));
                report.message = format!(
                    "Done: {record_count} record(s) produced, {} document(s) skipped",
                    report.skipped.len()
                );
                entry.csv = Some(Arc::new(csv));
            }
            None => {
                report.status = BatchStatus::Empty;
                report.message = format!(
                    "Nothing to show: no resume could be extracted ({} document(s) skipped)",
                    report.skipped.len()
                );
            }
        }
    }

    /// Marks a batch whose pipeline failed outright as empty.
    pub async fn fail(&self, batch_id: Uuid, message: String) {
        let mut batches = self.inner.write().await;
        if let Some(entry) = batches.get_mut(&batch_id) {
            entry.report.status = BatchStatus::Empty;
            entry.report.message = message;
            entry.report.finished_at = Some(Utc::now());
        }
    }

    pub async fn report(&self, batch_id: Uuid) -> Option<BatchReport> {
        self.inner
            .read()
            .await
            .get(&batch_id)
            .map(|e| e.report.clone())
    }

    pub async fn download(&self, batch_id: Uuid) -> Option<Download> {
        let batches = self.inner.read().await;
        let entry = batches.get(&batch_id)?;
        let download = match (&entry.csv, entry.report.status) {
            (Some(csv), _) => Download::Ready(Arc::clone(csv)),
            (None, BatchStatus::Processing) => Download::Processing,
            (None, _) => Download::Empty,
        };
        Some(download)
    }
}

pub fn download_url(batch_id: Uuid) -> String {
    format!("/api/v1/batches/{batch_id}/download")
}

/// Drops the oldest finished batches until at most `keep` remain.
/// Batches still processing are never evicted.
fn evict_finished(batches: &mut HashMap<Uuid, BatchEntry>, keep: usize) {
    if batches.len() <= keep {
        return;
    }
    let mut finished: Vec<_> = batches
        .iter()
        .filter(|(_, e)| e.report.status != BatchStatus::Processing)
        .map(|(id, e)| (*id, e.report.created_at))
        .collect();
    finished.sort_by_key(|(_, created_at)| *created_at);

    let excess = batches.len() - keep;
    for (id, _) in finished.into_iter().take(excess) {
        debug!("Evicting batch {id}");
        batches.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::batch::{SkipReason, SkippedDocument};
    use crate::models::resume::ResumeRecord;

    fn outcome(records: usize) -> BatchOutcome {
        BatchOutcome {
            documents_seen: records + 1,
            records: (0..records).map(|_| ResumeRecord::default()).collect(),
            skipped: vec![SkippedDocument::new(
                "corrupted.docx",
                SkipReason::Unreadable,
                "bad zip",
            )],
            csv: (records > 0).then(|| b"fullname\nAlice\n".to_vec()),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_to_done() {
        let store = BatchStore::new(4);
        let (id, started) = store.start(2).await;
        assert_eq!(started.batch_id, Some(id));
        assert_eq!(started.status, BatchStatus::Processing);
        assert!(matches!(store.download(id).await, Some(Download::Processing)));

        store.finish(id, outcome(1)).await;

        let report = store.report(id).await.unwrap();
        assert_eq!(report.status, BatchStatus::Done);
        assert_eq!(report.record_count, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.download_url, Some(download_url(id)));
        assert!(report.finished_at.is_some());
        assert!(matches!(store.download(id).await, Some(Download::Ready(_))));
    }

    #[tokio::test]
    async fn test_lifecycle_to_empty() {
        let store = BatchStore::new(4);
        let id = store.start(1).await.0;
        store.finish(id, outcome(0)).await;

        let report = store.report(id).await.unwrap();
        assert_eq!(report.status, BatchStatus::Empty);
        assert!(report.download_url.is_none());
        assert!(matches!(store.download(id).await, Some(Download::Empty)));
    }

    #[tokio::test]
    async fn test_unknown_batch() {
        let store = BatchStore::new(4);
        assert!(store.report(Uuid::new_v4()).await.is_none());
        assert!(store.download(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_fail_marks_empty() {
        let store = BatchStore::new(4);
        let id = store.start(1).await.0;
        store.fail(id, "boom".to_string()).await;
        let report = store.report(id).await.unwrap();
        assert_eq!(report.status, BatchStatus::Empty);
        assert_eq!(report.message, "boom");
    }

    #[tokio::test]
    async fn test_evicts_oldest_finished_only() {
        let store = BatchStore::new(2);
        let first = store.start(1).await.0;
        store.finish(first, outcome(1)).await;
        let running = store.start(1).await.0;

        let third = store.start(1).await.0;

        assert!(store.report(first).await.is_none());
        assert!(store.report(running).await.is_some());
        assert!(store.report(third).await.is_some());
    }
}
