//! Batch pipeline: upload, optional archive expansion, text, record, CSV.
//!
//! Documents are processed one at a time. A failure is recorded against the
//! document that caused it and never stops its siblings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use crate::extraction::aggregate::{render_csv, AggregateError, BatchAggregator};
use crate::extraction::archive::expand_archive;
use crate::extraction::extractor::{ExtractError, ResumeExtractor};
use crate::extraction::reader::{read_document, DocumentKind};
use crate::extraction::schema::FieldSpec;
use crate::models::batch::{SkipReason, SkippedDocument};
use crate::models::resume::ResumeRecord;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub document_timeout: Duration,
    pub emit_partial_records: bool,
    /// Parent directory for per-upload scratch files and archive extraction.
    pub scratch_root: PathBuf,
    /// Largest decompressed size accepted for one archive member.
    pub max_member_bytes: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            document_timeout: Duration::from_secs(180),
            emit_partial_records: false,
            scratch_root: std::env::temp_dir(),
            max_member_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// PDF/DOCX documents attempted, archive members included.
    pub documents_seen: usize,
    pub records: Vec<ResumeRecord>,
    pub skipped: Vec<SkippedDocument>,
    /// `None` when no record was produced.
    pub csv: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadKind {
    Archive,
    Document(DocumentKind),
    Unsupported,
}

fn classify(file_name: &str) -> UploadKind {
    let is_zip = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    if is_zip {
        return UploadKind::Archive;
    }
    DocumentKind::from_file_name(file_name)
        .map(UploadKind::Document)
        .unwrap_or(UploadKind::Unsupported)
}

pub struct BatchPipeline<'a> {
    extractor: &'a dyn ResumeExtractor,
    fields: &'static [FieldSpec],
    settings: &'a PipelineSettings,
    aggregator: BatchAggregator,
    documents_seen: usize,
}

impl<'a> BatchPipeline<'a> {
    pub fn new(
        extractor: &'a dyn ResumeExtractor,
        fields: &'static [FieldSpec],
        settings: &'a PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            fields,
            settings,
            aggregator: BatchAggregator::new(),
            documents_seen: 0,
        }
    }

    /// Processes every upload in order and renders the batch table.
    pub async fn run(mut self, uploads: Vec<Upload>) -> Result<BatchOutcome, AggregateError> {
        for upload in uploads {
            match classify(&upload.file_name) {
                UploadKind::Archive => self.process_archive(upload).await,
                UploadKind::Document(kind) => self.process_upload(upload, kind).await,
                UploadKind::Unsupported => {
                    self.skip(SkippedDocument::new(
                        &upload.file_name,
                        SkipReason::UnsupportedType,
                        "only .zip, .pdf and .docx files are supported",
                    ));
                }
            }
        }

        let (records, skipped) = self.aggregator.into_parts();
        let csv = render_csv(self.fields, &records)?;

        info!(
            "Batch finished: {} document(s), {} record(s), {} skipped",
            self.documents_seen,
            records.len(),
            skipped.len()
        );

        Ok(BatchOutcome {
            documents_seen: self.documents_seen,
            records,
            skipped,
            csv,
        })
    }

    async fn process_archive(&mut self, upload: Upload) {
        let bytes = upload.bytes.clone();
        let root = self.settings.scratch_root.clone();
        let limit = self.settings.max_member_bytes;
        let expanded =
            tokio::task::spawn_blocking(move || expand_archive(&bytes, &root, limit)).await;

        let expanded = match expanded {
            Ok(Ok(expanded)) => expanded,
            Ok(Err(e)) => {
                self.skip(SkippedDocument::new(
                    &upload.file_name,
                    SkipReason::InvalidArchive,
                    e,
                ));
                return;
            }
            Err(e) => {
                self.skip(SkippedDocument::new(
                    &upload.file_name,
                    SkipReason::InvalidArchive,
                    e,
                ));
                return;
            }
        };

        info!(
            "Archive '{}' contains {} document(s)",
            upload.file_name,
            expanded.members().len() + expanded.rejected().len()
        );

        for member in expanded.members() {
            self.process_document(&member.name, &member.path, member.kind)
                .await;
        }
        for rejected in expanded.rejected() {
            self.documents_seen += 1;
            self.skip(SkippedDocument::new(
                &rejected.name,
                SkipReason::Unreadable,
                &rejected.detail,
            ));
        }
        // `expanded` drops here, removing its scratch directory.
    }

    async fn process_upload(&mut self, upload: Upload, kind: DocumentKind) {
        let scratch = tempfile::Builder::new()
            .prefix("resumelens-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile_in(&self.settings.scratch_root);

        let scratch = match scratch {
            Ok(file) => file,
            Err(e) => {
                self.documents_seen += 1;
                self.skip(SkippedDocument::new(&upload.file_name, SkipReason::Unreadable, e));
                return;
            }
        };

        if let Err(e) = tokio::fs::write(scratch.path(), &upload.bytes).await {
            self.documents_seen += 1;
            self.skip(SkippedDocument::new(&upload.file_name, SkipReason::Unreadable, e));
            return;
        }

        self.process_document(&upload.file_name, scratch.path(), kind)
            .await;
    }

    async fn process_document(&mut self, file_name: &str, path: &Path, kind: DocumentKind) {
        self.documents_seen += 1;

        let text = match read_document(path, kind).await {
            Ok(text) => text,
            Err(e) => {
                self.skip(SkippedDocument::new(file_name, SkipReason::Unreadable, e));
                return;
            }
        };

        if text.trim().is_empty() {
            self.skip(SkippedDocument::new(
                file_name,
                SkipReason::NoText,
                "document contains no extractable text",
            ));
            return;
        }

        let timeout = self.settings.document_timeout;
        let result = match tokio::time::timeout(timeout, self.extractor.extract(&text)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(record) => {
                info!("Extracted record from '{file_name}'");
                self.aggregator.push(file_name, record);
            }
            Err(e) => {
                self.skip(SkippedDocument::new(
                    file_name,
                    SkipReason::ExtractionFailed,
                    &e,
                ));
                if self.settings.emit_partial_records {
                    self.aggregator
                        .push(file_name, ResumeRecord::incomplete(file_name));
                }
            }
        }
    }

    fn skip(&mut self, skipped: SkippedDocument) {
        warn!(
            "Skipping '{}' ({:?}): {}",
            skipped.file_name, skipped.reason, skipped.detail
        );
        self.aggregator.skip(skipped);
    }
}
