use std::sync::Arc;

use crate::config::Config;
use crate::extraction::extractor::ResumeExtractor;
use crate::extraction::pipeline::PipelineSettings;
use crate::extraction::schema::FieldSpec;
use crate::extraction::store::BatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable extractor. Default: LlmResumeExtractor.
    pub extractor: Arc<dyn ResumeExtractor>,
    /// Field table validated at startup; drives the model schema and CSV columns.
    pub fields: &'static [FieldSpec],
    pub settings: Arc<PipelineSettings>,
    pub batches: BatchStore,
}
