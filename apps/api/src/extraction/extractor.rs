//! Schema-Constrained Extractor — pluggable, trait-based record extraction.
//!
//! Default: `LlmResumeExtractor` (forced tool call against the model provider).
//! `AppState` holds an `Arc<dyn ResumeExtractor>`; tests swap in a stub.

use async_trait::async_trait;
use thiserror::Error;

use crate::extraction::prompts::{
    resume_extract_prompt, resume_extract_system, RESUME_TOOL_DESCRIPTION, RESUME_TOOL_NAME,
};
use crate::extraction::schema::{to_json_schema, FieldSpec};
use crate::extraction::validation::{record_from_model_output, RecordError};
use crate::llm_client::{LlmClient, LlmError, ToolDefinition};
use crate::models::resume::ResumeRecord;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model output failed validation: {0}")]
    Validation(#[from] RecordError),

    #[error("extraction timed out after {0}s")]
    Timeout(u64),
}

/// The extractor trait. Implement this to swap backends without touching
/// the pipeline or handlers.
#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    /// Extracts one record from a document's plain text. `file_name` is left empty.
    async fn extract(&self, text: &str) -> Result<ResumeRecord, ExtractError>;
}

/// Extracts records by forcing the model to call a tool whose input schema is
/// the resume field table.
pub struct LlmResumeExtractor {
    llm: LlmClient,
    fields: &'static [FieldSpec],
    tool: ToolDefinition,
    system: String,
}

impl LlmResumeExtractor {
    pub fn new(llm: LlmClient, fields: &'static [FieldSpec]) -> Self {
        let tool = ToolDefinition {
            name: RESUME_TOOL_NAME.to_string(),
            description: RESUME_TOOL_DESCRIPTION.to_string(),
            input_schema: to_json_schema(fields),
        };
        Self {
            llm,
            fields,
            tool,
            system: resume_extract_system(),
        }
    }
}

#[async_trait]
impl ResumeExtractor for LlmResumeExtractor {
    async fn extract(&self, text: &str) -> Result<ResumeRecord, ExtractError> {
        let prompt = resume_extract_prompt(text);
        let output = self.llm.call_tool(&prompt, &self.system, &self.tool).await?;
        Ok(record_from_model_output(self.fields, &output)?)
    }
}
