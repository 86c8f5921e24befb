// Resume extraction engine.
// Implements: document reading, archive expansion, schema-constrained extraction,
// validation, aggregation into CSV, and the batch API on top of them.
// All LLM calls go through llm_client, never to the provider directly.

pub mod aggregate;
pub mod archive;
pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod reader;
pub mod schema;
pub mod store;
pub mod validation;
