// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces tool-only output.
pub const TOOL_ONLY_SYSTEM: &str = "\
    You MUST answer by calling the provided tool exactly once. \
    Do NOT reply with prose, markdown, explanations or apologies.";

/// Instruction against inventing values that are not in the source text.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only report information that is present in the document. \
    If a value is not stated, use null for single values and an empty list for lists. \
    Do NOT guess contact details, dates or employers.";
