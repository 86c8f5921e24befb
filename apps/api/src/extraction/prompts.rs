// Extraction LLM prompt templates.
// All prompts for the extraction module are defined here.

use crate::llm_client::prompts::{NO_FABRICATION_INSTRUCTION, TOOL_ONLY_SYSTEM};

pub const RESUME_TOOL_NAME: &str = "record_resume";

pub const RESUME_TOOL_DESCRIPTION: &str =
    "Record the structured fields extracted from a single resume document.";

pub const RESUME_EXTRACT_PROMPT: &str = r#"Extract the structured resume fields from the document below.

RESUME TEXT:
{resume_text}

RULES:
1. experience is the total number of years of professional experience, as a whole number.
2. graduation_year is a four digit year.
3. ats_score is an integer from 0 to 100 rating how well the resume would pass an applicant tracking system.
4. role_fit is a short label for the role this candidate fits best (e.g. "Data Analyst", "AI Engineer").
5. keywords are the terms an applicant tracking system would match on."#;

/// Builds the system prompt for resume extraction.
pub fn resume_extract_system() -> String {
    format!(
        "You are a precise resume data extractor. {TOOL_ONLY_SYSTEM} {NO_FABRICATION_INSTRUCTION}"
    )
}

/// Fills the extraction template with a document's text.
pub fn resume_extract_prompt(resume_text: &str) -> String {
    RESUME_EXTRACT_PROMPT.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = resume_extract_prompt("Alice Smith\nRust engineer");
        assert!(prompt.contains("Alice Smith\nRust engineer"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_system_prompt_carries_shared_fragments() {
        let system = resume_extract_system();
        assert!(system.contains("calling the provided tool"));
        assert!(system.contains("Only report information"));
    }
}
