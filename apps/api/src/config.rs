use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::ANTHROPIC_API_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on a single document's extraction round trip, retries included.
    pub document_timeout_secs: u64,
    /// Emit an `incomplete` row for documents whose extraction failed instead of skipping them.
    pub emit_partial_records: bool,
    pub max_retained_batches: usize,
    pub max_upload_bytes: usize,
    /// Cap on the decompressed size of a single ZIP member.
    pub max_archive_member_bytes: u64,
    /// Root for per-batch scratch files. Defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| ANTHROPIC_API_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            document_timeout_secs: parse_env("DOCUMENT_TIMEOUT_SECS", 180)?,
            emit_partial_records: parse_env("EMIT_PARTIAL_RECORDS", false)?,
            max_retained_batches: parse_env("MAX_RETAINED_BATCHES", 32)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            max_archive_member_bytes: parse_env("MAX_ARCHIVE_MEMBER_BYTES", 25 * 1024 * 1024)?,
            scratch_dir: std::env::var("SCRATCH_DIR").ok().map(PathBuf::from),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_trimmed_numbers() {
        let port: u16 = parse_value("PORT", " 9090 ").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<u64>("DOCUMENT_TIMEOUT_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("DOCUMENT_TIMEOUT_SECS"));
    }

    #[test]
    fn test_parse_value_bool() {
        assert!(parse_value::<bool>("EMIT_PARTIAL_RECORDS", "true").unwrap());
        assert!(parse_value::<bool>("EMIT_PARTIAL_RECORDS", "yes").is_err());
    }
}
