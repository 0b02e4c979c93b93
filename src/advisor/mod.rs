// Natural-language summaries of recent history, delegated to a chat model.
// The core only supplies the digest; generation belongs to a Summarizer.

mod openai;

pub use openai::OpenAiAdvisor;

use async_trait::async_trait;
use chrono::SecondsFormat;

use crate::models::Snapshot;

pub const NO_HISTORY: &str = "No history data available for AI analysis.";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("OPENAI_API_KEY is not set; export it before running `report`")]
    MissingApiKey,
    #[error("advisor http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn model_name(&self) -> &str;

    /// Turns a history digest (see [`digest`]) into prose.
    async fn summarize(&self, digest: &str) -> anyhow::Result<String>;
}

/// One line per snapshot: timestamp plus the three percentages.
/// `None` when there is nothing to analyze.
pub fn digest(history: &[Snapshot]) -> Option<String> {
    if history.is_empty() {
        return None;
    }
    let lines: Vec<String> = history
        .iter()
        .map(|s| {
            format!(
                "Time: {}, CPU: {:.1}%, Memory: {:.1}%, Disk: {:.1}%",
                s.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                s.cpu_percent,
                s.memory.percent,
                s.disk.percent
            )
        })
        .collect();
    Some(lines.join("\n"))
}

pub(crate) fn build_prompt(digest: &str) -> String {
    format!(
        "You are an AI system performance analyst. Analyze the following system metrics over time and provide:\n\
         - Key observations\n\
         - Detected performance issues\n\
         - Optimizations or recommendations\n\
         \n\
         Data:\n{}",
        digest
    )
}

/// Summarizes `history`, or returns [`NO_HISTORY`] without calling out.
pub async fn analyze(summarizer: &dyn Summarizer, history: &[Snapshot]) -> anyhow::Result<String> {
    let Some(digest) = digest(history) else {
        return Ok(NO_HISTORY.to_string());
    };
    tracing::debug!(
        model = summarizer.model_name(),
        entries = history.len(),
        "requesting history summary"
    );
    let text = summarizer.summarize(&digest).await?;
    Ok(text.trim().to_string())
}

/// Reads the key from `value`, treating blank as missing.
pub(crate) fn require_api_key(value: Option<String>) -> Result<String, AdvisorError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AdvisorError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_missing() {
        assert!(matches!(
            require_api_key(None),
            Err(AdvisorError::MissingApiKey)
        ));
        assert!(matches!(
            require_api_key(Some("  ".into())),
            Err(AdvisorError::MissingApiKey)
        ));
        assert_eq!(require_api_key(Some(" sk-1 ".into())).unwrap(), "sk-1");
    }

    #[test]
    fn prompt_embeds_digest() {
        let prompt = build_prompt("Time: x, CPU: 1.0%, Memory: 2.0%, Disk: 3.0%");
        assert!(prompt.contains("Key observations"));
        assert!(prompt.ends_with("Data:\nTime: x, CPU: 1.0%, Memory: 2.0%, Disk: 3.0%"));
    }
}
