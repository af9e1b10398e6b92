//! Profile Parser: extracts a `Profile` from free-form resume text.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{fence_untrusted, JSON_ONLY_INSTRUCTION, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::{decode_json, CompletionRequest, GenerationService, LlmError};
use crate::profile::models::{profile_from_value, KeyCoverage, Profile};
use crate::profile::prompts::{PARSE_PROMPT_TEMPLATE, PARSE_SYSTEM};

/// Low temperature: extraction fidelity over creativity.
pub const PARSE_TEMPERATURE: f32 = 0.3;
pub const PARSE_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("resume text is empty")]
    EmptyInput,

    #[error("generation service unavailable: {0}")]
    ServiceUnavailable(#[source] LlmError),

    #[error("generation service returned malformed output: {0}")]
    MalformedOutput(String),
}

/// Parses raw resume text into a complete `Profile`.
///
/// The text is embedded as fenced, untrusted data. The service output is decoded and
/// checked before anything is returned; on failure no profile is produced.
pub async fn parse_profile(
    raw_text: &str,
    service: &dyn GenerationService,
) -> Result<Profile, ParseError> {
    if raw_text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let prompt = build_parse_prompt(raw_text);
    let system = format!("{PARSE_SYSTEM} {UNTRUSTED_INPUT_INSTRUCTION} {JSON_ONLY_INSTRUCTION}");

    info!("Parsing resume text ({} chars)", raw_text.len());
    let output = service
        .complete(CompletionRequest {
            system: &system,
            prompt: &prompt,
            temperature: PARSE_TEMPERATURE,
            max_tokens: PARSE_MAX_TOKENS,
        })
        .await
        .map_err(|e| match e {
            LlmError::EmptyContent => ParseError::MalformedOutput(e.to_string()),
            other => ParseError::ServiceUnavailable(other),
        })?;

    let profile = decode_profile(&output).inspect_err(|e| warn!("Rejected parse output: {e}"))?;
    info!(
        "Parsed resume: {} experience, {} education, {} skills",
        profile.experience.len(),
        profile.education.len(),
        profile.skills.len()
    );
    Ok(profile)
}

fn build_parse_prompt(raw_text: &str) -> String {
    PARSE_PROMPT_TEMPLATE.replace("{resume_block}", &fence_untrusted("resume_text", raw_text))
}

/// Decodes service output as a profile. The payload must be a JSON object carrying at
/// least one schema key; anything else is not a profile.
fn decode_profile(output: &str) -> Result<Profile, ParseError> {
    let value: Value =
        decode_json(output).map_err(|e| ParseError::MalformedOutput(format!("not JSON: {e}")))?;
    profile_from_value(value, KeyCoverage::Any).map_err(|e| ParseError::MalformedOutput(e.to_string()))
}
