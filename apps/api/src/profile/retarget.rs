//! Scoped Updater: rewrites experience descriptions toward a job description.
//!
//! Only `description` may change. Length, order, `title`, `company` and `duration`
//! are checked against the input after every call, whatever the service claims.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{fence_untrusted, JSON_ONLY_INSTRUCTION, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::{decode_json, CompletionRequest, GenerationService, LlmError};
use crate::profile::models::{text_field, ExperienceEntry};
use crate::profile::prompts::{RETARGET_PROMPT_TEMPLATE, RETARGET_SYSTEM};

/// Higher temperature: this is a rewrite, not an extraction.
pub const RETARGET_TEMPERATURE: f32 = 0.7;
pub const RETARGET_MAX_TOKENS: u32 = 2000;

/// The fields of an `ExperienceEntry` a scoped update must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmutableField {
    Title,
    Company,
    Duration,
}

impl fmt::Display for ImmutableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImmutableField::Title => "title",
            ImmutableField::Company => "company",
            ImmutableField::Duration => "duration",
        })
    }
}

/// What to do when the service changes an immutable field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImmutableFieldPolicy {
    /// Fail the whole update.
    #[default]
    Reject,
    /// Put the original values back and keep the rewritten descriptions.
    Restore,
}

impl FromStr for ImmutableFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "restore" => Ok(Self::Restore),
            other => Err(format!(
                "unknown immutable field policy '{other}' (expected 'reject' or 'restore')"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("{0}")]
    Validation(String),

    #[error("generation service unavailable: {0}")]
    ServiceUnavailable(#[source] LlmError),

    #[error("generation service returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("expected {expected} experience entries, service returned {actual}")]
    StructuralMismatch { expected: usize, actual: usize },

    #[error("service changed the {field} of experience entry {index}")]
    ImmutableFieldViolation { index: usize, field: ImmutableField },
}

/// Returns the first immutable field that differs between `original` and `updated`.
pub fn immutable_mismatch(
    original: &ExperienceEntry,
    updated: &ExperienceEntry,
) -> Option<ImmutableField> {
    if original.title != updated.title {
        Some(ImmutableField::Title)
    } else if original.company != updated.company {
        Some(ImmutableField::Company)
    } else if original.duration != updated.duration {
        Some(ImmutableField::Duration)
    } else {
        None
    }
}

/// Rewrites each entry's description toward `job_description`.
///
/// Returns a new list of the same length and order, or an error. The input slice is
/// never modified.
pub async fn retarget_experience(
    job_description: &str,
    current: &[ExperienceEntry],
    service: &dyn GenerationService,
    policy: ImmutableFieldPolicy,
) -> Result<Vec<ExperienceEntry>, UpdateError> {
    if job_description.trim().is_empty() {
        return Err(UpdateError::Validation(
            "Please enter a job description first.".to_string(),
        ));
    }
    if current.is_empty() {
        info!("No experience entries to retarget");
        return Ok(Vec::new());
    }

    let prompt = build_retarget_prompt(job_description, current)?;
    let system = format!("{RETARGET_SYSTEM} {UNTRUSTED_INPUT_INSTRUCTION} {JSON_ONLY_INSTRUCTION}");

    info!(
        "Retargeting {} experience entries against job description ({} chars)",
        current.len(),
        job_description.len()
    );
    let output = service
        .complete(CompletionRequest {
            system: &system,
            prompt: &prompt,
            temperature: RETARGET_TEMPERATURE,
            max_tokens: RETARGET_MAX_TOKENS,
        })
        .await
        .map_err(|e| match e {
            LlmError::EmptyContent => UpdateError::MalformedOutput(e.to_string()),
            other => UpdateError::ServiceUnavailable(other),
        })?;

    let updated = decode_experience(&output)?;
    validate_scoped_update(current, updated, policy)
        .inspect_err(|e| warn!("Rejected retarget output: {e}"))
}

fn build_retarget_prompt(
    job_description: &str,
    current: &[ExperienceEntry],
) -> Result<String, UpdateError> {
    let experience_json = serde_json::to_string_pretty(current)
        .map_err(|e| UpdateError::Validation(format!("Failed to serialize experience: {e}")))?;

    Ok(RETARGET_PROMPT_TEMPLATE
        .replace("{job_block}", &fence_untrusted("job_description", job_description))
        .replace("{experience_json}", &experience_json)
        .replace("{count}", &current.len().to_string()))
}

/// One entry as the service must return it. Every key is required; a reply that
/// drops `description` is malformed, not an empty rewrite.
#[derive(Deserialize)]
struct ReturnedEntry {
    #[serde(deserialize_with = "text_field")]
    title: String,
    #[serde(deserialize_with = "text_field")]
    company: String,
    #[serde(deserialize_with = "text_field")]
    duration: String,
    #[serde(deserialize_with = "text_field")]
    description: String,
}

impl From<ReturnedEntry> for ExperienceEntry {
    fn from(entry: ReturnedEntry) -> Self {
        Self {
            title: entry.title,
            company: entry.company,
            duration: entry.duration,
            description: entry.description,
        }
    }
}

/// Models sometimes wrap the list as `{"experience": [...]}`; both shapes are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExperiencePayload {
    List(Vec<ReturnedEntry>),
    Wrapped { experience: Vec<ReturnedEntry> },
}

fn decode_experience(output: &str) -> Result<Vec<ExperienceEntry>, UpdateError> {
    let entries = match decode_json::<ExperiencePayload>(output) {
        Ok(ExperiencePayload::List(entries)) | Ok(ExperiencePayload::Wrapped { experience: entries }) => {
            entries
        }
        Err(e) => return Err(UpdateError::MalformedOutput(e.to_string())),
    };

    if let Some(index) = entries
        .iter()
        .position(|entry| entry.description.trim().is_empty())
    {
        return Err(UpdateError::MalformedOutput(format!(
            "experience entry {index} has an empty description"
        )));
    }

    Ok(entries.into_iter().map(ExperienceEntry::from).collect())
}

/// Checks a decoded update against the original list and applies `policy` to any
/// immutable-field drift.
pub fn validate_scoped_update(
    original: &[ExperienceEntry],
    mut updated: Vec<ExperienceEntry>,
    policy: ImmutableFieldPolicy,
) -> Result<Vec<ExperienceEntry>, UpdateError> {
    if updated.len() != original.len() {
        return Err(UpdateError::StructuralMismatch {
            expected: original.len(),
            actual: updated.len(),
        });
    }

    for (index, (before, after)) in original.iter().zip(updated.iter_mut()).enumerate() {
        let Some(field) = immutable_mismatch(before, after) else {
            continue;
        };
        // Matching another index means the entry moved. Never repaired in place.
        let moved = original
            .iter()
            .enumerate()
            .any(|(other, candidate)| other != index && immutable_mismatch(candidate, after).is_none());
        if moved {
            return Err(UpdateError::ImmutableFieldViolation { index, field });
        }
        match policy {
            ImmutableFieldPolicy::Reject => {
                return Err(UpdateError::ImmutableFieldViolation { index, field });
            }
            ImmutableFieldPolicy::Restore => {
                warn!("Restoring immutable fields of experience entry {index} ({field} changed)");
                after.title.clone_from(&before.title);
                after.company.clone_from(&before.company);
                after.duration.clone_from(&before.duration);
            }
        }
    }

    Ok(updated)
}
