use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::profile::retarget::ImmutableFieldPolicy;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Application configuration loaded from environment variables.
/// The generation-service key is optional at startup: parse and retarget fail
/// with a descriptive error until it is configured.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub resume_data_path: PathBuf,
    pub immutable_field_policy: ImmutableFieldPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_path = env_or("SECRETS_PATH", "secrets.json");

        Ok(Config {
            openai_api_key: resolve_api_key(Path::new(&secrets_path))?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            openai_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            resume_data_path: PathBuf::from(env_or("RESUME_DATA_PATH", "resume-data.json")),
            immutable_field_policy: env_or("IMMUTABLE_FIELD_POLICY", "reject")
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("IMMUTABLE_FIELD_POLICY is invalid")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("resume_data_path", &self.resume_data_path)
            .field("immutable_field_policy", &self.immutable_field_policy)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The secrets file wins over the process environment.
fn resolve_api_key(secrets_path: &Path) -> Result<Option<String>> {
    if let Some(key) = read_secret(secrets_path, API_KEY_VAR)? {
        return Ok(Some(key));
    }
    Ok(std::env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty()))
}

/// Reads `key` from a flat JSON object of strings. A missing file is not an error.
fn read_secret(path: &Path, key: &str) -> Result<Option<String>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read secrets file {}", path.display()))
        }
    };

    let secrets: HashMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("Secrets file {} must be a JSON object of strings", path.display()))?;

    Ok(secrets
        .get(key)
        .filter(|value| !value.trim().is_empty())
        .cloned())
}
