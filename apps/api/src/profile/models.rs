//! The structured resume record and its lenient decoding rules.
//!
//! Generation output is never trusted to be tidy: string fields accept `null` and
//! bare numbers (e.g. `"year": 2019`), list fields accept `null`, and `skills`
//! accepts a comma-separated string. Serialization is always canonical.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "text_field")]
    pub name: String,
    #[serde(default, deserialize_with = "text_field")]
    pub email: String,
    #[serde(default, deserialize_with = "text_field")]
    pub phone: String,
    #[serde(default, deserialize_with = "text_field")]
    pub location: String,
    #[serde(default, deserialize_with = "text_field")]
    pub linkedin: String,
}

/// One position held. Identity within a profile is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "text_field")]
    pub title: String,
    #[serde(default, deserialize_with = "text_field")]
    pub company: String,
    #[serde(default, deserialize_with = "text_field")]
    pub duration: String,
    #[serde(default, deserialize_with = "text_field")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "text_field")]
    pub degree: String,
    #[serde(default, deserialize_with = "text_field")]
    pub school: String,
    #[serde(default, deserialize_with = "text_field")]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "personalInfo", default, deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "text_field")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "skills_field")]
    pub skills: Vec<String>,
}

/// Top-level keys of the serialized profile, in schema order.
pub const PROFILE_KEYS: [&str; 5] = ["personalInfo", "summary", "experience", "education", "skills"];

/// Joins skills for display or a single-line edit field.
pub fn join_skills(skills: &[String]) -> String {
    skills.join(", ")
}

/// Splits comma-separated skills, trimming each and dropping empties. Order and
/// duplicates are kept.
pub fn split_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// How many of `PROFILE_KEYS` a JSON object must carry to count as a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCoverage {
    /// Generation output: any one schema key is enough, the rest default to empty.
    Any,
    /// The durable file: every schema key, since a save always writes all of them.
    All,
}

/// Decodes a profile from `value`, which must be a JSON object with the required
/// schema keys. Fails instead of producing a blank profile from an unrelated object.
pub fn profile_from_value(value: Value, coverage: KeyCoverage) -> Result<Profile, serde_json::Error> {
    let Some(object) = value.as_object() else {
        return Err(de::Error::custom(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    };

    let missing: Vec<&str> = PROFILE_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    match coverage {
        KeyCoverage::Any if missing.len() == PROFILE_KEYS.len() => {
            return Err(de::Error::custom("object has none of the profile keys"));
        }
        KeyCoverage::All if !missing.is_empty() => {
            return Err(de::Error::custom(format!(
                "missing profile keys: {}",
                missing.join(", ")
            )));
        }
        _ => {}
    }

    serde_json::from_value(value)
}

pub(crate) fn text_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string, found {}",
            json_kind(&other)
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn skills_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(split_skills(&s)),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(de::Error::custom(format!(
                    "expected a skill string, found {}",
                    json_kind(&other)
                ))),
            })
            .collect(),
        other => Err(de::Error::custom(format!(
            "expected a list of skills, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
