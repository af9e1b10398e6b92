// Profile record, LLM parsing, scoped experience retargeting and markdown rendering.
// All LLM calls go through llm_client::GenerationService.

pub mod models;
pub mod parser;
pub mod prompts;
pub mod render;
pub mod retarget;

pub use models::{ExperienceEntry, Profile};
