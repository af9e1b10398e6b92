//! Session Controller: sequences user actions against the extractor, parser,
//! updater and store, and owns the single `SessionState` value.
//!
//! Every action either commits a new state or leaves the previous one untouched.
//! Persisting transitions write the store first and commit only after the write.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::extract::{preview, require_text, ExtractionError, TextExtractor};
use crate::llm_client::GenerationService;
use crate::profile::parser::{parse_profile, ParseError};
use crate::profile::render::render_profile_to_md;
use crate::profile::retarget::{retarget_experience, ImmutableFieldPolicy, UpdateError};
use crate::profile::Profile;
use crate::session::state::{transition, Event, SessionState, TransitionError};
use crate::store::{JsonFileStore, PersistenceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("failed to parse resume: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to update work experience: {0}")]
    Update(#[from] UpdateError),

    #[error("failed to persist resume: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("failed to export resume: {0}")]
    Export(#[source] serde_json::Error),
}

pub struct SessionController {
    state: SessionState,
    store: JsonFileStore,
    generator: Arc<dyn GenerationService>,
    extractor: Arc<dyn TextExtractor>,
    policy: ImmutableFieldPolicy,
}

impl SessionController {
    /// A controller with no profile, regardless of what the store holds.
    pub fn new(
        store: JsonFileStore,
        generator: Arc<dyn GenerationService>,
        extractor: Arc<dyn TextExtractor>,
        policy: ImmutableFieldPolicy,
    ) -> Self {
        Self {
            state: SessionState::Empty,
            store,
            generator,
            extractor,
            policy,
        }
    }

    /// Starts in `Ready` when the store holds a profile, `Empty` otherwise.
    pub fn restore(
        store: JsonFileStore,
        generator: Arc<dyn GenerationService>,
        extractor: Arc<dyn TextExtractor>,
        policy: ImmutableFieldPolicy,
    ) -> Result<Self, SessionError> {
        let saved = store.load()?;
        let mut controller = Self::new(store, generator, extractor, policy);
        if let Some(profile) = saved {
            info!("Restored saved resume; session is ready");
            controller.state = SessionState::Ready { profile };
        }
        Ok(controller)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Extracts text from an uploaded PDF and captures it. Returns a preview.
    pub async fn upload_document(&mut self, data: Bytes) -> Result<String, SessionError> {
        self.ensure_can_upload()?;
        let text = self.extractor.extract(data).await?;
        let preview = preview(&text);
        self.apply(Event::Uploaded(text))?;
        Ok(preview)
    }

    /// Captures already-extracted text. Returns a preview.
    pub fn upload_text(&mut self, text: String) -> Result<String, SessionError> {
        self.ensure_can_upload()?;
        let text = require_text(text)?;
        let preview = preview(&text);
        self.apply(Event::Uploaded(text))?;
        Ok(preview)
    }

    /// Parses the uploaded text into a profile and persists it.
    pub async fn parse(&mut self) -> Result<&Profile, SessionError> {
        let raw_text = self
            .state
            .raw_text()
            .ok_or_else(|| self.state.reject("parse"))?
            .to_string();

        let profile = parse_profile(&raw_text, self.generator.as_ref()).await?;
        self.apply(Event::Parsed(profile))?;
        self.current_profile("parse")
    }

    /// Rewrites experience descriptions toward `job_description` and persists.
    pub async fn retarget(&mut self, job_description: &str) -> Result<&Profile, SessionError> {
        let current = match &self.state {
            SessionState::Ready { profile } => profile.experience.clone(),
            other => return Err(other.reject("retarget").into()),
        };

        let updated = retarget_experience(
            job_description,
            &current,
            self.generator.as_ref(),
            self.policy,
        )
        .await?;
        self.apply(Event::Retargeted(updated))?;
        self.current_profile("retarget")
    }

    pub fn begin_edit(&mut self) -> Result<&Profile, SessionError> {
        self.apply(Event::EditBegun)?;
        self.current_profile("begin editing")
    }

    /// Replaces the whole profile with the edited one and persists it.
    pub fn save_edit(&mut self, profile: Profile) -> Result<&Profile, SessionError> {
        self.apply(Event::EditSaved(profile))?;
        self.current_profile("save edits")
    }

    pub fn cancel_edit(&mut self) -> Result<&Profile, SessionError> {
        self.apply(Event::EditCancelled)?;
        self.current_profile("cancel editing")
    }

    /// Drops the in-memory profile. The durable file is left for the next parse to
    /// overwrite.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.apply(Event::Reset)
    }

    /// The current profile as pretty JSON, same shape as the durable file.
    pub fn export(&self) -> Result<String, SessionError> {
        let profile = self.current_profile("export")?;
        serde_json::to_string_pretty(profile).map_err(SessionError::Export)
    }

    pub fn markdown(&self) -> Result<String, SessionError> {
        Ok(render_profile_to_md(self.current_profile("render")?))
    }

    fn ensure_can_upload(&self) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Empty | SessionState::Uploaded { .. } => Ok(()),
            _ => Err(self.state.reject("upload")),
        }
    }

    fn current_profile(&self, action: &'static str) -> Result<&Profile, SessionError> {
        self.state
            .profile()
            .ok_or_else(|| self.state.reject(action).into())
    }

    fn apply(&mut self, event: Event) -> Result<(), SessionError> {
        let persist = event.persists();
        let action = event.name();
        let next = transition(&self.state, event)?;

        if persist {
            if let Some(profile) = next.profile() {
                if let Err(e) = self.store.save(profile) {
                    warn!("Could not persist after {action}; keeping previous state: {e}");
                    return Err(e.into());
                }
            }
        }

        info!("Session {} -> {} ({action})", self.state.phase(), next.phase());
        self.state = next;
        Ok(())
    }
}
