//! Session state machine. `transition` is a pure function of (state, event), so the
//! controller's sequencing can be tested without any service or file behind it.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::profile::{ExperienceEntry, Profile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Empty,
    /// Raw text captured, not yet parsed.
    Uploaded { raw_text: String },
    Ready { profile: Profile },
    /// Ready, with a manual-edit overlay active.
    Editing { profile: Profile },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Uploaded,
    Ready,
    Editing,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::Empty => "empty",
            SessionPhase::Uploaded => "uploaded",
            SessionPhase::Ready => "ready",
            SessionPhase::Editing => "editing",
        })
    }
}

/// The outcome of a user action, ready to be folded into the state.
#[derive(Debug, Clone)]
pub enum Event {
    Uploaded(String),
    Parsed(Profile),
    Retargeted(Vec<ExperienceEntry>),
    EditBegun,
    EditSaved(Profile),
    EditCancelled,
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Uploaded(_) => "upload",
            Event::Parsed(_) => "parse",
            Event::Retargeted(_) => "retarget",
            Event::EditBegun => "begin editing",
            Event::EditSaved(_) => "save edits",
            Event::EditCancelled => "cancel editing",
            Event::Reset => "reset",
        }
    }

    /// Whether the resulting profile must reach the durable store before the new
    /// state is committed.
    pub fn persists(&self) -> bool {
        matches!(
            self,
            Event::Parsed(_) | Event::Retargeted(_) | Event::EditSaved(_)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while the session is {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Empty => SessionPhase::Empty,
            SessionState::Uploaded { .. } => SessionPhase::Uploaded,
            SessionState::Ready { .. } => SessionPhase::Ready,
            SessionState::Editing { .. } => SessionPhase::Editing,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Ready { profile } | SessionState::Editing { profile } => Some(profile),
            _ => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            SessionState::Uploaded { raw_text } => Some(raw_text),
            _ => None,
        }
    }

    /// Error for attempting `action` from the current phase.
    pub fn reject(&self, action: &'static str) -> TransitionError {
        TransitionError::InvalidTransition {
            phase: self.phase(),
            action,
        }
    }
}

/// Computes the state that follows `event`. The current state is never modified.
pub fn transition(state: &SessionState, event: Event) -> Result<SessionState, TransitionError> {
    use SessionState::*;

    match (state, event) {
        (_, Event::Reset) => Ok(Empty),
        (Empty | Uploaded { .. }, Event::Uploaded(raw_text)) => Ok(Uploaded { raw_text }),
        (Uploaded { .. }, Event::Parsed(profile)) => Ok(Ready { profile }),
        (Ready { profile }, Event::Retargeted(experience)) => {
            let mut profile = profile.clone();
            profile.experience = experience;
            Ok(Ready { profile })
        }
        (Ready { profile }, Event::EditBegun) => Ok(Editing {
            profile: profile.clone(),
        }),
        (Editing { .. }, Event::EditSaved(profile)) => Ok(Ready { profile }),
        (Editing { profile }, Event::EditCancelled) => Ok(Ready {
            profile: profile.clone(),
        }),
        (state, event) => Err(state.reject(event.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::fixtures::{acme_engineer, jane_doe};

    fn ready() -> SessionState {
        SessionState::Ready {
            profile: jane_doe(),
        }
    }

    #[test]
    fn test_upload_from_empty() {
        let next = transition(&SessionState::Empty, Event::Uploaded("text".into())).unwrap();
        assert_eq!(next.raw_text(), Some("text"));
        assert_eq!(next.phase(), SessionPhase::Uploaded);
    }

    #[test]
    fn test_reupload_replaces_text() {
        let uploaded = SessionState::Uploaded {
            raw_text: "old".into(),
        };
        let next = transition(&uploaded, Event::Uploaded("new".into())).unwrap();
        assert_eq!(next.raw_text(), Some("new"));
    }

    #[test]
    fn test_parse_moves_to_ready() {
        let uploaded = SessionState::Uploaded {
            raw_text: "x".into(),
        };
        let next = transition(&uploaded, Event::Parsed(jane_doe())).unwrap();
        assert_eq!(next.profile(), Some(&jane_doe()));
    }

    #[test]
    fn test_retarget_replaces_only_experience() {
        let next = transition(&ready(), Event::Retargeted(vec![acme_engineer()])).unwrap();
        let profile = next.profile().unwrap();
        assert_eq!(profile.experience, vec![acme_engineer()]);
        let mut expected = jane_doe();
        expected.experience = vec![acme_engineer()];
        assert_eq!(profile, &expected);
    }

    #[test]
    fn test_edit_cycle() {
        let editing = transition(&ready(), Event::EditBegun).unwrap();
        assert_eq!(editing.phase(), SessionPhase::Editing);

        let mut edited = jane_doe();
        edited.summary = "changed".into();
        let saved = transition(&editing, Event::EditSaved(edited.clone())).unwrap();
        assert_eq!(saved, SessionState::Ready { profile: edited });

        let cancelled = transition(&editing, Event::EditCancelled).unwrap();
        assert_eq!(cancelled, ready());
    }

    #[test]
    fn test_reset_from_every_state() {
        for state in [
            SessionState::Empty,
            SessionState::Uploaded {
                raw_text: "x".into(),
            },
            ready(),
            SessionState::Editing {
                profile: jane_doe(),
            },
        ] {
            assert_eq!(transition(&state, Event::Reset).unwrap(), SessionState::Empty);
        }
    }

    #[test]
    fn test_invalid_pairs_are_rejected() {
        let cases = [
            (SessionState::Empty, Event::Parsed(jane_doe())),
            (SessionState::Empty, Event::EditBegun),
            (ready(), Event::Uploaded("x".into())),
            (ready(), Event::Parsed(jane_doe())),
            (ready(), Event::EditSaved(jane_doe())),
            (
                SessionState::Editing {
                    profile: jane_doe(),
                },
                Event::Retargeted(vec![]),
            ),
            (
                SessionState::Uploaded {
                    raw_text: "x".into(),
                },
                Event::Retargeted(vec![]),
            ),
        ];
        for (state, event) in cases {
            let name = event.name();
            let err = transition(&state, event).unwrap_err();
            assert_eq!(
                err,
                TransitionError::InvalidTransition {
                    phase: state.phase(),
                    action: name
                }
            );
        }
    }

    #[test]
    fn test_persisting_events() {
        assert!(Event::Parsed(jane_doe()).persists());
        assert!(Event::Retargeted(vec![]).persists());
        assert!(Event::EditSaved(jane_doe()).persists());
        assert!(!Event::Uploaded(String::new()).persists());
        assert!(!Event::EditBegun.persists());
        assert!(!Event::EditCancelled.persists());
        assert!(!Event::Reset.persists());
    }

    #[test]
    fn test_error_message_names_action_and_phase() {
        let err = SessionState::Empty.reject("retarget");
        assert_eq!(err.to_string(), "cannot retarget while the session is empty");
    }
}
