//! Audio session negotiation.
//!
//! Before capture starts the pipeline asks the platform for a session
//! category.  This is best-effort: a rejected category is logged and the
//! pipeline carries on with whatever the platform gives it.

use cpal::traits::HostTrait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SessionCategory
// ---------------------------------------------------------------------------

/// How the application intends to use the audio hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCategory {
    /// Simultaneous input and output.  The chain's muted output needs an
    /// output route on platforms that pull the graph from the speaker side.
    PlayAndRecord,
    /// Input only.
    Record,
    /// No particular requirements.
    Ambient,
}

impl SessionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SessionCategory::PlayAndRecord => "play-and-record",
            SessionCategory::Record => "record",
            SessionCategory::Ambient => "ambient",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// The platform refused a session category.  Never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("session category {} rejected: {reason}", .category.label())]
    CategoryRejected {
        category: SessionCategory,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// AudioSession
// ---------------------------------------------------------------------------

/// Platform hook for session/category negotiation.
pub trait AudioSession: Send + Sync {
    fn configure(&self, category: SessionCategory) -> Result<(), SessionError>;
}

/// [`AudioSession`] backed by the default cpal host.
///
/// Desktop hosts have no session object, so this only verifies that the
/// devices the category needs are present.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSession;

impl AudioSession for HostSession {
    fn configure(&self, category: SessionCategory) -> Result<(), SessionError> {
        let host = cpal::default_host();
        let reject = |reason: &str| SessionError::CategoryRejected {
            category,
            reason: reason.to_string(),
        };

        match category {
            SessionCategory::PlayAndRecord => {
                if host.default_input_device().is_none() {
                    return Err(reject("no default input device"));
                }
                if host.default_output_device().is_none() {
                    return Err(reject("no default output device"));
                }
            }
            SessionCategory::Record => {
                if host.default_input_device().is_none() {
                    return Err(reject("no default input device"));
                }
            }
            SessionCategory::Ambient => {}
        }

        log::debug!(
            "audio session configured: {} on host {:?}",
            category.label(),
            host.id()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_always_succeeds() {
        assert_eq!(HostSession.configure(SessionCategory::Ambient), Ok(()));
    }

    #[test]
    fn rejection_message_names_category() {
        let err = SessionError::CategoryRejected {
            category: SessionCategory::PlayAndRecord,
            reason: "no default output device".into(),
        };
        assert_eq!(
            err.to_string(),
            "session category play-and-record rejected: no default output device"
        );
    }
}
