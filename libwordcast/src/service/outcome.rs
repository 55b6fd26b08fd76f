//! Result of a single run

use std::fmt;

use crate::error::PlatformError;

/// What a run ended with
///
/// Every variant is a completed run from the process's point of view; the
/// binary exits successfully for all of them.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The post went out. `history_saved` is false when persisting failed
    /// after publishing.
    Posted {
        word: String,
        post_id: String,
        history_saved: bool,
    },

    /// No unused word was produced within the attempt budget
    NoUniqueWord,

    /// A word was generated but the platform refused or failed the post
    PublishFailed { word: String, error: PlatformError },

    /// The post was composed but not published
    DryRun { word: String, text: String },
}

impl RunOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, RunOutcome::Posted { .. })
    }

    /// The generated word, if the run got that far
    pub fn word(&self) -> Option<&str> {
        match self {
            RunOutcome::Posted { word, .. }
            | RunOutcome::PublishFailed { word, .. }
            | RunOutcome::DryRun { word, .. } => Some(word),
            RunOutcome::NoUniqueWord => None,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Posted {
                word,
                post_id,
                history_saved: true,
            } => write!(f, "Posted {} as {}", word, post_id),
            RunOutcome::Posted {
                word,
                post_id,
                history_saved: false,
            } => write!(
                f,
                "Posted {} as {} but the history was not saved",
                word, post_id
            ),
            RunOutcome::NoUniqueWord => write!(f, "No unique word found, nothing posted"),
            RunOutcome::PublishFailed { word, error } => {
                write!(f, "Failed to post '{}': {}", word, error)
            }
            RunOutcome::DryRun { text, .. } => write!(f, "{}", text),
        }
    }
}
