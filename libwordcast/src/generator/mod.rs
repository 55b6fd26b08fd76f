//! Word generation with a generative-text service
//!
//! [`WordGenerator`] asks a [`TextService`] for a word, its meaning and an
//! example sentence, and keeps asking until it gets a word that is not in
//! the history or runs out of attempts.
//!
//! ```no_run
//! use libwordcast::generator::{WordGenerator, mock::ScriptedTextService};
//! use libwordcast::types::History;
//!
//! # async fn example() {
//! let service = ScriptedTextService::from_texts(&[
//!     "Word: Luminous\nMeaning: full of light\nExample: The luminous moon lit the path.",
//! ]);
//! let generator = WordGenerator::new(Box::new(service));
//!
//! if let Some(triple) = generator.generate(&History::new()).await {
//!     println!("{}: {}", triple.word, triple.meaning);
//! }
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::GeneratorError;
use crate::types::{normalize, History, WordTriple};

pub mod mock;
pub mod openai;
pub mod parse;

pub use parse::parse_response;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const USER_PROMPT: &str =
    "Provide a unique, interesting word, its meaning, and an example sentence.";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// One role/content pair of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A generative-text backend
///
/// Implementations return the free-text content of the reply. Model,
/// output length and temperature belong to the implementation.
#[async_trait]
pub trait TextService: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError>;
}

/// What a single generation attempt produced
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// A parsed word that is not in the history
    Accepted(WordTriple),
    /// A parsed word that has been posted before
    Duplicate(String),
    /// The reply did not contain a usable word
    Unparsable(String),
    /// The request itself failed
    TransportFailed(GeneratorError),
}

pub struct WordGenerator {
    service: Box<dyn TextService>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl WordGenerator {
    pub fn new(service: Box<dyn TextService>) -> Self {
        Self {
            service,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the attempt budget (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay applied after a failed request before the next attempt
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run a single request and classify the reply
    pub async fn attempt(&self, history: &History) -> AttemptOutcome {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(USER_PROMPT)];

        let text = match self.service.complete(&messages).await {
            Ok(text) => text,
            Err(e) => return AttemptOutcome::TransportFailed(e),
        };
        debug!(response = %text, "Generative service replied");

        match parse_response(&text) {
            Some(triple) if history.contains(&triple.word) => {
                AttemptOutcome::Duplicate(normalize(&triple.word))
            }
            Some(triple) => AttemptOutcome::Accepted(triple),
            None => AttemptOutcome::Unparsable(text),
        }
    }

    /// Generate a word that is not in `history`
    ///
    /// Makes at most `max_attempts` requests. Returns `None` when every
    /// attempt failed, was a duplicate, or could not be parsed.
    pub async fn generate(&self, history: &History) -> Option<WordTriple> {
        for attempt in 1..=self.max_attempts {
            info!(attempt, max_attempts = self.max_attempts, "Requesting a new word");

            match self.attempt(history).await {
                AttemptOutcome::Accepted(triple) => {
                    info!(attempt, word = %triple.word, "Accepted word");
                    return Some(triple);
                }
                AttemptOutcome::Duplicate(word) => {
                    info!(attempt, word = %word, "Word was already posted, asking again");
                }
                AttemptOutcome::Unparsable(text) => {
                    warn!(attempt, response = %text, "Could not parse a word from the response");
                }
                AttemptOutcome::TransportFailed(e) => {
                    warn!(attempt, error = %e, "Generative service request failed");
                    if attempt < self.max_attempts && !self.retry_delay.is_zero() {
                        debug!(delay_secs = self.retry_delay.as_secs_f64(), "Waiting before retrying");
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!(
            attempts = self.max_attempts,
            "Failed to get a unique word after all attempts"
        );
        None
    }
}
