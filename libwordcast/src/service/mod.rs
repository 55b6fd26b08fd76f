//! Service layer for Wordcast
//!
//! `WordcastService` runs one pass of the word-of-the-day workflow:
//!
//! 1. load the history (failures degrade to an empty history)
//! 2. generate a word that is not in it
//! 3. compose the post
//! 4. publish it
//! 5. record the word and save the history
//!
//! Every failure past configuration is turned into a [`RunOutcome`] and
//! logged; a failed publish never touches the history.
//!
//! # Example
//!
//! ```no_run
//! use libwordcast::config::{Config, Credentials};
//! use libwordcast::service::WordcastService;
//!
//! # async fn example() -> libwordcast::Result<()> {
//! let config = Config::load(None)?;
//! let credentials = Credentials::from_env(true)?;
//! let service = WordcastService::from_config(&config, credentials)?;
//!
//! let outcome = service.run().await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod outcome;

pub use outcome::RunOutcome;

use tracing::{error, info, warn};

use crate::composer::PostComposer;
use crate::config::{Config, Credentials};
use crate::error::{ConfigError, PlatformError, Result, WordcastError};
use crate::generator::openai::OpenAiClient;
use crate::generator::WordGenerator;
use crate::history::{self, HistoryStore};
use crate::platforms::twitter::TwitterClient;
use crate::platforms::Platform;
use crate::types::History;

pub struct WordcastService {
    store: Box<dyn HistoryStore>,
    generator: WordGenerator,
    composer: PostComposer,
    platform: Option<Box<dyn Platform>>,
}

impl WordcastService {
    /// Assemble a service from explicit parts
    ///
    /// Without a platform only [`WordcastService::dry_run`] is available.
    pub fn new(
        store: Box<dyn HistoryStore>,
        generator: WordGenerator,
        composer: PostComposer,
    ) -> Self {
        Self {
            store,
            generator,
            composer,
            platform: None,
        }
    }

    pub fn with_platform(mut self, platform: Box<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Build the production clients described by `config`
    ///
    /// The posting client is only created when posting credentials are
    /// present.
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self> {
        let store = history::from_config(config, &credentials)?;

        let text_service = OpenAiClient::new(&config.generator, credentials.openai_api_key)?;
        let generator = WordGenerator::new(Box::new(text_service))
            .with_max_attempts(config.generator.max_attempts)
            .with_retry_delay(config.generator.retry_delay());

        let composer = PostComposer::from_config(&config.post);

        let mut service = Self::new(store, generator, composer);
        if let Some(twitter) = credentials.twitter {
            service = service.with_platform(Box::new(TwitterClient::new(&config.twitter, twitter)?));
        }

        Ok(service)
    }

    /// Load the history, treating any failure as an empty history
    pub async fn load_history(&self) -> History {
        match self.store.load().await {
            Ok(history) => {
                info!(store = %self.store.describe(), words = history.len(), "Loaded history");
                history
            }
            Err(e) => {
                warn!(
                    store = %self.store.describe(),
                    error = %e,
                    "Could not load history, continuing with an empty one"
                );
                History::new()
            }
        }
    }

    /// Run the full workflow once
    ///
    /// # Errors
    ///
    /// Only fails when no publishing platform was configured. Every other
    /// problem is reported through the returned [`RunOutcome`].
    pub async fn run(&self) -> Result<RunOutcome> {
        let platform = self
            .platform
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("API_KEY".to_string()))?;

        let mut history = self.load_history().await;

        let Some(triple) = self.generator.generate(&history).await else {
            error!("No valid word found, skipping post");
            return Ok(RunOutcome::NoUniqueWord);
        };

        let text = self.composer.compose_triple(&triple);
        info!(word = %triple.word, platform = platform.name(), "Publishing post");

        let post_id = match platform.publish(&text).await {
            Ok(post_id) => post_id,
            Err(e) => {
                error!(word = %triple.word, error = %e, "Publishing failed, history left unchanged");
                return Ok(RunOutcome::PublishFailed {
                    word: triple.word,
                    error: into_platform_error(e),
                });
            }
        };
        info!(word = %triple.word, post_id = %post_id, "Post published");

        history.insert(&triple.word);
        let history_saved = match self.store.save(&history).await {
            Ok(()) => {
                info!(store = %self.store.describe(), words = history.len(), "History saved");
                true
            }
            Err(e) => {
                error!(
                    store = %self.store.describe(),
                    word = %triple.entry(),
                    error = %e,
                    "Post was published but the history could not be saved; the word may repeat"
                );
                false
            }
        };

        Ok(RunOutcome::Posted {
            word: triple.word,
            post_id,
            history_saved,
        })
    }

    /// Generate and compose a post without publishing or saving anything
    pub async fn dry_run(&self) -> RunOutcome {
        let history = self.load_history().await;

        let Some(triple) = self.generator.generate(&history).await else {
            error!("No valid word found");
            return RunOutcome::NoUniqueWord;
        };

        let text = self.composer.compose_triple(&triple);
        if let Some(platform) = self.platform.as_deref() {
            if let Err(e) = platform.validate_content(&text) {
                warn!(platform = platform.name(), error = %e, "Composed post would be rejected");
            }
        }

        RunOutcome::DryRun {
            word: triple.word,
            text,
        }
    }
}

fn into_platform_error(error: WordcastError) -> PlatformError {
    match error {
        WordcastError::Platform(e) => e,
        other => PlatformError::Posting(other.to_string()),
    }
}
