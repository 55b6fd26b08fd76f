//! Wordcast - a word-of-the-day poster
//!
//! This library asks a generative-text service for a vocabulary word that
//! has not been posted before, formats it into a post, publishes it to X and
//! records the word in a history store.

pub mod composer;
pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{Result, WordcastError};
pub use service::{RunOutcome, WordcastService};
pub use types::{History, WordTriple};
