//! Mock platform implementation for testing
//!
//! A configurable platform that can succeed or fail, and records what was
//! posted. Used by integration tests to exercise a full run without
//! credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name
    pub name: String,

    /// Whether posting should succeed
    pub post_succeeds: bool,

    /// Error to return on posting failure
    pub post_error: Option<PlatformError>,

    /// Character limit for validation
    pub character_limit: Option<usize>,

    /// Number of times post has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Posts that have been made (for verification)
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            post_succeeds: true,
            post_error: None,
            character_limit: None,
            post_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
///
/// Clones share their call counters and posted content.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails posting with `error`
    pub fn post_failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_succeeds: false,
            post_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock platform with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Get the number of times post was called
    pub fn post_call_count(&self) -> usize {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Get all content that was posted
    pub fn posted_content(&self) -> Vec<String> {
        self.config.posted_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn post(&self, content: &str) -> Result<String> {
        *self.config.post_call_count.lock().unwrap() += 1;

        if self.config.post_succeeds {
            self.config
                .posted_content
                .lock()
                .unwrap()
                .push(content.to_string());

            let post_id = format!("{}:mock-{}", self.config.name, uuid::Uuid::new_v4());
            Ok(post_id)
        } else {
            let error = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| PlatformError::Posting("Mock posting failed".to_string()));
            Err(error.into())
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
