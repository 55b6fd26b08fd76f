//! Publishing platforms
//!
//! A [`Platform`] turns composed text into a published post and reports the
//! platform's identifier for it.
//!
//! # Examples
//!
//! ```no_run
//! use libwordcast::platforms::{Platform, mock::MockPlatform};
//!
//! # async fn example() -> libwordcast::error::Result<()> {
//! let platform = MockPlatform::success("mock");
//!
//! if let Some(limit) = platform.character_limit() {
//!     println!("{} allows {} characters", platform.name(), limit);
//! }
//!
//! let post_id = platform.publish("Word of the day: Luminous").await?;
//! println!("Posted: {}", post_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::{PlatformError, Result};

pub mod mock;
pub mod oauth;
pub mod twitter;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Post content to the platform
    ///
    /// Returns the platform-specific post ID.
    ///
    /// # Errors
    ///
    /// - `PlatformError::Authentication` if the credentials are rejected
    /// - `PlatformError::Posting` if the platform refuses the post
    /// - `PlatformError::Network` for transport failures
    /// - `PlatformError::RateLimit` when throttled
    async fn post(&self, content: &str) -> Result<String>;

    /// Validate content before posting
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` if the content fails validation
    fn validate_content(&self, content: &str) -> Result<()> {
        validate_length(content, self.character_limit())
    }

    /// Lowercase identifier for the platform (e.g. "twitter")
    fn name(&self) -> &str;

    /// Maximum number of characters in a post, or `None` if unlimited
    fn character_limit(&self) -> Option<usize>;

    /// Validate and post in one step
    async fn publish(&self, content: &str) -> Result<String> {
        self.validate_content(content)?;
        self.post(content).await
    }
}

/// Reject empty content and content over `limit` characters
pub fn validate_length(content: &str, limit: Option<usize>) -> Result<()> {
    if content.trim().is_empty() {
        return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
    }

    if let Some(limit) = limit {
        let length = content.chars().count();
        if length > limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds {} character limit (got {} characters)",
                limit, length
            ))
            .into());
        }
    }

    Ok(())
}
