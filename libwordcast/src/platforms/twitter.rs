//! X (Twitter) platform implementation
//!
//! Uses the v2 create-post endpoint with OAuth 1.0a user-context signing.
//! The v1.1 `statuses/update` call is retired and not supported.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{TwitterConfig, TwitterCredentials};
use crate::error::{PlatformError, Result};
use crate::platforms::oauth::{authorization_header, OAuthKeys, OAuthNonce};
use crate::platforms::Platform;

/// Map an error response from the X API to PlatformError
fn map_status_error(status: StatusCode, body: &str) -> PlatformError {
    let detail = error_detail(body);

    match status {
        StatusCode::UNAUTHORIZED => PlatformError::Authentication(format!(
            "X rejected the credentials ({}): {}. Check API_KEY, API_SECRET, ACCESS_TOKEN and ACCESS_SECRET.",
            status.as_u16(),
            detail
        )),
        StatusCode::TOO_MANY_REQUESTS => PlatformError::RateLimit(format!(
            "X rate limit exceeded: {}",
            detail
        )),
        StatusCode::BAD_REQUEST => PlatformError::Validation(format!(
            "X rejected the post content: {}",
            detail
        )),
        _ => PlatformError::Posting(format!(
            "X rejected the post ({}): {}",
            status.as_u16(),
            detail
        )),
    }
}

/// Best human-readable message from an error body
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err
            .detail
            .or(err.title)
            .or_else(|| err.errors.into_iter().find_map(|e| e.message))
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

pub struct TwitterClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: TwitterCredentials,
    character_limit: usize,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig, credentials: TwitterCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            credentials,
            character_limit: config.character_limit,
        })
    }

    fn authorization(&self) -> String {
        let keys = OAuthKeys {
            consumer_key: self.credentials.consumer_key.expose_secret(),
            consumer_secret: self.credentials.consumer_secret.expose_secret(),
            token: self.credentials.access_token.expose_secret(),
            token_secret: self.credentials.access_secret.expose_secret(),
        };
        authorization_header("POST", &self.endpoint, &[], &keys, &OAuthNonce::generate())
    }
}

#[async_trait]
impl Platform for TwitterClient {
    async fn post(&self, content: &str) -> Result<String> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&CreatePostRequest { text: content })
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("X request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("X response could not be read: {}", e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, &body).into());
        }

        let post_id = parse_post_id(&body)?;
        debug!(post_id = %post_id, "Post created on X");
        Ok(post_id)
    }

    fn name(&self) -> &str {
        "twitter"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }
}

fn parse_post_id(body: &str) -> Result<String> {
    let response: CreatePostResponse = serde_json::from_str(body).map_err(|e| {
        PlatformError::Posting(format!("Unexpected create-post response ({}): {}", e, body))
    })?;
    Ok(response.data.id)
}

// --- API types ---

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    title: Option<String>,
    detail: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: Option<String>,
}
