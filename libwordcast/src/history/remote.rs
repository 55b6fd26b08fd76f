//! History stored as a file in a remote repository
//!
//! The GitHub contents API versions every file with a blob SHA. An update
//! must name the SHA it replaces, so [`RemoteStore::save`] fetches the
//! current one right before writing. Two runs racing each other can still
//! lose an update; the SHA check only narrows the window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{HistoryFormat, HistoryStore};
use crate::error::{Result, StoreError};
use crate::types::{History, RemoteFile};

const USER_AGENT: &str = concat!("wordcast/", env!("CARGO_PKG_VERSION"));
const GITHUB_API_VERSION: &str = "2022-11-28";

/// A remote content API with versioned files
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch a file, or `None` if it does not exist
    async fn fetch(&self, path: &str) -> std::result::Result<Option<RemoteFile>, StoreError>;

    /// Create (`sha == None`) or update a file
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> std::result::Result<(), StoreError>;

    fn describe(&self) -> String;
}

#[async_trait]
impl<T: ContentApi + ?Sized> ContentApi for Arc<T> {
    async fn fetch(&self, path: &str) -> std::result::Result<Option<RemoteFile>, StoreError> {
        (**self).fetch(path).await
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> std::result::Result<(), StoreError> {
        (**self).put(path, content, sha, message).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

pub struct RemoteStore {
    api: Box<dyn ContentApi>,
    path: String,
    format: HistoryFormat,
    commit_message: String,
}

impl RemoteStore {
    pub fn new(api: Box<dyn ContentApi>, path: impl Into<String>, format: HistoryFormat) -> Self {
        Self {
            api,
            path: path.into(),
            format,
            commit_message: "Update tweeted words".to_string(),
        }
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }
}

#[async_trait]
impl HistoryStore for RemoteStore {
    async fn load(&self) -> Result<History> {
        match self.api.fetch(&self.path).await? {
            Some(file) => Ok(self.format.decode(&file.content)?),
            None => {
                debug!(path = %self.path, "Remote history file does not exist yet");
                Ok(History::new())
            }
        }
    }

    async fn save(&self, history: &History) -> Result<()> {
        let current = self.api.fetch(&self.path).await?;
        let sha = current.as_ref().map(|file| file.sha.as_str());
        let content = self.format.encode(history);

        self.api
            .put(&self.path, &content, sha, &self.commit_message)
            .await?;

        match sha {
            Some(sha) => info!(path = %self.path, previous = %sha, "Updated remote history"),
            None => info!(path = %self.path, "Created remote history"),
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.api.describe(), self.path)
    }
}

/// GitHub repository contents API
pub struct GithubContents {
    http: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    branch: Option<String>,
    token: SecretString,
}

impl GithubContents {
    pub fn new(
        api_url: &str,
        owner: &str,
        repo: &str,
        branch: Option<String>,
        token: &SecretString,
        timeout: Duration,
    ) -> std::result::Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Remote(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch,
            token: SecretString::from(token.expose_secret().to_string()),
        })
    }

    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            self.owner,
            self.repo,
            encoded.join("/")
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

#[async_trait]
impl ContentApi for GithubContents {
    async fn fetch(&self, path: &str) -> std::result::Result<Option<RemoteFile>, StoreError> {
        let mut req = self.request(reqwest::Method::GET, path);
        if let Some(branch) = &self.branch {
            req = req.query(&[("ref", branch)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("GET {}: {}", path, e)))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Remote(format!("GET {}: {}", path, e)))?;

        if !status.is_success() {
            return Err(StoreError::Remote(format!(
                "GET {} returned {}: {}",
                path, status, body
            )));
        }

        decode_contents(&body).map(Some)
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> std::result::Result<(), StoreError> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(content),
            sha,
            branch: self.branch.as_deref(),
        };

        let resp = self
            .request(reqwest::Method::PUT, path)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("PUT {}: {}", path, e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }

    fn describe(&self) -> String {
        format!("github:{}/{}", self.owner, self.repo)
    }
}

/// Decode a contents API file response
fn decode_contents(body: &str) -> std::result::Result<RemoteFile, StoreError> {
    let response: ContentsResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Malformed(format!("unexpected contents response: {}", e)))?;

    // GitHub wraps the base64 payload every 60 characters
    let compact: String = response
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let content = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Malformed(format!("invalid base64 content: {}", e)))?;

    Ok(RemoteFile {
        content,
        sha: response.sha,
    })
}

#[derive(Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// A call observed by [`MemoryContentApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCall {
    Fetch(String),
    Create(String),
    Update { path: String, sha: String },
}

/// In-memory content API that enforces revision tags like GitHub does
///
/// Used by tests and for trying out the remote backend offline.
#[derive(Default)]
pub struct MemoryContentApi {
    files: Mutex<HashMap<String, RemoteFile>>,
    calls: Mutex<Vec<ContentCall>>,
    revision: Mutex<u64>,
}

impl MemoryContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file as if it had been committed earlier
    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        let sha = self.next_sha();
        self.files.lock().unwrap().insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                sha,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ContentCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<RemoteFile> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn next_sha(&self) -> String {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        format!("{:040x}", *revision)
    }
}

#[async_trait]
impl ContentApi for MemoryContentApi {
    async fn fetch(&self, path: &str) -> std::result::Result<Option<RemoteFile>, StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(ContentCall::Fetch(path.to_string()));
        Ok(self.file(path))
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        _message: &str,
    ) -> std::result::Result<(), StoreError> {
        let current = self.file(path).map(|file| file.sha);

        match (current.as_deref(), sha) {
            (None, None) => {
                self.calls
                    .lock()
                    .unwrap()
                    .push(ContentCall::Create(path.to_string()));
            }
            (Some(current), Some(sha)) if current == sha => {
                self.calls.lock().unwrap().push(ContentCall::Update {
                    path: path.to_string(),
                    sha: sha.to_string(),
                });
            }
            (Some(_), None) => {
                return Err(StoreError::Rejected {
                    status: 422,
                    body: "\"sha\" wasn't supplied.".to_string(),
                })
            }
            _ => {
                return Err(StoreError::Rejected {
                    status: 409,
                    body: format!("{} does not match", sha.unwrap_or_default()),
                })
            }
        }

        let sha = self.next_sha();
        self.files.lock().unwrap().insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                sha,
            },
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
