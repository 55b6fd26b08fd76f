//! Persistence of already-posted words
//!
//! Three interchangeable backends implement [`HistoryStore`]:
//!
//! - [`file::FileStore`] with [`HistoryFormat::Json`]: a JSON array of words
//! - [`file::FileStore`] with [`HistoryFormat::Lines`]: one word per line
//! - [`remote::RemoteStore`]: a file in a GitHub repository, updated through
//!   the contents API with the revision tag of the version it replaces
//!
//! Every `save` rewrites the whole store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Credentials, HistoryBackend};
use crate::error::{ConfigError, Result, StoreError};
use crate::types::History;

pub mod file;
pub mod memory;
pub mod remote;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the stored history
    ///
    /// A store that does not exist yet yields an empty history.
    async fn load(&self) -> Result<History>;

    /// Replace the stored history with `history`
    async fn save(&self, history: &History) -> Result<()>;

    /// Short description used in log messages
    fn describe(&self) -> String;
}

/// On-disk encoding of a history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    Json,
    Lines,
}

impl std::fmt::Display for HistoryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryFormat::Json => write!(f, "json"),
            HistoryFormat::Lines => write!(f, "lines"),
        }
    }
}

impl HistoryFormat {
    pub fn encode(&self, history: &History) -> Vec<u8> {
        match self {
            HistoryFormat::Json => {
                // A list of strings always serializes
                serde_json::to_vec(history.as_slice()).unwrap_or_else(|_| b"[]".to_vec())
            }
            HistoryFormat::Lines => {
                let mut out = String::new();
                for word in history.iter() {
                    out.push_str(word);
                    out.push('\n');
                }
                out.into_bytes()
            }
        }
    }

    /// Decode stored bytes, normalizing and de-duplicating the words
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<History, StoreError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| StoreError::Malformed(format!("not UTF-8: {}", e)))?;

        match self {
            HistoryFormat::Json => {
                if text.trim().is_empty() {
                    return Ok(History::new());
                }
                let words: Vec<String> = serde_json::from_str(text)
                    .map_err(|e| StoreError::Malformed(format!("expected a JSON list of words: {}", e)))?;
                Ok(words.iter().collect())
            }
            HistoryFormat::Lines => Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect()),
        }
    }
}

/// Build the store selected by the configuration
pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Box<dyn HistoryStore>> {
    let path = config.history.resolved_path();
    let format = config.history.format();

    let store: Box<dyn HistoryStore> = match config.history.backend {
        HistoryBackend::Json | HistoryBackend::Lines => Box::new(file::FileStore::new(path, format)),
        HistoryBackend::Github => {
            let token = credentials
                .github_token
                .as_ref()
                .ok_or_else(|| ConfigError::MissingField("GITHUB_TOKEN".to_string()))?;
            let (owner, repo) = config.history.owner_and_repo()?;
            let api = remote::GithubContents::new(
                &config.history.api_url,
                &owner,
                &repo,
                config.history.branch.clone(),
                token,
                config.history.timeout(),
            )?;
            Box::new(
                remote::RemoteStore::new(Box::new(api), path, format)
                    .with_commit_message(config.history.commit_message.clone()),
            )
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> History {
        ["luminous", "placid", "halcyon"].into_iter().collect()
    }

    #[test]
    fn test_json_encoding() {
        let bytes = HistoryFormat::Json.encode(&sample());
        assert_eq!(bytes, br#"["luminous","placid","halcyon"]"#.to_vec());
        assert_eq!(HistoryFormat::Json.decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_lines_encoding() {
        let bytes = HistoryFormat::Lines.encode(&sample());
        assert_eq!(bytes, b"luminous\nplacid\nhalcyon\n".to_vec());
        assert_eq!(HistoryFormat::Lines.decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_empty_history_encoding() {
        assert_eq!(HistoryFormat::Json.encode(&History::new()), b"[]".to_vec());
        assert!(HistoryFormat::Lines.encode(&History::new()).is_empty());
    }

    #[test]
    fn test_decode_normalizes_legacy_content() {
        let history = HistoryFormat::Json
            .decode(br#"["Luminous", "luminous", " Placid "]"#)
            .unwrap();
        assert_eq!(history.as_slice(), &["luminous".to_string(), "placid".to_string()]);

        let history = HistoryFormat::Lines
            .decode(b"Luminous\r\n\r\nLUMINOUS\nplacid")
            .unwrap();
        assert_eq!(history.as_slice(), &["luminous".to_string(), "placid".to_string()]);
    }

    #[test]
    fn test_decode_blank_json_is_empty() {
        assert!(HistoryFormat::Json.decode(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        assert!(matches!(
            HistoryFormat::Json.decode(br#"{"words": []}"#),
            Err(StoreError::Malformed(_))
        ));
        assert!(matches!(
            HistoryFormat::Json.decode(&[0xff, 0xfe]),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_config_github_requires_token() {
        let mut config = Config::default();
        config.history.backend = HistoryBackend::Github;
        config.history.repository = Some("someone/bot".to_string());
        let credentials = Credentials {
            openai_api_key: "sk".into(),
            twitter: None,
            github_token: None,
        };

        assert!(matches!(
            from_config(&config, &credentials),
            Err(crate::WordcastError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[test]
    fn test_from_config_selects_backend() {
        let mut config = Config::default();
        config.history.backend = HistoryBackend::Lines;
        config.history.path = Some("/tmp/words.txt".to_string());
        let credentials = Credentials {
            openai_api_key: "sk".into(),
            twitter: None,
            github_token: None,
        };

        let store = from_config(&config, &credentials).unwrap();
        assert_eq!(store.describe(), "lines file /tmp/words.txt");
    }
}
