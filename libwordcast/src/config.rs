//! Configuration management for Wordcast
//!
//! Non-secret settings come from an optional TOML file. Secrets and a few
//! deployment overrides come from the environment and are read once at
//! startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::history::HistoryFormat;

pub const DEFAULT_TEMPLATE: &str =
    "Word of the day: {word}\n\nMeaning: {meaning}\n\nExample: {example}";
pub const DEFAULT_HASHTAGS: &str = "#vocabulary #spellbee";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 100,
            temperature: None,
            max_attempts: 3,
            retry_delay_secs: 5,
            timeout_secs: 30,
        }
    }
}

impl GeneratorConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// JSON array of words in a local file
    #[default]
    Json,
    /// One word per line in a local file
    Lines,
    /// File stored in a GitHub repository via the contents API
    Github,
}

impl std::fmt::Display for HistoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryBackend::Json => write!(f, "json"),
            HistoryBackend::Lines => write!(f, "lines"),
            HistoryBackend::Github => write!(f, "github"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    /// Local file path, or the path inside the repository for `github`
    pub path: Option<String>,
    /// `owner/repo`, only used by the `github` backend
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub commit_message: String,
    pub api_url: String,
    /// Encoding of the remote file; local backends imply their own
    pub format: Option<HistoryFormat>,
    pub timeout_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::Json,
            path: None,
            repository: None,
            branch: None,
            commit_message: "Update tweeted words".to_string(),
            api_url: "https://api.github.com".to_string(),
            format: None,
            timeout_secs: 30,
        }
    }
}

impl HistoryConfig {
    /// The history file location with the backend's default filled in
    pub fn resolved_path(&self) -> String {
        match &self.path {
            Some(path) if self.backend == HistoryBackend::Github => path.clone(),
            Some(path) => shellexpand::tilde(path).to_string(),
            None => match self.format() {
                HistoryFormat::Json => "tweeted_words.json".to_string(),
                HistoryFormat::Lines => "tweeted_words.txt".to_string(),
            },
        }
    }

    /// Encoding of the history file
    pub fn format(&self) -> HistoryFormat {
        match self.backend {
            HistoryBackend::Json => HistoryFormat::Json,
            HistoryBackend::Lines => HistoryFormat::Lines,
            HistoryBackend::Github => self.format.unwrap_or(HistoryFormat::Json),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Split `owner/repo` into its two parts
    pub fn owner_and_repo(&self) -> Result<(String, String)> {
        let repository = self
            .repository
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("GITHUB_REPOSITORY".to_string()))?;

        match repository.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok((owner.to_string(), repo.to_string()))
            }
            _ => Err(ConfigError::InvalidValue {
                field: "history.repository".to_string(),
                reason: format!("expected 'owner/repo', got '{}'", repository),
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Layout with `{word}`, `{meaning}` and `{example}` placeholders
    pub template: String,
    /// Appended after a blank line
    pub hashtags: String,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            hashtags: DEFAULT_HASHTAGS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub endpoint: String,
    pub character_limit: usize,
    pub timeout_secs: u64,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.x.com/2/tweets".to_string(),
            character_limit: 280,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, `WORDCAST_CONFIG`, or the
    /// default location
    ///
    /// An explicitly requested file must exist. The default location is
    /// optional and falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::load_from_path(path)?
        } else if let Ok(path) = std::env::var("WORDCAST_CONFIG") {
            Self::load_from_path(&PathBuf::from(shellexpand::tilde(&path).to_string()))?
        } else {
            match resolve_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path)?,
                _ => Self::default(),
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Apply `HISTORY_FILE` and `GITHUB_REPOSITORY` overrides
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("HISTORY_FILE").filter(|v| !v.is_empty()) {
            self.history.path = Some(path);
        }
        if let Some(repository) = lookup("GITHUB_REPOSITORY").filter(|v| !v.is_empty()) {
            self.history.repository = Some(repository);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.generator.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if let Some(format) = self.history.format {
            if format != self.history.format() {
                return Err(ConfigError::InvalidValue {
                    field: "history.format".to_string(),
                    reason: format!(
                        "'{}' conflicts with the '{}' backend",
                        format, self.history.backend
                    ),
                }
                .into());
            }
        }
        if self.history.backend == HistoryBackend::Github {
            self.history.owner_and_repo()?;
        }
        Ok(())
    }
}

/// Resolve the default configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wordcast").join("config.toml"))
}

/// Consumer and access credentials for the X API
pub struct TwitterCredentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_secret: SecretString,
}

/// Secrets read from the environment
pub struct Credentials {
    pub openai_api_key: SecretString,
    pub twitter: Option<TwitterCredentials>,
    pub github_token: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env(require_twitter: bool) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), require_twitter)
    }

    /// Read credentials through `lookup`
    ///
    /// Posting credentials are only required when `require_twitter` is set;
    /// otherwise they are picked up if all four are present.
    pub fn from_lookup<F>(lookup: F, require_twitter: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key)
                .map(SecretString::from)
                .ok_or_else(|| ConfigError::MissingField(key.to_string()))
        };

        let openai_api_key = require("OPENAI_API_KEY")?;

        let twitter = if require_twitter {
            Some(TwitterCredentials {
                consumer_key: require("API_KEY")?,
                consumer_secret: require("API_SECRET")?,
                access_token: require("ACCESS_TOKEN")?,
                access_secret: require("ACCESS_SECRET")?,
            })
        } else {
            match (
                get("API_KEY"),
                get("API_SECRET"),
                get("ACCESS_TOKEN"),
                get("ACCESS_SECRET"),
            ) {
                (Some(key), Some(secret), Some(token), Some(token_secret)) => {
                    Some(TwitterCredentials {
                        consumer_key: key.into(),
                        consumer_secret: secret.into(),
                        access_token: token.into(),
                        access_secret: token_secret.into(),
                    })
                }
                _ => None,
            }
        };

        let github_token = get("GITHUB_TOKEN").map(SecretString::from);

        Ok(Self {
            openai_api_key,
            twitter,
            github_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const ALL: &[(&str, &str)] = &[
        ("OPENAI_API_KEY", "sk-test"),
        ("API_KEY", "ck"),
        ("API_SECRET", "cs"),
        ("ACCESS_TOKEN", "at"),
        ("ACCESS_SECRET", "as"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generator.model, "gpt-3.5-turbo");
        assert_eq!(config.generator.max_tokens, 100);
        assert_eq!(config.generator.max_attempts, 3);
        assert_eq!(config.generator.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.history.backend, HistoryBackend::Json);
        assert_eq!(config.history.resolved_path(), "tweeted_words.json");
        assert_eq!(config.post.hashtags, "#vocabulary #spellbee");
        assert_eq!(config.twitter.character_limit, 280);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
[generator]
model = "gpt-4o-mini"
temperature = 0.9

[history]
backend = "lines"
"#,
        )
        .unwrap();

        assert_eq!(config.generator.model, "gpt-4o-mini");
        assert_eq!(config.generator.temperature, Some(0.9));
        assert_eq!(config.generator.max_attempts, 3);
        assert_eq!(config.history.backend, HistoryBackend::Lines);
        assert_eq!(config.history.resolved_path(), "tweeted_words.txt");
        assert_eq!(config.post.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
[history]
backend = "sqlite"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
[post]
hashtags = "#words"
"##,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.post.hashtags, "#words");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = Config::load_from_path(Path::new("/nonexistent/wordcast.toml"));
        assert!(matches!(
            result,
            Err(crate::WordcastError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("HISTORY_FILE", "words.json"),
            ("GITHUB_REPOSITORY", "someone/bot"),
        ]));
        assert_eq!(config.history.path.as_deref(), Some("words.json"));
        assert_eq!(config.history.repository.as_deref(), Some("someone/bot"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("HISTORY_FILE", "")]));
        assert!(config.history.path.is_none());
    }

    #[test]
    fn test_owner_and_repo() {
        let mut history = HistoryConfig {
            backend: HistoryBackend::Github,
            repository: Some("someone/bot".to_string()),
            ..Default::default()
        };
        assert_eq!(
            history.owner_and_repo().unwrap(),
            ("someone".to_string(), "bot".to_string())
        );

        history.repository = Some("not-a-repo".to_string());
        assert!(history.owner_and_repo().is_err());

        history.repository = None;
        assert!(matches!(
            history.owner_and_repo(),
            Err(crate::WordcastError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[test]
    fn test_history_format_selection() {
        let config: Config = toml::from_str(
            r#"
[history]
backend = "github"
repository = "someone/bot"
format = "lines"
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.history.format(), HistoryFormat::Lines);
        assert_eq!(config.history.resolved_path(), "tweeted_words.txt");
        assert_eq!(config.history.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());

        let defaults = HistoryConfig::default();
        assert_eq!(defaults.format(), HistoryFormat::Json);
        assert_eq!(defaults.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_conflicting_format() {
        let mut config = Config::default();
        config.history.backend = HistoryBackend::Lines;
        config.history.format = Some(HistoryFormat::Json);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("history.format"));

        config.history.format = Some(HistoryFormat::Lines);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.generator.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_github_requires_repository() {
        let mut config = Config::default();
        config.history.backend = HistoryBackend::Github;
        assert!(config.validate().is_err());

        config.history.repository = Some("someone/bot".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_all_present() {
        let creds = Credentials::from_lookup(lookup_from(ALL), true).unwrap();
        assert_eq!(creds.openai_api_key.expose_secret(), "sk-test");
        let twitter = creds.twitter.unwrap();
        assert_eq!(twitter.consumer_key.expose_secret(), "ck");
        assert_eq!(twitter.access_secret.expose_secret(), "as");
        assert!(creds.github_token.is_none());
    }

    #[test]
    fn test_credentials_missing_openai_key() {
        let result = Credentials::from_lookup(lookup_from(&ALL[1..]), true);
        match result {
            Err(crate::WordcastError::Config(ConfigError::MissingField(field))) => {
                assert_eq!(field, "OPENAI_API_KEY")
            }
            _ => panic!("Expected missing OPENAI_API_KEY"),
        }
    }

    #[test]
    fn test_credentials_missing_twitter_secret() {
        let pairs: Vec<(&str, &str)> = ALL
            .iter()
            .copied()
            .filter(|(k, _)| *k != "ACCESS_SECRET")
            .collect();

        let result = Credentials::from_lookup(lookup_from(&pairs), true);
        match result {
            Err(crate::WordcastError::Config(ConfigError::MissingField(field))) => {
                assert_eq!(field, "ACCESS_SECRET")
            }
            _ => panic!("Expected missing ACCESS_SECRET"),
        }

        // Not required: no error, no posting credentials
        let creds = Credentials::from_lookup(lookup_from(&pairs), false).unwrap();
        assert!(creds.twitter.is_none());
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let result = Credentials::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")]), false);
        assert!(result.is_err());
    }
}
