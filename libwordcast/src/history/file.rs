//! Local file history backend

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{HistoryFormat, HistoryStore};
use crate::error::{Result, StoreError};
use crate::types::History;

pub struct FileStore {
    path: PathBuf,
    format: HistoryFormat,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, format: HistoryFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl HistoryStore for FileStore {
    async fn load(&self) -> Result<History> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "History file does not exist yet");
                return Ok(History::new());
            }
            Err(e) => return Err(self.io_error(e).into()),
        };

        Ok(self.format.decode(&bytes)?)
    }

    async fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        // Write next to the target and rename so a crash never leaves half a file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, self.format.encode(history))
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error(e).into());
        }

        debug!(path = %self.path.display(), words = history.len(), "History saved");
        Ok(())
    }

    fn describe(&self) -> String {
        let kind = match self.format {
            HistoryFormat::Json => "json",
            HistoryFormat::Lines => "lines",
        };
        format!("{} file {}", kind, self.path.display())
    }
}
