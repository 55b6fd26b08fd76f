//! In-memory history store for testing
//!
//! Clones share state, so a test can hand one clone to the run and inspect
//! the other afterwards. Loads and saves can be made to fail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::HistoryStore;
use crate::error::{Result, StoreError};
use crate::types::History;

#[derive(Debug, Default)]
struct State {
    history: History,
    fail_load: bool,
    fail_save: bool,
    save_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: &[&str]) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().history = words.iter().collect();
        store
    }

    /// Make every `load` fail
    pub fn failing_load(self) -> Self {
        self.state.lock().unwrap().fail_load = true;
        self
    }

    /// Make every `save` fail
    pub fn failing_save(self) -> Self {
        self.state.lock().unwrap().fail_save = true;
        self
    }

    /// The currently stored history
    pub fn snapshot(&self) -> History {
        self.state.lock().unwrap().history.clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().save_count
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn load(&self) -> Result<History> {
        let state = self.state.lock().unwrap();
        if state.fail_load {
            return Err(StoreError::Remote("mock load failure".to_string()).into());
        }
        Ok(state.history.clone())
    }

    async fn save(&self, history: &History) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_save {
            return Err(StoreError::Rejected {
                status: 409,
                body: "mock save failure".to_string(),
            }
            .into());
        }
        state.history = history.clone();
        state.save_count += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
