//! Scripted text service for testing
//!
//! Replays a fixed list of replies in order, so tests can drive the word
//! generator and the run orchestration without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ChatMessage, TextService};
use crate::error::GeneratorError;

/// Shared view of how many requests a scripted service has received
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ScriptedTextService {
    replies: Mutex<VecDeque<Result<String, GeneratorError>>>,
    calls: CallCounter,
    prompts: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedTextService {
    pub fn new(replies: Vec<Result<String, GeneratorError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: CallCounter::default(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A service that answers successfully with each text in turn
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }

    /// Every message list the service was called with
    pub fn prompt_log(&self) -> Arc<Mutex<Vec<Vec<ChatMessage>>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl TextService for ScriptedTextService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError> {
        self.calls.increment();
        self.prompts.lock().unwrap().push(messages.to_vec());

        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GeneratorError::Transport(format!(
                "no scripted reply left (call {})",
                self.calls.get()
            )))
        })
    }
}
