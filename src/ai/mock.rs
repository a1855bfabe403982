use super::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One prompt pair received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub negative_prompt: String,
}

enum ScriptedResponse {
    Locator(String),
    Failure(String),
}

/// Scripted stand-in for the remote provider.
///
/// Responses are consumed in order; once the script runs out a tiny
/// placeholder data URL is returned. Clones share state so a test can keep a
/// probe after handing the client to the orchestrator.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    gate: Option<Arc<Notify>>,
}

const DEFAULT_LOCATOR: &str = "data:image/png;base64,iVBORw0KGgo=";

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn with_image_response(self, locator: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Locator(locator.into()));
        self
    }

    /// Queue a failure. An empty message simulates an error with no
    /// description.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Failure(message.into()));
        self
    }

    /// Hold every call open until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str, negative_prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            negative_prompt: negative_prompt.to_string(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(ScriptedResponse::Locator(locator)) => Ok(locator),
            Some(ScriptedResponse::Failure(message)) => Err(Error::AiProvider(message)),
            None => Ok(DEFAULT_LOCATOR.to_string()),
        }
    }
}
