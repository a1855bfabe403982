//! Request orchestration for a single generation session.
//!
//! The orchestrator owns the lifecycle state and is the only thing that
//! changes it. Presentation code reads the state through [`Orchestrator::state`]
//! or follows transitions through a [`watch::Receiver`] from
//! [`Orchestrator::subscribe`].

use crate::ai::gemini::GeminiHttpClient;
use crate::ai::{GeminiImageClient, ImageGenerationService};
use crate::models::{Config, GenerationRequest, LifecycleState};
use crate::prompts::{EMPTY_PROMPT_MESSAGE, FALLBACK_ERROR_MESSAGE};
use crate::store::{ImageStore, LocalImageStore};
use crate::{locator, Result};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives prompt submission and tracks the resulting lifecycle state.
pub struct Orchestrator {
    image_gen: Box<dyn ImageGenerationService>,
    store: Box<dyn ImageStore>,
    state: watch::Sender<LifecycleState>,
    request: Option<GenerationRequest>,
}

impl Orchestrator {
    /// Build an orchestrator from concrete service dependencies.
    ///
    /// This is primarily useful for tests and local harnesses that need to
    /// inject mocks.
    pub fn with_services(
        image_gen: Box<dyn ImageGenerationService>,
        store: Box<dyn ImageStore>,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            image_gen,
            store,
            state,
            request: None,
        }
    }

    /// Wire the Gemini client and a local image store from configuration.
    pub fn from_config(config: &Config) -> Self {
        info!("Image provider: Gemini (model: {})", config.image_model);

        let http = GeminiHttpClient::new(
            config.gemini_api_key.clone(),
            config.image_model.clone(),
            config.request_timeout,
        )
        .with_base_url(config.gemini_base_url.clone());
        let image_gen =
            GeminiImageClient::from_http(http).with_aspect_ratio(config.aspect_ratio.clone());

        Self::with_services(
            Box::new(image_gen),
            Box::new(LocalImageStore::new(&config.output_dir)),
        )
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Follow state transitions. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// The last request that passed validation, if the latest submission did.
    pub fn last_request(&self) -> Option<&GenerationRequest> {
        self.request.as_ref()
    }

    fn transition(&self, next: LifecycleState) {
        debug!("State transition: {:?} -> {:?}", *self.state.borrow(), next);
        // `send_replace` publishes even when nobody is subscribed.
        self.state.send_replace(next);
    }

    /// Validate, compose and send one generation request.
    ///
    /// Every outcome, including provider failures, ends up in the lifecycle
    /// state; nothing is returned to the caller.
    pub async fn submit(&mut self, user_prompt: &str, exclusion_prompt: &str) {
        let Some(request) = GenerationRequest::new(user_prompt, exclusion_prompt) else {
            warn!("Rejected submission with an empty prompt");
            self.request = None;
            self.transition(LifecycleState::Failed(EMPTY_PROMPT_MESSAGE.to_string()));
            return;
        };

        self.transition(LifecycleState::Submitting);
        info!(
            "Submitting prompt ({} chars): {}",
            request.composed_prompt.len(),
            request.user_prompt
        );

        let outcome = self
            .image_gen
            .generate_image(&request.composed_prompt, &request.exclusion_prompt)
            .await;
        self.request = Some(request);

        match outcome {
            Ok(locator) => {
                info!("Image generated ({} byte locator)", locator.len());
                self.transition(LifecycleState::Succeeded(locator));
            }
            Err(e) => {
                warn!("Image generation failed: {}", e);
                let message = e
                    .user_message()
                    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
                self.transition(LifecycleState::Failed(message));
            }
        }
    }

    /// Save the current image under a timestamped file name.
    ///
    /// Returns `Ok(None)` without touching the store unless the state is
    /// `Succeeded`.
    pub async fn download(&self) -> Result<Option<String>> {
        let current = self.state.borrow().image_locator().map(str::to_string);
        let Some(current) = current else {
            debug!("Download requested with no generated image; ignoring");
            return Ok(None);
        };

        let filename = download_filename(Utc::now().timestamp_millis(), &current);
        let saved = self.store.save(&filename, &current).await?;
        info!("Downloaded image to {}", saved);
        Ok(Some(saved))
    }
}

fn download_filename(timestamp_millis: i64, current: &str) -> String {
    format!(
        "artify-ai-{}.{}",
        timestamp_millis,
        locator::file_extension(current)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageGenerationClient;
    use crate::prompts::STYLE_SUFFIX;
    use crate::store::MockImageStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    fn build(image_gen: MockImageGenerationClient) -> (Orchestrator, MockImageStore) {
        let store = MockImageStore::new();
        let orchestrator = Orchestrator::with_services(Box::new(image_gen), Box::new(store.clone()));
        (orchestrator, store)
    }

    /// Records the lifecycle state visible at the moment the provider is
    /// called, then settles immediately.
    struct StateProbeClient {
        observer: watch::Receiver<LifecycleState>,
        seen: Arc<Mutex<Vec<LifecycleState>>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageGenerationService for StateProbeClient {
        async fn generate_image(&self, _prompt: &str, _negative_prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(self.observer.borrow().clone());
            if self.fail {
                Err(crate::Error::AiProvider("boom".to_string()))
            } else {
                Ok("blob://probe".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let (orchestrator, _) = build(MockImageGenerationClient::new());
        assert_eq!(orchestrator.state(), LifecycleState::Idle);
        assert!(orchestrator.last_request().is_none());
    }

    #[tokio::test]
    async fn test_blank_prompt_fails_locally_without_remote_call() {
        let client = MockImageGenerationClient::new();
        let probe = client.clone();
        let (mut orchestrator, _) = build(client);

        for blank in ["", " ", "\t\n", "   \r\n  "] {
            orchestrator.submit(blank, "blurry").await;
            assert_eq!(
                orchestrator.state(),
                LifecycleState::Failed(EMPTY_PROMPT_MESSAGE.to_string())
            );
        }
        assert_eq!(probe.get_call_count(), 0);
        assert!(orchestrator.last_request().is_none());
    }

    #[tokio::test]
    async fn test_sends_trimmed_prompt_with_style_suffix() {
        let client = MockImageGenerationClient::new();
        let probe = client.clone();
        let (mut orchestrator, _) = build(client);

        orchestrator.submit("  a red fox  ", "blurry, text").await;
        orchestrator.submit("a red fox", "").await;

        let calls = probe.get_calls();
        assert_eq!(calls.len(), 2);
        for call in &calls {
            assert_eq!(call.prompt, format!("a red fox{}", STYLE_SUFFIX));
        }
        assert_eq!(calls[0].negative_prompt, "blurry, text");
        assert_eq!(calls[1].negative_prompt, "");

        let request = orchestrator.last_request().unwrap();
        assert_eq!(request.user_prompt, "a red fox");
    }

    #[tokio::test]
    async fn test_success_stores_locator() {
        let (mut orchestrator, _) =
            build(MockImageGenerationClient::new().with_image_response("blob://abc"));

        orchestrator.submit("a red fox", "blurry").await;

        assert_eq!(
            orchestrator.state(),
            LifecycleState::Succeeded("blob://abc".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_message_is_propagated() {
        let (mut orchestrator, _) =
            build(MockImageGenerationClient::new().with_failure("quota exceeded"));

        orchestrator.submit("a red fox", "").await;

        assert_eq!(
            orchestrator.state(),
            LifecycleState::Failed("quota exceeded".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let (mut orchestrator, _) = build(MockImageGenerationClient::new().with_failure(""));

        orchestrator.submit("a red fox", "").await;

        assert_eq!(
            orchestrator.state(),
            LifecycleState::Failed(FALLBACK_ERROR_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_submitting_is_observable_until_provider_settles() {
        let gate = Arc::new(Notify::new());
        let client = MockImageGenerationClient::new()
            .with_image_response("blob://abc")
            .with_gate(gate.clone());
        let probe = client.clone();
        let (mut orchestrator, _) = build(client);
        let mut rx = orchestrator.subscribe();

        let handle = tokio::spawn(async move {
            orchestrator.submit("a red fox", "blurry").await;
            orchestrator
        });

        rx.wait_for(|s| s.is_submitting()).await.unwrap();
        while probe.get_call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(*rx.borrow(), LifecycleState::Submitting);

        gate.notify_one();
        let orchestrator = handle.await.unwrap();

        assert_eq!(
            orchestrator.state(),
            LifecycleState::Succeeded("blob://abc".to_string())
        );
    }

    #[tokio::test]
    async fn test_submitting_precedes_instant_settlement_and_clears_prior_result() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = MockImageStore::new();
        let (state, _) = watch::channel(LifecycleState::Idle);
        let observer = state.subscribe();

        let mut orchestrator = Orchestrator {
            image_gen: Box::new(StateProbeClient {
                observer,
                seen: seen.clone(),
                fail: false,
            }),
            store: Box::new(store),
            state,
            request: None,
        };

        orchestrator.submit("first", "").await;
        orchestrator.submit("second", "").await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![LifecycleState::Submitting, LifecycleState::Submitting]
        );
        assert_eq!(
            orchestrator.state(),
            LifecycleState::Succeeded("blob://probe".to_string())
        );
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_goes_through_submitting() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (state, _) = watch::channel(LifecycleState::Failed("earlier".to_string()));
        let observer = state.subscribe();

        let mut orchestrator = Orchestrator {
            image_gen: Box::new(StateProbeClient {
                observer,
                seen: seen.clone(),
                fail: true,
            }),
            store: Box::new(MockImageStore::new()),
            state,
            request: None,
        };

        orchestrator.submit("a red fox", "").await;

        assert_eq!(*seen.lock().unwrap(), vec![LifecycleState::Submitting]);
        assert_eq!(orchestrator.state(), LifecycleState::Failed("boom".to_string()));
    }

    #[tokio::test]
    async fn test_download_is_noop_unless_succeeded() {
        let (mut orchestrator, store) =
            build(MockImageGenerationClient::new().with_failure("quota exceeded"));

        assert_eq!(orchestrator.download().await.unwrap(), None);

        orchestrator.submit("a red fox", "").await;
        assert_eq!(orchestrator.download().await.unwrap(), None);

        orchestrator.submit("", "").await;
        assert_eq!(orchestrator.download().await.unwrap(), None);

        assert_eq!(store.get_save_count(), 0);
    }

    #[tokio::test]
    async fn test_download_saves_with_timestamped_name() {
        let (mut orchestrator, store) =
            build(MockImageGenerationClient::new().with_image_response("blob://abc"));

        orchestrator.submit("a red fox", "blurry").await;
        let before = Utc::now().timestamp_millis();
        let saved = orchestrator.download().await.unwrap();
        let after = Utc::now().timestamp_millis();

        let saves = store.get_saved();
        assert_eq!(saves.len(), 1);
        let (filename, saved_locator) = &saves[0];
        assert_eq!(saved_locator, "blob://abc");
        assert_eq!(saved, Some(format!("mock://{}", filename)));

        let stamp: i64 = filename
            .strip_prefix("artify-ai-")
            .and_then(|rest| rest.strip_suffix(".jpeg"))
            .and_then(|digits| digits.parse().ok())
            .expect("timestamped filename");
        assert!(stamp >= before && stamp <= after);
    }

    #[tokio::test]
    async fn test_download_store_failure_is_returned() {
        let store = MockImageStore::new().with_failure(true);
        let mut orchestrator = Orchestrator::with_services(
            Box::new(MockImageGenerationClient::new()),
            Box::new(store),
        );

        orchestrator.submit("a red fox", "").await;
        assert!(orchestrator.download().await.is_err());
        assert!(orchestrator.state().image_locator().is_some());
    }

    #[test]
    fn test_download_filename_uses_locator_extension() {
        assert_eq!(
            download_filename(42, "data:image/png;base64,AAAA"),
            "artify-ai-42.png"
        );
        assert_eq!(download_filename(7, "blob://abc"), "artify-ai-7.jpeg");
    }
}
