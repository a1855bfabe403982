//! Remote image generation
//!
//! The orchestrator only depends on [`ImageGenerationService`]; the Gemini
//! client is the production implementation and the mock backs tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiImageClient;
pub use mock::MockImageGenerationClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Issue one generation request and return an image resource locator.
    ///
    /// `negative_prompt` may be empty.
    async fn generate_image(&self, prompt: &str, negative_prompt: &str) -> Result<String>;
}
