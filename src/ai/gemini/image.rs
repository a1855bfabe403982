use super::client::GeminiHttpClient;
use super::types::{PredictInstance, PredictParameters, PredictRequest, PredictResponse};
use crate::ai::{mime, ImageGenerationService};
use crate::{locator, Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

const OUTPUT_MIME_TYPE: &str = "image/jpeg";
const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Imagen client returning generated images as `data:` URLs.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
    aspect_ratio: String,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }

    /// Build from a fully configured HTTP client.
    pub fn from_http(http: GeminiHttpClient) -> Self {
        Self {
            http,
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: String) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    fn build_request(&self, prompt: &str, negative_prompt: &str) -> PredictRequest {
        let negative_prompt = negative_prompt.trim();
        PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                negative_prompt: (!negative_prompt.is_empty()).then(|| negative_prompt.to_string()),
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
                aspect_ratio: self.aspect_ratio.clone(),
            },
        }
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str, negative_prompt: &str) -> Result<String> {
        let request = self.build_request(prompt, negative_prompt);

        tracing::debug!(
            "Sending image request to Gemini (model: {}, aspect ratio: {})",
            self.http.model(),
            self.aspect_ratio
        );

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::AiProvider(
                    "Image generation failed. The prompt may have been blocked by safety filters."
                        .to_string(),
                )
            })?;

        let encoded = match prediction.bytes_base64_encoded {
            Some(encoded) if !encoded.is_empty() => encoded,
            _ => {
                let reason = prediction
                    .rai_filtered_reason
                    .unwrap_or_else(|| "No image data in Gemini response".to_string());
                return Err(Error::AiProvider(reason));
            }
        };

        // Decode once to reject corrupt payloads before they reach a renderer.
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Gemini base64 image: {}", e)))?;

        let mime_type = prediction
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| mime::detect_image_mime(&bytes).to_string());

        tracing::debug!(
            "Gemini returned image ({} bytes, mime_type: {})",
            bytes.len(),
            mime_type
        );

        Ok(locator::encode_data_url(&mime_type, &encoded))
    }
}
