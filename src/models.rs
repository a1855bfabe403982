//! Data models and structures
//!
//! Defines the generation request, the lifecycle state machine values and
//! the runtime configuration.

use crate::prompts;
use std::path::PathBuf;
use std::time::Duration;

/// A validated prompt pair ready to be sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub user_prompt: String,
    pub exclusion_prompt: String,
    pub composed_prompt: String,
}

impl GenerationRequest {
    /// Returns `None` when `user_prompt` is blank after trimming.
    pub fn new(user_prompt: &str, exclusion_prompt: &str) -> Option<Self> {
        let composed_prompt = prompts::compose(user_prompt)?;
        Some(Self {
            user_prompt: user_prompt.trim().to_string(),
            exclusion_prompt: exclusion_prompt.to_string(),
            composed_prompt,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Idle,
    Submitting,
    /// Holds the image resource locator returned by the provider.
    Succeeded(String),
    /// Holds a human-readable error message.
    Failed(String),
}

/// What the presentation layer should show for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Placeholder,
    Loading,
    Error(&'a str),
    Image(&'a str),
}

impl LifecycleState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, LifecycleState::Submitting)
    }

    pub fn image_locator(&self) -> Option<&str> {
        match self {
            LifecycleState::Succeeded(locator) => Some(locator),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LifecycleState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn view(&self) -> View<'_> {
        match self {
            LifecycleState::Idle => View::Placeholder,
            LifecycleState::Submitting => View::Loading,
            LifecycleState::Succeeded(locator) => View::Image(locator),
            LifecycleState::Failed(message) => View::Error(message),
        }
    }
}

const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_ASPECT_RATIO: &str = "16:9";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OUTPUT_DIR: &str = "output";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub image_model: String,
    pub gemini_base_url: String,
    pub aspect_ratio: String,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment
    /// in production).
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(crate::Error::Config(
                        "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            gemini_api_key,
            image_model: non_empty("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            aspect_ratio: non_empty("IMAGE_ASPECT_RATIO")
                .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
            request_timeout,
            output_dir: non_empty("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }
}
