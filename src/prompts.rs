//! Fixed prompt text and user-facing messages.

/// Appended to every trimmed user prompt before it is sent to the provider.
pub const STYLE_SUFFIX: &str = ", ultra-detailed digital art, cinematic lighting, vibrant colors, sharp focus, high resolution, masterpiece";

/// Pre-populates the exclusion input before the user edits it.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, deformed, watermark, text, signature, extra limbs, ugly";

/// Pre-populates the prompt input.
pub const DEFAULT_USER_PROMPT: &str = "A vibrant aurora borealis over a snowy mountain range";

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt to generate an image.";

pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Build the prompt sent to the provider. Returns `None` for blank input.
pub fn compose(user_prompt: &str) -> Option<String> {
    let trimmed = user_prompt.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{}{}", trimmed, STYLE_SUFFIX))
}
