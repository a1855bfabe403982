//! Image resource locators.
//!
//! The provider returns images as `data:` URLs so they can be handed
//! straight to a rendering surface. Saving needs the bytes back out.

use crate::ai::mime;
use crate::{Error, Result};
use base64::Engine as _;

/// Decoded contents of a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub fn encode_data_url(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

pub fn is_data_url(locator: &str) -> bool {
    locator.starts_with("data:")
}

pub fn parse_data_url(locator: &str) -> Result<DataUrl> {
    let rest = locator
        .strip_prefix("data:")
        .ok_or_else(|| Error::Decode("Locator is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Decode("Data URL has no payload separator".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Decode("Only base64 data URLs are supported".to_string()))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::Decode(format!("Failed to decode data URL payload: {}", e)))?;

    Ok(DataUrl {
        mime_type: if mime_type.is_empty() {
            mime::detect_image_mime(&data).to_string()
        } else {
            mime_type.to_string()
        },
        data,
    })
}

/// Extension to save the locator's image under. Falls back to `jpeg` for
/// anything that is not a data URL.
pub fn file_extension(locator: &str) -> &'static str {
    if !is_data_url(locator) {
        return "jpeg";
    }
    let mime_type = locator
        .trim_start_matches("data:")
        .split([';', ','])
        .next()
        .unwrap_or_default();
    mime::extension_for_mime(mime_type)
}
