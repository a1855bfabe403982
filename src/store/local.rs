use super::ImageStore;
use crate::{locator, Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes images into a local directory, creating it on first save.
pub struct LocalImageStore {
    output_dir: PathBuf,
    client: reqwest::Client,
}

impl LocalImageStore {
    pub fn new(output_dir: &Path) -> Self {
        Self::new_with_client(output_dir, reqwest::Client::new())
    }

    pub fn new_with_client(output_dir: &Path, client: reqwest::Client) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            client,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn resolve_bytes(&self, locator: &str) -> Result<Vec<u8>> {
        if locator::is_data_url(locator) {
            return Ok(locator::parse_data_url(locator)?.data);
        }

        if locator.starts_with("http://") || locator.starts_with("https://") {
            let response = self.client.get(locator).send().await?.error_for_status()?;
            return Ok(response.bytes().await?.to_vec());
        }

        Err(Error::Decode(format!(
            "Unsupported image locator scheme: {}",
            locator.split(':').next().unwrap_or_default()
        )))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, filename: &str, locator: &str) -> Result<String> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(Error::Generic(format!("Invalid file name: '{}'", filename)));
        }

        let bytes = self.resolve_bytes(locator).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("Saved image ({} bytes) to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}
