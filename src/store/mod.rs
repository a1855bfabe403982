//! Saving generated images
//!
//! `download()` hands the current image locator to an [`ImageStore`]. The
//! local store writes into a directory; the mock records what it was given.

pub mod local;
pub mod mock;

pub use local::LocalImageStore;
pub use mock::MockImageStore;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image behind `locator` as `filename`. Returns where it
    /// ended up.
    async fn save(&self, filename: &str, locator: &str) -> Result<String>;
}
