//! Artify - turns a text description into an image via a remote generator
//!
//! The [`orchestrator::Orchestrator`] validates and composes the prompt,
//! calls an [`ai::ImageGenerationService`] and tracks the request lifecycle
//! so a front end can show exactly one of idle, loading, error or image.

pub mod ai;
pub mod error;
pub mod locator;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod store;

pub use error::{Error, Result};
