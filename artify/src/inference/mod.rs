//! Clients for the external upload/inference backend.
//!
//! The backend accepts an artwork image, runs the authenticity model, pins
//! the image to content-addressed storage and returns a structured report.
//! This module defines the generic [`InferenceApi`] trait the rest of the
//! crate programs against, and a concrete HTTP implementation.

use crate::error::UploadError;
use crate::types::UploadResult;

pub mod http;

pub use http::HttpInferenceClient;

/// Abstract upload/inference client.
///
/// Implementations submit the image to the external backend and translate
/// the response into a canonical [`UploadResult`]. There is no internal
/// concurrency: at most one upload is in flight per caller, and a new upload
/// supersedes state derived from the previous one.
pub trait InferenceApi: Send + Sync {
    /// Submits one image and returns the parsed authenticity report.
    ///
    /// No retries and no chunking; failures surface as [`UploadError`]
    /// values and the caller decides whether to re-trigger.
    fn analyze(&self, image: &[u8], file_name: &str) -> Result<UploadResult, UploadError>;
}
