//! Analysis backends.
//!
//! A backend turns an image and a category into a report without
//! conflicts. Two exist:
//! - [`RemoteBackend`] asks a vision provider to read the label
//! - [`FallbackBackend`] answers from the static catalog and never fails
//!
//! The profile overlay is applied by the pipeline afterwards, so both
//! backends produce reports in the same shape.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use inspector_core::{Category, ReportParseError, SafetyReport};

use crate::image::{ImageError, ImageInput};
use crate::providers::{ProviderError, TokenUsage};

mod fallback;
mod remote;

pub use fallback::{CatalogOrder, FallbackBackend, IngredientOrder, RandomOrder, SeededOrder};
pub use remote::RemoteBackend;

/// Which path produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Remote-path faults. The pipeline recovers from every one of these.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Image could not be encoded: {0}")]
    Encoding(#[from] ImageError),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ReportParseError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// A backend's answer, before the profile overlay.
#[derive(Debug, Clone)]
pub struct BackendReport {
    pub report: SafetyReport,
    pub source: BackendKind,

    /// Model that answered, for remote reports
    pub model: Option<String>,

    /// Token usage, for remote reports
    pub usage: Option<TokenUsage>,
}

/// Strategy for producing a report from an image.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Name for logs.
    fn name(&self) -> &str;

    /// Whether the backend can currently be used.
    async fn is_available(&self) -> bool;

    /// Produce a report for `image`, read as a product in `category`.
    async fn analyze(
        &self,
        image: &ImageInput,
        category: &Category,
    ) -> Result<BackendReport, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BackendKind::Fallback).unwrap(),
            "\"fallback\""
        );
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }

    #[test]
    fn test_backend_error_wraps_sources() {
        let err: BackendError = ProviderError::AuthError.into();
        assert!(err.to_string().contains("Authentication failed"));

        let err: BackendError = ReportParseError::Empty.into();
        assert!(matches!(err, BackendError::MalformedResponse(_)));

        let err: BackendError = ImageError::NotADataUri.into();
        assert!(matches!(err, BackendError::Encoding(_)));
    }
}
