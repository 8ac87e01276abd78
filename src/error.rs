//! Error types for link telemetry processing.
//!
//! The decoder itself is total and never fails; errors here cover the
//! resource boundary (shared memory acquisition, platform support) and the
//! trigger dispatch channel. Everything else in the core is handled silently
//! at the point of detection.

use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Failed to open link segment: {reason}")]
    Segment {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Trigger dispatch closed: {context}")]
    Dispatch { context: String },
}

impl LinkError {
    /// Helper constructor for segment acquisition errors.
    pub fn segment_failed(reason: impl Into<String>) -> Self {
        LinkError::Segment { reason: reason.into(), source: None }
    }

    /// Helper constructor for segment acquisition errors with source.
    pub fn segment_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Segment { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        LinkError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        LinkError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }

    /// Helper constructor for closed dispatch channels.
    pub fn dispatch_closed(context: impl Into<String>) -> Self {
        LinkError::Dispatch { context: context.into() }
    }
}
