//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use storybook_core::{FlowError, PortError};

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// An event that the session flow does not accept on the current screen.
    #[error("Session flow error: {0}")]
    Flow(#[from] FlowError),

    /// Represents a failure to decode or re-encode a captured page image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Represents a standard Input/Output error (e.g., reading a page photo).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The screen that owned the work was torn down.
    #[error("Cancelled because the screen was closed")]
    Cancelled,

    /// OCR or TTS reported a failure for a captured page.
    #[error("Processing failed for page {page_index}")]
    PageFailed { page_index: usize },

    /// A user-facing failure that the user may retry.
    #[error("{0}")]
    Rejected(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
