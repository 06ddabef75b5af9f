//! Unified error type for the vidbox application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for HTTP handlers to derive a status code via [`Error::http_status`].
//! Every error is terminal for the request that produced it; nothing is
//! retried server-side.

use std::fmt;

/// Unified error type covering all failure modes in vidbox.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request parameters are missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The stream token is invalid or has rotated out.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested entity could not be found or is not accessible.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "media", "subtitle").
        entity: String,
        /// The identifier or path that was looked up.
        id: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg) could not be spawned or failed.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Forbidden(_) => 403,
            Error::NotFound { .. } => 404,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
