//! Error types for ironbar-docs.
//!
//! Library crates use [`DocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ironbar-docs operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// Configuration loading or validation error (missing credential, bad schema shape).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the upstream repository or schema host.
    #[error("network error: {0}")]
    Network(String),

    /// JSON, TOML or GraphQL payload parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A schema type name or `$ref` pointer that does not resolve to a definition.
    #[error("unresolved type: {name}")]
    UnresolvedType { name: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unexpected catalog version, invalid input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsError>;

impl DocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an unresolved-type error for a type name or pointer.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedType { name: name.into() }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocsError::config("GITHUB_TOKEN is not set");
        assert_eq!(err.to_string(), "config error: GITHUB_TOKEN is not set");

        let err = DocsError::unresolved("#/$defs/MissingModule");
        assert_eq!(err.to_string(), "unresolved type: #/$defs/MissingModule");

        let err = DocsError::validation("catalog schema_version 99 not supported");
        assert!(err.to_string().contains("schema_version 99"));
    }
}
