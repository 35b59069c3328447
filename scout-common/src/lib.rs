//! Common types and utilities shared across the scout crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the workspace. It stays dependency-minimal so every crate
//! can depend on it without pulling in the browser or HTTP stacks.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ScoutError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use scout_common::ScoutError;
//!
//! let err = ScoutError::Timeout { seconds: 15 };
//! assert_eq!(err.to_string(), "Timed out after 15 seconds");
//! ```

pub mod observability;

/// Error types used across the scout workspace.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation exceeded the configured timeout.
    #[error("Timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The listing page rendered but no discussion item could be located.
    #[error("No discussions found at {url}")]
    NoDiscussions { url: String },
}

/// Convenient alias for results that use [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;
