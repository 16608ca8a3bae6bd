//! Common error types
//!
//! Everything here is configuration-class: it can only occur before the
//! dispatch loop starts, and it always aborts startup. Per-request failures
//! live next to the HTTP client instead.

use thiserror::Error;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
