//! Error types for rotator construction

/// Errors from building a rotator.
///
/// Both variants are configuration-class: they can only occur at startup,
/// before any request is issued.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no API keys to rotate: the key source yielded zero entries")]
    NoKeys,

    #[error("no models to rotate: at least one model identifier is required")]
    NoModels,
}

/// Result alias for rotator construction.
pub type Result<T> = std::result::Result<T, Error>;
