//! Round-robin rotation over API keys and model identifiers
//!
//! Both rotators wrap a fixed, ordered, non-empty sequence and a cursor that
//! advances by exactly one position (mod length) every time a value is
//! yielded. The two cursors are independent: a dispatch pairs whichever key
//! is next with whichever model is next, and both advance once per dispatch
//! whether the request succeeds or fails.
//!
//! Rotation state lives for the process lifetime and is never persisted.
//! The dispatch loop is a single control flow, so rotators take `&mut self`
//! and need no locking.

mod cursor;
mod error;
mod key;
mod model;

pub use error::{Error, Result};
pub use key::{ApiKey, KeyRotator};
pub use model::ModelRotator;
