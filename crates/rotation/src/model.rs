//! Model identifier rotation

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Round-robin rotation over model identifiers.
///
/// Same rotation discipline as [`crate::KeyRotator`], but with its own
/// cursor: the two are never synchronized, so a dispatch pairs whichever key
/// is next with whichever model is next.
#[derive(Debug)]
pub struct ModelRotator {
    models: Vec<String>,
    cursor: Cursor,
}

impl ModelRotator {
    /// Build a rotator from an ordered model list. Fails on an empty list.
    pub fn new(models: Vec<String>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::NoModels);
        }
        let cursor = Cursor::new(models.len());
        Ok(Self { models, cursor })
    }

    /// Number of models in rotation.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Yield the next model identifier, advancing the cursor.
    pub fn next(&mut self) -> &str {
        let index = self.cursor.advance();
        &self.models[index]
    }
}
