//! API key rotation

use std::fmt;

use zeroize::Zeroize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// A bearer token for the completion API.
///
/// Redacted in Debug/Display — the raw value is only reachable through
/// `expose()`, at the point where the Authorization header is built. The
/// backing string is zeroed on drop. Keys are identified everywhere else
/// (logs, errors) by their 1-based rotation position.
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw token.
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Expose the raw token (use only to build the Authorization header).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Round-robin rotation over a fixed, ordered set of API keys.
///
/// `next()` yields the 1-based position (for logging) and the key at the
/// cursor, then advances by one mod length. The rotation never stops, never
/// skips, and is independent of request outcome: a failed request consumes
/// one step exactly like a successful one.
#[derive(Debug)]
pub struct KeyRotator {
    keys: Vec<ApiKey>,
    cursor: Cursor,
}

impl KeyRotator {
    /// Build a rotator from an ordered key list. Fails on an empty list.
    pub fn new(keys: Vec<ApiKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::NoKeys);
        }
        let cursor = Cursor::new(keys.len());
        Ok(Self { keys, cursor })
    }

    /// Build a rotator from the lines of a key file.
    pub fn from_lines(lines: Vec<String>) -> Result<Self> {
        Self::new(lines.into_iter().map(ApiKey::new).collect())
    }

    /// Number of keys in rotation.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Yield the next key and its 1-based position, advancing the cursor.
    pub fn next(&mut self) -> (usize, &ApiKey) {
        let index = self.cursor.advance();
        (index + 1, &self.keys[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotator(tokens: &[&str]) -> KeyRotator {
        KeyRotator::from_lines(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    #[test]
    fn yields_each_key_once_in_order_then_wraps() {
        let mut keys = rotator(&["k1", "k2", "k3"]);

        let seen: Vec<(usize, String)> = (0..3)
            .map(|_| {
                let (position, key) = keys.next();
                (position, key.expose().to_string())
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                (1, "k1".to_string()),
                (2, "k2".to_string()),
                (3, "k3".to_string()),
            ]
        );

        // Fourth call wraps back to the first key.
        let (position, key) = keys.next();
        assert_eq!(position, 1);
        assert_eq!(key.expose(), "k1");
    }

    #[test]
    fn positions_are_one_based() {
        let mut keys = rotator(&["only"]);
        let (position, _) = keys.next();
        assert_eq!(position, 1);
    }

    #[test]
    fn single_key_rotates_onto_itself() {
        let mut keys = rotator(&["solo"]);
        for _ in 0..4 {
            let (position, key) = keys.next();
            assert_eq!(position, 1);
            assert_eq!(key.expose(), "solo");
        }
    }

    #[test]
    fn empty_key_list_fails_construction() {
        let err = KeyRotator::new(vec![]).unwrap_err();
        assert!(matches!(err, Error::NoKeys));

        let err = KeyRotator::from_lines(vec![]).unwrap_err();
        assert!(matches!(err, Error::NoKeys));
    }

    #[test]
    fn api_key_is_redacted_in_debug_and_display() {
        let key = ApiKey::new("sk-very-secret".into());
        assert_eq!(format!("{key:?}"), "[REDACTED]");
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert_eq!(key.expose(), "sk-very-secret");
    }

    #[test]
    fn len_reports_key_count() {
        let keys = rotator(&["a", "b"]);
        assert_eq!(keys.len(), 2);
        assert!(!keys.is_empty());
    }
}
