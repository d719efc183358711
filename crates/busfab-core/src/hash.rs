//! Run digests.
//!
//! A run's digest covers the structural specs only, so two runs over the
//! same descriptors hash identically. The JSON encoding is streamed straight
//! into the hasher.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{GenerationError, Result};

/// SHA-256 over the JSON encoding of a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Digest `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let mut hasher = Sha256::new();
        serde_json::to_writer(&mut hasher, value).map_err(|e| GenerationError::Digest {
            detail: e.to_string(),
        })?;
        Ok(Self(hasher.finalize().into()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Lower-case hex, 64 characters.
impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, RegisterDescriptor, SlaveDescriptor};

    #[test]
    fn equal_slaves_hash_equal() {
        let mut slave = SlaveDescriptor::new("uart");
        slave
            .registers
            .push(RegisterDescriptor::new("ctrl", 0, 8, Direction::HostWrite));
        assert_eq!(
            ContentHash::of(&slave).unwrap(),
            ContentHash::of(&slave.clone()).unwrap()
        );
    }

    #[test]
    fn ids_change_the_digest() {
        let a = ContentHash::of(&SlaveDescriptor::new("uart")).unwrap();
        let b = ContentHash::of(&SlaveDescriptor::new("gpio")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn renders_as_hex() {
        let hex = ContentHash::of("busfab").unwrap().to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn json_keys_must_be_strings() {
        let mut bad = std::collections::BTreeMap::new();
        bad.insert((1u8, 2u8), 0u8);
        assert!(matches!(
            ContentHash::of(&bad),
            Err(GenerationError::Digest { .. })
        ));
    }
}
