//! Namespaced identifiers.
//!
//! Block types, item types, vein mining patterns and the protocol channel are
//! all identified by a lowercase `namespace:key` pair. Keys parsed from user
//! input (block lists, config files, wire messages) are validated up front so
//! the rest of the engine can treat them as well-formed.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The namespace applied when a bare key is parsed without an explicit one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// The namespace under which this engine registers its own keys.
pub const VEINMINER_NAMESPACE: &str = "veinminer";

/// Error raised when a string is not a well-formed namespaced key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The namespace portion contains characters outside `[a-z0-9._-]`.
    #[error("invalid namespace \"{0}\"")]
    InvalidNamespace(String),

    /// The key portion contains characters outside `[a-z0-9/._-]`.
    #[error("invalid key \"{0}\"")]
    InvalidKey(String),
}

/// A lowercase `namespace:key` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacedKey {
    namespace: String,
    key: String,
}

impl NamespacedKey {
    /// Creates a key from an explicit namespace and key, validating both.
    pub fn new(namespace: &str, key: &str) -> Result<Self, KeyError> {
        if !is_valid_namespace(namespace) {
            return Err(KeyError::InvalidNamespace(namespace.to_string()));
        }
        if !is_valid_key(key) {
            return Err(KeyError::InvalidKey(key.to_string()));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }

    /// Creates a key in the `minecraft` namespace.
    pub fn minecraft(key: &str) -> Result<Self, KeyError> {
        Self::new(DEFAULT_NAMESPACE, key)
    }

    /// Creates a key in the `veinminer` namespace.
    ///
    /// Intended for the engine's own well-known keys; `key` must already be
    /// well formed.
    pub fn veinminer(key: &str) -> Self {
        debug_assert!(is_valid_key(key), "malformed veinminer key {key:?}");
        Self {
            namespace: VEINMINER_NAMESPACE.to_string(),
            key: key.to_string(),
        }
    }

    /// The namespace portion.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key portion.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for NamespacedKey {
    type Err = KeyError;

    /// Parses `namespace:key`, or a bare `key` in the [`DEFAULT_NAMESPACE`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((namespace, key)) => Self::new(namespace, key),
            None => Self::new(DEFAULT_NAMESPACE, value),
        }
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl Serialize for NamespacedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NamespacedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .bytes()
            .all(|c| matches!(c, b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-'))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|c| matches!(c, b'a'..=b'z' | b'0'..=b'9' | b'/' | b'.' | b'_' | b'-'))
}
