//! Block states: a type key plus explicitly-set properties.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::key::{KeyError, NamespacedKey};

/// Error raised when a block or state string cannot be parsed.
///
/// Parsing is all-or-nothing: a malformed string never yields a partially
/// constructed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockParseError {
    /// The string does not follow the `type[name=value, ...]` format.
    #[error("unsupported block format \"{0}\"")]
    UnsupportedFormat(String),

    /// The type portion is not a valid namespaced key.
    #[error(transparent)]
    InvalidType(#[from] KeyError),
}

/// A concrete block state: a block type and the properties explicitly set on
/// it.
///
/// Properties are stored sorted by name, so the canonical string form (and
/// serde output) is deterministic regardless of construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockState {
    key: NamespacedKey,
    properties: BTreeMap<String, String>,
}

impl BlockState {
    /// Creates a state with no explicit properties.
    pub fn new(key: NamespacedKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Creates a state with the given properties.
    pub fn with_properties<I, K, V>(key: NamespacedKey, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key,
            properties: properties
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// The block type this state belongs to.
    #[inline]
    pub fn key(&self) -> &NamespacedKey {
        &self.key
    }

    /// The value of an explicitly-set property, if any.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Iterates the explicitly-set properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether any property is explicitly set.
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Directional state matching: every property explicitly set on `self`
    /// must agree with `candidate`; properties `self` leaves unset are
    /// wildcards. The block types must match exactly.
    pub fn matches(&self, candidate: &BlockState) -> bool {
        self.key == candidate.key
            && self
                .properties
                .iter()
                .all(|(name, value)| candidate.property(name) == Some(value))
    }
}

impl FromStr for BlockState {
    type Err = BlockParseError;

    /// Parses `type` or `type[name=value, name=value]`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || BlockParseError::UnsupportedFormat(value.to_string());

        let (type_part, state_part) = match value.split_once('[') {
            Some((type_part, rest)) => {
                let state_part = rest.strip_suffix(']').ok_or_else(malformed)?;
                (type_part, Some(state_part))
            }
            None => (value, None),
        };

        let key: NamespacedKey = type_part.trim().parse()?;
        let mut properties = BTreeMap::new();

        if let Some(state_part) = state_part {
            for entry in state_part.split(',') {
                let (name, property_value) = entry.split_once('=').ok_or_else(malformed)?;
                let name = name.trim();
                let property_value = property_value.trim();
                if name.is_empty() || property_value.is_empty() {
                    return Err(malformed());
                }

                properties.insert(name.to_string(), property_value.to_string());
            }
        }

        Ok(Self { key, properties })
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if self.has_properties() {
            write!(f, "[")?;
            for (index, (name, value)) in self.properties().enumerate() {
                if index > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{name}={value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Serialize for BlockState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
