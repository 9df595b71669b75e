//! The block matching model: single matchers and matcher lists.

mod list;
mod state;

pub use list::BlockList;
pub use state::{BlockParseError, BlockState};

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::key::NamespacedKey;

/// A single block matching rule.
///
/// Matching is directional: a matcher is asked whether a candidate type or
/// state satisfies it, never the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VeinBlock {
    /// Matches any block of the given type, regardless of state.
    Type(NamespacedKey),
    /// Matches only blocks whose state agrees with every property this state
    /// explicitly sets.
    State(BlockState),
    /// Matches every block type and state.
    Wildcard,
}

impl VeinBlock {
    /// The block type this matcher applies to, or `None` for the wildcard.
    pub fn block_type(&self) -> Option<&NamespacedKey> {
        match self {
            VeinBlock::Type(key) => Some(key),
            VeinBlock::State(state) => Some(state.key()),
            VeinBlock::Wildcard => None,
        }
    }

    /// Whether this matcher matches a pure type query.
    ///
    /// A state matcher never does: it requires state evidence that a bare
    /// type cannot provide.
    pub fn matches_type(&self, candidate: &NamespacedKey) -> bool {
        match self {
            VeinBlock::Type(key) => key == candidate,
            VeinBlock::State(_) => false,
            VeinBlock::Wildcard => true,
        }
    }

    /// Whether this matcher matches a concrete block state.
    ///
    /// With `exact`, the candidate must carry exactly the properties the
    /// matcher declares (none, for a type matcher); otherwise only the
    /// matcher's explicitly-set properties must agree.
    pub fn matches_state(&self, candidate: &BlockState, exact: bool) -> bool {
        match self {
            VeinBlock::Type(key) => {
                key == candidate.key() && (!exact || !candidate.has_properties())
            }
            VeinBlock::State(state) => {
                if exact {
                    state == candidate
                } else {
                    state.matches(candidate)
                }
            }
            VeinBlock::Wildcard => true,
        }
    }

    /// The canonical state-string form of this matcher.
    pub fn to_state_string(&self) -> String {
        self.to_string()
    }
}

impl FromStr for VeinBlock {
    type Err = BlockParseError;

    /// Parses `*`, `type`, or `type[name=value, ...]`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim() == "*" {
            return Ok(VeinBlock::Wildcard);
        }

        let state: BlockState = value.parse()?;
        if state.has_properties() {
            Ok(VeinBlock::State(state))
        } else {
            Ok(VeinBlock::Type(state.key().clone()))
        }
    }
}

impl fmt::Display for VeinBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VeinBlock::Type(key) => write!(f, "{key}"),
            VeinBlock::State(state) => write!(f, "{state}"),
            VeinBlock::Wildcard => write!(f, "*"),
        }
    }
}

impl Serialize for VeinBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VeinBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
