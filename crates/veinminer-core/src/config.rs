//! Vein mining configuration values.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player game mode, as far as vein mining is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

/// Error raised when parsing an unknown game mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game mode \"{0}\"")]
pub struct UnknownGameMode(String);

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "survival" => Ok(GameMode::Survival),
            "creative" => Ok(GameMode::Creative),
            "adventure" => Ok(GameMode::Adventure),
            "spectator" => Ok(GameMode::Spectator),
            _ => Err(UnknownGameMode(value.to_string())),
        }
    }
}

/// Immutable settings bundle applied to a vein mine.
///
/// Produced by [`VeinMiningConfig::builder`]; an existing config is never
/// mutated in place, [`VeinMiningConfig::edit`] derives a new one instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeinMiningConfig {
    repair_friendly: bool,
    max_vein_size: i32,
    cost: f64,
    disabled_worlds: HashSet<String>,
    disabled_game_modes: HashSet<GameMode>,
}

impl Default for VeinMiningConfig {
    fn default() -> Self {
        Self {
            repair_friendly: false,
            max_vein_size: 64,
            cost: 0.0,
            disabled_worlds: HashSet::new(),
            disabled_game_modes: HashSet::new(),
        }
    }
}

impl VeinMiningConfig {
    /// Starts building a config from the default values.
    pub fn builder() -> VeinMiningConfigBuilder {
        VeinMiningConfigBuilder {
            config: Self::default(),
        }
    }

    /// Derives a new config by applying `editor` to a builder seeded from
    /// this config. `self` is left untouched.
    pub fn edit(&self, editor: impl FnOnce(&mut VeinMiningConfigBuilder)) -> Self {
        let mut builder = VeinMiningConfigBuilder {
            config: self.clone(),
        };
        editor(&mut builder);
        builder.build()
    }

    /// Whether tool durability is preserved between consecutive blocks of a
    /// vein.
    #[inline]
    pub fn is_repair_friendly(&self) -> bool {
        self.repair_friendly
    }

    /// The raw configured vein size cap. Values `<= 0` mean unlimited.
    #[inline]
    pub fn max_vein_size(&self) -> i32 {
        self.max_vein_size
    }

    /// The effective vein size cap: `None` when the configured value is
    /// `<= 0` (unlimited).
    #[inline]
    pub fn vein_size_limit(&self) -> Option<usize> {
        (self.max_vein_size > 0).then_some(self.max_vein_size as usize)
    }

    /// The currency amount charged per vein mine. Never negative.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Whether vein mining is disabled in the given world.
    pub fn is_disabled_world(&self, world_name: &str) -> bool {
        self.disabled_worlds.contains(world_name)
    }

    /// Whether vein mining is disabled for the given game mode.
    pub fn is_disabled_game_mode(&self, game_mode: GameMode) -> bool {
        self.disabled_game_modes.contains(&game_mode)
    }

    /// The worlds in which vein mining is disabled.
    pub fn disabled_worlds(&self) -> &HashSet<String> {
        &self.disabled_worlds
    }

    /// The game modes in which vein mining is disabled.
    pub fn disabled_game_modes(&self) -> &HashSet<GameMode> {
        &self.disabled_game_modes
    }
}

/// Staged builder for [`VeinMiningConfig`].
#[derive(Debug, Clone)]
pub struct VeinMiningConfigBuilder {
    config: VeinMiningConfig,
}

impl VeinMiningConfigBuilder {
    pub fn repair_friendly(&mut self, repair_friendly: bool) -> &mut Self {
        self.config.repair_friendly = repair_friendly;
        self
    }

    /// Sets the vein size cap. Values `<= 0` mean unlimited.
    pub fn max_vein_size(&mut self, max_vein_size: i32) -> &mut Self {
        self.config.max_vein_size = max_vein_size;
        self
    }

    /// Sets the per-vein-mine cost. Negative amounts are clamped to zero.
    pub fn cost(&mut self, cost: f64) -> &mut Self {
        self.config.cost = cost.max(0.0);
        self
    }

    pub fn disable_world(&mut self, world_name: impl Into<String>) -> &mut Self {
        self.config.disabled_worlds.insert(world_name.into());
        self
    }

    pub fn disable_worlds<I, S>(&mut self, world_names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for world_name in world_names {
            self.config.disabled_worlds.insert(world_name.into());
        }
        self
    }

    pub fn enable_world(&mut self, world_name: &str) -> &mut Self {
        self.config.disabled_worlds.remove(world_name);
        self
    }

    pub fn clear_disabled_worlds(&mut self) -> &mut Self {
        self.config.disabled_worlds.clear();
        self
    }

    pub fn disable_game_mode(&mut self, game_mode: GameMode) -> &mut Self {
        self.config.disabled_game_modes.insert(game_mode);
        self
    }

    pub fn enable_game_mode(&mut self, game_mode: GameMode) -> &mut Self {
        self.config.disabled_game_modes.remove(&game_mode);
        self
    }

    pub fn build(&self) -> VeinMiningConfig {
        self.config.clone()
    }
}

/// Client-side feature permissions synchronized to a connected client mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    allow_activation_keybind: bool,
    allow_pattern_switching_keybind: bool,
    allow_wireframe_rendering: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            allow_activation_keybind: true,
            allow_pattern_switching_keybind: true,
            allow_wireframe_rendering: true,
        }
    }
}

impl ClientConfig {
    const MASK_ACTIVATION_KEYBIND: u8 = 0x01;
    const MASK_PATTERN_SWITCHING_KEYBIND: u8 = 0x02;
    const MASK_WIREFRAME_RENDERING: u8 = 0x04;

    /// Creates a config with the given three flags.
    pub fn new(
        allow_activation_keybind: bool,
        allow_pattern_switching_keybind: bool,
        allow_wireframe_rendering: bool,
    ) -> Self {
        Self {
            allow_activation_keybind,
            allow_pattern_switching_keybind,
            allow_wireframe_rendering,
        }
    }

    #[inline]
    pub fn allow_activation_keybind(&self) -> bool {
        self.allow_activation_keybind
    }

    #[inline]
    pub fn allow_pattern_switching_keybind(&self) -> bool {
        self.allow_pattern_switching_keybind
    }

    #[inline]
    pub fn allow_wireframe_rendering(&self) -> bool {
        self.allow_wireframe_rendering
    }

    /// Encodes the flags as the single-byte wire bitmask.
    pub fn as_bitmask(&self) -> u8 {
        let mut bitmask = 0;
        if self.allow_activation_keybind {
            bitmask |= Self::MASK_ACTIVATION_KEYBIND;
        }
        if self.allow_pattern_switching_keybind {
            bitmask |= Self::MASK_PATTERN_SWITCHING_KEYBIND;
        }
        if self.allow_wireframe_rendering {
            bitmask |= Self::MASK_WIREFRAME_RENDERING;
        }
        bitmask
    }

    /// Decodes the single-byte wire bitmask. Unknown bits are ignored.
    pub fn from_bitmask(bitmask: u8) -> Self {
        Self {
            allow_activation_keybind: bitmask & Self::MASK_ACTIVATION_KEYBIND != 0,
            allow_pattern_switching_keybind: bitmask & Self::MASK_PATTERN_SWITCHING_KEYBIND != 0,
            allow_wireframe_rendering: bitmask & Self::MASK_WIREFRAME_RENDERING != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = VeinMiningConfig::builder().build();
        assert_eq!(config.max_vein_size(), 64);
        assert_eq!(config.vein_size_limit(), Some(64));
        assert_eq!(config.cost(), 0.0);
        assert!(!config.is_repair_friendly());
    }

    #[test]
    fn non_positive_cap_means_unlimited() {
        for raw in [0, -1, i32::MIN] {
            let config = VeinMiningConfig::builder().max_vein_size(raw).build();
            assert_eq!(config.vein_size_limit(), None, "cap {raw}");
        }
        let config = VeinMiningConfig::builder().max_vein_size(1).build();
        assert_eq!(config.vein_size_limit(), Some(1));
    }

    #[test]
    fn negative_cost_is_clamped() {
        let config = VeinMiningConfig::builder().cost(-5.0).build();
        assert_eq!(config.cost(), 0.0);
    }

    #[test]
    fn edit_preserves_the_original() {
        let original = VeinMiningConfig::builder()
            .max_vein_size(32)
            .disable_world("world_nether")
            .build();

        let edited = original.edit(|builder| {
            builder.max_vein_size(8).disable_game_mode(GameMode::Creative);
        });

        assert_eq!(original.max_vein_size(), 32);
        assert!(!original.is_disabled_game_mode(GameMode::Creative));
        assert_eq!(edited.max_vein_size(), 8);
        assert!(edited.is_disabled_world("world_nether"));
        assert!(edited.is_disabled_game_mode(GameMode::Creative));
    }

    #[test]
    fn client_config_bitmask_round_trips() {
        for bitmask in 0..8u8 {
            assert_eq!(ClientConfig::from_bitmask(bitmask).as_bitmask(), bitmask);
        }
        // Unknown high bits are dropped.
        assert_eq!(ClientConfig::from_bitmask(0xFF).as_bitmask(), 0x07);
        assert_eq!(ClientConfig::default().as_bitmask(), 0x07);
    }

    #[test]
    fn game_mode_parsing() {
        assert_eq!("survival".parse::<GameMode>().unwrap(), GameMode::Survival);
        assert_eq!("CREATIVE".parse::<GameMode>().unwrap(), GameMode::Creative);
        assert!("hardcore".parse::<GameMode>().is_err());
    }
}
