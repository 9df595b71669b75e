//! Per-player vein miner state.
//!
//! Everything here is transient, keyed by player id and mutated only on the
//! single-threaded event path; persistence is the host's concern.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::key::NamespacedKey;

/// How a player activates vein mining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStrategy {
    /// Never active.
    None,
    /// Active while the client mod reports its keybind held.
    Client,
    /// Active while the player sneaks.
    #[default]
    Sneak,
    /// Always active.
    Always,
}

/// The transient vein miner state of a single player.
#[derive(Debug, Clone)]
pub struct VeinMinerPlayer {
    activation: ActivationStrategy,
    client_key_pressed: bool,
    using_client_mod: bool,
    selected_pattern: Option<NamespacedKey>,
    disabled_categories: HashSet<String>,
    client_config: ClientConfig,
}

impl Default for VeinMinerPlayer {
    fn default() -> Self {
        Self {
            activation: ActivationStrategy::default(),
            client_key_pressed: false,
            using_client_mod: false,
            selected_pattern: None,
            disabled_categories: HashSet::new(),
            client_config: ClientConfig::default(),
        }
    }
}

impl VeinMinerPlayer {
    /// The player's activation strategy.
    pub fn activation(&self) -> ActivationStrategy {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationStrategy) {
        self.activation = activation;
    }

    /// Whether the player has the client mod installed (established by a
    /// successful handshake).
    pub fn is_using_client_mod(&self) -> bool {
        self.using_client_mod
    }

    /// Marks the client mod present and switches activation to the client
    /// keybind.
    pub fn attach_client_mod(&mut self) {
        self.using_client_mod = true;
        self.activation = ActivationStrategy::Client;
    }

    /// Whether the client keybind is currently held.
    pub fn is_client_key_pressed(&self) -> bool {
        self.client_key_pressed
    }

    pub fn set_client_key_pressed(&mut self, pressed: bool) {
        self.client_key_pressed = pressed;
    }

    /// Whether vein mining is currently active for this player, given
    /// whether they are sneaking right now.
    pub fn is_vein_miner_active(&self, sneaking: bool) -> bool {
        match self.activation {
            ActivationStrategy::None => false,
            ActivationStrategy::Client => self.using_client_mod && self.client_key_pressed,
            ActivationStrategy::Sneak => sneaking,
            ActivationStrategy::Always => true,
        }
    }

    /// The pattern the player selected, if any.
    pub fn selected_pattern(&self) -> Option<&NamespacedKey> {
        self.selected_pattern.as_ref()
    }

    pub fn select_pattern(&mut self, pattern: NamespacedKey) {
        self.selected_pattern = Some(pattern);
    }

    /// Whether vein mining is enabled for the given category (players may
    /// switch categories off individually).
    pub fn is_vein_miner_enabled(&self, category_id: &str) -> bool {
        !self.disabled_categories.contains(category_id)
    }

    /// Enables or disables a category for this player. Returns `true` if the
    /// state changed.
    pub fn set_vein_miner_enabled(&mut self, category_id: &str, enabled: bool) -> bool {
        if enabled {
            self.disabled_categories.remove(category_id)
        } else {
            self.disabled_categories.insert(category_id.to_string())
        }
    }

    /// The client-side feature permissions synchronized to this player.
    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    pub fn set_client_config(&mut self, client_config: ClientConfig) {
        self.client_config = client_config;
    }
}

/// All per-player state, keyed by player id.
#[derive(Debug, Default)]
pub struct PlayerManager {
    players: HashMap<Uuid, VeinMinerPlayer>,
}

impl PlayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state for a player, if tracked.
    pub fn get(&self, player_id: Uuid) -> Option<&VeinMinerPlayer> {
        self.players.get(&player_id)
    }

    /// Mutable state for a player, created on first access.
    pub fn get_or_insert(&mut self, player_id: Uuid) -> &mut VeinMinerPlayer {
        self.players.entry(player_id).or_default()
    }

    /// Drops the state for a player (on disconnect), returning it.
    pub fn remove(&mut self, player_id: Uuid) -> Option<VeinMinerPlayer> {
        self.players.remove(&player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
