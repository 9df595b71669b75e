//! Per-client connection state machine.
//!
//! A session consumes raw frames off the channel in arrival order and turns
//! them into state transitions, player mutations and actions for the host to
//! carry out. Only a malformed or version-mismatched handshake terminates a
//! connection; anything else either applies cleanly or is ignored.

use veinminer_core::{
    pattern::PatternRegistry, platform::PermissionChecker, player::VeinMinerPlayer, BlockPosition,
    NamespacedKey,
};
use veinminer_protocol::{
    ClientboundMessage, ProtocolError, ServerboundMessage, PROTOCOL_VERSION,
};

/// The lifecycle of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No handshake yet; gameplay messages are not accepted.
    Uninitialized,
    /// The handshake succeeded; the client is synchronized and may exchange
    /// gameplay messages.
    Active,
    /// The handshake failed. Terminal: every further message is dropped.
    Rejected,
}

/// Something the host must do on behalf of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send a message to this client on the protocol channel.
    Send(ClientboundMessage),

    /// Terminate the connection, showing the player the given reason.
    Disconnect { reason: String },

    /// Show the player a plain user-facing message (e.g. in chat).
    Notify { message: String },

    /// The client asked for a vein mine preview at `origin`. The host
    /// resolves it and replies via [`ClientSession::vein_mine_results`].
    VeinMineRequested { origin: BlockPosition },
}

/// Everything a session needs to handle one frame.
pub struct SessionContext<'a> {
    /// The connecting player's transient state.
    pub player: &'a mut VeinMinerPlayer,
    /// The patterns available for selection and synchronization.
    pub patterns: &'a PatternRegistry,
    /// Permission access bound to the connecting player.
    pub permissions: &'a dyn PermissionChecker,
}

/// The server side of one client connection.
#[derive(Debug)]
pub struct ClientSession {
    state: ConnectionState,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Uninitialized,
        }
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the handshake completed and gameplay messages flow.
    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    /// Handles one raw frame off the channel.
    ///
    /// Unknown message ids are ignored without touching the connection.
    /// Malformed payloads are ignored too, unless they arrive in place of
    /// the handshake, which is the one condition that terminates the
    /// connection outright.
    pub fn handle_frame(
        &mut self,
        frame: &[u8],
        context: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        if self.state == ConnectionState::Rejected {
            return Vec::new();
        }

        match ServerboundMessage::decode(frame) {
            Ok(message) => self.handle_message(message, context),
            Err(ProtocolError::UnknownMessageId(id)) => {
                tracing::debug!(id, "ignoring message with unknown id");
                Vec::new()
            }
            Err(ProtocolError::Codec(error)) => {
                if self.state == ConnectionState::Uninitialized {
                    self.state = ConnectionState::Rejected;
                    return vec![SessionAction::Disconnect {
                        reason: "Malformed VeinMiner handshake. Contact an administrator."
                            .to_string(),
                    }];
                }

                tracing::warn!(%error, "ignoring malformed message");
                Vec::new()
            }
        }
    }

    /// Handles one decoded message.
    pub fn handle_message(
        &mut self,
        message: ServerboundMessage,
        context: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Rejected => Vec::new(),
            ConnectionState::Uninitialized => match message {
                ServerboundMessage::Handshake { protocol_version } => {
                    self.handle_handshake(protocol_version, context)
                }
                other => {
                    tracing::warn!(?other, "ignoring gameplay message before handshake");
                    Vec::new()
                }
            },
            ConnectionState::Active => match message {
                ServerboundMessage::Handshake { .. } => {
                    tracing::warn!("ignoring repeated handshake");
                    Vec::new()
                }
                ServerboundMessage::ToggleVeinMiner { activated } => {
                    self.handle_toggle(activated, context)
                }
                ServerboundMessage::SelectPattern { pattern_key } => {
                    self.handle_select_pattern(pattern_key, context)
                }
                ServerboundMessage::RequestVeinMine { origin } => {
                    vec![SessionAction::VeinMineRequested { origin }]
                }
            },
        }
    }

    /// Builds the preview reply to a [`SessionAction::VeinMineRequested`].
    pub fn vein_mine_results(positions: Vec<BlockPosition>) -> ClientboundMessage {
        ClientboundMessage::VeinMineResults { positions }
    }

    fn handle_handshake(
        &mut self,
        protocol_version: u32,
        context: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        if protocol_version != PROTOCOL_VERSION {
            self.state = ConnectionState::Rejected;
            let direction = if PROTOCOL_VERSION > protocol_version {
                "out of date. Please update."
            } else {
                "too new. Please downgrade."
            };
            tracing::info!(
                client_version = protocol_version,
                server_version = PROTOCOL_VERSION,
                "rejecting client with mismatched protocol version"
            );
            return vec![SessionAction::Disconnect {
                reason: format!("Your client-side version of VeinMiner is {direction}"),
            }];
        }

        self.state = ConnectionState::Active;
        context.player.attach_client_mod();
        tracing::info!("client mod handshake accepted");

        vec![
            SessionAction::Send(ClientboundMessage::HandshakeResponse),
            SessionAction::Send(ClientboundMessage::SyncRegisteredPatterns {
                keys: pattern_sync_keys(context.patterns, context.permissions),
            }),
            SessionAction::Send(ClientboundMessage::SetConfig {
                config: *context.player.client_config(),
            }),
        ]
    }

    fn handle_toggle(
        &mut self,
        activated: bool,
        context: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        if !context.player.client_config().allow_activation_keybind() {
            return Vec::new();
        }

        context.player.set_client_key_pressed(activated);
        Vec::new()
    }

    fn handle_select_pattern(
        &mut self,
        pattern_key: NamespacedKey,
        context: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        if !context.player.client_config().allow_pattern_switching_keybind() {
            return Vec::new();
        }

        let accessible = context.patterns.get(&pattern_key).is_some_and(|pattern| {
            pattern
                .permission()
                .map_or(true, |node| context.permissions.has_permission(node))
        });

        if !accessible {
            // The previously selected pattern stays in effect.
            return vec![SessionAction::Notify {
                message: format!("Unknown or inaccessible pattern \"{pattern_key}\""),
            }];
        }

        context.player.select_pattern(pattern_key.clone());
        vec![SessionAction::Send(ClientboundMessage::SetPattern {
            pattern_key,
        })]
    }
}

/// The pattern catalog synchronized to a client: the default pattern first,
/// then the remaining patterns in registration order, patterns the player
/// lacks permission for left out.
pub fn pattern_sync_keys(
    patterns: &PatternRegistry,
    permissions: &dyn PermissionChecker,
) -> Vec<NamespacedKey> {
    let mut keys = vec![patterns.default_key().clone()];
    for pattern in patterns.all() {
        if pattern.key() == patterns.default_key() {
            continue;
        }
        if pattern
            .permission()
            .map_or(true, |node| permissions.has_permission(node))
        {
            keys.push(pattern.key().clone());
        }
    }
    keys
}
