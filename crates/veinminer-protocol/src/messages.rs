//! The message catalog.
//!
//! Every message on the wire is a varint message id followed by a
//! type-specific payload. Ids are assigned per direction and are part of the
//! protocol contract; new messages may only ever be appended.

use thiserror::Error;

use veinminer_core::{BlockPosition, ClientConfig, NamespacedKey};

use crate::codec::{CodecError, MessageReader, MessageWriter};

/// Error raised while decoding an incoming message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The message id is not in this catalog. Receivers ignore these for
    /// forward compatibility; the connection stays open.
    #[error("unknown message id {0}")]
    UnknownMessageId(u32),

    /// The payload of a known message failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerboundMessage {
    /// `0x00`: announces the client mod and its protocol version. Must be
    /// the first message of a connection.
    Handshake { protocol_version: u32 },

    /// `0x01`: the client pressed or released its activation keybind.
    ToggleVeinMiner { activated: bool },

    /// `0x02`: asks the server for the vein mine result at the given
    /// origin, for preview purposes.
    RequestVeinMine { origin: BlockPosition },

    /// `0x03`: the client wants to switch to the given pattern.
    SelectPattern { pattern_key: NamespacedKey },
}

impl ServerboundMessage {
    const ID_HANDSHAKE: u32 = 0x00;
    const ID_TOGGLE_VEIN_MINER: u32 = 0x01;
    const ID_REQUEST_VEIN_MINE: u32 = 0x02;
    const ID_SELECT_PATTERN: u32 = 0x03;

    /// The wire id of this message.
    pub fn message_id(&self) -> u32 {
        match self {
            ServerboundMessage::Handshake { .. } => Self::ID_HANDSHAKE,
            ServerboundMessage::ToggleVeinMiner { .. } => Self::ID_TOGGLE_VEIN_MINER,
            ServerboundMessage::RequestVeinMine { .. } => Self::ID_REQUEST_VEIN_MINE,
            ServerboundMessage::SelectPattern { .. } => Self::ID_SELECT_PATTERN,
        }
    }

    /// Encodes the message id and payload into a wire frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = MessageWriter::new();
        writer.write_varint(self.message_id());

        match self {
            ServerboundMessage::Handshake { protocol_version } => {
                writer.write_varint(*protocol_version);
            }
            ServerboundMessage::ToggleVeinMiner { activated } => {
                writer.write_bool(*activated);
            }
            ServerboundMessage::RequestVeinMine { origin } => {
                writer.write_block_position(*origin);
            }
            ServerboundMessage::SelectPattern { pattern_key } => {
                writer.write_key(pattern_key);
            }
        }

        writer.into_bytes()
    }

    /// Decodes a wire frame. The whole payload must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = MessageReader::new(bytes);
        let message_id = reader.read_varint()?;

        let message = match message_id {
            Self::ID_HANDSHAKE => ServerboundMessage::Handshake {
                protocol_version: reader.read_varint()?,
            },
            Self::ID_TOGGLE_VEIN_MINER => ServerboundMessage::ToggleVeinMiner {
                activated: reader.read_bool()?,
            },
            Self::ID_REQUEST_VEIN_MINE => ServerboundMessage::RequestVeinMine {
                origin: reader.read_block_position()?,
            },
            Self::ID_SELECT_PATTERN => ServerboundMessage::SelectPattern {
                pattern_key: reader.read_key()?,
            },
            unknown => return Err(ProtocolError::UnknownMessageId(unknown)),
        };

        reader.finish()?;
        Ok(message)
    }
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientboundMessage {
    /// `0x00`: acknowledges a version-compatible handshake.
    HandshakeResponse,

    /// `0x01`: the full catalog of patterns the client may select from,
    /// the default pattern first.
    SyncRegisteredPatterns { keys: Vec<NamespacedKey> },

    /// `0x02`: the client-side feature permissions, as a bitmask.
    SetConfig { config: ClientConfig },

    /// `0x03`: the positions a vein mine would destroy, for preview.
    VeinMineResults { positions: Vec<BlockPosition> },

    /// `0x04`: forces the client's active pattern.
    SetPattern { pattern_key: NamespacedKey },
}

impl ClientboundMessage {
    const ID_HANDSHAKE_RESPONSE: u32 = 0x00;
    const ID_SYNC_REGISTERED_PATTERNS: u32 = 0x01;
    const ID_SET_CONFIG: u32 = 0x02;
    const ID_VEIN_MINE_RESULTS: u32 = 0x03;
    const ID_SET_PATTERN: u32 = 0x04;

    /// The wire id of this message.
    pub fn message_id(&self) -> u32 {
        match self {
            ClientboundMessage::HandshakeResponse => Self::ID_HANDSHAKE_RESPONSE,
            ClientboundMessage::SyncRegisteredPatterns { .. } => Self::ID_SYNC_REGISTERED_PATTERNS,
            ClientboundMessage::SetConfig { .. } => Self::ID_SET_CONFIG,
            ClientboundMessage::VeinMineResults { .. } => Self::ID_VEIN_MINE_RESULTS,
            ClientboundMessage::SetPattern { .. } => Self::ID_SET_PATTERN,
        }
    }

    /// Encodes the message id and payload into a wire frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = MessageWriter::new();
        writer.write_varint(self.message_id());

        match self {
            ClientboundMessage::HandshakeResponse => {}
            ClientboundMessage::SyncRegisteredPatterns { keys } => {
                writer.write_varint(keys.len() as u32);
                for key in keys {
                    writer.write_key(key);
                }
            }
            ClientboundMessage::SetConfig { config } => {
                writer.write_u8(config.as_bitmask());
            }
            ClientboundMessage::VeinMineResults { positions } => {
                writer.write_varint(positions.len() as u32);
                for position in positions {
                    writer.write_block_position(*position);
                }
            }
            ClientboundMessage::SetPattern { pattern_key } => {
                writer.write_key(pattern_key);
            }
        }

        writer.into_bytes()
    }

    /// Decodes a wire frame. The whole payload must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = MessageReader::new(bytes);
        let message_id = reader.read_varint()?;

        let message = match message_id {
            Self::ID_HANDSHAKE_RESPONSE => ClientboundMessage::HandshakeResponse,
            Self::ID_SYNC_REGISTERED_PATTERNS => {
                let count = reader.read_varint()?;
                let mut keys = Vec::with_capacity(count.min(1024) as usize);
                for _ in 0..count {
                    keys.push(reader.read_key()?);
                }
                ClientboundMessage::SyncRegisteredPatterns { keys }
            }
            Self::ID_SET_CONFIG => ClientboundMessage::SetConfig {
                config: ClientConfig::from_bitmask(reader.read_u8()?),
            },
            Self::ID_VEIN_MINE_RESULTS => {
                let count = reader.read_varint()?;
                let mut positions = Vec::with_capacity(count.min(1024) as usize);
                for _ in 0..count {
                    positions.push(reader.read_block_position()?);
                }
                ClientboundMessage::VeinMineResults { positions }
            }
            Self::ID_SET_PATTERN => ClientboundMessage::SetPattern {
                pattern_key: reader.read_key()?,
            },
            unknown => return Err(ProtocolError::UnknownMessageId(unknown)),
        };

        reader.finish()?;
        Ok(message)
    }
}
