//! Wire protocol for vein miner client synchronization.
//!
//! A single logical channel carries discrete, length-framed messages in both
//! directions; transport and framing of the channel itself (plugin message,
//! custom payload packet, ...) belong to the host. Each message begins with a
//! varint message id followed by a type-specific payload built from the
//! primitive codecs in [`codec`]. The catalog of messages and their stable
//! ids live in [`messages`].

pub mod codec;
pub mod messages;

pub use codec::{CodecError, MessageReader, MessageWriter};
pub use messages::{ClientboundMessage, ProtocolError, ServerboundMessage};

use veinminer_core::NamespacedKey;

/// The version of this protocol. Client and server versions must match
/// exactly for a connection to be accepted.
pub const PROTOCOL_VERSION: u32 = 1;

/// The namespaced key of the messaging channel: `veinminer:veinminer`.
pub fn channel() -> NamespacedKey {
    NamespacedKey::veinminer("veinminer")
}
