//! Server-side session handling for the vein miner client protocol.
//!
//! This crate glues [`veinminer_protocol`] to [`veinminer_core`]: one
//! [`ClientSession`] per connected client consumes frames in arrival order,
//! drives the handshake state machine, and mutates the player's transient
//! vein miner state. Transport, scheduling and world access remain with the
//! host, which executes the returned [`SessionAction`]s.

pub mod session;

pub use session::{
    pattern_sync_keys, ClientSession, ConnectionState, SessionAction, SessionContext,
};
