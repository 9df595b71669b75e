//! Connection state machine behavior, end to end over encoded frames.

use veinminer_core::{
    pattern::PatternRegistry, player::VeinMinerPlayer, BlockPosition, ClientConfig, NamespacedKey,
};
use veinminer_protocol::{ClientboundMessage, ServerboundMessage, PROTOCOL_VERSION};
use veinminer_server::{ClientSession, ConnectionState, SessionAction, SessionContext};

fn key(value: &str) -> NamespacedKey {
    value.parse().expect(value)
}

struct Fixture {
    player: VeinMinerPlayer,
    patterns: PatternRegistry,
}

impl Fixture {
    fn new() -> Self {
        Self {
            player: VeinMinerPlayer::default(),
            patterns: PatternRegistry::with_builtin_patterns(),
        }
    }

    fn handle(
        &mut self,
        session: &mut ClientSession,
        message: ServerboundMessage,
    ) -> Vec<SessionAction> {
        self.handle_with_permissions(session, message, |_: &str| true)
    }

    fn handle_with_permissions(
        &mut self,
        session: &mut ClientSession,
        message: ServerboundMessage,
        permissions: impl Fn(&str) -> bool,
    ) -> Vec<SessionAction> {
        let mut context = SessionContext {
            player: &mut self.player,
            patterns: &self.patterns,
            permissions: &permissions,
        };
        session.handle_frame(&message.encode(), &mut context)
    }
}

fn handshake(protocol_version: u32) -> ServerboundMessage {
    ServerboundMessage::Handshake { protocol_version }
}

#[test]
fn matching_versions_activate_the_connection() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    assert_eq!(session.state(), ConnectionState::Uninitialized);

    let actions = fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    assert_eq!(session.state(), ConnectionState::Active);
    assert!(fixture.player.is_using_client_mod());

    // Handshake response, then the pattern catalog, then the client config.
    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions[0],
        SessionAction::Send(ClientboundMessage::HandshakeResponse)
    );
    let SessionAction::Send(ClientboundMessage::SyncRegisteredPatterns { keys }) = &actions[1]
    else {
        panic!("expected pattern sync, got {:?}", actions[1]);
    };
    assert_eq!(keys[0], key("veinminer:default"));
    assert_eq!(keys.len(), 4);
    assert_eq!(
        actions[2],
        SessionAction::Send(ClientboundMessage::SetConfig {
            config: ClientConfig::default(),
        })
    );
}

#[test]
fn newer_clients_are_rejected_with_a_downgrade_message() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();

    let actions = fixture.handle(&mut session, handshake(PROTOCOL_VERSION + 1));

    assert_eq!(session.state(), ConnectionState::Rejected);
    assert_eq!(actions.len(), 1);
    let SessionAction::Disconnect { reason } = &actions[0] else {
        panic!("expected disconnect, got {:?}", actions[0]);
    };
    assert!(reason.contains("too new"), "reason was {reason:?}");
    assert!(!fixture.player.is_using_client_mod());
}

#[test]
fn older_clients_are_rejected_with_an_update_message() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();

    let actions = fixture.handle(&mut session, handshake(0));

    assert_eq!(session.state(), ConnectionState::Rejected);
    let SessionAction::Disconnect { reason } = &actions[0] else {
        panic!("expected disconnect, got {:?}", actions[0]);
    };
    assert!(reason.contains("out of date"), "reason was {reason:?}");
}

#[test]
fn rejected_sessions_are_terminal() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION + 1));

    // Even a now-valid handshake is dropped.
    let actions = fixture.handle(&mut session, handshake(PROTOCOL_VERSION));
    assert!(actions.is_empty());
    assert_eq!(session.state(), ConnectionState::Rejected);

    let actions = fixture.handle(
        &mut session,
        ServerboundMessage::ToggleVeinMiner { activated: true },
    );
    assert!(actions.is_empty());
    assert!(!fixture.player.is_client_key_pressed());
}

#[test]
fn gameplay_messages_before_the_handshake_are_ignored() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();

    let actions = fixture.handle(
        &mut session,
        ServerboundMessage::ToggleVeinMiner { activated: true },
    );
    assert!(actions.is_empty());
    assert_eq!(session.state(), ConnectionState::Uninitialized);
    assert!(!fixture.player.is_client_key_pressed());
}

#[test]
fn toggle_updates_the_player_keybind_state() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    fixture.handle(
        &mut session,
        ServerboundMessage::ToggleVeinMiner { activated: true },
    );
    assert!(fixture.player.is_client_key_pressed());
    assert!(fixture.player.is_vein_miner_active(false));

    fixture.handle(
        &mut session,
        ServerboundMessage::ToggleVeinMiner { activated: false },
    );
    assert!(!fixture.player.is_client_key_pressed());
}

#[test]
fn toggle_is_ignored_when_the_keybind_is_disallowed() {
    let mut fixture = Fixture::new();
    fixture
        .player
        .set_client_config(ClientConfig::new(false, true, true));
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    fixture.handle(
        &mut session,
        ServerboundMessage::ToggleVeinMiner { activated: true },
    );
    assert!(!fixture.player.is_client_key_pressed());
}

#[test]
fn selecting_a_known_pattern_confirms_it() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    let tunnel = key("veinminer:tunnel");
    let actions = fixture.handle(
        &mut session,
        ServerboundMessage::SelectPattern {
            pattern_key: tunnel.clone(),
        },
    );

    assert_eq!(fixture.player.selected_pattern(), Some(&tunnel));
    assert_eq!(
        actions,
        vec![SessionAction::Send(ClientboundMessage::SetPattern {
            pattern_key: tunnel,
        })]
    );
}

#[test]
fn selecting_an_unknown_pattern_retains_the_previous_one() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    let tunnel = key("veinminer:tunnel");
    fixture.handle(
        &mut session,
        ServerboundMessage::SelectPattern {
            pattern_key: tunnel.clone(),
        },
    );

    let actions = fixture.handle(
        &mut session,
        ServerboundMessage::SelectPattern {
            pattern_key: key("veinminer:does_not_exist"),
        },
    );

    // The selection is rejected with a user-facing message; the previous
    // pattern stays active.
    assert_eq!(fixture.player.selected_pattern(), Some(&tunnel));
    assert_eq!(actions.len(), 1);
    assert!(matches!(actions[0], SessionAction::Notify { .. }));
}

#[test]
fn selecting_a_pattern_without_permission_is_rejected() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    let actions = fixture.handle_with_permissions(
        &mut session,
        ServerboundMessage::SelectPattern {
            pattern_key: key("veinminer:staircase_up"),
        },
        |node: &str| !node.starts_with("veinminer.pattern."),
    );

    assert_eq!(fixture.player.selected_pattern(), None);
    assert!(matches!(actions[0], SessionAction::Notify { .. }));
}

#[test]
fn pattern_sync_filters_inaccessible_patterns() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();

    let actions = fixture.handle_with_permissions(
        &mut session,
        handshake(PROTOCOL_VERSION),
        |node: &str| !node.starts_with("veinminer.pattern.staircase"),
    );

    let SessionAction::Send(ClientboundMessage::SyncRegisteredPatterns { keys }) = &actions[1]
    else {
        panic!("expected pattern sync, got {:?}", actions[1]);
    };
    assert_eq!(
        keys,
        &vec![key("veinminer:default"), key("veinminer:tunnel")]
    );
}

#[test]
fn vein_mine_requests_surface_to_the_host() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    let origin = BlockPosition::new(12, -5, 7);
    let actions = fixture.handle(&mut session, ServerboundMessage::RequestVeinMine { origin });
    assert_eq!(actions, vec![SessionAction::VeinMineRequested { origin }]);

    let reply = ClientSession::vein_mine_results(vec![origin, origin.offset(1, 0, 0)]);
    let ClientboundMessage::VeinMineResults { positions } = reply else {
        panic!("expected vein mine results");
    };
    assert_eq!(positions.len(), 2);
}

#[test]
fn unknown_message_ids_are_ignored_and_the_connection_survives() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    let frame = [0x4F, 0x01, 0x02, 0x03];
    let allow_all = |_: &str| true;
    let mut context = SessionContext {
        player: &mut fixture.player,
        patterns: &fixture.patterns,
        permissions: &allow_all,
    };
    let actions = session.handle_frame(&frame, &mut context);

    assert!(actions.is_empty());
    assert!(session.is_active());
}

#[test]
fn a_malformed_handshake_terminates_the_connection() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();

    // Handshake id with a truncated varint payload.
    let frame = [0x00, 0x80];
    let allow_all = |_: &str| true;
    let mut context = SessionContext {
        player: &mut fixture.player,
        patterns: &fixture.patterns,
        permissions: &allow_all,
    };
    let actions = session.handle_frame(&frame, &mut context);

    assert_eq!(session.state(), ConnectionState::Rejected);
    assert!(matches!(actions[0], SessionAction::Disconnect { .. }));
}

#[test]
fn malformed_gameplay_messages_do_not_terminate_an_active_connection() {
    let mut fixture = Fixture::new();
    let mut session = ClientSession::new();
    fixture.handle(&mut session, handshake(PROTOCOL_VERSION));

    // Select-pattern id with a string length running past the buffer.
    let frame = [0x03, 0x20, b'a'];
    let allow_all = |_: &str| true;
    let mut context = SessionContext {
        player: &mut fixture.player,
        patterns: &fixture.patterns,
        permissions: &allow_all,
    };
    let actions = session.handle_frame(&frame, &mut context);

    assert!(actions.is_empty());
    assert!(session.is_active());
}
