//! Integration tests for the session actor driven through its handle.

use std::time::Duration;

use oddeven_protocol::{JsonCodec, Role, ServerMessage, BOARD_CELLS};
use oddeven_session::{
    spawn_session, Outbound, SessionError, SessionHandle, SessionPhase,
};
use oddeven_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<Outbound>;

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn start() -> SessionHandle {
    spawn_session(JsonCodec, 16)
}

async fn join(session: &SessionHandle, id: u64) -> (Role, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let role = session.connect(cid(id), tx).await.unwrap();
    (role, rx)
}

/// Receives the next outbound item, failing the test if none arrives.
async fn next(inbox: &mut Inbox) -> Outbound {
    tokio::time::timeout(Duration::from_secs(1), inbox.recv())
        .await
        .expect("timed out waiting for outbound message")
        .expect("outbound channel closed")
}

async fn next_msg(inbox: &mut Inbox) -> ServerMessage {
    match next(inbox).await {
        Outbound::Message(msg) => msg,
        Outbound::Close => panic!("expected a message, got Close"),
    }
}

/// Drains everything queued so far.
async fn drain(session: &SessionHandle, inbox: &mut Inbox) {
    // A round trip through the actor guarantees earlier commands finished.
    session.info().await.unwrap();
    while inbox.try_recv().is_ok() {}
}

async fn send(session: &SessionHandle, id: u64, json: &str) {
    session
        .inbound(cid(id), json.as_bytes().to_vec())
        .await
        .unwrap();
}

async fn increment(session: &SessionHandle, id: u64, square: i64) {
    send(session, id, &format!(r#"{{"type":"INCREMENT","square":{square}}}"#))
        .await;
}

async fn seated_pair(session: &SessionHandle) -> (Inbox, Inbox) {
    let (_, mut a) = join(session, 1).await;
    let (_, mut b) = join(session, 2).await;
    drain(session, &mut a).await;
    drain(session, &mut b).await;
    (a, b)
}

fn error_text(msg: &ServerMessage) -> &str {
    match msg {
        ServerMessage::Error { message } => message,
        other => panic!("expected ERROR, got {}", other.kind()),
    }
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test]
async fn test_first_player_is_odd_and_waits() {
    let session = start();
    let (role, mut inbox) = join(&session, 1).await;

    assert_eq!(role, Role::Odd);
    assert_eq!(
        next_msg(&mut inbox).await,
        ServerMessage::PlayerAssigned {
            player: Role::Odd,
            board: [0; BOARD_CELLS],
        }
    );
    assert!(matches!(
        next_msg(&mut inbox).await,
        ServerMessage::Waiting { .. }
    ));
}

#[tokio::test]
async fn test_second_player_starts_the_game_for_both() {
    let session = start();
    let (_, mut odd) = join(&session, 1).await;
    drain(&session, &mut odd).await;
    let (role, mut even) = join(&session, 2).await;

    assert_eq!(role, Role::Even);
    // Joiner's own assignment, then the pair-wide push.
    for _ in 0..2 {
        assert!(matches!(
            next_msg(&mut even).await,
            ServerMessage::PlayerAssigned {
                player: Role::Even,
                ..
            }
        ));
    }
    assert!(matches!(
        next_msg(&mut odd).await,
        ServerMessage::PlayerAssigned {
            player: Role::Odd,
            ..
        }
    ));

    let info = session.info().await.unwrap();
    assert_eq!(info.phase, SessionPhase::Playing);
    assert_eq!(info.odd, Some(cid(1)));
    assert_eq!(info.even, Some(cid(2)));
}

#[tokio::test]
async fn test_third_connection_gets_error_then_close() {
    let session = start();
    let _pair = seated_pair(&session).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = session.connect(cid(3), tx).await;

    assert_eq!(result, Err(SessionError::Full));
    assert_eq!(error_text(&next_msg(&mut rx).await), "game is full");
    assert_eq!(next(&mut rx).await, Outbound::Close);
    assert_eq!(session.info().await.unwrap().connections, 2);
}

#[tokio::test]
async fn test_duplicate_connection_id_is_rejected() {
    let session = start();
    let (_, _inbox) = join(&session, 1).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    assert_eq!(
        session.connect(cid(1), tx).await,
        Err(SessionError::AlreadyConnected(cid(1)))
    );
}

// =========================================================================
// Gameplay
// =========================================================================

#[tokio::test]
async fn test_increment_before_opponent_is_rejected() {
    let session = start();
    let (_, mut inbox) = join(&session, 1).await;
    drain(&session, &mut inbox).await;

    increment(&session, 1, 5).await;

    assert_eq!(
        error_text(&next_msg(&mut inbox).await),
        "waiting for opponent to join"
    );
    assert_eq!(session.info().await.unwrap().board, [0; BOARD_CELLS]);
}

#[tokio::test]
async fn test_update_reaches_both_players() {
    let session = start();
    let (mut odd, mut even) = seated_pair(&session).await;

    increment(&session, 2, 11).await;

    let expected = ServerMessage::Update {
        square: 11,
        value: 1,
    };
    assert_eq!(next_msg(&mut odd).await, expected);
    assert_eq!(next_msg(&mut even).await, expected);
}

#[tokio::test]
async fn test_diagonal_win_ends_the_game() {
    let session = start();
    let (mut odd, mut even) = seated_pair(&session).await;

    for square in [0, 6, 12, 18, 24] {
        increment(&session, 1, square).await;
    }
    for _ in 0..5 {
        assert!(matches!(
            next_msg(&mut even).await,
            ServerMessage::Update { value: 1, .. }
        ));
    }
    assert_eq!(
        next_msg(&mut even).await,
        ServerMessage::GameOver {
            winner: Role::Odd,
            winning_line: [0, 6, 12, 18, 24],
        }
    );

    drain(&session, &mut odd).await;
    increment(&session, 2, 3).await;
    assert_eq!(
        error_text(&next_msg(&mut even).await),
        "game is already over"
    );
    assert!(odd.try_recv().is_err(), "rejections are private");

    let info = session.info().await.unwrap();
    assert_eq!(info.phase, SessionPhase::GameOver);
    assert_eq!(info.board[3], 0);
}

#[tokio::test]
async fn test_out_of_range_square_is_rejected() {
    let session = start();
    let (mut odd, _even) = seated_pair(&session).await;

    increment(&session, 1, 25).await;
    assert_eq!(
        error_text(&next_msg(&mut odd).await),
        "invalid square index: 25"
    );
}

/// Collects the values of every UPDATE queued so far.
fn update_values(inbox: &mut Inbox) -> Vec<u64> {
    let mut values = Vec::new();
    while let Ok(outbound) = inbox.try_recv() {
        if let Outbound::Message(ServerMessage::Update { square, value }) = outbound {
            assert_eq!(square, 7);
            values.push(value);
        }
    }
    values
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_serialized() {
    const PER_PLAYER: u64 = 200;

    let session = start();
    let (mut odd, mut even) = seated_pair(&session).await;

    let players: Vec<_> = [1, 2]
        .into_iter()
        .map(|id| {
            let session = session.clone();
            tokio::spawn(async move {
                for _ in 0..PER_PLAYER {
                    increment(&session, id, 7).await;
                }
            })
        })
        .collect();
    for player in players {
        player.await.unwrap();
    }

    let info = session.info().await.unwrap();
    assert_eq!(info.board[7], 2 * PER_PLAYER);
    assert_eq!(info.phase, SessionPhase::Playing);

    let seen_by_odd = update_values(&mut odd);
    let seen_by_even = update_values(&mut even);
    let expected: Vec<u64> = (1..=2 * PER_PLAYER).collect();
    assert_eq!(seen_by_odd, expected);
    assert_eq!(seen_by_even, seen_by_odd);
}

// =========================================================================
// Malformed input
// =========================================================================

#[tokio::test]
async fn test_unknown_message_type_is_named_in_error() {
    let session = start();
    let (mut odd, _even) = seated_pair(&session).await;

    send(&session, 1, r#"{"type":"DANCE"}"#).await;
    assert_eq!(
        error_text(&next_msg(&mut odd).await),
        "unknown message type: DANCE"
    );
}

#[tokio::test]
async fn test_malformed_frame_is_reported_and_session_survives() {
    let session = start();
    let (mut odd, mut even) = seated_pair(&session).await;

    send(&session, 1, "not json").await;
    assert!(
        error_text(&next_msg(&mut odd).await).starts_with("malformed message")
    );

    increment(&session, 1, 0).await;
    assert!(matches!(
        next_msg(&mut even).await,
        ServerMessage::Update { square: 0, .. }
    ));
}

// =========================================================================
// Rematch
// =========================================================================

#[tokio::test]
async fn test_rematch_swaps_roles() {
    let session = start();
    let (mut odd, mut even) = seated_pair(&session).await;
    increment(&session, 1, 4).await;
    drain(&session, &mut odd).await;
    drain(&session, &mut even).await;

    send(&session, 1, r#"{"type":"RESTART_GAME"}"#).await;
    assert!(matches!(
        next_msg(&mut odd).await,
        ServerMessage::WaitingForRematch {
            voted_players: 1,
            total_players: 2,
            ..
        }
    ));
    assert!(matches!(
        next_msg(&mut even).await,
        ServerMessage::WaitingForRematch {
            voted_players: 1,
            ..
        }
    ));

    send(&session, 2, r#"{"type":"RESTART_GAME"}"#).await;
    assert_eq!(
        next_msg(&mut odd).await,
        ServerMessage::PlayerAssigned {
            player: Role::Even,
            board: [0; BOARD_CELLS],
        }
    );
    assert_eq!(
        next_msg(&mut even).await,
        ServerMessage::PlayerAssigned {
            player: Role::Odd,
            board: [0; BOARD_CELLS],
        }
    );

    let info = session.info().await.unwrap();
    assert_eq!(info.odd, Some(cid(2)));
    assert_eq!(info.even, Some(cid(1)));
    assert_eq!(info.rematch_votes, 0);
}

#[tokio::test]
async fn test_rematch_without_opponent_is_rejected() {
    let session = start();
    let (_, mut inbox) = join(&session, 1).await;
    drain(&session, &mut inbox).await;

    send(&session, 1, r#"{"type":"RESTART_GAME"}"#).await;
    assert_eq!(
        error_text(&next_msg(&mut inbox).await),
        "both players must be connected for rematch"
    );
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test]
async fn test_player_disconnect_resets_session() {
    let session = start();
    let (mut odd, _even) = seated_pair(&session).await;
    increment(&session, 1, 9).await;
    drain(&session, &mut odd).await;

    session.disconnect(cid(2)).await.unwrap();
    assert!(matches!(
        next_msg(&mut odd).await,
        ServerMessage::OpponentDisconnected { .. }
    ));

    let info = session.info().await.unwrap();
    assert_eq!(info.phase, SessionPhase::Waiting);
    assert_eq!(info.odd, None);
    assert_eq!(info.board, [0; BOARD_CELLS]);
    assert_eq!(info.connections, 1);

    let (role, _inbox) = join(&session, 3).await;
    assert_eq!(role, Role::Odd);
}

#[tokio::test]
async fn test_leftover_connection_is_not_a_player_after_reset() {
    let session = start();
    let (mut odd, _even) = seated_pair(&session).await;
    session.disconnect(cid(2)).await.unwrap();
    drain(&session, &mut odd).await;

    increment(&session, 1, 0).await;
    assert_eq!(
        error_text(&next_msg(&mut odd).await),
        "waiting for opponent to join"
    );
}

#[tokio::test]
async fn test_disconnect_of_unknown_connection_is_ignored() {
    let session = start();
    let (mut odd, _even) = seated_pair(&session).await;

    session.disconnect(cid(42)).await.unwrap();
    session.info().await.unwrap();
    assert!(odd.try_recv().is_err());
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_closes_connections_and_handle() {
    let session = start();
    let (_, mut inbox) = join(&session, 1).await;
    drain(&session, &mut inbox).await;

    session.shutdown().await.unwrap();
    assert_eq!(next(&mut inbox).await, Outbound::Close);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(session.is_closed());
    assert_eq!(session.info().await, Err(SessionError::Unavailable));
}
