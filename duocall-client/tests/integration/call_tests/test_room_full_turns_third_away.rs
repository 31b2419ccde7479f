use duocall_client::{CallPhase, SignalingChannel};
use duocall_core::{RoomId, SignalMessage};

use crate::integration::{init_tracing, start_participant};
use crate::utils::{TestRelay, wait_for_phase};

/// A third participant joining an occupied room is turned away and the
/// established pair is left undisturbed.
#[tokio::test]
async fn test_room_full_turns_third_away() {
    init_tracing();

    let relay = TestRelay::new();

    // Occupy the room with two bare channels; no negotiation needed to
    // exercise the cap.
    let (first, _first_rx) = relay.channel("a1");
    let (second, _second_rx) = relay.channel("b2");
    first
        .send(SignalMessage::JoinRoom {
            room_id: RoomId::from("lobby"),
        })
        .await
        .unwrap();
    second
        .send(SignalMessage::JoinRoom {
            room_id: RoomId::from("lobby"),
        })
        .await
        .unwrap();

    let third = start_participant(&relay, "c3", "lobby");
    assert!(
        wait_for_phase(third.phase_watch(), CallPhase::LeftRoom, 5_000).await,
        "a full room should end the third participant's visit"
    );

    assert_eq!(relay.room_size("lobby").await, 2);
    assert_eq!(relay.offers_sent_by("c3").await, 0);
}
