use duocall_client::{CallPhase, ConnectionStatus};

use crate::integration::{init_tracing, start_participant};
use crate::utils::{TestRelay, wait_for_phase, wait_for_status};

/// Hanging up ends the call on both sides but keeps both participants
/// in the room, re-armed for the next peer.
#[tokio::test]
async fn test_hang_up_rearms() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = start_participant(&relay, "a1", "lobby");
    let bob = start_participant(&relay, "b2", "lobby");

    assert!(wait_for_phase(alice.phase_watch(), CallPhase::InCall, 20_000).await);
    assert!(wait_for_phase(bob.phase_watch(), CallPhase::InCall, 20_000).await);

    alice.hang_up().await;

    assert!(
        wait_for_phase(alice.phase_watch(), CallPhase::AwaitingPeer, 5_000).await,
        "hang-up side should wait for the next peer"
    );
    assert!(
        wait_for_phase(bob.phase_watch(), CallPhase::AwaitingPeer, 5_000).await,
        "notified side should wait for the next peer"
    );
    assert!(alice.remote_track_watch().borrow().is_none());
    assert!(bob.remote_track_watch().borrow().is_none());

    // Both stayed members of the room.
    assert_eq!(relay.room_size("lobby").await, 2);

    // After the settling delay a fresh connection is opened, observable
    // as the status leaving Closed for Connecting.
    assert!(
        wait_for_status(alice.status_watch(), ConnectionStatus::Connecting, 5_000).await,
        "hang-up side never re-armed"
    );
    assert!(
        wait_for_status(bob.status_watch(), ConnectionStatus::Connecting, 5_000).await,
        "notified side never re-armed"
    );

    alice.leave_room().await;
    bob.leave_room().await;
}
