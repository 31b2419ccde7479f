use duocall_client::{CallPhase, ConnectionStatus};

use crate::integration::{init_tracing, start_participant};
use crate::utils::{TestRelay, wait_for_phase, wait_for_status};

/// Two participants join the same room, negotiate over the relay and
/// reach a connected call over loopback candidates.
#[tokio::test]
async fn test_two_participants_connect() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = start_participant(&relay, "a1", "lobby");
    let bob = start_participant(&relay, "b2", "lobby");

    assert!(
        wait_for_phase(alice.phase_watch(), CallPhase::InCall, 20_000).await,
        "first participant never reached the call"
    );
    assert!(
        wait_for_phase(bob.phase_watch(), CallPhase::InCall, 20_000).await,
        "second participant never reached the call"
    );

    assert!(wait_for_status(alice.status_watch(), ConnectionStatus::Connected, 5_000).await);
    assert!(wait_for_status(bob.status_watch(), ConnectionStatus::Connected, 5_000).await);

    // Exactly one side initiated: the lexicographically lower identity.
    assert_eq!(relay.offers_sent_by("a1").await, 1);
    assert_eq!(relay.offers_sent_by("b2").await, 0);

    alice.leave_room().await;
    bob.leave_room().await;
    assert!(wait_for_phase(alice.phase_watch(), CallPhase::LeftRoom, 5_000).await);
    assert!(wait_for_phase(bob.phase_watch(), CallPhase::LeftRoom, 5_000).await);
}
