use duocall_client::CallPhase;
use std::sync::Arc;

use crate::integration::{init_tracing, start_participant_with};
use crate::utils::{DeniedDevices, TestRelay, wait_for_phase};

/// A declined device prompt ends the room visit before anything is
/// signaled to the relay.
#[tokio::test]
async fn test_media_denied_ends_visit() {
    init_tracing();

    let relay = TestRelay::new();
    let handle = start_participant_with(&relay, "a1", "lobby", Arc::new(DeniedDevices));

    assert!(
        wait_for_phase(handle.phase_watch(), CallPhase::LeftRoom, 5_000).await,
        "denied media should end the visit"
    );
    assert!(relay.log().await.is_empty(), "nothing should reach the relay");
    assert_eq!(relay.room_size("lobby").await, 0);
}
