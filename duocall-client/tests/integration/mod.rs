pub mod call_tests;

use duocall_client::{CallConfig, CallHandle, CallOrchestrator, MediaDevices, SampleTrackDevices};
use duocall_core::{ParticipantId, RoomId};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::utils::TestRelay;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Loopback-friendly config: host candidates on the loopback interface
/// are enough to connect two sessions in the same process, and a short
/// settling delay keeps the re-arm tests fast.
pub fn loopback_config() -> CallConfig {
    CallConfig {
        ice_servers: vec![],
        force_relay: false,
        include_loopback: true,
        settle_delay: Duration::from_millis(50),
        ..CallConfig::default()
    }
}

/// Spawn a full participant: relay channel, orchestrator, sample-track
/// devices. Returns the handle the tests drive and observe.
pub fn start_participant(relay: &TestRelay, id: &str, room: &str) -> CallHandle {
    start_participant_with(relay, id, room, Arc::new(SampleTrackDevices::new(id)))
}

pub fn start_participant_with(
    relay: &TestRelay,
    id: &str,
    room: &str,
    devices: Arc<dyn MediaDevices>,
) -> CallHandle {
    let (channel, channel_rx) = relay.channel(id);
    let (orchestrator, handle) = CallOrchestrator::new(
        channel,
        channel_rx,
        devices,
        ParticipantId::from(id),
        RoomId::from(room),
        loopback_config(),
    );
    tokio::spawn(orchestrator.run());
    handle
}
