pub mod media;
pub mod relay;

pub use media::DeniedDevices;
pub use relay::{RelayChannel, TestRelay};

use duocall_client::{CallPhase, ConnectionStatus};
use std::time::Duration;
use tokio::sync::watch;

/// Wait until the watched phase reaches `want` or the timeout elapses.
pub async fn wait_for_phase(
    mut phases: watch::Receiver<CallPhase>,
    want: CallPhase,
    timeout_ms: u64,
) -> bool {
    let _ = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        while *phases.borrow_and_update() != want {
            if phases.changed().await.is_err() {
                break;
            }
        }
    })
    .await;
    *phases.borrow() == want
}

pub async fn wait_for_status(
    mut statuses: watch::Receiver<ConnectionStatus>,
    want: ConnectionStatus,
    timeout_ms: u64,
) -> bool {
    let _ = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        while *statuses.borrow_and_update() != want {
            if statuses.changed().await.is_err() {
                break;
            }
        }
    })
    .await;
    *statuses.borrow() == want
}
