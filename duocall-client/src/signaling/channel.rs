use crate::error::ChannelError;
use async_trait::async_trait;
use duocall_core::SignalMessage;

/// Everything the orchestrator observes from the signaling channel:
/// readiness transitions and inbound relay messages, delivered in
/// per-sender order on one mpsc stream.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Ready,
    NotReady,
    Signal(SignalMessage),
}

/// Outbound half of the signaling relay connection.
///
/// Implemented by the WebSocket adapter in production and by a
/// capturing mock in tests. Sending on a channel that is not ready
/// fails with [`ChannelError::NotReady`]; the message is dropped and
/// the caller must not assume delivery. Messages sent on a ready
/// channel reach the relay in send order; no ordering is guaranteed
/// across distinct senders.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError>;

    fn is_ready(&self) -> bool;
}
