use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

/// Read-only projection of the peer connection's ICE state for UI
/// consumption. Derived, never a source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl From<RTCIceConnectionState> for ConnectionStatus {
    fn from(state: RTCIceConnectionState) -> Self {
        match state {
            RTCIceConnectionState::Connected | RTCIceConnectionState::Completed => {
                ConnectionStatus::Connected
            }
            RTCIceConnectionState::Disconnected => ConnectionStatus::Disconnected,
            RTCIceConnectionState::Failed => ConnectionStatus::Failed,
            RTCIceConnectionState::Closed => ConnectionStatus::Closed,
            _ => ConnectionStatus::Connecting,
        }
    }
}
