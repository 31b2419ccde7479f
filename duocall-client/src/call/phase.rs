/// Where one room occupancy stands. Serial 1:1 sessions cycle between
/// `AwaitingPeer`, `Negotiating` and `InCall`; `LeftRoom` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    JoiningRoom,
    AwaitingPeer,
    Negotiating,
    InCall,
    LeftRoom,
}
