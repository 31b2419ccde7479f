/// Commands entering the orchestrator loop.
///
/// The first four map to local user actions. `Rearm` is scheduled by
/// the orchestrator itself after a teardown: it fires once the settling
/// delay elapsed and carries the teardown epoch, so a timer armed for
/// an older session instance is recognized as stale and dropped.
#[derive(Debug, Clone)]
pub enum CallCommand {
    SetAudioEnabled(bool),
    SetVideoEnabled(bool),
    HangUp,
    LeaveRoom,
    Rearm { epoch: u64 },
}
