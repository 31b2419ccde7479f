use crate::session::ConnectionStatus;
use duocall_core::IceCandidateDescriptor;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Events a peer-connection instance pushes back into the orchestrator
/// loop. Callbacks never mutate call state directly; they only send.
#[derive(Clone)]
pub enum SessionEvent {
    /// Remote media arrived.
    RemoteTrack(Arc<TrackRemote>),

    /// A local ICE candidate was gathered and should be forwarded to
    /// the tracked peer over signaling.
    LocalCandidate(IceCandidateDescriptor),

    /// ICE state transition, already projected for the UI.
    StatusChanged(ConnectionStatus),
}
