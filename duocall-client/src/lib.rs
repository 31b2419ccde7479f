//! Client side of a two-party audio/video call.
//!
//! A [`CallOrchestrator`] ties a [`SignalingChannel`] to a
//! [`PeerSession`]: it joins a room on the relay, negotiates with the
//! one other participant that shows up, and serves peers serially,
//! re-arming after each departure until the user leaves the room.

pub mod call;
pub mod config;
pub mod error;
pub mod media;
pub mod session;
pub mod signaling;

pub use call::{CallHandle, CallOrchestrator, CallPhase};
pub use config::CallConfig;
pub use error::{ChannelError, IceError, MediaError, SessionError};
pub use media::{LocalMediaHandle, MediaDevices, SampleTrackDevices};
pub use session::{ConnectionStatus, PeerSession, SessionEvent, SessionState};
pub use signaling::{ChannelEvent, SignalingChannel, WsSignalingChannel};
