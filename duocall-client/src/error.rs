use thiserror::Error;

/// Failures of the signaling channel itself.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The relay rejected our identity token. Fatal to the room visit.
    #[error("signaling relay rejected authentication: {0}")]
    Auth(String),

    /// The channel is not ready; the message was dropped. Transient,
    /// the caller must not assume delivery.
    #[error("signaling channel is not ready")]
    NotReady,

    #[error("signaling transport failed: {0}")]
    Transport(String),
}

/// Local media acquisition failures. Fatal to starting a session;
/// surfaced to the user, never retried silently.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media device access denied: {0}")]
    AccessDenied(String),

    #[error("no capture device available")]
    NoDevice,
}

/// Failures of a peer-connection instance. A failed `open` ends the
/// room visit, since nothing in it would make a later construction
/// attempt succeed; negotiation failures only abandon the attempt, and
/// a later peer-joined/offer retries naturally.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Media(#[from] MediaError),

    /// A prior peer connection has not been fully closed yet.
    #[error("previous peer connection is still open")]
    StillOpen,

    #[error("peer session is not open")]
    NotOpen,

    /// `open` requires local media to already be held.
    #[error("local media has not been acquired")]
    NoLocalMedia,

    /// `apply_remote_answer` is only valid after a local offer commit.
    #[error("no local offer has been committed")]
    NoPendingOffer,

    #[error("peer connection setup failed: {0}")]
    Init(#[source] webrtc::Error),

    #[error("negotiation failed: {0}")]
    Negotiation(#[source] webrtc::Error),
}

/// Soft, per-candidate failures. The candidate is dropped and logged;
/// negotiation continues.
#[derive(Debug, Error)]
pub enum IceError {
    #[error("empty ice candidate")]
    EmptyCandidate,

    #[error("ice candidate rejected: {0}")]
    Rejected(#[source] webrtc::Error),
}
