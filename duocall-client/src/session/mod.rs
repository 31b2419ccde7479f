mod event;
mod peer_session;
mod status;

pub use event::SessionEvent;
pub use peer_session::{PeerSession, SessionState};
pub use status::ConnectionStatus;
