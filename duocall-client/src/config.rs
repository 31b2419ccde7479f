use duocall_core::IceServerConfig;
use std::env;
use std::time::Duration;

/// Client-wide configuration for one room visit.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// WebSocket URL of the signaling relay.
    pub signaling_url: String,

    /// STUN/TURN servers handed to the peer connection.
    pub ice_servers: Vec<IceServerConfig>,

    /// Restrict negotiated paths to relayed candidates so participants
    /// never learn each other's network addresses. Requires at least
    /// one reachable TURN server. On by default.
    pub force_relay: bool,

    /// Gather loopback host candidates. Only useful on test hosts with
    /// no routable interface; meaningless while `force_relay` is set.
    pub include_loopback: bool,

    /// Pause between tearing a peer connection down and re-opening one
    /// for the next peer, so the media stack finishes releasing the
    /// prior instance's resources.
    pub settle_delay: Duration,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://localhost:3001/api/socket".to_owned(),
            ice_servers: vec![
                IceServerConfig::stun("stun:stun.l.google.com:19302"),
                IceServerConfig::stun("stun:stun1.l.google.com:19302"),
            ],
            force_relay: true,
            include_loopback: false,
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl CallConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// `DUOCALL_SIGNALING_URL` overrides the relay URL; `DUOCALL_TURN_URL`
    /// plus `DUOCALL_TURN_USERNAME`/`DUOCALL_TURN_CREDENTIAL` add a TURN
    /// server, which the relay-only policy needs to connect at all.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DUOCALL_SIGNALING_URL") {
            if !url.trim().is_empty() {
                config.signaling_url = url;
            }
        }

        if let Ok(turn_url) = env::var("DUOCALL_TURN_URL") {
            if !turn_url.trim().is_empty() {
                config.ice_servers.push(IceServerConfig {
                    urls: vec![turn_url],
                    username: env::var("DUOCALL_TURN_USERNAME").ok(),
                    credential: env::var("DUOCALL_TURN_CREDENTIAL").ok(),
                });
            }
        }

        config
    }
}
