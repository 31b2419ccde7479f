use crate::config::CallConfig;
use crate::error::{IceError, MediaError, SessionError};
use crate::media::{LocalMediaHandle, MediaDevices};
use crate::session::{ConnectionStatus, SessionEvent};
use duocall_core::{IceCandidateDescriptor, IceServerConfig};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::policy::ice_transport_policy::RTCIceTransportPolicy;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Negotiation progress of the current peer-connection instance.
/// `Closed` is terminal for the instance; `open` constructs a fresh one
/// and resets to `AwaitingOffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    AwaitingOffer,
    Offering,
    Negotiated,
    Closed,
}

/// Owns at most one peer connection and the local media for a room
/// visit.
///
/// The connection is an owned value replaced wholesale on re-arm, never
/// mutated in place: `close` must complete before the next `open`, and
/// the orchestrator inserts the settling delay between the two. Local
/// media outlives individual connections so a new peer can be served
/// without prompting for the devices again.
pub struct PeerSession {
    config: CallConfig,
    media: Option<Arc<LocalMediaHandle>>,
    pc: Option<Arc<RTCPeerConnection>>,
    state: SessionState,
    /// Remote candidates that arrived before a remote description was
    /// committed; scoped to this connection instance.
    pending_remote_candidates: Vec<IceCandidateDescriptor>,
    status_tx: watch::Sender<ConnectionStatus>,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl PeerSession {
    pub fn new(config: CallConfig) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Closed);
        Self {
            config,
            media: None,
            pc: None,
            state: SessionState::Unopened,
            pending_remote_candidates: Vec::new(),
            status_tx,
            status_rx,
        }
    }

    /// Acquire camera/microphone once per room visit. Idempotent: an
    /// existing handle is reused, not re-requested.
    pub async fn acquire_local_media(
        &mut self,
        devices: &dyn MediaDevices,
    ) -> Result<Arc<LocalMediaHandle>, MediaError> {
        if let Some(media) = &self.media {
            debug!("local media already held, reusing");
            return Ok(Arc::clone(media));
        }
        info!("requesting local media (camera/microphone)");
        let media = Arc::new(devices.acquire().await?);
        self.media = Some(Arc::clone(&media));
        Ok(media)
    }

    pub fn has_local_media(&self) -> bool {
        self.media.is_some()
    }

    /// Room-exit path: disable and drop the media handle. Peer-departure
    /// teardown must not call this.
    pub fn release_media(&mut self) {
        if let Some(media) = self.media.take() {
            media.set_audio_enabled(false);
            media.set_video_enabled(false);
            info!("local media released");
        }
    }

    /// Create a fresh peer connection, attach the held local tracks and
    /// register the event callbacks. Fails cleanly: no partially
    /// constructed connection stays registered.
    pub async fn open(&mut self, events: mpsc::Sender<SessionEvent>) -> Result<(), SessionError> {
        if self.pc.is_some() {
            return Err(SessionError::StillOpen);
        }
        let media = self.media.clone().ok_or(SessionError::NoLocalMedia)?;

        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(SessionError::Init)?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(SessionError::Init)?;

        let mut setting_engine = SettingEngine::default();
        if self.config.include_loopback {
            setting_engine.set_include_loopback_candidate(true);
        }

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_setting_engine(setting_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers(&self.config.ice_servers),
            // Relay-only keeps host/srflx paths out of the candidate set
            // so peers never see each other's addresses.
            ice_transport_policy: if self.config.force_relay {
                RTCIceTransportPolicy::Relay
            } else {
                RTCIceTransportPolicy::All
            },
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(SessionError::Init)?,
        );

        for track in media.tracks() {
            if let Err(e) = pc.add_track(track).await {
                let _ = pc.close().await;
                return Err(SessionError::Init(e));
            }
        }

        self.register_callbacks(&pc, events);

        self.pending_remote_candidates.clear();
        let _ = self.status_tx.send(ConnectionStatus::Connecting);
        self.state = SessionState::AwaitingOffer;
        self.pc = Some(pc);
        info!(
            "peer connection opened (transport policy: {})",
            if self.config.force_relay { "relay" } else { "all" }
        );
        Ok(())
    }

    fn register_callbacks(&self, pc: &Arc<RTCPeerConnection>, events: mpsc::Sender<SessionEvent>) {
        let track_events = events.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let events = track_events.clone();
            Box::pin(async move {
                info!("remote track received: {}", track.kind());
                let _ = events.send(SessionEvent::RemoteTrack(track)).await;
            })
        }));

        let ice_events = events.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    debug!("local ice gathering complete");
                    return;
                };
                let Ok(init) = candidate.to_json() else {
                    warn!("failed to serialize local ice candidate");
                    return;
                };
                let descriptor = IceCandidateDescriptor {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = events.send(SessionEvent::LocalCandidate(descriptor)).await;
            })
        }));

        let status_tx = self.status_tx.clone();
        pc.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            let events = events.clone();
            let status_tx = status_tx.clone();
            Box::pin(async move {
                let status = ConnectionStatus::from(state);
                info!("ice connection state changed: {state}");
                let _ = status_tx.send(status);
                let _ = events.send(SessionEvent::StatusChanged(status)).await;
            })
        }));
    }

    /// Generate a local offer and commit it as the local description.
    /// No offer is returned without a matching local-description commit.
    pub async fn create_offer(&mut self) -> Result<String, SessionError> {
        let pc = self.pc.as_ref().ok_or(SessionError::NotOpen)?;
        let offer = pc.create_offer(None).await.map_err(SessionError::Negotiation)?;
        let sdp = offer.sdp.clone();
        pc.set_local_description(offer)
            .await
            .map_err(SessionError::Negotiation)?;
        self.state = SessionState::Offering;
        debug!("local offer committed");
        Ok(sdp)
    }

    /// Apply a remote offer, generate an answer and commit it locally.
    pub async fn create_answer(&mut self, remote_offer: String) -> Result<String, SessionError> {
        let pc = self.pc.as_ref().ok_or(SessionError::NotOpen)?.clone();
        let offer =
            RTCSessionDescription::offer(remote_offer).map_err(SessionError::Negotiation)?;
        pc.set_remote_description(offer)
            .await
            .map_err(SessionError::Negotiation)?;
        self.flush_pending_candidates(&pc).await;

        let answer = pc.create_answer(None).await.map_err(SessionError::Negotiation)?;
        let sdp = answer.sdp.clone();
        pc.set_local_description(answer)
            .await
            .map_err(SessionError::Negotiation)?;
        self.state = SessionState::Negotiated;
        debug!("answer committed for remote offer");
        Ok(sdp)
    }

    /// Apply the remote answer. Valid only after a local offer commit.
    pub async fn apply_remote_answer(&mut self, remote_answer: String) -> Result<(), SessionError> {
        let pc = self.pc.as_ref().ok_or(SessionError::NotOpen)?.clone();
        if pc.local_description().await.is_none() {
            return Err(SessionError::NoPendingOffer);
        }
        let answer =
            RTCSessionDescription::answer(remote_answer).map_err(SessionError::Negotiation)?;
        pc.set_remote_description(answer)
            .await
            .map_err(SessionError::Negotiation)?;
        self.flush_pending_candidates(&pc).await;
        self.state = SessionState::Negotiated;
        debug!("remote answer applied");
        Ok(())
    }

    /// Submit a remote candidate. Empty candidates are rejected before
    /// submission; candidates arriving ahead of the remote description
    /// are buffered for this connection instance and flushed once the
    /// description commits.
    pub async fn add_remote_ice_candidate(
        &mut self,
        candidate: IceCandidateDescriptor,
    ) -> Result<(), IceError> {
        if candidate.is_empty() {
            return Err(IceError::EmptyCandidate);
        }
        let Some(pc) = self.pc.as_ref() else {
            debug!("no open connection, dropping remote candidate");
            return Ok(());
        };
        if pc.remote_description().await.is_none() {
            debug!("buffering early remote candidate");
            self.pending_remote_candidates.push(candidate);
            return Ok(());
        }
        submit_candidate(pc, candidate).await
    }

    async fn flush_pending_candidates(&mut self, pc: &Arc<RTCPeerConnection>) {
        for candidate in std::mem::take(&mut self.pending_remote_candidates) {
            if let Err(e) = submit_candidate(pc, candidate).await {
                warn!("buffered ice candidate rejected: {e}");
            }
        }
    }

    /// Mute/unmute without renegotiation.
    pub fn set_audio_enabled(&self, enabled: bool) {
        if let Some(media) = &self.media {
            media.set_audio_enabled(enabled);
        }
    }

    pub fn set_video_enabled(&self, enabled: bool) {
        if let Some(media) = &self.media {
            media.set_video_enabled(enabled);
        }
    }

    /// Tear down the connection: detach handlers first so late
    /// callbacks are suppressed, stop the transceivers, then close.
    /// Local media stays held for the next `open`.
    pub async fn close(&mut self) {
        if let Some(pc) = self.pc.take() {
            detach_handlers(&pc);
            for transceiver in pc.get_transceivers().await {
                if let Err(e) = transceiver.stop().await {
                    debug!("transceiver stop: {e}");
                }
            }
            if let Err(e) = pc.close().await {
                warn!("peer connection close failed: {e}");
            }
            info!("peer connection closed");
        }
        self.pending_remote_candidates.clear();
        self.state = SessionState::Closed;
        let _ = self.status_tx.send(ConnectionStatus::Closed);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Snapshot of the ICE state projection.
    pub fn connection_status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }
}

fn ice_servers(configs: &[IceServerConfig]) -> Vec<RTCIceServer> {
    configs
        .iter()
        .map(|server| RTCIceServer {
            urls: server.urls.clone(),
            username: server.username.clone().unwrap_or_default(),
            credential: server.credential.clone().unwrap_or_default(),
        })
        .collect()
}

async fn submit_candidate(
    pc: &Arc<RTCPeerConnection>,
    candidate: IceCandidateDescriptor,
) -> Result<(), IceError> {
    let init = RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: None,
    };
    pc.add_ice_candidate(init).await.map_err(IceError::Rejected)
}

fn detach_handlers(pc: &Arc<RTCPeerConnection>) {
    pc.on_track(Box::new(|_, _, _| Box::pin(async {})));
    pc.on_ice_candidate(Box::new(|_| Box::pin(async {})));
    pc.on_ice_connection_state_change(Box::new(|_| Box::pin(async {})));
    pc.on_peer_connection_state_change(Box::new(|_| Box::pin(async {})));
    pc.on_signaling_state_change(Box::new(|_| Box::pin(async {})));
}
