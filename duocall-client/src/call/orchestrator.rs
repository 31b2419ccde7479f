use crate::call::{CallCommand, CallPhase};
use crate::config::CallConfig;
use crate::media::MediaDevices;
use crate::session::{ConnectionStatus, PeerSession, SessionEvent, SessionState};
use crate::signaling::{ChannelEvent, SignalingChannel};
use duocall_core::{IceCandidateDescriptor, ParticipantId, RoomId, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};
use webrtc::track::track_remote::TrackRemote;

/// UI-facing handle onto a running call: user commands in, phase /
/// connection status / remote media observations out.
#[derive(Clone)]
pub struct CallHandle {
    commands: mpsc::Sender<CallCommand>,
    phase: watch::Receiver<CallPhase>,
    status: watch::Receiver<ConnectionStatus>,
    remote_track: watch::Receiver<Option<Arc<TrackRemote>>>,
}

impl CallHandle {
    pub async fn set_audio_enabled(&self, enabled: bool) {
        let _ = self.commands.send(CallCommand::SetAudioEnabled(enabled)).await;
    }

    pub async fn set_video_enabled(&self, enabled: bool) {
        let _ = self.commands.send(CallCommand::SetVideoEnabled(enabled)).await;
    }

    /// End the current call but stay in the room for the next peer.
    pub async fn hang_up(&self) {
        let _ = self.commands.send(CallCommand::HangUp).await;
    }

    /// Leave the room entirely; local media is released.
    pub async fn leave_room(&self) {
        let _ = self.commands.send(CallCommand::LeaveRoom).await;
    }

    pub fn phase(&self) -> CallPhase {
        *self.phase.borrow()
    }

    pub fn phase_watch(&self) -> watch::Receiver<CallPhase> {
        self.phase.clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn remote_track_watch(&self) -> watch::Receiver<Option<Arc<TrackRemote>>> {
        self.remote_track.clone()
    }
}

/// Binds the signaling channel to the peer session and runs the
/// two-party state machine for one room occupancy.
///
/// Everything funnels through one `select!` loop: relay messages,
/// events pushed back by the peer connection's callbacks, and user
/// commands. The loop is the single writer of call state; nothing else
/// mutates it.
pub struct CallOrchestrator {
    channel: Arc<dyn SignalingChannel>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    devices: Arc<dyn MediaDevices>,
    config: CallConfig,
    room_id: RoomId,
    self_id: ParticipantId,

    session: PeerSession,
    session_tx: mpsc::Sender<SessionEvent>,
    session_rx: mpsc::Receiver<SessionEvent>,

    command_tx: mpsc::Sender<CallCommand>,
    command_rx: mpsc::Receiver<CallCommand>,

    remote_peer: Option<ParticipantId>,
    /// Bumped on every teardown; stale re-arm timers carry older values.
    epoch: u64,
    /// Negotiation-bearing signals that arrived while the session was
    /// settling after a teardown; replayed in order once re-armed.
    deferred_signals: Vec<SignalMessage>,
    phase: CallPhase,
    joined: bool,

    phase_tx: watch::Sender<CallPhase>,
    status_tx: watch::Sender<ConnectionStatus>,
    remote_track_tx: watch::Sender<Option<Arc<TrackRemote>>>,
}

impl CallOrchestrator {
    pub fn new(
        channel: Arc<dyn SignalingChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        devices: Arc<dyn MediaDevices>,
        self_id: ParticipantId,
        room_id: RoomId,
        config: CallConfig,
    ) -> (Self, CallHandle) {
        let (session_tx, session_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);
        let (phase_tx, phase_rx) = watch::channel(CallPhase::Idle);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Closed);
        let (remote_track_tx, remote_track_rx) = watch::channel(None);

        let handle = CallHandle {
            commands: command_tx.clone(),
            phase: phase_rx,
            status: status_rx,
            remote_track: remote_track_rx,
        };

        let orchestrator = Self {
            channel,
            channel_rx,
            devices,
            session: PeerSession::new(config.clone()),
            config,
            room_id,
            self_id,
            session_tx,
            session_rx,
            command_tx,
            command_rx,
            remote_peer: None,
            epoch: 0,
            deferred_signals: Vec::new(),
            phase: CallPhase::Idle,
            joined: false,
            phase_tx,
            status_tx,
            remote_track_tx,
        };

        (orchestrator, handle)
    }

    /// Drive the room occupancy to completion. Returns when the user
    /// leaves, the relay reports the room full, media is denied, or a
    /// peer connection cannot be constructed.
    pub async fn run(mut self) {
        if let Err(e) = self
            .session
            .acquire_local_media(self.devices.as_ref())
            .await
        {
            // Media denial is fatal to the visit; no silent retry.
            error!("cannot start call: {e}");
            self.set_phase(CallPhase::LeftRoom);
            return;
        }

        if let Err(e) = self.session.open(self.session_tx.clone()).await {
            // Construction failure is environmental, nothing in the
            // visit would make a later attempt succeed.
            error!("peer connection could not be constructed, leaving: {e}");
            self.session.release_media();
            self.set_phase(CallPhase::LeftRoom);
            return;
        }

        self.set_phase(CallPhase::JoiningRoom);
        if self.channel.is_ready() {
            self.join_room().await;
        }

        loop {
            tokio::select! {
                event = self.channel_rx.recv() => match event {
                    Some(event) => self.handle_channel_event(event).await,
                    None => {
                        warn!("signaling event stream closed, leaving room");
                        self.set_phase(CallPhase::LeftRoom);
                    }
                },
                event = self.session_rx.recv() => {
                    if let Some(event) = event {
                        self.handle_session_event(event).await;
                    }
                },
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        info!("call handle dropped, leaving room");
                        self.leave_room().await;
                    }
                },
            }

            if self.phase == CallPhase::LeftRoom {
                break;
            }
        }

        self.session.close().await;
        self.session.release_media();
        info!("left room {}", self.room_id);
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Ready => {
                if !self.joined {
                    self.join_room().await;
                }
            }
            ChannelEvent::NotReady => {
                warn!("signaling channel lost readiness");
            }
            ChannelEvent::Signal(msg) => self.handle_signal(msg).await,
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        if !msg.actionable_for(&self.room_id, &self.self_id) {
            trace!("dropping non-actionable message: {:?}", msg);
            return;
        }

        // While the torn-down connection settles, negotiation cannot
        // proceed. Hold these until the re-arm instead of adopting a
        // peer the closed session cannot serve.
        if self.session.state() == SessionState::Closed
            && matches!(
                msg,
                SignalMessage::PeerJoined { .. }
                    | SignalMessage::Offer { .. }
                    | SignalMessage::Answer { .. }
                    | SignalMessage::IceCandidate { .. }
            )
        {
            debug!("session settling, deferring signal: {:?}", msg);
            self.deferred_signals.push(msg);
            return;
        }

        match msg {
            SignalMessage::PeerJoined {
                peer_id,
                participant_count,
                ..
            } => self.on_peer_joined(peer_id, participant_count).await,
            SignalMessage::Offer {
                sender_id,
                sdp_offer,
                ..
            } => self.on_offer(sender_id, sdp_offer).await,
            SignalMessage::Answer {
                sender_id,
                sdp_answer,
                ..
            } => self.on_answer(sender_id, sdp_answer).await,
            SignalMessage::IceCandidate {
                sender_id,
                candidate,
                ..
            } => self.on_remote_candidate(sender_id, candidate).await,
            SignalMessage::PeerLeft { peer_id, .. } => {
                self.on_peer_departed(peer_id, "left the room").await
            }
            SignalMessage::HangUp { sender_id, .. } => {
                self.on_peer_departed(sender_id, "hung up").await
            }
            SignalMessage::RoomFull { .. } => {
                error!("room {} is full, leaving", self.room_id);
                self.set_phase(CallPhase::LeftRoom);
            }
            SignalMessage::JoinRoom { .. } | SignalMessage::LeaveRoom { .. } => {
                trace!("ignoring client-to-relay message echoed to us");
            }
        }
    }

    async fn on_peer_joined(&mut self, peer_id: ParticipantId, participant_count: u32) {
        if peer_id == self.self_id {
            info!(
                "joined room {} ({} participant(s))",
                self.room_id, participant_count
            );
            return;
        }
        if let Some(current) = &self.remote_peer {
            if *current != peer_id {
                warn!("already in a session with {current}, ignoring join of {peer_id}");
            }
            return;
        }

        info!("peer {peer_id} joined room {}", self.room_id);
        self.remote_peer = Some(peer_id.clone());
        self.set_phase(CallPhase::Negotiating);

        if self.self_id.initiates_toward(&peer_id) {
            match self.session.create_offer().await {
                Ok(sdp_offer) => {
                    self.send_signal(SignalMessage::Offer {
                        room_id: self.room_id.clone(),
                        sender_id: self.self_id.clone(),
                        target_id: peer_id,
                        sdp_offer,
                    })
                    .await;
                }
                // Abandon the attempt; a later join or offer retries.
                Err(e) => error!("offer creation failed: {e}"),
            }
        } else {
            info!("waiting for offer from {peer_id}");
        }
    }

    async fn on_offer(&mut self, sender_id: ParticipantId, sdp_offer: String) {
        if let Some(current) = &self.remote_peer {
            if *current != sender_id {
                // At most one peer is serviced at a time.
                warn!("offer from {sender_id} while in a session with {current}, dropping");
                return;
            }
        } else {
            info!("adopting {sender_id} as the remote peer (offer received first)");
            self.remote_peer = Some(sender_id.clone());
            self.set_phase(CallPhase::Negotiating);
        }

        match self.session.create_answer(sdp_offer).await {
            Ok(sdp_answer) => {
                // The awaits above interleave with other events; only
                // reply if this sender is still the tracked peer.
                if self.remote_peer.as_ref() != Some(&sender_id) {
                    warn!("peer {sender_id} no longer current, discarding answer");
                    return;
                }
                self.send_signal(SignalMessage::Answer {
                    room_id: self.room_id.clone(),
                    sender_id: self.self_id.clone(),
                    target_id: sender_id,
                    sdp_answer,
                })
                .await;
            }
            Err(e) => error!("answer creation failed: {e}"),
        }
    }

    async fn on_answer(&mut self, sender_id: ParticipantId, sdp_answer: String) {
        if self.remote_peer.as_ref() != Some(&sender_id) {
            warn!("answer from {sender_id}, who is not the tracked peer; dropping");
            return;
        }
        if let Err(e) = self.session.apply_remote_answer(sdp_answer).await {
            error!("applying remote answer failed: {e}");
        }
    }

    async fn on_remote_candidate(
        &mut self,
        sender_id: ParticipantId,
        candidate: IceCandidateDescriptor,
    ) {
        debug!("remote ice candidate from {sender_id}");
        if let Err(e) = self.session.add_remote_ice_candidate(candidate).await {
            // Soft failure: the candidate is dropped, negotiation continues.
            warn!("remote ice candidate rejected: {e}");
        }
    }

    async fn on_peer_departed(&mut self, peer_id: ParticipantId, what: &str) {
        if self.remote_peer.as_ref() != Some(&peer_id) {
            // The peer may have shown up during the settling window and
            // left again; whatever it sent must not be replayed.
            let before = self.deferred_signals.len();
            self.deferred_signals.retain(|msg| {
                msg.sender_id() != Some(&peer_id)
                    && !matches!(msg, SignalMessage::PeerJoined { peer_id: p, .. } if *p == peer_id)
            });
            if self.deferred_signals.len() < before {
                debug!("peer {peer_id} gone again before re-arm, dropping its deferred signals");
            } else {
                debug!("departure of untracked peer {peer_id}, ignoring");
            }
            return;
        }
        info!("peer {peer_id} {what}");
        self.teardown_and_rearm().await;
    }

    /// Close the current peer connection, clear remote state and, if
    /// local media is still held, schedule a fresh connection for the
    /// next peer after the settling delay. The delay guarantees the
    /// prior instance's teardown has finished before new tracks attach
    /// to the same media handle.
    async fn teardown_and_rearm(&mut self) {
        self.remote_peer = None;
        let _ = self.remote_track_tx.send(None);
        self.session.close().await;
        let _ = self.status_tx.send(ConnectionStatus::Closed);
        self.epoch += 1;
        self.set_phase(CallPhase::AwaitingPeer);

        if self.session.has_local_media() {
            debug!("scheduling session re-arm in {:?}", self.config.settle_delay);
            let commands = self.command_tx.clone();
            let epoch = self.epoch;
            let delay = self.config.settle_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = commands.send(CallCommand::Rearm { epoch }).await;
            });
        }
    }

    async fn handle_command(&mut self, command: CallCommand) {
        match command {
            CallCommand::SetAudioEnabled(enabled) => self.session.set_audio_enabled(enabled),
            CallCommand::SetVideoEnabled(enabled) => self.session.set_video_enabled(enabled),
            CallCommand::HangUp => {
                let Some(peer_id) = self.remote_peer.clone() else {
                    debug!("hang-up with no active call");
                    return;
                };
                info!("hanging up on {peer_id}");
                // Notify the remote side before local teardown.
                self.send_signal(SignalMessage::HangUp {
                    room_id: self.room_id.clone(),
                    sender_id: self.self_id.clone(),
                    target_id: peer_id,
                })
                .await;
                self.teardown_and_rearm().await;
            }
            CallCommand::LeaveRoom => self.leave_room().await,
            CallCommand::Rearm { epoch } => self.rearm(epoch).await,
        }
    }

    async fn rearm(&mut self, epoch: u64) {
        if epoch != self.epoch {
            debug!("stale re-arm timer (epoch {epoch}), ignoring");
            return;
        }
        if self.phase != CallPhase::AwaitingPeer || !self.session.has_local_media() {
            return;
        }
        info!("re-arming peer session for the next peer");
        if let Err(e) = self.session.open(self.session_tx.clone()).await {
            error!("session re-arm failed, leaving: {e}");
            self.set_phase(CallPhase::LeftRoom);
            return;
        }
        // A peer that showed up during the settling window is served
        // now, in arrival order.
        for msg in std::mem::take(&mut self.deferred_signals) {
            self.handle_signal(msg).await;
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RemoteTrack(track) => {
                if self.remote_peer.is_none() {
                    debug!("remote track for a torn-down session, ignoring");
                    return;
                }
                info!("remote media attached");
                let _ = self.remote_track_tx.send(Some(track));
            }
            SessionEvent::LocalCandidate(candidate) => {
                let Some(peer_id) = self.remote_peer.clone() else {
                    debug!("local candidate gathered before a peer is known, dropping");
                    return;
                };
                self.send_signal(SignalMessage::IceCandidate {
                    room_id: self.room_id.clone(),
                    sender_id: self.self_id.clone(),
                    target_id: peer_id,
                    candidate,
                })
                .await;
            }
            SessionEvent::StatusChanged(status) => {
                let _ = self.status_tx.send(status);
                match status {
                    ConnectionStatus::Connected => {
                        if self.phase == CallPhase::Negotiating {
                            self.set_phase(CallPhase::InCall);
                        }
                    }
                    ConnectionStatus::Failed => error!("peer connection failed"),
                    ConnectionStatus::Disconnected => warn!("peer connection interrupted"),
                    _ => {}
                }
            }
        }
    }

    async fn join_room(&mut self) {
        if self.joined {
            return;
        }
        info!("joining room {}", self.room_id);
        self.send_signal(SignalMessage::JoinRoom {
            room_id: self.room_id.clone(),
        })
        .await;
        self.joined = true;
        self.set_phase(CallPhase::AwaitingPeer);
    }

    async fn leave_room(&mut self) {
        if let Some(peer_id) = self.remote_peer.clone() {
            self.send_signal(SignalMessage::HangUp {
                room_id: self.room_id.clone(),
                sender_id: self.self_id.clone(),
                target_id: peer_id,
            })
            .await;
        }
        if self.joined {
            self.send_signal(SignalMessage::LeaveRoom {
                room_id: self.room_id.clone(),
            })
            .await;
        }
        self.set_phase(CallPhase::LeftRoom);
    }

    async fn send_signal(&self, msg: SignalMessage) {
        // NotReady means dropped, not fatal; delivery is never assumed.
        if let Err(e) = self.channel.send(msg).await {
            warn!("signal not delivered: {e}");
        }
    }

    fn set_phase(&mut self, phase: CallPhase) {
        if self.phase != phase {
            debug!("call phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            let _ = self.phase_tx.send(phase);
        }
    }
}
