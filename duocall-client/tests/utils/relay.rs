use async_trait::async_trait;
use duocall_client::{ChannelError, ChannelEvent, SignalingChannel};
use duocall_core::{ParticipantId, RoomId, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

struct Member {
    id: ParticipantId,
    tx: mpsc::Sender<ChannelEvent>,
}

#[derive(Default)]
struct RelayState {
    rooms: HashMap<RoomId, Vec<Member>>,
    log: Vec<(ParticipantId, SignalMessage)>,
}

/// In-process stand-in for the signaling relay. Enforces the two-party
/// room cap, fans join/leave notifications out to every member (the
/// sender included), and routes peer-addressed messages to their
/// target. Everything sent through it is logged for verification.
#[derive(Clone)]
pub struct TestRelay {
    state: Arc<Mutex<RelayState>>,
}

impl TestRelay {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState::default())),
        }
    }

    /// A channel bound to one participant identity, plus the event
    /// stream that participant's orchestrator consumes.
    pub fn channel(&self, id: &str) -> (Arc<RelayChannel>, mpsc::Receiver<ChannelEvent>) {
        let (tx, rx) = mpsc::channel(256);
        let channel = Arc::new(RelayChannel {
            state: self.state.clone(),
            self_id: ParticipantId::from(id),
            tx,
        });
        (channel, rx)
    }

    pub async fn log(&self) -> Vec<(ParticipantId, SignalMessage)> {
        self.state.lock().await.log.clone()
    }

    pub async fn offers_sent_by(&self, id: &str) -> usize {
        let sender = ParticipantId::from(id);
        self.state
            .lock()
            .await
            .log
            .iter()
            .filter(|(from, msg)| *from == sender && matches!(msg, SignalMessage::Offer { .. }))
            .count()
    }

    pub async fn room_size(&self, room_id: &str) -> usize {
        self.state
            .lock()
            .await
            .rooms
            .get(&RoomId::from(room_id))
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

pub struct RelayChannel {
    state: Arc<Mutex<RelayState>>,
    self_id: ParticipantId,
    tx: mpsc::Sender<ChannelEvent>,
}

#[async_trait]
impl SignalingChannel for RelayChannel {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError> {
        let mut state = self.state.lock().await;
        state.log.push((self.self_id.clone(), msg.clone()));

        match msg {
            SignalMessage::JoinRoom { room_id } => {
                let members = state.rooms.entry(room_id.clone()).or_default();
                if members.len() >= 2 {
                    let _ = self
                        .tx
                        .send(ChannelEvent::Signal(SignalMessage::RoomFull { room_id }))
                        .await;
                    return Ok(());
                }

                let count = (members.len() + 1) as u32;
                // The joiner learns the existing occupants, then every
                // member (joiner included) hears about the new arrival.
                for member in members.iter() {
                    let _ = self
                        .tx
                        .send(ChannelEvent::Signal(SignalMessage::PeerJoined {
                            room_id: room_id.clone(),
                            peer_id: member.id.clone(),
                            participant_count: count,
                        }))
                        .await;
                }
                members.push(Member {
                    id: self.self_id.clone(),
                    tx: self.tx.clone(),
                });
                for member in members.iter() {
                    let _ = member
                        .tx
                        .send(ChannelEvent::Signal(SignalMessage::PeerJoined {
                            room_id: room_id.clone(),
                            peer_id: self.self_id.clone(),
                            participant_count: count,
                        }))
                        .await;
                }
            }
            SignalMessage::LeaveRoom { room_id } => {
                if let Some(members) = state.rooms.get_mut(&room_id) {
                    members.retain(|member| member.id != self.self_id);
                    for member in members.iter() {
                        let _ = member
                            .tx
                            .send(ChannelEvent::Signal(SignalMessage::PeerLeft {
                                room_id: room_id.clone(),
                                peer_id: self.self_id.clone(),
                            }))
                            .await;
                    }
                }
            }
            other => {
                let Some(target_id) = other.target_id().cloned() else {
                    return Ok(());
                };
                let room_id = other.room_id().clone();
                if let Some(members) = state.rooms.get(&room_id) {
                    if let Some(target) = members.iter().find(|member| member.id == target_id) {
                        let _ = target.tx.send(ChannelEvent::Signal(other)).await;
                    }
                }
            }
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}
