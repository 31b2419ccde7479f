use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: &str) -> Self {
        Self {
            urls: vec![url.to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// One proposed network path, as carried on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateDescriptor {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidateDescriptor {
    /// Malformed/empty candidates are rejected before ever reaching the
    /// peer connection.
    pub fn is_empty(&self) -> bool {
        self.candidate.trim().is_empty()
    }
}

/// The signaling wire protocol between a client and the relay.
///
/// `join-room`/`leave-room` go client-to-relay, `user-joined`/
/// `user-left`/`room-full` relay-to-client, and the peer-addressed
/// events (`offer`, `answer`, `ice-candidate`, `hang-up`) are relayed
/// between the two participants of a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SignalMessage {
    JoinRoom {
        room_id: RoomId,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    #[serde(rename = "user-joined")]
    PeerJoined {
        room_id: RoomId,
        peer_id: ParticipantId,
        participant_count: u32,
    },
    #[serde(rename = "user-left")]
    PeerLeft {
        room_id: RoomId,
        peer_id: ParticipantId,
    },
    RoomFull {
        room_id: RoomId,
    },
    Offer {
        room_id: RoomId,
        sender_id: ParticipantId,
        target_id: ParticipantId,
        sdp_offer: String,
    },
    Answer {
        room_id: RoomId,
        sender_id: ParticipantId,
        target_id: ParticipantId,
        sdp_answer: String,
    },
    IceCandidate {
        room_id: RoomId,
        sender_id: ParticipantId,
        target_id: ParticipantId,
        candidate: IceCandidateDescriptor,
    },
    HangUp {
        room_id: RoomId,
        sender_id: ParticipantId,
        target_id: ParticipantId,
    },
}

impl SignalMessage {
    pub fn room_id(&self) -> &RoomId {
        match self {
            SignalMessage::JoinRoom { room_id }
            | SignalMessage::LeaveRoom { room_id }
            | SignalMessage::PeerJoined { room_id, .. }
            | SignalMessage::PeerLeft { room_id, .. }
            | SignalMessage::RoomFull { room_id }
            | SignalMessage::Offer { room_id, .. }
            | SignalMessage::Answer { room_id, .. }
            | SignalMessage::IceCandidate { room_id, .. }
            | SignalMessage::HangUp { room_id, .. } => room_id,
        }
    }

    /// Sender identity for peer-addressed messages.
    pub fn sender_id(&self) -> Option<&ParticipantId> {
        match self {
            SignalMessage::Offer { sender_id, .. }
            | SignalMessage::Answer { sender_id, .. }
            | SignalMessage::IceCandidate { sender_id, .. }
            | SignalMessage::HangUp { sender_id, .. } => Some(sender_id),
            _ => None,
        }
    }

    pub fn target_id(&self) -> Option<&ParticipantId> {
        match self {
            SignalMessage::Offer { target_id, .. }
            | SignalMessage::Answer { target_id, .. }
            | SignalMessage::IceCandidate { target_id, .. }
            | SignalMessage::HangUp { target_id, .. } => Some(target_id),
            _ => None,
        }
    }

    /// A message is only actionable if its room matches the local
    /// session's room and, for peer-addressed types, it was not sent by
    /// this client itself.
    pub fn actionable_for(&self, room_id: &RoomId, self_id: &ParticipantId) -> bool {
        if self.room_id() != room_id {
            return false;
        }
        match self.sender_id() {
            Some(sender) => sender != self_id,
            None => true,
        }
    }
}
