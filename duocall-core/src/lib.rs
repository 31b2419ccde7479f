pub mod model;

pub use model::{
    IceCandidateDescriptor, IceServerConfig, ParticipantId, RoomId, SignalMessage,
};
