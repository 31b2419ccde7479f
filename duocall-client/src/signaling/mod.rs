mod channel;
mod ws;

pub use channel::{ChannelEvent, SignalingChannel};
pub use ws::WsSignalingChannel;
