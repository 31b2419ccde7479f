mod command;
mod orchestrator;
mod phase;

pub use command::CallCommand;
pub use orchestrator::{CallHandle, CallOrchestrator};
pub use phase::CallPhase;
