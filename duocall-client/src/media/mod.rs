mod devices;
mod local_media;

pub use devices::{MediaDevices, SampleTrackDevices};
pub use local_media::LocalMediaHandle;
