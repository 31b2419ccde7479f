use crate::error::MediaError;
use crate::media::LocalMediaHandle;
use async_trait::async_trait;

/// Platform seam for camera/microphone acquisition.
///
/// Acquisition is the point where the platform prompts the user, so it
/// can fail with a denial; the peer session calls this once per room
/// visit and keeps the resulting handle across peer connections.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn acquire(&self) -> Result<LocalMediaHandle, MediaError>;
}

/// Devices backed by sample tracks that an external capture pipeline
/// writes into. This is the non-interactive counterpart of a device
/// prompt, used by embedders that run their own capture loop and by
/// tests.
pub struct SampleTrackDevices {
    stream_id: String,
}

impl SampleTrackDevices {
    pub fn new(stream_id: &str) -> Self {
        Self {
            stream_id: stream_id.to_owned(),
        }
    }
}

#[async_trait]
impl MediaDevices for SampleTrackDevices {
    async fn acquire(&self) -> Result<LocalMediaHandle, MediaError> {
        Ok(LocalMediaHandle::with_stream_id(&self.stream_id))
    }
}
