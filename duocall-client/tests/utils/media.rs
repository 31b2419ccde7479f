use async_trait::async_trait;
use duocall_client::{LocalMediaHandle, MediaDevices, MediaError};

/// Devices whose acquisition is always denied, as when the user
/// declines the camera/microphone prompt.
pub struct DeniedDevices;

#[async_trait]
impl MediaDevices for DeniedDevices {
    async fn acquire(&self) -> Result<LocalMediaHandle, MediaError> {
        Err(MediaError::AccessDenied("declined by user".to_owned()))
    }
}
