use crate::{CameraError, CameraResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;
use nokhwa::{
    CallbackCamera,
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution},
};

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CameraConfig {
    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub fps: Option<u32>,

    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub width: Option<u32>,

    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub height: Option<u32>,
}

/// Streams frames from a camera in the background. The latest frame is
/// pulled on demand with [`CameraClient::last_frame_rgb`].
pub struct CameraClient {
    camera: CallbackCamera,
    is_running: bool,
}

impl CameraClient {
    pub fn new(camera_index: CameraIndex, config: CameraConfig) -> CameraResult<Self> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = CallbackCamera::new(camera_index, format, |_| {})
            .map_err(|e| CameraError::InitializationError(e.to_string()))?;

        if let Some(fps) = config.fps
            && let Err(e) = camera.set_frame_rate(fps)
        {
            log::warn!("camera set frame rate ({fps}) failed: {e}");
        }

        if let Some(w) = config.width
            && let Some(h) = config.height
            && let Err(e) = camera.set_resolution(Resolution::new(w, h))
        {
            log::warn!("camera set resolution ({w} x {h}) failed: {e}");
        }

        Ok(Self {
            camera,
            is_running: false,
        })
    }

    pub fn start(&mut self) -> CameraResult<()> {
        self.camera
            .open_stream()
            .map_err(|e| CameraError::StartError(e.to_string()))?;
        self.is_running = true;

        log::info!("camera stream started");
        Ok(())
    }

    pub fn stop(&mut self) -> CameraResult<()> {
        self.camera
            .stop_stream()
            .map_err(|e| CameraError::StopError(e.to_string()))?;
        self.is_running = false;

        log::info!("camera stream stopped");
        Ok(())
    }

    pub fn last_frame_rgb(&self) -> CameraResult<RgbImage> {
        let buffer = self.camera.last_frame()?;
        let frame = buffer.decode_image::<RgbFormat>()?;

        if frame.is_empty() {
            return Err(CameraError::NoFrameAvailable);
        }

        Ok(frame)
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        if self.is_running
            && let Err(e) = self.stop()
        {
            log::warn!("release camera failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_config_setters() {
        let config = CameraConfig::default();
        assert_eq!((config.fps, config.width, config.height), (None, None, None));

        let config = config.with_fps(30).with_width(640).with_height(480);
        assert_eq!(config.fps, Some(30));
        assert_eq!((config.width, config.height), (Some(640), Some(480)));
    }
}
