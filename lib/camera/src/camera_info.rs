use crate::{CameraError, CameraResult};
use nokhwa::{
    CallbackCamera, query,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
};

#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: String,
    pub name: String,
    pub description: String,
}

/// Lists cameras that can actually open a stream.
pub fn query_available_cameras() -> Vec<CameraInfo> {
    let cameras = match query(ApiBackend::Auto) {
        Ok(cameras) => cameras,
        Err(e) => {
            log::warn!("query cameras failed: {e}");
            return Vec::new();
        }
    };

    cameras
        .into_iter()
        .filter(|camera| verify_camera(camera.index().clone()))
        .map(|camera| CameraInfo {
            index: camera.index().to_string(),
            name: camera.human_name(),
            description: camera.description().to_string(),
        })
        .collect()
}

pub fn query_camera_id(name: &str) -> CameraResult<CameraIndex> {
    let cameras = query(ApiBackend::Auto)?;

    cameras
        .into_iter()
        .find(|camera| name == camera.human_name() && verify_camera(camera.index().clone()))
        .map(|camera| camera.index().clone())
        .ok_or(CameraError::QueryError(format!("No found camera: {name}")))
}

/// Resolves `name` when given and present, otherwise the first working camera.
pub fn first_available_camera(name: Option<&str>) -> CameraResult<CameraIndex> {
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        match query_camera_id(name.trim()) {
            Ok(index) => return Ok(index),
            Err(e) => log::warn!("{e}, fall back to the first working camera"),
        }
    }

    query(ApiBackend::Auto)?
        .into_iter()
        .map(|camera| camera.index().clone())
        .find(|index| verify_camera(index.clone()))
        .ok_or(CameraError::QueryError("No working camera".to_string()))
}

fn verify_camera(index: CameraIndex) -> bool {
    let format = RequestedFormat::new::<nokhwa::pixel_format::RgbFormat>(
        RequestedFormatType::AbsoluteHighestFrameRate,
    );

    match CallbackCamera::new(index, format, |_| {}) {
        Ok(mut camera) => match camera.open_stream() {
            Ok(_) => {
                _ = camera.stop_stream();
                true
            }
            Err(_) => false,
        },
        Err(_) => false,
    }
}
