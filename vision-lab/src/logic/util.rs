//! Helpers shared by the demo pages: window setup, file picking and
//! conversion of processed images into Slint pixel buffers.

use super::toast;
use crate::{config, slint_generatedAppWindow::AppWindow};
use cv_ops::RgbImage;
use slint::{ComponentHandle, Rgb8Pixel, SharedPixelBuffer, Weak};
use std::path::PathBuf;

pub fn init(ui: &AppWindow) {
    let preference = config::all().preference;
    ui.window().set_size(slint::LogicalSize {
        width: preference.win_width as f32,
        height: preference.win_height as f32,
    });

    ui.window().on_close_requested(move || {
        super::hough::stop_camera();
        slint::CloseRequestResponse::HideWindow
    });
}

/// Blocks on a native file dialog. Call it off the UI thread.
pub fn picker_file(
    ui: Weak<AppWindow>,
    title: &str,
    filter_name: &str,
    filter_extensions: &[&str],
) -> Option<PathBuf> {
    let mut file_dialog = native_dialog::DialogBuilder::file().set_title(title);

    if !filter_extensions.is_empty() {
        file_dialog = file_dialog.add_filter(filter_name, filter_extensions);
    }

    match file_dialog.open_single_file().show() {
        Ok(Some(path)) => Some(path),
        Err(e) => {
            toast::async_toast_warn(ui, format!("Choose file failed. Reason: {e}"));
            None
        }
        _ => None,
    }
}

pub fn to_pixel_buffer(image: &RgbImage) -> SharedPixelBuffer<Rgb8Pixel> {
    SharedPixelBuffer::<Rgb8Pixel>::clone_from_slice(image.as_raw(), image.width(), image.height())
}
