//! Display-sized copies of processed images.

use crate::{CvOpsError, CvOpsResult, ensure_not_empty};
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FastImage};
use image::RgbImage;

/// Stretches `image` to exactly `width x height`, ignoring the aspect ratio.
pub fn fit_exact(image: &RgbImage, width: u32, height: u32) -> CvOpsResult<RgbImage> {
    ensure_not_empty(image)?;

    if width == 0 || height == 0 {
        return Err(CvOpsError::InvalidParameter(format!(
            "invalid preview size {width}x{height}"
        )));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let src = FastImage::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().clone(),
        PixelType::U8x3,
    )?;
    let mut dst = FastImage::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));
    Resizer::new().resize(&src, &mut dst, &options)?;

    RgbImage::from_raw(width, height, dst.into_vec())
        .ok_or(CvOpsError::InvalidParameter("to RgbImage failed".to_string()))
}

/// Downscales `image` to fit inside `max_width x max_height`, keeping the aspect ratio.
pub fn fit_within(image: &RgbImage, max_width: u32, max_height: u32) -> CvOpsResult<RgbImage> {
    let (width, height) = fit_dimensions(image.width(), image.height(), max_width, max_height);
    fit_exact(image, width, height)
}

pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );

    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}
