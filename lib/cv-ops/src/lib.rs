pub mod hough;
pub mod io;
pub mod preview;
pub mod pyramid;

pub use hough::{HoughConfig, HoughLine};
pub use image::{GrayImage, Rgb, RgbImage};
pub use pyramid::{Pyramid, PyramidConfig};

pub type CvOpsResult<T> = Result<T, CvOpsError>;

#[derive(thiserror::Error, Debug)]
pub enum CvOpsError {
    #[error("Empty image")]
    EmptyImage,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Can't process this image, maybe it's too big or has an incorrect file extension. {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fast image buffer error: {0}")]
    FastImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Fast image resize error: {0}")]
    FastImageResize(#[from] fast_image_resize::ResizeError),
}

pub(crate) fn ensure_not_empty<P: image::Pixel>(
    image: &image::ImageBuffer<P, Vec<P::Subpixel>>,
) -> CvOpsResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CvOpsError::EmptyImage);
    }

    Ok(())
}
