//! Gaussian and Laplacian image pyramids.
//!
//! Down-sampling blurs with the normalised 5-tap kernel `[1, 4, 6, 4, 1] / 16`
//! and keeps every second pixel, up-sampling doubles the size with a Gaussian
//! resampling filter. Both are thin wrappers around `imageproc`/`image` calls.

use crate::{CvOpsError, CvOpsResult, ensure_not_empty};
use derivative::Derivative;
use derive_setters::Setters;
use image::{
    RgbImage,
    imageops::{self, FilterType},
};
use imageproc::filter::separable_filter_equal;

pub const MIN_LEVELS: u32 = 2;
pub const MAX_LEVELS: u32 = 9;

/// Normalised 5-tap Gaussian filter `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PyramidConfig {
    #[derivative(Default(value = "3"))]
    pub levels: u32,
}

impl PyramidConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clamped_levels(&self) -> u32 {
        self.levels.clamp(MIN_LEVELS, MAX_LEVELS)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pyramid {
    /// Successive down-sampled copies, finest first. The source image is not included.
    pub gaussian: Vec<RgbImage>,

    /// Band-pass images ordered coarse to fine, followed by `gaussian[0]`.
    pub laplacian: Vec<RgbImage>,
}

impl Pyramid {
    pub fn levels(&self) -> usize {
        self.gaussian.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaussian.is_empty()
    }
}

pub fn build(image: &RgbImage, config: &PyramidConfig) -> CvOpsResult<Pyramid> {
    ensure_not_empty(image)?;

    let gaussian = gaussian_pyramid(image, config.clamped_levels())?;
    let laplacian = laplacian_pyramid(&gaussian)?;

    log::debug!(
        "pyramid built: source = {}x{}, levels = {}",
        image.width(),
        image.height(),
        gaussian.len()
    );

    Ok(Pyramid {
        gaussian,
        laplacian,
    })
}

pub fn pyr_down(image: &RgbImage) -> CvOpsResult<RgbImage> {
    ensure_not_empty(image)?;

    let blurred = separable_filter_equal(image, &GAUSSIAN_5TAP);
    let (width, height) = (image.width().div_ceil(2), image.height().div_ceil(2));

    Ok(RgbImage::from_fn(width, height, |x, y| {
        *blurred.get_pixel(x * 2, y * 2)
    }))
}

pub fn pyr_up(image: &RgbImage) -> CvOpsResult<RgbImage> {
    ensure_not_empty(image)?;

    Ok(imageops::resize(
        image,
        image.width() * 2,
        image.height() * 2,
        FilterType::Gaussian,
    ))
}

pub fn gaussian_pyramid(image: &RgbImage, levels: u32) -> CvOpsResult<Vec<RgbImage>> {
    ensure_not_empty(image)?;

    let mut pyramid = Vec::with_capacity(levels as usize);
    let mut current = image.clone();

    for _ in 0..levels {
        current = pyr_down(&current)?;
        pyramid.push(current.clone());
    }

    Ok(pyramid)
}

pub fn laplacian_pyramid(gaussian: &[RgbImage]) -> CvOpsResult<Vec<RgbImage>> {
    let Some(finest) = gaussian.first() else {
        return Ok(vec![]);
    };

    let mut pyramid = Vec::with_capacity(gaussian.len());

    for i in (1..gaussian.len()).rev() {
        let target = &gaussian[i - 1];
        let mut expanded = pyr_up(&gaussian[i])?;

        if expanded.dimensions() != target.dimensions() {
            expanded = imageops::resize(
                &expanded,
                target.width(),
                target.height(),
                FilterType::Triangle,
            );
        }

        pyramid.push(subtract_saturating(target, &expanded)?);
    }

    pyramid.push(finest.clone());
    Ok(pyramid)
}

/// Per-channel `a - b`, clamped at zero.
pub fn subtract_saturating(a: &RgbImage, b: &RgbImage) -> CvOpsResult<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(CvOpsError::InvalidParameter(format!(
            "size mismatch: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    Ok(RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let (p, q) = (a.get_pixel(x, y), b.get_pixel(x, y));
        image::Rgb([
            p[0].saturating_sub(q[0]),
            p[1].saturating_sub(q[1]),
            p[2].saturating_sub(q[2]),
        ])
    }))
}
