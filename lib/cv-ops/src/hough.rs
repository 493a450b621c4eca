//! Straight line detection with the Hough transform.
//!
//! Pipeline: grayscale -> Gaussian blur -> Canny -> `imageproc::hough::detect_lines`,
//! then the detected lines are painted back onto the colour frame.

use crate::{CvOpsError, CvOpsResult, ensure_not_empty};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Rgb, RgbImage, imageops};
use imageproc::{
    drawing::draw_line_segment_mut,
    edges::canny,
    filter::gaussian_blur_f32,
    hough::{LineDetectionOptions, PolarLine},
};

pub const MIN_THRESHOLD: u32 = 1;
pub const MAX_THRESHOLD: u32 = 500;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct HoughConfig {
    /// A line is reported when it collects strictly more votes than this.
    #[derivative(Default(value = "100"))]
    pub threshold: u32,

    #[derivative(Default(value = "50.0"))]
    pub canny_low: f32,

    #[derivative(Default(value = "150.0"))]
    pub canny_high: f32,

    /// Sigma equivalent to a 5x5 Gaussian kernel.
    #[derivative(Default(value = "1.1"))]
    pub blur_sigma: f32,

    #[derivative(Default(value = "2"))]
    pub suppression_radius: u32,

    #[derivative(Default(value = "2"))]
    pub line_thickness: u32,

    #[derivative(Default(value = "Rgb([255, 0, 0])"))]
    pub line_color: Rgb<u8>,

    /// Distance from the foot point to each drawn end point.
    #[derivative(Default(value = "1000.0"))]
    pub half_length: f32,
}

impl HoughConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clamped_threshold(&self) -> u32 {
        self.threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
    }

    fn validate(&self) -> CvOpsResult<()> {
        if self.blur_sigma.is_nan() || self.blur_sigma <= 0.0 {
            return Err(CvOpsError::InvalidParameter(format!(
                "blur sigma must be positive, got {}",
                self.blur_sigma
            )));
        }

        if self.canny_low > self.canny_high {
            return Err(CvOpsError::InvalidParameter(format!(
                "canny low threshold {} is greater than high threshold {}",
                self.canny_low, self.canny_high
            )));
        }

        Ok(())
    }
}

/// A line in normal form: `x * cos(theta) + y * sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughLine {
    pub rho: f32,

    /// Radians in `[0, pi)`.
    pub theta: f32,
}

impl From<PolarLine> for HoughLine {
    fn from(line: PolarLine) -> Self {
        Self {
            rho: line.r,
            theta: (line.angle_in_degrees as f32).to_radians(),
        }
    }
}

pub fn edges(image: &RgbImage, config: &HoughConfig) -> CvOpsResult<GrayImage> {
    ensure_not_empty(image)?;
    config.validate()?;

    let gray = imageops::grayscale(image);
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    Ok(canny(&blurred, config.canny_low, config.canny_high))
}

pub fn detect_lines(image: &RgbImage, config: &HoughConfig) -> CvOpsResult<Vec<HoughLine>> {
    let edges = edges(image, config)?;
    Ok(lines_from_edges(&edges, config))
}

/// Runs the accumulator on an edge map, non-zero pixels vote.
pub fn lines_from_edges(edges: &GrayImage, config: &HoughConfig) -> Vec<HoughLine> {
    // imageproc keeps `votes >= vote_threshold`
    let options = LineDetectionOptions {
        vote_threshold: config.clamped_threshold() + 1,
        suppression_radius: config.suppression_radius,
    };

    imageproc::hough::detect_lines(edges, options)
        .into_iter()
        .map(HoughLine::from)
        .collect()
}

pub fn line_endpoints(line: &HoughLine, half_length: f32) -> ((f32, f32), (f32, f32)) {
    let (a, b) = (line.theta.cos(), line.theta.sin());
    let (x0, y0) = (a * line.rho, b * line.rho);

    (
        (x0 - half_length * b, y0 + half_length * a),
        (x0 + half_length * b, y0 - half_length * a),
    )
}

pub fn draw_lines(image: &mut RgbImage, lines: &[HoughLine], config: &HoughConfig) {
    let thickness = config.line_thickness.max(1);
    let center = (thickness - 1) as f32 / 2.0;

    for line in lines {
        let (start, end) = line_endpoints(line, config.half_length);
        let (nx, ny) = (line.theta.cos(), line.theta.sin());

        for i in 0..thickness {
            let offset = i as f32 - center;
            let (dx, dy) = (nx * offset, ny * offset);

            draw_line_segment_mut(
                image,
                (start.0 + dx, start.1 + dy),
                (end.0 + dx, end.1 + dy),
                config.line_color,
            );
        }
    }
}

/// Detects lines on `image` and draws them onto it.
pub fn apply(mut image: RgbImage, config: &HoughConfig) -> CvOpsResult<(RgbImage, Vec<HoughLine>)> {
    let lines = detect_lines(&image, config)?;
    draw_lines(&mut image, &lines, config);
    Ok((image, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn horizontal_stripe() -> RgbImage {
        let mut img = RgbImage::new(120, 120);
        for y in 55..65 {
            for x in 0..120 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        img
    }

    #[test]
    fn test_polar_line_conversion() {
        let line: HoughLine = PolarLine {
            r: 10.0,
            angle_in_degrees: 90,
        }
        .into();

        assert_eq!(line.rho, 10.0);
        assert!((line.theta - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_line_endpoints_vertical() {
        // theta = 0 is the vertical line x = rho.
        let line = HoughLine {
            rho: 20.0,
            theta: 0.0,
        };
        let ((x1, y1), (x2, y2)) = line_endpoints(&line, 1000.0);

        assert_eq!((x1, y1), (20.0, 1000.0));
        assert_eq!((x2, y2), (20.0, -1000.0));
    }

    #[test]
    fn test_line_endpoints_diagonal() {
        let line = HoughLine {
            rho: 30.0,
            theta: FRAC_PI_4,
        };
        let (start, end) = line_endpoints(&line, 100.0);

        for (x, y) in [start, end] {
            let rho = x * line.theta.cos() + y * line.theta.sin();
            assert!((rho - line.rho).abs() < 1e-3);
        }

        let length = ((end.0 - start.0).powi(2) + (end.1 - start.1).powi(2)).sqrt();
        assert!((length - 200.0).abs() < 1e-3);
    }

    fn painted_rows(thickness: u32) -> Vec<u32> {
        let mut img = RgbImage::new(60, 60);
        let line = HoughLine {
            rho: 20.5,
            theta: FRAC_PI_2,
        };
        let config = HoughConfig::new().with_line_thickness(thickness);
        draw_lines(&mut img, &[line], &config);

        (0..img.height())
            .filter(|&y| *img.get_pixel(30, y) == config.line_color)
            .collect()
    }

    #[test]
    fn test_draw_lines_thickness() {
        assert_eq!(painted_rows(1), vec![20]);
        assert_eq!(painted_rows(3), vec![19, 20, 21]);
        assert_eq!(painted_rows(0), vec![20]);
    }

    fn vertical_edge(length: u32) -> GrayImage {
        let mut edges = GrayImage::new(100, 100);
        for y in 0..length {
            edges.put_pixel(20, y, image::Luma([255]));
        }
        edges
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let edges = vertical_edge(50);

        // A 50 pixel segment collects exactly 50 votes at theta = 0.
        let lines = lines_from_edges(&edges, &HoughConfig::new().with_threshold(49));
        assert!(lines.contains(&HoughLine {
            rho: 20.0,
            theta: 0.0
        }));

        assert!(lines_from_edges(&edges, &HoughConfig::new().with_threshold(50)).is_empty());
    }

    #[test]
    fn test_detects_stripe_edges() {
        let lines = detect_lines(&horizontal_stripe(), &HoughConfig::new().with_threshold(80)).unwrap();

        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| (l.theta - FRAC_PI_2).abs() < 0.1));
    }

    #[test]
    fn test_high_threshold_finds_nothing() {
        let config = HoughConfig::new().with_threshold(MAX_THRESHOLD);
        let lines = detect_lines(&horizontal_stripe(), &config).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_apply_draws_in_line_color() {
        let (out, lines) = apply(horizontal_stripe(), &HoughConfig::new().with_threshold(80)).unwrap();

        assert!(!lines.is_empty());
        assert!(out.pixels().any(|p| *p == Rgb([255, 0, 0])));
    }

    #[test]
    fn test_apply_without_lines_keeps_frame() {
        let flat = RgbImage::from_pixel(40, 40, Rgb([7, 7, 7]));
        let (out, lines) = apply(flat.clone(), &HoughConfig::new()).unwrap();

        assert!(lines.is_empty());
        assert_eq!(out, flat);
    }

    #[test]
    fn test_invalid_config() {
        let img = horizontal_stripe();
        assert!(edges(&img, &HoughConfig::new().with_blur_sigma(0.0)).is_err());
        assert!(edges(&img, &HoughConfig::new().with_canny_low(200.0)).is_err());
        assert!(matches!(
            edges(&RgbImage::new(0, 10), &HoughConfig::new()),
            Err(CvOpsError::EmptyImage)
        ));
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(HoughConfig::new().with_threshold(0).clamped_threshold(), 1);
        assert_eq!(HoughConfig::new().with_threshold(9000).clamped_threshold(), 500);
    }
}
