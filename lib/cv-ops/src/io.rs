use crate::{CvOpsResult, Pyramid};
use chrono::{DateTime, TimeZone};
use image::{ImageReader, RgbImage};
use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

pub const PYRAMID_EXTENSIONS: &[&str] = &["png", "jpg"];
pub const HOUGH_EXTENSIONS: &[&str] = &["png", "jpg", "bmp", "tif", "jpeg", "hdr"];

pub fn load_rgb(path: impl AsRef<Path>) -> CvOpsResult<RgbImage> {
    let path = path.as_ref();
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );

    Ok(img.to_rgb8())
}

/// File name without directory and extension, e.g. `/a/b/lena.png` -> `lena`.
pub fn image_stem(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Writes every level to `root/<stem>/<stem>_{gaussian,laplacian}_<i>.png`.
pub fn save_pyramid(pyramid: &Pyramid, stem: &str, root: impl AsRef<Path>) -> CvOpsResult<Vec<PathBuf>> {
    let dir = root.as_ref().join(stem);
    fs::create_dir_all(&dir)?;

    let mut saved = Vec::with_capacity(pyramid.gaussian.len() + pyramid.laplacian.len());

    for (kind, levels) in [
        ("gaussian", &pyramid.gaussian),
        ("laplacian", &pyramid.laplacian),
    ] {
        for (idx, img) in levels.iter().enumerate() {
            let path = dir.join(format!("{stem}_{kind}_{idx}.png"));
            img.save(&path)?;
            saved.push(path);
        }
    }

    log::info!("saved {} pyramid images to {}", saved.len(), dir.display());
    Ok(saved)
}

pub fn timestamp_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{}.png", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes `image` to `root/<local timestamp>.png`.
pub fn save_timestamped(image: &RgbImage, root: impl AsRef<Path>) -> CvOpsResult<PathBuf> {
    let root = root.as_ref();
    fs::create_dir_all(root)?;

    let path = root.join(timestamp_file_name(&chrono::Local::now()));
    image.save(&path)?;

    log::info!("saved {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_image_stem() {
        assert_eq!(image_stem("/tmp/photos/lena.png"), "lena");
        assert_eq!(image_stem("building.tar.jpg"), "building.tar");
        assert_eq!(image_stem(""), "image");
    }

    #[test]
    fn test_timestamp_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamp_file_name(&now), "2024-03-09_07-05-01.png");
    }

    #[test]
    fn test_extensions() {
        assert!(PYRAMID_EXTENSIONS.iter().all(|e| HOUGH_EXTENSIONS.contains(e)));
        assert!(HOUGH_EXTENSIONS.contains(&"hdr"));
    }
}
