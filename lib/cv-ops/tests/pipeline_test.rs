// cargo test -p cv-ops --test pipeline_test

use cv_ops::{
    HoughConfig, PyramidConfig, Rgb, RgbImage, hough,
    io::{image_stem, load_rgb, save_pyramid, save_timestamped},
    preview, pyramid,
};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([230, 230, 230])
        } else {
            Rgb([20, 20, 20])
        }
    })
}

#[test]
fn test_save_and_reload_pyramid() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let src = checkerboard(128, 96, 16);
    let source_path = dir.path().join("board.png");
    src.save(&source_path)?;

    let img = load_rgb(&source_path)?;
    assert_eq!(img, src);

    let pyramid = pyramid::build(&img, &PyramidConfig::new().with_levels(4))?;
    let stem = image_stem(&source_path);
    let saved = save_pyramid(&pyramid, &stem, dir.path().join("images"))?;

    assert_eq!(saved.len(), 8);
    assert!(saved.iter().all(|p| p.exists()));
    assert!(dir.path().join("images/board/board_gaussian_3.png").exists());
    assert!(dir.path().join("images/board/board_laplacian_0.png").exists());

    let finest = load_rgb(dir.path().join("images/board/board_gaussian_0.png"))?;
    assert_eq!(finest.dimensions(), (64, 48));

    Ok(())
}

#[test]
fn test_laplacian_keeps_detail_of_textured_image() -> anyhow::Result<()> {
    let pyramid = pyramid::build(&checkerboard(256, 256, 8), &PyramidConfig::new())?;

    // The band-pass levels of a checkerboard are not flat.
    let band = &pyramid.laplacian[pyramid.laplacian.len() - 2];
    assert!(band.pixels().any(|p| p[0] > 10));

    Ok(())
}

#[test]
fn test_load_rejects_garbage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png")?;

    assert!(load_rgb(&path).is_err());
    assert!(load_rgb(dir.path().join("missing.png")).is_err());

    Ok(())
}

#[test]
fn test_hough_on_drawn_square() -> anyhow::Result<()> {
    let mut img = RgbImage::new(200, 200);
    draw_filled_rect_mut(&mut img, Rect::at(50, 50).of_size(100, 100), Rgb([255, 255, 255]));

    let (out, lines) = hough::apply(img, &HoughConfig::new().with_threshold(60))?;

    // Two horizontal and two vertical borders.
    let horizontal = lines.iter().filter(|l| (l.theta - std::f32::consts::FRAC_PI_2).abs() < 0.05);
    let vertical = lines.iter().filter(|l| l.theta < 0.05 || l.theta > std::f32::consts::PI - 0.05);
    assert!(horizontal.count() >= 2);
    assert!(vertical.count() >= 2);

    let dir = tempfile::tempdir()?;
    let saved = save_timestamped(&out, dir.path().join("images"))?;
    assert!(saved.exists());
    assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("png"));

    Ok(())
}

#[test]
fn test_camera_frame_preview() -> anyhow::Result<()> {
    let mut frame = RgbImage::new(640, 480);
    draw_line_segment_mut(&mut frame, (0.0, 240.0), (639.0, 240.0), Rgb([255, 255, 255]));

    let (out, _) = hough::apply(frame, &HoughConfig::new())?;
    let shown = preview::fit_within(&out, 320, 320)?;
    assert_eq!(shown.dimensions(), (320, 240));

    Ok(())
}
