use cv_ops::{HoughConfig, hough, io};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let img_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/test.png".to_string());
    let threshold = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(100);

    let img = io::load_rgb(&img_path)?;
    let (img, lines) = hough::apply(img, &HoughConfig::new().with_threshold(threshold))?;

    for line in &lines {
        log::debug!("rho = {:.1}, theta = {:.3}", line.rho, line.theta);
    }

    let path = io::save_timestamped(&img, "tmp")?;
    log::info!("found {} lines, result: {}", lines.len(), path.display());

    Ok(())
}
