use cv_ops::{PyramidConfig, io, pyramid};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let img_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/test.png".to_string());
    let levels = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(3);

    let img = io::load_rgb(&img_path)?;
    let pyramid = pyramid::build(&img, &PyramidConfig::new().with_levels(levels))?;

    let saved = io::save_pyramid(&pyramid, &io::image_stem(&img_path), Path::new("tmp"))?;
    for path in saved {
        log::info!("{}", path.display());
    }

    Ok(())
}
