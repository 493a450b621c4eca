use camera::{first_available_camera, query_available_cameras};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    camera::init();

    let cameras = query_available_cameras();
    log::info!("Found {} working cameras", cameras.len());

    for cam in &cameras {
        log::info!("  - {} [{}] {}", cam.name, cam.index, cam.description);
    }

    match first_available_camera(None) {
        Ok(index) => log::info!("default camera -> {index}"),
        Err(e) => log::warn!("{e}"),
    }
}
