use camera::{CameraClient, CameraConfig, CameraResult, first_available_camera};
use std::{thread, time::Duration};

fn main() -> CameraResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    camera::init();

    let fps = 25;
    let index = match first_available_camera(None) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("{e}");
            return Ok(());
        }
    };

    let config = CameraConfig::default()
        .with_width(1280)
        .with_height(720)
        .with_fps(fps);

    let mut client = CameraClient::new(index, config)?;
    client.start()?;

    let (mut frame_count, mut missed) = (0, 0);
    for _ in 0..100 {
        thread::sleep(Duration::from_millis(1000 / fps as u64));

        match client.last_frame_rgb() {
            Ok(frame) => {
                if frame_count % 10 == 0 {
                    log::info!("Frame #{frame_count}: {}x{}", frame.width(), frame.height());
                    if let Err(e) = std::fs::create_dir_all("tmp") {
                        log::warn!("{e}");
                    } else {
                        frame.save(format!("tmp/camera-{frame_count}.png"))?;
                    }
                }
                frame_count += 1;
            }
            Err(e) => {
                missed += 1;
                log::warn!("{e}");
            }
        }
    }

    client.stop()?;
    log::info!("Captured {frame_count} frames, missed {missed}");
    Ok(())
}
