use super::{toast, util};
use crate::{
    config, global_store, logic_cb, slint_generatedAppWindow::AppWindow, toast_warn,
};
use camera::{CameraClient, CameraConfig, first_available_camera};
use crossbeam::channel::{Receiver, Sender, TryRecvError, bounded};
use cv_ops::{
    CvOpsResult, HoughConfig, RgbImage, hough,
    hough::{MAX_THRESHOLD, MIN_THRESHOLD},
    io::{self, HOUGH_EXTENSIONS},
    preview,
};
use once_cell::sync::Lazy;
use slint::{ComponentHandle, Weak};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

static HOUGH_THRESHOLD: Lazy<Arc<AtomicU32>> = Lazy::new(|| Arc::new(AtomicU32::new(100)));
static HOUGH_CACHE: Lazy<Mutex<HoughCache>> = Lazy::new(|| Mutex::new(HoughCache::default()));
static GENERATION: AtomicU64 = AtomicU64::new(0);

// Bumped for every started camera loop so a stopped loop can't touch the view.
static CAMERA_SESSION: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct HoughCache {
    image_path: Option<PathBuf>,
    stop_sender: Option<Sender<()>>,
    camera_thread: Option<JoinHandle<()>>,
}

pub fn init(ui: &AppWindow) {
    let threshold = config::all()
        .hough
        .threshold
        .clamp(MIN_THRESHOLD, MAX_THRESHOLD);

    HOUGH_THRESHOLD.store(threshold, Ordering::Relaxed);
    global_store!(ui).set_hough_threshold(threshold as i32);

    logic_cb!(hough_upload_file, ui);
    logic_cb!(hough_save_image, ui);
    logic_cb!(hough_threshold_changed, ui, threshold);
    logic_cb!(hough_toggle_video, ui);
}

fn hough_config() -> HoughConfig {
    let setting = config::all().hough;

    HoughConfig::new()
        .with_threshold(HOUGH_THRESHOLD.load(Ordering::Relaxed))
        .with_canny_low(setting.canny_low)
        .with_canny_high(setting.canny_high)
        .with_blur_sigma(setting.blur_sigma)
        .with_suppression_radius(setting.suppression_radius)
        .with_line_thickness(setting.line_thickness)
}

fn hough_threshold_changed(ui: &AppWindow, threshold: i32) {
    let threshold = threshold.clamp(MIN_THRESHOLD as i32, MAX_THRESHOLD as i32);
    if global_store!(ui).get_hough_threshold() == threshold {
        return;
    }

    HOUGH_THRESHOLD.store(threshold as u32, Ordering::Relaxed);
    global_store!(ui).set_hough_threshold(threshold);

    if HOUGH_CACHE.lock().unwrap().image_path.is_some() {
        update_image(ui);
    }
}

fn hough_upload_file(ui: &AppWindow) {
    let ui_weak = ui.as_weak();

    thread::spawn(move || {
        let path = util::picker_file(ui_weak.clone(), "Open Image", "Image Files", HOUGH_EXTENSIONS);

        let has_image = path.is_some();
        HOUGH_CACHE.lock().unwrap().image_path = path;

        _ = ui_weak.upgrade_in_event_loop(move |ui| {
            global_store!(ui).set_hough_can_save(has_image);

            if has_image {
                toast_warn!(
                    ui,
                    "The image shown is resized. Use Save image to get the image in its original size."
                );
                update_image(&ui);
            }
        });
    });
}

fn update_image(ui: &AppWindow) {
    let Some(image_path) = HOUGH_CACHE.lock().unwrap().image_path.clone() else {
        return;
    };

    let generation = GENERATION.fetch_add(1, Ordering::SeqCst) + 1;
    let preference = config::all().preference;
    let config = hough_config();
    let ui_weak = ui.as_weak();

    thread::spawn(move || {
        let result = detect_file(&image_path, &config).and_then(|img| {
            preview::fit_within(&img, preference.preview_width, preference.preview_height)
        });

        if GENERATION.load(Ordering::SeqCst) != generation {
            return;
        }

        match result {
            Ok(img) => {
                let buffer = util::to_pixel_buffer(&img);

                _ = ui_weak.upgrade_in_event_loop(move |ui| {
                    if GENERATION.load(Ordering::SeqCst) == generation {
                        global_store!(ui).set_hough_image(slint::Image::from_rgb8(buffer));
                    }
                });
            }
            Err(e) => {
                log::warn!("process {} failed: {e}", image_path.display());
                HOUGH_CACHE.lock().unwrap().image_path = None;

                _ = ui_weak.upgrade_in_event_loop(move |ui| {
                    global_store!(ui).set_hough_can_save(false);
                    global_store!(ui).set_hough_image(slint::Image::default());
                    toast_warn!(ui, e.to_string());
                });
            }
        }
    });
}

fn detect_file(image_path: &Path, config: &HoughConfig) -> CvOpsResult<RgbImage> {
    let img = io::load_rgb(image_path)?;
    let (img, lines) = hough::apply(img, config)?;

    log::debug!(
        "{}: {} lines at threshold {}",
        image_path.display(),
        lines.len(),
        config.threshold
    );
    Ok(img)
}

fn hough_save_image(ui: &AppWindow) {
    let Some(image_path) = HOUGH_CACHE.lock().unwrap().image_path.clone() else {
        toast_warn!(ui, "No image uploaded");
        return;
    };

    let config = hough_config();
    let save_dir = config::all().save_dir;
    let ui_weak = ui.as_weak();

    thread::spawn(move || {
        match detect_file(&image_path, &config).and_then(|img| io::save_timestamped(&img, &save_dir)) {
            Ok(path) => toast::async_toast_success(ui_weak, format!("Saved {}", path.display())),
            Err(e) => toast::async_toast_warn(ui_weak, format!("Save image failed. {e}")),
        }
    });
}

fn hough_toggle_video(ui: &AppWindow) {
    if global_store!(ui).get_is_camera_running() {
        stop_camera();
        global_store!(ui).set_is_camera_running(false);
    } else {
        start_camera(ui);
    }
}

fn start_camera(ui: &AppWindow) {
    stop_camera();

    let previous = HOUGH_CACHE.lock().unwrap().camera_thread.take();
    let session = CAMERA_SESSION.fetch_add(1, Ordering::SeqCst) + 1;
    let (tx, rx) = bounded(1);
    let ui_weak = ui.as_weak();
    global_store!(ui).set_is_camera_running(true);

    let handle = thread::spawn(move || {
        // The previous loop must release the camera first
        if let Some(previous) = previous
            && previous.join().is_err()
        {
            log::warn!("camera thread panicked");
        }

        if let Err(e) = camera_loop(ui_weak.clone(), rx, session) {
            toast::async_toast_warn(ui_weak.clone(), format!("Start video stream failed. {e}"));
        }

        _ = ui_weak.upgrade_in_event_loop(move |ui| {
            if CAMERA_SESSION.load(Ordering::SeqCst) == session {
                global_store!(ui).set_is_camera_running(false);
            }
        });
    });

    let mut cache = HOUGH_CACHE.lock().unwrap();
    cache.stop_sender = Some(tx);
    cache.camera_thread = Some(handle);
}

/// Asks the camera loop to exit without waiting for it.
pub fn stop_camera() {
    let Some(sender) = HOUGH_CACHE.lock().unwrap().stop_sender.take() else {
        return;
    };

    CAMERA_SESSION.fetch_add(1, Ordering::SeqCst);
    if let Err(e) = sender.try_send(()) {
        log::debug!("camera thread already stopped. {e}");
    }
}

/// Stops the camera loop and waits until the camera is released.
pub fn release_camera() {
    stop_camera();

    let handle = HOUGH_CACHE.lock().unwrap().camera_thread.take();
    if let Some(handle) = handle
        && handle.join().is_err()
    {
        log::warn!("camera thread panicked");
    }
}

fn camera_loop(ui: Weak<AppWindow>, stop: Receiver<()>, session: u64) -> anyhow::Result<()> {
    camera::init();

    let setting = config::all().hough;
    let name = Some(setting.camera.as_str());
    let index = first_available_camera(name)?;

    let mut client =
        CameraClient::new(index, CameraConfig::default().with_fps(setting.camera_fps))?;
    client.start()?;

    let interval = Duration::from_millis(setting.frame_interval_ms.max(1));
    let mut config = hough_config();
    let mut total_frames = 0u64;

    loop {
        if should_stop(&stop) {
            log::info!("camera thread exit after {total_frames} frames...");
            break;
        }

        thread::sleep(interval);

        let frame = match client.last_frame_rgb() {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("{e}");
                continue;
            }
        };

        config.threshold = HOUGH_THRESHOLD.load(Ordering::Relaxed);

        match hough::apply(frame, &config) {
            Ok((frame, _)) => {
                total_frames += 1;
                let buffer = util::to_pixel_buffer(&frame);

                _ = ui.upgrade_in_event_loop(move |ui| {
                    if CAMERA_SESSION.load(Ordering::SeqCst) == session {
                        global_store!(ui).set_camera_image(slint::Image::from_rgb8(buffer));
                    }
                });
            }
            Err(e) => log::warn!("I can't process this frame. {e}"),
        }
    }

    client.stop()?;
    Ok(())
}

// A dropped sender also stops the loop.
fn should_stop(stop: &Receiver<()>) -> bool {
    !matches!(stop.try_recv(), Err(TryRecvError::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_should_stop() {
        let (tx, rx) = bounded(1);
        assert!(!should_stop(&rx));

        tx.try_send(()).unwrap();
        assert!(should_stop(&rx));

        drop(tx);
        assert!(should_stop(&rx));
    }

    #[test]
    fn test_stop_camera_returns_before_the_loop_exits() {
        let (tx, rx) = bounded::<()>(1);
        let handle = thread::spawn(move || {
            while !should_stop(&rx) {
                thread::sleep(Duration::from_millis(5));
            }
            thread::sleep(Duration::from_millis(300));
        });

        {
            let mut cache = HOUGH_CACHE.lock().unwrap();
            cache.stop_sender = Some(tx);
            cache.camera_thread = Some(handle);
        }

        let now = Instant::now();
        stop_camera();
        assert!(now.elapsed() < Duration::from_millis(200));
        assert!(HOUGH_CACHE.lock().unwrap().stop_sender.is_none());
        assert!(HOUGH_CACHE.lock().unwrap().camera_thread.is_some());

        release_camera();
        assert!(now.elapsed() >= Duration::from_millis(300));
        assert!(HOUGH_CACHE.lock().unwrap().camera_thread.is_none());
    }
}
