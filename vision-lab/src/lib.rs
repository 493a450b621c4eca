//! Vision Lab
//!
//! A desktop application with two image processing demos built on Slint:
//! - Image Pyramid: Gaussian and Laplacian pyramids of an uploaded image
//! - Hough Transform: straight line detection on still images and camera frames
//!
//! # Architecture
//! - `config`: TOML configuration loaded once at start
//! - `logic`: Slint callbacks wired to the `cv-ops` and `camera` crates

slint::include_modules!();

#[macro_use]
extern crate derivative;

mod config;
mod logic;

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line number,
/// and log message.
pub fn init_logger() {
    use std::io::Write;

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("nokhwa", log::LevelFilter::Warn)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn ui_before() {
    init_logger();
    config::init();

    #[cfg(target_os = "linux")]
    {
        _ = slint::set_xdg_app_id("vision-lab".to_string());
    }
}

fn ui_after(ui: &AppWindow) {
    logic::init(ui);
}

/// Main entry point for the desktop application.
pub fn desktop_main() {
    log::debug!("start...");

    ui_before();

    let ui = match AppWindow::new() {
        Ok(ui) => ui,
        Err(e) => {
            log::error!("create window failed: {e}");
            return;
        }
    };

    ui_after(&ui);

    if let Err(e) = ui.run() {
        log::error!("run event loop failed: {e}");
    }

    logic::shutdown();

    log::debug!("exit...");
}
