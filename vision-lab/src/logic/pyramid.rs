use super::{toast, util};
use crate::{
    config, global_store, logic_cb,
    slint_generatedAppWindow::{AppWindow, PyramidTile as UIPyramidTile},
    toast_warn,
};
use cv_ops::{
    CvOpsResult, Pyramid, PyramidConfig, RgbImage,
    io::{self, PYRAMID_EXTENSIONS},
    preview,
    pyramid::{self, MAX_LEVELS, MIN_LEVELS},
};
use once_cell::sync::Lazy;
use slint::{ComponentHandle, ModelRc, Rgb8Pixel, SharedPixelBuffer, VecModel};
use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread,
};

// Grid of 3 rows filled column by column.
const GRID_ROWS: usize = 3;

static PYRAMID_CACHE: Lazy<Mutex<PyramidCache>> =
    Lazy::new(|| Mutex::new(PyramidCache::default()));

// Bumped for every rebuild, stale results are dropped.
static GENERATION: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct PyramidCache {
    image_path: Option<PathBuf>,
    pyramid: Pyramid,
}

struct TilePreview {
    buffer: SharedPixelBuffer<Rgb8Pixel>,
    row: i32,
    col: i32,
}

pub fn init(ui: &AppWindow) {
    let setting = config::all().pyramid;
    global_store!(ui).set_pyramid_levels(setting.levels.clamp(MIN_LEVELS, MAX_LEVELS) as i32);
    global_store!(ui).set_tile_size(setting.tile_size.max(1) as f32);

    logic_cb!(pyramid_upload_image, ui);
    logic_cb!(pyramid_save_images, ui);
    logic_cb!(pyramid_levels_changed, ui, levels);
}

fn pyramid_upload_image(ui: &AppWindow) {
    let ui_weak = ui.as_weak();

    thread::spawn(move || {
        let path = util::picker_file(
            ui_weak.clone(),
            "Open Image",
            "Image Files",
            PYRAMID_EXTENSIONS,
        );

        let has_image = path.is_some();
        PYRAMID_CACHE.lock().unwrap().image_path = path;

        _ = ui_weak.upgrade_in_event_loop(move |ui| {
            global_store!(ui).set_pyramid_can_save(has_image);

            if has_image {
                toast_warn!(
                    ui,
                    "The images shown are resized. Use Save Images to get the images in their original size."
                );
            }

            update_images(&ui);
        });
    });
}

fn pyramid_levels_changed(ui: &AppWindow, levels: i32) {
    let levels = levels.clamp(MIN_LEVELS as i32, MAX_LEVELS as i32);
    if global_store!(ui).get_pyramid_levels() == levels {
        return;
    }

    global_store!(ui).set_pyramid_levels(levels);
    update_images(ui);
}

fn update_images(ui: &AppWindow) {
    let generation = GENERATION.fetch_add(1, Ordering::SeqCst) + 1;

    global_store!(ui).set_gaussian_tiles(ModelRc::default());
    global_store!(ui).set_laplacian_tiles(ModelRc::default());

    let image_path = {
        let mut cache = PYRAMID_CACHE.lock().unwrap();
        cache.pyramid = Pyramid::default();
        cache.image_path.clone()
    };

    let Some(image_path) = image_path else {
        global_store!(ui).set_pyramid_busy(false);
        return;
    };

    let levels = global_store!(ui).get_pyramid_levels() as u32;
    let tile_size = config::all().pyramid.tile_size.max(1);
    global_store!(ui).set_pyramid_busy(true);

    let ui_weak = ui.as_weak();
    thread::spawn(move || {
        let result = build_pyramid(&image_path, levels).and_then(|pyramid| {
            let gaussian = tile_previews(&pyramid.gaussian, tile_size)?;
            let laplacian = tile_previews(&pyramid.laplacian, tile_size)?;
            Ok((pyramid, gaussian, laplacian))
        });

        if GENERATION.load(Ordering::SeqCst) != generation {
            log::debug!("drop stale pyramid of generation {generation}");
            return;
        }

        match result {
            Ok((pyramid, gaussian, laplacian)) => {
                PYRAMID_CACHE.lock().unwrap().pyramid = pyramid;

                _ = ui_weak.upgrade_in_event_loop(move |ui| {
                    if GENERATION.load(Ordering::SeqCst) != generation {
                        return;
                    }

                    global_store!(ui).set_gaussian_tiles(to_tile_model(gaussian));
                    global_store!(ui).set_laplacian_tiles(to_tile_model(laplacian));
                    global_store!(ui).set_pyramid_busy(false);
                });
            }
            Err(e) => {
                log::warn!("build pyramid of {} failed: {e}", image_path.display());

                _ = ui_weak.upgrade_in_event_loop(move |ui| {
                    global_store!(ui).set_pyramid_busy(false);
                    toast_warn!(ui, e.to_string());
                });
            }
        }
    });
}

fn build_pyramid(image_path: &Path, levels: u32) -> CvOpsResult<Pyramid> {
    let image = io::load_rgb(image_path)?;
    pyramid::build(&image, &PyramidConfig::new().with_levels(levels))
}

fn tile_previews(levels: &[RgbImage], tile_size: u32) -> CvOpsResult<Vec<TilePreview>> {
    levels
        .iter()
        .enumerate()
        .map(|(idx, img)| {
            let (row, col) = grid_position(idx);
            let tile = preview::fit_exact(img, tile_size, tile_size)?;

            Ok(TilePreview {
                buffer: util::to_pixel_buffer(&tile),
                row,
                col,
            })
        })
        .collect()
}

fn to_tile_model(tiles: Vec<TilePreview>) -> ModelRc<UIPyramidTile> {
    let tiles = tiles
        .into_iter()
        .map(|t| UIPyramidTile {
            image: slint::Image::from_rgb8(t.buffer),
            row: t.row,
            col: t.col,
        })
        .collect::<Vec<_>>();

    ModelRc::new(VecModel::from(tiles))
}

fn grid_position(idx: usize) -> (i32, i32) {
    ((idx % GRID_ROWS) as i32, (idx / GRID_ROWS) as i32)
}

fn pyramid_save_images(ui: &AppWindow) {
    let (image_path, pyramid) = {
        let cache = PYRAMID_CACHE.lock().unwrap();
        (cache.image_path.clone(), cache.pyramid.clone())
    };

    let Some(image_path) = image_path else {
        toast_warn!(ui, "No image uploaded");
        return;
    };

    if pyramid.is_empty() {
        toast_warn!(ui, "The pyramid is not ready yet");
        return;
    }

    let save_dir = config::all().save_dir;
    let ui_weak = ui.as_weak();

    thread::spawn(move || {
        let stem = io::image_stem(&image_path);

        match io::save_pyramid(&pyramid, &stem, &save_dir) {
            Ok(paths) => toast::async_toast_success(
                ui_weak,
                format!(
                    "Saved {} images to {}",
                    paths.len(),
                    save_dir.join(&stem).display()
                ),
            ),
            Err(e) => toast::async_toast_warn(ui_weak, format!("Save images failed. {e}")),
        }
    });
}
