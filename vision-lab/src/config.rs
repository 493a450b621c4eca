use anyhow::{Context, Result, bail};
use log::debug;
use once_cell::sync::Lazy;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Mutex};

const CARGO_TOML: &str = include_str!("../Cargo.toml");
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(skip)]
    pub app_name: String,

    /// Root directory of saved images. Empty means `<data dir>/images`.
    #[serde(default)]
    pub save_dir: PathBuf,

    #[serde(default)]
    pub preference: Preference,

    #[serde(default)]
    pub pyramid: Pyramid,

    #[serde(default)]
    pub hough: Hough,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Preference {
    #[derivative(Default(value = "1200"))]
    pub win_width: u32,

    #[derivative(Default(value = "900"))]
    pub win_height: u32,

    // Hough still image is scaled to fit this box
    #[derivative(Default(value = "640"))]
    pub preview_width: u32,

    #[derivative(Default(value = "480"))]
    pub preview_height: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Pyramid {
    #[derivative(Default(value = "3"))]
    pub levels: u32,

    #[derivative(Default(value = "256"))]
    pub tile_size: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Hough {
    #[derivative(Default(value = "100"))]
    pub threshold: u32,

    #[derivative(Default(value = "50.0"))]
    pub canny_low: f32,

    #[derivative(Default(value = "150.0"))]
    pub canny_high: f32,

    #[derivative(Default(value = "1.1"))]
    pub blur_sigma: f32,

    #[derivative(Default(value = "2"))]
    pub suppression_radius: u32,

    #[derivative(Default(value = "2"))]
    pub line_thickness: u32,

    /// Camera name, empty means the first working camera.
    #[serde(default)]
    pub camera: String,

    #[derivative(Default(value = "30"))]
    pub camera_fps: u32,

    // ms
    #[derivative(Default(value = "15"))]
    pub frame_interval_ms: u64,
}

impl Config {
    /// Initializes the configuration
    ///
    /// Reads the package name, creates the application directories and loads
    /// the configuration file.
    pub fn init(&mut self) -> Result<()> {
        let metadata =
            toml::from_str::<toml::Table>(CARGO_TOML).with_context(|| "parse Cargo.toml failed")?;

        self.app_name = metadata
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("vision-lab")
            .to_string();

        let app_dirs = AppDirs::new(Some(&self.app_name), true)
            .with_context(|| "no valid home directory found")?;
        self.crate_dirs(&app_dirs)?;
        self.load().with_context(|| "load config file failed")?;

        if self.is_first_run {
            log::info!("default config written to {}", self.config_path.display());
        }

        if self.save_dir.as_os_str().is_empty() {
            self.save_dir = app_dirs.data_dir.join("images");
        }

        debug!("{:?}", self);
        Ok(())
    }

    fn crate_dirs(&mut self, app_dirs: &AppDirs) -> Result<()> {
        self.config_path = app_dirs.config_dir.join(format!("{}.toml", self.app_name));

        fs::create_dir_all(&app_dirs.data_dir)?;
        fs::create_dir_all(&app_dirs.config_dir)?;

        Ok(())
    }

    /// Loads configuration from file, or writes the defaults when the file
    /// is missing or can't be parsed. A broken file is kept as `<name>.bak`.
    fn load(&mut self) -> Result<()> {
        if let Ok(text) = fs::read_to_string(&self.config_path) {
            match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = self.is_first_run;
                    c.app_name = self.app_name.clone();
                    *self = c;

                    return Ok(());
                }
                Err(e) => {
                    log::warn!("parse {} failed: {e}", self.config_path.display());

                    let mut bak_file = self.config_path.clone().into_os_string();
                    bak_file.push(".bak");
                    _ = fs::copy(&self.config_path, bak_file);
                }
            }
        }

        self.is_first_run = true;
        self.save()
    }

    /// Saves the current configuration to file
    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }
}

/// Initializes the global configuration
///
/// This should be called once at application startup. Falls back to the
/// defaults when the configuration can't be loaded.
pub fn init() {
    let mut config = CONFIG.lock().unwrap();

    if let Err(e) = config.init() {
        log::warn!("init config failed, using defaults. {e:?}");
    }
}

/// Returns a clone of the current configuration
pub fn all() -> Config {
    CONFIG.lock().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            config_path: dir.join("vision-lab.toml"),
            app_name: "vision-lab".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pyramid.levels, 3);
        assert_eq!(config.pyramid.tile_size, 256);
        assert_eq!(config.hough.threshold, 100);
        assert_eq!(config.hough.frame_interval_ms, 15);
        assert_eq!(config.preference.preview_width, 640);
    }

    #[test]
    fn test_first_load_writes_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = config_in(dir.path());

        config.load()?;

        assert!(config.is_first_run);
        let text = fs::read_to_string(dir.path().join("vision-lab.toml"))?;
        assert!(text.contains("[pyramid]"));
        assert!(text.contains("threshold = 100"));
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("vision-lab.toml"),
            "[hough]\nthreshold = 42\ncamera = \"USB Camera\"\n",
        )?;

        let mut config = config_in(dir.path());
        config.load()?;

        assert!(!config.is_first_run);
        assert_eq!(config.hough.threshold, 42);
        assert_eq!(config.hough.camera, "USB Camera");
        assert_eq!(config.hough.canny_high, 150.0);
        assert_eq!(config.pyramid.levels, 3);
        Ok(())
    }

    #[test]
    fn test_broken_file_is_backed_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("vision-lab.toml"), "this is = = not toml")?;

        let mut config = config_in(dir.path());
        config.load()?;

        assert!(config.is_first_run);
        assert!(dir.path().join("vision-lab.toml.bak").exists());

        let reloaded: Config = toml::from_str(&fs::read_to_string(&config.config_path)?)?;
        assert_eq!(reloaded.pyramid.levels, 3);
        Ok(())
    }
}
