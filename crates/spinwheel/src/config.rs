use directories::ProjectDirs;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WheelConfig {
    pub font_family: String,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            font_family: "Sans".to_string(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinConfig {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub min_duration: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub max_duration: Duration,
    pub min_rotation: f64,
    pub max_rotation: f64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_secs(3),
            max_duration: Duration::from_secs(5),
            min_rotation: 720.0,
            max_rotation: 1440.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub wheel: WheelConfig,
    pub spin: SpinConfig,
    pub data_dir: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "spinwheel", "spinwheel")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => get_config_path(),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = resolve_path(path)?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("SPINWHEEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Falls back to the built-in defaults when the file is broken.
pub fn load_or_default(path: Option<&Path>) -> Config {
    match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = resolve_path(path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_toml(text: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        assert_eq!(parse_toml(DEFAULT_CONFIG), Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_toml("[spin]\nmax_duration = 4.5\n\n[wheel]\nfont_family = \"DejaVu Sans\"\n");
        assert_eq!(cfg.spin.max_duration, Duration::from_millis(4500));
        assert_eq!(cfg.spin.min_duration, Duration::from_secs(3));
        assert_eq!(cfg.wheel.font_family, "DejaVu Sans");
        assert_eq!(cfg.window, WindowConfig::default());
        assert_eq!(cfg.data_dir, None);
    }

    #[test]
    fn test_json_deserialization() {
        let cfg: Config = serde_json::from_str(
            r#"{"spin": {"min_rotation": 360.0, "min_duration": 1.25}, "data_dir": "/tmp/wheels"}"#,
        )
        .unwrap();
        assert_eq!(cfg.spin.min_rotation, 360.0);
        assert_eq!(cfg.spin.min_duration, Duration::from_millis(1250));
        assert_eq!(cfg.spin.max_rotation, 1440.0);
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/wheels")));
    }

    #[test]
    fn test_write_default_config_does_not_clobber() {
        let dir = std::env::temp_dir().join(format!("spinwheel-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        assert_eq!(write_default_config(Some(&path)).unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        fs::write(&path, "[window]\nwidth = 1000\n").unwrap();
        write_default_config(Some(&path)).unwrap();
        assert_eq!(load_or_default(Some(&path)).window.width, 1000);

        fs::remove_dir_all(&dir).unwrap();
    }
}
