//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Grid refinement settings.
    pub grid: GridConfig,
    /// Camera and overlay settings.
    pub view: ViewConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Grid refinement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Highest refinement level the grid store materializes (level 0 is the
    /// base icosahedron).
    pub max_level: u8,
    /// Refine in one atomic bisect+extend step instead of two visible phases.
    pub one_step_refine: bool,
    /// Reveal freshly refined levels progressively instead of instantly.
    pub animated_reveal: bool,
}

/// Camera and overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Half-extent of the orthographic view volume in world units.
    pub ortho_extent: f64,
    /// Vertical field of view for the perspective projection, in degrees.
    pub fov_y_degrees: f32,
    /// Start in perspective projection instead of orthographic.
    pub perspective: bool,
    /// Rotate the scene continuously.
    pub auto_rotate: bool,
    /// Hold rotation still while a reveal animation plays.
    pub fixed_during_reveal: bool,
    /// Draw triangle edges.
    pub show_edges: bool,
    /// Draw the translucent circumscribing sphere.
    pub show_sphere: bool,
    /// Draw face normal rays.
    pub show_normals: bool,
    /// Draw face centroid markers.
    pub show_centroids: bool,
    /// Draw world axes.
    pub show_axes: bool,
    /// Resting opacity of the sphere overlay (0.0 - 1.0).
    pub sphere_alpha: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
            fullscreen: false,
            vsync: true,
            title: "Icogrid".to_string(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_level: 5,
            one_step_refine: false,
            animated_reveal: true,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            ortho_extent: 2.5,
            fov_y_degrees: 55.0,
            perspective: false,
            auto_rotate: true,
            fixed_during_reveal: false,
            show_edges: true,
            show_sphere: true,
            show_normals: false,
            show_centroids: false,
            show_axes: false,
            sphere_alpha: 0.75,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for the viewer (`~/.config/icogrid` on Linux),
/// falling back to the working directory when the platform offers none.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("icogrid")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
