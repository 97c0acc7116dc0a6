//! Configuration for Digitpad.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. `DIGITPAD_MODEL_URL` environment variable (classifier base URL only)
//! 2. `~/.digitpad/config.toml`
//! 3. Built-in defaults
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [classifier]
//! base_url = "http://localhost:5000"
//! timeout_secs = 30
//!
//! [canvas]
//! throttle_ms = 700
//! stroke_width = 20.0
//! ```

use serde::Deserialize;
use std::{
    env,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use digitpad_types::UiOptions;

/// Environment variable holding the classifier base URL.
pub const MODEL_URL_ENV: &str = "DIGITPAD_MODEL_URL";
/// Classifier base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_THROTTLE_MS: u64 = 700;
/// Accepted export interval range; values outside are clamped.
pub const THROTTLE_RANGE_MS: RangeInclusive<u64> = 700..=1000;
pub const DEFAULT_STROKE_WIDTH: f32 = 20.0;

const PREDICT_PATH: &str = "predict";

#[derive(Debug, Default, Deserialize)]
pub struct DigitpadConfig {
    pub app: Option<AppConfig>,
    pub classifier: Option<ClassifierConfig>,
    pub canvas: Option<CanvasConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for the surface and bars.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Render the loader as a still face.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the prediction service. `${VAR}` references are expanded.
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CanvasConfig {
    /// Minimum interval between snapshot exports.
    pub throttle_ms: Option<u64>,
    /// Stroke width in surface pixels.
    pub stroke_width: Option<f32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid classifier URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
}

impl ConfigError {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidUrl { .. } => None,
        }
    }
}

/// Expand `${VAR}` references. Missing variables expand to an empty string;
/// an unclosed `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl DigitpadConfig {
    /// Load the config file from its default location.
    ///
    /// Returns `Ok(None)` when there is no home directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".digitpad").join("config.toml"))
}

/// Validated classifier location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierEndpoint {
    base: Url,
}

impl ClassifierEndpoint {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let base = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
            value: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                value: trimmed.to_string(),
                reason: format!("unsupported scheme {:?}", base.scheme()),
            });
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>/predict`, keeping any path prefix on the base URL.
    #[must_use]
    pub fn predict_url(&self) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/{PREDICT_PATH}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

impl Default for ClassifierEndpoint {
    fn default() -> Self {
        Self::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL must be a valid URL")
    }
}

/// Concrete settings after layering env, file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: ClassifierEndpoint,
    pub request_timeout: Duration,
    pub throttle: Duration,
    pub stroke_width: f32,
    pub ui: UiOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: ClassifierEndpoint::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            stroke_width: DEFAULT_STROKE_WIDTH,
            ui: UiOptions::default(),
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment and an optional config file.
    pub fn from_env(config: Option<&DigitpadConfig>) -> Result<Self, ConfigError> {
        Self::resolve(config, env::var(MODEL_URL_ENV).ok())
    }

    /// Resolve settings from explicit inputs. `model_url` is the raw value of
    /// [`MODEL_URL_ENV`], if set.
    pub fn resolve(
        config: Option<&DigitpadConfig>,
        model_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let app = config.and_then(|c| c.app.as_ref());
        let classifier = config.and_then(|c| c.classifier.as_ref());
        let canvas = config.and_then(|c| c.canvas.as_ref());

        let from_env = model_url.filter(|url| !url.trim().is_empty());
        let from_file = classifier
            .and_then(|c| c.base_url.as_deref())
            .map(expand_env_vars)
            .filter(|url| !url.trim().is_empty());
        let endpoint = match from_env.or(from_file) {
            Some(raw) => ClassifierEndpoint::parse(&raw)?,
            None => ClassifierEndpoint::default(),
        };

        let request_timeout = classifier
            .and_then(|c| c.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let throttle = match canvas.and_then(|c| c.throttle_ms) {
            Some(ms) if THROTTLE_RANGE_MS.contains(&ms) => ms,
            Some(ms) => {
                let clamped = ms.clamp(*THROTTLE_RANGE_MS.start(), *THROTTLE_RANGE_MS.end());
                tracing::warn!(throttle_ms = ms, clamped, "throttle_ms out of range");
                clamped
            }
            None => DEFAULT_THROTTLE_MS,
        };

        let stroke_width = match canvas.and_then(|c| c.stroke_width) {
            Some(width) if width.is_finite() && width > 0.0 => width,
            Some(width) => {
                tracing::warn!(width, "Ignoring invalid stroke_width");
                DEFAULT_STROKE_WIDTH
            }
            None => DEFAULT_STROKE_WIDTH,
        };

        let ui = app.map_or_else(UiOptions::default, |app| UiOptions {
            ascii_only: app.ascii_only,
            high_contrast: app.high_contrast,
            reduced_motion: app.reduced_motion,
        });

        Ok(Self {
            endpoint,
            request_timeout: Duration::from_secs(request_timeout),
            throttle: Duration::from_millis(throttle),
            stroke_width,
            ui,
        })
    }
}
