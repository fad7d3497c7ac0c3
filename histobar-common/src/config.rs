use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::HistobarError;

pub const DEFAULT_AUTO_BUCKETS: u32 = 10;
pub const DEFAULT_BAR_SCALE: u64 = 40;
pub const DEFAULT_BAR_GLYPH: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramConfig {
    #[serde(default = "default_auto_buckets")]
    pub auto_buckets: u32,
}

fn default_auto_buckets() -> u32 {
    DEFAULT_AUTO_BUCKETS
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            auto_buckets: default_auto_buckets(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_bar_scale")]
    pub bar_scale: u64,
    #[serde(default = "default_bar_glyph")]
    pub bar_glyph: char,
}

fn default_bar_scale() -> u64 {
    DEFAULT_BAR_SCALE
}
fn default_bar_glyph() -> char {
    DEFAULT_BAR_GLYPH
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            bar_scale: default_bar_scale(),
            bar_glyph: default_bar_glyph(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub histogram: HistogramConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("histobar")
            .join("config.toml")
    }

    /// `$HISTOBAR_CONFIG` when set, else [`Config::config_path`]. Used by both load and save.
    pub fn resolved_path() -> PathBuf {
        match std::env::var_os("HISTOBAR_CONFIG") {
            Some(env_path) => PathBuf::from(env_path),
            None => Self::config_path(),
        }
    }

    /// A missing file yields the defaults.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::resolved_path())
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&content).map_err(|e| HistobarError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.histogram.auto_buckets == 0 {
            return Err(HistobarError::Config("histogram.auto_buckets must be at least 1".into()));
        }
        if self.chart.bar_scale == 0 {
            return Err(HistobarError::Config("chart.bar_scale must be at least 1".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| HistobarError::Config(e.to_string()))
    }

    pub fn save(&self) -> crate::Result<PathBuf> {
        let path = Self::resolved_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
