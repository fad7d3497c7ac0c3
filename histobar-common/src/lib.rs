pub mod config;
pub use config::{
    ChartConfig, Config, HistogramConfig, LogConfig, DEFAULT_AUTO_BUCKETS, DEFAULT_BAR_GLYPH,
    DEFAULT_BAR_SCALE,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistobarError {
    #[error("empty input: no {0} to derive a minimum/maximum from")]
    EmptyInput(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: not an integer: {token:?}")]
    Parse { line: usize, token: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HistobarError>;
