pub mod export;
pub mod histogram;
pub mod render;
pub mod samples;

pub use export::{export_csv, export_json, histogram_json, write_csv, write_json};
pub use histobar_common::{HistobarError, Result, DEFAULT_AUTO_BUCKETS};
pub use histogram::{Category, Histogram, HistogramBuilder};
pub use render::{Chart, RenderOptions, NO_DATA};
pub use samples::{parse_boundaries, parse_samples, read_samples};
