pub mod config;
pub use config::{Config, CsvConfig, ExportConfig, InspectConfig};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TinspectError {
    #[error("Unsupported: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("could not detect delimiter in {}: {reason}", path.display())]
    FormatDetection { path: PathBuf, reason: String },
    #[error("could not read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: Box<TinspectError>,
    },
    #[error("invalid partition spec: {0}")]
    InvalidPartitionSpec(String),
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TinspectError>;
