use crate::source::TableFormat;
use crate::table::Table;
use arrow::csv::WriterBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tinspect_common::{ExportConfig, Result, TinspectError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub base_path: PathBuf,
    pub format: TableFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub rows: usize,
}

impl ExportTarget {
    /// the output format follows the target's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            base_path: path.to_path_buf(),
            format: TableFormat::from_path(path)?,
        })
    }

    /// `{parent}/{stem}_{index}{suffix}` when writing several tables, else the base path
    pub fn path_for(&self, index: usize, count: usize) -> PathBuf {
        if count <= 1 {
            return self.base_path.clone();
        }
        let stem = self
            .base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.base_path
            .with_file_name(format!("{stem}_{index}.{}", self.format.extension()))
    }
}

fn parquet_compression(name: &str) -> Result<Compression> {
    match name.to_ascii_lowercase().as_str() {
        "uncompressed" | "none" => Ok(Compression::UNCOMPRESSED),
        "snappy" => Ok(Compression::SNAPPY),
        "zstd" => Ok(Compression::ZSTD(ZstdLevel::default())),
        "gzip" => Ok(Compression::GZIP(GzipLevel::default())),
        other => Err(TinspectError::Config(format!(
            "unknown export.parquet_compression: {other}"
        ))),
    }
}

pub fn write_table(table: &Table, path: &Path, format: TableFormat, config: &ExportConfig) -> Result<()> {
    let file = File::create(path)?;
    match format {
        TableFormat::DelimitedText => {
            let mut writer = WriterBuilder::new()
                .with_header(config.csv_header)
                .build(file);
            writer.write(table.batch())?;
        }
        TableFormat::ColumnarBinary => {
            let props = WriterProperties::builder()
                .set_compression(parquet_compression(&config.parquet_compression)?)
                .build();
            let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props))?;
            writer.write(table.batch())?;
            writer.close()?;
        }
    }
    Ok(())
}

/// Write each table in order. A failure stops the run and leaves the files
/// already written in place.
pub fn export_tables(
    tables: &[Table],
    target: &ExportTarget,
    config: &ExportConfig,
) -> Result<Vec<ExportedFile>> {
    let count = tables.len();
    let mut written = Vec::with_capacity(count);
    for (i, table) in tables.iter().enumerate() {
        let path = target.path_for(i, count);
        write_table(table, &path, target.format, config)?;
        info!(path = %path.display(), rows = table.num_rows(), "exported table");
        written.push(ExportedFile {
            path,
            rows: table.num_rows(),
        });
    }
    Ok(written)
}
