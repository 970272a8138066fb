pub mod columnar;
pub mod delimited;

pub use columnar::ParquetSource;
pub use delimited::CsvSource;

use crate::schema::ColumnDescriptor;
use crate::table::Table;
use arrow::datatypes::SchemaRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tinspect_common::{Config, Result, TinspectError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    DelimitedText,
    ColumnarBinary,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Self::DelimitedText),
            Some("parquet") => Ok(Self::ColumnarBinary),
            _ => Err(TinspectError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::DelimitedText => "csv",
            Self::ColumnarBinary => "parquet",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How much row data the caller needs, decided once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequirement {
    SchemaOnly,
    Prefix(usize),
    Full,
}

pub trait TableSource {
    fn format(&self) -> TableFormat;
    fn schema(&self) -> SchemaRef;
    /// one descriptor per column, in source column order
    fn column_descriptors(&self) -> Vec<ColumnDescriptor>;
    /// data rows in the source, without materializing them
    fn row_count(&self) -> Result<usize>;
    fn load_prefix(&self, rows: usize) -> Result<Table>;
    fn load_full(&self) -> Result<Table>;

    fn load(&self, requirement: LoadRequirement) -> Result<Option<Table>> {
        match requirement {
            LoadRequirement::SchemaOnly => Ok(None),
            LoadRequirement::Prefix(rows) => self.load_prefix(rows).map(Some),
            LoadRequirement::Full => self.load_full().map(Some),
        }
    }
}

/// open `path` with the reader for its format; `delimiter` skips sniffing for text
pub fn open_source(
    path: &Path,
    requirement: LoadRequirement,
    delimiter: Option<u8>,
    config: &Config,
) -> Result<Box<dyn TableSource>> {
    match TableFormat::from_path(path)? {
        TableFormat::DelimitedText => Ok(Box::new(CsvSource::open(
            path,
            requirement,
            delimiter,
            config,
        )?)),
        TableFormat::ColumnarBinary => Ok(Box::new(ParquetSource::open(path, config)?)),
    }
}
