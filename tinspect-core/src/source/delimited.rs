use super::{LoadRequirement, TableFormat, TableSource};
use crate::schema::{describe_arrow_schema, ColumnDescriptor};
use crate::sniff::{read_sample, sniff_delimiter};
use crate::table::Table;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tinspect_common::{Config, Result, TinspectError};
use tracing::{debug, warn};

pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    schema: SchemaRef,
    null_regex: Regex,
    batch_size: usize,
}

impl CsvSource {
    /// Resolve the delimiter and infer column types. Inference covers the
    /// preview rows (or the requested prefix, if longer) unless the whole
    /// table will be loaded anyway. Short records are padded with nulls.
    pub fn open(
        path: &Path,
        requirement: LoadRequirement,
        delimiter: Option<u8>,
        config: &Config,
    ) -> Result<Self> {
        let delimiter = match delimiter {
            Some(d) => d,
            None => detect_delimiter(path, config)?,
        };
        let null_regex = Regex::new(&config.csv.null_pattern)
            .map_err(|e| TinspectError::Config(format!("csv.null_pattern: {e}")))?;
        let infer_rows = match requirement {
            LoadRequirement::Full => None,
            LoadRequirement::Prefix(rows) => Some(config.inspect.preview_rows.max(rows).max(1)),
            LoadRequirement::SchemaOnly => Some(config.inspect.preview_rows.max(1)),
        };
        let (schema, scanned) = Format::default()
            .with_header(true)
            .with_delimiter(delimiter)
            .with_truncated_rows(true)
            .with_null_regex(null_regex.clone())
            .infer_schema(File::open(path)?, infer_rows)?;
        let shown = (delimiter as char).escape_default().to_string();
        debug!(path = %path.display(), delimiter = %shown, scanned, "inferred csv schema");
        Ok(Self {
            path: path.to_path_buf(),
            delimiter,
            schema: Arc::new(schema),
            null_regex,
            batch_size: config.inspect.batch_size.max(1),
        })
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn reader(&self, batch_size: usize) -> Result<arrow::csv::Reader<File>> {
        Ok(ReaderBuilder::new(Arc::clone(&self.schema))
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_null_regex(self.null_regex.clone())
            .with_truncated_rows(true)
            .with_batch_size(batch_size)
            .build(File::open(&self.path)?)?)
    }
}

/// sniff the delimiter from the leading sample, falling back to the configured default
pub fn detect_delimiter(path: &Path, config: &Config) -> Result<u8> {
    let sample = read_sample(path, config.inspect.sniff_bytes)?;
    match sniff_delimiter(&sample) {
        Ok(d) => Ok(d),
        Err(reason) => match config.csv.fallback_delimiter {
            Some(fallback) if fallback.is_ascii() => {
                warn!(path = %path.display(), %reason, %fallback, "delimiter detection failed, using fallback");
                Ok(fallback as u8)
            }
            Some(fallback) => Err(TinspectError::Config(format!(
                "csv.fallback_delimiter must be a single-byte character, got {fallback:?}"
            ))),
            None => Err(TinspectError::FormatDetection {
                path: path.to_path_buf(),
                reason,
            }),
        },
    }
}

impl TableSource for CsvSource {
    fn format(&self) -> TableFormat {
        TableFormat::DelimitedText
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn column_descriptors(&self) -> Vec<ColumnDescriptor> {
        describe_arrow_schema(&self.schema)
    }

    fn row_count(&self) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let mut record = csv::ByteRecord::new();
        let mut rows = 0usize;
        while reader.read_byte_record(&mut record)? {
            rows += 1;
        }
        Ok(rows)
    }

    fn load_prefix(&self, rows: usize) -> Result<Table> {
        let mut batches: Vec<RecordBatch> = Vec::new();
        let mut loaded = 0usize;
        for batch in self.reader(rows.clamp(1, self.batch_size))? {
            if loaded >= rows {
                break;
            }
            let batch = batch?;
            loaded += batch.num_rows();
            batches.push(batch);
        }
        Ok(Table::from_batches(self.schema(), &batches)?.head(rows))
    }

    fn load_full(&self) -> Result<Table> {
        let batches = self
            .reader(self.batch_size)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Table::from_batches(self.schema(), &batches)
    }
}
