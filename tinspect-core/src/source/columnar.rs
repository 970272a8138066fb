use super::{TableFormat, TableSource};
use crate::scanner::scan_directory;
use crate::schema::{describe_parquet_schema, ColumnDescriptor};
use crate::table::Table;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::parquet_to_arrow_schema;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tinspect_common::{Config, Result, TinspectError};
use tracing::{debug, warn};

/// A single parquet file or a directory of them read as one dataset.
pub struct ParquetSource {
    files: Vec<PathBuf>,
    schema: SchemaRef,
    descriptors: Vec<ColumnDescriptor>,
    row_count: usize,
    batch_size: usize,
}

/// footer only; row data is never touched
pub fn read_footer(path: &Path) -> Result<ParquetMetaData> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    Ok(reader.metadata().clone())
}

impl ParquetSource {
    /// Open `path` as one file; if that fails (or it is a directory), retry it
    /// as a multi-file dataset before giving up.
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        if !path.is_file() {
            return Self::open_dataset(path, config);
        }
        match read_footer(path) {
            Ok(meta) => Self::from_footers(path, vec![(path.to_path_buf(), meta)], config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "not readable as a single parquet file, retrying as dataset");
                Self::open_dataset(path, config).map_err(|_| TinspectError::FileRead {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })
            }
        }
    }

    fn open_dataset(path: &Path, config: &Config) -> Result<Self> {
        let files = scan_directory(path)?;
        if files.is_empty() {
            return Err(TinspectError::FileRead {
                path: path.to_path_buf(),
                source: Box::new(TinspectError::Other("no parquet files found".into())),
            });
        }
        debug!(path = %path.display(), files = files.len(), "opening parquet dataset");
        let footers = files
            .into_iter()
            .map(|f| read_footer(&f).map(|meta| (f, meta)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_footers(path, footers, config)
    }

    fn from_footers(
        path: &Path,
        footers: Vec<(PathBuf, ParquetMetaData)>,
        config: &Config,
    ) -> Result<Self> {
        // schema comes from the first file
        let file_meta = footers[0].1.file_metadata();
        let schema = parquet_to_arrow_schema(file_meta.schema_descr(), file_meta.key_value_metadata())?;
        let descriptors = describe_parquet_schema(file_meta.schema_descr(), &schema);
        let row_count: i64 = footers
            .iter()
            .flat_map(|(_, meta)| meta.row_groups().iter().map(|rg| rg.num_rows()))
            .sum();
        debug!(path = %path.display(), files = footers.len(), rows = row_count, "read parquet footers");
        Ok(Self {
            files: footers.into_iter().map(|(f, _)| f).collect(),
            schema: Arc::new(schema),
            descriptors,
            row_count: row_count.max(0) as usize,
            batch_size: config.inspect.batch_size.max(1),
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn read_batches(&self, limit: Option<usize>) -> Result<Vec<RecordBatch>> {
        let mut batches = Vec::new();
        let mut remaining = limit;
        for file in &self.files {
            if remaining == Some(0) {
                break;
            }
            let mut builder = ParquetRecordBatchReaderBuilder::try_new(File::open(file)?)?
                .with_batch_size(self.batch_size);
            if let Some(n) = remaining {
                builder = builder.with_limit(n);
            }
            for batch in builder.build()? {
                let batch = batch?;
                remaining = remaining.map(|n| n.saturating_sub(batch.num_rows()));
                batches.push(batch);
            }
        }
        Ok(batches)
    }
}

impl TableSource for ParquetSource {
    fn format(&self) -> TableFormat {
        TableFormat::ColumnarBinary
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn column_descriptors(&self) -> Vec<ColumnDescriptor> {
        self.descriptors.clone()
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.row_count)
    }

    fn load_prefix(&self, rows: usize) -> Result<Table> {
        let batches = self.read_batches(Some(rows))?;
        Ok(Table::from_batches(self.schema(), &batches)?.head(rows))
    }

    fn load_full(&self) -> Result<Table> {
        let batches = self.read_batches(None)?;
        Table::from_batches(self.schema(), &batches)
    }
}
