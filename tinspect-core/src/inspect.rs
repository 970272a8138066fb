use crate::export::{export_tables, ExportTarget, ExportedFile};
use crate::partition::{PartitionPlan, PartitionSpec};
use crate::report::Report;
use crate::scanner::path_size;
use crate::schema::ColumnDescriptor;
use crate::source::{open_source, LoadRequirement, TableFormat};
use crate::stats::{collect_statistics, ColumnStatistic};
use crate::table::Table;
use std::path::{Path, PathBuf};
use tinspect_common::{Config, Result, TinspectError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectOptions {
    pub cast: Option<PathBuf>,
    pub partition: Option<PartitionSpec>,
    pub show_head: bool,
    pub show_unique: bool,
    /// skip delimiter sniffing for text input
    pub delimiter: Option<u8>,
}

impl InspectOptions {
    pub fn load_requirement(&self, head_rows: usize) -> LoadRequirement {
        if self.cast.is_some() || self.show_unique {
            LoadRequirement::Full
        } else if self.show_head {
            LoadRequirement::Prefix(head_rows)
        } else {
            LoadRequirement::SchemaOnly
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inspection {
    pub path: PathBuf,
    pub format: TableFormat,
    pub columns: Vec<ColumnDescriptor>,
    pub statistics: Option<Vec<ColumnStatistic>>,
    pub row_count: usize,
    pub size_bytes: u64,
    pub head: Option<Table>,
    /// present only when the full table was loaded
    pub table: Option<Table>,
}

impl Inspection {
    pub fn report(&self, exported: Vec<ExportedFile>) -> Report {
        Report {
            path: self.path.clone(),
            format: self.format,
            columns: self.columns.clone(),
            statistics: self.statistics.clone(),
            row_count: self.row_count,
            column_count: self.columns.len(),
            size_bytes: self.size_bytes,
            exported,
        }
    }
}

pub fn inspect(path: &Path, options: &InspectOptions, config: &Config) -> Result<Inspection> {
    if !path.exists() {
        return Err(TinspectError::NotFound(path.to_path_buf()));
    }
    let format = TableFormat::from_path(path)?;
    // reject an unusable cast target before paying for a full load
    if let Some(cast) = &options.cast {
        ExportTarget::from_path(cast)?;
    }
    let requirement = options.load_requirement(config.inspect.head_rows);
    debug!(path = %path.display(), %format, ?requirement, "inspecting");

    let source = open_source(path, requirement, options.delimiter, config)?;
    let columns = source.column_descriptors();
    let loaded = source.load(requirement)?;
    let (row_count, table) = match (requirement, loaded) {
        (LoadRequirement::Full, Some(table)) => (table.num_rows(), Some(table)),
        (_, loaded) => (source.row_count()?, loaded),
    };
    let head = match &table {
        Some(t) if options.show_head => Some(t.head(config.inspect.head_rows)),
        _ => None,
    };
    let statistics = match (&table, options.show_unique) {
        (Some(t), true) => Some(collect_statistics(t)?),
        _ => None,
    };
    let size_bytes = path_size(path)?;
    let table = match requirement {
        LoadRequirement::Full => table,
        _ => None,
    };
    Ok(Inspection {
        path: path.to_path_buf(),
        format: source.format(),
        columns,
        statistics,
        row_count,
        size_bytes,
        head,
        table,
    })
}

/// Split the loaded table according to `options.partition` and write it to
/// the cast target. Returns nothing when no cast target was requested.
pub fn cast(inspection: &Inspection, options: &InspectOptions, config: &Config) -> Result<Vec<ExportedFile>> {
    let Some(cast_path) = &options.cast else {
        return Ok(Vec::new());
    };
    let target = ExportTarget::from_path(cast_path)?;
    let table = inspection
        .table
        .as_ref()
        .ok_or_else(|| TinspectError::Other("cast requires a fully loaded table".into()))?;
    let plan = match options.partition {
        Some(spec) => spec.plan(table.num_rows())?,
        None => PartitionPlan::single(table.num_rows()),
    };
    info!(partitions = plan.len(), rows = table.num_rows(), target = %cast_path.display(), "exporting");
    if plan.is_empty() {
        warn!("table has no rows to partition, nothing written");
    }
    let parts = plan.split(table)?;
    export_tables(&parts, &target, &config.export)
}
