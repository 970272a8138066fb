pub mod export;
pub mod inspect;
pub mod partition;
pub mod report;
pub mod scanner;
pub mod schema;
pub mod sniff;
pub mod source;
pub mod stats;
pub mod table;

pub use export::{export_tables, write_table, ExportTarget, ExportedFile};
pub use inspect::{cast, inspect, InspectOptions, Inspection};
pub use partition::{PartitionPlan, PartitionSpec};
pub use report::{
    group_thousands, render_exported, render_head, render_json, render_size, render_summary,
    Report,
};
pub use scanner::{path_size, scan_directory};
pub use schema::{describe_arrow_schema, describe_parquet_schema, ColumnDescriptor};
pub use sniff::{read_sample, sniff_delimiter, CANDIDATE_DELIMITERS};
pub use source::{open_source, CsvSource, LoadRequirement, ParquetSource, TableFormat, TableSource};
pub use stats::{collect_statistics, null_fraction, ColumnStatistic};
pub use table::Table;
pub use tinspect_common::{Config, Result, TinspectError};
