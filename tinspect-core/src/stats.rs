use crate::table::Table;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field};
use arrow::row::{RowConverter, SortField};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tinspect_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnStatistic {
    pub name: String,
    /// distinct non-null values; nulls never count as a value
    pub distinct_count: usize,
    pub null_count: usize,
    /// null share rounded up to the next hundredth
    pub null_fraction: f64,
}

/// ceil(nulls / rows * 100) / 100, computed in integers so 2/10 stays 0.20
pub fn null_fraction(null_count: usize, total_rows: usize) -> f64 {
    if total_rows == 0 {
        return 0.0;
    }
    let hundredths = (null_count as u128 * 100).div_ceil(total_rows as u128);
    hundredths as f64 / 100.0
}

/// distinct values among the rows `nulls` marks valid
fn count_distinct_valid(array: &ArrayRef, nulls: Option<&NullBuffer>) -> Result<usize> {
    let valid = |i: usize| nulls.map_or(true, |n| n.is_valid(i));
    match RowConverter::new(vec![SortField::new(array.data_type().clone())]) {
        Ok(converter) => {
            let rows = converter.convert_columns(&[Arc::clone(array)])?;
            let mut seen = HashSet::new();
            for i in (0..array.len()).filter(|&i| valid(i)) {
                seen.insert(rows.row(i));
            }
            Ok(seen.len())
        }
        // types without a row encoding are compared by their rendered value
        Err(_) => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            let seen: HashSet<String> = (0..array.len())
                .filter(|&i| valid(i))
                .map(|i| formatter.value(i).to_string())
                .collect();
            Ok(seen.len())
        }
    }
}

/// leaf names under `field` in storage order, the way a parquet schema lists them
fn leaf_names(field: &Field) -> Vec<String> {
    match field.data_type() {
        DataType::Struct(children) => children.iter().flat_map(|c| leaf_names(c)).collect(),
        DataType::List(item)
        | DataType::LargeList(item)
        | DataType::FixedSizeList(item, _)
        | DataType::Map(item, _) => leaf_names(item),
        _ => vec![field.name().clone()],
    }
}

fn collect_leaves(
    field: &Field,
    array: &ArrayRef,
    inherited: Option<&NullBuffer>,
    total_rows: usize,
    out: &mut Vec<ColumnStatistic>,
) -> Result<()> {
    let nulls = NullBuffer::union(inherited, array.logical_nulls().as_ref());
    if let DataType::Struct(children) = field.data_type() {
        // a null struct row is null in every child
        for (child_field, child) in children.iter().zip(array.as_struct().columns()) {
            collect_leaves(child_field, child, nulls.as_ref(), total_rows, out)?;
        }
        return Ok(());
    }
    let null_count = nulls.as_ref().map_or(0, |n| n.null_count());
    let distinct_count = count_distinct_valid(array, nulls.as_ref())?;
    // leaves inside a list or map share the statistics of their repeated column
    for name in leaf_names(field) {
        out.push(ColumnStatistic {
            name,
            distinct_count,
            null_count,
            null_fraction: null_fraction(null_count, total_rows),
        });
    }
    Ok(())
}

/// One statistic per leaf column, in storage order; struct children are
/// reported individually. Read-only pass over the table.
pub fn collect_statistics(table: &Table) -> Result<Vec<ColumnStatistic>> {
    let total_rows = table.num_rows();
    let schema = table.schema();
    let mut out = Vec::with_capacity(schema.fields().len());
    for (i, field) in schema.fields().iter().enumerate() {
        collect_leaves(field, table.column(i), None, total_rows, &mut out)?;
    }
    Ok(out)
}
