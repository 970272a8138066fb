use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tinspect_common::{Result, TinspectError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSpec {
    /// exactly N near-equal partitions
    Count(usize),
    /// partitions of at most R rows; only the last may be short
    MaxRows(usize),
}

impl PartitionSpec {
    /// Build a spec from raw option values. Both are validated; a count takes
    /// priority over a row limit when both are given.
    pub fn from_options(partitions: Option<i64>, partition_rows: Option<i64>) -> Result<Option<Self>> {
        let partitions = partitions.map(|n| positive("partition count", n)).transpose()?;
        let partition_rows = partition_rows
            .map(|r| positive("rows per partition", r))
            .transpose()?;
        Ok(match (partitions, partition_rows) {
            (Some(n), _) => Some(Self::Count(n)),
            (None, Some(r)) => Some(Self::MaxRows(r)),
            (None, None) => None,
        })
    }

    pub fn plan(&self, total_rows: usize) -> Result<PartitionPlan> {
        match *self {
            Self::Count(n) => PartitionPlan::fixed_count(total_rows, n),
            Self::MaxRows(r) => PartitionPlan::max_rows(total_rows, r),
        }
    }
}

fn positive(what: &str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(TinspectError::InvalidPartitionSpec(format!(
            "{what} must be positive, got {value}"
        )));
    }
    usize::try_from(value)
        .map_err(|_| TinspectError::InvalidPartitionSpec(format!("{what} too large: {value}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionPlan {
    ranges: Vec<Range<usize>>,
}

impl PartitionPlan {
    /// the whole table as one partition
    pub fn single(total_rows: usize) -> Self {
        Self {
            ranges: vec![0..total_rows],
        }
    }

    /// Boundaries at floor(i * total / n), scaled in floating point so the
    /// remainder is spread across partitions instead of piling up at the end.
    pub fn fixed_count(total_rows: usize, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(TinspectError::InvalidPartitionSpec(
                "partition count must be positive, got 0".into(),
            ));
        }
        let total = total_rows as f64;
        let boundary = |i: usize| ((i as f64 * total / n as f64) as usize).min(total_rows);
        Ok(Self {
            ranges: (0..n).map(|i| boundary(i)..boundary(i + 1)).collect(),
        })
    }

    /// ceil(total / r) ranges of r rows; the last holds the remainder
    pub fn max_rows(total_rows: usize, r: usize) -> Result<Self> {
        if r == 0 {
            return Err(TinspectError::InvalidPartitionSpec(
                "rows per partition must be positive, got 0".into(),
            ));
        }
        Ok(Self {
            ranges: (0..total_rows.div_ceil(r))
                .map(|i| i * r..((i + 1) * r).min(total_rows))
                .collect(),
        })
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.len()).collect()
    }

    /// slice `table` along the plan; fails if the plan does not match its row count
    pub fn split(&self, table: &Table) -> Result<Vec<Table>> {
        let covered = self.ranges.last().map(|r| r.end).unwrap_or(0);
        if covered != table.num_rows() {
            return Err(TinspectError::Other(format!(
                "partition plan covers {covered} rows but table has {}",
                table.num_rows()
            )));
        }
        Ok(self.ranges.iter().map(|r| table.slice(r.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn assert_covers(plan: &PartitionPlan, total: usize) {
        let mut next = 0;
        for r in plan.ranges() {
            assert_eq!(r.start, next, "ranges must be contiguous");
            assert!(r.end >= r.start);
            next = r.end;
        }
        assert_eq!(next, total);
        assert_eq!(plan.total_rows(), total);
    }

    #[test]
    fn hundred_rows_in_three() {
        let plan = PartitionPlan::fixed_count(100, 3).unwrap();
        assert_eq!(plan.lengths(), vec![33, 33, 34]);
        assert_eq!(plan.ranges()[1], 33..66);
    }

    #[test]
    fn hundred_rows_by_forty() {
        let plan = PartitionPlan::max_rows(100, 40).unwrap();
        assert_eq!(plan.lengths(), vec![40, 40, 20]);
    }

    #[test]
    fn fixed_count_properties() {
        for total in 0..120 {
            for n in 1..15 {
                let plan = PartitionPlan::fixed_count(total, n).unwrap();
                assert_eq!(plan.len(), n);
                assert_covers(&plan, total);
                let lengths = plan.lengths();
                let max = *lengths.iter().max().unwrap();
                let min = *lengths.iter().min().unwrap();
                assert!(max - min <= 1, "total={total} n={n} {lengths:?}");
                if total >= n {
                    assert!(min > 0);
                }
            }
        }
    }

    #[test]
    fn max_rows_properties() {
        for total in 0..120 {
            for r in 1..15 {
                let plan = PartitionPlan::max_rows(total, r).unwrap();
                assert_eq!(plan.len(), total.div_ceil(r));
                assert_covers(&plan, total);
                let lengths = plan.lengths();
                if let Some((last, rest)) = lengths.split_last() {
                    assert!(rest.iter().all(|&l| l == r));
                    assert!(*last > 0 && *last <= r);
                }
            }
        }
    }

    #[test]
    fn more_partitions_than_rows_is_allowed() {
        let plan = PartitionPlan::fixed_count(2, 5).unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.total_rows(), 2);
        assert_eq!(plan.lengths().iter().filter(|&&l| l == 0).count(), 3);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(PartitionPlan::fixed_count(10, 0).is_err());
        assert!(PartitionPlan::max_rows(10, 0).is_err());
    }

    #[test]
    fn options_validate_and_prioritize() {
        assert_eq!(
            PartitionSpec::from_options(Some(3), Some(40)).unwrap(),
            Some(PartitionSpec::Count(3))
        );
        assert_eq!(
            PartitionSpec::from_options(None, Some(40)).unwrap(),
            Some(PartitionSpec::MaxRows(40))
        );
        assert_eq!(PartitionSpec::from_options(None, None).unwrap(), None);
        for bad in [(Some(0), None), (Some(-2), None), (None, Some(0)), (Some(3), Some(-1))] {
            let err = PartitionSpec::from_options(bad.0, bad.1).unwrap_err();
            assert!(matches!(err, TinspectError::InvalidPartitionSpec(_)));
        }
    }

    #[test]
    fn split_concatenates_back_to_the_table() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, true)]));
        let values: Vec<Option<i64>> = (0..23).map(|i| (i % 5 != 0).then_some(i)).collect();
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values.clone()))]).unwrap();
        let table = Table::new(batch);
        for spec in [PartitionSpec::Count(4), PartitionSpec::MaxRows(6), PartitionSpec::Count(30)] {
            let parts = spec.plan(table.num_rows()).unwrap().split(&table).unwrap();
            let mut rebuilt = Vec::new();
            for p in &parts {
                let col = p.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
                rebuilt.extend((0..col.len()).map(|i| col.is_valid(i).then(|| col.value(i))));
            }
            assert_eq!(rebuilt, values, "{spec:?}");
        }
    }

    #[test]
    fn split_rejects_mismatched_plan() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2]))]).unwrap();
        let plan = PartitionPlan::single(3);
        assert!(plan.split(&Table::new(batch)).is_err());
    }
}
