use arrow::array::ArrayRef;
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::ops::Range;
use tinspect_common::Result;

/// A fully materialized table held as one contiguous record batch.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// concatenate batches in order; `schema` is only used when there are none
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let schema = batches.first().map(|b| b.schema()).unwrap_or(schema);
        Ok(Self::new(concat_batches(&schema, batches)?))
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column(&self, index: usize) -> &ArrayRef {
        self.batch.column(index)
    }

    /// zero-copy view of rows `range`; panics if the range is out of bounds
    pub fn slice(&self, range: Range<usize>) -> Table {
        Self::new(self.batch.slice(range.start, range.len()))
    }

    pub fn head(&self, rows: usize) -> Table {
        self.slice(0..rows.min(self.num_rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch(ids: Vec<i32>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("tag", DataType::Utf8, true),
        ]));
        let tags: Vec<Option<String>> = ids.iter().map(|i| Some(format!("t{i}"))).collect();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(ids)),
                Arc::new(StringArray::from(tags)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn concatenates_in_order() {
        let a = batch(vec![1, 2]);
        let b = batch(vec![3]);
        let t = Table::from_batches(a.schema(), &[a, b]).unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.batch().num_columns(), 2);
        assert_eq!(t.schema().field(1).name(), "tag");
        let ids = t.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn no_batches_gives_empty_table() {
        let schema = batch(vec![]).schema();
        let t = Table::from_batches(schema, &[]).unwrap();
        assert_eq!(t.num_rows(), 0);
        assert_eq!(t.batch().num_columns(), 2);
    }

    #[test]
    fn head_is_clamped() {
        let t = Table::new(batch(vec![1, 2, 3]));
        assert_eq!(t.head(2).num_rows(), 2);
        assert_eq!(t.head(10).num_rows(), 3);
        let tail = t.slice(1..3);
        let ids = tail.column(0);
        let ids = ids.as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(ids.value(0), 2);
    }
}
