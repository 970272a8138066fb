use arrow::datatypes::Schema;
use parquet::basic::ConvertedType;
use parquet::schema::types::SchemaDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub physical_type: String,
    pub logical_type: Option<String>,
}

impl ColumnDescriptor {
    /// type text shown in the report: the declared type when storage adds
    /// nothing, otherwise physical type plus logical annotation
    pub fn type_label(&self) -> String {
        match &self.logical_type {
            Some(lt) => format!("{}  {lt}", self.physical_type),
            None if self.physical_type == self.declared_type => self.declared_type.clone(),
            None => self.physical_type.clone(),
        }
    }
}

/// descriptors for a text table: the inferred arrow type is both declared and physical
pub fn describe_arrow_schema(schema: &Schema) -> Vec<ColumnDescriptor> {
    schema
        .fields()
        .iter()
        .map(|f| {
            let ty = f.data_type().to_string();
            ColumnDescriptor {
                name: f.name().clone(),
                declared_type: ty.clone(),
                physical_type: ty,
                logical_type: None,
            }
        })
        .collect()
}

/// descriptors for a parquet file, one per leaf column, read from the footer only
pub fn describe_parquet_schema(
    descr: &SchemaDescriptor,
    arrow_schema: &Schema,
) -> Vec<ColumnDescriptor> {
    (0..descr.num_columns())
        .map(|i| {
            let col = descr.column(i);
            let physical_type = format!("{:?}", col.physical_type());
            let logical_type = match col.logical_type() {
                Some(lt) => Some(format!("{lt:?}")),
                None if col.converted_type() != ConvertedType::NONE => {
                    Some(format!("{:?}", col.converted_type()))
                }
                None => None,
            };
            // nested leaves report the arrow type of their root field
            let declared_type = arrow_schema
                .fields()
                .get(descr.get_column_root_idx(i))
                .map(|f| f.data_type().to_string())
                .unwrap_or_else(|| physical_type.clone());
            ColumnDescriptor {
                name: col.name().to_owned(),
                declared_type,
                physical_type,
                logical_type,
            }
        })
        .collect()
}
