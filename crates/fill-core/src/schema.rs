//! Table schemas and the schema normalizer.
//!
//! ## Type Hierarchy
//!
//! **Raw types** (as reported by a schema provider):
//! - `RawColumn` - Declared type name, length/precision/scale, enum domain, nullability
//! - `RawTableMetadata` - Raw columns plus primary-key, unique and generated column sets
//!
//! **Normalized types** (consumed by the generator):
//! - `ColumnSpec` - Resolved `TypeCategory` plus constraint flags
//! - `TableSchema` - Ordered, name-unique list of `ColumnSpec`

use crate::error::SchemaError;
use crate::types::{ColumnSpec, TypeCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Length of MySQL TINYTEXT, the only bounded TEXT variant.
const TINYTEXT_LENGTH: u32 = 255;

/// Column metadata as reported by a schema provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumn {
    /// Column name
    pub name: String,
    /// Declared type name (e.g. "VARCHAR", "decimal")
    pub declared_type: String,
    /// Character or byte length for text and binary types
    pub length: Option<u32>,
    /// Numeric precision (total digits)
    pub precision: Option<u32>,
    /// Numeric scale (fractional digits)
    pub scale: Option<u32>,
    /// Whether an integer type is unsigned
    pub unsigned: bool,
    /// Allowed labels for ENUM columns
    pub enum_values: Vec<String>,
    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl RawColumn {
    /// Create a non-nullable raw column.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            ..Self::default()
        }
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set numeric precision and scale.
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set the enum domain.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Mark an integer column unsigned.
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Mark the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Everything a schema provider reports about one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTableMetadata {
    /// Table name
    pub name: String,
    /// Columns in ordinal order; empty when the table does not exist
    pub columns: Vec<RawColumn>,
    /// Primary-key column names in key order
    pub primary_key: Vec<String>,
    /// Columns covered by any uniqueness constraint
    pub unique_columns: HashSet<String>,
    /// Columns whose value the database assigns
    pub generated_columns: HashSet<String>,
}

impl RawTableMetadata {
    /// Create metadata for a table with no columns yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a column.
    pub fn with_column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary-key columns.
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add columns covered by uniqueness constraints.
    pub fn with_unique_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add database-generated columns.
    pub fn with_generated_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generated_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }
}

/// Ordered column list for one table, unique by column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Columns in ordinal order
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Create a table schema, rejecting duplicate column names.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { name, columns })
    }

    /// Normalize raw provider metadata into a table schema.
    ///
    /// A table with no columns does not exist in the live schema.
    pub fn from_raw(raw: RawTableMetadata) -> Result<Self, SchemaError> {
        if raw.columns.is_empty() {
            return Err(SchemaError::TableNotFound(raw.name));
        }

        let known: HashSet<&str> = raw.columns.iter().map(|c| c.name.as_str()).collect();
        let constrained = raw
            .primary_key
            .iter()
            .chain(raw.unique_columns.iter())
            .chain(raw.generated_columns.iter());
        for column in constrained {
            if !known.contains(column.as_str()) {
                return Err(SchemaError::ColumnNotFound {
                    table: raw.name.clone(),
                    column: column.clone(),
                });
            }
        }

        let columns = raw
            .columns
            .iter()
            .map(|column| ColumnSpec {
                name: column.name.clone(),
                category: resolve_category(column),
                nullable: column.nullable,
                is_primary_key: raw.primary_key.contains(&column.name),
                is_unique: raw.unique_columns.contains(&column.name),
                is_generated: raw.generated_columns.contains(&column.name),
            })
            .collect();

        Self::new(raw.name, columns)
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names in ordinal order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Primary-key columns in ordinal order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }

    /// Database-generated columns in ordinal order.
    pub fn generated_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.is_generated)
    }

    /// Columns that need a uniqueness set during a batch.
    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.tracks_uniqueness())
    }
}

/// Resolve the declared type of a raw column to its category.
///
/// Matching is case-insensitive. Unknown types resolve to
/// [`TypeCategory::Unsupported`], which the generator honours by omitting
/// the column from every record.
pub fn resolve_category(column: &RawColumn) -> TypeCategory {
    let declared = column.declared_type.trim().to_uppercase();
    match declared.as_str() {
        "CHAR" | "VARCHAR" => match column.length {
            Some(max_length) => TypeCategory::ShortText { max_length },
            None => TypeCategory::LongText,
        },
        "TINYTEXT" => TypeCategory::ShortText {
            max_length: column.length.unwrap_or(TINYTEXT_LENGTH).min(TINYTEXT_LENGTH),
        },
        "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => TypeCategory::LongText,

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
            let (min, max) = integer_storage_range(&declared, column.unsigned);
            TypeCategory::Integer { min, max }
        }

        "FLOAT" | "DOUBLE" | "REAL" => TypeCategory::Float,

        "DECIMAL" | "NUMERIC" => {
            let precision = column.precision.unwrap_or(10).min(65);
            let scale = column.scale.unwrap_or(0).min(precision);
            TypeCategory::Decimal {
                left_digits: (precision - scale) as u8,
                right_digits: scale as u8,
            }
        }

        "DATE" => TypeCategory::Date,
        "TIME" => TypeCategory::Time,
        "DATETIME" | "TIMESTAMP" => TypeCategory::DateTime,
        "YEAR" => TypeCategory::Year,
        "BOOL" | "BOOLEAN" => TypeCategory::Bool,

        "ENUM" if !column.enum_values.is_empty() => TypeCategory::Enumerated {
            options: column.enum_values.clone(),
        },

        "BINARY" | "VARBINARY" => TypeCategory::Binary {
            max_length: column.length,
        },
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => TypeCategory::Binary {
            max_length: None,
        },

        _ => TypeCategory::Unsupported {
            declared: column.declared_type.clone(),
        },
    }
}

/// Storage range of a sized integer type.
fn integer_storage_range(declared: &str, unsigned: bool) -> (i64, i64) {
    match (declared, unsigned) {
        ("TINYINT", false) => (i8::MIN as i64, i8::MAX as i64),
        ("TINYINT", true) => (0, u8::MAX as i64),
        ("SMALLINT", false) => (i16::MIN as i64, i16::MAX as i64),
        ("SMALLINT", true) => (0, u16::MAX as i64),
        ("MEDIUMINT", false) => (-8_388_608, 8_388_607),
        ("MEDIUMINT", true) => (0, 16_777_215),
        ("BIGINT", false) => (i64::MIN, i64::MAX),
        ("BIGINT", true) => (0, i64::MAX),
        (_, false) => (i32::MIN as i64, i32::MAX as i64),
        (_, true) => (0, u32::MAX as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> RawTableMetadata {
        RawTableMetadata::new("orders")
            .with_column(RawColumn::new("id", "int").unsigned())
            .with_column(RawColumn::new("code", "VARCHAR").with_length(5))
            .with_column(RawColumn::new("status", "enum").with_enum_values(["open", "closed"]))
            .with_column(RawColumn::new("total", "DECIMAL").with_precision(8, 2))
            .with_column(RawColumn::new("note", "text").nullable())
            .with_column(RawColumn::new("area", "GEOMETRY"))
            .with_primary_key(["id"])
            .with_unique_columns(["code"])
            .with_generated_columns(["id"])
    }

    #[test]
    fn test_normalize_orders() {
        let schema = TableSchema::from_raw(orders()).unwrap();

        assert_eq!(schema.name, "orders");
        assert_eq!(
            schema.column_names(),
            vec!["id", "code", "status", "total", "note", "area"]
        );

        let id = schema.get_column("id").unwrap();
        assert_eq!(
            id.category,
            TypeCategory::Integer {
                min: 0,
                max: u32::MAX as i64
            }
        );
        assert!(id.is_primary_key && id.is_generated && !id.is_unique);

        let code = schema.get_column("code").unwrap();
        assert_eq!(code.category, TypeCategory::ShortText { max_length: 5 });
        assert!(code.is_unique);
        assert_eq!(code.max_length(), Some(5));

        let status = schema.get_column("status").unwrap();
        assert_eq!(
            status.category,
            TypeCategory::Enumerated {
                options: vec!["open".to_string(), "closed".to_string()]
            }
        );

        let total = schema.get_column("total").unwrap();
        assert_eq!(
            total.category,
            TypeCategory::Decimal {
                left_digits: 6,
                right_digits: 2
            }
        );

        assert!(schema.get_column("note").unwrap().nullable);
        assert!(!schema.get_column("area").unwrap().category.is_supported());
    }

    #[test]
    fn test_constraint_views() {
        let schema = TableSchema::from_raw(orders()).unwrap();

        let pk: Vec<_> = schema.primary_key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(pk, vec!["id"]);

        let generated: Vec<_> = schema.generated_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(generated, vec!["id"]);

        let unique: Vec<_> = schema.unique_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(unique, vec!["code"]);
    }

    #[test]
    fn test_missing_table() {
        let result = TableSchema::from_raw(RawTableMetadata::new("ghost"));
        assert!(matches!(result, Err(SchemaError::TableNotFound(name)) if name == "ghost"));
    }

    #[test]
    fn test_duplicate_column() {
        let raw = RawTableMetadata::new("t")
            .with_column(RawColumn::new("a", "INT"))
            .with_column(RawColumn::new("a", "TEXT"));
        assert!(matches!(
            TableSchema::from_raw(raw),
            Err(SchemaError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_constraint_on_unknown_column() {
        let raw = RawTableMetadata::new("t")
            .with_column(RawColumn::new("a", "INT"))
            .with_unique_columns(["b"]);
        assert!(matches!(
            TableSchema::from_raw(raw),
            Err(SchemaError::ColumnNotFound { column, .. }) if column == "b"
        ));
    }

    #[test]
    fn test_resolve_category_case_insensitive() {
        let cases = [
            ("varchar", Some(20), TypeCategory::ShortText { max_length: 20 }),
            ("Char", Some(1), TypeCategory::ShortText { max_length: 1 }),
            ("VARCHAR", None, TypeCategory::LongText),
            ("tinytext", None, TypeCategory::ShortText { max_length: 255 }),
            ("longtext", None, TypeCategory::LongText),
            ("double", None, TypeCategory::Float),
            ("date", None, TypeCategory::Date),
            ("time", None, TypeCategory::Time),
            ("timestamp", None, TypeCategory::DateTime),
            ("DATETIME", None, TypeCategory::DateTime),
            ("year", None, TypeCategory::Year),
            ("boolean", None, TypeCategory::Bool),
            ("varbinary", Some(16), TypeCategory::Binary { max_length: Some(16) }),
            ("blob", None, TypeCategory::Binary { max_length: None }),
        ];

        for (declared, length, expected) in cases {
            let mut column = RawColumn::new("c", declared);
            column.length = length;
            assert_eq!(resolve_category(&column), expected, "declared {declared}");
        }
    }

    #[test]
    fn test_integer_ranges() {
        let tiny = resolve_category(&RawColumn::new("c", "TINYINT"));
        assert_eq!(tiny, TypeCategory::Integer { min: -128, max: 127 });

        let small = resolve_category(&RawColumn::new("c", "smallint").unsigned());
        assert_eq!(small, TypeCategory::Integer { min: 0, max: 65535 });

        let big = resolve_category(&RawColumn::new("c", "BIGINT"));
        assert_eq!(
            big,
            TypeCategory::Integer {
                min: i64::MIN,
                max: i64::MAX
            }
        );
    }

    #[test]
    fn test_unknown_and_degenerate_types() {
        assert_eq!(
            resolve_category(&RawColumn::new("c", "JSON")),
            TypeCategory::Unsupported {
                declared: "JSON".to_string()
            }
        );
        // An ENUM without a domain has nothing to pick from
        assert!(!resolve_category(&RawColumn::new("c", "ENUM")).is_supported());
    }

    #[test]
    fn test_decimal_defaults() {
        let column = RawColumn::new("c", "numeric");
        assert_eq!(
            resolve_category(&column),
            TypeCategory::Decimal {
                left_digits: 10,
                right_digits: 0
            }
        );

        let column = RawColumn::new("c", "DECIMAL").with_precision(4, 4);
        assert_eq!(
            resolve_category(&column),
            TypeCategory::Decimal {
                left_digits: 0,
                right_digits: 4
            }
        );
    }
}
