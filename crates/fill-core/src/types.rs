//! Column type categories and the canonical column description.
//!
//! A declared database type is resolved to a [`TypeCategory`] once, during
//! schema normalization. Everything downstream dispatches on the enum and
//! never looks at type-name strings again.

use serde::{Deserialize, Serialize};

/// Closed set of value categories the generator knows how to fill.
///
/// Each variant carries exactly the attributes relevant to it, so a bounded
/// text column has a `max_length` and an enumerated column has its options,
/// but an integer column has neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeCategory {
    /// Bounded text (CHAR, VARCHAR, TINYTEXT)
    ShortText {
        /// Maximum number of characters
        max_length: u32,
    },

    /// Unbounded text (TEXT, MEDIUMTEXT, LONGTEXT)
    LongText,

    /// Integer with the storage range of the declared type
    Integer {
        /// Smallest storable value
        min: i64,
        /// Largest storable value
        max: i64,
    },

    /// Floating point (FLOAT, DOUBLE, REAL)
    Float,

    /// Fixed-point decimal
    Decimal {
        /// Digits before the decimal point
        left_digits: u8,
        /// Digits after the decimal point
        right_digits: u8,
    },

    /// Calendar date
    Date,

    /// Time of day
    Time,

    /// Date and time without timezone (DATETIME, TIMESTAMP)
    DateTime,

    /// Four-digit year
    Year,

    /// Boolean (BOOL, BOOLEAN, TINYINT(1))
    Bool,

    /// One of a fixed list of labels
    Enumerated {
        /// Allowed labels
        options: Vec<String>,
    },

    /// Binary data (BINARY, VARBINARY, BLOB variants)
    Binary {
        /// Maximum byte length, when the type is bounded
        max_length: Option<u32>,
    },

    /// Declared type the generator cannot fill; the column is omitted
    Unsupported {
        /// Declared type name as reported by the provider
        declared: String,
    },
}

impl TypeCategory {
    /// Maximum length for bounded text and binary categories.
    pub fn max_length(&self) -> Option<u32> {
        match self {
            Self::ShortText { max_length } => Some(*max_length),
            Self::Binary { max_length } => *max_length,
            _ => None,
        }
    }

    /// Whether values of this category are produced at all.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShortText { .. } => "short_text",
            Self::LongText => "long_text",
            Self::Integer { .. } => "integer",
            Self::Float => "float",
            Self::Decimal { .. } => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::Year => "year",
            Self::Bool => "bool",
            Self::Enumerated { .. } => "enumerated",
            Self::Binary { .. } => "binary",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

/// Canonical description of one column, produced by the schema normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,

    /// Resolved value category
    #[serde(rename = "type")]
    pub category: TypeCategory,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub nullable: bool,

    /// Whether the column is part of the primary key
    #[serde(default)]
    pub is_primary_key: bool,

    /// Whether the column participates in a uniqueness constraint
    #[serde(default)]
    pub is_unique: bool,

    /// Whether the database assigns the value (auto-increment / identity)
    #[serde(default)]
    pub is_generated: bool,
}

impl ColumnSpec {
    /// Create a non-nullable, unconstrained column.
    pub fn new(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            name: name.into(),
            category,
            nullable: false,
            is_primary_key: false,
            is_unique: false,
            is_generated: false,
        }
    }

    /// Mark the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the column as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark the column unique.
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Mark the column as database-generated.
    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    /// Maximum length for bounded text and binary columns.
    pub fn max_length(&self) -> Option<u32> {
        self.category.max_length()
    }

    /// Whether the column needs a uniqueness set during a batch.
    pub fn tracks_uniqueness(&self) -> bool {
        self.is_unique && !self.is_generated && self.category.is_supported()
    }

    /// Whether a null may be emitted for this column.
    ///
    /// Keys, unique and generated columns never receive nulls.
    pub fn accepts_generated_null(&self) -> bool {
        self.nullable && !self.is_primary_key && !self.is_unique && !self.is_generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length_only_for_bounded_categories() {
        assert_eq!(
            TypeCategory::ShortText { max_length: 12 }.max_length(),
            Some(12)
        );
        assert_eq!(
            TypeCategory::Binary {
                max_length: Some(4)
            }
            .max_length(),
            Some(4)
        );
        assert_eq!(TypeCategory::Binary { max_length: None }.max_length(), None);
        assert_eq!(TypeCategory::LongText.max_length(), None);
        assert_eq!(TypeCategory::Integer { min: 0, max: 9 }.max_length(), None);
    }

    #[test]
    fn test_uniqueness_tracking_excludes_generated() {
        let col = ColumnSpec::new("id", TypeCategory::Integer { min: 0, max: 100 })
            .unique()
            .generated();
        assert!(!col.tracks_uniqueness());

        let col = ColumnSpec::new("code", TypeCategory::ShortText { max_length: 5 }).unique();
        assert!(col.tracks_uniqueness());

        let col = ColumnSpec::new(
            "shape",
            TypeCategory::Unsupported {
                declared: "GEOMETRY".to_string(),
            },
        )
        .unique();
        assert!(!col.tracks_uniqueness());
    }

    #[test]
    fn test_null_never_emitted_for_keys() {
        let col = ColumnSpec::new("note", TypeCategory::LongText).nullable();
        assert!(col.accepts_generated_null());

        let col = ColumnSpec::new("note", TypeCategory::LongText)
            .nullable()
            .unique();
        assert!(!col.accepts_generated_null());

        let col = ColumnSpec::new("id", TypeCategory::Integer { min: 0, max: 9 })
            .nullable()
            .primary_key();
        assert!(!col.accepts_generated_null());
    }

    #[test]
    fn test_column_spec_serde() {
        let col = ColumnSpec::new(
            "status",
            TypeCategory::Enumerated {
                options: vec!["open".to_string(), "closed".to_string()],
            },
        );

        let yaml = serde_yaml::to_string(&col).unwrap();
        let parsed: ColumnSpec = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, col);
        assert!(yaml.contains("type: enumerated"));
    }
}
