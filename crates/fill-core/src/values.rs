//! Value representations for generated and inspected records.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell value.
///
/// `FieldValue` is `Eq + Hash` so values can be tracked in uniqueness sets
/// and primary-key tuples. Floats compare by bit pattern, which is exact for
/// the finite values the generator produces.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Fixed-point decimal in its canonical text form (e.g. "12.30")
    Decimal(String),

    /// Text value
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Date and time without timezone
    DateTime(NaiveDateTime),

    /// Four-digit year
    Year(i32),
}

impl FieldValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Year(y) => Some(*y as i64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::Decimal(_) => 4,
            Self::Text(_) => 5,
            Self::Bytes(_) => 6,
            Self::Date(_) => 7,
            Self::Time(_) => 8,
            Self::DateTime(_) => 9,
            Self::Year(_) => 10,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Year(a), Self::Year(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Decimal(s) | Self::Text(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::Date(d) => d.hash(state),
            Self::Time(t) => t.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Year(y) => y.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(s) => write!(f, "{s}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Bytes(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "'{}'", t.format("%H:%M:%S")),
            Self::DateTime(dt) => write!(f, "'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Year(y) => write!(f, "{y}"),
        }
    }
}

/// One generated or inspected row: column values in schema order.
///
/// Columns the sink assigns itself (and unsupported columns) are simply
/// absent from the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyRecord {
    fields: Vec<(String, FieldValue)>,
}

impl DummyRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value, replacing any earlier value for the same column.
    pub fn set(&mut self, column: impl Into<String>, value: FieldValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Builder-style variant of [`DummyRecord::set`].
    pub fn with(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.set(column, value);
        self
    }

    /// Get a column value by name.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    /// Iterate `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no column is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for DummyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_float_equality_and_hash() {
        let mut set = HashSet::new();
        assert!(set.insert(FieldValue::Float(12.34)));
        assert!(!set.insert(FieldValue::Float(12.34)));
        assert!(set.insert(FieldValue::Float(12.35)));
    }

    #[test]
    fn test_variants_never_collide() {
        // "12" as text and 12 as integer are distinct values
        assert_ne!(FieldValue::Text("12".to_string()), FieldValue::Int(12));
        assert_ne!(
            FieldValue::Decimal("1.50".to_string()),
            FieldValue::Text("1.50".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Null.to_string(), "NULL");
        assert_eq!(FieldValue::Text("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(FieldValue::Bytes(vec![0, 255]).to_string(), "0x00ff");
        assert_eq!(FieldValue::Bool(true).to_string(), "1");
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "'2020-02-29'");
        let dt = date.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_string(), "'2020-02-29 13:05:09'");
    }

    #[test]
    fn test_record_preserves_order_and_replaces() {
        let mut record = DummyRecord::new()
            .with("id", FieldValue::Int(1))
            .with("code", FieldValue::Text("ab".to_string()));
        record.set("id", FieldValue::Int(2));

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["id", "code"]);
        assert_eq!(record.get("id"), Some(&FieldValue::Int(2)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.len(), 2);
        assert_eq!(record.to_string(), "(2, 'ab')");
    }
}
