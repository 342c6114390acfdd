//! Conversions between [`FieldValue`] and `mysql_async::Value`.
//!
//! Reading is guided by the column's [`TypeCategory`] so that values
//! pre-loaded from a table compare equal to the values the generator would
//! produce for the same column.

use crate::error::MySqlError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use fill_core::{FieldValue, TypeCategory};
use mysql_async::Value;

/// Convert a generated value into a query parameter.
pub fn to_mysql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::NULL,
        FieldValue::Bool(b) => Value::Int(i64::from(*b)),
        FieldValue::Int(i) => Value::Int(*i),
        FieldValue::Float(f) => Value::Double(*f),
        FieldValue::Decimal(s) | FieldValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        FieldValue::Bytes(b) => Value::Bytes(b.clone()),
        FieldValue::Date(d) => Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0),
        FieldValue::Time(t) => Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            0,
        ),
        FieldValue::DateTime(dt) => Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            0,
        ),
        FieldValue::Year(y) => Value::Int(i64::from(*y)),
    }
}

/// Convert a stored value for a column of the given category.
pub fn from_mysql_value(value: Value, category: &TypeCategory) -> Result<FieldValue, MySqlError> {
    if matches!(value, Value::NULL) {
        return Ok(FieldValue::Null);
    }

    match category {
        TypeCategory::ShortText { .. } | TypeCategory::LongText | TypeCategory::Enumerated { .. } => {
            Ok(FieldValue::Text(extract_string(&value)?))
        }
        TypeCategory::Integer { .. } => Ok(FieldValue::Int(extract_int(&value)?)),
        TypeCategory::Float => Ok(FieldValue::Float(extract_float(&value)?)),
        TypeCategory::Decimal { .. } => Ok(FieldValue::Decimal(extract_string(&value)?)),
        TypeCategory::Bool => Ok(FieldValue::Bool(extract_int(&value)? != 0)),
        TypeCategory::Binary { .. } => Ok(FieldValue::Bytes(extract_bytes(&value)?)),
        TypeCategory::Date => Ok(FieldValue::Date(extract_date(&value)?)),
        TypeCategory::Time => Ok(FieldValue::Time(extract_time(&value)?)),
        TypeCategory::DateTime => Ok(FieldValue::DateTime(extract_datetime(&value)?)),
        TypeCategory::Year => {
            let year = extract_int(&value)?;
            i32::try_from(year)
                .map(FieldValue::Year)
                .map_err(|_| MySqlError::InvalidDateTime(year.to_string()))
        }
        TypeCategory::Unsupported { .. } => Ok(generic_value(value)),
    }
}

/// Best-effort conversion without column metadata, used for inspection.
pub fn generic_value(value: Value) -> FieldValue {
    match value {
        Value::NULL => FieldValue::Null,
        Value::Int(i) => FieldValue::Int(i),
        Value::UInt(u) => match i64::try_from(u) {
            Ok(i) => FieldValue::Int(i),
            Err(_) => FieldValue::Decimal(u.to_string()),
        },
        Value::Float(f) => FieldValue::Float(f as f64),
        Value::Double(d) => FieldValue::Float(d),
        Value::Bytes(b) => match String::from_utf8(b) {
            Ok(s) => FieldValue::Text(s),
            Err(e) => FieldValue::Bytes(e.into_bytes()),
        },
        Value::Date(..) => match extract_datetime(&value) {
            Ok(dt) if dt.time() == NaiveTime::MIN => FieldValue::Date(dt.date()),
            Ok(dt) => FieldValue::DateTime(dt),
            Err(_) => FieldValue::Text(value.as_sql(true)),
        },
        Value::Time(..) => match extract_time(&value) {
            Ok(t) => FieldValue::Time(t),
            Err(_) => FieldValue::Text(value.as_sql(true)),
        },
    }
}

fn mismatch(expected: &'static str, value: &Value) -> MySqlError {
    MySqlError::TypeMismatch {
        expected,
        actual: value.clone(),
    }
}

fn extract_int(value: &Value) -> Result<i64, MySqlError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::UInt(u) => i64::try_from(*u).map_err(|_| mismatch("integer", value)),
        Value::Bytes(b) => {
            let s = String::from_utf8(b.clone())?;
            s.trim().parse().map_err(|_| mismatch("integer", value))
        }
        _ => Err(mismatch("integer", value)),
    }
}

fn extract_float(value: &Value) -> Result<f64, MySqlError> {
    match value {
        Value::Float(f) => Ok(*f as f64),
        Value::Double(d) => Ok(*d),
        Value::Int(i) => Ok(*i as f64),
        Value::UInt(u) => Ok(*u as f64),
        Value::Bytes(b) => {
            let s = String::from_utf8(b.clone())?;
            s.trim().parse().map_err(|_| mismatch("float", value))
        }
        _ => Err(mismatch("float", value)),
    }
}

fn extract_string(value: &Value) -> Result<String, MySqlError> {
    match value {
        Value::Bytes(b) => Ok(String::from_utf8(b.clone())?),
        Value::Int(i) => Ok(i.to_string()),
        Value::UInt(u) => Ok(u.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Double(d) => Ok(d.to_string()),
        _ => Err(mismatch("string", value)),
    }
}

fn extract_bytes(value: &Value) -> Result<Vec<u8>, MySqlError> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        _ => Err(mismatch("bytes", value)),
    }
}

fn extract_date(value: &Value) -> Result<NaiveDate, MySqlError> {
    match value {
        Value::Date(year, month, day, _, _, _, _) => {
            NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32)
                .ok_or_else(|| MySqlError::InvalidDateTime(format!("{year}-{month}-{day}")))
        }
        Value::Bytes(b) => {
            let s = String::from_utf8(b.clone())?;
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| MySqlError::InvalidDateTime(s))
        }
        _ => Err(mismatch("date", value)),
    }
}

fn extract_time(value: &Value) -> Result<NaiveTime, MySqlError> {
    match value {
        Value::Time(false, 0, hour, min, sec, micro) => {
            NaiveTime::from_hms_micro_opt(*hour as u32, *min as u32, *sec as u32, *micro)
                .ok_or_else(|| MySqlError::InvalidDateTime(format!("{hour}:{min}:{sec}")))
        }
        Value::Bytes(b) => {
            let s = String::from_utf8(b.clone())?;
            NaiveTime::parse_from_str(&s, "%H:%M:%S").map_err(|_| MySqlError::InvalidDateTime(s))
        }
        _ => Err(mismatch("time of day", value)),
    }
}

fn extract_datetime(value: &Value) -> Result<NaiveDateTime, MySqlError> {
    match value {
        Value::Date(year, month, day, hour, min, sec, micro) => {
            let invalid = || MySqlError::InvalidDateTime(format!("{year}-{month}-{day}"));
            let date = NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32)
                .ok_or_else(invalid)?;
            let time =
                NaiveTime::from_hms_micro_opt(*hour as u32, *min as u32, *sec as u32, *micro)
                    .ok_or_else(invalid)?;
            Ok(NaiveDateTime::new(date, time))
        }
        Value::Bytes(b) => {
            let s = String::from_utf8(b.clone())?;
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|_| MySqlError::InvalidDateTime(s))
        }
        _ => Err(mismatch("datetime", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_values_read_back_equal() {
        let date = NaiveDate::from_ymd_opt(2001, 2, 3).unwrap();
        let time = NaiveTime::from_hms_opt(4, 5, 6).unwrap();
        let cases = [
            (FieldValue::Int(42), TypeCategory::Integer { min: 0, max: 100 }),
            (FieldValue::Bool(true), TypeCategory::Bool),
            (FieldValue::Text("abc".into()), TypeCategory::ShortText { max_length: 5 }),
            (
                FieldValue::Decimal("12.30".into()),
                TypeCategory::Decimal {
                    left_digits: 2,
                    right_digits: 2,
                },
            ),
            (FieldValue::Date(date), TypeCategory::Date),
            (FieldValue::Time(time), TypeCategory::Time),
            (
                FieldValue::DateTime(NaiveDateTime::new(date, time)),
                TypeCategory::DateTime,
            ),
            (FieldValue::Year(1999), TypeCategory::Year),
            (FieldValue::Bytes(vec![0, 1, 255]), TypeCategory::Binary { max_length: None }),
        ];

        for (value, category) in cases {
            let stored = to_mysql_value(&value);
            assert_eq!(from_mysql_value(stored, &category).unwrap(), value);
        }
    }

    #[test]
    fn test_text_protocol_values() {
        let int = from_mysql_value(
            Value::Bytes(b"17".to_vec()),
            &TypeCategory::Integer { min: 0, max: 100 },
        )
        .unwrap();
        assert_eq!(int, FieldValue::Int(17));

        let date = from_mysql_value(Value::Bytes(b"2020-01-31".to_vec()), &TypeCategory::Date).unwrap();
        assert_eq!(date, FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()));

        let flag = from_mysql_value(Value::Bytes(b"0".to_vec()), &TypeCategory::Bool).unwrap();
        assert_eq!(flag, FieldValue::Bool(false));
    }

    #[test]
    fn test_null_and_mismatch() {
        assert_eq!(
            from_mysql_value(Value::NULL, &TypeCategory::Bool).unwrap(),
            FieldValue::Null
        );
        assert!(from_mysql_value(Value::Double(1.5), &TypeCategory::Date).is_err());
        assert!(from_mysql_value(Value::UInt(u64::MAX), &TypeCategory::Integer { min: 0, max: 1 }).is_err());
    }

    #[test]
    fn test_generic_value() {
        assert_eq!(generic_value(Value::Bytes(b"hi".to_vec())), FieldValue::Text("hi".into()));
        assert_eq!(generic_value(Value::Bytes(vec![0xff, 0xfe])), FieldValue::Bytes(vec![0xff, 0xfe]));
        assert_eq!(
            generic_value(Value::Date(2020, 5, 6, 0, 0, 0, 0)),
            FieldValue::Date(NaiveDate::from_ymd_opt(2020, 5, 6).unwrap())
        );
        assert!(matches!(
            generic_value(Value::Date(2020, 5, 6, 7, 8, 9, 0)),
            FieldValue::DateTime(_)
        ));
        assert_eq!(generic_value(Value::UInt(u64::MAX)), FieldValue::Decimal(u64::MAX.to_string()));
    }
}
