//! MySQL schema introspection through INFORMATION_SCHEMA.
//!
//! Columns, primary keys and unique constraints come from the generic
//! INFORMATION_SCHEMA views. Auto-increment columns need a separate query
//! against `COLUMNS.EXTRA`, which is MySQL specific.

use crate::error::MySqlError;
use fill_core::{RawColumn, RawTableMetadata};
use mysql_async::prelude::*;
use mysql_async::{Conn, Row};

const TABLES_QUERY: &str = "
    SELECT TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME";

const COLUMNS_QUERY: &str = "
    SELECT COLUMN_NAME, DATA_TYPE, COLUMN_TYPE, IS_NULLABLE,
           CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION";

const PRIMARY_KEY_QUERY: &str = "
    SELECT COLUMN_NAME
    FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
    WHERE CONSTRAINT_NAME = 'PRIMARY'
        AND TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION";

const UNIQUE_QUERY: &str = "
    SELECT k.COLUMN_NAME
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS t
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k
        ON t.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
        AND t.TABLE_NAME = k.TABLE_NAME
        AND t.CONSTRAINT_NAME = k.CONSTRAINT_NAME
    WHERE t.CONSTRAINT_TYPE = 'UNIQUE'
        AND t.TABLE_SCHEMA = DATABASE()
        AND t.TABLE_NAME = ?";

const AUTO_INCREMENT_QUERY: &str = "
    SELECT COLUMN_NAME
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        AND EXTRA LIKE '%auto_increment%'";

/// Names of all base tables in the current database.
pub async fn list_tables(conn: &mut Conn) -> Result<Vec<String>, MySqlError> {
    let rows: Vec<Row> = conn.query(TABLES_QUERY).await?;
    rows.into_iter()
        .map(|row| {
            row.get::<String, _>(0)
                .ok_or(MySqlError::MissingField("table name"))
        })
        .collect()
}

/// Raw metadata for one table. A missing table yields no columns.
pub async fn describe_table(conn: &mut Conn, table: &str) -> Result<RawTableMetadata, MySqlError> {
    let mut metadata = RawTableMetadata::new(table);

    let column_rows: Vec<Row> = conn.exec(COLUMNS_QUERY, (table,)).await?;
    for row in column_rows {
        metadata = metadata.with_column(raw_column_from_row(&row)?);
    }

    metadata = metadata
        .with_primary_key(column_names(conn, PRIMARY_KEY_QUERY, table).await?)
        .with_unique_columns(column_names(conn, UNIQUE_QUERY, table).await?)
        .with_generated_columns(column_names(conn, AUTO_INCREMENT_QUERY, table).await?);

    Ok(metadata)
}

async fn column_names(conn: &mut Conn, query: &str, table: &str) -> Result<Vec<String>, MySqlError> {
    let rows: Vec<Row> = conn.exec(query, (table,)).await?;
    rows.into_iter()
        .map(|row| {
            row.get::<String, _>(0)
                .ok_or(MySqlError::MissingField("column name"))
        })
        .collect()
}

fn raw_column_from_row(row: &Row) -> Result<RawColumn, MySqlError> {
    let name: String = row.get(0).ok_or(MySqlError::MissingField("column name"))?;
    let data_type: String = row.get(1).ok_or(MySqlError::MissingField("data type"))?;
    let column_type: String = row.get(2).ok_or(MySqlError::MissingField("column type"))?;
    let is_nullable: String = row.get(3).ok_or(MySqlError::MissingField("nullability"))?;
    let char_length: Option<u64> = row.get::<Option<u64>, _>(4).unwrap_or(None);
    let precision: Option<u64> = row.get::<Option<u64>, _>(5).unwrap_or(None);
    let scale: Option<u64> = row.get::<Option<u64>, _>(6).unwrap_or(None);

    Ok(raw_column(
        &name,
        &data_type,
        &column_type,
        is_nullable.eq_ignore_ascii_case("YES"),
        char_length,
        precision,
        scale,
    ))
}

/// Build a raw column from the INFORMATION_SCHEMA.COLUMNS fields.
///
/// `TINYINT(1)` is reported as `BOOLEAN`, which is how MySQL stores
/// `BOOL` columns.
pub fn raw_column(
    name: &str,
    data_type: &str,
    column_type: &str,
    nullable: bool,
    char_length: Option<u64>,
    precision: Option<u64>,
    scale: Option<u64>,
) -> RawColumn {
    let column_type_lower = column_type.to_lowercase();
    let data_type_upper = data_type.to_uppercase();

    let declared = if data_type_upper == "TINYINT" && column_type_lower.starts_with("tinyint(1)") {
        "BOOLEAN".to_string()
    } else {
        data_type_upper
    };

    let mut column = RawColumn::new(name, declared.as_str());

    match declared.as_str() {
        "CHAR" | "VARCHAR" | "TINYTEXT" | "BINARY" | "VARBINARY" => {
            let length = char_length.or_else(|| extract_length_from_column_type(&column_type_lower));
            if let Some(length) = length {
                column = column.with_length(length.min(u32::MAX as u64) as u32);
            }
        }
        "DECIMAL" | "NUMERIC" => {
            let precision = precision.unwrap_or(10).min(u32::MAX as u64) as u32;
            let scale = scale.unwrap_or(0).min(u32::MAX as u64) as u32;
            column = column.with_precision(precision, scale);
        }
        "ENUM" => {
            column = column.with_enum_values(parse_enum_values(column_type));
        }
        _ => {}
    }

    if column_type_lower.contains("unsigned") {
        column = column.unsigned();
    }
    if nullable {
        column = column.nullable();
    }
    column
}

fn extract_length_from_column_type(column_type: &str) -> Option<u64> {
    let start = column_type.find('(')?;
    let end = column_type.find(')')?;
    if start >= end {
        return None;
    }
    let inner = &column_type[start + 1..end];
    inner.split(',').next()?.trim().parse().ok()
}

/// Parse the options of an `enum('a','b')` column type.
///
/// Quotes inside an option are doubled (`'it''s'`) or backslash-escaped.
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let Some(start) = column_type.find('(') else {
        return Vec::new();
    };
    let Some(end) = column_type.rfind(')') else {
        return Vec::new();
    };
    if start >= end {
        return Vec::new();
    }

    let mut values = Vec::new();
    let mut chars = column_type[start + 1..end].chars().peekable();
    let mut current = String::new();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if !in_quotes {
            if c == '\'' {
                in_quotes = true;
                current.clear();
            }
            continue;
        }
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                current.push('\'');
            }
            '\'' => {
                in_quotes = false;
                values.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    values
}
