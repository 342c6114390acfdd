//! A live MySQL connection acting as schema provider and record sink.

use crate::convert::{from_mysql_value, generic_value, to_mysql_value};
use crate::error::MySqlError;
use crate::schema;
use async_trait::async_trait;
use fill_core::{
    ColumnSpec, DummyRecord, FieldValue, FillError, RawTableMetadata, RecordSink, SchemaProvider,
    Session, TypeCategory,
};
use mysql_async::prelude::*;
use mysql_async::{Conn, Params, Row, Value};
use tracing::debug;

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-row INSERT statement for the columns of a record.
pub fn insert_statement(table: &str, record: &DummyRecord) -> String {
    let columns: Vec<String> = record.columns().map(quote_identifier).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// One connection, reused for every step on its database until closed.
pub struct MySqlSession {
    conn: Option<Conn>,
}

impl MySqlSession {
    pub fn new(conn: Conn) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> Result<&mut Conn, MySqlError> {
        self.conn.as_mut().ok_or(MySqlError::Closed)
    }
}

#[async_trait]
impl SchemaProvider for MySqlSession {
    async fn table_names(&mut self) -> Result<Vec<String>, FillError> {
        let conn = self.conn().map_err(|e| FillError::sink("information_schema.tables", e))?;
        schema::list_tables(conn)
            .await
            .map_err(|e| FillError::sink("information_schema.tables", e))
    }

    async fn describe_table(&mut self, table: &str) -> Result<RawTableMetadata, FillError> {
        let conn = self.conn().map_err(|e| FillError::sink(table, e))?;
        schema::describe_table(conn, table)
            .await
            .map_err(|e| FillError::sink(table, e))
    }
}

#[async_trait]
impl RecordSink for MySqlSession {
    async fn clear_table(&mut self, table: &str) -> Result<(), FillError> {
        let sql = format!("TRUNCATE TABLE {}", quote_identifier(table));
        let conn = self.conn().map_err(|e| FillError::sink(table, e))?;
        conn.query_drop(sql)
            .await
            .map_err(|e| FillError::sink(table, e))
    }

    async fn distinct_values(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<Vec<FieldValue>, FillError> {
        let quoted = quote_identifier(&column.name);
        let sql = format!(
            "SELECT DISTINCT {quoted} FROM {} WHERE {quoted} IS NOT NULL",
            quote_identifier(table)
        );
        let conn = self.conn().map_err(|e| FillError::sink(table, e))?;
        let values: Vec<Value> = conn
            .query(sql)
            .await
            .map_err(|e| FillError::sink(table, e))?;

        debug!(
            "Loaded {} existing values for {table}.{}",
            values.len(),
            column.name
        );
        values
            .into_iter()
            .map(|v| from_mysql_value(v, &column.category))
            .collect::<Result<_, _>>()
            .map_err(|e| FillError::sink(table, format!("column '{}': {e}", column.name)))
    }

    async fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, FillError> {
        let sql = format!(
            "SELECT MAX({}) FROM {}",
            quote_identifier(column),
            quote_identifier(table)
        );
        let conn = self.conn().map_err(|e| FillError::sink(table, e))?;
        let value: Option<Value> = conn
            .query_first(sql)
            .await
            .map_err(|e| FillError::sink(table, e))?;

        let category = TypeCategory::Integer {
            min: i64::MIN,
            max: i64::MAX,
        };
        match value.map(|v| from_mysql_value(v, &category)) {
            None | Some(Ok(FieldValue::Null)) => Ok(None),
            Some(Ok(v)) => Ok(v.as_i64()),
            Some(Err(e)) => Err(FillError::sink(table, format!("column '{column}': {e}"))),
        }
    }

    async fn insert_record(&mut self, table: &str, record: &DummyRecord) -> Result<(), FillError> {
        let sql = insert_statement(table, record);
        let params: Vec<Value> = record.values().map(to_mysql_value).collect();
        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(params)
        };

        let conn = self.conn().map_err(|e| FillError::insertion(table, e))?;
        conn.exec_drop(sql, params)
            .await
            .map_err(|e| FillError::insertion(table, e))
    }

    async fn read_records(
        &mut self,
        table: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DummyRecord>, FillError> {
        let sql = format!("SELECT * FROM {} LIMIT ? OFFSET ?", quote_identifier(table));
        let conn = self.conn().map_err(|e| FillError::sink(table, e))?;
        let rows: Vec<Row> = conn
            .exec(sql, (limit, offset))
            .await
            .map_err(|e| FillError::sink(table, e))?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

#[async_trait]
impl Session for MySqlSession {
    async fn close(&mut self) -> Result<(), FillError> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| FillError::connection("mysql", e))?;
        }
        Ok(())
    }
}

fn row_to_record(mut row: Row) -> DummyRecord {
    let names: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();

    let mut record = DummyRecord::new();
    for (index, name) in names.into_iter().enumerate() {
        let value = row.take::<Value, _>(index).unwrap_or(Value::NULL);
        record.set(name, generic_value(value));
    }
    record
}
