//! MySQL schema provider and record sink for dummy-fill.
//!
//! [`MySqlConnector`] opens a [`MySqlSession`] per database. The session
//! introspects tables through INFORMATION_SCHEMA and acts as the record sink:
//! `TRUNCATE TABLE` for clearing, `SELECT DISTINCT` / `SELECT MAX` for
//! pre-loading, one parameterized `INSERT` per record, and paged
//! `SELECT *` for inspection.

pub mod connect;
pub mod convert;
pub mod error;
pub mod schema;
pub mod session;

pub use connect::{ConnectionSettings, MySqlConnector};
pub use error::MySqlError;
pub use session::{quote_identifier, MySqlSession};
