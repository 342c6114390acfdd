//! Per-table job state machine.

use super::RunSettings;
use fill_core::{
    FillError, GenerationJob, Operation, RecordSink, SchemaError, SchemaProvider, Session,
    TableSchema,
};
use fill_generator::{BatchBuilder, BatchTermination, ExistingState, GenerationPolicy, IdentityStart};
use std::fmt;
use std::io::Write;
use tracing::{debug, error, info, warn};

/// States a table passes through during one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Pending,
    Cleared,
    Generated,
    Inserted,
    Reported,
    Done,
    Skipped,
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableState::Pending => "pending",
            TableState::Cleared => "cleared",
            TableState::Generated => "generated",
            TableState::Inserted => "inserted",
            TableState::Reported => "reported",
            TableState::Done => "done",
            TableState::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// How a table job ended.
#[derive(Debug)]
pub enum TableOutcome {
    /// Reached `Done`
    Done,
    /// Table absent from the live schema; nothing was touched
    Skipped(String),
    /// A step failed; the table was abandoned after the last recorded state
    Failed(FillError),
}

/// What happened to one table.
#[derive(Debug)]
pub struct TableReport {
    pub table: String,
    pub operation: Operation,
    /// States visited, in order
    pub states: Vec<TableState>,
    pub requested: u64,
    pub generated: usize,
    pub inserted: usize,
    pub rejected: usize,
    /// Why generation stopped; `None` when nothing was generated
    pub termination: Option<BatchTermination>,
    pub outcome: TableOutcome,
}

impl TableReport {
    fn new(job: &GenerationJob) -> Self {
        Self {
            table: job.table_name.clone(),
            operation: job.operation,
            states: vec![TableState::Pending],
            requested: job.requested_count,
            generated: 0,
            inserted: 0,
            rejected: 0,
            termination: None,
            outcome: TableOutcome::Done,
        }
    }

    fn enter(&mut self, state: TableState) {
        self.states.push(state);
    }

    fn skip(mut self, reason: impl Into<String>) -> Self {
        self.enter(TableState::Skipped);
        self.outcome = TableOutcome::Skipped(reason.into());
        self
    }

    fn fail(mut self, err: FillError) -> Self {
        self.outcome = TableOutcome::Failed(err);
        self
    }

    /// Last state reached.
    pub fn final_state(&self) -> TableState {
        self.states.last().copied().unwrap_or(TableState::Pending)
    }

    pub fn is_done(&self) -> bool {
        matches!(self.outcome, TableOutcome::Done)
    }
}

/// Run one table job against an open session.
///
/// `live_tables` is the table list read from the database; a job for any
/// other table is skipped. Errors never escape: they end up in the report.
pub async fn run_table<W: Write + ?Sized>(
    session: &mut dyn Session,
    database: &str,
    job: &GenerationJob,
    live_tables: &[String],
    settings: &RunSettings,
    out: &mut W,
) -> TableReport {
    let table = job.table_name.as_str();
    let report = TableReport::new(job);

    if !live_tables.iter().any(|t| t == table) {
        warn!("{database}.{table}: table does not exist, skipping");
        return report.skip("table does not exist in the database");
    }

    info!("{database}.{table}: {} ({} records)", job.operation, job.requested_count);

    let result = match job.operation {
        Operation::InspectOnly => inspect(session, database, table, settings, out, report).await,
        Operation::ClearAndFill | Operation::Append => {
            fill(session, database, job, &settings.policy, report).await
        }
    };

    match result {
        Ok(report) => report,
        Err((report, err)) => {
            error!("{database}.{table}: {err}");
            report.fail(err)
        }
    }
}

type StepResult = Result<TableReport, (TableReport, FillError)>;

async fn inspect<W: Write + ?Sized>(
    session: &mut dyn Session,
    database: &str,
    table: &str,
    settings: &RunSettings,
    out: &mut W,
    mut report: TableReport,
) -> StepResult {
    let page_size = settings.inspect_page_size.max(1);
    let write_err = |e: std::io::Error| FillError::sink(table, e);

    if let Err(e) = writeln!(out, "== {database}.{table} ==") {
        return Err((report, write_err(e)));
    }

    let mut offset = 0u64;
    let mut total = 0u64;
    loop {
        let rows = match session.read_records(table, offset, page_size).await {
            Ok(rows) => rows,
            Err(e) => return Err((report, e)),
        };

        if offset == 0 {
            if let Some(first) = rows.first() {
                let header = first.columns().collect::<Vec<_>>().join(", ");
                if let Err(e) = writeln!(out, "({header})") {
                    return Err((report, write_err(e)));
                }
            }
        }
        for row in &rows {
            if let Err(e) = writeln!(out, "{row}") {
                return Err((report, write_err(e)));
            }
        }

        total += rows.len() as u64;
        if (rows.len() as u64) < page_size {
            break;
        }
        offset += page_size;
    }

    info!("{database}.{table}: {total} rows");
    report.enter(TableState::Reported);
    report.enter(TableState::Done);
    Ok(report)
}

async fn fill(
    session: &mut dyn Session,
    database: &str,
    job: &GenerationJob,
    policy: &GenerationPolicy,
    mut report: TableReport,
) -> StepResult {
    let table = job.table_name.as_str();

    let raw = match session.describe_table(table).await {
        Ok(raw) => raw,
        Err(e) => return Err((report, e)),
    };
    let schema = match TableSchema::from_raw(raw) {
        Ok(schema) => schema,
        Err(SchemaError::TableNotFound(_)) => {
            warn!("{database}.{table}: no columns found, skipping");
            return Ok(report.skip("table not found in the live schema"));
        }
        Err(e) => return Err((report, e.into())),
    };

    let existing = if job.operation == Operation::ClearAndFill {
        if let Err(e) = session.clear_table(table).await {
            return Err((report, e));
        }
        info!("{database}.{table}: cleared");
        report.enter(TableState::Cleared);
        ExistingState::empty()
    } else {
        match load_existing_state(session, &schema, policy).await {
            Ok(existing) => existing,
            Err(e) => return Err((report, e)),
        }
    };

    let requested = usize::try_from(job.requested_count).unwrap_or(usize::MAX);
    let batch = BatchBuilder::new(&schema, policy).build(requested, &existing);
    report.generated = batch.len();
    if batch.termination.is_truncated() {
        warn!(
            "{database}.{table}: generated {} of {} records, {}",
            batch.len(),
            job.requested_count,
            batch.termination.describe()
        );
    }
    report.termination = Some(batch.termination);
    report.enter(TableState::Generated);

    if batch.records.is_empty() {
        info!("{database}.{table}: no data to insert");
    }

    for record in &batch.records {
        match session.insert_record(table, record).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                error!("{database}.{table}: skipping record {record}: {e}");
                report.rejected += 1;
            }
        }
    }
    report.enter(TableState::Inserted);

    info!(
        "{database}.{table}: inserted {} of {} generated records ({} rejected)",
        report.inserted, report.generated, report.rejected
    );
    report.enter(TableState::Reported);
    report.enter(TableState::Done);
    Ok(report)
}

/// Pre-load unique values and identity maxima for an append.
async fn load_existing_state(
    session: &mut dyn Session,
    schema: &TableSchema,
    policy: &GenerationPolicy,
) -> Result<ExistingState, FillError> {
    let mut existing = ExistingState::empty();

    for column in schema.unique_columns() {
        let values = session.distinct_values(&schema.name, column).await?;
        debug!(
            "{}.{}: {} existing values",
            schema.name,
            column.name,
            values.len()
        );
        existing = existing.with_unique_values(column.name.clone(), values);
    }

    if policy.emit_identity && policy.identity_start == IdentityStart::ResumeAfterMax {
        for column in schema.generated_columns() {
            if let Some(max) = session.max_value(&schema.name, &column.name).await? {
                existing = existing.with_identity_max(column.name.clone(), max);
            }
        }
    }

    Ok(existing)
}
