//! Command-line interface for dummy-fill
//!
//! # Usage Examples
//!
//! ## Job files
//! ```bash
//! # Clear and refill two tables of the shop database on every run
//! dummy-fill init-job --server local --database shop --command truncate \
//!   --tables "orders:5000,customers:2000"
//! ```
//!
//! ## Runs
//! ```bash
//! # Every database listed under the server's dbnames
//! DB_PASSWORD=secret dummy-fill run --server local
//!
//! # A subset, reproducibly, skipping rows whose key collides
//! dummy-fill run --server local --databases shop,hr --seed 42 \
//!   --on-key-collision skip
//! ```
//!
//! ## Schema
//! ```bash
//! dummy-fill tables --server local --database shop --describe
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dummy_fill::config::{
    parse_table_counts, Command, ConfigProvider, Engine, FileConfigProvider, JobConfig, ServerEntry,
    DEFAULT_MIN_RECORDS,
};
use dummy_fill::logging::{self, DEFAULT_LOG_FILE};
use dummy_fill::orchestrator::{resolve_databases, DEFAULT_INSPECT_PAGE_SIZE};
use dummy_fill::{DatabaseRunner, RunReport, RunSettings};
use fill_core::{Connector, SchemaProvider, Session, TableSchema};
use fill_generator::{
    CollisionPolicy, GenerationPolicy, IdentityStart, DEFAULT_MAX_UNIQUE_RETRIES,
};
use fill_mysql::{ConnectionSettings, MySqlConnector};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "dummy-fill")]
#[command(about = "A tool for filling relational tables with constraint-aware dummy records")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Append logs to this file as well as stderr
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the job files of one server's databases
    Run {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Databases to process (comma-separated, default: the server's dbnames)
        #[arg(long, value_delimiter = ',')]
        databases: Vec<String>,

        /// Lower bound applied to every requested record count
        #[arg(long, default_value_t = DEFAULT_MIN_RECORDS)]
        min_records: u64,

        /// Rows fetched per query when viewing a table
        #[arg(long, default_value_t = DEFAULT_INSPECT_PAGE_SIZE)]
        inspect_page_size: u64,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Write the job file for one database
    InitJob {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Database the job file applies to
        #[arg(long)]
        database: String,

        /// What the job does to each table
        #[arg(long, value_enum)]
        command: Command,

        /// Tables and record counts (format: "orders:5000,customers:2000")
        #[arg(long)]
        tables: String,
    },

    /// List the tables of one database
    Tables {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Database to list
        #[arg(long)]
        database: String,

        /// Print each table's normalized schema as YAML
        #[arg(long)]
        describe: bool,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Server name from the connection file
    #[arg(long)]
    server: String,

    /// Connection file listing the servers
    #[arg(long, default_value = "connection.yaml")]
    connection_file: PathBuf,

    /// Directory holding <server>/<database>.yaml job files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args)]
struct PolicyArgs {
    /// Base seed (random when omitted; logged so the run can be repeated)
    #[arg(long)]
    seed: Option<u64>,

    /// Where auto-generated identifiers start
    #[arg(long, value_enum, default_value_t = IdentityStartArg::Resume)]
    identity_start: IdentityStartArg,

    /// Start value for auto-generated identifiers
    #[arg(long, default_value_t = 1)]
    identity_start_value: i64,

    /// Leave auto-generated columns for the database to fill
    #[arg(long)]
    no_identity: bool,

    /// What to do when a generated row repeats a primary key
    #[arg(long, value_enum, default_value_t = CollisionArg::Stop)]
    on_key_collision: CollisionArg,

    /// Probability of a null in nullable, unconstrained columns
    #[arg(long, default_value_t = 0.0)]
    null_probability: f64,

    /// Upper bound on draws for one unique value
    #[arg(long, default_value_t = DEFAULT_MAX_UNIQUE_RETRIES)]
    max_unique_retries: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum IdentityStartArg {
    /// Continue after the largest existing value
    Resume,
    /// Always start at --identity-start-value
    Fixed,
}

#[derive(Clone, Copy, ValueEnum)]
enum CollisionArg {
    /// End the batch at the first collision
    Stop,
    /// Drop the colliding row and keep generating
    Skip,
}

impl PolicyArgs {
    fn to_policy(&self) -> GenerationPolicy {
        let identity_start = match self.identity_start {
            IdentityStartArg::Resume => IdentityStart::ResumeAfterMax,
            IdentityStartArg::Fixed => IdentityStart::Fixed,
        };
        let key_collision = match self.on_key_collision {
            CollisionArg::Stop => CollisionPolicy::StopBatch,
            CollisionArg::Skip => CollisionPolicy::SkipRow,
        };
        let mut policy = GenerationPolicy::default()
            .with_seed(self.seed.unwrap_or_else(rand::random))
            .with_identity_start(identity_start, self.identity_start_value)
            .with_key_collision(key_collision)
            .with_null_probability(self.null_probability)
            .with_max_unique_retries(self.max_unique_retries);
        policy.emit_identity = !self.no_identity;
        policy
    }
}

impl ConnectionArgs {
    fn provider(&self) -> FileConfigProvider {
        FileConfigProvider::new(&self.connection_file, &self.config_dir)
    }

    /// Look up the server and build a connector for it.
    fn connector(&self, provider: &FileConfigProvider) -> anyhow::Result<(ServerEntry, MySqlConnector)> {
        let config = provider.connection_config().with_context(|| {
            format!(
                "Failed to load connection file {}",
                self.connection_file.display()
            )
        })?;
        let server = config.server(&self.server)?.clone();

        let connector = match server.engine {
            Engine::Mysql => {
                let settings = ConnectionSettings::new(&server.host, server.port, &server.user)
                    .with_password(self.password.clone());
                info!("Server {}: {}", self.server, settings.redacted_url(None));
                MySqlConnector::new(settings)
            }
        };
        Ok((server, connector))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    logging::init(log_file)?;

    match cli.command {
        Commands::Run {
            conn,
            databases,
            min_records,
            inspect_page_size,
            policy,
        } => {
            let provider = conn.provider();
            let (server, connector) = conn.connector(&provider)?;
            let databases = resolve_databases(&conn.server, &server, &databases)?;

            let policy = policy.to_policy();
            info!("Generation seed: {}", policy.seed);
            let settings = RunSettings::default()
                .with_policy(policy)
                .with_min_records(min_records)
                .with_inspect_page_size(inspect_page_size);

            let runner = DatabaseRunner::new(&connector, &provider, conn.server.as_str(), &settings);
            let mut stdout = std::io::stdout().lock();
            let report = runner
                .run(&databases, &mut stdout)
                .await
                .context("Run aborted")?;
            log_summary(&report);
        }
        Commands::InitJob {
            conn,
            database,
            command,
            tables,
        } => {
            let provider = conn.provider();
            let (_, connector) = conn.connector(&provider)?;

            let mut session = connector
                .connect(Some(&database))
                .await
                .with_context(|| format!("Failed to connect to database {database}"))?;
            let live_tables = session.table_names().await;
            if let Err(e) = session.close().await {
                warn!("Failed to close connection to {database}: {e}");
            }
            let live_tables =
                live_tables.with_context(|| format!("Failed to list tables of {database}"))?;

            let entries = parse_table_counts(&tables);
            let job = JobConfig::from_entries(command, &entries, &live_tables);
            if job.table_names.is_empty() {
                anyhow::bail!("No valid tables given for database {database}");
            }

            let path = provider.write_job_config(&conn.server, &database, &job)?;
            info!(
                "Wrote job file {} ({} tables)",
                path.display(),
                job.table_names.len()
            );
        }
        Commands::Tables {
            conn,
            database,
            describe,
        } => {
            let provider = conn.provider();
            let (_, connector) = conn.connector(&provider)?;

            let mut session = connector
                .connect(Some(&database))
                .await
                .with_context(|| format!("Failed to connect to database {database}"))?;
            let result = print_tables(session.as_mut(), describe).await;
            if let Err(e) = session.close().await {
                warn!("Failed to close connection to {database}: {e}");
            }
            result?;
        }
    }

    Ok(())
}

async fn print_tables(session: &mut dyn Session, describe: bool) -> anyhow::Result<()> {
    let tables = session.table_names().await.context("Failed to list tables")?;
    for table in &tables {
        if !describe {
            println!("{table}");
            continue;
        }
        let raw = session
            .describe_table(table)
            .await
            .with_context(|| format!("Failed to describe table {table}"))?;
        let schema = TableSchema::from_raw(raw)?;
        println!("---\n{}", serde_yaml::to_string(&schema)?);
    }
    Ok(())
}

fn log_summary(report: &RunReport) {
    for db in &report.databases {
        if let Some(err) = &db.error {
            warn!("{}: skipped ({err})", db.database);
            continue;
        }
        for table in &db.tables {
            info!(
                "{}.{}: {} (inserted {}, rejected {})",
                db.database,
                table.table,
                table.final_state(),
                table.inserted,
                table.rejected
            );
        }
    }

    let unfinished = report.unfinished_tables();
    if !unfinished.is_empty() {
        warn!("{} tables did not finish", unfinished.len());
    }
    info!("Run complete: {} records inserted", report.inserted());
}
