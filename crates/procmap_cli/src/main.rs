//! Process map command-line entry point.
//!
//! # Responsibility
//! - Resolve logging, storage and services once at startup and pass them
//!   explicitly to each command.
//! - Print command results as JSON on stdout; diagnostics go to stderr.

use clap::{Parser, Subcommand};
use log::info;
use procmap_core::{
    core_version, default_log_level, init_logging, open_db, open_db_in_memory, seed_demo_data,
    AreaService, DbError, LogTarget, PageRequest, ProcessQuery, ProcessService, RepoError,
    ServiceError, SqliteStore, Store,
};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "procmap",
    version,
    about = "Map business areas and their process hierarchies"
)]
struct Cli {
    /// SQLite database file; an in-memory database is used when omitted
    #[arg(long, env = "PROCMAP_DB", global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PROCMAP_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Write rotated log files to this absolute directory instead of stderr
    #[arg(long, env = "PROCMAP_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed demo areas and processes into an empty store
    Seed,

    /// Print every area with its process count
    Areas,

    /// Print one page of processes nested by parent
    Tree {
        /// Only processes of this area
        #[arg(long)]
        area: Option<Uuid>,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<i64>,

        /// Items per page (1-100)
        #[arg(long)]
        limit: Option<i64>,

        /// Seed demo data first
        #[arg(long)]
        seed: bool,
    },

    /// Print the core library version
    Version,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Areas => "areas",
            Self::Tree { .. } => "tree",
            Self::Version => "version",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err} (status {})", err.status());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Version = cli.command {
        println!("{}", core_version());
        return Ok(());
    }

    let target = match cli.log_dir.as_deref() {
        Some(dir) => LogTarget::directory(dir).map_err(CliError::Logging)?,
        None => LogTarget::Stderr,
    };
    let level = cli.log_level.clone().unwrap_or_else(|| match &target {
        LogTarget::Stderr => "warn".to_string(),
        LogTarget::Directory(_) => default_log_level().to_string(),
    });
    init_logging(&level, target).map_err(CliError::Logging)?;

    let conn = match cli.db.as_ref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let store = SqliteStore::try_new(&conn)?;
    let areas = AreaService::new(store);
    let processes = ProcessService::new(store);
    info!(
        "event=cli_command module=cli status=start command={} persistent={}",
        cli.command.name(),
        cli.db.is_some()
    );

    match cli.command {
        Commands::Seed => {
            let created = seed_demo_data(&store)?;
            print_json(&created)
        }
        Commands::Areas => print_json(&areas.list_areas()?),
        Commands::Tree {
            area,
            page,
            limit,
            seed,
        } => {
            if seed {
                seed_demo_data(&store)?;
            }
            print_tree(&processes, area, PageRequest::new(page, limit))
        }
        Commands::Version => Ok(()),
    }
}

fn print_tree<S: Store>(
    processes: &ProcessService<S>,
    area: Option<Uuid>,
    page: PageRequest,
) -> Result<(), CliError> {
    let mut query = ProcessQuery::default().with_page(page);
    if let Some(area_id) = area {
        query = query.in_area(area_id);
    }
    let tree = processes.list_hierarchical(&query)?;
    print_json(&tree)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{rendered}");
    Ok(())
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    Service(ServiceError),
    Output(serde_json::Error),
}

impl CliError {
    /// HTTP-equivalent status of the failure.
    fn status(&self) -> u16 {
        match self {
            Self::Service(err) => err.kind().http_status(),
            _ => 500,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}
