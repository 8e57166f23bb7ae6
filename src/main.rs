use std::path::PathBuf;

use clap::Parser;
use log::error;

use dbload::{
    batch::{BatchReport, BatchRunner, FailurePolicy},
    common::{delete_all_files_by_glob, DbLoadError, Error},
    config::{Backend, Config},
    generator::ValueGenerator,
    invoker::{Invoker, PrintInvoker, ProcessInvoker, SqliteInvoker},
    schema::TableSchema,
};

#[derive(Parser, Debug)]
#[command(name = "dbload")]
#[command(about = "Drive a command-line database with a synthetic create/insert/select batch")]
struct Args {
    /// JSON config file, flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Collaborator executable, invoked once per statement
    #[arg(short, long)]
    executable: Option<PathBuf>,

    /// Leading argument passed before the statement (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Backend: process, sqlite, print
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Number of rows to insert
    #[arg(short, long)]
    rows: Option<u32>,

    /// Random seed for reproducible rows
    #[arg(long)]
    seed: Option<u64>,

    /// Chance of NULL for nullable columns
    #[arg(long)]
    null_probability: Option<f64>,

    /// JSON table schema replacing the built-in users table
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Delete files matching this glob before the run
    #[arg(long)]
    clean: Option<String>,

    /// Issue the whole batch even when statements fail
    #[arg(long)]
    keep_going: bool,

    /// SQLite database path for the sqlite backend
    #[arg(long)]
    sqlite_path: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(executable) = self.executable {
            config.executable = executable;
        }
        if !self.args.is_empty() {
            config.executable_args = self.args;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(null_probability) = self.null_probability {
            config.null_probability = null_probability;
        }
        if self.schema.is_some() {
            config.schema = self.schema;
        }
        if self.clean.is_some() {
            config.clean_glob = self.clean;
        }
        if self.keep_going {
            config.on_failure = FailurePolicy::Continue;
        }
        if let Some(sqlite_path) = self.sqlite_path {
            config.sqlite_path = sqlite_path;
        }

        Ok(config)
    }
}

fn run_batch<I: Invoker>(
    schema: &TableSchema,
    invoker: &mut I,
    config: &Config,
) -> Result<BatchReport, Error> {
    let generator = ValueGenerator::new(config.seed, config.null_probability);
    BatchRunner::new(schema, invoker, generator, config.on_failure).run(config.rows)
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    config.validate()?;

    if let Some(pattern) = &config.clean_glob {
        delete_all_files_by_glob(pattern)?;
    }

    let schema = config.load_schema()?;

    let result = match config.backend {
        Backend::Process => {
            let mut invoker =
                ProcessInvoker::new(config.executable.clone(), config.executable_args.clone());
            run_batch(&schema, &mut invoker, &config)
        }
        Backend::Sqlite => {
            let mut invoker = SqliteInvoker::open(&config.sqlite_path)?;
            run_batch(&schema, &mut invoker, &config)
        }
        Backend::Print => {
            let mut invoker = PrintInvoker::new(std::io::stdout().lock());
            run_batch(&schema, &mut invoker, &config)
        }
    };

    match result {
        Ok(report) if report.failures.is_empty() => Ok(()),
        Ok(report) => Err(DbLoadError::BatchFailed(report.failures.len()).into()),
        Err(err) => {
            // Surface the collaborator's own exit code.
            if let Some(DbLoadError::InvocationFailed {
                exit_code: Some(code),
                ..
            }) = err.downcast_ref::<DbLoadError>()
            {
                error!("{err}");
                std::process::exit(*code);
            }
            Err(err)
        }
    }
}
