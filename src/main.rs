use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use mortgage_ledger::application::ledger::MortgageLedger;
use mortgage_ledger::config::LedgerConfig;
use mortgage_ledger::domain::ports::LedgerStoreBox;
use mortgage_ledger::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use mortgage_ledger::infrastructure::rocksdb::RocksDBLedgerStore;
use mortgage_ledger::interfaces::csv::invocation_reader::InvocationReader;
use mortgage_ledger::interfaces::router::Router;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "MORTGAGE_LEDGER_DB")]
    db_path: Option<PathBuf>,

    /// Times an invocation is re-run after a write conflict.
    #[arg(long, env = "MORTGAGE_LEDGER_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one named operation and print its result.
    Invoke {
        /// Operation name, e.g. createApplication or getMortgage.
        function: String,
        /// Operation arguments.
        args: Vec<String>,
    },
    /// Run every invocation of a `function,argument` CSV file in order.
    Replay {
        /// Input invocations CSV file
        input: PathBuf,
    },
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBLedgerStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

fn print_result(out: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    if !bytes.is_empty() {
        out.write_all(bytes)?;
        writeln!(out)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = LedgerConfig {
        max_commit_retries: cli.max_retries,
    };
    let store = open_store(cli.db_path)?;
    let router = Router::new(MortgageLedger::new(store, config));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Invoke { function, args } => {
            let bytes = router.invoke(&function, &args).await.into_diagnostic()?;
            print_result(&mut out, &bytes).into_diagnostic()?;
        }
        Command::Replay { input } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = InvocationReader::new(file);
            for invocation in reader.invocations() {
                match invocation {
                    Ok(invocation) => {
                        match router.invoke(&invocation.function, &invocation.args()).await {
                            Ok(bytes) => print_result(&mut out, &bytes).into_diagnostic()?,
                            Err(e) => error!(
                                function = %invocation.function,
                                "Error processing invocation: {}",
                                e
                            ),
                        }
                    }
                    Err(e) => error!("Error reading invocation: {}", e),
                }
            }
        }
    }

    Ok(())
}
