//! slotstore CLI
//!
//! Command-line interface for inspecting and editing a store file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slotstore::{Config, Shutdown, Store, StoreError};
use tracing_subscriber::{fmt, EnvFilter};

/// slotstore CLI
#[derive(Parser, Debug)]
#[command(name = "slotstore-cli")]
#[command(about = "CLI for slotstore record files")]
#[command(version)]
struct Args {
    /// Backing file
    #[arg(short, long, default_value = "./slotstore.db")]
    file: PathBuf,

    /// JSON config file; overrides --file when it sets a path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store raw bytes (given as a UTF-8 string)
    PutRaw {
        table: String,
        pos: u16,
        data: String,
    },

    /// Store a JSON value
    Put {
        table: String,
        pos: u16,
        /// JSON text
        value: String,
    },

    /// Print a record's raw bytes
    GetRaw { table: String, pos: u16 },

    /// Print a record decoded as JSON
    Get { table: String, pos: u16 },

    /// Clear a slot
    Del { table: String, pos: u16 },

    /// List tables
    Tables,

    /// Print every slot of one table, or of all tables
    Dump { table: Option<String> },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<Config, StoreError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&text)
                .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?
        }
        None => Config::default(),
    };

    if config.path.is_none() {
        config.path = Some(args.file.clone());
    }
    // One-shot process: save explicitly instead of ticking
    config.autosave = false;
    Ok(config)
}

fn run(args: Args) -> Result<(), StoreError> {
    let config = load_config(&args)?;
    tracing::debug!(path = ?config.path, "Opening store");

    let store = Store::open(config, Shutdown::new(), None)?;

    match args.command {
        Commands::PutRaw { table, pos, data } => store.put_raw(&table, pos, data.into_bytes())?,
        Commands::Put { table, pos, value } => {
            let value = serde_json::from_str(&value)
                .map_err(|e| StoreError::Codec(e.to_string()))?;
            store.put(&table, pos, value)?;
        }
        Commands::GetRaw { table, pos } => {
            let data = store.get_raw(&table, pos)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        Commands::Get { table, pos } => {
            let value = store.get(&table, pos)?;
            println!("{}", value);
        }
        Commands::Del { table, pos } => store.del(&table, pos)?,
        Commands::Tables => {
            for name in store.tables()? {
                println!("{}", name);
            }
        }
        Commands::Dump { table } => {
            let names = match table {
                Some(name) => vec![name],
                None => store.tables()?,
            };
            for name in names {
                dump_table(&store, &name)?;
            }
        }
    }

    store.close()?;
    Ok(())
}

fn dump_table(store: &Store, table: &str) -> Result<(), StoreError> {
    let len = store.table_len(table)?;
    println!("[{}] {} slots", table, len);

    for pos in 0..len {
        // Table length never exceeds u16::MAX + 1
        let pos = pos as u16;
        match store.get_raw(table, pos) {
            Ok(data) => println!("{:5}  {}", pos, String::from_utf8_lossy(&data)),
            Err(StoreError::RecordNotFound { .. }) => println!("{:5}  <absent>", pos),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
