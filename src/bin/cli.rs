//! Thin command-line wrapper around `isamfile::Store`, for manually
//! exercising the engine. Carries no engine logic of its own.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use isamfile::{Record, Store, StoreConfig};

#[derive(Parser)]
#[command(name = "isamfile-cli")]
#[command(about = "Indexed-sequential file store CLI")]
#[command(version)]
struct Cli {
    /// Data file path
    #[arg(long, default_value = "data.bin")]
    data: PathBuf,

    /// Index file path
    #[arg(long, default_value = "index.bin")]
    index: PathBuf,

    /// Records per page
    #[arg(long, default_value_t = StoreConfig::default().records_per_page)]
    records_per_page: usize,

    /// Opaque payload length in bytes
    #[arg(long, default_value_t = StoreConfig::default().payload_len)]
    payload_len: usize,

    /// Reorganization fill factor
    #[arg(long, default_value_t = StoreConfig::default().alpha)]
    alpha: f64,

    /// Overflow-ratio reorganization threshold
    #[arg(long, default_value_t = StoreConfig::default().beta)]
    beta: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new store (both files must not exist).
    Init,
    /// Insert a record.
    Add {
        key: i32,
        /// Payload bytes, zero-padded/truncated to --payload-len.
        payload: String,
    },
    /// Look up a record by key.
    Get { key: i32 },
    /// Replace a record's payload.
    Update { key: i32, payload: String },
    /// Remove a record.
    Delete { key: i32 },
    /// Force a reorganization regardless of the current overflow ratio.
    Reorganize,
    /// Print the raw contents of the data file.
    Dump,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> isamfile::Result<()> {
    let cfg = StoreConfig {
        records_per_page: cli.records_per_page,
        payload_len: cli.payload_len,
        alpha: cli.alpha,
        beta: cli.beta,
    };

    if let Commands::Init = cli.command {
        Store::init(&cli.data, &cli.index, cfg)?;
        println!("initialized {:?} / {:?}", cli.data, cli.index);
        return Ok(());
    }

    let mut store = Store::open(&cli.data, &cli.index, cfg)?;

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Add { key, payload } => {
            let record = Record::new(key, pad_payload(&payload, cfg.payload_len));
            let ops = store.add(record)?;
            println!("added key {key} ({ops} disk ops)");
        }
        Commands::Get { key } => {
            let record = store.get(key)?;
            println!("key={key} payload={:?}", record.numbers);
        }
        Commands::Update { key, payload } => {
            let record = Record::new(key, pad_payload(&payload, cfg.payload_len));
            let ops = store.update(record)?;
            println!("updated key {key} ({ops} disk ops)");
        }
        Commands::Delete { key } => {
            let ops = store.delete(key)?;
            println!("deleted key {key} ({ops} disk ops)");
        }
        Commands::Reorganize => {
            store.reorganize()?;
            println!("reorganized");
        }
        Commands::Dump => {
            store.print_data_file()?;
        }
    }
    Ok(())
}

fn pad_payload(s: &str, payload_len: usize) -> Vec<u8> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(payload_len, 0u8);
    bytes.truncate(payload_len);
    bytes
}
