use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payrelay::application::engine::RelayEngine;
use payrelay::config::{Settings, StorageBackend};
use payrelay::domain::identity::{Identity, Mint};
use payrelay::domain::ports::{ProcessorStoreBox, TokenLedgerBox};
use payrelay::domain::processor::ProcessorState;
use payrelay::infrastructure::in_memory::{InMemoryProcessorStore, InMemoryTokenLedger};
use payrelay::interfaces::csv::instruction_reader::InstructionReader;
use payrelay::interfaces::csv::state_writer::StateWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Manage and exercise a PaymentProcessor deployment", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Claim the deployment and setup the base state
    Init {
        /// The identity claiming ownership
        #[arg(long)]
        caller: Identity,
        /// The wallet that will receive the tokens
        #[arg(short, long)]
        receiver: Identity,
        /// The accepted token mint
        #[arg(short, long)]
        mint: Mint,
    },
    /// Set the token receiver
    SetReceiver {
        #[arg(long)]
        caller: Identity,
        #[arg(short, long)]
        receiver: Identity,
    },
    /// Pause a running processor to prevent payments
    Pause {
        #[arg(long)]
        caller: Identity,
    },
    /// Resume a paused processor to allow payments
    Resume {
        #[arg(long)]
        caller: Identity,
    },
    /// Print the processor state
    State,
    /// Execute an instruction script and print the resulting state and balances
    Run {
        /// Input instructions CSV file
        input: PathBuf,
    },
}

fn build_engine(settings: &Settings) -> Result<RelayEngine> {
    let (store, ledger): (ProcessorStoreBox, TokenLedgerBox) = match settings.storage_backend() {
        StorageBackend::InMemory => {
            let store: ProcessorStoreBox = Box::new(InMemoryProcessorStore::new());
            let ledger: TokenLedgerBox = Box::new(InMemoryTokenLedger::new());
            (store, ledger)
        }
        #[cfg(feature = "storage-rocksdb")]
        StorageBackend::RocksDb(path) => {
            // One RocksDB handle serves both ports
            let db = payrelay::infrastructure::rocksdb::RocksDBStore::open(path).into_diagnostic()?;
            let store: ProcessorStoreBox = Box::new(db.clone());
            let ledger: TokenLedgerBox = Box::new(db);
            (store, ledger)
        }
    };
    Ok(RelayEngine::new(settings.deployment.clone(), store, ledger))
}

fn print_state(state: &ProcessorState) {
    println!("-- Owner   : {}", state.owner);
    println!("-- Receiver: {}", state.receiver);
    println!("-- Mint    : {}", state.mint);
    println!("-- Paused  : {}", state.paused);
}

async fn run_script(engine: &RelayEngine, input: PathBuf) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let reader = InstructionReader::new(file);
    for instruction in reader.instructions() {
        match instruction {
            Ok(instruction) => {
                if let Err(e) = engine.execute(instruction).await {
                    eprintln!("Error processing instruction: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading instruction: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = StateWriter::new(stdout.lock());
    match engine.state().await {
        Ok(state) => writer.write_state(&state).into_diagnostic()?,
        Err(e) => eprintln!("Error reading state: {}", e),
    }
    writer
        .write_balances(engine.token_accounts().await.into_diagnostic()?)
        .into_diagnostic()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.settings
        .init_tracing()
        .map_err(|e| miette::miette!("Failed to install tracing subscriber: {}", e))?;
    let engine = build_engine(&cli.settings)?;

    match cli.command {
        Command::Init {
            caller,
            receiver,
            mint,
        } => {
            println!("➡️ Initializing payment processor with:");
            println!("  - Receiver: {}", receiver);
            println!("  - Mint: {}", mint);
            engine.create(caller, receiver, mint).await.into_diagnostic()?;
            println!("✅ PaymentProcessor {} initialized", engine.deployment());
        }
        Command::SetReceiver { caller, receiver } => {
            println!("➡️ Setting receiver to: {}", receiver);
            engine.set_receiver(caller, receiver).await.into_diagnostic()?;
            println!("✅ Receiver updated");
        }
        Command::Pause { caller } => {
            println!("➡️ Pausing PaymentProcessor {}", engine.deployment());
            engine.pause(caller).await.into_diagnostic()?;
            println!("✅ PaymentProcessor paused");
        }
        Command::Resume { caller } => {
            println!("➡️ Resuming PaymentProcessor {}", engine.deployment());
            engine.unpause(caller).await.into_diagnostic()?;
            println!("✅ PaymentProcessor resumed");
        }
        Command::State => {
            println!("➡️ Getting the state for PaymentProcessor {}", engine.deployment());
            let state = engine.state().await.into_diagnostic()?;
            print_state(&state);
        }
        Command::Run { input } => run_script(&engine, input).await?,
    }

    Ok(())
}
