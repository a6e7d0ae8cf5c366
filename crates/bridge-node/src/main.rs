//! # Bridge Node
//!
//! Command-line entry point for replaying bridge event streams.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging to stderr, metrics registry)
//! 2. Load reconciler configuration from env, apply CLI overrides
//! 3. Resolve the deployment context
//! 4. Replay the input and print the entities as JSON on stdout

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use bridge_node::{replay, ReplayReport};
use bridge_reconciler::{
    Address, ChainId, KeyValueStore, MissingEntityPolicy, Reconciler, ReconcilerConfig,
    RoleId, StampPolicy, StaticChainReader,
};
use bridge_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

/// Bridge Node: replay bridge events into relayer, deposit, proposal and vote entities
#[derive(Parser, Debug)]
#[command(name = "bridge-node")]
#[command(about = "Replay newline-delimited bridge events and print the reconciled entities")]
struct Args {
    /// Event file (newline-delimited JSON). Reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Chain id of the indexed bridge contract (overrides BRIDGE_LOCAL_CHAIN_ID)
    #[arg(short, long)]
    chain_id: Option<u8>,

    /// Relayer role id as 32-byte hex (overrides BRIDGE_RELAYER_ROLE)
    #[arg(long)]
    relayer_role: Option<RoleId>,

    /// Bridge contract address (overrides BRIDGE_CONTRACT_ADDRESS)
    #[arg(long)]
    contract: Option<Address>,

    /// Stop at the first skippable error instead of skipping the event
    #[arg(long)]
    halt: bool,

    /// Keep the first passed/executed/cancelled stamp on redelivery
    #[arg(long)]
    first_write_wins: bool,

    /// Persist entities in a RocksDB database at this path
    #[cfg(feature = "rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,
}

impl Args {
    fn reconciler_config(&self) -> ReconcilerConfig {
        let mut config = ReconcilerConfig::from_env();
        if let Some(chain_id) = self.chain_id {
            config.local_chain_id = Some(ChainId(chain_id));
        }
        if let Some(role) = self.relayer_role {
            config.relayer_role = Some(role);
        }
        if let Some(contract) = self.contract {
            config.bridge_contract = contract;
        }
        if self.halt {
            config.missing_entity_policy = MissingEntityPolicy::Halt;
        }
        if self.first_write_wins {
            config.stamp_policy = StampPolicy::FirstWriteWins;
        }
        config
    }

    fn open_input(&self) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Ok(Box::new(BufReader::new(tokio::fs::File::from_std(file))))
            }
            _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
        }
    }
}

async fn run<KV: KeyValueStore + 'static>(
    kv: KV,
    config: ReconcilerConfig,
    input: Box<dyn AsyncBufRead + Unpin + Send>,
) -> Result<ReplayReport> {
    let Some(chain_id) = config.local_chain_id else {
        bail!("Local chain id required: pass --chain-id or set BRIDGE_LOCAL_CHAIN_ID");
    };
    let reader = StaticChainReader::new(chain_id);

    let channel_capacity = config.channel_capacity;
    let reconciler = Reconciler::connect(kv, &reader, config)
        .await
        .context("Failed to resolve reconciler context")?;

    replay(reconciler, input, channel_capacity).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = args.reconciler_config();
    let input = args.open_input()?;
    info!(
        "Starting replay (policy {:?}, stamps {:?})",
        config.missing_entity_policy, config.stamp_policy
    );

    #[cfg(feature = "rocksdb")]
    let report = match &args.db_path {
        Some(path) => {
            let kv = bridge_reconciler::RocksDbStore::open_default(path)
                .context("Failed to open RocksDB")?;
            run(kv, config, input).await?
        }
        None => run(bridge_reconciler::InMemoryKVStore::new(), config, input).await?,
    };

    #[cfg(not(feature = "rocksdb"))]
    let report = run(bridge_reconciler::InMemoryKVStore::new(), config, input).await?;

    info!(
        "Replay finished: {} applied, {} ignored, {} skipped",
        report.summary.applied, report.summary.ignored, report.summary.skipped
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to encode entities")?
    );

    if args.metrics {
        eprintln!("{}", encode_metrics()?);
    }

    Ok(())
}
