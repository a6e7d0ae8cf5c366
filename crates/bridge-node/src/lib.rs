//! # Bridge Node
//!
//! Replay driver: reads newline-delimited JSON `ChainEvent`s, feeds them to
//! the reconciler through the bus adapter and returns the resulting
//! entities.
//!
//! ## Pipeline
//!
//! ```text
//! [file / stdin] ──lines──→ [reader task] ──mpsc──→ [ReconcilerBusAdapter]
//!                                                          │
//!                                                          ↓
//!                                                  [ReplayReport (JSON)]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{Context, Result};
use bridge_reconciler::{
    decode_event, ChainEvent, KeyValueStore, Reconciler, ReconcilerApi, ReconcilerBusAdapter,
    ReplaySummary, Snapshot,
};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Outcome of a full replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// Per-outcome event tally.
    pub summary: ReplaySummary,
    /// Entities after the last event.
    pub entities: Snapshot,
}

/// Decode every event line and forward it to the channel.
///
/// Stops early, without error, if the receiving side is gone. Returns the
/// number of events forwarded.
pub async fn forward_lines<R>(input: R, sender: mpsc::Sender<ChainEvent>) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut line_number = 0u64;
    let mut forwarded = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event =
            decode_event(line).with_context(|| format!("Invalid event on line {}", line_number))?;
        if sender.send(event).await.is_err() {
            debug!("Reconciler stopped, no longer reading input");
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}

/// Replay an input stream through the reconciler.
pub async fn replay<KV, R>(
    reconciler: Reconciler<KV>,
    input: R,
    channel_capacity: usize,
) -> Result<ReplayReport>
where
    KV: KeyValueStore + 'static,
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(channel_capacity);
    let reader = tokio::spawn(forward_lines(input, sender));

    let mut adapter = ReconcilerBusAdapter::new(reconciler);
    let summary = adapter
        .run(receiver)
        .await
        .context("Replay halted")?;

    let forwarded = reader.await.context("Input reader task panicked")??;
    info!("Replayed {} events", forwarded);

    let entities = adapter
        .reconciler()
        .snapshot()
        .context("Failed to read entities")?;
    Ok(ReplayReport { summary, entities })
}
