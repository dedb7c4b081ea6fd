//! Background sync worker.
//!
//! The generation pipeline holds a [`SyncHandle`] and pushes file events into
//! a bounded queue. A single [`SyncWorker`] task drains the queue in order,
//! drives the [`SyncEngine`], and reports each per-file outcome on a report
//! channel. Because one task owns the engine, bucket rebinding and operations
//! on the same key never interleave.

use crate::engine::{DeleteOutcome, Published, SyncEngine};
use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Queue capacity used when callers have no preference.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// A change produced by the site generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileEvent {
    Written { local_path: PathBuf, url: String },
    Removed { url: String },
}

impl FileEvent {
    pub fn url(&self) -> &str {
        match self {
            Self::Written { url, .. } | Self::Removed { url } => url,
        }
    }
}

#[derive(Debug)]
enum SyncCommand {
    File(FileEvent),
    Shutdown,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Published(Published),
    Removed(DeleteOutcome),
}

/// Per-file result sent back by the worker.
#[derive(Debug)]
pub struct SyncReport {
    pub event: FileEvent,
    pub outcome: SyncResult<Outcome>,
}

/// Counters returned when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub published: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Handle for queueing file events to the worker.
#[derive(Clone, Debug)]
pub struct SyncHandle {
    command_tx: mpsc::Sender<SyncCommand>,
}

impl SyncHandle {
    pub async fn file_written(
        &self,
        local_path: impl Into<PathBuf>,
        url: impl Into<String>,
    ) -> SyncResult<()> {
        self.send(SyncCommand::File(FileEvent::Written {
            local_path: local_path.into(),
            url: url.into(),
        }))
        .await
    }

    pub async fn file_removed(&self, url: impl Into<String>) -> SyncResult<()> {
        self.send(SyncCommand::File(FileEvent::Removed { url: url.into() }))
            .await
    }

    /// Asks the worker to stop once the events queued before this call are
    /// processed.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.send(SyncCommand::Shutdown).await
    }

    async fn send(&self, command: SyncCommand) -> SyncResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SyncError::ChannelClosed)
    }
}

/// Drains the event queue and drives a [`SyncEngine`].
pub struct SyncWorker {
    engine: SyncEngine,
    command_rx: mpsc::Receiver<SyncCommand>,
    report_tx: mpsc::Sender<SyncReport>,
    stats: WorkerStats,
}

/// Creates a worker, the handle that feeds it, and the receiver for its
/// per-file reports.
///
/// The report channel has the same capacity as the event queue. The worker
/// never waits on it: reports that find the channel full, or the receiver
/// dropped, are discarded.
pub fn create_sync_worker(
    engine: SyncEngine,
    capacity: usize,
) -> (SyncHandle, mpsc::Receiver<SyncReport>, SyncWorker) {
    let capacity = capacity.max(1);
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (report_tx, report_rx) = mpsc::channel(capacity);

    let worker = SyncWorker {
        engine,
        command_rx,
        report_tx,
        stats: WorkerStats::default(),
    };

    (SyncHandle { command_tx }, report_rx, worker)
}

impl SyncWorker {
    /// Processes events until shutdown is requested or every handle is
    /// dropped. Returns the engine so callers can inspect its final state.
    pub async fn run(mut self) -> (SyncEngine, WorkerStats) {
        info!(
            "sync worker started for bucket {:?}",
            self.engine.config().bucket
        );

        loop {
            match self.command_rx.recv().await {
                Some(SyncCommand::File(event)) => self.handle_event(event).await,
                Some(SyncCommand::Shutdown) => {
                    info!("sync worker stopping");
                    break;
                }
                None => {
                    info!("event channel closed, stopping sync worker");
                    break;
                }
            }
        }

        info!(
            "sync worker stopped: {} published, {} removed, {} failed",
            self.stats.published, self.stats.removed, self.stats.failed
        );
        (self.engine, self.stats)
    }

    async fn handle_event(&mut self, event: FileEvent) {
        let outcome = match &event {
            FileEvent::Written { local_path, url } => self
                .engine
                .on_file_written(local_path, url)
                .await
                .map(Outcome::Published),
            FileEvent::Removed { url } => self
                .engine
                .on_file_removed(url)
                .await
                .map(Outcome::Removed),
        };

        match &outcome {
            Ok(Outcome::Published(_)) => self.stats.published += 1,
            Ok(Outcome::Removed(_)) => self.stats.removed += 1,
            Err(e) => {
                self.stats.failed += 1;
                warn!("sync failed for {}: {e}", event.url());
            }
        }

        match self.report_tx.try_send(SyncReport { event, outcome }) {
            Ok(()) => {}
            Err(TrySendError::Full(report)) => {
                warn!("report channel full, dropping report for {}", report.event.url());
            }
            Err(TrySendError::Closed(_)) => debug!("report receiver dropped, discarding report"),
        }
    }
}
