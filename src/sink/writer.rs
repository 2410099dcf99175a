//! Fire-and-forget record submission and the single writer loop.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::LogRecord;
use crate::config::SinkConfig;
use crate::observability::metrics;
use crate::sink::file::{AppendFile, SinkError};

/// Handle used by request handlers to submit records.
///
/// Cheap to clone. Submitting never waits on disk.
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: mpsc::UnboundedSender<LogRecord>,
}

/// Totals reported by the writer when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub failed: u64,
}

/// The running writer task.
#[derive(Debug)]
pub struct SinkWriter {
    handle: JoinHandle<WriterStats>,
}

impl LogSink {
    /// Spawn the writer task for the configured file.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn(config: &SinkConfig) -> (Self, SinkWriter) {
        let (tx, rx) = mpsc::unbounded_channel();
        let file = AppendFile::new(&config.path, config.fsync);
        let handle = tokio::spawn(run_writer(file, rx));
        (Self { tx }, SinkWriter { handle })
    }

    /// Queue a record for appending.
    ///
    /// If the writer is gone the record is emitted in the error event
    /// instead, so it is never dropped without a trace.
    pub fn submit(&self, record: LogRecord) {
        match self.tx.send(record) {
            Ok(()) => metrics::record_enqueued(),
            Err(mpsc::error::SendError(record)) => {
                metrics::record_sink_error("closed");
                tracing::error!(
                    record_id = %record.id(),
                    record = %record.to_line().unwrap_or_default().trim_end(),
                    "Log writer is not running, record not persisted"
                );
            }
        }
    }
}

impl SinkWriter {
    /// Wait for the writer to drain the queue and close the file.
    ///
    /// Completes once every `LogSink` clone has been dropped.
    pub async fn finish(self) -> WriterStats {
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Log writer task failed");
                WriterStats::default()
            }
        }
    }
}

async fn run_writer(mut file: AppendFile, mut rx: mpsc::UnboundedReceiver<LogRecord>) -> WriterStats {
    match file.open().await {
        Ok(()) => tracing::info!(path = ?file.path(), "Log file opened"),
        Err(e) => {
            metrics::record_sink_error(e.kind());
            tracing::error!(error = %e, "Log file unavailable, will retry on next record");
        }
    }

    let mut stats = WriterStats::default();
    while let Some(record) = rx.recv().await {
        match write_record(&mut file, &record).await {
            Ok(bytes) => {
                stats.written += 1;
                metrics::record_sink_write(bytes);
                tracing::debug!(record_id = %record.id(), bytes, "Record appended");
            }
            Err(e) => {
                stats.failed += 1;
                metrics::record_sink_error(e.kind());
                tracing::error!(record_id = %record.id(), error = %e, "Failed to persist record");
            }
        }
    }

    if let Err(e) = file.close().await {
        metrics::record_sink_error(e.kind());
        tracing::error!(error = %e, "Failed to close log file");
    }
    tracing::info!(written = stats.written, failed = stats.failed, "Log writer drained");
    stats
}

async fn write_record(file: &mut AppendFile, record: &LogRecord) -> Result<usize, SinkError> {
    let line = record.to_line().map_err(|source| SinkError::Serialize {
        id: record.id(),
        source,
    })?;
    file.append(line.as_bytes()).await?;
    tracing::debug!(record = %line.trim_end(), "Record");
    Ok(line.len())
}
