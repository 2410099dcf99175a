//! Append-only log file.
//!
//! Owned by the writer task alone. A failed write drops the handle so the
//! next record reopens the file (e.g. after the directory reappears).
//! A write may fail partway through a line, so the first record after a
//! write failure is prefixed with a newline to start on a fresh line.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Failures while persisting a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to log file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to sync log file {path:?}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize record {id}: {source}")]
    Serialize {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}

impl SinkError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SinkError::Open { .. } => "open",
            SinkError::Write { .. } => "write",
            SinkError::Sync { .. } => "sync",
            SinkError::Serialize { .. } => "serialize",
        }
    }
}

/// Lazily opened append-mode file.
#[derive(Debug)]
pub struct AppendFile {
    path: PathBuf,
    fsync: bool,
    file: Option<File>,
    /// The last write may have left an unterminated line.
    torn: bool,
}

impl AppendFile {
    pub fn new(path: impl Into<PathBuf>, fsync: bool) -> Self {
        Self {
            path: path.into(),
            fsync,
            file: None,
            torn: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Open (creating if absent) in append mode. No-op when already open.
    pub async fn open(&mut self) -> Result<(), SinkError> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|source| SinkError::Open {
                    path: self.path.clone(),
                    source,
                })?;
            self.file = Some(file);
        }
        Ok(())
    }

    /// Append one complete record with a single write.
    pub async fn append(&mut self, line: &[u8]) -> Result<(), SinkError> {
        self.open().await?;
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let torn = self.torn;
        let written = async {
            if torn {
                let mut buf = Vec::with_capacity(line.len() + 1);
                buf.push(b'\n');
                buf.extend_from_slice(line);
                file.write_all(&buf).await?;
            } else {
                file.write_all(line).await?;
            }
            file.flush().await
        }
        .await;
        if let Err(source) = written {
            self.file = None;
            self.torn = true;
            return Err(SinkError::Write {
                path: self.path.clone(),
                source,
            });
        }

        self.torn = false;

        if self.fsync {
            if let Err(source) = file.sync_data().await {
                self.file = None;
                return Err(SinkError::Sync {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Flush and release the handle.
    pub async fn close(&mut self) -> Result<(), SinkError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
