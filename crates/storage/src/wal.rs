// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! One JSON entry per line, fsync'd on append. Reading stops at the first
//! line that is torn, unparsable, fails its checksum, or goes back in
//! sequence; everything before it is the valid log.

use crate::entry::WalEntry;
use crate::operation::Operation;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store {0} is in use by another process")]
    Locked(PathBuf),
    #[error("WAL {0} could not be restored after a failed write; reopen the store")]
    Poisoned(PathBuf),
}

/// Result of reading a log from disk
#[derive(Debug, Default)]
pub struct WalRead {
    pub entries: Vec<WalEntry>,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    /// 1-based line number of the first invalid line, if any
    pub corrupted_at: Option<u64>,
}

impl WalRead {
    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.sequence)
    }
}

/// Fault injected into the next append
#[cfg(test)]
#[derive(Clone, Copy, Debug)]
pub(crate) enum FailPoint {
    /// Half the line reaches the file, then the write fails
    Write,
    /// The whole line reaches the file, then fsync fails
    Sync,
}

/// Write-ahead log for durable operation storage
pub struct Wal {
    file: File,
    path: PathBuf,
    sequence: u64,
    poisoned: bool,
    #[cfg(test)]
    fail_next: Option<FailPoint>,
}

impl Wal {
    /// Open for appending after `sequence`, creating the file if needed
    pub fn open(path: &Path, sequence: u64) -> Result<Self, WalError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            sequence,
            poisoned: false,
            #[cfg(test)]
            fail_next: None,
        })
    }

    /// Append an operation to the log
    ///
    /// A failed append is cut back out of the file, so the log never keeps a
    /// partial line or an entry whose sequence was not taken. If the cut
    /// itself fails, every later append is refused.
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        if self.poisoned {
            return Err(WalError::Poisoned(self.path.clone()));
        }

        let entry = WalEntry::new(self.sequence + 1, op.clone());
        let line = entry.to_line()?;
        let start = self.file.metadata()?.len();

        if let Err(e) = self.write_line(&line) {
            match self.file.set_len(start).and_then(|()| self.file.sync_all()) {
                Ok(()) => {
                    tracing::warn!(sequence = entry.sequence, error = %e, "WAL append failed, rolled back");
                }
                Err(cut) => {
                    self.poisoned = true;
                    tracing::error!(
                        sequence = entry.sequence,
                        error = %e,
                        rollback_error = %cut,
                        "WAL append failed and could not be rolled back"
                    );
                }
            }
            return Err(e.into());
        }

        self.sequence = entry.sequence;
        Ok(self.sequence)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(result) = self.injected(line) {
            return result;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.sync_all()
    }

    #[cfg(test)]
    pub(crate) fn fail_next(&mut self, point: FailPoint) {
        self.fail_next = Some(point);
    }

    #[cfg(not(test))]
    fn injected(&mut self, _line: &str) -> Option<io::Result<()>> {
        None
    }

    #[cfg(test)]
    fn injected(&mut self, line: &str) -> Option<io::Result<()>> {
        let point = self.fail_next.take()?;
        let written = match point {
            FailPoint::Write => self.file.write_all(&line.as_bytes()[..line.len() / 2]),
            FailPoint::Sync => self.file.write_all(format!("{line}\n").as_bytes()),
        };
        Some(written.and_then(|()| Err(io::Error::other(format!("injected {point:?} failure")))))
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid entry; a missing file is an empty log
    pub fn read(path: &Path) -> Result<WalRead, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(WalRead::default()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut read = WalRead::default();
        let mut line = String::new();
        let mut line_no = 0;

        loop {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            line_no += 1;

            if !line.ends_with('\n') {
                tracing::warn!(line = line_no, "torn write at end of WAL");
                read.corrupted_at = Some(line_no);
                break;
            }
            let content = line.trim_end();
            if content.is_empty() {
                read.valid_len += n as u64;
                continue;
            }

            let entry = match WalEntry::from_line(content) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "unparsable WAL entry");
                    read.corrupted_at = Some(line_no);
                    break;
                }
            };
            if !entry.verify() {
                tracing::warn!(line = line_no, sequence = entry.sequence, "WAL checksum mismatch");
                read.corrupted_at = Some(line_no);
                break;
            }
            if entry.sequence <= read.last_sequence() {
                tracing::warn!(line = line_no, sequence = entry.sequence, "WAL sequence went backwards");
                read.corrupted_at = Some(line_no);
                break;
            }

            read.valid_len += n as u64;
            read.entries.push(entry);
        }

        Ok(read)
    }

    /// Cut the file back to its valid prefix, returning the bytes removed
    pub fn truncate(path: &Path, valid_len: u64) -> Result<u64, WalError> {
        let file = OpenOptions::new().write(true).open(path)?;
        let old_len = file.metadata()?.len();
        file.set_len(valid_len)?;
        file.sync_all()?;
        tracing::info!(position = valid_len, "WAL truncated at corruption point");
        Ok(old_len.saturating_sub(valid_len))
    }

    /// Replace the whole log with `ops`, continuing the sequence
    ///
    /// Writes to a temporary file and renames it over the log, so a crash
    /// leaves either the old log or the new one. Returns bytes reclaimed.
    pub fn rewrite(&mut self, ops: Vec<Operation>) -> Result<u64, WalError> {
        let old_len = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let temp_path = self.path.with_extension("jsonl.compact.tmp");

        let mut sequence = self.sequence;
        {
            let mut file = File::create(&temp_path)?;
            for op in ops {
                sequence += 1;
                let line = WalEntry::new(sequence, op).to_line()?;
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, &self.path)?;

        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.sequence = sequence;

        let new_len = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        Ok(old_len.saturating_sub(new_len))
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
