// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only schedule log
//!
//! One JSON entry per line, each carrying a sequence number that starts at 1
//! and increases by one. A crash in the middle of an append can leave a
//! partial last line; opening the log drops it. Damage anywhere else is an
//! error, since dropping it would silently lose committed edits.

use esched_core::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt log entry at line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("log entry at line {line} has sequence {found}, expected {expected}")]
    OutOfOrder {
        line: usize,
        expected: u64,
        found: u64,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct WalEntry {
    seq: u64,
    op: Operation,
}

/// Handle for appending to the log
pub struct Wal {
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create the log, returning it with every committed operation
    pub fn open(path: &Path) -> Result<(Self, Vec<Operation>), WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let replayed = parse(&bytes)?;
        if replayed.valid_len < bytes.len() {
            tracing::warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() - replayed.valid_len,
                "dropping partial entry at end of log"
            );
            file.set_len(replayed.valid_len as u64)?;
        }
        if replayed.valid_len > 0 && bytes[replayed.valid_len - 1] != b'\n' {
            file.write_all(b"\n")?;
            file.sync_all()?;
        }

        let wal = Self {
            file,
            sequence: replayed.sequence,
        };
        Ok((wal, replayed.ops))
    }

    /// Durably append an operation; returns its sequence number
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let entry = WalEntry {
            seq: self.sequence + 1,
            op: op.clone(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_all()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    /// Sequence number of the last entry, 0 for an empty log
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

struct Replayed {
    ops: Vec<Operation>,
    sequence: u64,
    /// Bytes up to and including the last good entry
    valid_len: usize,
}

fn parse(bytes: &[u8]) -> Result<Replayed, WalError> {
    let mut ops = Vec::new();
    let mut sequence = 0;
    let mut valid_len = 0;
    let mut offset = 0;
    let mut line_no = 0;

    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let (line, next, terminated) = match rest.iter().position(|b| *b == b'\n') {
            Some(end) => (&rest[..end], offset + end + 1, true),
            None => (rest, bytes.len(), false),
        };
        line_no += 1;

        if line.iter().all(u8::is_ascii_whitespace) {
            offset = next;
            if terminated {
                valid_len = next;
            }
            continue;
        }

        match serde_json::from_slice::<WalEntry>(line) {
            Ok(entry) => {
                if entry.seq != sequence + 1 {
                    return Err(WalError::OutOfOrder {
                        line: line_no,
                        expected: sequence + 1,
                        found: entry.seq,
                    });
                }
                sequence = entry.seq;
                ops.push(entry.op);
                valid_len = next;
            }
            // Unterminated last line: an append that never finished
            Err(_) if !terminated => break,
            Err(source) => {
                return Err(WalError::Corrupt {
                    line: line_no,
                    source,
                })
            }
        }
        offset = next;
    }

    Ok(Replayed {
        ops,
        sequence,
        valid_len,
    })
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
