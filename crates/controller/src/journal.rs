//! Event journal - hash-chained, append-only JSONL
//!
//! Each line wraps one [`EventRecord`] with a sequence number, the previous
//! line's hash and its own SHA-256 hash. The first entry links to
//! [`GENESIS_HASH`]. Tampering with any line breaks [`verify_chain`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::event::EventRecord;

/// `prev_hash` of the first entry
pub const GENESIS_HASH: &str = "GENESIS";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },
}

pub type JournalResult<T> = Result<T, JournalError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub prev_hash: String,
    pub hash: String,
    pub record: EventRecord,
}

/// SHA-256 over everything but the `hash` field
pub fn calculate_entry_hash(sequence: u64, prev_hash: &str, record: &EventRecord) -> JournalResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(record.id.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hasher.update(serde_json::to_string(&record.event)?.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Verify links, hashes and sequence numbers starting from genesis
pub fn verify_chain(entries: &[JournalEntry]) -> JournalResult<()> {
    let mut prev_hash = GENESIS_HASH.to_string();

    for (i, entry) in entries.iter().enumerate() {
        let expected_sequence = i as u64 + 1;
        if entry.sequence != expected_sequence {
            return Err(JournalError::InvalidSequence {
                expected: expected_sequence,
                actual: entry.sequence,
            });
        }

        if entry.prev_hash != prev_hash {
            return Err(JournalError::BrokenLink {
                sequence: entry.sequence,
                expected: prev_hash,
                actual: entry.prev_hash.clone(),
            });
        }

        let calculated = calculate_entry_hash(entry.sequence, &entry.prev_hash, &entry.record)?;
        if entry.hash != calculated {
            return Err(JournalError::InvalidHash {
                sequence: entry.sequence,
                expected: calculated,
                actual: entry.hash.clone(),
            });
        }

        prev_hash = entry.hash.clone();
    }

    Ok(())
}

enum Backend {
    File { path: PathBuf, file: File },
    Memory(Vec<JournalEntry>),
}

pub struct EventJournal {
    backend: Backend,
    last_sequence: u64,
    last_hash: String,
}

impl EventJournal {
    /// Open (or create) a journal file and resume after its last entry
    pub fn open(path: impl AsRef<Path>) -> JournalResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let existing = read_entries(&path)?;
        let (last_sequence, last_hash) = match existing.last() {
            Some(entry) => (entry.sequence, entry.hash.clone()),
            None => (0, GENESIS_HASH.to_string()),
        };

        Ok(Self {
            backend: Backend::File { path, file },
            last_sequence,
            last_hash,
        })
    }

    /// Journal kept in memory (for testing)
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Vec::new()),
            last_sequence: 0,
            last_hash: GENESIS_HASH.to_string(),
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    pub fn append(&mut self, record: EventRecord) -> JournalResult<JournalEntry> {
        let sequence = self.last_sequence + 1;
        let hash = calculate_entry_hash(sequence, &self.last_hash, &record)?;
        let entry = JournalEntry {
            sequence,
            prev_hash: self.last_hash.clone(),
            hash,
            record,
        };

        match &mut self.backend {
            Backend::File { file, .. } => {
                let json = serde_json::to_string(&entry)?;
                writeln!(file, "{}", json)?;
                file.flush()?;
            }
            Backend::Memory(entries) => entries.push(entry.clone()),
        }

        self.last_sequence = sequence;
        self.last_hash = entry.hash.clone();
        Ok(entry)
    }

    /// Append records in order; returns how many were written
    pub fn append_all(&mut self, records: impl IntoIterator<Item = EventRecord>) -> JournalResult<usize> {
        let mut written = 0;
        for record in records {
            self.append(record)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn read_all(&self) -> JournalResult<Vec<JournalEntry>> {
        match &self.backend {
            Backend::File { path, .. } => read_entries(path),
            Backend::Memory(entries) => Ok(entries.clone()),
        }
    }

    pub fn verify(&self) -> JournalResult<usize> {
        let entries = self.read_all()?;
        verify_chain(&entries)?;
        Ok(entries.len())
    }
}

fn read_entries(path: &Path) -> JournalResult<Vec<JournalEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ControllerEvent;
    use chrono::Utc;
    use mintgate_core::{Address, Amount};
    use tempfile::TempDir;

    fn record(limit: u64) -> EventRecord {
        EventRecord::new(
            ControllerEvent::DailyLimitChanged {
                old_limit: Amount::ZERO,
                new_limit: Amount::from(limit),
                actor: Address::new("owner"),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_in_memory_chain() {
        let mut journal = EventJournal::in_memory();
        let first = journal.append(record(100)).unwrap();
        let second = journal.append(record(200)).unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(journal.verify().unwrap(), 2);
    }

    #[test]
    fn test_file_journal_resumes_chain() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("journal.jsonl");

        {
            let mut journal = EventJournal::open(&path).unwrap();
            journal.append_all(vec![record(1), record(2)]).unwrap();
        }

        let mut journal = EventJournal::open(&path).unwrap();
        assert_eq!(journal.last_sequence(), 2);
        journal
            .append(EventRecord::new(
                ControllerEvent::StakerChanged {
                    staker: Address::new("staker"),
                    actor: Address::new("owner"),
                },
                Utc::now(),
            ))
            .unwrap();

        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 3);
        verify_chain(&entries).unwrap();
    }

    #[test]
    fn test_tampered_record_detected() {
        let mut journal = EventJournal::in_memory();
        journal.append_all(vec![record(1), record(2)]).unwrap();

        let mut entries = journal.read_all().unwrap();
        entries[0].record.event = ControllerEvent::DailyLimitChanged {
            old_limit: Amount::ZERO,
            new_limit: Amount::from(1_000_000),
            actor: Address::new("owner"),
        };

        assert!(matches!(
            verify_chain(&entries),
            Err(JournalError::InvalidHash { sequence: 1, .. })
        ));
    }

    #[test]
    fn test_broken_link_detected() {
        let mut journal = EventJournal::in_memory();
        journal.append_all(vec![record(1), record(2)]).unwrap();

        let mut entries = journal.read_all().unwrap();
        entries[1].prev_hash = "forged".to_string();

        assert!(matches!(
            verify_chain(&entries),
            Err(JournalError::BrokenLink { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_sequence_gap_detected() {
        let mut journal = EventJournal::in_memory();
        journal.append_all(vec![record(1), record(2), record(3)]).unwrap();

        let mut entries = journal.read_all().unwrap();
        entries.remove(1);

        assert!(matches!(
            verify_chain(&entries),
            Err(JournalError::InvalidSequence { expected: 2, actual: 3 })
        ));
    }
}
