//! Index reconstruction by full log replay
//!
//! Replay is the only mechanism that establishes the index — there is
//! no separately persisted index file — so its cost is O(log size) at
//! every open and after every compaction.

use std::collections::HashMap;
use std::io::Read;

use crate::error::Result;

use super::reader::LogReader;
use super::record::Record;

/// In-memory index: key → file offset of the value-length field of
/// that key's most recent Set record.
///
/// Keys are unique (last writer wins); a key present only via
/// tombstone, or never written, is absent. Iteration order is
/// unspecified.
pub type Index = HashMap<Vec<u8>, u64>;

/// Statistics and result of replaying a log from offset 0
#[derive(Debug, Default)]
pub struct ReplayOutcome {
    /// The reconstructed index
    pub index: Index,

    /// Total records decoded
    pub records_replayed: u64,

    /// Tombstones applied (idempotent: counted even when the key was
    /// already absent)
    pub tombstones_applied: u64,

    /// Total log bytes consumed
    pub log_bytes: u64,
}

/// Replay every record from the start of the log and rebuild the index.
///
/// For each Set record starting at offset S with key length K, the key
/// is indexed at `S + 1 (kind) + 4 (key_len) + K` — the offset of its
/// value-length field. Each Delete removes the key. Replaying the same
/// log always yields the same index.
pub fn replay<R: Read>(reader: R) -> Result<ReplayOutcome> {
    let mut log = LogReader::new(reader);
    let mut outcome = ReplayOutcome::default();

    while let Some((start, record)) = log.next_record()? {
        outcome.records_replayed += 1;
        match record {
            Record::Set { key, .. } => {
                let offset = start + Record::value_len_field_offset(key.len());
                outcome.index.insert(key, offset);
            }
            Record::Delete { key } => {
                outcome.tombstones_applied += 1;
                outcome.index.remove(&key);
            }
        }
    }

    outcome.log_bytes = log.offset();
    Ok(outcome)
}
