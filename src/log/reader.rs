//! Sequential record decoding
//!
//! Reads records one at a time from the start of the log. The reader
//! tracks the byte cursor itself, so it works over any `Read` source
//! (buffered file readers in the store, in-memory cursors in tests)
//! without seeking.

use std::io::{ErrorKind, Read};

use crate::error::{FlintError, Result};

use super::record::{Record, KIND_DELETE, KIND_SET};

/// Streaming reader over the record log
pub struct LogReader<R: Read> {
    reader: R,

    /// Byte offset of the next unread record
    offset: u64,
}

impl<R: Read> LogReader<R> {
    /// Wrap a reader positioned at the start of the log
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Byte offset where the next record starts (equals the number of
    /// log bytes consumed so far)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decode the next record.
    ///
    /// Returns:
    /// - `Ok(Some((start_offset, record)))` — a complete record
    /// - `Ok(None)` — clean end of log: EOF before any byte of a record
    /// - `Err(Corrupt)` — EOF mid-record (truncated header or payload),
    ///   or an unrecognized kind byte
    pub fn next_record(&mut self) -> Result<Option<(u64, Record)>> {
        let start = self.offset;

        // EOF at the kind byte is the normal replay-termination
        // condition; EOF anywhere later in the record is corruption.
        let mut kind = [0u8; 1];
        match self.reader.read_exact(&mut kind) {
            Ok(()) => self.offset += 1,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let record = match kind[0] {
            KIND_SET => {
                let key_len = self.read_len_field(start, "key length")?;
                let key = self.read_payload(start, key_len, "key")?;
                let value_len = self.read_len_field(start, "value length")?;
                let value = self.read_payload(start, value_len, "value")?;
                Record::Set { key, value }
            }
            KIND_DELETE => {
                let key_len = self.read_len_field(start, "key length")?;
                let key = self.read_payload(start, key_len, "key")?;
                Record::Delete { key }
            }
            other => {
                return Err(FlintError::corrupt(
                    start,
                    format!("unrecognized record kind {}", other),
                ))
            }
        };

        Ok(Some((start, record)))
    }

    /// Read a 4-byte little-endian length field
    fn read_len_field(&mut self, record_start: u64, field: &str) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_field(record_start, &mut buf, field)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a length-prefixed payload
    fn read_payload(&mut self, record_start: u64, len: u32, field: &str) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len as usize];
        self.read_field(record_start, &mut buf, field)?;
        Ok(buf)
    }

    /// Read exactly `buf.len()` bytes; EOF here means the record was
    /// truncated, which must fail rather than silently shorten the log.
    fn read_field(&mut self, record_start: u64, buf: &mut [u8], field: &str) -> Result<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(FlintError::corrupt(
                record_start,
                format!("log truncated while reading {}", field),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
