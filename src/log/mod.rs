//! Record Log Module
//!
//! The append-only on-disk byte sequence and its binary record
//! encoding/decoding. The log is the source of truth; the in-memory
//! index is derived from it by replay.
//!
//! ## Responsibilities
//! - Encode Set and Delete records to their on-disk layout
//! - Decode the log as a strict sequence of records
//! - Rebuild the index by replaying every record from offset 0
//!
//! ## Record Format
//! ```text
//! Set record
//! ┌──────────┬─────────────┬─────┬─────────────┬───────┐
//! │ kind = 0 │ key_len (4) │ key │ val_len (4) │ value │
//! └──────────┴─────────────┴─────┴─────────────┴───────┘
//!
//! Delete record (tombstone)
//! ┌──────────┬─────────────┬─────┐
//! │ kind = 1 │ key_len (4) │ key │
//! └──────────┴─────────────┴─────┘
//! ```
//!
//! All length fields are fixed-width little-endian u32. There is no
//! file-level header or magic number: the format is self-describing at
//! the record level only, so a record's on-disk length is fully
//! determined by its own header fields.

mod reader;
mod record;
mod replay;

pub use reader::LogReader;
pub use record::{Record, KIND_DELETE, KIND_SET};
pub use replay::{replay, Index, ReplayOutcome};
