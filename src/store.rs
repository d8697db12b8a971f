//! Store Engine
//!
//! The core storage engine that owns the log file and the in-memory
//! index.
//!
//! ## Responsibilities
//! - Rebuild the index by full log replay on open
//! - Append Set/Delete records and keep the index in agreement
//! - Serve point lookups through the index
//! - Compact ("polish") the log with atomic file replacement
//! - Produce full and polished backups

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::config::{Config, SyncStrategy};
use crate::error::{FlintError, Result};
use crate::log::{replay, Index, Record};

/// The embedded key/value store
///
/// ## Concurrency Model: Readers-Writer
///
/// The file handle and the index are the only shared mutable resources;
/// one `RwLock` guards both so every operation sees them in agreement:
///
/// - **`get` / `backup`**: shared guard — any number may run
///   concurrently. Lookups use positioned reads (`read_at`), so readers
///   never contend on a shared file cursor.
/// - **`set` / `delete` / `polish`**: exclusive guard — one at a time,
///   excluding all readers. `polish` holds the guard for its entire
///   multi-step duration (backup copy, rewrite, rename, reopen,
///   reindex); it is the longest-held critical section in the system.
///
/// Exactly one `Store` should hold the write-capable handle for a given
/// path at a time; cross-process exclusion is a deployment constraint,
/// not enforced here.
pub struct Store {
    /// Store configuration (path + sync strategy)
    config: Config,

    /// File handle + index, guarded together
    inner: RwLock<Inner>,
}

struct Inner {
    /// Open handle on the live log file (read + append)
    file: File,

    /// key → offset of the value-length field of its latest Set record
    index: Index,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Store {
    // =========================================================================
    // Sibling Path Suffixes
    // =========================================================================
    /// Appended to the live path for the pre-polish safety copy
    const BACKUP_SUFFIX: &'static str = "backup";
    /// Appended to the live path for the polish scratch file
    const TMP_SUFFIX: &'static str = "tmp";

    /// Open or create a store with the given config
    ///
    /// Replays the entire log once to build the index; construction
    /// fails outright on any IO error or corrupt record encountered
    /// during replay.
    pub fn open(config: Config) -> Result<Self> {
        let file = Self::open_log(&config.path)?;
        let index = Self::build_index(&file)?;

        Ok(Self {
            config,
            inner: RwLock::new(Inner { file, index }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified log file path
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Open the log file for reading and appending, creating it if absent
    fn open_log(path: &Path) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        Ok(file)
    }

    /// Rebuild the index by replaying the whole log from offset 0
    fn build_index(file: &File) -> Result<Index> {
        let outcome = replay(BufReader::new(file))?;
        tracing::info!(
            records = outcome.records_replayed,
            tombstones = outcome.tombstones_applied,
            live_keys = outcome.index.len(),
            log_bytes = outcome.log_bytes,
            "log replay complete"
        );
        Ok(outcome.index)
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Store a key/value pair
    ///
    /// Appends a Set record in a single write call, then points the
    /// index at the new record's value-length field. If the append
    /// fails the index is left untouched.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let encoded = Record::Set {
            key: key.to_vec(),
            value: value.to_vec(),
        }
        .encode();

        let mut inner = self.inner.write();
        inner.file.write_all(&encoded)?;
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            inner.file.sync_all()?;
        }

        // The record now ends at end-of-file; its start is the current
        // size minus what was just written.
        let record_start = inner.file.metadata()?.len() - encoded.len() as u64;
        let offset = record_start + Record::value_len_field_offset(key.len());
        inner.index.insert(key.to_vec(), offset);

        Ok(())
    }

    /// Remove a key
    ///
    /// The tombstone is appended unconditionally, even when the key is
    /// not currently present, keeping replay semantics simple and
    /// idempotent. Deleting an absent key succeeds silently.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let encoded = Record::Delete { key: key.to_vec() }.encode();

        let mut inner = self.inner.write();
        inner.file.write_all(&encoded)?;
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            inner.file.sync_all()?;
        }
        inner.index.remove(key);

        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Retrieve the value associated with a key
    ///
    /// Returns `KeyNotFound` for absent keys. A failing read at an
    /// indexed offset indicates log corruption or external tampering,
    /// since the offset was valid at write time.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let inner = self.inner.read();
        let offset = *inner.index.get(key).ok_or(FlintError::KeyNotFound)?;
        Self::read_value_at(&inner.file, offset)
    }

    /// Length-prefixed value read at the offset of a value-length field
    fn read_value_at(file: &File, offset: u64) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        file.read_exact_at(&mut len_buf, offset)?;
        let value_len = u32::from_le_bytes(len_buf);

        let mut value = vec![0u8; value_len as usize];
        file.read_exact_at(&mut value, offset + 4)?;
        Ok(value)
    }

    // =========================================================================
    // Compaction
    // =========================================================================

    /// Compact the log down to exactly one Set record per live key
    ///
    /// Steps, all under the exclusive guard:
    /// 1. Copy the live file to `{path}.backup` as a safety net.
    /// 2. Write one fresh Set record per live key to `{path}.tmp`.
    /// 3. Close the original handle, then atomically rename the temp
    ///    file over the live path. The rename is the only step that
    ///    swaps which file is live; any earlier failure leaves the
    ///    original untouched.
    /// 4. Reopen the polished file and rebuild the index by replay,
    ///    re-establishing it against the new file's offsets.
    pub fn polish(&self) -> Result<()> {
        let mut inner = self.inner.write();

        let backup_path = self.sibling_path(Self::BACKUP_SUFFIX);
        let tmp_path = self.sibling_path(Self::TMP_SUFFIX);

        fs::copy(&self.config.path, &backup_path)?;

        let size_before = inner.file.metadata()?.len();
        let tmp_file =
            Self::write_live_records(&inner, &tmp_path, self.config.sync_strategy)?;

        // Swapping in the temp handle drops the original one, so the
        // rename can take effect on every platform. If the rename fails
        // the original file is still on disk; restore a handle against
        // it before surfacing the failure.
        inner.file = tmp_file;
        if let Err(e) = fs::rename(&tmp_path, &self.config.path) {
            inner.file = Self::open_log(&self.config.path)?;
            return Err(e.into());
        }

        let file = Self::open_log(&self.config.path)?;
        let index = Self::build_index(&file)?;
        inner.file = file;
        inner.index = index;

        let size_after = inner.file.metadata()?.len();
        tracing::info!(
            live_keys = inner.index.len(),
            bytes_before = size_before,
            bytes_after = size_after,
            backup = %backup_path.display(),
            "polish complete"
        );
        Ok(())
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Copy the store to `path`
    ///
    /// With `polished = false` the live file is copied byte for byte,
    /// superseded values and tombstones included. With `polished = true`
    /// the copy contains one Set record per currently-live key — the
    /// same structure polish produces — without touching the source
    /// store. Either result opens via the normal open + replay
    /// procedure.
    pub fn backup(&self, path: impl AsRef<Path>, polished: bool) -> Result<()> {
        let inner = self.inner.read();
        let dest = path.as_ref();

        if polished {
            Self::write_live_records(&inner, dest, self.config.sync_strategy)?;
        } else {
            fs::copy(&self.config.path, dest)?;
        }

        tracing::debug!(dest = %dest.display(), polished, "backup written");
        Ok(())
    }

    /// Write one freshly encoded Set record per live index entry to
    /// `dest`, truncating it first. Shared by polish and polished
    /// backups; key order is unspecified and does not matter, since
    /// each key appears exactly once in the output.
    ///
    /// Returns the fully flushed (and, per strategy, synced) file
    /// handle.
    fn write_live_records(inner: &Inner, dest: &Path, sync: SyncStrategy) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dest)?;
        let mut writer = BufWriter::new(file);

        for (key, &offset) in &inner.index {
            let value = Self::read_value_at(&inner.file, offset)?;
            let record = Record::Set {
                key: key.clone(),
                value,
            };
            writer.write_all(&record.encode())?;
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        if sync == SyncStrategy::EveryWrite {
            file.sync_all()?;
        }
        Ok(file)
    }

    /// Close the store, releasing the file handle
    ///
    /// Consumes the store; no further operation is possible afterwards.
    pub fn close(self) -> Result<()> {
        let inner = self.inner.into_inner();
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            inner.file.sync_all()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for the CLI, tests, and debugging)
    // =========================================================================

    /// Path of the live log file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Number of currently-live keys
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    /// True when no key is live
    pub fn is_empty(&self) -> bool {
        self.inner.read().index.is_empty()
    }

    /// Current size of the log file in bytes
    pub fn log_size(&self) -> Result<u64> {
        Ok(self.inner.read().file.metadata()?.len())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sibling of the live path with an extra extension
    /// (`flintkv.db` → `flintkv.db.backup`)
    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut path = self.config.path.clone().into_os_string();
        path.push(".");
        path.push(suffix);
        PathBuf::from(path)
    }
}
