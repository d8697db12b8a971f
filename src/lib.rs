//! # FlintKV
//!
//! A single-file, embedded key-value store with:
//! - An append-only binary record log as the sole source of truth
//! - An in-memory index rebuilt by full log replay at open
//! - Readers-writer locking for in-process concurrency
//! - Online compaction ("polish") with atomic file replacement
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                                │
//! │              (RwLock over file + index)                      │
//! └───────────────┬─────────────────────────┬───────────────────┘
//!                 │                         │
//!                 ▼                         ▼
//!        ┌───────────────┐         ┌───────────────┐
//!        │  Record Log   │         │     Index     │
//!        │ (append-only) │────────▶│   (HashMap)   │
//!        └───────────────┘  replay └───────────────┘
//! ```
//!
//! The log is authoritative: replaying it from offset 0 always yields
//! the current index. The index is derived, rebuildable state mapping
//! each live key to the offset of its latest value-length field.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod log;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SyncStrategy};
pub use error::{FlintError, Result};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FlintKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
