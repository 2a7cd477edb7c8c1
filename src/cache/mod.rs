//! Local movie cache for offline support.
//!
//! This module provides:
//! - The `CacheStore` contract (trending batch + per-movie details, each row stamped)
//! - A SQLite implementation with change notification for the trending subset
//! - An injectable `Clock` used to stamp rows and judge freshness

mod storage;
mod traits;

pub use storage::SqliteStorage;
pub use traits::{CacheStore, CachedAt, Clock, SystemClock};
