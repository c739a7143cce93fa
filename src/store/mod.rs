//! SQLite snapshot storage.
//!
//! Persists ingested chart weeks to a local SQLite database with two tables:
//! - snapshots: id, chart_key, year, week_number, slug, title, imported_at
//! - entries: snapshot_id, rank, track_title, artist
//!
//! Supports:
//! - Re-importing a week (replaces the earlier copy)
//! - Listing snapshots, newest week first
//! - Loading one week, the latest week, or a chart's pool of earlier weeks
//! - Listing the chart lanes present

pub mod snapshot;

pub use snapshot::{default_db_path, SnapshotRecord, Store};
