use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::chart::{ChartSnapshot, Entry, WeekLabel};
use crate::error::{Error, Result};

/// Snapshot metadata stored in database
#[derive(Debug)]
pub struct SnapshotRecord {
    pub id: i64,
    pub chart_key: String,
    pub week: WeekLabel,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub entry_count: usize,
    pub imported_at: i64,
}

/// Get the database path (~/.local/share/chartwave/chartwave.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = directories::ProjectDirs::from("", "", "chartwave")
        .ok_or(Error::DataDir("data"))?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("chartwave.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chart_key TEXT NOT NULL,
            year INTEGER NOT NULL,
            week_number INTEGER NOT NULL,
            slug TEXT,
            title TEXT,
            imported_at INTEGER NOT NULL,
            UNIQUE(chart_key, year, week_number)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            snapshot_id INTEGER NOT NULL,
            rank INTEGER NOT NULL,
            track_title TEXT NOT NULL,
            artist TEXT NOT NULL,
            FOREIGN KEY(snapshot_id) REFERENCES snapshots(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_snapshot_id ON entries(snapshot_id)",
        [],
    )?;

    Ok(())
}

const SELECT_RECORD: &str =
    "SELECT s.id, s.chart_key, s.year, s.week_number, s.slug, s.title, s.imported_at,
            (SELECT COUNT(*) FROM entries e WHERE e.snapshot_id = s.id)
     FROM snapshots s";

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database at the default data location.
    pub fn open() -> Result<Self> {
        Store::open_at(&default_db_path()?)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened snapshot store");
        Ok(Store { conn })
    }

    /// Save a snapshot, replacing any earlier import of the same chart week.
    pub fn save_snapshot(&mut self, snapshot: &ChartSnapshot) -> Result<i64> {
        let imported_at = chrono::Utc::now().timestamp();

        let tx = self.conn.transaction()?;

        let replaced = tx.execute(
            "DELETE FROM snapshots WHERE chart_key = ?1 AND year = ?2 AND week_number = ?3",
            params![snapshot.chart_key, snapshot.week.year, snapshot.week.week],
        )?;

        tx.execute(
            "INSERT INTO snapshots (chart_key, year, week_number, slug, title, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.chart_key,
                snapshot.week.year,
                snapshot.week.week,
                snapshot.slug.as_deref(),
                snapshot.title.as_deref(),
                imported_at
            ],
        )?;

        let snapshot_id = tx.last_insert_rowid();

        let mut stmt = tx.prepare_cached(
            "INSERT INTO entries (snapshot_id, rank, track_title, artist)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for entry in &snapshot.entries {
            stmt.execute(params![snapshot_id, entry.rank, entry.track_title, entry.artist])?;
        }

        drop(stmt);
        tx.commit()?;

        tracing::info!(
            chart = %snapshot.chart_key,
            week = %snapshot.week,
            entries = snapshot.entries.len(),
            replaced = replaced > 0,
            "saved snapshot"
        );

        Ok(snapshot_id)
    }

    /// List snapshots, newest week first, optionally for one chart
    pub fn list_snapshots(&self, chart_key: Option<&str>) -> Result<Vec<SnapshotRecord>> {
        let sql = format!(
            "{SELECT_RECORD}
             WHERE ?1 IS NULL OR s.chart_key = ?1
             ORDER BY s.year DESC, s.week_number DESC, s.chart_key ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![chart_key], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        records.into_iter().collect()
    }

    pub fn get_snapshot(&self, chart_key: &str, week: WeekLabel) -> Result<Option<ChartSnapshot>> {
        let sql = format!("{SELECT_RECORD} WHERE s.chart_key = ?1 AND s.year = ?2 AND s.week_number = ?3");

        let record = self
            .conn
            .query_row(&sql, params![chart_key, week.year, week.week], record_from_row)
            .optional()?
            .transpose()?;

        record.map(|r| self.load(r)).transpose()
    }

    /// Get the most recent week stored for a chart
    pub fn latest_snapshot(&self, chart_key: &str) -> Result<Option<ChartSnapshot>> {
        let sql = format!(
            "{SELECT_RECORD} WHERE s.chart_key = ?1
             ORDER BY s.year DESC, s.week_number DESC
             LIMIT 1"
        );

        let record = self
            .conn
            .query_row(&sql, params![chart_key], record_from_row)
            .optional()?
            .transpose()?;

        record.map(|r| self.load(r)).transpose()
    }

    /// Every stored week of one chart, newest first.
    pub fn load_pool(&self, chart_key: &str) -> Result<Vec<ChartSnapshot>> {
        self.list_snapshots(Some(chart_key))?
            .into_iter()
            .map(|r| self.load(r))
            .collect()
    }

    /// Stored weeks of one chart strictly before `week`, newest first.
    pub fn load_pool_before(&self, chart_key: &str, week: WeekLabel) -> Result<Vec<ChartSnapshot>> {
        self.list_snapshots(Some(chart_key))?
            .into_iter()
            .filter(|r| r.week < week)
            .map(|r| self.load(r))
            .collect()
    }

    /// Distinct chart lanes with at least one stored week.
    pub fn chart_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT chart_key FROM snapshots ORDER BY chart_key ASC")?;

        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(keys)
    }

    fn load(&self, record: SnapshotRecord) -> Result<ChartSnapshot> {
        let entries = self.load_entries(record.id)?;

        Ok(ChartSnapshot {
            chart_key: record.chart_key,
            week: record.week,
            title: record.title,
            slug: record.slug,
            entries,
        })
    }

    fn load_entries(&self, snapshot_id: i64) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, track_title, artist
             FROM entries
             WHERE snapshot_id = ?1
             ORDER BY rank ASC",
        )?;

        let entries = stmt
            .query_map(params![snapshot_id], |row| {
                Ok(Entry {
                    rank: row.get(0)?,
                    track_title: row.get(1)?,
                    artist: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }
}

/// Outer error is a column read failure; inner error is an invalid week.
fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<Result<SnapshotRecord>> {
    let id: i64 = row.get(0)?;
    let chart_key: String = row.get(1)?;
    let year: i32 = row.get(2)?;
    let week_number: u32 = row.get(3)?;
    let slug: Option<String> = row.get(4)?;
    let title: Option<String> = row.get(5)?;
    let imported_at: i64 = row.get(6)?;
    let entry_count: i64 = row.get(7)?;

    Ok(WeekLabel::new(year, week_number).map(|week| SnapshotRecord {
        id,
        chart_key,
        week,
        slug,
        title,
        entry_count: usize::try_from(entry_count).unwrap_or(0),
        imported_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::window::{resolve_candidate, Selection};

    fn snapshot(key: &str, week: &str, titles: &[&str]) -> ChartSnapshot {
        let entries = titles
            .iter()
            .enumerate()
            .map(|(i, t)| Entry::new(i as u32 + 1, *t, "Artist"))
            .collect();
        ChartSnapshot::new(key, week.parse().unwrap(), entries)
    }

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_get_round_trip() {
        let (_dir, mut store) = temp_store();
        let mut original = snapshot("hip-hop", "2026-W10", &["A", "B", "C"]);
        original.title = Some("Hip-Hop".into());
        original.slug = Some("hip-hop-2026-W10".into());

        store.save_snapshot(&original).unwrap();
        let loaded = store.get_snapshot("hip-hop", original.week).unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn get_missing_returns_none() {
        let (_dir, store) = temp_store();
        let week = "2026-W10".parse().unwrap();
        assert!(store.get_snapshot("hip-hop", week).unwrap().is_none());
        assert!(store.latest_snapshot("hip-hop").unwrap().is_none());
    }

    #[test]
    fn reimport_replaces_week() {
        let (_dir, mut store) = temp_store();
        store.save_snapshot(&snapshot("gospel", "2026-W10", &["Old"])).unwrap();
        store.save_snapshot(&snapshot("gospel", "2026-W10", &["New", "Newer"])).unwrap();

        let records = store.list_snapshots(Some("gospel")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry_count, 2);

        let loaded = store.get_snapshot("gospel", records[0].week).unwrap().unwrap();
        assert_eq!(loaded.entries[0].track_title, "New");
    }

    #[test]
    fn pool_is_newest_first_and_per_chart() {
        let (_dir, mut store) = temp_store();
        for week in ["2025-W52", "2026-W02", "2026-W01"] {
            store.save_snapshot(&snapshot("hitlist", week, &["A"])).unwrap();
        }
        store.save_snapshot(&snapshot("gospel", "2026-W03", &["G"])).unwrap();

        let pool = store.load_pool("hitlist").unwrap();
        let weeks: Vec<String> = pool.iter().map(|s| s.week.to_string()).collect();

        assert_eq!(weeks, vec!["2026-W02", "2026-W01", "2025-W52"]);
        assert_eq!(store.latest_snapshot("hitlist").unwrap().unwrap().week.to_string(), "2026-W02");
        assert_eq!(store.list_snapshots(None).unwrap().len(), 4);
    }

    #[test]
    fn pool_before_excludes_current_and_later_years() {
        let (_dir, mut store) = temp_store();
        for week in ["2026-W09", "2026-W10", "2027-W08"] {
            store.save_snapshot(&snapshot("hip-hop", week, &["A"])).unwrap();
        }

        let current = store.get_snapshot("hip-hop", "2026-W10".parse().unwrap()).unwrap().unwrap();
        let pool = store.load_pool_before("hip-hop", current.week).unwrap();

        let weeks: Vec<String> = pool.iter().map(|s| s.week.to_string()).collect();
        assert_eq!(weeks, vec!["2026-W09"]);

        let picked = resolve_candidate(&pool, &current, Selection::Auto).unwrap();
        assert_eq!(picked.week.to_string(), "2026-W09");
    }

    #[test]
    fn chart_keys_are_distinct_and_sorted() {
        let (_dir, mut store) = temp_store();
        assert!(store.chart_keys().unwrap().is_empty());

        for (key, week) in [("hitlist", "2026-W09"), ("gospel", "2026-W09"), ("hitlist", "2026-W10")] {
            store.save_snapshot(&snapshot(key, week, &["A"])).unwrap();
        }

        assert_eq!(store.chart_keys().unwrap(), vec!["gospel", "hitlist"]);
    }

    #[test]
    fn entries_load_in_rank_order() {
        let (_dir, mut store) = temp_store();
        let mut s = snapshot("hitlist", "2026-W05", &[]);
        s.entries = vec![Entry::new(2, "Two", "b"), Entry::new(1, "One", "a")];
        store.save_snapshot(&s).unwrap();

        let loaded = store.latest_snapshot("hitlist").unwrap().unwrap();
        assert_eq!(loaded.entries[0].rank, 1);
    }
}
