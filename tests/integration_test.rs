use std::fs;

use chartwave::chart::window::{Selection, Window};
use chartwave::chart::PLACEHOLDER;
use chartwave::config::Config;
use chartwave::store::Store;
use chartwave::{compare, ingest, overview, report, resolve_candidate, Entry};

const WEEKS: &str = r#"{"docs": [
    {"chartKey": "hip-hop", "week": "2026-W04", "slug": "hip-hop-2026-W04", "entries": [
        {"rank": 1, "trackTitle": "Old Hit", "artist": "Vet"}
    ]},
    {"chartKey": "hip-hop", "week": "2026-W08", "slug": "hip-hop-2026-W08", "entries": [
        {"rank": 1, "trackTitle": "A", "artist": "X"},
        {"rank": 2, "trackTitle": "B", "artist": "Y"},
        {"rank": 3, "trackTitle": "C", "artist": "Z"}
    ]},
    {"chartKey": "hip-hop", "week": "2026-W09", "slug": "hip-hop-2026-W09", "entries": [
        {"rank": 1, "trackTitle": "A", "artist": "X"},
        {"rank": 2, "trackTitle": "B", "artist": "Y"},
        {"rank": 3, "trackTitle": "C", "artist": "Z"}
    ]},
    {"chartKey": "hip-hop", "week": "2026-W10", "slug": "hip-hop-2026-W10", "entries": [
        {"rank": 1, "trackTitle": "B", "artist": "Y"},
        {"rank": 2, "trackTitle": "D", "artist": "W"},
        {"rank": 3, "trackTitle": "A", "artist": "X"},
        {"rank": 4, "artist": "Anonymous"}
    ]},
    {"chartKey": "gospel", "week": "2026-W09", "entries": []}
]}"#;

fn seeded_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("weeks.json");
    fs::write(&payload, WEEKS).unwrap();

    let mut store = Store::open_at(&dir.path().join("charts.db")).unwrap();
    let result = ingest::load_file(&payload, PLACEHOLDER).unwrap();
    assert!(result.diagnostics.is_empty());

    for snapshot in &result.snapshots {
        store.save_snapshot(snapshot).unwrap();
    }

    (dir, store)
}

#[test]
fn import_then_auto_compare_against_previous_week() {
    let (_dir, store) = seeded_store();

    let current = store.latest_snapshot("hip-hop").unwrap().unwrap();
    let pool = store.load_pool("hip-hop").unwrap();
    let previous = resolve_candidate(&pool, &current, Selection::Auto);

    assert_eq!(previous.map(|p| p.week.to_string()).as_deref(), Some("2026-W09"));

    let result = compare(&current, previous);

    let deltas: Vec<Option<i64>> = result.entries.iter().map(|e| e.delta).collect();
    assert_eq!(deltas, vec![Some(1), None, Some(-2), None]);
    assert_eq!(result.entries[3].entry, Entry::new(4, PLACEHOLDER, "Anonymous"));
    assert_eq!(result.dropped_tracks, vec![Entry::new(3, "C", "Z")]);
    assert_eq!(result.biggest_gainer.as_ref().unwrap().entry.track_title, "B");
    assert_eq!(result.top_debut.as_ref().unwrap().entry.track_title, "D");
    assert_eq!(result.week_gap, Some(1));
}

#[test]
fn named_week_respects_window() {
    let (_dir, store) = seeded_store();

    let current = store.latest_snapshot("hip-hop").unwrap().unwrap();
    let pool = store.load_pool("hip-hop").unwrap();

    let two_back = resolve_candidate(&pool, &current, Selection::Week("2026-W08".parse().unwrap()));
    assert_eq!(two_back.map(|p| p.week.week), Some(8));

    // six weeks back is outside 1..=5
    let six_back = resolve_candidate(&pool, &current, Selection::Week("2026-W04".parse().unwrap()));
    assert!(six_back.is_none());

    let result = compare(&current, two_back);
    assert_eq!(result.label_for(&result.entries[0]).as_deref(), Some("was #2 · 2 weeks ago"));
}

#[test]
fn explicit_previous_is_not_windowed() {
    let (_dir, store) = seeded_store();

    let current = store.latest_snapshot("hip-hop").unwrap().unwrap();
    let far = store.get_snapshot("hip-hop", "2026-W04".parse().unwrap()).unwrap().unwrap();

    let previous = Window::default().resolve(&[], &current, Selection::Explicit(&far));
    let result = compare(&current, previous);

    assert_eq!(result.week_gap, Some(6));
    assert_eq!(result.dropped_tracks, vec![Entry::new(1, "Old Hit", "Vet")]);
    assert!(result.entries.iter().all(|e| e.is_debut));
}

#[test]
fn config_window_widens_candidates() {
    let (_dir, store) = seeded_store();
    let config = Config::parse("[window]\nmax_weeks = 6\n").unwrap();

    let current = store.latest_snapshot("hip-hop").unwrap().unwrap();
    let pool = store.load_pool("hip-hop").unwrap();

    let weeks: Vec<u32> = config
        .window
        .eligible(&pool, current.week_number())
        .iter()
        .map(|s| s.week_number())
        .collect();

    assert_eq!(weeks, vec![9, 8, 4]);
}

#[test]
fn json_report_for_stored_weeks() {
    let (_dir, store) = seeded_store();

    let current = store.latest_snapshot("hip-hop").unwrap().unwrap();
    let pool = store.load_pool("hip-hop").unwrap();
    let result = compare(&current, resolve_candidate(&pool, &current, Selection::Auto));

    let value: serde_json::Value = serde_json::from_str(&report::json::render(&result).unwrap()).unwrap();

    assert_eq!(value["chartKey"], "hip-hop");
    assert_eq!(value["biggestGainer"]["trackTitle"], "B");
    assert_eq!(value["summary"]["dropped"], 1);
}

#[test]
fn overview_compares_latest_week_of_every_lane() {
    let (_dir, store) = seeded_store();

    let lanes = overview::latest_comparisons(&store, &Window::default()).unwrap();

    let keys: Vec<&str> = lanes.iter().map(|c| c.chart_key.as_str()).collect();
    assert_eq!(keys, vec!["gospel", "hip-hop"]);

    let gospel = &lanes[0];
    assert!(!gospel.is_comparing());
    assert!(gospel.entries.is_empty());

    let hip_hop = &lanes[1];
    assert_eq!(hip_hop.compared_week.map(|w| w.to_string()).as_deref(), Some("2026-W09"));
    let summary = hip_hop.summary();
    assert_eq!((summary.risers, summary.fallers, summary.debuts, summary.dropped), (1, 1, 2, 1));

    let table = report::table::render_overview(&lanes, 5);
    assert!(table.contains("Gospel  2026-W09 (current week)"));
    assert!(table.contains("Hip Hop  2026-W10 (vs 2026-W09)"));
    assert!(table.contains("1 up, 1 down, 2 new, 1 dropped"));
    assert!(table.contains("Dropped: C"));
}

#[test]
fn later_year_weeks_are_never_the_prior_week() {
    let (dir, mut store) = seeded_store();

    let next_year = dir.path().join("next.json");
    fs::write(
        &next_year,
        r#"{"chartKey": "hip-hop", "week": "2027-W08", "entries": [{"rank": 1, "trackTitle": "Future", "artist": "F"}]}"#,
    )
    .unwrap();
    for snapshot in ingest::load_file(&next_year, PLACEHOLDER).unwrap().snapshots {
        store.save_snapshot(&snapshot).unwrap();
    }

    let current = store.get_snapshot("hip-hop", "2026-W10".parse().unwrap()).unwrap().unwrap();
    let pool = store.load_pool_before("hip-hop", current.week).unwrap();
    let previous = resolve_candidate(&pool, &current, Selection::Auto);

    assert_eq!(previous.map(|p| p.week.to_string()).as_deref(), Some("2026-W09"));

    // the full pool still holds the later week
    assert_eq!(store.load_pool("hip-hop").unwrap()[0].week.to_string(), "2027-W08");
}

#[test]
fn payload_with_malformed_entries_still_imports() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("mixed.json");
    fs::write(
        &payload,
        r#"{"docs": [
            {"chartKey": "gospel", "week": "2026-W09", "entries": [{"rank": 1, "trackTitle": "A", "artist": "X"}]},
            {"chartKey": "gospel", "week": "2026-W10", "entries": {"oops": true}}
        ]}"#,
    )
    .unwrap();

    let result = ingest::load_file(&payload, PLACEHOLDER).unwrap();

    assert!(result.diagnostics.is_empty());
    assert_eq!(result.snapshots.len(), 2);
    assert!(result.snapshots[1].entries.is_empty());
}
