//! Chart comparison engine.
//!
//! Compares a current snapshot against an optional prior week:
//! - Matches entries by (track title, artist), not by rank
//! - Per-entry delta and debut flag
//! - Dropped tracks, biggest gainer, top debut

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{ChartSnapshot, DerivedEntry, Entry, Movement, WeekLabel};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub chart_key: String,
    pub title: String,
    pub week: WeekLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compared_week: Option<WeekLabel>,
    /// Weeks between the two snapshots, by week number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_gap: Option<i64>,
    pub entries: Vec<DerivedEntry>,
    pub biggest_gainer: Option<DerivedEntry>,
    pub top_debut: Option<DerivedEntry>,
    pub dropped_tracks: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub risers: usize,
    pub fallers: usize,
    pub steady: usize,
    pub debuts: usize,
    pub dropped: usize,
}

/// Compare `current` against `previous`; with no previous week every entry
/// is a debut.
pub fn compare(current: &ChartSnapshot, previous: Option<&ChartSnapshot>) -> Comparison {
    let previous_entries: &[Entry] = previous.map(|p| p.entries.as_slice()).unwrap_or(&[]);

    // later duplicates overwrite earlier ones
    let mut prior_rank: HashMap<(&str, &str), u32> = HashMap::new();
    for entry in previous_entries {
        prior_rank.insert(entry.key(), entry.rank);
    }

    let entries: Vec<DerivedEntry> = current
        .entries
        .iter()
        .map(|entry| match prior_rank.get(&entry.key()) {
            Some(&prev) => DerivedEntry {
                entry: entry.clone(),
                delta: Some(i64::from(prev) - i64::from(entry.rank)),
                is_debut: false,
            },
            None => DerivedEntry {
                entry: entry.clone(),
                delta: None,
                is_debut: true,
            },
        })
        .collect();

    let mut biggest_gainer: Option<&DerivedEntry> = None;
    for derived in &entries {
        let Some(delta) = derived.delta.filter(|d| *d > 0) else { continue };
        // strict comparison keeps the first entry on ties
        if biggest_gainer.and_then(|g| g.delta).map_or(true, |best| delta > best) {
            biggest_gainer = Some(derived);
        }
    }

    let top_debut = entries.iter().find(|e| e.is_debut).cloned();

    let current_keys: HashSet<(&str, &str)> = current.entries.iter().map(Entry::key).collect();
    let dropped_tracks: Vec<Entry> = previous_entries
        .iter()
        .filter(|p| !current_keys.contains(&p.key()))
        .cloned()
        .collect();

    let compared_week = previous.map(|p| p.week);
    let week_gap = previous
        .map(|p| i64::from(current.week_number()) - i64::from(p.week_number()));

    Comparison {
        chart_key: current.chart_key.clone(),
        title: current.display_title(),
        week: current.week,
        compared_week,
        week_gap,
        biggest_gainer: biggest_gainer.cloned(),
        top_debut,
        dropped_tracks,
        entries,
    }
}

impl Comparison {
    pub fn is_comparing(&self) -> bool {
        self.compared_week.is_some()
    }

    /// The first `n` entries in chart order.
    pub fn top(&self, n: usize) -> &[DerivedEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            dropped: self.dropped_tracks.len(),
            ..Summary::default()
        };

        for entry in &self.entries {
            match entry.movement() {
                Movement::Up(_) => summary.risers += 1,
                Movement::Down(_) => summary.fallers += 1,
                Movement::Steady => summary.steady += 1,
                Movement::New => summary.debuts += 1,
            }
        }

        summary
    }

    /// Note shown under a top entry, e.g. "was #4 last week".
    pub fn label_for(&self, entry: &DerivedEntry) -> Option<String> {
        comparison_label(entry.previous_rank()?, self.week_gap)
    }
}

pub fn comparison_label(prior_rank: u32, week_gap: Option<i64>) -> Option<String> {
    match week_gap? {
        0 => None,
        1 => Some(format!("was #{prior_rank} last week")),
        gap => Some(format!("was #{prior_rank} · {gap} weeks ago")),
    }
}
