//! Candidate-week selection.
//!
//! A prior week is comparable when it sits between `min_weeks` and
//! `max_weeks` before the current week (1..=5 by default).

use serde::Deserialize;

use super::{ChartSnapshot, WeekLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Window {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

impl Default for Window {
    fn default() -> Self {
        Window {
            min_weeks: 1,
            max_weeks: 5,
        }
    }
}

/// How the caller picks the week to compare against.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// Nearest eligible week in pool order.
    Auto,
    /// A specific week, only if it falls inside the window.
    Week(WeekLabel),
    /// Taken as-is; the window is not applied.
    Explicit(&'a ChartSnapshot),
}

impl Window {
    pub fn contains(&self, current_week: u32, candidate_week: u32) -> bool {
        let diff = i64::from(current_week) - i64::from(candidate_week);
        diff >= i64::from(self.min_weeks) && diff <= i64::from(self.max_weeks)
    }

    /// Snapshots from `pool` inside the window, pool order preserved.
    pub fn eligible<'a>(&self, pool: &'a [ChartSnapshot], current_week: u32) -> Vec<&'a ChartSnapshot> {
        pool.iter()
            .filter(|s| self.contains(current_week, s.week_number()))
            .collect()
    }

    pub fn resolve<'a>(
        &self,
        pool: &'a [ChartSnapshot],
        current: &ChartSnapshot,
        selection: Selection<'a>,
    ) -> Option<&'a ChartSnapshot> {
        match selection {
            Selection::Explicit(snapshot) => Some(snapshot),
            Selection::Auto => self.eligible(pool, current.week_number()).into_iter().next(),
            Selection::Week(label) => self
                .eligible(pool, current.week_number())
                .into_iter()
                .find(|s| s.week == label),
        }
    }
}

/// Eligible candidates with the default 1..=5 week window.
pub fn eligible_candidates(pool: &[ChartSnapshot], current_week: u32) -> Vec<&ChartSnapshot> {
    Window::default().eligible(pool, current_week)
}

/// Pick the comparison snapshot with the default window.
pub fn resolve_candidate<'a>(
    pool: &'a [ChartSnapshot],
    current: &ChartSnapshot,
    selection: Selection<'a>,
) -> Option<&'a ChartSnapshot> {
    Window::default().resolve(pool, current, selection)
}
