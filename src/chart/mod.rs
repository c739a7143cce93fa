//! Weekly chart data model.
//!
//! A chart lane (hip-hop, gospel, ...) publishes one ranked snapshot per ISO
//! week. Entries are matched across weeks by (track title, artist), exact and
//! case-sensitive.

pub mod compare;
pub mod window;

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder shown for a missing track title or artist.
pub const PLACEHOLDER: &str = "—";

/// ISO week label in `YYYY-Www` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekLabel {
    pub year: i32,
    pub week: u32,
}

impl WeekLabel {
    pub fn new(year: i32, week: u32) -> Result<Self> {
        // rejects week 0, and week 53 in years that only have 52
        if NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_none() {
            return Err(Error::InvalidWeek(format!("{year:04}-W{week:02}")));
        }
        Ok(WeekLabel { year, week })
    }

    /// Monday of the week, used for "Week of" headings.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidWeek(s.to_string());

        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;

        WeekLabel::new(year, week).map_err(|_| invalid())
    }
}

impl Serialize for WeekLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Week ordinal from a CMS slug ending in `-Wnn`, e.g. `hip-hop-2026-W10`.
///
/// Exactly two digits are required; `-W00` yields `None`.
pub fn week_number_from_slug(slug: &str) -> Option<u32> {
    let idx = slug.len().checked_sub(4)?;
    let tail = slug.get(idx..)?;
    let digits = tail.strip_prefix("-W")?;

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// One chart position in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub rank: u32,
    pub track_title: String,
    pub artist: String,
}

impl Entry {
    pub fn new(rank: u32, track_title: impl Into<String>, artist: impl Into<String>) -> Self {
        Entry {
            rank,
            track_title: track_title.into(),
            artist: artist.into(),
        }
    }

    /// Identity used to match an entry across two snapshots.
    pub fn key(&self) -> (&str, &str) {
        (&self.track_title, &self.artist)
    }
}

/// One published week of one chart lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub chart_key: String,
    pub week: WeekLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub entries: Vec<Entry>,
}

impl ChartSnapshot {
    pub fn new(chart_key: impl Into<String>, week: WeekLabel, entries: Vec<Entry>) -> Self {
        ChartSnapshot {
            chart_key: chart_key.into(),
            week,
            title: None,
            slug: None,
            entries,
        }
    }

    /// Numeric week used for candidate selection. The year is not considered.
    pub fn week_number(&self) -> u32 {
        self.week.week
    }

    /// Title for display, derived from the chart key when the CMS sent none.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| crate::util::titleize(&self.chart_key))
    }
}

/// An entry of the current snapshot with its movement against a prior week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    /// `prior rank - current rank`; positive means the track climbed.
    pub delta: Option<i64>,
    pub is_debut: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up(u64),
    Down(u64),
    Steady,
    New,
}

impl DerivedEntry {
    pub fn movement(&self) -> Movement {
        if self.is_debut {
            return Movement::New;
        }
        match self.delta {
            Some(d) if d > 0 => Movement::Up(d.unsigned_abs()),
            Some(d) if d < 0 => Movement::Down(d.unsigned_abs()),
            _ => Movement::Steady,
        }
    }

    /// Rank held in the compared week, if the track charted there.
    pub fn previous_rank(&self) -> Option<u32> {
        self.delta
            .and_then(|d| u32::try_from(i64::from(self.entry.rank) + d).ok())
    }
}
