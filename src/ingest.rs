//! CMS payload ingestion.
//!
//! Chart documents arrive as loosely-shaped JSON. They are validated and
//! normalized here, once, into [`ChartSnapshot`]s:
//! - Accepts a single document, a `{ "docs": [...] }` page, or a bare array
//! - Missing track titles and artists become the placeholder
//! - Entries are ordered by rank; non-positive or non-integer ranks are skipped
//! - An `entries` value that is not an array counts as no entries
//!
//! A document that fails validation is reported as a diagnostic and the rest
//! of the payload still loads. Only malformed JSON fails the whole payload.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::chart::{week_number_from_slug, ChartSnapshot, Entry, WeekLabel};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChartPayload {
    Page { docs: Vec<Value> },
    Many(Vec<Value>),
    One(Value),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChart {
    pub chart_key: Option<String>,
    pub week: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub rank: Option<Value>,
    pub track_title: Option<String>,
    pub artist: Option<String>,
}

pub struct IngestResult {
    pub snapshots: Vec<ChartSnapshot>,
    pub diagnostics: Vec<String>,
}

impl ChartPayload {
    pub fn into_docs(self) -> Vec<Value> {
        match self {
            ChartPayload::Page { docs } => docs,
            ChartPayload::Many(docs) => docs,
            ChartPayload::One(doc) => vec![doc],
        }
    }
}

impl IngestResult {
    /// Take the chart for `chart_key`, or the first chart when the lane is absent.
    pub fn take_for_lane(&mut self, chart_key: &str) -> Option<ChartSnapshot> {
        if self.snapshots.is_empty() {
            return None;
        }

        let index = match self.snapshots.iter().position(|s| s.chart_key == chart_key) {
            Some(index) => index,
            None => {
                tracing::warn!(
                    expected = chart_key,
                    found = %self.snapshots[0].chart_key,
                    "no chart for this lane in payload, using its first chart"
                );
                0
            }
        };

        Some(self.snapshots.remove(index))
    }
}

/// Entries of a document; anything but an array is empty.
fn raw_entries(value: Value) -> Vec<RawEntry> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::debug!(entries = %other, "entries is not an array, treating as empty");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}

/// Validate one chart document.
pub fn normalize(raw: RawChart, placeholder: &str) -> Result<ChartSnapshot> {
    let chart_key = raw
        .chart_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(Error::MissingField { field: "chartKey" })?;

    let week: WeekLabel = raw
        .week
        .ok_or(Error::MissingField { field: "week" })?
        .parse()?;

    if let Some(slug_week) = raw.slug.as_deref().and_then(week_number_from_slug) {
        if slug_week != week.week {
            tracing::warn!(
                chart = %chart_key,
                %week,
                slug_week,
                "slug week number disagrees with week label, using label"
            );
        }
    }

    let mut entries = Vec::new();
    let mut seen_ranks = HashSet::new();

    for raw_entry in raw_entries(raw.entries) {
        let rank = match raw_entry.rank.as_ref().and_then(Value::as_i64).map(u32::try_from) {
            Some(Ok(rank)) if rank > 0 => rank,
            other => {
                tracing::debug!(chart = %chart_key, %week, rank = ?other, "skipping entry without a usable rank");
                continue;
            }
        };

        if !seen_ranks.insert(rank) {
            return Err(Error::DuplicateRank {
                chart_key,
                week: week.to_string(),
                rank,
            });
        }

        entries.push(Entry {
            rank,
            track_title: raw_entry.track_title.unwrap_or_else(|| placeholder.to_string()),
            artist: raw_entry.artist.unwrap_or_else(|| placeholder.to_string()),
        });
    }

    entries.sort_by_key(|e| e.rank);

    Ok(ChartSnapshot {
        chart_key,
        week,
        title: raw.title,
        slug: raw.slug,
        entries,
    })
}

pub fn parse_payload(text: &str, placeholder: &str) -> Result<IngestResult> {
    let payload: ChartPayload = serde_json::from_str(text)?;

    let mut snapshots = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, doc) in payload.into_docs().into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawChart>(doc)
            .map_err(Error::from)
            .and_then(|raw| normalize(raw, placeholder));

        match parsed {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping chart document");
                diagnostics.push(format!("document {index}: {e}"));
            }
        }
    }

    Ok(IngestResult { snapshots, diagnostics })
}

pub fn load_file(path: &Path, placeholder: &str) -> Result<IngestResult> {
    let text = fs::read_to_string(path)?;
    let mut result = parse_payload(&text, placeholder)?;

    for diagnostic in &mut result.diagnostics {
        *diagnostic = format!("{}: {diagnostic}", path.display());
    }

    tracing::debug!(
        path = %path.display(),
        snapshots = result.snapshots.len(),
        "loaded chart payload"
    );
    Ok(result)
}
