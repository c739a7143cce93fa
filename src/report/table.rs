//! Terminal rendering for chart comparisons.
//!
//! Layout follows the chart page:
//! - Heading with chart title, week and comparison state
//! - Top-N cards with "was #P last week" notes
//! - Biggest gainer and top debut
//! - Ranked rows with movement, then the dropped list
//!
//! The overview condenses every lane into one block with its movement counts.

use std::fmt::Write;

use crate::chart::compare::Comparison;
use crate::chart::PLACEHOLDER;
use crate::util::{format_movement, truncate};

pub fn render(comparison: &Comparison, top_n: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "\n{}", comparison.title);
    let week_of = comparison
        .week
        .start_date()
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| comparison.week.to_string());
    let _ = writeln!(output, "Week of {week_of} ({})", comparison.week);

    match comparison.compared_week {
        Some(prev) => {
            let _ = writeln!(output, "Comparing with {prev}");
        }
        None => {
            let _ = writeln!(output, "Current week");
        }
    }

    if comparison.entries.is_empty() {
        output.push_str("\nNo entries this week.\n");
        render_dropped(comparison, &mut output);
        return output;
    }

    output.push('\n');
    for entry in comparison.top(top_n) {
        let _ = write!(
            output,
            "  Top #{:<3} {} / {}",
            entry.entry.rank, entry.entry.track_title, entry.entry.artist
        );
        if let Some(label) = comparison.label_for(entry) {
            let _ = write!(output, "  ({label})");
        }
        output.push('\n');
    }

    let gainer = comparison
        .biggest_gainer
        .as_ref()
        .map(|g| format!("{} {}", g.entry.track_title, format_movement(g)))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let debut = comparison
        .top_debut
        .as_ref()
        .map(|d| format!("{} NEW", d.entry.track_title))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let _ = writeln!(output, "\n  Biggest Gainer: {gainer}");
    let _ = writeln!(output, "  Top Debut:      {debut}");

    let _ = writeln!(output, "\n{:<6} {:30} {:24} {:>6}", "Rank", "Track", "Artist", "Move");
    output.push_str(&"-".repeat(69));
    output.push('\n');

    for entry in &comparison.entries {
        let _ = writeln!(
            output,
            "{:<6} {:30} {:24} {:>6}",
            format!("#{}", entry.entry.rank),
            truncate(&entry.entry.track_title, 30),
            truncate(&entry.entry.artist, 24),
            format_movement(entry)
        );
    }

    render_dropped(comparison, &mut output);
    output
}

pub fn render_overview(comparisons: &[Comparison], top_n: usize) -> String {
    let mut output = String::new();

    if comparisons.is_empty() {
        output.push_str("No charts stored. Run 'chartwave import' to add some.\n");
        return output;
    }

    output.push_str("\nCharts Overview\n");
    output.push_str(&"=".repeat(69));
    output.push('\n');

    for comparison in comparisons {
        let compared = comparison
            .compared_week
            .map(|w| format!("vs {w}"))
            .unwrap_or_else(|| "current week".to_string());
        let _ = writeln!(output, "\n{}  {} ({compared})", comparison.title, comparison.week);

        if comparison.entries.is_empty() {
            output.push_str("  No entries this week.\n");
        }

        for entry in comparison.top(top_n) {
            let _ = writeln!(
                output,
                "  {:<5} {:30} {:24} {:>6}",
                format!("#{}", entry.entry.rank),
                truncate(&entry.entry.track_title, 30),
                truncate(&entry.entry.artist, 24),
                format_movement(entry)
            );
        }

        let gainer = comparison
            .biggest_gainer
            .as_ref()
            .map(|g| format!("{} {}", g.entry.track_title, format_movement(g)))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let debut = comparison
            .top_debut
            .as_ref()
            .map(|d| format!("{} (#{})", d.entry.track_title, d.entry.rank))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let _ = writeln!(output, "  Biggest Gainer: {gainer}");
        let _ = writeln!(output, "  Highest Debut:  {debut}");

        let summary = comparison.summary();
        let _ = writeln!(
            output,
            "  {} up, {} down, {} new, {} dropped",
            summary.risers, summary.fallers, summary.debuts, summary.dropped
        );

        if !comparison.dropped_tracks.is_empty() {
            let titles: Vec<&str> = comparison
                .dropped_tracks
                .iter()
                .map(|d| d.track_title.as_str())
                .collect();
            let _ = writeln!(output, "  Dropped: {}", titles.join(", "));
        }
    }

    output
}

fn render_dropped(comparison: &Comparison, output: &mut String) {
    if comparison.dropped_tracks.is_empty() {
        return;
    }

    output.push_str("\nDropped This Week\n");
    for dropped in &comparison.dropped_tracks {
        let _ = writeln!(output, "  {} {PLACEHOLDER} {}", dropped.track_title, dropped.artist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::compare::compare;
    use crate::chart::{ChartSnapshot, Entry};

    fn scenario() -> Comparison {
        let previous = ChartSnapshot::new(
            "hip-hop",
            "2026-W09".parse().unwrap(),
            vec![Entry::new(1, "A", "X"), Entry::new(2, "B", "Y"), Entry::new(3, "C", "Z")],
        );
        let current = ChartSnapshot::new(
            "hip-hop",
            "2026-W10".parse().unwrap(),
            vec![Entry::new(1, "B", "Y"), Entry::new(2, "D", "W"), Entry::new(3, "A", "X")],
        );
        compare(&current, Some(&previous))
    }

    #[test]
    fn renders_movement_and_dropped() {
        let output = render(&scenario(), 3);

        assert!(output.contains("Hip Hop"));
        assert!(output.contains("Comparing with 2026-W09"));
        assert!(output.contains("(was #2 last week)"));
        assert!(output.contains("Biggest Gainer: B ▲ 1"));
        assert!(output.contains("Top Debut:      D NEW"));
        assert!(output.contains("▼ 2"));
        assert!(output.contains("Dropped This Week"));
        assert!(output.contains("C — Z"));
    }

    #[test]
    fn current_only_has_no_gainer() {
        let current = ChartSnapshot::new("gospel", "2026-W10".parse().unwrap(), vec![Entry::new(1, "A", "X")]);
        let output = render(&compare(&current, None), 3);

        assert!(output.contains("Current week"));
        assert!(output.contains("Biggest Gainer: —"));
        assert!(!output.contains("Dropped"));
    }

    #[test]
    fn empty_chart() {
        let current = ChartSnapshot::new("gospel", "2026-W10".parse().unwrap(), Vec::new());
        let output = render(&compare(&current, None), 3);
        assert!(output.contains("No entries this week."));
    }

    #[test]
    fn overview_block_per_lane() {
        let gospel = ChartSnapshot::new("gospel", "2026-W10".parse().unwrap(), Vec::new());
        let output = render_overview(&[scenario(), compare(&gospel, None)], 5);

        assert!(output.contains("Hip Hop  2026-W10 (vs 2026-W09)"));
        assert!(output.contains("Highest Debut:  D (#2)"));
        assert!(output.contains("1 up, 1 down, 1 new, 1 dropped"));
        assert!(output.contains("Dropped: C"));
        assert!(output.contains("Gospel  2026-W10 (current week)"));
        assert!(output.contains("No entries this week."));
    }

    #[test]
    fn overview_without_charts() {
        assert!(render_overview(&[], 5).contains("No charts stored."));
    }
}
