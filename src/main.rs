use std::path::Path;
use std::thread;
use std::time::Duration;

use clap::Parser;
use chartwave::chart::window::Selection;
use chartwave::chart::{ChartSnapshot, WeekLabel};
use chartwave::cli::{
    CandidatesArgs, CompareArgs, Cli, Command, GlobalArgs, ImportArgs, ListArgs, NowPlayingArgs, OverviewArgs,
};
use chartwave::config::Config;
use chartwave::error::{Error, Result};
use chartwave::ingest;
use chartwave::nowplaying::{self, FileSource, PayloadFormat, Poller, StationPayload};
use chartwave::overview;
use chartwave::report;
use chartwave::store::Store;
use chartwave::compare;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "chartwave=debug" } else { "chartwave=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(global: &GlobalArgs, config: &Config) -> Result<Store> {
    match global.db.as_deref().or(config.db_path.as_deref()) {
        Some(path) => Store::open_at(path),
        None => Store::open(),
    }
}

fn parse_week(raw: Option<&str>) -> Result<Option<WeekLabel>> {
    raw.map(str::parse).transpose()
}

/// Current week from the store: the named week, or the latest one.
fn stored_week(store: &Store, chart: &str, week: Option<WeekLabel>) -> Result<ChartSnapshot> {
    let found = match week {
        Some(week) => store.get_snapshot(chart, week)?,
        None => store.latest_snapshot(chart)?,
    };

    found.ok_or_else(|| match week {
        Some(week) => Error::NotFound(format!("{chart} {week}")),
        None => Error::NotFound(format!("{chart} (no weeks imported)")),
    })
}

/// Pick a chart out of a payload file, matching chart and week when given.
fn chart_from_file(
    path: &Path,
    config: &Config,
    verbose: bool,
    chart: Option<&str>,
    week: Option<WeekLabel>,
) -> Result<ChartSnapshot> {
    let result = ingest::load_file(path, &config.placeholder)?;
    report::print_diagnostics(&result.diagnostics, verbose);

    result
        .snapshots
        .into_iter()
        .find(|s| chart.map_or(true, |c| s.chart_key == c) && week.map_or(true, |w| s.week == w))
        .ok_or_else(|| Error::NotFound(format!("no matching chart in {}", path.display())))
}

/// Explicit comparison chart: same lane if the file has it, else the first chart.
fn previous_from_file(path: &Path, config: &Config, verbose: bool, chart: &str) -> Result<ChartSnapshot> {
    let mut result = ingest::load_file(path, &config.placeholder)?;
    report::print_diagnostics(&result.diagnostics, verbose);

    result
        .take_for_lane(chart)
        .ok_or_else(|| Error::NotFound(format!("no chart in {}", path.display())))
}

fn run_import(args: &ImportArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let mut store = open_store(global, config)?;
    let mut diagnostics = Vec::new();
    let mut imported = 0usize;

    for path in &args.files {
        let result = match ingest::load_file(path, &config.placeholder) {
            Ok(result) => result,
            Err(e) => {
                diagnostics.push(format!("{}: {e}", path.display()));
                continue;
            }
        };

        diagnostics.extend(result.diagnostics);

        for snapshot in &result.snapshots {
            store.save_snapshot(snapshot)?;
            println!("imported {} {} ({} entries)", snapshot.chart_key, snapshot.week, snapshot.entries.len());
            imported += 1;
        }
    }

    println!("\n{imported} snapshot(s) imported");
    report::print_diagnostics(&diagnostics, global.verbose);
    Ok(())
}

fn run_list(args: &ListArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let store = open_store(global, config)?;
    let records = store.list_snapshots(args.chart.as_deref())?;

    if records.is_empty() {
        println!("No snapshots found. Run 'chartwave import' to add some.");
        return Ok(());
    }

    println!("{:<6} {:<16} {:<10} {:>8}  {:<20}", "ID", "Chart", "Week", "Entries", "Imported");
    println!("{}", "-".repeat(66));

    for record in records {
        let imported = chrono::DateTime::from_timestamp(record.imported_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!(
            "{:<6} {:<16} {:<10} {:>8}  {:<20}",
            record.id, record.chart_key, record.week, record.entry_count, imported
        );
    }

    Ok(())
}

fn run_compare(args: &CompareArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let week = parse_week(args.week.as_deref())?;
    let against = parse_week(args.against.as_deref())?;

    let store = match (&args.file, &args.previous_file) {
        (Some(_), Some(_)) => None,
        _ => Some(open_store(global, config)?),
    };

    let current = match (&args.file, &args.chart, &store) {
        (Some(path), chart, _) => chart_from_file(path, config, global.verbose, chart.as_deref(), week)?,
        (None, Some(chart), Some(store)) => stored_week(store, chart, week)?,
        // clap enforces --chart unless --file is present
        _ => return Err(Error::NotFound("--chart or --file is required".into())),
    };

    let explicit;
    let pool;
    let selection = if let Some(path) = &args.previous_file {
        explicit = previous_from_file(path, config, global.verbose, &current.chart_key)?;
        pool = Vec::new();
        Selection::Explicit(&explicit)
    } else {
        pool = match &store {
            Some(store) => store.load_pool_before(&current.chart_key, current.week)?,
            None => Vec::new(),
        };
        match against {
            Some(label) => Selection::Week(label),
            None => Selection::Auto,
        }
    };

    let previous = config.window.resolve(&pool, &current, selection);
    if previous.is_none() {
        if let Some(label) = against {
            tracing::warn!(week = %label, "requested week is not comparable, showing current week only");
        }
    }

    let comparison = compare(&current, previous);
    report::print(&comparison, args.top.unwrap_or(config.top_entries), args.json)
}

fn run_candidates(args: &CandidatesArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let store = open_store(global, config)?;
    let current = stored_week(&store, &args.chart, parse_week(args.week.as_deref())?)?;
    let pool = store.load_pool_before(&args.chart, current.week)?;

    let eligible = config.window.eligible(&pool, current.week_number());

    println!("{} {}", current.display_title(), current.week);
    if eligible.is_empty() {
        println!(
            "No weeks within {}-{} weeks before this one.",
            config.window.min_weeks, config.window.max_weeks
        );
        return Ok(());
    }

    for (i, candidate) in eligible.iter().enumerate() {
        let gap = current.week_number().saturating_sub(candidate.week_number());
        let marker = if i == 0 { " (auto)" } else { "" };
        println!("  {}  {gap} week(s) back, {} entries{marker}", candidate.week, candidate.entries.len());
    }

    Ok(())
}

fn run_overview(args: &OverviewArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let store = open_store(global, config)?;
    let comparisons = overview::latest_comparisons(&store, &config.window)?;
    report::print_overview(&comparisons, args.top, args.json)
}

fn run_now_playing(args: &NowPlayingArgs, config: &Config) -> Result<()> {
    let format = if args.station { PayloadFormat::Station } else { PayloadFormat::Normalized };

    if args.watch {
        let mut poller = Poller::new(config.now_playing.interval);
        poller.start(FileSource::new(&args.file, format));

        // the worker polls immediately; give it a moment before the first read
        thread::sleep(Duration::from_millis(200).min(poller.interval()));

        let mut shown = None;
        loop {
            let current = poller.current();
            if current.is_some() && current != shown {
                println!("{}", serde_json::to_string(&current)?);
                shown = current;
            }
            thread::sleep(poller.interval());
        }
    }

    let text = std::fs::read_to_string(&args.file)?;
    let normalized = if args.station {
        let payload: StationPayload = serde_json::from_str(&text)?;
        nowplaying::from_station_payload(&payload)
    } else {
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Some(nowplaying::normalize_with(&value, &config.now_playing.fallback))
    };

    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.global.config.as_deref())?;

    match &cli.command {
        Command::Import(args) => run_import(args, &cli.global, &config),
        Command::List(args) => run_list(args, &cli.global, &config),
        Command::Compare(args) => run_compare(args, &cli.global, &config),
        Command::Candidates(args) => run_candidates(args, &cli.global, &config),
        Command::Overview(args) => run_overview(args, &cli.global, &config),
        Command::NowPlaying(args) => run_now_playing(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
