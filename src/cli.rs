use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chartwave")]
#[command(about = "Weekly chart comparison and now-playing tools")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot database (overrides config and the platform data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Show debug logging and full diagnostics
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest chart payloads into the snapshot store
    Import(ImportArgs),

    /// List stored snapshots
    List(ListArgs),

    /// Compare a chart week against a prior week
    Compare(CompareArgs),

    /// Show which prior weeks are eligible for comparison
    Candidates(CandidatesArgs),

    /// Latest week of every chart lane with its movement
    Overview(OverviewArgs),

    /// Normalize a now-playing payload
    NowPlaying(NowPlayingArgs),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// JSON files: one chart, an array of charts, or a {"docs": [...]} page
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Only show one chart lane
    #[arg(long)]
    pub chart: Option<String>,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Chart lane, e.g. hip-hop
    #[arg(long, required_unless_present = "file")]
    pub chart: Option<String>,

    /// Week to show (YYYY-Www); defaults to the latest stored week
    #[arg(long)]
    pub week: Option<String>,

    /// Read the current week from a JSON file instead of the store
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Compare against this week, if it is within the comparison window
    #[arg(long, conflicts_with = "previous_file")]
    pub against: Option<String>,

    /// Compare against a chart read from a JSON file, used as given
    #[arg(long)]
    pub previous_file: Option<PathBuf>,

    /// Number of top entries to highlight (overrides config)
    #[arg(long)]
    pub top: Option<usize>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct CandidatesArgs {
    /// Chart lane, e.g. hip-hop
    #[arg(long)]
    pub chart: String,

    /// Current week (YYYY-Www); defaults to the latest stored week
    #[arg(long)]
    pub week: Option<String>,
}

#[derive(Parser)]
pub struct OverviewArgs {
    /// Entries shown per lane
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct NowPlayingArgs {
    /// JSON payload file
    pub file: PathBuf,

    /// Treat the file as a station API payload
    #[arg(long, default_value_t = false)]
    pub station: bool,

    /// Keep polling the file and print each change
    #[arg(long, default_value_t = false)]
    pub watch: bool,
}
