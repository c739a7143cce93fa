pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod nowplaying;
pub mod overview;
pub mod report;
pub mod store;
pub mod util;

pub use chart::compare::{compare, Comparison};
pub use chart::window::{eligible_candidates, resolve_candidate, Selection, Window};
pub use chart::{ChartSnapshot, DerivedEntry, Entry, WeekLabel};
pub use error::{Error, Result};
