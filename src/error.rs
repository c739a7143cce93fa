use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid week label '{0}': expected YYYY-Www")]
    InvalidWeek(String),

    #[error("Missing required field '{field}' in chart payload")]
    MissingField { field: &'static str },

    #[error("Duplicate rank {rank} in chart '{chart_key}' ({week})")]
    DuplicateRank {
        chart_key: String,
        week: String,
        rank: u32,
    },

    #[error("Snapshot not found: {0}")]
    NotFound(String),

    #[error("Could not determine {0} directory")]
    DataDir(&'static str),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
