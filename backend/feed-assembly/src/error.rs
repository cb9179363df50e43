use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Cannot sample from an empty candidate set")]
    EmptyCandidates,

    #[error("All candidate weights are zero")]
    ZeroTotalWeight,

    #[error("Invalid weight: {0}")]
    InvalidWeight(f64),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] envy::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
