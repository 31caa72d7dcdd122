use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkuforgeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Rejection of malformed constructed data (unknown enum names).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown field status: {0:?}")]
    FieldStatus(String),

    #[error("unknown field name: {0:?}")]
    FieldName(String),

    #[error("unknown export format: {0:?}")]
    ExportFormat(String),
}

/// Failure branch of the deferred-action contract. The simulated
/// backend never fails on its own; the session produces `NoSelection`,
/// `Blocked` and `BlockerNotFound`, and a real agent backend reports
/// its failures through `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no job selected")]
    NoSelection,

    #[error("{remaining} validation blocker(s) still open")]
    Blocked { remaining: usize },

    #[error("blocker not found: {0}")]
    BlockerNotFound(String),

    #[error("action failed: {0}")]
    Failed(String),
}
