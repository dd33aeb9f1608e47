#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Legacy data that cannot be converted without guessing.
    #[error("{kind} {reason}")]
    InvalidComponent { kind: &'static str, reason: String },
    #[error("story scenes are not valid JSON: {0}")]
    InvalidStory(#[source] serde_json::Error),
    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
