use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures outside the simulation step: loading settings, saving and
/// restoring sessions. The step itself never fails.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: String,
    },
    #[error("corrupt save: {reason}")]
    CorruptSave { reason: String },
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
