use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported backup version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Notification error: {0}")]
    Notify(String),

    /// Replay stopped partway; records counted here are already committed.
    #[error(
        "Restore stopped after {progress} progress, {notes} notes and {favorites} favorites: {source}"
    )]
    PartialRestore {
        progress: usize,
        notes: usize,
        favorites: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_message() {
        let err = AppError::UnsupportedVersion {
            found: 7,
            expected: 1,
        };
        assert_eq!(err.to_string(), "Unsupported backup version 7 (expected 1)");
    }

    #[test]
    fn partial_restore_keeps_cause() {
        let cause = AppError::InvalidInput("disk rejected row".to_string());
        let err = AppError::PartialRestore {
            progress: 2,
            notes: 1,
            favorites: 0,
            source: Box::new(cause),
        };
        assert!(err.to_string().contains("2 progress, 1 notes and 0 favorites"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Invalid input: disk rejected row"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
