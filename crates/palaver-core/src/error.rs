use thiserror::Error;

/// Errors from the key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors loading or saving a conversation snapshot.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("malformed history snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the profile picture upload path. The display strings are shown
/// to the user as-is.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("No file selected")]
    NoFile,

    #[error("Unsupported file type")]
    UnsupportedType(String),

    #[error("File size too large (max 5MB)")]
    TooLarge(usize),

    #[error("Error processing image")]
    Processing(String),

    #[error("Error processing image")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
