use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid package spec '{0}': missing '=' separator")]
    InvalidPackageSpec(String),

    #[error("malformed database record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("database text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
