use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeCmpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not a valid directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("{} and {} are the same directory", left.display(), right.display())]
    SameRoot { left: PathBuf, right: PathBuf },

    #[error("Failed to list {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reclaim {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, TreeCmpError>;
