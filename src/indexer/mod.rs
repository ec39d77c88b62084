//! Chunk store: repository walking, block segmentation, fixed-size
//! windowing and JSON persistence of the resulting chunks.
pub mod core;
pub mod languages;
pub mod models;
pub mod segmenter;
pub mod walk;

use std::path::PathBuf;

use thiserror::Error;

pub use self::core::{IndexStats, Indexer, build_index, load_index};
pub use self::models::{Chunk, ChunkKind};

/// Errors raised while building or loading the chunk index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index not found: {0} (build it first)")]
    Missing(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed index {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid header pattern: {0}")]
    Pattern(#[from] regex::Error),
}
