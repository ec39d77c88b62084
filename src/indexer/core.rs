use crate::config::Config;
use crate::indexer::languages::LanguageConfig;
use crate::indexer::models::Chunk;
use crate::indexer::segmenter::Segmenter;
use crate::indexer::walk::walk_repository;
use crate::indexer::IndexError;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub files: usize,
    pub chunks: usize,
}

pub struct Indexer<'a> {
    pub config: &'a Config,
    segmenters: HashMap<&'static str, Segmenter>,
}

impl<'a> Indexer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            segmenters: HashMap::new(),
        }
    }

    /// Rebuilds the whole index for `dir` and replaces `destination`.
    ///
    /// There is no incremental merge: every run re-chunks every eligible file
    /// and writes the complete collection in one pass.
    pub fn index_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        dir: P,
        destination: Q,
    ) -> Result<IndexStats, IndexError> {
        let destination = destination.as_ref();
        let (files, chunks) = self.collect_chunks(dir.as_ref(), Some(destination))?;

        write_index(destination, &chunks)?;

        let stats = IndexStats {
            files,
            chunks: chunks.len(),
        };
        info!(
            "Indexed {} files into {} chunks -> {}",
            stats.files,
            stats.chunks,
            destination.display()
        );
        Ok(stats)
    }

    /// Walks `dir` and chunks every eligible file, returning the number of
    /// files read alongside the chunks in walk order.
    ///
    /// A file that cannot be read is skipped; it only shows up as missing
    /// chunks.
    pub fn collect_chunks(
        &mut self,
        dir: &Path,
        skip: Option<&Path>,
    ) -> Result<(usize, Vec<Chunk>), IndexError> {
        let files = walk_repository(dir, self.config, skip)?;

        let mut scanned = 0;
        let mut chunks = Vec::new();

        for file in &files {
            let bytes = match fs::read(&file.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping {}: {e}", file.rel_path);
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);

            let file_chunks = self.chunk_source(&file.rel_path, &file.extension, &content)?;
            debug!("{}: {} chunks", file.rel_path, file_chunks.len());

            scanned += 1;
            chunks.extend(file_chunks);
        }

        Ok((scanned, chunks))
    }

    /// Chunk one file's content. Source files in a known language are
    /// segmented by definition; everything else is cut into fixed windows.
    pub fn chunk_source(
        &mut self,
        rel_path: &str,
        extension: &str,
        content: &str,
    ) -> Result<Vec<Chunk>, IndexError> {
        let lines: Vec<&str> = content.lines().collect();

        match LanguageConfig::get_by_extension(extension) {
            Some(language) => {
                let max_lines = self.config.max_file_chunk_lines;
                let segmenter = self.segmenter_for(language)?;
                Ok(segmenter.segment(rel_path, &lines, max_lines))
            }
            None => Ok(window_chunks(rel_path, &lines, self.config.window_lines)),
        }
    }

    fn segmenter_for(&mut self, language: LanguageConfig) -> Result<&Segmenter, IndexError> {
        let name = language.name;
        if !self.segmenters.contains_key(name) {
            let segmenter = Segmenter::new(language)?;
            self.segmenters.insert(name, segmenter);
        }
        Ok(&self.segmenters[name])
    }
}

/// Split lines into consecutive `window`-line `file` chunks; the last one may
/// be shorter.
pub fn window_chunks(path: &str, lines: &[&str], window: usize) -> Vec<Chunk> {
    let window = window.max(1);
    (0..lines.len())
        .step_by(window)
        .map(|start| Chunk::file_window(path, lines, start, (start + window).min(lines.len())))
        .collect()
}

/// Build the index for `root` and persist it at `destination`.
pub fn build_index<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    destination: Q,
    config: &Config,
) -> Result<IndexStats, IndexError> {
    Indexer::new(config).index_directory(root, destination)
}

/// Serialize `chunks` as one JSON array and atomically replace `path`.
pub fn write_index(path: &Path, chunks: &[Chunk]) -> Result<(), IndexError> {
    let io_err = |source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut json = serde_json::to_string_pretty(chunks).map_err(|source| IndexError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

/// Load a previously persisted index verbatim.
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<Vec<Chunk>, IndexError> {
    let path = path.as_ref();

    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(IndexError::Missing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(IndexError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&data).map_err(|source| IndexError::Json {
        path: path.to_path_buf(),
        source,
    })
}
