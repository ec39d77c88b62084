/// Configuration module for repotrace.
///
/// Handles loading, validating, and providing default configuration values
/// for indexing, ranking, call-graph construction and doc generation.
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "repotrace.json";

// ── Default value functions ──────────────────────────────────────────

fn default_index_path() -> String {
    ".repo_index.json".to_string()
}

fn default_window_lines() -> usize {
    200
}

fn default_max_file_chunk_lines() -> usize {
    400
}

fn default_extensions() -> Vec<String> {
    [
        "py", "rs", "go", "js", "jsx", "mjs", "cjs", "ts", "tsx", "md", "txt", "toml", "yaml",
        "yml", "json", "sql", "cfg", "ini", "sh",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "target",
        "node_modules",
        "__pycache__",
        ".venv",
        "venv",
        "site",
        "dist",
        "build",
        ".mypy_cache",
        ".pytest_cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_search_top_k() -> usize {
    5
}

fn default_grep_limit() -> usize {
    25
}

fn default_internal_prefixes() -> Vec<String> {
    vec!["agents/repo_bot/".to_string()]
}

fn default_boost_prefixes() -> Vec<String> {
    [
        "agents/promo_agent.py",
        "agents/tools.py",
        "agents/graph.py",
        "sql/",
        "rag/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_docs_out_dir() -> String {
    "docs/modules".to_string()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Where the chunk index is persisted, relative to the working directory.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Window size for files that cannot be segmented into symbols.
    #[serde(default = "default_window_lines")]
    pub window_lines: usize,

    /// Cap on the single `file` chunk emitted for a source file without definitions.
    #[serde(default = "default_max_file_chunk_lines")]
    pub max_file_chunk_lines: usize,

    /// Extension allow-list (without the leading dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned from every walk.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Extra glob excludes, matched against repository-relative paths.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub docs: DocsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_top_k")]
    pub top_k: usize,

    #[serde(default = "default_grep_limit")]
    pub grep_limit: usize,

    /// Paths under these prefixes are pushed down the ranking.
    #[serde(default = "default_internal_prefixes")]
    pub internal_prefixes: Vec<String>,

    /// Paths under these prefixes are pushed up the ranking.
    #[serde(default = "default_boost_prefixes")]
    pub boost_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GraphConfig {
    /// Callee names dropped in addition to the built-in ignore set.
    #[serde(default)]
    pub extra_ignored_callees: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocsConfig {
    #[serde(default = "default_docs_out_dir")]
    pub out_dir: String,

    /// Only document chunks under these prefixes (all when empty).
    #[serde(default)]
    pub include_prefixes: Vec<String>,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            window_lines: default_window_lines(),
            max_file_chunk_lines: default_max_file_chunk_lines(),
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_patterns: Vec::new(),
            respect_gitignore: default_true(),
            search: SearchConfig::default(),
            graph: GraphConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_search_top_k(),
            grep_limit: default_grep_limit(),
            internal_prefixes: default_internal_prefixes(),
            boost_prefixes: default_boost_prefixes(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            out_dir: default_docs_out_dir(),
            include_prefixes: Vec::new(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to [`DEFAULT_CONFIG_PATH`].
    /// A missing or malformed file yields the default configuration.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.window_lines > 0, "window_lines must be positive");
        anyhow::ensure!(
            self.max_file_chunk_lines > 0,
            "max_file_chunk_lines must be positive"
        );
        anyhow::ensure!(self.search.top_k > 0, "search.top_k must be positive");
        anyhow::ensure!(
            self.search.grep_limit > 0,
            "search.grep_limit must be positive"
        );
        anyhow::ensure!(
            !self.extensions.is_empty(),
            "at least one indexable extension must be specified"
        );
        anyhow::ensure!(!self.index_path.is_empty(), "index_path must not be empty");
        self.exclude_globs()?;
        Ok(())
    }

    /// Whether a file extension (without the dot) is on the allow-list.
    #[must_use]
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Compile `exclude_patterns` into a single matcher.
    pub fn exclude_globs(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {pattern}"))?;
            builder.add(glob);
        }
        builder.build().context("failed to compile exclude patterns")
    }
}

// ── Tests ────────────────────────────────────────────────────────────
