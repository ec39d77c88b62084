//! Command-line surface: argument definitions, the interactive command
//! parser and the plain-text renderers shared by every subcommand.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SearchConfig;
use crate::graph::{CallGraph, Trace};
use crate::indexer::models::Chunk;
use crate::search::{Ranker, find_by_symbol};

/// Lines of chunk text shown in a detail view.
pub const SNIPPET_LINES: usize = 35;

#[derive(Parser)]
#[command(name = "repotrace")]
#[command(about = "Index a repository into symbol chunks, search them and trace call graphs")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (JSON)
    #[arg(long, global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Index file, overriding the configured path
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init,

    /// Rebuild the chunk index
    Index {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Ranked keyword search over chunks
    Search {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Look up chunks by symbol name
    Symbol {
        name: String,
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// List chunks whose text contains a keyword
    Grep {
        keyword: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show callers and callees of a symbol
    Trace {
        symbol: String,
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Show the best matching chunk for a symbol with its connections
    Explain {
        symbol: String,
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Generate per-module Markdown reference pages
    Docs {
        /// Output directory, overriding the configured one
        #[arg(long)]
        out: Option<PathBuf>,
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Interactive prompt reading commands from stdin
    Shell {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Explain(String),
    Trace(String),
    Where(String),
    Ask(String),
    Exit,
}

/// Parse interactive input.
///
/// `explain X`, `trace X` and `where X` are recognized case-insensitively;
/// a backticked `` `X` `` is shorthand for `explain X`; `exit` and `quit`
/// leave; anything else is a free-text question.
pub fn parse_command(input: &str) -> Command {
    let s = input.trim();
    if s.is_empty() {
        return Command::Ask(String::new());
    }

    if s.eq_ignore_ascii_case("exit") || s.eq_ignore_ascii_case("quit") {
        return Command::Exit;
    }

    for (verb, make) in [
        ("explain", Command::Explain as fn(String) -> Command),
        ("trace", Command::Trace),
        ("where", Command::Where),
    ] {
        let Some(head) = s.get(..verb.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(verb) && s[verb.len()..].starts_with(' ') {
            return make(s[verb.len()..].trim().to_string());
        }
    }

    if s.len() > 2 && s.starts_with('`') && s.ends_with('`') {
        return Command::Explain(s.trim_matches('`').trim().to_string());
    }

    Command::Ask(s.to_string())
}

/// Callers to display for `symbol`.
///
/// A nested definition is usually only called from its enclosing one under
/// its bare name, so when nothing is recorded the enclosing component is
/// shown instead.
pub fn display_callers(symbol: &str, trace: &Trace) -> Vec<String> {
    if !trace.callers.is_empty() {
        return trace.callers.clone();
    }
    match symbol.rsplit_once('.') {
        Some((parent, _)) if !parent.is_empty() => vec![parent.to_string()],
        _ => Vec::new(),
    }
}

/// Symbol to trace for user input: the best symbol match, else the input.
pub fn resolve_symbol(chunks: &[Chunk], input: &str) -> String {
    find_by_symbol(chunks, input, 1)
        .first()
        .map(|c| c.symbol.clone())
        .unwrap_or_else(|| input.trim().to_string())
}

/// Chunk to explain: the best symbol match, else the best ranked hit.
pub fn resolve_chunk<'a>(chunks: &'a [Chunk], input: &str, search: &SearchConfig) -> Option<&'a Chunk> {
    find_by_symbol(chunks, input, 1).first().copied().or_else(|| {
        Ranker::from_config(search)
            .rank(chunks, input, 1)
            .first()
            .map(|(_, c)| *c)
    })
}

pub fn format_location(chunk: &Chunk) -> String {
    format!(
        "{}::{}  lines {}-{}",
        chunk.path, chunk.symbol, chunk.start_line, chunk.end_line
    )
}

/// Header plus the first [`SNIPPET_LINES`] lines of the chunk, with a
/// marker when the rest is cut.
pub fn format_chunk(chunk: &Chunk) -> String {
    let header = format!(
        "{}  ({} {})  lines {}-{}",
        chunk.path,
        chunk.kind.as_str(),
        chunk.symbol,
        chunk.start_line,
        chunk.end_line
    );
    let snippet: Vec<&str> = chunk.text.lines().take(SNIPPET_LINES).collect();
    let mut out = format!("---\n{header}\n{}", snippet.join("\n"));
    if chunk.line_count() > SNIPPET_LINES {
        out.push_str(&format!(
            "\n... ({} more lines)",
            chunk.line_count() - SNIPPET_LINES
        ));
    }
    out.push_str("\n---");
    out
}

pub fn format_connections(symbol: &str, graph: &CallGraph) -> String {
    let trace = graph.trace(symbol);
    let callers = display_callers(symbol, &trace);
    format!(
        "Connections for: {symbol}\n  Called by: {}\n  Calls: {}",
        join_or(&callers, "(not found)"),
        join_or(&trace.callees, "(none found)")
    )
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FileGraph;
    use crate::indexer::models::ChunkKind;
    use clap::CommandFactory;

    fn chunk(path: &str, symbol: &str, text: &str) -> Chunk {
        Chunk {
            path: path.to_string(),
            symbol: symbol.to_string(),
            kind: ChunkKind::Function,
            start_line: 3,
            end_line: 9,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verbs() {
        assert_eq!(
            parse_command("explain respond_node"),
            Command::Explain("respond_node".to_string())
        );
        assert_eq!(parse_command("  TRACE  helper "), Command::Trace("helper".to_string()));
        assert_eq!(
            parse_command("where PRODUCT_ID"),
            Command::Where("PRODUCT_ID".to_string())
        );
    }

    #[test]
    fn test_parse_backtick_shortcut() {
        assert_eq!(
            parse_command("`bundle_score`"),
            Command::Explain("bundle_score".to_string())
        );
        assert_eq!(parse_command("``"), Command::Ask("``".to_string()));
    }

    #[test]
    fn test_parse_exit_and_questions() {
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("Quit"), Command::Exit);
        assert_eq!(parse_command(""), Command::Ask(String::new()));
        assert_eq!(
            parse_command("how are bundles scored"),
            Command::Ask("how are bundles scored".to_string())
        );
        // A verb without an argument is just a question.
        assert_eq!(parse_command("tracer"), Command::Ask("tracer".to_string()));
    }

    #[test]
    fn test_display_callers_falls_back_to_parent() {
        let empty = Trace::default();
        assert_eq!(display_callers("respond_node.bundle_score", &empty), vec!["respond_node"]);
        assert_eq!(display_callers("a.b.c", &empty), vec!["a.b"]);
        assert!(display_callers("plain", &empty).is_empty());

        let found = Trace {
            callers: vec!["main".to_string()],
            callees: Vec::new(),
        };
        assert_eq!(display_callers("a.b", &found), vec!["main"]);
    }

    #[test]
    fn test_resolve_symbol_and_chunk() {
        let chunks = vec![
            chunk("agents/promo.py", "respond_node", "def respond_node(): pass"),
            chunk("agents/promo.py", "respond_node.bundle_score", "def bundle_score(): pass"),
        ];
        assert_eq!(resolve_symbol(&chunks, "bundle_score"), "respond_node.bundle_score");
        assert_eq!(resolve_symbol(&chunks, " unknown "), "unknown");

        let search = SearchConfig::default();
        let hit = resolve_chunk(&chunks, "pass", &search).unwrap();
        assert_eq!(hit.symbol, "respond_node");
        assert!(resolve_chunk(&chunks, "zzz", &search).is_none());
    }

    #[test]
    fn test_format_connections() {
        let mut file = FileGraph::new();
        file.insert("outer".to_string(), ["helper".to_string()].into_iter().collect());
        file.insert("outer.helper".to_string(), ["format".to_string()].into_iter().collect());
        let graph = CallGraph::from_file_graphs([file]);

        let text = format_connections("outer.helper", &graph);
        assert_eq!(
            text,
            "Connections for: outer.helper\n  Called by: outer\n  Calls: format"
        );

        let text = format_connections("nothing", &graph);
        assert!(text.contains("Called by: (not found)"));
        assert!(text.contains("Calls: (none found)"));
    }

    #[test]
    fn test_format_chunk_truncates() {
        let text: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let mut c = chunk("a.py", "f", &text.join("\n"));
        c.start_line = 1;
        c.end_line = 50;
        let out = format_chunk(&c);
        assert!(out.contains("a.py  (function f)  lines 1-50"));
        assert!(out.contains("line 34"));
        assert!(!out.contains("line 35"));
        assert!(out.ends_with("\n... (15 more lines)\n---"));

        let short = chunk("a.py", "g", "def g():\n    pass");
        let out = format_chunk(&short);
        assert!(!out.contains("more lines"));
        assert!(out.ends_with("    pass\n---"));
    }
}
