//! Markdown module reference generated from the chunk index and the call
//! graph: one page per module, one section per function or class.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::graph::CallGraph;
use crate::indexer::languages::LanguageConfig;
use crate::indexer::models::{Chunk, ChunkKind};

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Module name for a chunk path: the file stem (`agents/tools.py` -> `tools`).
pub fn module_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Group documentable chunks by module.
///
/// Only `function` and `class` chunks of files with a known grammar qualify,
/// and only under `include_prefixes` when that list is non-empty. Each group
/// is ordered by `(path, start_line)`.
pub fn group_by_module<'a>(
    chunks: &'a [Chunk],
    include_prefixes: &[String],
) -> BTreeMap<String, Vec<&'a Chunk>> {
    let mut groups: BTreeMap<String, Vec<&Chunk>> = BTreeMap::new();

    for chunk in chunks {
        if chunk.kind == ChunkKind::File {
            continue;
        }
        if language_for(&chunk.path).is_none() {
            continue;
        }
        if !include_prefixes.is_empty()
            && !include_prefixes.iter().any(|p| chunk.path.starts_with(p.as_str()))
        {
            continue;
        }
        groups.entry(module_name(&chunk.path)).or_default().push(chunk);
    }

    for items in groups.values_mut() {
        items.sort_by(|a, b| (&a.path, a.start_line).cmp(&(&b.path, b.start_line)));
    }
    groups
}

/// Render one chunk section: heading, location, connections and code.
pub fn render_chunk(chunk: &Chunk, graph: &CallGraph) -> String {
    let trace = graph.trace(&chunk.symbol);
    let fence = language_for(&chunk.path).map(|l| l.name).unwrap_or("");

    let mut md = format!("## `{}`\n\n", chunk.symbol);
    md.push_str(&format!(
        "- **File:** `{}` (lines {}-{})\n",
        chunk.path, chunk.start_line, chunk.end_line
    ));
    md.push_str(&format!(
        "- **Called by:** {}\n",
        join_or(&trace.callers, "(not shown)")
    ));
    md.push_str(&format!(
        "- **Calls:** {}\n\n",
        join_or(&trace.callees, "(none)")
    ));
    md.push_str(&format!("```{fence}\n{}\n```\n", chunk.text.trim()));
    md
}

/// Render a whole module page.
pub fn render_module(module: &str, chunks: &[&Chunk], graph: &CallGraph) -> String {
    let mut sections = vec![
        format!("# `{module}` Module\n"),
        "_Auto-generated from the repository index and call graph._\n".to_string(),
    ];
    sections.extend(chunks.iter().map(|c| render_chunk(c, graph)));
    sections.join("\n")
}

/// Write `<out_dir>/<module>.md` for every module and return the written
/// paths in module order. Existing pages are overwritten.
pub fn generate_docs<P: AsRef<Path>>(
    chunks: &[Chunk],
    graph: &CallGraph,
    out_dir: P,
    include_prefixes: &[String],
) -> Result<Vec<PathBuf>, DocsError> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|source| DocsError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for (module, items) in group_by_module(chunks, include_prefixes) {
        let dest = out_dir.join(format!("{module}.md"));
        let page = render_module(&module, &items, graph);
        fs::write(&dest, page).map_err(|source| DocsError::Io {
            path: dest.clone(),
            source,
        })?;
        written.push(dest);
    }

    info!("Wrote {} module pages to {}", written.len(), out_dir.display());
    Ok(written)
}

fn language_for(path: &str) -> Option<LanguageConfig> {
    let ext = Path::new(path).extension()?.to_str()?;
    LanguageConfig::get_by_extension(ext)
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

    fn chunk(path: &str, symbol: &str, kind: ChunkKind, start: usize, text: &str) -> Chunk {
        Chunk {
            path: path.to_string(),
            symbol: symbol.to_string(),
            kind,
            start_line: start,
            end_line: start + 1,
            text: text.to_string(),
        }
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            chunk("agents/tools.py", "load", ChunkKind::Function, 10, "def load():\n    fetch()"),
            chunk("agents/tools.py", "fetch", ChunkKind::Function, 2, "def fetch():\n    pass"),
            chunk("agents/tools.py", "tools.py:1", ChunkKind::File, 1, "import os"),
            chunk("api/main.py", "Handler", ChunkKind::Class, 1, "class Handler:\n    pass"),
            chunk("README.md", "README.md:1", ChunkKind::File, 1, "# readme"),
        ]
    }

    fn graph() -> CallGraph {
        let mut file = FileGraph::new();
        file.insert("load".to_string(), ["fetch".to_string()].into_iter().collect());
        file.insert("fetch".to_string(), Default::default());
        CallGraph::from_file_graphs([file])
    }

    #[test]
    fn test_module_name_is_file_stem() {
        assert_eq!(module_name("agents/promo_agent.py"), "promo_agent");
        assert_eq!(module_name("main.rs"), "main");
    }

    #[test]
    fn test_grouping_filters_and_orders() {
        let chunks = chunks();
        let groups = group_by_module(&chunks, &[]);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["main", "tools"]);

        let tools: Vec<&str> = groups["tools"].iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(tools, vec!["fetch", "load"]);

        let only_agents = group_by_module(&chunks, &["agents/".to_string()]);
        assert_eq!(only_agents.keys().collect::<Vec<_>>(), vec!["tools"]);
    }

    #[test]
    fn test_render_chunk_connections() {
        let chunks = chunks();
        let graph = graph();

        let fetch = render_chunk(&chunks[1], &graph);
        assert!(fetch.starts_with("## `fetch`\n"));
        assert!(fetch.contains("- **File:** `agents/tools.py` (lines 2-3)"));
        assert!(fetch.contains("- **Called by:** load\n"));
        assert!(fetch.contains("- **Calls:** (none)\n"));
        assert!(fetch.contains("```python\ndef fetch():\n    pass\n```"));

        let load = render_chunk(&chunks[0], &graph);
        assert!(load.contains("- **Called by:** (not shown)\n"));
        assert!(load.contains("- **Calls:** fetch\n"));
    }

    #[test]
    fn test_generate_docs_writes_pages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs/modules");

        let written = generate_docs(&chunks(), &graph(), &out, &[]).unwrap();
        assert_eq!(written, vec![out.join("main.md"), out.join("tools.md")]);

        let tools = fs::read_to_string(out.join("tools.md")).unwrap();
        assert!(tools.starts_with("# `tools` Module\n"));
        let fetch_at = tools.find("## `fetch`").unwrap();
        let load_at = tools.find("## `load`").unwrap();
        assert!(fetch_at < load_at);
        assert!(!tools.contains("tools.py:1"));
    }
}
