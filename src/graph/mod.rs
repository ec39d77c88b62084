//! Repository call graph.
//!
//! Each file is walked independently into a [`FileGraph`] (qualified caller
//! -> bare callee names); file graphs are folded into a [`CallGraph`] by set
//! union, so the merge order never changes the result.
pub mod relations;
pub mod trace;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::indexer::IndexError;
use crate::indexer::languages::LanguageConfig;
use crate::indexer::walk::walk_repository;

pub use relations::{CallExtractor, IGNORED_CALLEES};
pub use trace::{Trace, trace};

/// Calls recorded for one file: qualified caller -> bare callee names.
pub type FileGraph = BTreeMap<String, BTreeSet<String>>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("failed to load {language} grammar: {message}")]
    Language {
        language: &'static str,
        message: String,
    },

    #[error("{path}: source has syntax errors, cannot walk it")]
    Parse { path: String },

    #[error(transparent)]
    Walk(#[from] IndexError),
}

/// Aggregated caller -> callees and callee -> callers maps.
///
/// Caller keys are dot-qualified (`Outer.method`); callee names are the bare
/// identifiers seen at call sites, since a call cannot be bound to one
/// definition without type information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallGraph {
    caller_to_callees: BTreeMap<String, BTreeSet<String>>,
    callee_to_callers: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file_graphs<I: IntoIterator<Item = FileGraph>>(graphs: I) -> Self {
        let mut graph = Self::new();
        for file in graphs {
            graph.merge(file);
        }
        graph
    }

    /// Union one file's calls into the graph. Callers that already exist keep
    /// their edges; nothing is overwritten.
    pub fn merge(&mut self, file: FileGraph) {
        for (caller, callees) in file {
            for callee in &callees {
                self.callee_to_callers
                    .entry(callee.clone())
                    .or_default()
                    .insert(caller.clone());
            }
            self.caller_to_callees
                .entry(caller)
                .or_default()
                .extend(callees);
        }
    }

    /// Everything `caller` invokes, if `caller` is a known definition.
    pub fn callees(&self, caller: &str) -> Option<&BTreeSet<String>> {
        self.caller_to_callees.get(caller)
    }

    /// Every qualified caller of the bare name `callee`, sorted.
    pub fn callers(&self, callee: &str) -> Vec<String> {
        self.callee_to_callers
            .get(callee)
            .map(|callers| callers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn caller_to_callees(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.caller_to_callees
    }

    pub fn callee_to_callers(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.callee_to_callers
    }

    pub fn caller_count(&self) -> usize {
        self.caller_to_callees.len()
    }

    pub fn edge_count(&self) -> usize {
        self.caller_to_callees.values().map(BTreeSet::len).sum()
    }
}

/// Walk every source file under `root` with a known grammar and aggregate
/// the calls.
///
/// Files that cannot be read or that fail to parse are logged with their
/// path and left out; the rest of the repository still contributes.
pub fn build_call_graph<P: AsRef<Path>>(root: P, config: &Config) -> Result<CallGraph, GraphError> {
    let root = root.as_ref();
    let files = walk_repository(root, config, None)?;
    let mut extractor = CallExtractor::new(&config.graph.extra_ignored_callees);
    let mut graph = CallGraph::new();

    for file in &files {
        let Some(language) = LanguageConfig::get_by_extension(&file.extension) else {
            continue;
        };

        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping {} in call graph: {e}", file.rel_path);
                continue;
            }
        };
        let source = String::from_utf8_lossy(&bytes);

        match extractor.extract(&source, &language, &file.rel_path) {
            Ok(file_graph) => graph.merge(file_graph),
            Err(e) => warn!("Skipping {} in call graph: {e}", file.rel_path),
        }
    }

    info!(
        "Built call graph: {} callers, {} edges",
        graph.caller_count(),
        graph.edge_count()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `("caller", "a,b")` pairs; an empty list registers a leaf.
    fn file_graph(entries: &[(&str, &str)]) -> FileGraph {
        entries
            .iter()
            .map(|(caller, callees)| {
                (
                    caller.to_string(),
                    callees
                        .split(',')
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_merge_unions_instead_of_overwriting() {
        let a = file_graph(&[("run", "load"), ("leaf", "")]);
        let b = file_graph(&[("run", "save")]);
        let graph = CallGraph::from_file_graphs([a, b]);

        let callees: Vec<&str> = graph.callees("run").unwrap().iter().map(String::as_str).collect();
        assert_eq!(callees, vec!["load", "save"]);
        assert!(graph.callees("leaf").unwrap().is_empty());
        assert_eq!(graph.callers("save"), vec!["run"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = file_graph(&[("a.x", "helper,fetch"), ("b", "helper")]);
        let b = file_graph(&[("c", "helper"), ("a.x", "store")]);

        let ab = CallGraph::from_file_graphs([a.clone(), b.clone()]);
        let ba = CallGraph::from_file_graphs([b, a]);
        assert_eq!(ab, ba);
        assert_eq!(ab.callers("helper"), vec!["a.x", "b", "c"]);
    }

    #[test]
    fn test_unknown_names_are_empty() {
        let graph = CallGraph::new();
        assert!(graph.callees("missing").is_none());
        assert!(graph.callers("missing").is_empty());
    }
}
