use std::path::Path;

use serde::Serialize;

use super::{CallGraph, GraphError, build_call_graph};
use crate::config::Config;

/// Callers and callees of one symbol. Both lists are sorted; an unknown
/// symbol yields two empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub callers: Vec<String>,
    pub callees: Vec<String>,
}

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty() && self.callees.is_empty()
    }
}

impl CallGraph {
    /// Resolve `symbol` against both maps.
    ///
    /// When the exact key finds nothing in either direction and the symbol is
    /// dot-qualified, the lookup is retried with its last component, since
    /// callee keys are recorded bare.
    pub fn trace(&self, symbol: &str) -> Trace {
        let symbol = symbol.trim();
        let exact = self.lookup(symbol);
        if !exact.is_empty() {
            return exact;
        }

        match symbol.rsplit_once('.') {
            Some((_, tail)) if !tail.is_empty() => self.lookup(tail),
            _ => exact,
        }
    }

    fn lookup(&self, key: &str) -> Trace {
        Trace {
            callers: self.callers(key),
            callees: self
                .callees(key)
                .map(|callees| callees.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

/// Build the call graph for `root` and trace `symbol` in it.
///
/// Every call re-walks the repository; callers issuing many queries should
/// build the graph once with [`build_call_graph`] and call
/// [`CallGraph::trace`] directly.
pub fn trace<P: AsRef<Path>>(root: P, symbol: &str, config: &Config) -> Result<Trace, GraphError> {
    Ok(build_call_graph(root, config)?.trace(symbol))
}
