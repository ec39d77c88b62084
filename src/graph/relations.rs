use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use super::{FileGraph, GraphError};
use crate::indexer::languages::{DefinitionKind, LanguageConfig};

/// Names that say nothing about business logic: built-ins, conversions and
/// common container methods.
pub const IGNORED_CALLEES: &[&str] = &[
    "print", "len", "min", "max", "sum", "sorted", "enumerate", "range", "list", "dict", "set",
    "tuple", "int", "float", "str", "bool", "zip", "map", "filter", "any", "all", "append",
    "extend", "add", "get", "join", "items", "keys", "values",
];

/// Fields naming the trailing member of an attribute-style callee
/// (`obj.foo()`, `this.foo()`, `pkg.Foo()`, `Type::foo()`), across grammars.
const MEMBER_FIELDS: &[&str] = &["attribute", "field", "property", "name"];

/// Extracts per-file call edges with a scope-aware syntax tree walk.
pub struct CallExtractor {
    parser: Parser,
    ignored: HashSet<String>,
}

impl CallExtractor {
    pub fn new(extra_ignored: &[String]) -> Self {
        let ignored = IGNORED_CALLEES
            .iter()
            .map(|s| s.to_string())
            .chain(extra_ignored.iter().cloned())
            .collect();

        Self {
            parser: Parser::new(),
            ignored,
        }
    }

    /// Parse `source` and collect, for every function-like definition, the
    /// bare names it calls.
    ///
    /// A tree with syntax errors is rejected for the whole file.
    pub fn extract(
        &mut self,
        source: &str,
        language: &LanguageConfig,
        path: &str,
    ) -> Result<FileGraph, GraphError> {
        self.parser
            .set_language(&language.language)
            .map_err(|e| GraphError::Language {
                language: language.name,
                message: e.to_string(),
            })?;

        let parse_error = || GraphError::Parse {
            path: path.to_string(),
        };
        let tree = self.parser.parse(source, None).ok_or_else(parse_error)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(parse_error());
        }

        let mut walk = ScopeWalk {
            source: source.as_bytes(),
            language,
            ignored: &self.ignored,
            stack: Vec::new(),
            current: None,
            calls: FileGraph::new(),
        };
        walk.visit(root);

        Ok(walk.calls)
    }
}

struct ScopeWalk<'a> {
    source: &'a [u8],
    language: &'a LanguageConfig,
    ignored: &'a HashSet<String>,
    /// Names of enclosing definitions, outermost first.
    stack: Vec<String>,
    /// Qualified name of the innermost enclosing function.
    current: Option<String>,
    calls: FileGraph,
}

impl ScopeWalk<'_> {
    fn visit(&mut self, node: Node<'_>) {
        if self.language.is_decorated(node.kind()) && self.enter_decorated(node) {
            return;
        }
        if self.language.is_binding(node.kind()) && self.enter_binding(node) {
            return;
        }

        if let Some(kind) = self.language.node_kind(node.kind()) {
            if let Some(name) = definition_name(node, self.source) {
                match kind {
                    DefinitionKind::Function => self.enter_function(node, name),
                    DefinitionKind::Class => self.enter_class(node, name),
                }
                return;
            }
        }

        if self.language.is_call(node.kind()) {
            self.record_call(node);
        }

        self.visit_children(node);
    }

    fn enter_function(&mut self, node: Node<'_>, name: String) {
        let qualified = self.qualify(&name);
        self.calls.entry(qualified.clone()).or_default();

        let previous = self.current.replace(qualified);
        self.stack.push(name);
        self.visit_children(node);
        self.stack.pop();
        self.current = previous;
    }

    /// Decorators of a function are charged to the function they wrap.
    /// Decorated classes fall through to the plain walk.
    fn enter_decorated(&mut self, node: Node<'_>) -> bool {
        let Some(definition) = node.child_by_field_name("definition") else {
            return false;
        };
        if self.language.node_kind(definition.kind()) != Some(DefinitionKind::Function) {
            return false;
        }
        let Some(name) = definition_name(definition, self.source) else {
            return false;
        };

        let qualified = self.qualify(&name);
        let previous = self.current.replace(qualified);
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.id() != definition.id() {
                self.visit(child);
            }
        }
        self.current = previous;

        self.enter_function(definition, name);
        true
    }

    /// `const name = () => {}` and friends: the declarator names the function.
    fn enter_binding(&mut self, node: Node<'_>) -> bool {
        let (Some(name_node), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return false;
        };
        if name_node.kind() != "identifier"
            || self.language.node_kind(value.kind()) != Some(DefinitionKind::Function)
        {
            return false;
        }
        let Ok(name) = name_node.utf8_text(self.source) else {
            return false;
        };

        self.enter_function(value, name.to_string());
        true
    }

    /// Classes qualify their members but never own calls themselves.
    fn enter_class(&mut self, node: Node<'_>, name: String) {
        self.stack.push(name);
        self.visit_children(node);
        self.stack.pop();
    }

    fn visit_children(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    fn record_call(&mut self, node: Node<'_>) {
        let Some(current) = &self.current else {
            return;
        };
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let Some(callee) = callee_name(function, self.source) else {
            return;
        };
        if self.ignored.contains(callee) {
            return;
        }

        self.calls
            .entry(current.clone())
            .or_default()
            .insert(callee.to_string());
    }

    fn qualify(&self, name: &str) -> String {
        if self.stack.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.stack.join("."), name)
        }
    }
}

/// Name of a definition node: its `name` field, or the implemented type for
/// blocks such as `impl<T> Trait for Wrapper<T>`, stripped of generics and
/// path segments.
fn definition_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    let name_node = node
        .child_by_field_name("name")
        .or_else(|| node.child_by_field_name("type"))?;
    let text = name_node.utf8_text(source).ok()?;

    let base = text.split('<').next().unwrap_or(text).trim();
    let base = base.rsplit("::").next().unwrap_or(base);
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// The directly invoked identifier, or the trailing member name for
/// attribute, field, selector, member and path calls.
fn callee_name<'s>(function: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    if function.kind() == "identifier" {
        return function.utf8_text(source).ok();
    }

    MEMBER_FIELDS
        .iter()
        .find_map(|field| function.child_by_field_name(field))
        .filter(|member| member.kind().ends_with("identifier"))
        .and_then(|member| member.utf8_text(source).ok())
}
