use tree_sitter::Language;

/// Normalized definition form. Syntactic variants (`async def`, `pub fn`,
/// `export function`, receiver methods, ...) all collapse into one of these
/// before any qualification logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Function,
    Class,
}

pub struct LanguageConfig {
    pub name: &'static str,
    pub language: Language,
    pub extensions: &'static [&'static str],
    /// Line patterns for definition headers. Each must expose the named
    /// groups `indent`, `kw` and `name`; the first matching pattern wins.
    pub header_patterns: &'static [&'static str],
    /// Header keywords that open a class-like block. Any other keyword is a function.
    pub class_keywords: &'static [&'static str],
    /// Control-flow words that header patterns without a keyword (method
    /// shorthand) would otherwise take for definition names.
    pub reserved_names: &'static [&'static str],
    pub function_nodes: &'static [&'static str],
    pub class_nodes: &'static [&'static str],
    pub call_nodes: &'static [&'static str],
    /// Wrappers holding decorators next to a `definition` field (`@cache def f()`).
    pub decorated_nodes: &'static [&'static str],
    /// Declarators that name a function value (`const f = () => {}`).
    pub binding_nodes: &'static [&'static str],
}

impl LanguageConfig {
    pub fn get_all() -> Vec<LanguageConfig> {
        vec![
            go_config(),
            python_config(),
            typescript_config(),
            tsx_config(),
            javascript_config(),
            rust_config(),
        ]
    }

    pub fn get_by_extension(ext: &str) -> Option<LanguageConfig> {
        Self::get_all()
            .into_iter()
            .find(|c| c.extensions.contains(&ext))
    }

    pub fn get_by_name(name: &str) -> Option<LanguageConfig> {
        Self::get_all().into_iter().find(|c| c.name == name)
    }

    /// Map a matched header keyword onto its definition kind.
    pub fn keyword_kind(&self, keyword: &str) -> DefinitionKind {
        if self.class_keywords.contains(&keyword) {
            DefinitionKind::Class
        } else {
            DefinitionKind::Function
        }
    }

    /// Map a syntax node kind onto its definition kind, if it defines anything.
    pub fn node_kind(&self, kind: &str) -> Option<DefinitionKind> {
        if self.function_nodes.contains(&kind) {
            Some(DefinitionKind::Function)
        } else if self.class_nodes.contains(&kind) {
            Some(DefinitionKind::Class)
        } else {
            None
        }
    }

    pub fn is_call(&self, kind: &str) -> bool {
        self.call_nodes.contains(&kind)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(&name)
    }

    pub fn is_decorated(&self, kind: &str) -> bool {
        self.decorated_nodes.contains(&kind)
    }

    pub fn is_binding(&self, kind: &str) -> bool {
        self.binding_nodes.contains(&kind)
    }
}

fn go_config() -> LanguageConfig {
    LanguageConfig {
        name: "go",
        language: tree_sitter_go::LANGUAGE.into(),
        extensions: &["go"],
        header_patterns: &[
            r"^(?P<indent>[ \t]*)(?P<kw>func)[ \t]+(?:\([^)]*\)[ \t]*)?(?P<name>[A-Za-z_]\w*)",
            r"^(?P<indent>[ \t]*)(?P<kw>type)[ \t]+(?P<name>[A-Za-z_]\w*)",
        ],
        class_keywords: &["type"],
        reserved_names: &[],
        function_nodes: &["function_declaration", "method_declaration"],
        class_nodes: &[],
        call_nodes: &["call_expression"],
        decorated_nodes: &[],
        binding_nodes: &[],
    }
}

fn python_config() -> LanguageConfig {
    LanguageConfig {
        name: "python",
        language: tree_sitter_python::LANGUAGE.into(),
        extensions: &["py"],
        header_patterns: &[
            r"^(?P<indent>[ \t]*)(?:async[ \t]+)?(?P<kw>def|class)[ \t]+(?P<name>[A-Za-z_]\w*)",
        ],
        class_keywords: &["class"],
        reserved_names: &[],
        function_nodes: &["function_definition"],
        class_nodes: &["class_definition"],
        call_nodes: &["call"],
        decorated_nodes: &["decorated_definition"],
        binding_nodes: &[],
    }
}

const JS_HEADER_PATTERNS: &[&str] = &[
    r"^(?P<indent>[ \t]*)(?:export[ \t]+)?(?:default[ \t]+)?(?:async[ \t]+)?(?P<kw>function)(?:[ \t]*\*[ \t]*|[ \t]+)(?P<name>[A-Za-z_$][\w$]*)",
    r"^(?P<indent>[ \t]*)(?:export[ \t]+)?(?:default[ \t]+)?(?:abstract[ \t]+)?(?P<kw>class)[ \t]+(?P<name>[A-Za-z_$][\w$]*)",
    // `const f = async (a) => {`, `let g = function () {`, `var h = x =>`
    r"^(?P<indent>[ \t]*)(?:export[ \t]+)?(?P<kw>const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?::[^=]+)?=[ \t]*(?:async[ \t]+)?(?:function\b|\([^)]*\)[ \t]*(?::[^=]+)?=>|[A-Za-z_$][\w$]*[ \t]*=>)",
    // Class body method shorthand: `  async total(items) {`
    r"^(?P<indent>[ \t]+)(?P<kw>)(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)[ \t]+)*\*?(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:<[^>]*>)?\([^()]*\)[ \t]*(?::[^{]+)?\{",
];

const JS_RESERVED_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "function", "do", "else",
];

const JS_FUNCTION_NODES: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "method_definition",
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

fn typescript_config() -> LanguageConfig {
    LanguageConfig {
        name: "typescript",
        language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        extensions: &["ts"],
        header_patterns: JS_HEADER_PATTERNS,
        class_keywords: &["class"],
        reserved_names: JS_RESERVED_NAMES,
        function_nodes: JS_FUNCTION_NODES,
        class_nodes: &["class_declaration", "abstract_class_declaration"],
        call_nodes: &["call_expression"],
        decorated_nodes: &[],
        binding_nodes: &["variable_declarator"],
    }
}

fn tsx_config() -> LanguageConfig {
    LanguageConfig {
        name: "tsx",
        language: tree_sitter_typescript::LANGUAGE_TSX.into(),
        extensions: &["tsx"],
        header_patterns: JS_HEADER_PATTERNS,
        class_keywords: &["class"],
        reserved_names: JS_RESERVED_NAMES,
        function_nodes: JS_FUNCTION_NODES,
        class_nodes: &["class_declaration", "abstract_class_declaration"],
        call_nodes: &["call_expression"],
        decorated_nodes: &[],
        binding_nodes: &["variable_declarator"],
    }
}

fn javascript_config() -> LanguageConfig {
    LanguageConfig {
        name: "javascript",
        language: tree_sitter_javascript::LANGUAGE.into(),
        extensions: &["js", "jsx", "mjs", "cjs"],
        header_patterns: JS_HEADER_PATTERNS,
        class_keywords: &["class"],
        reserved_names: JS_RESERVED_NAMES,
        function_nodes: JS_FUNCTION_NODES,
        class_nodes: &["class_declaration"],
        call_nodes: &["call_expression"],
        decorated_nodes: &[],
        binding_nodes: &["variable_declarator"],
    }
}

fn rust_config() -> LanguageConfig {
    LanguageConfig {
        name: "rust",
        language: tree_sitter_rust::LANGUAGE.into(),
        extensions: &["rs"],
        header_patterns: &[
            // `impl Type`, `impl<T> Trait for Type<T>`: the implementing type names the block.
            r"^(?P<indent>[ \t]*)(?P<kw>impl)(?:[ \t]*<[^>]*>)?[ \t]+(?:[A-Za-z_][\w:]*(?:<[^>]*>)?[ \t]+for[ \t]+)?(?:[A-Za-z_]\w*::)*(?P<name>[A-Za-z_]\w*)",
            r#"^(?P<indent>[ \t]*)(?:pub(?:\([^)]*\))?[ \t]+)?(?:(?:async|const|unsafe|extern[ \t]+"[^"]*")[ \t]+)*(?P<kw>fn|struct|enum|trait|mod)[ \t]+(?P<name>[A-Za-z_]\w*)"#,
        ],
        class_keywords: &["impl", "struct", "enum", "trait", "mod"],
        reserved_names: &[],
        function_nodes: &["function_item"],
        class_nodes: &["impl_item", "trait_item", "mod_item"],
        call_nodes: &["call_expression"],
        decorated_nodes: &[],
        binding_nodes: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_extension() {
        assert_eq!(LanguageConfig::get_by_extension("py").unwrap().name, "python");
        assert_eq!(LanguageConfig::get_by_extension("tsx").unwrap().name, "tsx");
        assert_eq!(LanguageConfig::get_by_extension("mjs").unwrap().name, "javascript");
        assert!(LanguageConfig::get_by_extension("md").is_none());
    }

    #[test]
    fn test_keyword_and_node_kinds() {
        let python = LanguageConfig::get_by_name("python").unwrap();
        assert_eq!(python.keyword_kind("def"), DefinitionKind::Function);
        assert_eq!(python.keyword_kind("class"), DefinitionKind::Class);
        assert_eq!(
            python.node_kind("function_definition"),
            Some(DefinitionKind::Function)
        );
        assert_eq!(python.node_kind("class_definition"), Some(DefinitionKind::Class));
        assert_eq!(python.node_kind("call"), None);
        assert!(python.is_call("call"));

        let rust = LanguageConfig::get_by_name("rust").unwrap();
        assert_eq!(rust.keyword_kind("impl"), DefinitionKind::Class);
        assert_eq!(rust.keyword_kind("fn"), DefinitionKind::Function);
    }

    #[test]
    fn test_header_patterns_compile() {
        for config in LanguageConfig::get_all() {
            for pattern in config.header_patterns {
                let re = regex::Regex::new(pattern).expect("header pattern should compile");
                for group in ["indent", "kw", "name"] {
                    assert!(
                        re.capture_names().flatten().any(|n| n == group),
                        "{} pattern lacks group {group}",
                        config.name
                    );
                }
            }
        }
    }
}
