//! Indentation-driven block segmentation.
//!
//! Definition headers are found line by line with the language's header
//! patterns; a block runs until the first later non-blank line indented no
//! deeper than its header. Text inside multi-line strings or comments that
//! happens to be dedented will close a block early.

use regex::Regex;

use super::languages::{DefinitionKind, LanguageConfig};
use super::models::Chunk;

/// A definition header located in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub indent: usize,
    pub kind: DefinitionKind,
    pub name: String,
    /// 1-based line of the header.
    pub start_line: usize,
}

pub struct Segmenter {
    patterns: Vec<Regex>,
    language: LanguageConfig,
}

impl Segmenter {
    pub fn new(language: LanguageConfig) -> Result<Self, regex::Error> {
        let patterns = language
            .header_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns, language })
    }

    /// Locate every definition header, in line order.
    pub fn find_hits(&self, lines: &[&str]) -> Vec<Hit> {
        let mut hits = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = self.patterns.iter().find_map(|re| re.captures(line)) else {
                continue;
            };
            let (Some(indent), Some(kw), Some(name)) =
                (caps.name("indent"), caps.name("kw"), caps.name("name"))
            else {
                continue;
            };

            if self.language.is_reserved(name.as_str()) {
                continue;
            }

            hits.push(Hit {
                indent: indent.as_str().chars().count(),
                kind: self.language.keyword_kind(kw.as_str()),
                name: name.as_str().to_string(),
                start_line: i + 1,
            });
        }

        hits
    }

    /// Split a file into one chunk per definition, qualified by its enclosing
    /// definitions. A file without definitions becomes a single `file` chunk
    /// capped at `max_file_lines`; an empty file yields nothing.
    pub fn segment(&self, path: &str, lines: &[&str], max_file_lines: usize) -> Vec<Chunk> {
        if lines.is_empty() {
            return Vec::new();
        }

        let hits = self.find_hits(lines);
        if hits.is_empty() {
            let end = lines.len().min(max_file_lines);
            return vec![Chunk::file_window(path, lines, 0, end)];
        }

        let mut scope: Vec<(usize, &str)> = Vec::new();
        let mut chunks = Vec::with_capacity(hits.len());

        for hit in &hits {
            while scope.last().is_some_and(|(indent, _)| *indent >= hit.indent) {
                scope.pop();
            }

            let start = hit.start_line - 1;
            let end = block_end(lines, start, hit.indent);
            let symbol = qualify(&scope, &hit.name);

            chunks.push(Chunk {
                path: path.to_string(),
                symbol,
                kind: hit.kind.into(),
                start_line: hit.start_line,
                end_line: end,
                text: lines[start..end].join("\n"),
            });

            scope.push((hit.indent, hit.name.as_str()));
        }

        chunks
    }
}

/// Exclusive 0-based end of the block opened at `start`: the first later
/// non-blank line whose indent is `<= indent`, or `lines.len()`.
pub fn block_end(lines: &[&str], start: usize, indent: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| !line.trim().is_empty() && indent_width(line) <= indent)
        .map(|(i, _)| i)
        .unwrap_or(lines.len())
}

/// Count of leading spaces and tabs.
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

fn qualify(scope: &[(usize, &str)], name: &str) -> String {
    let mut parts: Vec<&str> = scope.iter().map(|(_, n)| *n).collect();
    parts.push(name);
    parts.join(".")
}
