use std::path::Path;

use serde::{Deserialize, Serialize};

use super::languages::DefinitionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Function,
    Class,
    File,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Function => "function",
            ChunkKind::Class => "class",
            ChunkKind::File => "file",
        }
    }
}

impl From<DefinitionKind> for ChunkKind {
    fn from(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Function => ChunkKind::Function,
            DefinitionKind::Class => ChunkKind::Class,
        }
    }
}

/// One addressable slice of a source file.
///
/// `start_line` and `end_line` are 1-based and inclusive; `text` is exactly
/// the source lines in that range joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub path: String,
    pub symbol: String,
    pub kind: ChunkKind,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

impl Chunk {
    /// Build a `file` chunk over `lines[start..end]` (0-based, end exclusive),
    /// named `<filename>:<start_line>`.
    pub fn file_window(path: &str, lines: &[&str], start: usize, end: usize) -> Self {
        let filename = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Self {
            path: path.to_string(),
            symbol: format!("{}:{}", filename, start + 1),
            kind: ChunkKind::File,
            start_line: start + 1,
            end_line: end,
            text: lines[start..end].join("\n"),
        }
    }

    /// Number of source lines covered.
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_window_naming() {
        let lines = vec!["a", "b", "c", "d"];
        let chunk = Chunk::file_window("docs/notes.md", &lines, 2, 4);
        assert_eq!(chunk.symbol, "notes.md:3");
        assert_eq!(chunk.kind, ChunkKind::File);
        assert_eq!(chunk.start_line, 3);
        assert_eq!(chunk.end_line, 4);
        assert_eq!(chunk.text, "c\nd");
        assert_eq!(chunk.line_count(), 2);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ChunkKind::Function).unwrap();
        assert_eq!(json, "\"function\"");
        let kind: ChunkKind = serde_json::from_str("\"class\"").unwrap();
        assert_eq!(kind, ChunkKind::Class);
    }
}
