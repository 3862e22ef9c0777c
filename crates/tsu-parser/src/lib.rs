//! Scanner, arena AST, and parser for tsu scripts.
//!
//! Scripts are written in a typed subset of TypeScript. [`SourceFile::parse`]
//! is the one-shot entry point; [`ParserState`] is exposed for callers that
//! want the arena and diagnostics separately.

use std::sync::Arc;

use tsu_common::diagnostics::Diagnostic;
use tsu_common::paths::is_declaration_file;
use tsu_common::position::{LineMap, Position};

pub mod scanner;
pub use scanner::{ScannerState, SyntaxKind, Token};

pub mod parser;
pub use parser::{
    ModifierFlags, Node, NodeArena, NodeData, NodeIndex, NodeList, ParseDiagnostic, ParserState,
    VariableKind,
};

/// A parsed source file.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub file_name: String,
    pub text: Arc<str>,
    pub arena: NodeArena,
    /// The `SourceFile` node.
    pub root: NodeIndex,
    pub parse_diagnostics: Vec<ParseDiagnostic>,
    pub line_map: LineMap,
    pub is_declaration_file: bool,
    /// Whether the file has top-level `import` or `export`. Non-module files
    /// contribute their declarations to the global scope.
    pub is_external_module: bool,
}

impl SourceFile {
    pub fn parse(file_name: impl Into<String>, text: impl Into<Arc<str>>) -> SourceFile {
        let file_name = file_name.into();
        let mut parser = ParserState::new(file_name.clone(), text);
        let root = parser.parse_source_file();
        let text = Arc::clone(&parser.text);
        let (arena, parse_diagnostics, is_external_module) = parser.into_parts();
        let line_map = LineMap::build(&text);

        SourceFile {
            is_declaration_file: is_declaration_file(&file_name),
            file_name,
            text,
            arena,
            root,
            parse_diagnostics,
            line_map,
            is_external_module,
        }
    }

    /// Top-level statements in source order.
    pub fn statements(&self) -> &[NodeIndex] {
        self.arena
            .get_source_file(self.root)
            .map_or(&[], |data| data.statements.as_slice())
    }

    /// 0-based line and UTF-16 column of a byte offset.
    pub fn position_of(&self, offset: u32) -> Position {
        self.line_map.offset_to_position(offset, &self.text)
    }

    /// Source text covered by a node.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        self.arena
            .get(index)
            .and_then(|node| self.text.get(node.pos as usize..node.end as usize))
            .unwrap_or("")
    }

    /// Syntax errors as file-attached diagnostics.
    pub fn syntactic_diagnostics(&self) -> Vec<Diagnostic> {
        self.parse_diagnostics
            .iter()
            .map(|diag| {
                Diagnostic::error(
                    self.file_name.clone(),
                    diag.start,
                    diag.length,
                    diag.message.clone(),
                    diag.code,
                )
            })
            .collect()
    }
}
