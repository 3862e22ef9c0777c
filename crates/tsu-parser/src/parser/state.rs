//! Parser state - token cursor, diagnostics, and shared helpers.
//!
//! The parser consumes the token vector produced by [`ScannerState`] by
//! index. Look-ahead reads `tokens[pos + n]`; speculative parsing saves the
//! index, the arena length, and the diagnostic count, and restores all three
//! when the attempt is abandoned.

use std::sync::Arc;

use tsu_common::diagnostics::{diagnostic_codes, format_message};
use tsu_common::limits::MAX_PARSER_DEPTH;

use super::node::{IdentifierData, LiteralData, NodeArena, NodeData, NodeIndex};
use crate::scanner::{ScannerState, SyntaxKind, Token};

/// A syntax error found while scanning or parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: String,
    pub code: u32,
}

/// Saved cursor for speculative parsing.
#[derive(Clone, Copy)]
pub(crate) struct ParserSnapshot {
    pos: usize,
    arena_len: usize,
    diagnostics_len: usize,
    last_error_pos: Option<u32>,
}

/// Recursive-descent parser over a pre-scanned token vector.
pub struct ParserState {
    pub(crate) file_name: String,
    pub(crate) text: Arc<str>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) arena: NodeArena,
    pub(crate) parse_diagnostics: Vec<ParseDiagnostic>,
    pub(crate) recursion_depth: u32,
    /// Position of the last reported error; a second error at the same
    /// position is dropped.
    pub(crate) last_error_pos: Option<u32>,
    /// Whether an `import` or `export` was seen at the top level.
    pub(crate) has_module_syntax: bool,
}

impl ParserState {
    pub fn new(file_name: String, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let (tokens, scanner_diagnostics) = ScannerState::new(&text).scan_all();
        let parse_diagnostics = scanner_diagnostics
            .into_iter()
            .map(|diag| ParseDiagnostic {
                start: diag.start,
                length: diag.length,
                message: diag.message.to_string(),
                code: diag.code,
            })
            .collect();

        ParserState {
            file_name,
            text,
            tokens,
            pos: 0,
            arena: NodeArena::new(),
            parse_diagnostics,
            recursion_depth: 0,
            last_error_pos: None,
            has_module_syntax: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn get_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    /// Consume the parser, returning the arena, diagnostics sorted by
    /// position, and whether the file uses module syntax.
    pub fn into_parts(mut self) -> (NodeArena, Vec<ParseDiagnostic>, bool) {
        self.parse_diagnostics.sort_by_key(|d| d.start);
        (self.arena, self.parse_diagnostics, self.has_module_syntax)
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    /// The current token. The vector always ends with `EndOfFileToken`, so
    /// reads past the end see that token.
    #[inline]
    pub(crate) fn token(&self) -> &Token {
        self.token_at(0)
    }

    pub(crate) fn token_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    #[inline]
    pub(crate) fn kind(&self) -> SyntaxKind {
        self.token().kind
    }

    #[inline]
    pub(crate) fn look_ahead(&self, offset: usize) -> SyntaxKind {
        self.token_at(offset).kind
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn token_start(&self) -> u32 {
        self.token().start
    }

    pub(crate) fn token_end(&self) -> u32 {
        self.token().end
    }

    /// End of the most recently consumed token; used as the end of nodes.
    pub(crate) fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.token_at_index(self.pos - 1).end
        }
    }

    fn token_at_index(&self, index: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[index.min(last)]
    }

    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.token().has_preceding_line_break
    }

    pub(crate) fn token_value(&self) -> String {
        self.token().value.clone().unwrap_or_default()
    }

    pub(crate) fn next_token(&mut self) {
        if !self.is_token(SyntaxKind::EndOfFileToken) {
            self.pos += 1;
        }
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `'x' expected.` at the current token.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.error_token_expected(kind.token_text());
        false
    }

    pub(crate) fn can_parse_semicolon(&self) -> bool {
        matches!(
            self.kind(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    /// Consume a statement terminator, allowing automatic insertion.
    pub(crate) fn parse_semicolon(&mut self) -> bool {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return true;
        }
        if self.can_parse_semicolon() {
            return true;
        }
        self.error_token_expected(";");
        false
    }

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            pos: self.pos,
            arena_len: self.arena.len(),
            diagnostics_len: self.parse_diagnostics.len(),
            last_error_pos: self.last_error_pos,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.pos = snapshot.pos;
        self.arena.truncate(snapshot.arena_len);
        self.parse_diagnostics.truncate(snapshot.diagnostics_len);
        self.last_error_pos = snapshot.last_error_pos;
    }

    /// Run `f`; if it returns `None` or reports a new error, rewind.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Some(value) if self.parse_diagnostics.len() == snapshot.diagnostics_len => Some(value),
            _ => {
                self.restore(snapshot);
                None
            }
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, message: String, code: u32) {
        if self.last_error_pos == Some(start) {
            return;
        }
        self.last_error_pos = Some(start);
        self.parse_diagnostics.push(ParseDiagnostic {
            start,
            length,
            message,
            code,
        });
    }

    pub(crate) fn parse_error_at_current_token(&mut self, message: String, code: u32) {
        let start = self.token_start();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, message, code);
    }

    pub(crate) fn error_token_expected(&mut self, token: &str) {
        self.parse_error_at_current_token(
            format_message(diagnostic_codes::MSG_TOKEN_EXPECTED, &[token]),
            diagnostic_codes::TOKEN_EXPECTED,
        );
    }

    pub(crate) fn error_identifier_expected(&mut self) {
        self.parse_error_at_current_token(
            diagnostic_codes::MSG_IDENTIFIER_EXPECTED.to_string(),
            diagnostic_codes::IDENTIFIER_EXPECTED,
        );
    }

    pub(crate) fn error_expression_expected(&mut self) {
        self.parse_error_at_current_token(
            diagnostic_codes::MSG_EXPRESSION_EXPECTED.to_string(),
            diagnostic_codes::EXPRESSION_EXPECTED,
        );
    }

    pub(crate) fn error_type_expected(&mut self) {
        self.parse_error_at_current_token(
            diagnostic_codes::MSG_TYPE_EXPECTED.to_string(),
            diagnostic_codes::TYPE_EXPECTED,
        );
    }

    /// Enter a recursive production. Returns false (after reporting) once the
    /// nesting limit is hit; the caller must not descend further.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_DEPTH {
            self.error_expression_expected();
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Leaf nodes
    // =========================================================================

    /// Placeholder identifier with empty text at the current token.
    pub(crate) fn missing_identifier(&mut self) -> NodeIndex {
        let pos = self.token_start();
        self.arena.add(
            SyntaxKind::Identifier,
            pos,
            pos,
            NodeData::Identifier(IdentifierData {
                text: String::new(),
            }),
        )
    }

    /// Consume the current word token as an identifier node. Any word is
    /// accepted so that property names like `default` and `class` parse.
    pub(crate) fn create_identifier_from_token(&mut self) -> NodeIndex {
        let start = self.token_start();
        let end = self.token_end();
        let text = match &self.token().value {
            Some(value) => value.clone(),
            None => self.kind().token_text().to_string(),
        };
        self.next_token();
        self.arena.add(
            SyntaxKind::Identifier,
            start,
            end,
            NodeData::Identifier(IdentifierData { text }),
        )
    }

    /// Parse a binding identifier.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.kind().is_identifier_or_contextual_keyword() {
            return self.create_identifier_from_token();
        }
        self.error_identifier_expected();
        self.missing_identifier()
    }

    /// Parse a property name: any word, a string literal, or a number.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        match self.kind() {
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral => self.parse_literal(),
            kind if kind.is_identifier_or_keyword() => self.create_identifier_from_token(),
            _ => {
                self.error_identifier_expected();
                self.missing_identifier()
            }
        }
    }

    pub(crate) fn parse_literal(&mut self) -> NodeIndex {
        let kind = self.kind();
        let start = self.token_start();
        let end = self.token_end();
        let text = self.token_value();
        self.next_token();
        self.arena
            .add(kind, start, end, NodeData::Literal(LiteralData { text }))
    }

    /// A childless node for the current keyword token.
    pub(crate) fn parse_token_node(&mut self) -> NodeIndex {
        let kind = self.kind();
        let start = self.token_start();
        let end = self.token_end();
        self.next_token();
        self.arena.add(kind, start, end, NodeData::Token)
    }
}
