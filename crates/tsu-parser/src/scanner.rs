//! Scanner/tokenizer.
//!
//! The scanner turns source text into a flat token vector up front. The
//! parser then walks the vector by index, which makes look-ahead and
//! speculative parsing (arrow functions) a matter of saving an index.

use serde::Serialize;
use tsu_common::diagnostics::diagnostic_codes;

/// Token and node kinds.
///
/// Token kinds come first, then keywords, then node kinds. Keyword kinds are
/// reused as node kinds for keyword types (`number`, `void`, ...) and keyword
/// expressions (`true`, `this`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,

    // Literals and names
    NumericLiteral,
    StringLiteral,
    Identifier,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    SemicolonToken,
    CommaToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    ExclamationToken,
    AmpersandAmpersandToken,
    BarBarToken,
    BarToken,
    QuestionToken,
    QuestionQuestionToken,
    ColonToken,
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,

    // Reserved words
    BreakKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    ElseKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    ThisKeyword,
    TrueKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,

    // Contextual keywords (valid identifiers outside their keyword position)
    AnyKeyword,
    AsKeyword,
    BooleanKeyword,
    ConstructorKeyword,
    DeclareKeyword,
    FromKeyword,
    InterfaceKeyword,
    LetKeyword,
    NeverKeyword,
    NumberKeyword,
    OfKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReadonlyKeyword,
    StaticKeyword,
    StringKeyword,
    TypeKeyword,
    UndefinedKeyword,
    UnknownKeyword,

    // Declarations
    SourceFile,
    FunctionDeclaration,
    Parameter,
    ClassDeclaration,
    PropertyDeclaration,
    MethodDeclaration,
    Constructor,
    InterfaceDeclaration,
    PropertySignature,
    MethodSignature,
    TypeAliasDeclaration,
    VariableStatement,
    VariableDeclaration,
    ImportDeclaration,
    ImportSpecifier,

    // Statements
    Block,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    ForStatement,
    ForOfStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    ParenthesizedExpression,
    CallExpression,
    NewExpression,
    PropertyAccessExpression,
    ElementAccessExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    TypeOfExpression,
    BinaryExpression,
    ConditionalExpression,
    ArrowFunction,
    AsExpression,

    // Types
    TypeReference,
    ArrayType,
    UnionType,
    ParenthesizedType,
    FunctionType,
    LiteralType,
}

impl SyntaxKind {
    /// Keyword kind for an identifier-shaped word, if any.
    pub fn keyword_from_text(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "break" => SyntaxKind::BreakKeyword,
            "class" => SyntaxKind::ClassKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "export" => SyntaxKind::ExportKeyword,
            "extends" => SyntaxKind::ExtendsKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "import" => SyntaxKind::ImportKeyword,
            "new" => SyntaxKind::NewKeyword,
            "null" => SyntaxKind::NullKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "super" => SyntaxKind::SuperKeyword,
            "this" => SyntaxKind::ThisKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "typeof" => SyntaxKind::TypeOfKeyword,
            "var" => SyntaxKind::VarKeyword,
            "void" => SyntaxKind::VoidKeyword,
            "while" => SyntaxKind::WhileKeyword,
            "any" => SyntaxKind::AnyKeyword,
            "as" => SyntaxKind::AsKeyword,
            "boolean" => SyntaxKind::BooleanKeyword,
            "constructor" => SyntaxKind::ConstructorKeyword,
            "declare" => SyntaxKind::DeclareKeyword,
            "from" => SyntaxKind::FromKeyword,
            "interface" => SyntaxKind::InterfaceKeyword,
            "let" => SyntaxKind::LetKeyword,
            "never" => SyntaxKind::NeverKeyword,
            "number" => SyntaxKind::NumberKeyword,
            "of" => SyntaxKind::OfKeyword,
            "private" => SyntaxKind::PrivateKeyword,
            "protected" => SyntaxKind::ProtectedKeyword,
            "public" => SyntaxKind::PublicKeyword,
            "readonly" => SyntaxKind::ReadonlyKeyword,
            "static" => SyntaxKind::StaticKeyword,
            "string" => SyntaxKind::StringKeyword,
            "type" => SyntaxKind::TypeKeyword,
            "undefined" => SyntaxKind::UndefinedKeyword,
            "unknown" => SyntaxKind::UnknownKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// Source text of a punctuation or keyword token, for diagnostics.
    pub fn token_text(self) -> &'static str {
        match self {
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::DotToken => ".",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::BarToken => "|",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::QuestionQuestionToken => "??",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::ExportKeyword => "export",
            SyntaxKind::ExtendsKeyword => "extends",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::SuperKeyword => "super",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::TypeOfKeyword => "typeof",
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::VoidKeyword => "void",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::AnyKeyword => "any",
            SyntaxKind::AsKeyword => "as",
            SyntaxKind::BooleanKeyword => "boolean",
            SyntaxKind::ConstructorKeyword => "constructor",
            SyntaxKind::DeclareKeyword => "declare",
            SyntaxKind::FromKeyword => "from",
            SyntaxKind::InterfaceKeyword => "interface",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::NeverKeyword => "never",
            SyntaxKind::NumberKeyword => "number",
            SyntaxKind::OfKeyword => "of",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::ReadonlyKeyword => "readonly",
            SyntaxKind::StaticKeyword => "static",
            SyntaxKind::StringKeyword => "string",
            SyntaxKind::TypeKeyword => "type",
            SyntaxKind::UndefinedKeyword => "undefined",
            SyntaxKind::UnknownKeyword => "unknown",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::EndOfFileToken => "end of file",
            _ => "token",
        }
    }

    pub fn is_reserved_word(self) -> bool {
        (self as u16) >= (SyntaxKind::BreakKeyword as u16)
            && (self as u16) <= (SyntaxKind::WhileKeyword as u16)
    }

    pub fn is_contextual_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AnyKeyword as u16)
            && (self as u16) <= (SyntaxKind::UnknownKeyword as u16)
    }

    /// Identifiers and contextual keywords can both name a binding.
    pub fn is_identifier_or_contextual_keyword(self) -> bool {
        self == SyntaxKind::Identifier || self.is_contextual_keyword()
    }

    /// Any word token, reserved or not. Property names accept all of these.
    pub fn is_identifier_or_keyword(self) -> bool {
        self == SyntaxKind::Identifier || self.is_reserved_word() || self.is_contextual_keyword()
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
        )
    }
}

/// A scanned token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    /// Byte offset of the first character of the token (trivia excluded).
    pub start: u32,
    pub end: u32,
    /// Whether a line break occurs between the previous token and this one.
    pub has_preceding_line_break: bool,
    /// Identifier text, numeric literal text, or cooked string literal value.
    pub value: Option<String>,
}

/// A diagnostic reported while scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: &'static str,
    pub code: u32,
}

/// Tokenizer state machine.
pub struct ScannerState<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl<'a> ScannerState<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Scan the whole text. The final token is always `EndOfFileToken`.
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<ScannerDiagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let line_break = self.skip_trivia();
            let token = self.scan_token(line_break);
            let done = token.kind == SyntaxKind::EndOfFileToken;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    /// Skip whitespace and comments, returning whether a line break was crossed.
    fn skip_trivia(&mut self) -> bool {
        let mut line_break = false;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' | b'\r' => {
                    line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => {
                    match memchr::memchr(b'\n', &self.bytes[self.pos..]) {
                        Some(offset) => self.pos += offset,
                        None => self.pos = self.bytes.len(),
                    }
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let body_start = self.pos + 2;
                    let body = &self.bytes[body_start.min(self.bytes.len())..];
                    match memchr::memmem::find(body, b"*/") {
                        Some(offset) => {
                            if memchr::memchr2(b'\n', b'\r', &body[..offset]).is_some() {
                                line_break = true;
                            }
                            self.pos = body_start + offset + 2;
                        }
                        None => {
                            self.diagnostics.push(ScannerDiagnostic {
                                start: self.pos as u32,
                                length: (self.bytes.len() - self.pos) as u32,
                                message: "'*/' expected.",
                                code: diagnostic_codes::TOKEN_EXPECTED,
                            });
                            self.pos = self.bytes.len();
                        }
                    }
                }
                b if b >= 0x80 => {
                    // Non-ASCII whitespace (NBSP, BOM, line separators)
                    let ch = self.current_char();
                    if ch == '\u{2028}' || ch == '\u{2029}' {
                        line_break = true;
                        self.pos += ch.len_utf8();
                    } else if ch.is_whitespace() || ch == '\u{FEFF}' {
                        self.pos += ch.len_utf8();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        line_break
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn current_char(&self) -> char {
        self.text[self.pos..].chars().next().unwrap_or('\0')
    }

    fn make(&self, kind: SyntaxKind, start: usize, line_break: bool) -> Token {
        Token {
            kind,
            start: start as u32,
            end: self.pos as u32,
            has_preceding_line_break: line_break,
            value: None,
        }
    }

    fn scan_token(&mut self, line_break: bool) -> Token {
        let start = self.pos;
        let Some(&byte) = self.bytes.get(self.pos) else {
            return self.make(SyntaxKind::EndOfFileToken, start, line_break);
        };

        if byte == b'"' || byte == b'\'' {
            return self.scan_string(byte, line_break);
        }
        if byte.is_ascii_digit() || (byte == b'.' && self.peek(1).is_some_and(|b| b.is_ascii_digit())) {
            return self.scan_number(line_break);
        }
        if is_identifier_start(self.current_char()) {
            return self.scan_identifier(line_break);
        }

        let (kind, width) = self.scan_punctuation(byte);
        if kind == SyntaxKind::Unknown {
            let ch = self.current_char();
            self.diagnostics.push(ScannerDiagnostic {
                start: start as u32,
                length: ch.len_utf8() as u32,
                message: diagnostic_codes::MSG_INVALID_CHARACTER,
                code: diagnostic_codes::INVALID_CHARACTER,
            });
            self.pos += ch.len_utf8();
            return self.make(SyntaxKind::Unknown, start, line_break);
        }
        self.pos += width;
        self.make(kind, start, line_break)
    }

    fn scan_punctuation(&self, byte: u8) -> (SyntaxKind, usize) {
        let next = self.peek(1);
        let next2 = self.peek(2);
        match byte {
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b'(' => (SyntaxKind::OpenParenToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b'.' => (SyntaxKind::DotToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b':' => (SyntaxKind::ColonToken, 1),
            b'%' => (SyntaxKind::PercentToken, 1),
            b'<' if next == Some(b'=') => (SyntaxKind::LessThanEqualsToken, 2),
            b'<' => (SyntaxKind::LessThanToken, 1),
            b'>' if next == Some(b'=') => (SyntaxKind::GreaterThanEqualsToken, 2),
            b'>' => (SyntaxKind::GreaterThanToken, 1),
            b'=' if next == Some(b'=') && next2 == Some(b'=') => {
                (SyntaxKind::EqualsEqualsEqualsToken, 3)
            }
            b'=' if next == Some(b'=') => (SyntaxKind::EqualsEqualsToken, 2),
            b'=' if next == Some(b'>') => (SyntaxKind::EqualsGreaterThanToken, 2),
            b'=' => (SyntaxKind::EqualsToken, 1),
            b'!' if next == Some(b'=') && next2 == Some(b'=') => {
                (SyntaxKind::ExclamationEqualsEqualsToken, 3)
            }
            b'!' if next == Some(b'=') => (SyntaxKind::ExclamationEqualsToken, 2),
            b'!' => (SyntaxKind::ExclamationToken, 1),
            b'+' if next == Some(b'+') => (SyntaxKind::PlusPlusToken, 2),
            b'+' if next == Some(b'=') => (SyntaxKind::PlusEqualsToken, 2),
            b'+' => (SyntaxKind::PlusToken, 1),
            b'-' if next == Some(b'-') => (SyntaxKind::MinusMinusToken, 2),
            b'-' if next == Some(b'=') => (SyntaxKind::MinusEqualsToken, 2),
            b'-' => (SyntaxKind::MinusToken, 1),
            b'*' if next == Some(b'=') => (SyntaxKind::AsteriskEqualsToken, 2),
            b'*' => (SyntaxKind::AsteriskToken, 1),
            b'/' if next == Some(b'=') => (SyntaxKind::SlashEqualsToken, 2),
            b'/' => (SyntaxKind::SlashToken, 1),
            b'&' if next == Some(b'&') => (SyntaxKind::AmpersandAmpersandToken, 2),
            b'|' if next == Some(b'|') => (SyntaxKind::BarBarToken, 2),
            b'|' => (SyntaxKind::BarToken, 1),
            b'?' if next == Some(b'?') => (SyntaxKind::QuestionQuestionToken, 2),
            b'?' => (SyntaxKind::QuestionToken, 1),
            _ => (SyntaxKind::Unknown, 0),
        }
    }

    fn scan_identifier(&mut self, line_break: bool) -> Token {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let ch = self.current_char();
            if is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        let text = &self.text[start..self.pos];
        match SyntaxKind::keyword_from_text(text) {
            Some(keyword) => self.make(keyword, start, line_break),
            None => {
                let mut token = self.make(SyntaxKind::Identifier, start, line_break);
                token.value = Some(text.to_string());
                token
            }
        }
    }

    fn scan_number(&mut self, line_break: bool) -> Token {
        let start = self.pos;
        if self.bytes[self.pos] == b'0' && matches!(self.peek(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
        } else {
            self.eat_digits();
            if self.peek(0) == Some(b'.') {
                self.pos += 1;
                self.eat_digits();
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
                if self.peek(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1 + sign;
                    self.eat_digits();
                }
            }
        }
        let mut token = self.make(SyntaxKind::NumericLiteral, start, line_break);
        token.value = Some(self.text[start..self.pos].replace('_', ""));
        token
    }

    fn eat_digits(&mut self) {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
    }

    fn scan_string(&mut self, quote: u8, line_break: bool) -> Token {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let mut terminated = false;

        while self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            if byte == quote {
                self.pos += 1;
                terminated = true;
                break;
            }
            if byte == b'\n' || byte == b'\r' {
                break;
            }
            if byte == b'\\' {
                self.pos += 1;
                self.scan_escape(&mut value);
                continue;
            }
            let ch = self.current_char();
            value.push(ch);
            self.pos += ch.len_utf8();
        }

        if !terminated {
            self.diagnostics.push(ScannerDiagnostic {
                start: start as u32,
                length: (self.pos - start) as u32,
                message: diagnostic_codes::MSG_UNTERMINATED_STRING_LITERAL,
                code: diagnostic_codes::UNTERMINATED_STRING_LITERAL,
            });
        }

        let mut token = self.make(SyntaxKind::StringLiteral, start, line_break);
        token.value = Some(value);
        token
    }

    fn scan_escape(&mut self, value: &mut String) {
        let Some(&byte) = self.bytes.get(self.pos) else {
            return;
        };
        self.pos += 1;
        match byte {
            b'n' => value.push('\n'),
            b't' => value.push('\t'),
            b'r' => value.push('\r'),
            b'0' => value.push('\0'),
            b'b' => value.push('\u{8}'),
            b'f' => value.push('\u{c}'),
            b'v' => value.push('\u{b}'),
            b'u' => {
                let hex_end = (self.pos + 4).min(self.bytes.len());
                let hex = self.text.get(self.pos..hex_end).unwrap_or("");
                match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) if hex.len() == 4 => {
                        value.push(ch);
                        self.pos = hex_end;
                    }
                    _ => value.push('u'),
                }
            }
            b'\r' => {
                // Line continuation
                if self.peek(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            _ => {
                // Re-decode as a full char so multi-byte escapes stay intact
                self.pos -= 1;
                let ch = self.current_char();
                value.push(ch);
                self.pos += ch.len_utf8();
            }
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        let (tokens, _) = ScannerState::new(text).scan_all();
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_scans_declaration_tokens() {
        assert_eq!(
            kinds("export function f(x: number): number {}"),
            vec![
                SyntaxKind::ExportKeyword,
                SyntaxKind::FunctionKeyword,
                SyntaxKind::Identifier,
                SyntaxKind::OpenParenToken,
                SyntaxKind::Identifier,
                SyntaxKind::ColonToken,
                SyntaxKind::NumberKeyword,
                SyntaxKind::CloseParenToken,
                SyntaxKind::ColonToken,
                SyntaxKind::NumberKeyword,
                SyntaxKind::OpenBraceToken,
                SyntaxKind::CloseBraceToken,
                SyntaxKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_longest_match_punctuation() {
        assert_eq!(
            kinds("a !== b === c => d ?? e"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::ExclamationEqualsEqualsToken,
                SyntaxKind::Identifier,
                SyntaxKind::EqualsEqualsEqualsToken,
                SyntaxKind::Identifier,
                SyntaxKind::EqualsGreaterThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::QuestionQuestionToken,
                SyntaxKind::Identifier,
                SyntaxKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia_and_track_line_breaks() {
        let (tokens, diagnostics) = ScannerState::new("a // c\n/* x\n y */ b /* z */ c").scan_all();
        assert!(diagnostics.is_empty());
        assert_eq!(tokens.len(), 4);
        assert!(tokens[1].has_preceding_line_break);
        assert!(!tokens[2].has_preceding_line_break);
        assert_eq!(tokens[2].start, 28);
    }

    #[test]
    fn test_string_escapes_are_cooked() {
        let (tokens, _) = ScannerState::new(r#"'a\'b\nA'"#).scan_all();
        assert_eq!(tokens[0].value.as_deref(), Some("a'b\nA"));
    }

    #[test]
    fn test_unterminated_string_reports_diagnostic() {
        let (_, diagnostics) = ScannerState::new("\"abc\nx").scan_all();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            diagnostic_codes::UNTERMINATED_STRING_LITERAL
        );
    }

    #[test]
    fn test_invalid_character() {
        let (tokens, diagnostics) = ScannerState::new("a # b").scan_all();
        assert_eq!(tokens[1].kind, SyntaxKind::Unknown);
        assert_eq!(diagnostics[0].code, diagnostic_codes::INVALID_CHARACTER);
    }
}
