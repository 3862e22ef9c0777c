//! Diagnostic types and the single-line formatter used in service responses.
//!
//! Diagnostics are plain data. The checker and parser accumulate them, the
//! analyzer formats them with [`format_diagnostic`] and returns them inside a
//! response; they are never raised as errors.

use serde::Serialize;

use crate::position::LineMap;
use crate::paths::base_name;

/// Tag prefixed to every diagnostic produced by the type-checking frontend.
pub const FRONTEND_TAG: &str = "TS";

/// Tag prefixed to diagnostics produced by the service itself
/// (signature rejections, malformed requests).
pub const SERVICE_TAG: &str = "TSU";

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    /// Lowercase display name used in formatted diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// A diagnostic message with nested elaborations.
///
/// The head message is the primary text; `next` holds the chain of
/// "because ..." details (for example why two types are not assignable).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticMessageChain {
    pub message_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<DiagnosticMessageChain>,
}

impl DiagnosticMessageChain {
    pub fn new(message_text: impl Into<String>) -> Self {
        Self {
            message_text: message_text.into(),
            next: Vec::new(),
        }
    }

    /// Append a nested elaboration.
    #[must_use]
    pub fn chain(mut self, next: DiagnosticMessageChain) -> Self {
        self.next.push(next);
        self
    }
}

/// A parse or type-checking diagnostic.
///
/// `file` is `None` for program-wide diagnostics (configuration, missing
/// lib files). `start`/`length` are byte offsets into the file's text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub start: u32,
    pub length: u32,
    pub message: DiagnosticMessageChain,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic attached to a file span.
    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: Some(file.into()),
            start,
            length,
            message: DiagnosticMessageChain::new(message),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create an error diagnostic that is not attached to any file.
    #[must_use]
    pub fn global(message: impl Into<String>, code: u32) -> Self {
        Self {
            file: None,
            start: 0,
            length: 0,
            message: DiagnosticMessageChain::new(message),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Attach an elaboration to the head message.
    #[must_use]
    pub fn with_elaboration(mut self, next: DiagnosticMessageChain) -> Self {
        self.message.next.push(next);
        self
    }

    /// The head message text without elaborations.
    pub fn message_text(&self) -> &str {
        &self.message.message_text
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Flatten a message chain into one string.
///
/// Nested elaborations are placed on their own line (separated by
/// `new_line`) and indented two spaces per nesting level.
pub fn flatten_message_text(chain: &DiagnosticMessageChain, new_line: &str) -> String {
    let mut result = String::new();
    flatten_into(chain, new_line, 0, &mut result);
    result
}

fn flatten_into(chain: &DiagnosticMessageChain, new_line: &str, indent: usize, out: &mut String) {
    if indent > 0 {
        out.push_str(new_line);
        for _ in 0..indent {
            out.push_str("  ");
        }
    }
    out.push_str(&chain.message_text);
    for next in &chain.next {
        flatten_into(next, new_line, indent + 1, out);
    }
}

/// Render a diagnostic for a service response.
///
/// With a file: `[TS]: <basename>(<line>,<col>): <severity> TS<code>: <message>`,
/// line and column 1-based. Without a file: `[TS]: <message>`.
///
/// `source_text` is the text of `diagnostic.file`; when it is unavailable the
/// position falls back to the start of the file.
pub fn format_diagnostic(diagnostic: &Diagnostic, source_text: Option<&str>) -> String {
    let message = flatten_message_text(&diagnostic.message, "\n");

    let Some(file) = diagnostic.file.as_deref() else {
        return format!("[{FRONTEND_TAG}]: {message}");
    };

    let (line, character) = match source_text {
        Some(text) => {
            let position = LineMap::build(text).offset_to_position(diagnostic.start, text);
            (position.line + 1, position.character + 1)
        }
        None => (1, 1),
    };

    format!(
        "[{FRONTEND_TAG}]: {}({},{}): {} {}{}: {}",
        base_name(file),
        line,
        character,
        diagnostic.category.as_str(),
        FRONTEND_TAG,
        diagnostic.code,
        message
    )
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic codes and message templates shared by the parser and checker.
///
/// Codes match the TypeScript compiler so that editor tooling and users
/// recognize them.
pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const TOKEN_EXPECTED: u32 = 1005;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const IMPLEMENTATION_IN_AMBIENT_CONTEXT: u32 = 1183;
    pub const BREAK_OUTSIDE_LOOP: u32 = 1105;
    pub const CONTINUE_OUTSIDE_LOOP: u32 = 1104;
    pub const RETURN_OUTSIDE_FUNCTION: u32 = 1108;

    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: u32 = 2305;
    pub const CANNOT_FIND_MODULE: u32 = 2307;
    pub const TYPE_NOT_ASSIGNABLE: u32 = 2322;
    pub const PROPERTY_DOES_NOT_EXIST: u32 = 2339;
    pub const ARGUMENT_NOT_ASSIGNABLE: u32 = 2345;
    pub const NOT_CALLABLE: u32 = 2349;
    pub const NOT_CONSTRUCTABLE: u32 = 2351;
    pub const MUST_RETURN_A_VALUE: u32 = 2355;
    pub const PROPERTY_MISSING: u32 = 2741;
    pub const EXPECTED_ARGUMENTS: u32 = 2554;
    pub const FUNCTION_IMPLEMENTATION_MISSING: u32 = 2391;
    pub const CANNOT_ASSIGN_TO_CONSTANT: u32 = 2588;
    pub const TYPE_USED_AS_VALUE: u32 = 2693;
    pub const VALUE_USED_AS_TYPE: u32 = 2749;
    pub const IMPLICIT_ANY_PARAMETER: u32 = 7006;

    pub const MSG_UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const MSG_IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const MSG_TOKEN_EXPECTED: &str = "'{0}' expected.";
    pub const MSG_EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const MSG_TYPE_EXPECTED: &str = "Type expected.";
    pub const MSG_INVALID_CHARACTER: &str = "Invalid character.";
    pub const MSG_DECLARATION_OR_STATEMENT_EXPECTED: &str = "Declaration or statement expected.";
    pub const MSG_IMPLEMENTATION_IN_AMBIENT_CONTEXT: &str =
        "An implementation cannot be declared in ambient contexts.";
    pub const MSG_BREAK_OUTSIDE_LOOP: &str =
        "A 'break' statement can only be used within an enclosing iteration statement.";
    pub const MSG_CONTINUE_OUTSIDE_LOOP: &str =
        "A 'continue' statement can only be used within an enclosing iteration statement.";
    pub const MSG_RETURN_OUTSIDE_FUNCTION: &str =
        "A 'return' statement can only be used within a function body.";

    pub const MSG_DUPLICATE_IDENTIFIER: &str = "Duplicate identifier '{0}'.";
    pub const MSG_CANNOT_FIND_NAME: &str = "Cannot find name '{0}'.";
    pub const MSG_MODULE_HAS_NO_EXPORTED_MEMBER: &str = "Module '\"{0}\"' has no exported member '{1}'.";
    pub const MSG_CANNOT_FIND_MODULE: &str =
        "Cannot find module '{0}' or its corresponding type declarations.";
    pub const MSG_TYPE_NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const MSG_PROPERTY_DOES_NOT_EXIST: &str = "Property '{0}' does not exist on type '{1}'.";
    pub const MSG_ARGUMENT_NOT_ASSIGNABLE: &str =
        "Argument of type '{0}' is not assignable to parameter of type '{1}'.";
    pub const MSG_NOT_CALLABLE: &str = "This expression is not callable.";
    pub const MSG_NOT_CONSTRUCTABLE: &str = "This expression is not constructable.";
    pub const MSG_MUST_RETURN_A_VALUE: &str =
        "A function whose declared type is neither 'void' nor 'any' must return a value.";
    pub const MSG_PROPERTY_MISSING: &str =
        "Property '{0}' is missing in type '{1}' but required in type '{2}'.";
    pub const MSG_EXPECTED_ARGUMENTS: &str = "Expected {0} arguments, but got {1}.";
    pub const MSG_FUNCTION_IMPLEMENTATION_MISSING: &str =
        "Function implementation is missing or not immediately following the declaration.";
    pub const MSG_CANNOT_ASSIGN_TO_CONSTANT: &str =
        "Cannot assign to '{0}' because it is a constant.";
    pub const MSG_TYPE_USED_AS_VALUE: &str =
        "'{0}' only refers to a type, but is being used as a value here.";
    pub const MSG_VALUE_USED_AS_TYPE: &str =
        "'{0}' refers to a value, but is being used as a type here.";
    pub const MSG_IMPLICIT_ANY_PARAMETER: &str = "Parameter '{0}' implicitly has an 'any' type.";
}
