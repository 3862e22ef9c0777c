//! Centralized limits and thresholds.
//!
//! Recursive algorithms in the parser, checker, and dependency collector
//! bail out at these depths instead of overflowing the stack on
//! pathological input.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for expressions, statements, and types in the parser.
///
/// Beyond this depth the parser reports an "Expression expected." diagnostic
/// and stops descending.
pub const MAX_PARSER_DEPTH: u32 = 400;

/// Maximum depth for expression type checking.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 400;

/// Maximum number of base-type hops followed when walking a heritage chain.
///
/// Guards against `class A extends B {}` / `class B extends A {}` cycles in
/// declaration files, which the checker reports but does not otherwise break.
pub const MAX_BASE_TYPE_DEPTH: u32 = 64;

/// Maximum depth for structural assignability checks.
pub const MAX_ASSIGNABILITY_DEPTH: u32 = 32;
