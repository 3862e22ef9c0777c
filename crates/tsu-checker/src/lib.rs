//! Type-checking frontend for tsu scripts.
//!
//! This crate provides:
//! - The binder (`BinderState`): symbols, scopes, imports
//! - Type representation and interning (`TypeId`, `TypeInterner`)
//! - The checker (`CheckerState`): diagnostics and per-node type queries
//! - A type-erasing JavaScript emitter
//! - `Program`: the incremental file set the service drives

// Symbols and scopes
pub mod binder;
pub use binder::{BinderState, DeclRef, FileId, ScopeId, SymbolFlags, SymbolId};

// Types
pub mod types;
pub use types::{ObjectKind, ObjectShape, ParamInfo, PropertyInfo, Signature, TypeData, TypeId};

pub mod interner;
pub use interner::TypeInterner;

// Checking
pub mod state;
pub use state::{CheckerOptions, CheckerState, TypeQueryError};

mod apparent_types;
mod assignability_checker;

// Imports
pub mod module_resolution;

// Output
pub mod emitter;
pub use emitter::{EmitOptions, EmitOutput, EmittedArtifact};

// Program
pub mod program;
pub use program::{CompilerOptions, Program, SourceHost};
