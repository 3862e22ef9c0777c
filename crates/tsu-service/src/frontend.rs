//! The type-checking capability the analyzer drives.
//!
//! The analyzer never looks inside the checker: everything it needs goes
//! through this trait, so tests can substitute a scripted frontend and other
//! checkers can be bound in.

use std::sync::Arc;

use anyhow::Result;
use tsu_checker::{EmitOutput, Signature, SourceHost, TypeId, TypeQueryError};
use tsu_common::Diagnostic;
use tsu_parser::{NodeIndex, SourceFile};

pub trait Frontend {
    /// Bring the frontend's view of the file set up to date with `host`.
    fn synchronize(&mut self, host: &mut dyn SourceHost) -> Result<()>;

    fn source_file(&self, path: &str) -> Option<Arc<SourceFile>>;

    /// Diagnostics of `path` against the whole program.
    fn diagnostics(&mut self, path: &str) -> Vec<Diagnostic>;

    /// Emit `path`; `None` when the file is not part of the program.
    fn emit(&mut self, path: &str) -> Option<EmitOutput>;

    fn resolve_signature(&mut self, path: &str, declaration: NodeIndex) -> Option<Signature>;

    fn resolve_type(&mut self, path: &str, node: NodeIndex) -> Result<TypeId, TypeQueryError>;

    fn type_display_string(&self, type_id: TypeId) -> String;

    fn base_types_of(&self, type_id: TypeId) -> Vec<TypeId>;

    fn is_literal_type(&self, type_id: TypeId) -> bool;

    fn call_signatures(&self, type_id: TypeId) -> Vec<Signature>;

    fn construct_signatures(&self, type_id: TypeId) -> Vec<Signature>;
}
