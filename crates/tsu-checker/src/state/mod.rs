//! Checker state.
//!
//! `CheckerState` owns the bound program and all type information derived
//! from it. Work happens in two modes:
//!
//! - **Lazy resolution** (`type_of_symbol`, `signature_of`, class and
//!   interface types) runs on demand from any file, always speculatively:
//!   diagnostics raised while resolving are dropped and no node types are
//!   recorded.
//! - **Full check** (`check_file`) walks one file top to bottom, reports its
//!   diagnostics and records a type for every expression, type node and
//!   declaration name. Type queries are answered from these records.
//!
//! The impl is split across `state_*` files by concern.

mod state_checking;
mod state_expressions;
mod state_symbols;
mod state_type_resolution;

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};
use tsu_common::diagnostics::{Diagnostic, DiagnosticMessageChain};
use tsu_parser::{NodeIndex, SourceFile, SyntaxKind};

use crate::binder::{BinderState, DeclRef, FileId, ScopeId, SymbolId};
use crate::interner::TypeInterner;
use crate::types::{Signature, TypeId};

/// Options that change checking results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckerOptions {
    /// `null` and `undefined` are only assignable to themselves (and
    /// `any`/`unknown`) when set.
    pub strict: bool,
    pub no_implicit_any: bool,
}

/// Why a type query produced no type. Callers treat this as "skip the node".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeQueryError {
    UnknownFile(String),
    /// The node is not part of the file, or not a node that has a type
    /// (statements, lists, modifiers).
    NoType { node: NodeIndex, kind: SyntaxKind },
}

impl fmt::Display for TypeQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeQueryError::UnknownFile(path) => write!(f, "file is not part of the program: {path}"),
            TypeQueryError::NoType { node, kind } => {
                write!(f, "node {} ({kind:?}) has no type", node.0)
            }
        }
    }
}

impl std::error::Error for TypeQueryError {}

/// Instance and constructor types of a class.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClassTypes {
    pub instance: TypeId,
    pub constructor: TypeId,
}

/// Per-function state while checking a body.
#[derive(Clone, Debug)]
pub(crate) struct FunctionContext {
    /// Annotated return type; `None` while inferring.
    pub declared_return: Option<TypeId>,
    /// Types of `return expr;` statements seen so far.
    pub return_types: Vec<TypeId>,
    pub has_value_return: bool,
}

/// Where the checker currently is.
#[derive(Clone, Debug)]
pub(crate) struct CheckContext {
    pub file: FileId,
    pub scope: ScopeId,
    pub functions: Vec<FunctionContext>,
    pub this_types: Vec<TypeId>,
    pub loop_depth: u32,
    /// Diagnostics and node types are only recorded at zero.
    pub speculative: u32,
    pub expr_depth: u32,
}

impl CheckContext {
    fn new(file: FileId, scope: ScopeId) -> Self {
        CheckContext {
            file,
            scope,
            functions: Vec::new(),
            this_types: Vec::new(),
            loop_depth: 0,
            speculative: 0,
            expr_depth: 0,
        }
    }
}

pub struct CheckerState {
    files: Vec<Arc<SourceFile>>,
    file_index: FxHashMap<String, FileId>,
    binder: BinderState,
    pub interner: TypeInterner,
    options: CheckerOptions,

    // Lazy resolution caches.
    symbol_types: FxHashMap<SymbolId, TypeId>,
    declared_types: FxHashMap<SymbolId, TypeId>,
    class_types: FxHashMap<SymbolId, ClassTypes>,
    interface_types: FxHashMap<SymbolId, TypeId>,
    resolving_symbols: FxHashSet<SymbolId>,
    resolving_declared: FxHashSet<SymbolId>,
    resolving_signatures: FxHashSet<DeclRef>,
    signatures: FxHashMap<DeclRef, Signature>,
    /// Function types of arrow functions, by node.
    function_types: FxHashMap<DeclRef, TypeId>,
    /// Parameter types supplied by the context an arrow function appears in.
    contextual_param_types: FxHashMap<DeclRef, TypeId>,
    /// Class member → class symbol, for `this` inside lazily resolved members.
    member_owners: FxHashMap<DeclRef, SymbolId>,
    apparent_members: FxHashMap<(TypeId, &'static str), TypeId>,

    // Full check results.
    node_types: Vec<FxHashMap<NodeIndex, TypeId>>,
    diagnostics: Vec<Vec<Diagnostic>>,
    checked: Vec<bool>,

    pub(crate) ctx: CheckContext,
}

impl CheckerState {
    /// Bind `files` and prepare to check them. `files[i]` gets `FileId` `i`.
    pub fn new(files: Vec<Arc<SourceFile>>, options: CheckerOptions) -> Self {
        let binder = BinderState::bind_program(&files);
        let file_index = files
            .iter()
            .enumerate()
            .map(|(id, file)| (file.file_name.clone(), id))
            .collect();
        let count = files.len();
        CheckerState {
            files,
            file_index,
            binder,
            interner: TypeInterner::new(),
            options,
            symbol_types: FxHashMap::default(),
            declared_types: FxHashMap::default(),
            class_types: FxHashMap::default(),
            interface_types: FxHashMap::default(),
            resolving_symbols: FxHashSet::default(),
            resolving_declared: FxHashSet::default(),
            resolving_signatures: FxHashSet::default(),
            signatures: FxHashMap::default(),
            function_types: FxHashMap::default(),
            contextual_param_types: FxHashMap::default(),
            member_owners: FxHashMap::default(),
            apparent_members: FxHashMap::default(),
            node_types: vec![FxHashMap::default(); count],
            diagnostics: vec![Vec::new(); count],
            checked: vec![false; count],
            ctx: CheckContext::new(0, ScopeId::GLOBAL),
        }
    }

    // =========================================================================
    // Program access
    // =========================================================================

    pub fn options(&self) -> CheckerOptions {
        self.options
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.file_index.get(path).copied()
    }

    pub fn source_file(&self, file: FileId) -> Option<&Arc<SourceFile>> {
        self.files.get(file)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn binder(&self) -> &BinderState {
        &self.binder
    }

    /// File the checker is currently positioned in.
    pub(crate) fn current_file(&self) -> Arc<SourceFile> {
        Arc::clone(&self.files[self.ctx.file])
    }

    // =========================================================================
    // Full check
    // =========================================================================

    /// Check a file once; later calls are no-ops.
    pub fn check_file(&mut self, file: FileId) {
        if self.checked.get(file).copied().unwrap_or(true) {
            return;
        }
        self.checked[file] = true;

        let Some(source) = self.files.get(file).cloned() else {
            return;
        };
        let saved = std::mem::replace(
            &mut self.ctx,
            CheckContext::new(file, self.binder.file_scope(file)),
        );
        for &statement in source.statements() {
            self.check_statement(statement);
        }
        self.ctx = saved;

        debug!(
            file = %source.file_name,
            diagnostics = self.diagnostics[file].len(),
            typed_nodes = self.node_types[file].len(),
            "checked file"
        );
    }

    /// Binder and checker diagnostics of a file, sorted by position.
    pub fn semantic_diagnostics(&mut self, file: FileId) -> Vec<Diagnostic> {
        self.check_file(file);
        let mut all: Vec<Diagnostic> = self.binder.diagnostics(file).to_vec();
        if let Some(checker) = self.diagnostics.get(file) {
            all.extend(checker.iter().cloned());
        }
        all.sort_by_key(|d| (d.start, d.code));
        all.dedup_by(|a, b| a.start == b.start && a.code == b.code && a.message == b.message);
        all
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Type recorded for `node` by the full check of `file`.
    pub fn type_at(&mut self, file: FileId, node: NodeIndex) -> Result<TypeId, TypeQueryError> {
        let Some(source) = self.files.get(file).cloned() else {
            return Err(TypeQueryError::UnknownFile(file.to_string()));
        };
        self.check_file(file);
        match self.node_types[file].get(&node) {
            Some(&type_id) => Ok(type_id),
            None => {
                let kind = source.arena.kind(node);
                trace!(node = node.0, ?kind, "no type recorded for node");
                Err(TypeQueryError::NoType { node, kind })
            }
        }
    }

    /// Signature of a function-like declaration.
    pub fn function_signature(&mut self, file: FileId, node: NodeIndex) -> Option<Signature> {
        self.files.get(file)?.arena.get_function(node)?;
        self.check_file(file);
        let scope = self
            .binder
            .node_scope(file, node)
            .unwrap_or_else(|| self.binder.file_scope(file));
        Some(self.with_declaration_context(file, scope, |checker| checker.signature_of(node)))
    }

    pub fn type_to_string(&self, type_id: TypeId) -> String {
        self.interner.type_to_string(type_id)
    }

    pub fn is_literal_type(&self, type_id: TypeId) -> bool {
        self.interner.is_literal(type_id)
    }

    pub fn call_signatures(&self, type_id: TypeId) -> &[Signature] {
        self.interner.call_signatures(type_id)
    }

    pub fn construct_signatures(&self, type_id: TypeId) -> &[Signature] {
        self.interner.construct_signatures(type_id)
    }

    pub fn base_types(&self, type_id: TypeId) -> Vec<TypeId> {
        self.interner.base_types(type_id).to_vec()
    }

    /// Declared name of a class or interface type.
    pub fn type_symbol_name(&self, type_id: TypeId) -> Option<&str> {
        self.interner
            .object_shape(type_id)
            .and_then(|shape| shape.name.as_deref())
    }

    // =========================================================================
    // Context helpers
    // =========================================================================

    /// Run `f` positioned at a declaration in `file`, speculatively.
    pub(crate) fn with_declaration_context<R>(
        &mut self,
        file: FileId,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let next = CheckContext {
            file,
            scope,
            functions: Vec::new(),
            this_types: self.this_type_for_scope(scope).into_iter().collect(),
            loop_depth: 0,
            speculative: self.ctx.speculative + 1,
            expr_depth: self.ctx.expr_depth,
        };
        let saved = std::mem::replace(&mut self.ctx, next);
        let result = f(self);
        self.ctx = saved;
        result
    }

    /// Run `f` with `scope` as the current scope.
    pub(crate) fn with_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.ctx.scope, scope);
        let result = f(self);
        self.ctx.scope = saved;
        result
    }

    /// Run `f` without reporting diagnostics or recording node types.
    pub(crate) fn speculatively<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.speculative += 1;
        let result = f(self);
        self.ctx.speculative -= 1;
        result
    }

    pub(crate) fn is_speculative(&self) -> bool {
        self.ctx.speculative > 0
    }

    pub(crate) fn decl_ref(&self, node: NodeIndex) -> DeclRef {
        DeclRef {
            file: self.ctx.file,
            node,
        }
    }

    /// `this` inside `scope`: the instance type of the class whose member
    /// encloses it. Arrow functions are transparent.
    pub(crate) fn this_type_for_scope(&self, scope: ScopeId) -> Option<TypeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.binder.scope(id)?;
            if scope.is_function && scope.node.is_some() {
                let file = scope.file?;
                let decl = DeclRef {
                    file,
                    node: scope.node,
                };
                if let Some(owner) = self.member_owners.get(&decl) {
                    return self.class_types.get(owner).map(|types| types.instance);
                }
                if self.files[file].arena.kind(scope.node) != SyntaxKind::ArrowFunction {
                    return None;
                }
            }
            current = scope.parent;
        }
        None
    }

    /// Scope introduced by `node` in the current file, or the current scope.
    pub(crate) fn scope_of_node(&self, node: NodeIndex) -> ScopeId {
        self.binder
            .node_scope(self.ctx.file, node)
            .unwrap_or(self.ctx.scope)
    }

    pub(crate) fn record_type(&mut self, node: NodeIndex, type_id: TypeId) {
        if self.is_speculative() || node.is_none() {
            return;
        }
        if let Some(types) = self.node_types.get_mut(self.ctx.file) {
            types.insert(node, type_id);
        }
    }

    // =========================================================================
    // Error reporting
    // =========================================================================

    /// Report an error spanning `node` in the current file.
    pub(crate) fn error_at_node(&mut self, node: NodeIndex, message: String, code: u32) {
        self.error_at_node_with(node, message, code, None);
    }

    pub(crate) fn error_at_node_with(
        &mut self,
        node: NodeIndex,
        message: String,
        code: u32,
        elaboration: Option<DiagnosticMessageChain>,
    ) {
        if self.is_speculative() {
            return;
        }
        let file = self.current_file();
        let Some(n) = file.arena.get(node) else {
            return;
        };
        let (start, length) = (n.pos, n.end.saturating_sub(n.pos));
        self.error_at_span(start, length, message, code, elaboration);
    }

    pub(crate) fn error_at_span(
        &mut self,
        start: u32,
        length: u32,
        message: String,
        code: u32,
        elaboration: Option<DiagnosticMessageChain>,
    ) {
        if self.is_speculative() {
            return;
        }
        let file_name = self.files[self.ctx.file].file_name.clone();
        let mut diagnostic = Diagnostic::error(file_name, start, length, message, code);
        if let Some(chain) = elaboration {
            diagnostic = diagnostic.with_elaboration(chain);
        }
        self.diagnostics[self.ctx.file].push(diagnostic);
    }
}

#[cfg(test)]
#[path = "../../tests/checker_state_tests.rs"]
mod tests;
