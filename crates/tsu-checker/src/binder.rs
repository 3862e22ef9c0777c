//! Binder: symbols and scopes for a set of source files.
//!
//! The binder walks every file once and records:
//! - a symbol per declared name, merged across declarations where the
//!   language allows it (interfaces, function overloads, class + interface),
//! - a scope tree (global scope, one scope per module file, function and
//!   block scopes below that),
//! - the exports of each module file and the targets of its imports.
//!
//! Files without top-level `import`/`export` are scripts: their top-level
//! declarations land in the shared global scope, which is how ambient
//! declaration files make host types visible everywhere.

use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use tsu_common::diagnostics::{Diagnostic, diagnostic_codes, format_message};
use tsu_parser::{NodeData, NodeIndex, SourceFile, SyntaxKind, VariableKind};

use crate::module_resolution::resolve_module;

/// Index of a file in the program's file list.
pub type FileId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const VARIABLE = 1 << 0;
        const FUNCTION = 1 << 1;
        const CLASS = 1 << 2;
        const INTERFACE = 1 << 3;
        const TYPE_ALIAS = 1 << 4;
        const PARAMETER = 1 << 5;
        /// Import binding; meaning comes from the target.
        const ALIAS = 1 << 6;
        /// Built-in ambient value (`undefined`, `NaN`, ...).
        const BUILTIN = 1 << 7;

        const VALUE = Self::VARIABLE.bits()
            | Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::PARAMETER.bits()
            | Self::BUILTIN.bits();
        const TYPE = Self::CLASS.bits() | Self::INTERFACE.bits() | Self::TYPE_ALIAS.bits();
    }
}

/// A declaration site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeclRef {
    pub file: FileId,
    pub node: NodeIndex,
}

/// Where an import binding points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportTarget {
    pub module_specifier: String,
    pub resolved_file: Option<FileId>,
    pub export_name: String,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub flags: SymbolFlags,
    pub declarations: Vec<DeclRef>,
    pub is_exported: bool,
    /// `const` variable; assignments are rejected.
    pub is_const: bool,
    pub import: Option<ImportTarget>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub file: Option<FileId>,
    /// Node that introduced the scope; NONE for file and global scopes.
    pub node: NodeIndex,
    /// Function scopes receive hoisted `var` declarations.
    pub is_function: bool,
    pub symbols: FxHashMap<String, SymbolId>,
}

/// Names every program can use without declaring them.
const BUILTIN_VALUES: &[&str] = &["undefined", "NaN", "Infinity", "console", "Math", "JSON"];

/// Binding result for a whole program.
pub struct BinderState {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    /// Root scope of each file: the global scope for scripts, a module scope
    /// otherwise.
    file_scopes: Vec<ScopeId>,
    file_exports: Vec<FxHashMap<String, SymbolId>>,
    /// Scopes introduced by function-like nodes, blocks and `for` statements.
    node_scopes: FxHashMap<DeclRef, ScopeId>,
    /// Scope each declaration was declared in.
    declaration_scopes: FxHashMap<DeclRef, ScopeId>,
    declaration_symbols: FxHashMap<DeclRef, SymbolId>,
    /// `for (const x of xs)`: declaration → iterated expression.
    for_of_declarations: FxHashMap<DeclRef, NodeIndex>,
    diagnostics: Vec<Vec<Diagnostic>>,
    reported_duplicates: FxHashSet<DeclRef>,
}

impl BinderState {
    /// Bind all files. `files[i]` gets `FileId` `i`.
    pub fn bind_program(files: &[Arc<SourceFile>]) -> BinderState {
        let mut binder = BinderState {
            symbols: Vec::new(),
            scopes: vec![Scope {
                parent: None,
                file: None,
                node: NodeIndex::NONE,
                is_function: true,
                symbols: FxHashMap::default(),
            }],
            file_scopes: Vec::with_capacity(files.len()),
            file_exports: vec![FxHashMap::default(); files.len()],
            node_scopes: FxHashMap::default(),
            declaration_scopes: FxHashMap::default(),
            declaration_symbols: FxHashMap::default(),
            for_of_declarations: FxHashMap::default(),
            diagnostics: vec![Vec::new(); files.len()],
            reported_duplicates: FxHashSet::default(),
        };

        for name in BUILTIN_VALUES {
            let id = binder.alloc_symbol(Symbol {
                name: (*name).to_string(),
                flags: SymbolFlags::BUILTIN,
                declarations: Vec::new(),
                is_exported: false,
                is_const: true,
                import: None,
            });
            binder.scopes[0].symbols.insert((*name).to_string(), id);
        }

        let path_index: FxHashMap<&str, FileId> = files
            .iter()
            .enumerate()
            .map(|(id, file)| (file.file_name.as_str(), id))
            .collect();

        for (file_id, file) in files.iter().enumerate() {
            let root = if file.is_external_module {
                binder.alloc_scope(Some(ScopeId::GLOBAL), Some(file_id), NodeIndex::NONE, true)
            } else {
                ScopeId::GLOBAL
            };
            binder.file_scopes.push(root);

            let mut walker = FileBinder {
                binder: &mut binder,
                file,
                file_id,
                path_index: &path_index,
            };
            for &statement in file.statements() {
                walker.bind_statement(statement, root, true);
            }
        }

        debug!(
            files = files.len(),
            symbols = binder.symbols.len(),
            scopes = binder.scopes.len(),
            "bound program"
        );
        binder
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn file_scope(&self, file: FileId) -> ScopeId {
        self.file_scopes
            .get(file)
            .copied()
            .unwrap_or(ScopeId::GLOBAL)
    }

    pub fn exports_of(&self, file: FileId) -> Option<&FxHashMap<String, SymbolId>> {
        self.file_exports.get(file)
    }

    pub fn node_scope(&self, file: FileId, node: NodeIndex) -> Option<ScopeId> {
        self.node_scopes.get(&DeclRef { file, node }).copied()
    }

    pub fn declaration_scope(&self, file: FileId, node: NodeIndex) -> Option<ScopeId> {
        self.declaration_scopes.get(&DeclRef { file, node }).copied()
    }

    pub fn symbol_of_declaration(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        self.declaration_symbols.get(&DeclRef { file, node }).copied()
    }

    pub fn for_of_iterated(&self, file: FileId, declaration: NodeIndex) -> Option<NodeIndex> {
        self.for_of_declarations
            .get(&DeclRef {
                file,
                node: declaration,
            })
            .copied()
    }

    pub fn diagnostics(&self, file: FileId) -> &[Diagnostic] {
        self.diagnostics.get(file).map_or(&[], Vec::as_slice)
    }

    /// Look `name` up from `scope` outwards, keeping only symbols whose
    /// flags intersect `meaning`. Aliases always match.
    pub fn resolve_name(&self, scope: ScopeId, name: &str, meaning: SymbolFlags) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let scope = self.scope(scope_id)?;
            if let Some(&id) = scope.symbols.get(name)
                && let Some(symbol) = self.symbol(id)
                && (symbol.flags.intersects(meaning) || symbol.flags.contains(SymbolFlags::ALIAS))
            {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    // =========================================================================
    // Construction helpers
    // =========================================================================

    fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    fn alloc_scope(
        &mut self,
        parent: Option<ScopeId>,
        file: Option<FileId>,
        node: NodeIndex,
        is_function: bool,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            file,
            node,
            is_function,
            symbols: FxHashMap::default(),
        });
        id
    }

    /// Nearest enclosing function (or file) scope, for `var` hoisting.
    fn function_scope_of(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            match self.scope(current) {
                Some(s) if s.is_function => return current,
                Some(Scope {
                    parent: Some(parent),
                    ..
                }) => current = *parent,
                _ => return current,
            }
        }
    }
}

/// Whether a new declaration with `new` flags may merge into a symbol that
/// already has `existing` flags.
fn can_merge(existing: SymbolFlags, new: SymbolFlags) -> bool {
    let pair = existing | new;
    (existing == SymbolFlags::INTERFACE && new == SymbolFlags::INTERFACE)
        || (existing == SymbolFlags::FUNCTION && new == SymbolFlags::FUNCTION)
        || pair == SymbolFlags::CLASS | SymbolFlags::INTERFACE
}

/// Per-file binding walk.
struct FileBinder<'a> {
    binder: &'a mut BinderState,
    file: &'a SourceFile,
    file_id: FileId,
    path_index: &'a FxHashMap<&'a str, FileId>,
}

impl FileBinder<'_> {
    fn decl(&self, node: NodeIndex) -> DeclRef {
        DeclRef {
            file: self.file_id,
            node,
        }
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        name_node: NodeIndex,
        declaration: NodeIndex,
        flags: SymbolFlags,
        is_exported: bool,
        is_const: bool,
    ) -> Option<SymbolId> {
        let name = self.file.arena.identifier_text(name_node)?;
        if name.is_empty() {
            return None;
        }
        let name = name.to_string();
        let decl = self.decl(declaration);
        self.binder.declaration_scopes.insert(decl, scope);

        let existing = self
            .binder
            .scope(scope)
            .and_then(|s| s.symbols.get(&name).copied());

        let id = match existing {
            Some(id) => {
                let (existing_flags, first_decl) = match self.binder.symbol(id) {
                    Some(symbol) => (symbol.flags, symbol.declarations.first().copied()),
                    None => return None,
                };
                if !can_merge(existing_flags, flags) {
                    self.report_duplicate(&name, decl, name_node);
                    if let Some(first) = first_decl {
                        self.report_duplicate_elsewhere(&name, first);
                    }
                }
                if let Some(symbol) = self.binder.symbols.get_mut(id.0 as usize) {
                    symbol.flags |= flags;
                    symbol.declarations.push(decl);
                    symbol.is_exported |= is_exported;
                }
                id
            }
            None => {
                let id = self.binder.alloc_symbol(Symbol {
                    name: name.clone(),
                    flags,
                    declarations: vec![decl],
                    is_exported,
                    is_const,
                    import: None,
                });
                if let Some(s) = self.binder.scopes.get_mut(scope.0 as usize) {
                    s.symbols.insert(name.clone(), id);
                }
                id
            }
        };

        if is_exported && let Some(exports) = self.binder.file_exports.get_mut(self.file_id) {
            exports.insert(name, id);
        }
        self.binder.declaration_symbols.insert(decl, id);
        Some(id)
    }

    fn report_duplicate(&mut self, name: &str, decl: DeclRef, name_node: NodeIndex) {
        if !self.binder.reported_duplicates.insert(decl) {
            return;
        }
        let Some(node) = self.file.arena.get(name_node) else {
            return;
        };
        self.binder.diagnostics[self.file_id].push(Diagnostic::error(
            self.file.file_name.clone(),
            node.pos,
            node.end - node.pos,
            format_message(diagnostic_codes::MSG_DUPLICATE_IDENTIFIER, &[name]),
            diagnostic_codes::DUPLICATE_IDENTIFIER,
        ));
    }

    /// Report on the first declaration as well. Only same-file declarations
    /// are reported.
    fn report_duplicate_elsewhere(&mut self, name: &str, first: DeclRef) {
        if first.file != self.file_id {
            return;
        }
        let name_node = declaration_name(self.file, first.node);
        self.report_duplicate(name, first, name_node);
    }

    // =========================================================================
    // Walk
    // =========================================================================

    fn bind_statement(&mut self, node: NodeIndex, scope: ScopeId, top_level: bool) {
        let file = self.file;
        let arena = &file.arena;
        let Some(n) = arena.get(node) else {
            return;
        };
        let exported = top_level && arena.modifiers(node).contains(tsu_parser::ModifierFlags::EXPORT);

        match (&n.data, n.kind) {
            (NodeData::Function(func), SyntaxKind::FunctionDeclaration) => {
                self.declare(scope, func.name, node, SymbolFlags::FUNCTION, exported, false);
                self.bind_function_like(node, scope);
            }
            (NodeData::Class(class), _) => {
                self.declare(scope, class.name, node, SymbolFlags::CLASS, exported, false);
                for &member in &class.members {
                    self.bind_class_member(member, scope);
                }
            }
            (NodeData::Interface(iface), _) => {
                self.declare(scope, iface.name, node, SymbolFlags::INTERFACE, exported, false);
            }
            (NodeData::TypeAlias(alias), _) => {
                self.declare(scope, alias.name, node, SymbolFlags::TYPE_ALIAS, exported, false);
            }
            (NodeData::VariableStatement(stmt), _) => {
                let target_scope = if stmt.kind == VariableKind::Var {
                    self.binder.function_scope_of(scope)
                } else {
                    scope
                };
                for &declaration in &stmt.declarations {
                    self.bind_variable_declaration(declaration, target_scope, scope, exported, stmt.kind);
                }
            }
            (NodeData::Import(import), _) => {
                let specifier = arena
                    .literal_text(import.module_specifier)
                    .unwrap_or_default()
                    .to_string();
                let resolved_file = resolve_module(&self.file.file_name, &specifier, |path| {
                    self.path_index.contains_key(path)
                })
                .and_then(|path| self.path_index.get(path.as_str()).copied());

                for &spec in &import.specifiers {
                    let Some(NodeData::ImportSpecifier(data)) = arena.get(spec).map(|s| &s.data)
                    else {
                        continue;
                    };
                    let export_name = if data.property_name.is_some() {
                        arena.identifier_text(data.property_name)
                    } else {
                        arena.identifier_text(data.name)
                    }
                    .unwrap_or_default()
                    .to_string();
                    if let Some(id) =
                        self.declare(scope, data.name, spec, SymbolFlags::ALIAS, false, false)
                        && let Some(symbol) = self.binder.symbols.get_mut(id.0 as usize)
                    {
                        symbol.import = Some(ImportTarget {
                            module_specifier: specifier.clone(),
                            resolved_file,
                            export_name,
                        });
                    }
                }
            }
            (NodeData::Block(block), _) => {
                let block_scope = self.enter_scope(node, scope, false);
                for &statement in &block.statements {
                    self.bind_statement(statement, block_scope, false);
                }
            }
            (NodeData::Loop(data), SyntaxKind::ForStatement | SyntaxKind::ForOfStatement) => {
                let loop_scope = self.enter_scope(node, scope, false);
                if n.kind == SyntaxKind::ForOfStatement
                    && let Some(NodeData::VariableStatement(init)) =
                        arena.get(data.initializer).map(|i| &i.data)
                {
                    for &declaration in &init.declarations {
                        self.binder
                            .for_of_declarations
                            .insert(self.decl(declaration), data.condition);
                    }
                }
                self.bind_statement(data.initializer, loop_scope, false);
                self.bind_expression(data.condition, loop_scope);
                self.bind_expression(data.incrementor, loop_scope);
                self.bind_statement(data.statement, loop_scope, false);
            }
            _ => {
                // Statements without declarations of their own: bind nested
                // statements and any function expressions inside.
                for child in arena.children(node) {
                    if is_statement_kind(arena.kind(child)) {
                        self.bind_statement(child, scope, false);
                    } else {
                        self.bind_expression(child, scope);
                    }
                }
            }
        }
    }

    fn bind_variable_declaration(
        &mut self,
        declaration: NodeIndex,
        target_scope: ScopeId,
        lexical_scope: ScopeId,
        exported: bool,
        kind: VariableKind,
    ) {
        let file = self.file;
        let Some(data) = file.arena.get_variable_declaration(declaration) else {
            return;
        };
        let (name, initializer) = (data.name, data.initializer);
        self.declare(
            target_scope,
            name,
            declaration,
            SymbolFlags::VARIABLE,
            exported,
            kind == VariableKind::Const,
        );
        // Hoisted `var`s still resolve their initializer lexically.
        self.binder
            .declaration_scopes
            .insert(self.decl(declaration), lexical_scope);
        self.bind_expression(initializer, lexical_scope);
    }

    fn bind_class_member(&mut self, member: NodeIndex, scope: ScopeId) {
        let file = self.file;
        let arena = &file.arena;
        match arena.get(member).map(|m| (&m.data, m.kind)) {
            Some((NodeData::Function(_), _)) => self.bind_function_like(member, scope),
            Some((NodeData::Property(prop), _)) => {
                let initializer = prop.initializer;
                self.bind_expression(initializer, scope);
            }
            _ => {}
        }
    }

    /// Function-like nodes get a scope holding their parameters; the body
    /// block's statements are bound directly into it.
    fn bind_function_like(&mut self, node: NodeIndex, scope: ScopeId) {
        let file = self.file;
        let arena = &file.arena;
        let Some(func) = arena.get_function(node) else {
            return;
        };
        let function_scope = self.enter_scope(node, scope, true);

        for &param in &func.parameters {
            if let Some(data) = arena.get_parameter(param) {
                let (name, initializer) = (data.name, data.initializer);
                self.declare(function_scope, name, param, SymbolFlags::PARAMETER, false, false);
                self.bind_expression(initializer, function_scope);
            }
        }

        let body = func.body;
        match arena.get(body).map(|b| &b.data) {
            Some(NodeData::Block(block)) => {
                self.binder.node_scopes.insert(self.decl(body), function_scope);
                for &statement in &block.statements {
                    self.bind_statement(statement, function_scope, false);
                }
            }
            Some(_) => self.bind_expression(body, function_scope),
            None => {}
        }
    }

    /// Expressions declare nothing themselves but may contain arrow
    /// functions, which introduce scopes.
    fn bind_expression(&mut self, node: NodeIndex, scope: ScopeId) {
        let file = self.file;
        let arena = &file.arena;
        match arena.kind(node) {
            SyntaxKind::Unknown => {}
            SyntaxKind::ArrowFunction => self.bind_function_like(node, scope),
            _ => {
                for child in arena.children(node) {
                    self.bind_expression(child, scope);
                }
            }
        }
    }

    fn enter_scope(&mut self, node: NodeIndex, parent: ScopeId, is_function: bool) -> ScopeId {
        let scope = self
            .binder
            .alloc_scope(Some(parent), Some(self.file_id), node, is_function);
        self.binder.node_scopes.insert(self.decl(node), scope);
        scope
    }
}

/// Name node of a declaration, NONE if it has none.
pub fn declaration_name(file: &SourceFile, node: NodeIndex) -> NodeIndex {
    match file.arena.get(node).map(|n| &n.data) {
        Some(NodeData::Function(data)) => data.name,
        Some(NodeData::Class(data)) => data.name,
        Some(NodeData::Interface(data)) => data.name,
        Some(NodeData::TypeAlias(data)) => data.name,
        Some(NodeData::VariableDeclaration(data)) => data.name,
        Some(NodeData::Parameter(data)) => data.name,
        Some(NodeData::Property(data)) => data.name,
        Some(NodeData::ImportSpecifier(data)) => data.name,
        _ => NodeIndex::NONE,
    }
}

pub(crate) fn is_statement_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::FunctionDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::TypeAliasDeclaration
            | SyntaxKind::VariableStatement
            | SyntaxKind::ImportDeclaration
            | SyntaxKind::Block
            | SyntaxKind::ExpressionStatement
            | SyntaxKind::ReturnStatement
            | SyntaxKind::IfStatement
            | SyntaxKind::WhileStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::ForOfStatement
            | SyntaxKind::BreakStatement
            | SyntaxKind::ContinueStatement
            | SyntaxKind::EmptyStatement
    )
}
