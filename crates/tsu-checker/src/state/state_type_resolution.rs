//! Type nodes and the type meaning of symbols: keyword types, references,
//! arrays, unions, function types, literal types, and type aliases.

use tsu_common::diagnostics::{diagnostic_codes, format_message};
use tsu_parser::{NodeData, NodeIndex, SyntaxKind};

use crate::binder::{SymbolFlags, SymbolId};
use crate::state::CheckerState;
use crate::types::TypeId;

impl CheckerState {
    /// Resolve a type node in the current scope and record its type.
    pub(crate) fn type_from_type_node(&mut self, node: NodeIndex) -> TypeId {
        let file = self.current_file();
        let Some(n) = file.arena.get(node) else {
            return TypeId::ERROR;
        };

        let type_id = match (n.kind, &n.data) {
            (SyntaxKind::NumberKeyword, _) => TypeId::NUMBER,
            (SyntaxKind::StringKeyword, _) => TypeId::STRING,
            (SyntaxKind::BooleanKeyword, _) => TypeId::BOOLEAN,
            (SyntaxKind::VoidKeyword, _) => TypeId::VOID,
            (SyntaxKind::AnyKeyword, _) => TypeId::ANY,
            (SyntaxKind::UnknownKeyword, _) => TypeId::UNKNOWN,
            (SyntaxKind::NeverKeyword, _) => TypeId::NEVER,
            (SyntaxKind::UndefinedKeyword, _) => TypeId::UNDEFINED,
            (SyntaxKind::NullKeyword, _) => TypeId::NULL,
            (SyntaxKind::LiteralType, NodeData::Wrapper(wrapper)) => {
                let literal = wrapper.expression;
                let literal_type = match file.arena.kind(literal) {
                    SyntaxKind::TrueKeyword => TypeId::TRUE,
                    SyntaxKind::FalseKeyword => TypeId::FALSE,
                    SyntaxKind::NumericLiteral => {
                        let text = file.arena.literal_text(literal).unwrap_or("0");
                        self.interner.number_literal(text)
                    }
                    SyntaxKind::StringLiteral => {
                        let text = file.arena.literal_text(literal).unwrap_or("");
                        self.interner.string_literal(text)
                    }
                    _ => TypeId::ERROR,
                };
                self.record_type(literal, literal_type);
                literal_type
            }
            (SyntaxKind::ArrayType, NodeData::Wrapper(wrapper)) => {
                let element = self.type_from_type_node(wrapper.expression);
                self.interner.array(element)
            }
            (SyntaxKind::ParenthesizedType, NodeData::Wrapper(wrapper)) => {
                self.type_from_type_node(wrapper.expression)
            }
            (SyntaxKind::UnionType, NodeData::List(list)) => {
                let members: Vec<TypeId> = list
                    .elements
                    .iter()
                    .map(|&member| self.type_from_type_node(member))
                    .collect();
                self.interner.union(members)
            }
            (SyntaxKind::FunctionType, NodeData::Function(func)) => {
                for &param in &func.parameters {
                    if let Some(data) = file.arena.get_parameter(param) {
                        let annotation = data.type_annotation;
                        let param_type = if annotation.is_some() {
                            self.type_from_type_node(annotation)
                        } else {
                            TypeId::ANY
                        };
                        self.record_type(param, param_type);
                        self.record_type(data.name, param_type);
                    }
                }
                let signature = self.signature_of(node);
                self.interner.function(signature)
            }
            (SyntaxKind::TypeReference, NodeData::TypeReference(reference)) => {
                self.type_from_type_reference(reference.type_name)
            }
            _ => TypeId::ERROR,
        };

        self.record_type(node, type_id);
        type_id
    }

    /// Resolve the name of a type reference.
    fn type_from_type_reference(&mut self, name_node: NodeIndex) -> TypeId {
        let file = self.current_file();
        let Some(name) = file.arena.identifier_text(name_node) else {
            return TypeId::ERROR;
        };
        if name.is_empty() {
            // Missing name; the parser already reported it.
            return TypeId::ERROR;
        }

        let scope = self.ctx.scope;
        let type_id = match self.binder.resolve_name(scope, name, SymbolFlags::TYPE) {
            Some(symbol) => match self.declared_type_of_symbol(symbol) {
                Some(type_id) => type_id,
                None => {
                    self.error_at_node(
                        name_node,
                        format_message(diagnostic_codes::MSG_VALUE_USED_AS_TYPE, &[name]),
                        diagnostic_codes::VALUE_USED_AS_TYPE,
                    );
                    TypeId::ERROR
                }
            },
            None => {
                if self
                    .binder
                    .resolve_name(scope, name, SymbolFlags::VALUE)
                    .is_some()
                {
                    self.error_at_node(
                        name_node,
                        format_message(diagnostic_codes::MSG_VALUE_USED_AS_TYPE, &[name]),
                        diagnostic_codes::VALUE_USED_AS_TYPE,
                    );
                } else {
                    self.error_at_node(
                        name_node,
                        format_message(diagnostic_codes::MSG_CANNOT_FIND_NAME, &[name]),
                        diagnostic_codes::CANNOT_FIND_NAME,
                    );
                }
                TypeId::ERROR
            }
        };
        self.record_type(name_node, type_id);
        type_id
    }

    /// The type a symbol denotes in type position, `None` for value-only
    /// symbols.
    pub(crate) fn declared_type_of_symbol(&mut self, symbol_id: SymbolId) -> Option<TypeId> {
        let symbol = self.binder.symbol(symbol_id)?;
        let flags = symbol.flags;

        if flags.contains(SymbolFlags::ALIAS) {
            let target = self.resolve_alias(symbol_id)?;
            if !self.resolving_declared.insert(symbol_id) {
                return Some(TypeId::ERROR);
            }
            let result = self.declared_type_of_symbol(target);
            self.resolving_declared.remove(&symbol_id);
            return result;
        }
        if flags.contains(SymbolFlags::CLASS) {
            return Some(self.class_types(symbol_id).instance);
        }
        if flags.contains(SymbolFlags::INTERFACE) {
            return Some(self.interface_type(symbol_id));
        }
        if flags.contains(SymbolFlags::TYPE_ALIAS) {
            return Some(self.type_alias_type(symbol_id));
        }
        None
    }

    fn type_alias_type(&mut self, symbol_id: SymbolId) -> TypeId {
        if let Some(&cached) = self.declared_types.get(&symbol_id) {
            return cached;
        }
        if !self.resolving_declared.insert(symbol_id) {
            return TypeId::ERROR;
        }

        let declaration = self.binder.symbol(symbol_id).and_then(|symbol| {
            symbol.declarations.iter().copied().find(|decl| {
                self.files[decl.file].arena.kind(decl.node) == SyntaxKind::TypeAliasDeclaration
            })
        });
        let resolved = match declaration {
            Some(decl) => {
                let type_node = match self.files[decl.file].arena.get(decl.node).map(|n| &n.data) {
                    Some(NodeData::TypeAlias(alias)) => alias.type_node,
                    _ => NodeIndex::NONE,
                };
                let scope = self
                    .binder
                    .declaration_scope(decl.file, decl.node)
                    .unwrap_or_else(|| self.binder.file_scope(decl.file));
                self.with_declaration_context(decl.file, scope, |checker| {
                    checker.type_from_type_node(type_node)
                })
            }
            None => TypeId::ERROR,
        };

        self.resolving_declared.remove(&symbol_id);
        self.declared_types.insert(symbol_id, resolved);
        resolved
    }

    /// Target of an import binding, if the module and export exist.
    pub(crate) fn resolve_alias(&self, symbol_id: SymbolId) -> Option<SymbolId> {
        let import = self.binder.symbol(symbol_id)?.import.as_ref()?;
        let file = import.resolved_file?;
        self.binder
            .exports_of(file)?
            .get(&import.export_name)
            .copied()
    }
}
