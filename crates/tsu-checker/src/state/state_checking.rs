//! Statement and declaration checking (the full-check walk).

use tsu_common::diagnostics::{diagnostic_codes, format_message};
use tsu_parser::{ModifierFlags, NodeData, NodeIndex, SyntaxKind};

use crate::binder::is_statement_kind;
use crate::module_resolution::resolve_module;
use crate::state::state_symbols::member_name;
use crate::state::{CheckerState, FunctionContext};
use crate::types::TypeId;

impl CheckerState {
    pub(crate) fn check_statement(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(n) = file.arena.get(node) else {
            return;
        };

        match (n.kind, &n.data) {
            (SyntaxKind::FunctionDeclaration, NodeData::Function(_)) => {
                self.check_function_declaration(node)
            }
            (SyntaxKind::ClassDeclaration, NodeData::Class(_)) => self.check_class_declaration(node),
            (SyntaxKind::InterfaceDeclaration, NodeData::Interface(_)) => {
                self.check_interface_declaration(node)
            }
            (SyntaxKind::TypeAliasDeclaration, NodeData::TypeAlias(alias)) => {
                let declared = self
                    .binder
                    .symbol_of_declaration(self.ctx.file, node)
                    .and_then(|symbol| self.declared_type_of_symbol(symbol));
                self.type_from_type_node(alias.type_node);
                if let Some(declared) = declared {
                    self.record_type(node, declared);
                    self.record_type(alias.name, declared);
                }
            }
            (SyntaxKind::VariableStatement, NodeData::VariableStatement(statement)) => {
                for &declaration in &statement.declarations {
                    self.check_variable_declaration(declaration);
                }
            }
            (SyntaxKind::ImportDeclaration, NodeData::Import(_)) => self.check_import_declaration(node),
            (SyntaxKind::Block, NodeData::Block(block)) => {
                let scope = self.scope_of_node(node);
                self.with_scope(scope, |checker| {
                    for &statement in &block.statements {
                        checker.check_statement(statement);
                    }
                });
            }
            (SyntaxKind::ExpressionStatement, NodeData::Wrapper(wrapper)) => {
                self.check_expression(wrapper.expression, None);
            }
            (SyntaxKind::ReturnStatement, NodeData::Wrapper(wrapper)) => {
                self.check_return_statement(node, wrapper.expression)
            }
            (SyntaxKind::IfStatement, NodeData::If(data)) => {
                self.check_expression(data.condition, None);
                self.check_statement(data.then_statement);
                self.check_statement(data.else_statement);
            }
            (SyntaxKind::WhileStatement, NodeData::Loop(data)) => {
                self.check_expression(data.condition, None);
                self.check_loop_body(data.statement);
            }
            (SyntaxKind::ForStatement, NodeData::Loop(data)) => {
                let scope = self.scope_of_node(node);
                self.with_scope(scope, |checker| {
                    if is_statement_kind(file.arena.kind(data.initializer)) {
                        checker.check_statement(data.initializer);
                    } else {
                        checker.check_expression(data.initializer, None);
                    }
                    checker.check_expression(data.condition, None);
                    checker.check_expression(data.incrementor, None);
                    checker.check_loop_body(data.statement);
                });
            }
            (SyntaxKind::ForOfStatement, NodeData::Loop(data)) => {
                let scope = self.scope_of_node(node);
                self.with_scope(scope, |checker| {
                    checker.check_expression(data.condition, None);
                    if is_statement_kind(file.arena.kind(data.initializer)) {
                        checker.check_statement(data.initializer);
                    } else {
                        checker.check_expression(data.initializer, None);
                    }
                    checker.check_loop_body(data.statement);
                });
            }
            (SyntaxKind::BreakStatement, _) if self.ctx.loop_depth == 0 => {
                self.error_at_span(
                    n.pos,
                    "break".len() as u32,
                    diagnostic_codes::MSG_BREAK_OUTSIDE_LOOP.to_string(),
                    diagnostic_codes::BREAK_OUTSIDE_LOOP,
                    None,
                );
            }
            (SyntaxKind::ContinueStatement, _) if self.ctx.loop_depth == 0 => {
                self.error_at_span(
                    n.pos,
                    "continue".len() as u32,
                    diagnostic_codes::MSG_CONTINUE_OUTSIDE_LOOP.to_string(),
                    diagnostic_codes::CONTINUE_OUTSIDE_LOOP,
                    None,
                );
            }
            _ => {}
        }
    }

    fn check_loop_body(&mut self, statement: NodeIndex) {
        self.ctx.loop_depth += 1;
        self.check_statement(statement);
        self.ctx.loop_depth -= 1;
    }

    fn check_return_statement(&mut self, node: NodeIndex, expression: NodeIndex) {
        if self.ctx.functions.is_empty() {
            let file = self.current_file();
            if let Some(n) = file.arena.get(node) {
                self.error_at_span(
                    n.pos,
                    "return".len() as u32,
                    diagnostic_codes::MSG_RETURN_OUTSIDE_FUNCTION.to_string(),
                    diagnostic_codes::RETURN_OUTSIDE_FUNCTION,
                    None,
                );
            }
            self.check_expression(expression, None);
            return;
        }
        if expression.is_none() {
            return;
        }

        let declared = self.ctx.functions.last().and_then(|f| f.declared_return);
        let return_type = self.check_expression(expression, declared);
        if let Some(declared) = declared {
            self.check_type_assignable(return_type, declared, expression);
        }
        if let Some(function) = self.ctx.functions.last_mut() {
            function.return_types.push(return_type);
            function.has_value_return = true;
        }
    }

    // =========================================================================
    // Variables
    // =========================================================================

    fn check_variable_declaration(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(data) = file.arena.get_variable_declaration(node) else {
            return;
        };
        let declared = match self.binder.symbol_of_declaration(self.ctx.file, node) {
            Some(symbol) => self.type_of_symbol(symbol),
            None => self.speculatively(|checker| checker.variable_declaration_type(node)),
        };

        let annotated = if data.type_annotation.is_some() {
            Some(self.type_from_type_node(data.type_annotation))
        } else {
            None
        };
        if data.initializer.is_some() {
            let initializer_type = self.check_expression(data.initializer, annotated);
            if let Some(annotated) = annotated {
                self.check_type_assignable(initializer_type, annotated, data.name);
            }
        }

        self.record_type(node, declared);
        self.record_type(data.name, declared);
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn check_function_declaration(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(func) = file.arena.get_function(node) else {
            return;
        };
        let is_ambient = file.is_declaration_file || func.modifiers.contains(ModifierFlags::DECLARE);

        let symbol = self.binder.symbol_of_declaration(self.ctx.file, node);
        if let Some(symbol) = symbol {
            let function_type = self.type_of_symbol(symbol);
            self.record_type(node, function_type);
            self.record_type(func.name, function_type);
        }

        if func.body.is_some() && is_ambient {
            self.report_ambient_implementation(func.body);
        }
        if func.body.is_none() && !is_ambient {
            let has_implementation = symbol
                .and_then(|symbol| self.binder.symbol(symbol))
                .is_some_and(|symbol| {
                    symbol.declarations.iter().any(|decl| {
                        self.source_file(decl.file)
                            .and_then(|f| f.arena.get_function(decl.node))
                            .is_some_and(|f| f.body.is_some())
                    })
                });
            if !has_implementation {
                self.error_at_node(
                    func.name,
                    diagnostic_codes::MSG_FUNCTION_IMPLEMENTATION_MISSING.to_string(),
                    diagnostic_codes::FUNCTION_IMPLEMENTATION_MISSING,
                );
            }
        }

        self.check_function_like(node);
    }

    fn report_ambient_implementation(&mut self, body: NodeIndex) {
        let file = self.current_file();
        if let Some(n) = file.arena.get(body) {
            self.error_at_span(
                n.pos,
                1,
                diagnostic_codes::MSG_IMPLEMENTATION_IN_AMBIENT_CONTEXT.to_string(),
                diagnostic_codes::IMPLEMENTATION_IN_AMBIENT_CONTEXT,
                None,
            );
        }
    }

    /// Check parameters, return annotation and body of any function-like
    /// node (declarations, methods, constructors, arrow functions).
    pub(crate) fn check_function_like(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(func) = file.arena.get_function(node) else {
            return;
        };
        let scope = self.scope_of_node(node);
        let is_arrow = file.arena.kind(node) == SyntaxKind::ArrowFunction;

        self.with_scope(scope, |checker| {
            for &param in &func.parameters {
                checker.check_parameter(param, is_arrow);
            }
            let declared_return = if func.return_type.is_some() {
                Some(checker.type_from_type_node(func.return_type))
            } else {
                None
            };
            if func.body.is_none() {
                return;
            }

            let context = checker.check_function_body(node, declared_return);
            if let Some(declared) = declared_return
                && file.arena.kind(func.body) == SyntaxKind::Block
                && !context.has_value_return
                && checker.requires_return_value(declared)
            {
                checker.error_at_node(
                    func.return_type,
                    diagnostic_codes::MSG_MUST_RETURN_A_VALUE.to_string(),
                    diagnostic_codes::MUST_RETURN_A_VALUE,
                );
            }
        });
    }

    fn check_parameter(&mut self, param: NodeIndex, is_arrow: bool) {
        let file = self.current_file();
        let Some(data) = file.arena.get_parameter(param) else {
            return;
        };
        let param_type = match self.binder.symbol_of_declaration(self.ctx.file, param) {
            Some(symbol) => self.type_of_symbol(symbol),
            None => self.speculatively(|checker| checker.parameter_declaration_type(param)),
        };

        let annotated = if data.type_annotation.is_some() {
            Some(self.type_from_type_node(data.type_annotation))
        } else {
            None
        };
        if data.initializer.is_some() {
            let initializer_type = self.check_expression(data.initializer, annotated);
            if let Some(annotated) = annotated {
                self.check_type_assignable(initializer_type, annotated, data.name);
            }
        }

        let contextual = is_arrow && self.contextual_param_types.contains_key(&self.decl_ref(param));
        if self.options.no_implicit_any
            && annotated.is_none()
            && data.initializer.is_none()
            && !contextual
        {
            let name = file.arena.identifier_text(data.name).unwrap_or("");
            self.error_at_node(
                data.name,
                format_message(diagnostic_codes::MSG_IMPLICIT_ANY_PARAMETER, &[name]),
                diagnostic_codes::IMPLICIT_ANY_PARAMETER,
            );
        }

        self.record_type(param, param_type);
        self.record_type(data.name, param_type);
    }

    /// Check a function body with a fresh function context and return that
    /// context (collected return types). Expression bodies count as a
    /// returned value.
    pub(crate) fn check_function_body(
        &mut self,
        node: NodeIndex,
        declared_return: Option<TypeId>,
    ) -> FunctionContext {
        let file = self.current_file();
        let fresh = FunctionContext {
            declared_return,
            return_types: Vec::new(),
            has_value_return: false,
        };
        let Some(func) = file.arena.get_function(node) else {
            return fresh;
        };
        let body = func.body;
        let scope = self.scope_of_node(node);

        self.with_scope(scope, |checker| {
            let saved_loop_depth = std::mem::replace(&mut checker.ctx.loop_depth, 0);
            checker.ctx.functions.push(fresh.clone());

            match file.arena.get(body).map(|b| &b.data) {
                Some(NodeData::Block(block)) => {
                    for &statement in &block.statements {
                        checker.check_statement(statement);
                    }
                }
                Some(_) => {
                    let body_type = checker.check_expression(body, declared_return);
                    if let Some(declared) = declared_return {
                        checker.check_type_assignable(body_type, declared, body);
                    }
                    if let Some(function) = checker.ctx.functions.last_mut() {
                        function.return_types.push(body_type);
                        function.has_value_return = true;
                    }
                }
                None => {}
            }

            checker.ctx.loop_depth = saved_loop_depth;
            checker.ctx.functions.pop().unwrap_or(fresh)
        })
    }

    /// Whether a declared return type obliges the body to return a value.
    fn requires_return_value(&self, declared: TypeId) -> bool {
        self.interner.union_members(declared).iter().all(|&member| {
            !matches!(
                member,
                TypeId::VOID | TypeId::ANY | TypeId::UNKNOWN | TypeId::UNDEFINED | TypeId::ERROR | TypeId::NEVER
            )
        })
    }

    // =========================================================================
    // Classes and interfaces
    // =========================================================================

    fn check_class_declaration(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(class) = file.arena.get_class(node) else {
            return;
        };
        let Some(symbol) = self.binder.symbol_of_declaration(self.ctx.file, node) else {
            return;
        };
        let types = self.class_types(symbol);
        self.record_type(node, types.constructor);
        self.record_type(class.name, types.constructor);

        if class.heritage.is_some() {
            self.type_from_type_node(class.heritage);
        }

        let is_ambient = file.is_declaration_file || class.modifiers.contains(ModifierFlags::DECLARE);
        self.ctx.this_types.push(types.instance);

        for &member in &class.members {
            let kind = file.arena.kind(member);
            match kind {
                SyntaxKind::PropertyDeclaration => {
                    let Some(prop) = file.arena.get_property(member) else {
                        continue;
                    };
                    let owner = if prop.modifiers.contains(ModifierFlags::STATIC) {
                        types.constructor
                    } else {
                        types.instance
                    };
                    let name = member_name(&file, prop.name);
                    let prop_type = self
                        .interner
                        .object_shape(owner)
                        .and_then(|shape| shape.own_property(&name))
                        .map_or(TypeId::ERROR, |p| p.type_id);

                    let annotated = if prop.type_annotation.is_some() {
                        Some(self.type_from_type_node(prop.type_annotation))
                    } else {
                        None
                    };
                    if prop.initializer.is_some() {
                        let initializer_type = self.check_expression(prop.initializer, annotated);
                        if let Some(annotated) = annotated {
                            self.check_type_assignable(initializer_type, annotated, prop.name);
                        }
                    }
                    self.record_type(member, prop_type);
                    self.record_type(prop.name, prop_type);
                }
                SyntaxKind::MethodDeclaration | SyntaxKind::Constructor => {
                    let Some(func) = file.arena.get_function(member) else {
                        continue;
                    };
                    let member_ambient =
                        is_ambient || func.modifiers.contains(ModifierFlags::DECLARE);
                    if func.body.is_some() && member_ambient {
                        self.report_ambient_implementation(func.body);
                    }

                    let member_type = if kind == SyntaxKind::Constructor {
                        types.constructor
                    } else {
                        let owner = if func.modifiers.contains(ModifierFlags::STATIC) {
                            types.constructor
                        } else {
                            types.instance
                        };
                        let name = member_name(&file, func.name);
                        if func.body.is_none()
                            && !member_ambient
                            && !class_has_method_body(&file, &class.members, &name)
                        {
                            self.error_at_node(
                                func.name,
                                diagnostic_codes::MSG_FUNCTION_IMPLEMENTATION_MISSING.to_string(),
                                diagnostic_codes::FUNCTION_IMPLEMENTATION_MISSING,
                            );
                        }
                        self.interner
                            .object_shape(owner)
                            .and_then(|shape| shape.own_property(&name))
                            .map_or(TypeId::ERROR, |p| p.type_id)
                    };
                    self.record_type(member, member_type);
                    self.record_type(func.name, member_type);
                    self.check_function_like(member);
                }
                _ => {}
            }
        }

        self.ctx.this_types.pop();
    }

    fn check_interface_declaration(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(iface) = file.arena.get_interface(node) else {
            return;
        };
        let declared = self
            .binder
            .symbol_of_declaration(self.ctx.file, node)
            .and_then(|symbol| self.declared_type_of_symbol(symbol))
            .unwrap_or(TypeId::ERROR);
        self.record_type(node, declared);
        self.record_type(iface.name, declared);

        for &heritage in &iface.heritage {
            self.type_from_type_node(heritage);
        }
        for &member in &iface.members {
            match file.arena.get(member).map(|m| &m.data) {
                Some(NodeData::Property(prop)) => {
                    let prop_type = if prop.type_annotation.is_some() {
                        self.type_from_type_node(prop.type_annotation)
                    } else {
                        TypeId::ANY
                    };
                    self.record_type(member, prop_type);
                    self.record_type(prop.name, prop_type);
                }
                Some(NodeData::Function(func)) => {
                    for &param in &func.parameters {
                        if let Some(data) = file.arena.get_parameter(param) {
                            let param_type = if data.type_annotation.is_some() {
                                self.type_from_type_node(data.type_annotation)
                            } else {
                                TypeId::ANY
                            };
                            self.record_type(param, param_type);
                            self.record_type(data.name, param_type);
                        }
                    }
                    if func.return_type.is_some() {
                        self.type_from_type_node(func.return_type);
                    }
                    let name = member_name(&file, func.name);
                    let method_type = self
                        .interner
                        .object_shape(declared)
                        .and_then(|shape| shape.own_property(&name))
                        .map_or(TypeId::ERROR, |p| p.type_id);
                    self.record_type(member, method_type);
                    self.record_type(func.name, method_type);
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn check_import_declaration(&mut self, node: NodeIndex) {
        let file = self.current_file();
        let Some(NodeData::Import(import)) = file.arena.get(node).map(|n| &n.data) else {
            return;
        };
        let specifier = file.arena.literal_text(import.module_specifier).unwrap_or("");
        let resolved = resolve_module(&file.file_name, specifier, |path| {
            self.file_index.contains_key(path)
        });
        if resolved.is_none() {
            self.error_at_node(
                import.module_specifier,
                format_message(diagnostic_codes::MSG_CANNOT_FIND_MODULE, &[specifier]),
                diagnostic_codes::CANNOT_FIND_MODULE,
            );
            return;
        }

        for &spec in &import.specifiers {
            let Some(NodeData::ImportSpecifier(data)) = file.arena.get(spec).map(|n| &n.data) else {
                continue;
            };
            let Some(symbol) = self.binder.symbol_of_declaration(self.ctx.file, spec) else {
                continue;
            };
            let Some(target) = self.resolve_alias(symbol) else {
                let export_node = if data.property_name.is_some() {
                    data.property_name
                } else {
                    data.name
                };
                let export_name = file.arena.identifier_text(export_node).unwrap_or("");
                self.error_at_node(
                    export_node,
                    format_message(
                        diagnostic_codes::MSG_MODULE_HAS_NO_EXPORTED_MEMBER,
                        &[specifier, export_name],
                    ),
                    diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
                );
                continue;
            };

            let is_value = self
                .binder
                .symbol(target)
                .is_some_and(|t| t.flags.intersects(crate::binder::SymbolFlags::VALUE));
            let imported_type = if is_value {
                self.type_of_symbol(symbol)
            } else {
                self.declared_type_of_symbol(target).unwrap_or(TypeId::ERROR)
            };
            self.record_type(spec, imported_type);
            self.record_type(data.name, imported_type);
            self.record_type(data.property_name, imported_type);
        }
    }
}

/// Whether any method named `name` among `members` has a body.
fn class_has_method_body(
    file: &tsu_parser::SourceFile,
    members: &[NodeIndex],
    name: &str,
) -> bool {
    members.iter().any(|&member| {
        file.arena.kind(member) == SyntaxKind::MethodDeclaration
            && file
                .arena
                .get_function(member)
                .is_some_and(|f| f.body.is_some() && member_name(file, f.name) == name)
    })
}
