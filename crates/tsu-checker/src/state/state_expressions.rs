//! Expression checking.
//!
//! `check_expression` computes the type of an expression and, outside
//! speculative mode, records it and reports diagnostics. It is also the
//! workhorse of lazy inference (`const x = f()`), where it always runs
//! speculatively.

use tsu_common::diagnostics::{diagnostic_codes, format_message};
use tsu_common::limits::{MAX_BASE_TYPE_DEPTH, MAX_EXPR_CHECK_DEPTH};
use tsu_parser::{NodeData, NodeIndex, SyntaxKind};
use tracing::trace;

use crate::apparent_types::ApparentReceiver;
use crate::binder::SymbolFlags;
use crate::state::CheckerState;
use crate::state::state_symbols::member_name;
use crate::types::{ObjectKind, ObjectShape, PropertyInfo, Signature, TypeData, TypeId};

impl CheckerState {
    /// Type of an expression. `contextual` is the type the surrounding code
    /// expects, used to type arrow function parameters.
    pub(crate) fn check_expression(&mut self, node: NodeIndex, contextual: Option<TypeId>) -> TypeId {
        if node.is_none() {
            return TypeId::ERROR;
        }
        if self.ctx.expr_depth >= MAX_EXPR_CHECK_DEPTH {
            trace!(node = node.0, "expression nesting too deep; giving up");
            return TypeId::ERROR;
        }
        self.ctx.expr_depth += 1;
        let type_id = self.compute_expression_type(node, contextual);
        self.ctx.expr_depth -= 1;
        self.record_type(node, type_id);
        type_id
    }

    fn compute_expression_type(&mut self, node: NodeIndex, contextual: Option<TypeId>) -> TypeId {
        let file = self.current_file();
        let Some(n) = file.arena.get(node) else {
            return TypeId::ERROR;
        };

        match (n.kind, &n.data) {
            (SyntaxKind::NumericLiteral, NodeData::Literal(literal)) => {
                self.interner.number_literal(&literal.text)
            }
            (SyntaxKind::StringLiteral, NodeData::Literal(literal)) => {
                self.interner.string_literal(&literal.text)
            }
            (SyntaxKind::TrueKeyword, _) => TypeId::TRUE,
            (SyntaxKind::FalseKeyword, _) => TypeId::FALSE,
            (SyntaxKind::NullKeyword, _) => TypeId::NULL,
            (SyntaxKind::ThisKeyword, _) => self.this_type().unwrap_or(TypeId::ANY),
            (SyntaxKind::SuperKeyword, _) => self
                .this_type()
                .and_then(|this| self.interner.base_types(this).first().copied())
                .unwrap_or(TypeId::ERROR),
            (SyntaxKind::Identifier, NodeData::Identifier(_)) => self.check_identifier(node),
            (SyntaxKind::ParenthesizedExpression, NodeData::Wrapper(wrapper)) => {
                self.check_expression(wrapper.expression, contextual)
            }
            (SyntaxKind::ArrayLiteralExpression, NodeData::List(list)) => {
                let element_context = contextual.and_then(|t| self.interner.array_element(t));
                let mut element_types = Vec::with_capacity(list.elements.len());
                for &element in &list.elements {
                    let element_type = self.check_expression(element, element_context);
                    element_types.push(self.interner.widen(element_type));
                }
                let element = if element_types.is_empty() {
                    element_context.unwrap_or(TypeId::ANY)
                } else {
                    self.interner.union(element_types)
                };
                self.interner.array(element)
            }
            (SyntaxKind::ObjectLiteralExpression, NodeData::List(list)) => {
                self.check_object_literal(&list.elements, contextual)
            }
            (SyntaxKind::CallExpression, NodeData::Call(call)) => {
                self.check_call_expression(node, call.expression, &call.arguments)
            }
            (SyntaxKind::NewExpression, NodeData::Call(call)) => {
                self.check_new_expression(node, call.expression, &call.arguments)
            }
            (SyntaxKind::PropertyAccessExpression, NodeData::Access(access)) => {
                self.check_property_access(access.expression, access.name_or_argument)
            }
            (SyntaxKind::ElementAccessExpression, NodeData::Access(access)) => {
                self.check_element_access(access.expression, access.name_or_argument)
            }
            (SyntaxKind::PrefixUnaryExpression, NodeData::Unary(unary)) => {
                self.check_prefix_unary(unary.operator, unary.operand)
            }
            (SyntaxKind::PostfixUnaryExpression, NodeData::Unary(unary)) => {
                self.check_expression(unary.operand, None);
                self.check_assignment_target(unary.operand);
                TypeId::NUMBER
            }
            (SyntaxKind::TypeOfExpression, NodeData::Wrapper(wrapper)) => {
                self.check_expression(wrapper.expression, None);
                TypeId::STRING
            }
            (SyntaxKind::BinaryExpression, NodeData::Binary(binary)) => {
                self.check_binary_expression(binary.left, binary.operator, binary.right)
            }
            (SyntaxKind::ConditionalExpression, NodeData::Conditional(conditional)) => {
                self.check_expression(conditional.condition, None);
                let when_true = self.check_expression(conditional.when_true, contextual);
                let when_false = self.check_expression(conditional.when_false, contextual);
                self.interner.union([when_true, when_false])
            }
            (SyntaxKind::ArrowFunction, NodeData::Function(_)) => {
                self.check_arrow_function(node, contextual)
            }
            (SyntaxKind::AsExpression, NodeData::As(as_data)) => {
                let target = self.type_from_type_node(as_data.type_node);
                self.check_expression(as_data.expression, Some(target));
                target
            }
            _ => TypeId::ERROR,
        }
    }

    /// Type of `this` at the current position.
    fn this_type(&self) -> Option<TypeId> {
        self.this_type_for_scope(self.ctx.scope)
            .or_else(|| self.ctx.this_types.last().copied())
    }

    fn check_identifier(&mut self, node: NodeIndex) -> TypeId {
        let file = self.current_file();
        let name = file.arena.identifier_text(node).unwrap_or("");
        if name.is_empty() {
            return TypeId::ERROR;
        }

        let scope = self.ctx.scope;
        if let Some(symbol) = self.binder.resolve_name(scope, name, SymbolFlags::VALUE) {
            return self.type_of_symbol(symbol);
        }
        if self.binder.resolve_name(scope, name, SymbolFlags::TYPE).is_some() {
            self.error_at_node(
                node,
                format_message(diagnostic_codes::MSG_TYPE_USED_AS_VALUE, &[name]),
                diagnostic_codes::TYPE_USED_AS_VALUE,
            );
        } else {
            self.error_at_node(
                node,
                format_message(diagnostic_codes::MSG_CANNOT_FIND_NAME, &[name]),
                diagnostic_codes::CANNOT_FIND_NAME,
            );
        }
        TypeId::ERROR
    }

    fn check_object_literal(&mut self, elements: &[NodeIndex], contextual: Option<TypeId>) -> TypeId {
        let file = self.current_file();
        let mut shape = ObjectShape::new(ObjectKind::Anonymous, None, None);

        for &element in elements {
            let Some(NodeData::PropertyAssignment(assignment)) =
                file.arena.get(element).map(|n| &n.data)
            else {
                continue;
            };
            let name = member_name(&file, assignment.name);
            let property_context = contextual
                .and_then(|t| self.property_of_type(t, &name))
                .map(|p| p.type_id);
            let value_type = if assignment.initializer.is_some() {
                self.check_expression(assignment.initializer, property_context)
            } else {
                // Shorthand `{ x }`.
                self.check_identifier(assignment.name)
            };
            let type_id = self.interner.widen(value_type);
            self.record_type(assignment.name, type_id);
            self.record_type(element, type_id);

            shape.properties.retain(|p| p.name != name);
            shape.properties.push(PropertyInfo {
                name,
                type_id,
                optional: false,
                readonly: false,
            });
        }
        self.interner.alloc_object(shape)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn check_call_expression(
        &mut self,
        node: NodeIndex,
        callee: NodeIndex,
        arguments: &[NodeIndex],
    ) -> TypeId {
        let file = self.current_file();
        if file.arena.kind(callee) == SyntaxKind::SuperKeyword {
            let base_instance = self.check_expression(callee, None);
            let signatures = self.base_construct_signatures(base_instance);
            if signatures.is_empty() {
                self.check_arguments_unchecked(arguments);
            } else {
                self.resolve_call(node, &signatures, arguments);
            }
            return TypeId::VOID;
        }

        let callee_type = self.check_expression(callee, None);
        if callee_type.is_any_or_error() {
            self.check_arguments_unchecked(arguments);
            return if callee_type == TypeId::ERROR {
                TypeId::ERROR
            } else {
                TypeId::ANY
            };
        }
        let signatures = self.interner.call_signatures(callee_type).to_vec();
        if signatures.is_empty() {
            self.error_at_node(
                callee,
                diagnostic_codes::MSG_NOT_CALLABLE.to_string(),
                diagnostic_codes::NOT_CALLABLE,
            );
            self.check_arguments_unchecked(arguments);
            return TypeId::ERROR;
        }
        self.resolve_call(node, &signatures, arguments)
    }

    fn check_new_expression(
        &mut self,
        node: NodeIndex,
        callee: NodeIndex,
        arguments: &[NodeIndex],
    ) -> TypeId {
        let constructor_type = self.check_expression(callee, None);
        if constructor_type.is_any_or_error() {
            self.check_arguments_unchecked(arguments);
            return constructor_type;
        }
        let signatures = self.interner.construct_signatures(constructor_type).to_vec();
        if signatures.is_empty() {
            self.error_at_node(
                callee,
                diagnostic_codes::MSG_NOT_CONSTRUCTABLE.to_string(),
                diagnostic_codes::NOT_CONSTRUCTABLE,
            );
            self.check_arguments_unchecked(arguments);
            return TypeId::ERROR;
        }
        self.resolve_call(node, &signatures, arguments)
    }

    /// Construct signatures of the class a `super(...)` call refers to.
    fn base_construct_signatures(&self, base_instance: TypeId) -> Vec<Signature> {
        let Some(symbol) = self.interner.object_shape(base_instance).and_then(|s| s.symbol) else {
            return Vec::new();
        };
        self.class_types
            .get(&symbol)
            .map(|types| self.interner.construct_signatures(types.constructor).to_vec())
            .unwrap_or_default()
    }

    fn check_arguments_unchecked(&mut self, arguments: &[NodeIndex]) {
        for &argument in arguments {
            self.check_expression(argument, None);
        }
    }

    /// Pick a signature for a call and check the arguments against it.
    /// Overloads are tried in declaration order; the first whose arity and
    /// argument types fit wins.
    fn resolve_call(
        &mut self,
        node: NodeIndex,
        signatures: &[Signature],
        arguments: &[NodeIndex],
    ) -> TypeId {
        let count = arguments.len();
        let candidates: Vec<&Signature> = signatures
            .iter()
            .filter(|s| count >= s.min_argument_count() && count <= s.params.len())
            .collect();

        if candidates.is_empty() {
            let min = signatures.iter().map(Signature::min_argument_count).min().unwrap_or(0);
            let max = signatures.iter().map(|s| s.params.len()).max().unwrap_or(0);
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min}-{max}")
            };
            self.error_at_node(
                node,
                format_message(
                    diagnostic_codes::MSG_EXPECTED_ARGUMENTS,
                    &[&expected, &count.to_string()],
                ),
                diagnostic_codes::EXPECTED_ARGUMENTS,
            );
            self.check_arguments_unchecked(arguments);
            return signatures.first().map_or(TypeId::ERROR, |s| s.return_type);
        }

        let chosen = if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates
                .iter()
                .copied()
                .find(|signature| {
                    self.speculatively(|checker| checker.arguments_fit(signature, arguments))
                })
                .unwrap_or(candidates[0])
        };

        for (argument, param) in arguments.iter().zip(&chosen.params) {
            let argument_type = self.check_expression(*argument, Some(param.type_id));
            if !self.is_type_assignable_to(argument_type, param.type_id) {
                let source = self.type_to_string(argument_type);
                let target = self.type_to_string(param.type_id);
                let elaboration = self.assignability_elaboration(argument_type, param.type_id);
                self.error_at_node_with(
                    *argument,
                    format_message(diagnostic_codes::MSG_ARGUMENT_NOT_ASSIGNABLE, &[&source, &target]),
                    diagnostic_codes::ARGUMENT_NOT_ASSIGNABLE,
                    elaboration,
                );
            }
        }
        chosen.return_type
    }

    fn arguments_fit(&mut self, signature: &Signature, arguments: &[NodeIndex]) -> bool {
        arguments.iter().zip(&signature.params).all(|(&argument, param)| {
            let argument_type = self.check_expression(argument, Some(param.type_id));
            self.is_type_assignable_to(argument_type, param.type_id)
        })
    }

    // =========================================================================
    // Member access
    // =========================================================================

    fn check_property_access(&mut self, object: NodeIndex, name_node: NodeIndex) -> TypeId {
        let object_type = self.check_expression(object, None);
        let file = self.current_file();
        let name = member_name(&file, name_node);
        if name.is_empty() {
            return TypeId::ERROR;
        }

        let type_id = match self.property_type(object_type, &name) {
            Some(type_id) => type_id,
            None => {
                let display = self.type_to_string(object_type);
                self.error_at_node(
                    name_node,
                    format_message(diagnostic_codes::MSG_PROPERTY_DOES_NOT_EXIST, &[&name, &display]),
                    diagnostic_codes::PROPERTY_DOES_NOT_EXIST,
                );
                TypeId::ERROR
            }
        };
        self.record_type(name_node, type_id);
        type_id
    }

    fn check_element_access(&mut self, object: NodeIndex, argument: NodeIndex) -> TypeId {
        let object_type = self.check_expression(object, None);
        let index_type = self.check_expression(argument, None);
        if object_type.is_any_or_error() {
            return object_type;
        }
        if let Some(element) = self.interner.array_element(object_type) {
            return element;
        }
        if self.interner.base_primitive(object_type) == TypeId::STRING {
            return TypeId::STRING;
        }
        if let TypeData::Literal(crate::types::LiteralValue::String(key)) =
            self.interner.get(index_type).clone()
        {
            if let Some(type_id) = self.property_type(object_type, &key) {
                return type_id;
            }
        }
        TypeId::ANY
    }

    /// Type of member `name` on `type_id`, `None` when it does not exist.
    /// On unions the member must exist on every constituent.
    pub(crate) fn property_type(&mut self, type_id: TypeId, name: &str) -> Option<TypeId> {
        if type_id.is_any_or_error() {
            return Some(type_id);
        }
        if let TypeData::Union(members) = self.interner.get(type_id) {
            let members = members.clone();
            let mut types = Vec::with_capacity(members.len());
            for member in members {
                types.push(self.property_type(member, name)?);
            }
            return Some(self.interner.union(types));
        }
        if let Some(property) = self.property_of_type(type_id, name) {
            return Some(property.type_id);
        }

        let receiver = ApparentReceiver::of(&self.interner, type_id)?;
        let member = receiver.member(name)?;
        let key = (receiver.key(&mut self.interner), member);
        if let Some(&cached) = self.apparent_members.get(&key) {
            return Some(cached);
        }
        let member_type = receiver.member_type(&mut self.interner, member);
        self.apparent_members.insert(key, member_type);
        Some(member_type)
    }

    /// Declared property of an object type, searching base types.
    pub(crate) fn property_of_type(&self, type_id: TypeId, name: &str) -> Option<PropertyInfo> {
        let mut pending = vec![(type_id, 0u32)];
        while let Some((current, depth)) = pending.pop() {
            let Some(shape) = self.interner.object_shape(current) else {
                continue;
            };
            if let Some(property) = shape.own_property(name) {
                return Some(property.clone());
            }
            if depth < MAX_BASE_TYPE_DEPTH {
                pending.extend(shape.base_types.iter().rev().map(|&base| (base, depth + 1)));
            }
        }
        None
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn check_prefix_unary(&mut self, operator: SyntaxKind, operand: NodeIndex) -> TypeId {
        let file = self.current_file();
        match operator {
            SyntaxKind::ExclamationToken => {
                self.check_expression(operand, None);
                TypeId::BOOLEAN
            }
            SyntaxKind::MinusToken if file.arena.kind(operand) == SyntaxKind::NumericLiteral => {
                let operand_type = self.check_expression(operand, None);
                match file.arena.literal_text(operand) {
                    Some(text) => self.interner.number_literal(&format!("-{text}")),
                    None => operand_type,
                }
            }
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                self.check_expression(operand, None);
                self.check_assignment_target(operand);
                TypeId::NUMBER
            }
            _ => {
                self.check_expression(operand, None);
                TypeId::NUMBER
            }
        }
    }

    fn check_binary_expression(
        &mut self,
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
    ) -> TypeId {
        match operator {
            SyntaxKind::EqualsToken => {
                let target = self.check_expression(left, None);
                let writable = self.check_assignment_target(left);
                let value = self.check_expression(right, Some(target));
                if writable {
                    self.check_type_assignable(value, target, left);
                }
                value
            }
            SyntaxKind::PlusEqualsToken
            | SyntaxKind::MinusEqualsToken
            | SyntaxKind::AsteriskEqualsToken
            | SyntaxKind::SlashEqualsToken => {
                let target = self.check_expression(left, None);
                self.check_assignment_target(left);
                let value = self.check_expression(right, None);
                if operator == SyntaxKind::PlusEqualsToken {
                    self.addition_type(target, value)
                } else {
                    TypeId::NUMBER
                }
            }
            SyntaxKind::PlusToken => {
                let left_type = self.check_expression(left, None);
                let right_type = self.check_expression(right, None);
                self.addition_type(left_type, right_type)
            }
            SyntaxKind::MinusToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::PercentToken => {
                self.check_expression(left, None);
                self.check_expression(right, None);
                TypeId::NUMBER
            }
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken => {
                self.check_expression(left, None);
                self.check_expression(right, None);
                TypeId::BOOLEAN
            }
            SyntaxKind::AmpersandAmpersandToken => {
                self.check_expression(left, None);
                self.check_expression(right, None)
            }
            SyntaxKind::BarBarToken | SyntaxKind::QuestionQuestionToken => {
                let left_type = self.check_expression(left, None);
                let right_type = self.check_expression(right, None);
                let present: Vec<TypeId> = self
                    .interner
                    .union_members(left_type)
                    .into_iter()
                    .filter(|&t| t != TypeId::NULL && t != TypeId::UNDEFINED)
                    .collect();
                self.interner.union(present.into_iter().chain([right_type]))
            }
            _ => {
                self.check_expression(left, None);
                self.check_expression(right, None);
                TypeId::ERROR
            }
        }
    }

    /// Result of `a + b`: string if either side is, number if both are.
    fn addition_type(&self, left: TypeId, right: TypeId) -> TypeId {
        let left = self.interner.base_primitive(left);
        let right = self.interner.base_primitive(right);
        if left == TypeId::STRING || right == TypeId::STRING {
            TypeId::STRING
        } else if left == TypeId::NUMBER && right == TypeId::NUMBER {
            TypeId::NUMBER
        } else {
            TypeId::ANY
        }
    }

    /// Report assignments to `const` bindings. Returns `false` for a `const`
    /// target.
    fn check_assignment_target(&mut self, target: NodeIndex) -> bool {
        let file = self.current_file();
        if file.arena.kind(target) != SyntaxKind::Identifier {
            return true;
        }
        let name = file.arena.identifier_text(target).unwrap_or("");
        let is_const = self
            .binder
            .resolve_name(self.ctx.scope, name, SymbolFlags::VALUE)
            .and_then(|symbol| self.binder.symbol(symbol))
            .is_some_and(|symbol| symbol.is_const);
        if is_const {
            self.error_at_node(
                target,
                format_message(diagnostic_codes::MSG_CANNOT_ASSIGN_TO_CONSTANT, &[name]),
                diagnostic_codes::CANNOT_ASSIGN_TO_CONSTANT,
            );
        }
        !is_const
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    /// Type of an arrow function. Unannotated parameters take their types
    /// from the first call signature of `contextual`; the type is fixed the
    /// first time the arrow is seen.
    fn check_arrow_function(&mut self, node: NodeIndex, contextual: Option<TypeId>) -> TypeId {
        let key = self.decl_ref(node);
        let arrow_type = match self.function_types.get(&key) {
            Some(&cached) => cached,
            None => {
                let file = self.current_file();
                if let (Some(contextual), Some(func)) = (contextual, file.arena.get_function(node)) {
                    let expected = self.interner.call_signatures(contextual).first().cloned();
                    if let Some(expected) = expected {
                        for (&param, info) in func.parameters.iter().zip(&expected.params) {
                            let annotated = file
                                .arena
                                .get_parameter(param)
                                .is_some_and(|p| p.type_annotation.is_some());
                            if !annotated {
                                let param_key = self.decl_ref(param);
                                self.contextual_param_types.insert(param_key, info.type_id);
                            }
                        }
                    }
                }
                let signature = self.signature_of(node);
                let arrow_type = self.interner.function(signature);
                self.function_types.insert(key, arrow_type);
                arrow_type
            }
        };

        if !self.is_speculative() {
            self.check_function_like(node);
        }
        arrow_type
    }
}
