//! Parser state - expression parsing methods

use super::node::{
    AccessData, AsData, BinaryData, CallData, ConditionalData, FunctionData, ListData,
    ModifierFlags, NodeData, NodeIndex, NodeList, ParameterData, PropertyAssignmentData,
    UnaryData, WrapperData,
};
use super::state::ParserState;
use crate::scanner::SyntaxKind;

/// Binary operator precedence; 0 means "not a binary operator".
fn binary_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::BarBarToken | SyntaxKind::QuestionQuestionToken => 1,
        SyntaxKind::AmpersandAmpersandToken => 2,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => 3,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::AsKeyword => 4,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 5,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 6,
        _ => 0,
    }
}

fn is_left_hand_side(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
    )
}

impl ParserState {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        self.parse_assignment_expression()
    }

    /// Assignment, arrow function, or conditional expression.
    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.missing_identifier();
        }
        let expression = self.parse_assignment_expression_worker();
        self.exit_recursion();
        expression
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }

        let start = self.token_start();
        let left = self.parse_binary_expression(0);

        if self.kind().is_assignment_operator() && is_left_hand_side(self.arena.kind(left)) {
            let operator = self.kind();
            self.next_token();
            let right = self.parse_assignment_expression();
            return self.arena.add(
                SyntaxKind::BinaryExpression,
                start,
                self.prev_end(),
                NodeData::Binary(BinaryData {
                    left,
                    operator,
                    right,
                }),
            );
        }

        if self.parse_optional(SyntaxKind::QuestionToken) {
            let when_true = self.parse_assignment_expression();
            self.parse_expected(SyntaxKind::ColonToken);
            let when_false = self.parse_assignment_expression();
            return self.arena.add(
                SyntaxKind::ConditionalExpression,
                start,
                self.prev_end(),
                NodeData::Conditional(ConditionalData {
                    condition: left,
                    when_true,
                    when_false,
                }),
            );
        }

        left
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_start();
        let mut left = self.parse_unary_expression();

        loop {
            let operator = self.kind();
            let precedence = binary_precedence(operator);
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            if operator == SyntaxKind::AsKeyword {
                if self.has_preceding_line_break() {
                    break;
                }
                self.next_token();
                let type_node = self.parse_type();
                left = self.arena.add(
                    SyntaxKind::AsExpression,
                    start,
                    self.prev_end(),
                    NodeData::As(AsData {
                        expression: left,
                        type_node,
                    }),
                );
                continue;
            }
            self.next_token();
            let right = self.parse_binary_expression(precedence);
            left = self.arena.add(
                SyntaxKind::BinaryExpression,
                start,
                self.prev_end(),
                NodeData::Binary(BinaryData {
                    left,
                    operator,
                    right,
                }),
            );
        }

        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        match self.kind() {
            SyntaxKind::ExclamationToken
            | SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                let operator = self.kind();
                self.next_token();
                let operand = self.parse_unary_expression();
                self.arena.add(
                    SyntaxKind::PrefixUnaryExpression,
                    start,
                    self.prev_end(),
                    NodeData::Unary(UnaryData { operator, operand }),
                )
            }
            SyntaxKind::TypeOfKeyword => {
                self.next_token();
                let expression = self.parse_unary_expression();
                self.arena.add(
                    SyntaxKind::TypeOfExpression,
                    start,
                    self.prev_end(),
                    NodeData::Wrapper(WrapperData { expression }),
                )
            }
            _ => {
                let operand = self.parse_left_hand_side_expression();
                if matches!(
                    self.kind(),
                    SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
                ) && !self.has_preceding_line_break()
                {
                    let operator = self.kind();
                    self.next_token();
                    return self.arena.add(
                        SyntaxKind::PostfixUnaryExpression,
                        start,
                        self.prev_end(),
                        NodeData::Unary(UnaryData { operator, operand }),
                    );
                }
                operand
            }
        }
    }

    /// Primary expression followed by any number of `.name`, `[index]` and
    /// `(args)` suffixes.
    fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        let expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_member_and_call_suffixes(start, expression, true)
    }

    fn parse_member_and_call_suffixes(
        &mut self,
        start: u32,
        mut expression: NodeIndex,
        allow_calls: bool,
    ) -> NodeIndex {
        loop {
            match self.kind() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_property_name();
                    expression = self.arena.add(
                        SyntaxKind::PropertyAccessExpression,
                        start,
                        self.prev_end(),
                        NodeData::Access(AccessData {
                            expression,
                            name_or_argument: name,
                        }),
                    );
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let argument = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expression = self.arena.add(
                        SyntaxKind::ElementAccessExpression,
                        start,
                        self.prev_end(),
                        NodeData::Access(AccessData {
                            expression,
                            name_or_argument: argument,
                        }),
                    );
                }
                SyntaxKind::OpenParenToken if allow_calls => {
                    let arguments = self.parse_argument_list();
                    expression = self.arena.add(
                        SyntaxKind::CallExpression,
                        start,
                        self.prev_end(),
                        NodeData::Call(CallData {
                            expression,
                            arguments,
                        }),
                    );
                }
                _ => return expression,
            }
        }
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let callee_start = self.token_start();
        let callee = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        let expression = self.parse_member_and_call_suffixes(callee_start, callee, false);
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_argument_list()
        } else {
            NodeList::new()
        };
        self.arena.add(
            SyntaxKind::NewExpression,
            start,
            self.prev_end(),
            NodeData::Call(CallData {
                expression,
                arguments,
            }),
        )
    }

    fn parse_argument_list(&mut self) -> NodeList {
        let mut arguments = NodeList::new();
        self.parse_expected(SyntaxKind::OpenParenToken);
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            arguments.push(self.parse_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        arguments
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        match self.kind() {
            SyntaxKind::NumericLiteral | SyntaxKind::StringLiteral => self.parse_literal(),
            SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword => self.parse_token_node(),
            SyntaxKind::OpenParenToken => {
                let start = self.token_start();
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add(
                    SyntaxKind::ParenthesizedExpression,
                    start,
                    self.prev_end(),
                    NodeData::Wrapper(WrapperData { expression }),
                )
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            kind if kind.is_identifier_or_contextual_keyword() => {
                self.create_identifier_from_token()
            }
            _ => {
                self.error_expression_expected();
                let missing = self.missing_identifier();
                // Consume the offending token unless it closes an enclosing
                // construct the caller still has to see.
                if !matches!(
                    self.kind(),
                    SyntaxKind::CloseBraceToken
                        | SyntaxKind::CloseParenToken
                        | SyntaxKind::CloseBracketToken
                        | SyntaxKind::SemicolonToken
                        | SyntaxKind::EndOfFileToken
                ) && !self.kind().is_reserved_word()
                {
                    self.next_token();
                }
                missing
            }
        }
    }

    fn parse_array_literal(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let mut elements = NodeList::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            elements.push(self.parse_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add(
            SyntaxKind::ArrayLiteralExpression,
            start,
            self.prev_end(),
            NodeData::List(ListData { elements }),
        )
    }

    fn parse_object_literal(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let mut elements = NodeList::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let property_start = self.token_start();
            let name = self.parse_property_name();
            let initializer = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            elements.push(self.arena.add(
                SyntaxKind::PropertyAssignment,
                property_start,
                self.prev_end(),
                NodeData::PropertyAssignment(PropertyAssignmentData { name, initializer }),
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            SyntaxKind::ObjectLiteralExpression,
            start,
            self.prev_end(),
            NodeData::List(ListData { elements }),
        )
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    /// Speculatively parse `x => body` or `(params): T => body`.
    fn try_parse_arrow_function(&mut self) -> Option<NodeIndex> {
        let simple = self.kind().is_identifier_or_contextual_keyword()
            && self.look_ahead(1) == SyntaxKind::EqualsGreaterThanToken;
        if !simple && !self.is_token(SyntaxKind::OpenParenToken) {
            return None;
        }
        if !simple && !self.looks_like_parenthesized_arrow() {
            return None;
        }

        let start = self.token_start();
        let head = self.try_parse(|parser| {
            let parameters = if simple {
                let param_start = parser.token_start();
                let name = parser.create_identifier_from_token();
                vec![parser.arena.add(
                    SyntaxKind::Parameter,
                    param_start,
                    parser.prev_end(),
                    NodeData::Parameter(ParameterData {
                        modifiers: ModifierFlags::empty(),
                        name,
                        question_token: false,
                        type_annotation: NodeIndex::NONE,
                        initializer: NodeIndex::NONE,
                    }),
                )]
            } else {
                parser.parse_parameter_list()
            };
            let return_type = parser.parse_type_annotation();
            if !parser.parse_optional(SyntaxKind::EqualsGreaterThanToken) {
                return None;
            }
            Some((parameters, return_type))
        })?;

        let (parameters, return_type) = head;
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_assignment_expression()
        };
        Some(self.arena.add(
            SyntaxKind::ArrowFunction,
            start,
            self.prev_end(),
            NodeData::Function(FunctionData {
                modifiers: ModifierFlags::empty(),
                name: NodeIndex::NONE,
                parameters,
                return_type,
                body,
            }),
        ))
    }

    /// Cheap token scan: the matching `)` is followed by `=>` or `:`.
    fn looks_like_parenthesized_arrow(&self) -> bool {
        let mut depth = 0usize;
        let mut offset = 0usize;
        loop {
            match self.look_ahead(offset) {
                SyntaxKind::OpenParenToken => depth += 1,
                SyntaxKind::CloseParenToken => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.look_ahead(offset + 1),
                            SyntaxKind::EqualsGreaterThanToken | SyntaxKind::ColonToken
                        );
                    }
                }
                SyntaxKind::EndOfFileToken => return false,
                _ => {}
            }
            offset += 1;
        }
    }
}
