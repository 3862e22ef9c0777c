//! Parser state - type parsing methods

use super::node::{
    FunctionData, ListData, ModifierFlags, NodeData, NodeIndex, NodeList, TypeReferenceData,
    WrapperData,
};
use super::state::ParserState;
use crate::scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    /// Parse a type: a union of array-suffixed primary types.
    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.missing_type();
        }
        let result = self.parse_union_type();
        self.exit_recursion();
        result
    }

    fn parse_union_type(&mut self) -> NodeIndex {
        let start = self.token_start();
        // Leading `|` is permitted: `type T = | A | B`.
        let leading_bar = self.parse_optional(SyntaxKind::BarToken);
        let first = self.parse_array_type();
        if !self.is_token(SyntaxKind::BarToken) && !leading_bar {
            return first;
        }

        let mut elements: NodeList = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            elements.push(self.parse_array_type());
        }
        if elements.len() == 1 {
            return first;
        }
        self.arena.add(
            SyntaxKind::UnionType,
            start,
            self.prev_end(),
            NodeData::List(ListData { elements }),
        )
    }

    fn parse_array_type(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut element = self.parse_primary_type();
        while self.is_token(SyntaxKind::OpenBracketToken)
            && self.look_ahead(1) == SyntaxKind::CloseBracketToken
            && !self.has_preceding_line_break()
        {
            self.next_token();
            self.next_token();
            element = self.arena.add(
                SyntaxKind::ArrayType,
                start,
                self.prev_end(),
                NodeData::Wrapper(WrapperData {
                    expression: element,
                }),
            );
        }
        element
    }

    fn parse_primary_type(&mut self) -> NodeIndex {
        match self.kind() {
            SyntaxKind::NumberKeyword
            | SyntaxKind::StringKeyword
            | SyntaxKind::BooleanKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::AnyKeyword
            | SyntaxKind::UnknownKeyword
            | SyntaxKind::NeverKeyword
            | SyntaxKind::UndefinedKeyword
            | SyntaxKind::NullKeyword => self.parse_token_node(),
            SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral => {
                let start = self.token_start();
                let literal = if matches!(
                    self.kind(),
                    SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword
                ) {
                    self.parse_token_node()
                } else {
                    self.parse_literal()
                };
                self.arena.add(
                    SyntaxKind::LiteralType,
                    start,
                    self.prev_end(),
                    NodeData::Wrapper(WrapperData {
                        expression: literal,
                    }),
                )
            }
            SyntaxKind::OpenParenToken => {
                if self.is_start_of_function_type() {
                    self.parse_function_type()
                } else {
                    let start = self.token_start();
                    self.next_token();
                    let inner = self.parse_type();
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    self.arena.add(
                        SyntaxKind::ParenthesizedType,
                        start,
                        self.prev_end(),
                        NodeData::Wrapper(WrapperData { expression: inner }),
                    )
                }
            }
            kind if kind.is_identifier_or_contextual_keyword() => self.parse_type_reference(),
            _ => {
                self.error_type_expected();
                self.missing_type()
            }
        }
    }

    fn parse_type_reference(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut type_name = self.create_identifier_from_token();
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            type_name = self.parse_property_name();
        }
        self.arena.add(
            SyntaxKind::TypeReference,
            start,
            self.prev_end(),
            NodeData::TypeReference(TypeReferenceData { type_name }),
        )
    }

    /// A type reference with an empty name, used for recovery.
    fn missing_type(&mut self) -> NodeIndex {
        let start = self.token_start();
        let type_name = self.missing_identifier();
        self.arena.add(
            SyntaxKind::TypeReference,
            start,
            start,
            NodeData::TypeReference(TypeReferenceData { type_name }),
        )
    }

    /// At `(`: `()`, `(x:`, `(x,`, `(x?`, `(x=` or `(x) =>` start a function type.
    fn is_start_of_function_type(&self) -> bool {
        let next = self.look_ahead(1);
        if next == SyntaxKind::CloseParenToken {
            return true;
        }
        if next.is_identifier_or_contextual_keyword() {
            return match self.look_ahead(2) {
                SyntaxKind::ColonToken
                | SyntaxKind::CommaToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::EqualsToken => true,
                SyntaxKind::CloseParenToken => {
                    self.look_ahead(3) == SyntaxKind::EqualsGreaterThanToken
                }
                _ => false,
            };
        }
        false
    }

    fn parse_function_type(&mut self) -> NodeIndex {
        let start = self.token_start();
        let parameters = self.parse_parameter_list();
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let return_type = self.parse_type();
        self.arena.add(
            SyntaxKind::FunctionType,
            start,
            self.prev_end(),
            NodeData::Function(FunctionData {
                modifiers: ModifierFlags::empty(),
                name: NodeIndex::NONE,
                parameters,
                return_type,
                body: NodeIndex::NONE,
            }),
        )
    }
}
