//! Parser state - statement and declaration parsing methods

use tsu_common::diagnostics::diagnostic_codes;

use super::node::{
    BlockData, ClassData, FunctionData, IfData, ImportDeclData, ImportSpecifierData,
    InterfaceData, LoopData, ModifierFlags, NodeData, NodeIndex, NodeList, ParameterData,
    PropertyData, SourceFileData, TypeAliasData, TypeReferenceData, VariableDeclarationData,
    VariableKind, VariableStatementData, WrapperData,
};
use super::state::ParserState;
use crate::scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Source file
    // =========================================================================

    /// Parse the whole token stream into a `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let mut statements = NodeList::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.pos;
            let statement = self.parse_statement();
            if self.pos != before && statement.is_some() {
                statements.push(statement);
            }
            if self.pos == before {
                // Stray token that cannot start a statement (e.g. `}`).
                self.parse_error_at_current_token(
                    diagnostic_codes::MSG_DECLARATION_OR_STATEMENT_EXPECTED.to_string(),
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }

        let end = self.token_end();
        tracing::trace!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.parse_diagnostics.len(),
            "parsed source file"
        );
        self.arena.add(
            SyntaxKind::SourceFile,
            0,
            end,
            NodeData::SourceFile(SourceFileData { statements }),
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            self.next_token();
            return NodeIndex::NONE;
        }
        let statement = self.parse_statement_worker();
        self.exit_recursion();
        statement
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        match self.kind() {
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => NodeIndex::NONE,
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                let start = self.token_start();
                self.next_token();
                self.arena.add(
                    SyntaxKind::EmptyStatement,
                    start,
                    self.prev_end(),
                    NodeData::Token,
                )
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                self.parse_break_or_continue_statement()
            }
            SyntaxKind::ImportKeyword => {
                self.has_module_syntax = true;
                self.parse_import_declaration()
            }
            _ if self.is_start_of_declaration() => self.parse_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    /// Whether the current token begins a declaration, modifiers included.
    pub(crate) fn is_start_of_declaration(&self) -> bool {
        let mut offset = 0;
        loop {
            match self.look_ahead(offset) {
                SyntaxKind::ExportKeyword => offset += 1,
                SyntaxKind::DeclareKeyword if self.is_declaration_keyword_at(offset + 1) => {
                    offset += 1
                }
                _ => return self.is_declaration_keyword_at(offset),
            }
        }
    }

    fn is_declaration_keyword_at(&self, offset: usize) -> bool {
        let next = self.look_ahead(offset + 1);
        match self.look_ahead(offset) {
            SyntaxKind::FunctionKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::VarKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::ExportKeyword => true,
            SyntaxKind::LetKeyword => next.is_identifier_or_contextual_keyword(),
            SyntaxKind::InterfaceKeyword | SyntaxKind::TypeKeyword => {
                next.is_identifier_or_contextual_keyword()
                    && !self.token_at(offset + 1).has_preceding_line_break
            }
            SyntaxKind::DeclareKeyword => self.is_declaration_keyword_at(offset + 1),
            _ => false,
        }
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list_until_close_brace();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            SyntaxKind::Block,
            start,
            self.prev_end(),
            NodeData::Block(BlockData { statements }),
        )
    }

    fn parse_statement_list_until_close_brace(&mut self) -> NodeList {
        let mut statements = NodeList::new();
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let before = self.pos;
            let statement = self.parse_statement();
            if self.pos != before && statement.is_some() {
                statements.push(statement);
            }
            if self.pos == before {
                self.parse_error_at_current_token(
                    diagnostic_codes::MSG_DECLARATION_OR_STATEMENT_EXPECTED.to_string(),
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }
        statements
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        let expression = self.parse_expression();
        self.parse_semicolon();
        self.arena.add(
            SyntaxKind::ExpressionStatement,
            start,
            self.prev_end(),
            NodeData::Wrapper(WrapperData { expression }),
        )
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            SyntaxKind::IfStatement,
            start,
            self.prev_end(),
            NodeData::If(IfData {
                condition,
                then_statement,
                else_statement,
            }),
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add(
            SyntaxKind::WhileStatement,
            start,
            self.prev_end(),
            NodeData::Loop(LoopData {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            }),
        )
    }

    /// `for (init; cond; incr) stmt` or `for (const x of xs) stmt`.
    fn parse_for_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let mut initializer = NodeIndex::NONE;
        if !self.is_token(SyntaxKind::SemicolonToken) {
            if let Some(kind) = self.variable_kind_at_current() {
                let init_start = self.token_start();
                self.next_token();
                let declarations = self.parse_variable_declaration_list(kind, true);
                initializer = self.arena.add(
                    SyntaxKind::VariableStatement,
                    init_start,
                    self.prev_end(),
                    NodeData::VariableStatement(VariableStatementData {
                        modifiers: ModifierFlags::empty(),
                        kind,
                        declarations,
                    }),
                );
            } else {
                initializer = self.parse_expression();
            }
        }

        if self.parse_optional(SyntaxKind::OfKeyword) {
            let iterated = self.parse_assignment_expression();
            self.parse_expected(SyntaxKind::CloseParenToken);
            let statement = self.parse_statement();
            return self.arena.add(
                SyntaxKind::ForOfStatement,
                start,
                self.prev_end(),
                NodeData::Loop(LoopData {
                    initializer,
                    condition: iterated,
                    incrementor: NodeIndex::NONE,
                    statement,
                }),
            );
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add(
            SyntaxKind::ForStatement,
            start,
            self.prev_end(),
            NodeData::Loop(LoopData {
                initializer,
                condition,
                incrementor,
                statement,
            }),
        )
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let expression = if self.can_parse_semicolon() {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.arena.add(
            SyntaxKind::ReturnStatement,
            start,
            self.prev_end(),
            NodeData::Wrapper(WrapperData { expression }),
        )
    }

    fn parse_break_or_continue_statement(&mut self) -> NodeIndex {
        let kind = if self.is_token(SyntaxKind::BreakKeyword) {
            SyntaxKind::BreakStatement
        } else {
            SyntaxKind::ContinueStatement
        };
        let start = self.token_start();
        self.next_token();
        self.parse_semicolon();
        self.arena.add(kind, start, self.prev_end(), NodeData::Token)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_modifiers(&mut self) -> ModifierFlags {
        let mut modifiers = ModifierFlags::empty();
        loop {
            match self.kind() {
                SyntaxKind::ExportKeyword => {
                    modifiers |= ModifierFlags::EXPORT;
                    self.has_module_syntax = true;
                }
                SyntaxKind::DeclareKeyword if self.is_declaration_keyword_at(1) => {
                    modifiers |= ModifierFlags::DECLARE;
                }
                _ => return modifiers,
            }
            self.next_token();
        }
    }

    fn parse_declaration(&mut self) -> NodeIndex {
        let start = self.token_start();
        let modifiers = self.parse_modifiers();
        match self.kind() {
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(start, modifiers),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(start, modifiers),
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(start, modifiers),
            SyntaxKind::TypeKeyword => self.parse_type_alias_declaration(start, modifiers),
            _ => match self.variable_kind_at_current() {
                Some(kind) => self.parse_variable_statement(start, modifiers, kind),
                None => {
                    self.parse_error_at_current_token(
                        diagnostic_codes::MSG_DECLARATION_OR_STATEMENT_EXPECTED.to_string(),
                        diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                    );
                    NodeIndex::NONE
                }
            },
        }
    }

    fn variable_kind_at_current(&self) -> Option<VariableKind> {
        match self.kind() {
            SyntaxKind::VarKeyword => Some(VariableKind::Var),
            SyntaxKind::ConstKeyword => Some(VariableKind::Const),
            SyntaxKind::LetKeyword if self.look_ahead(1).is_identifier_or_contextual_keyword() => {
                Some(VariableKind::Let)
            }
            _ => None,
        }
    }

    fn parse_variable_statement(
        &mut self,
        start: u32,
        modifiers: ModifierFlags,
        kind: VariableKind,
    ) -> NodeIndex {
        self.next_token();
        let declarations = self.parse_variable_declaration_list(kind, false);
        self.parse_semicolon();
        self.arena.add(
            SyntaxKind::VariableStatement,
            start,
            self.prev_end(),
            NodeData::VariableStatement(VariableStatementData {
                modifiers,
                kind,
                declarations,
            }),
        )
    }

    /// Parse `a: T = init, b = init`. In a `for` head, a declaration directly
    /// followed by `of` stops the list.
    fn parse_variable_declaration_list(&mut self, kind: VariableKind, in_for_head: bool) -> NodeList {
        let mut declarations = NodeList::new();
        loop {
            let start = self.token_start();
            let name = self.parse_identifier();
            let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            declarations.push(self.arena.add(
                SyntaxKind::VariableDeclaration,
                start,
                self.prev_end(),
                NodeData::VariableDeclaration(VariableDeclarationData {
                    kind,
                    name,
                    type_annotation,
                    initializer,
                }),
            ));
            if in_for_head && self.is_token(SyntaxKind::OfKeyword) {
                break;
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        declarations
    }

    fn parse_function_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        let parameters = self.parse_parameter_list();
        let return_type = self.parse_type_annotation();
        let body = self.parse_function_body_or_semicolon();
        self.arena.add(
            SyntaxKind::FunctionDeclaration,
            start,
            self.prev_end(),
            NodeData::Function(FunctionData {
                modifiers,
                name,
                parameters,
                return_type,
                body,
            }),
        )
    }

    fn parse_function_body_or_semicolon(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_semicolon();
            NodeIndex::NONE
        }
    }

    /// `: Type` if present.
    pub(crate) fn parse_type_annotation(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        }
    }

    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        let mut parameters = NodeList::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return parameters;
        }
        while !matches!(
            self.kind(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let before = self.pos;
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.pos == before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        parameters
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut modifiers = ModifierFlags::empty();
        while let Some(flag) = self.accessibility_modifier_at_current() {
            modifiers |= flag;
            self.next_token();
        }
        let name = self.parse_identifier();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            SyntaxKind::Parameter,
            start,
            self.prev_end(),
            NodeData::Parameter(ParameterData {
                modifiers,
                name,
                question_token,
                type_annotation,
                initializer,
            }),
        )
    }

    /// Member modifier at the current token, when it is followed by something
    /// that can still be a member name (so `static: number` is a property).
    fn accessibility_modifier_at_current(&self) -> Option<ModifierFlags> {
        let flag = match self.kind() {
            SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
            SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
            SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
            SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
            SyntaxKind::ReadonlyKeyword => ModifierFlags::READONLY,
            SyntaxKind::DeclareKeyword => ModifierFlags::DECLARE,
            _ => return None,
        };
        let next = self.look_ahead(1);
        if next.is_identifier_or_keyword()
            || matches!(next, SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral)
        {
            Some(flag)
        } else {
            None
        }
    }

    fn parse_class_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        let heritage = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_heritage_type_reference()
        } else {
            NodeIndex::NONE
        };

        let mut members = NodeList::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.kind(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                if self.parse_optional(SyntaxKind::SemicolonToken) {
                    continue;
                }
                let before = self.pos;
                let member = self.parse_class_member();
                if member.is_some() {
                    members.push(member);
                }
                if self.pos == before {
                    self.error_identifier_expected();
                    self.next_token();
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }

        self.arena.add(
            SyntaxKind::ClassDeclaration,
            start,
            self.prev_end(),
            NodeData::Class(ClassData {
                modifiers,
                name,
                heritage,
                members,
            }),
        )
    }

    /// A heritage clause entry: a name, possibly dotted (`A.B`), as a type
    /// reference to the last segment.
    fn parse_heritage_type_reference(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut type_name = self.parse_identifier();
        while self.parse_optional(SyntaxKind::DotToken) {
            type_name = self.parse_property_name();
        }
        self.arena.add(
            SyntaxKind::TypeReference,
            start,
            self.prev_end(),
            NodeData::TypeReference(TypeReferenceData { type_name }),
        )
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut modifiers = ModifierFlags::empty();
        while let Some(flag) = self.accessibility_modifier_at_current() {
            modifiers |= flag;
            self.next_token();
        }

        if self.is_token(SyntaxKind::ConstructorKeyword)
            && self.look_ahead(1) == SyntaxKind::OpenParenToken
        {
            let name = self.create_identifier_from_token();
            let parameters = self.parse_parameter_list();
            let body = self.parse_function_body_or_semicolon();
            return self.arena.add(
                SyntaxKind::Constructor,
                start,
                self.prev_end(),
                NodeData::Function(FunctionData {
                    modifiers,
                    name,
                    parameters,
                    return_type: NodeIndex::NONE,
                    body,
                }),
            );
        }

        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);

        if self.is_token(SyntaxKind::OpenParenToken) {
            let parameters = self.parse_parameter_list();
            let return_type = self.parse_type_annotation();
            let body = self.parse_function_body_or_semicolon();
            return self.arena.add(
                SyntaxKind::MethodDeclaration,
                start,
                self.prev_end(),
                NodeData::Function(FunctionData {
                    modifiers,
                    name,
                    parameters,
                    return_type,
                    body,
                }),
            );
        }

        let type_annotation = self.parse_type_annotation();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        self.arena.add(
            SyntaxKind::PropertyDeclaration,
            start,
            self.prev_end(),
            NodeData::Property(PropertyData {
                modifiers,
                name,
                question_token,
                type_annotation,
                initializer,
            }),
        )
    }

    fn parse_interface_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        let mut heritage = NodeList::new();
        if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            loop {
                heritage.push(self.parse_heritage_type_reference());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        let members = self.parse_type_member_list();
        self.arena.add(
            SyntaxKind::InterfaceDeclaration,
            start,
            self.prev_end(),
            NodeData::Interface(InterfaceData {
                modifiers,
                name,
                heritage,
                members,
            }),
        )
    }

    /// `{ a: T; b?(x: U): V, ... }`
    fn parse_type_member_list(&mut self) -> NodeList {
        let mut members = NodeList::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !matches!(
            self.kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let before = self.pos;
            members.push(self.parse_type_member());
            if !self.parse_optional(SyntaxKind::SemicolonToken)
                && !self.parse_optional(SyntaxKind::CommaToken)
                && !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.has_preceding_line_break()
            {
                self.error_token_expected(";");
            }
            if self.pos == before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    fn parse_type_member(&mut self) -> NodeIndex {
        let start = self.token_start();
        let modifiers = if self.is_token(SyntaxKind::ReadonlyKeyword)
            && self.look_ahead(1).is_identifier_or_keyword()
        {
            self.next_token();
            ModifierFlags::READONLY
        } else {
            ModifierFlags::empty()
        };
        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);

        if self.is_token(SyntaxKind::OpenParenToken) {
            let parameters = self.parse_parameter_list();
            let return_type = self.parse_type_annotation();
            return self.arena.add(
                SyntaxKind::MethodSignature,
                start,
                self.prev_end(),
                NodeData::Function(FunctionData {
                    modifiers,
                    name,
                    parameters,
                    return_type,
                    body: NodeIndex::NONE,
                }),
            );
        }

        let type_annotation = self.parse_type_annotation();
        self.arena.add(
            SyntaxKind::PropertySignature,
            start,
            self.prev_end(),
            NodeData::Property(PropertyData {
                modifiers,
                name,
                question_token,
                type_annotation,
                initializer: NodeIndex::NONE,
            }),
        )
    }

    fn parse_type_alias_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::EqualsToken);
        let type_node = self.parse_type();
        self.parse_semicolon();
        self.arena.add(
            SyntaxKind::TypeAliasDeclaration,
            start,
            self.prev_end(),
            NodeData::TypeAlias(TypeAliasData {
                modifiers,
                name,
                type_node,
            }),
        )
    }

    /// `import { a, b as c } from "./mod";`
    fn parse_import_declaration(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let mut specifiers = NodeList::new();

        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.kind(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                let spec_start = self.token_start();
                let first = self.parse_property_name();
                let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
                    (first, self.parse_identifier())
                } else {
                    (NodeIndex::NONE, first)
                };
                specifiers.push(self.arena.add(
                    SyntaxKind::ImportSpecifier,
                    spec_start,
                    self.prev_end(),
                    NodeData::ImportSpecifier(ImportSpecifierData {
                        property_name,
                        name,
                    }),
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }

        self.parse_expected(SyntaxKind::FromKeyword);
        let module_specifier = if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_literal()
        } else {
            self.error_token_expected("string literal");
            NodeIndex::NONE
        };
        self.parse_semicolon();

        self.arena.add(
            SyntaxKind::ImportDeclaration,
            start,
            self.prev_end(),
            NodeData::Import(ImportDeclData {
                specifiers,
                module_specifier,
            }),
        )
    }
}
