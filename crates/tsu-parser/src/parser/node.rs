//! Arena AST.
//!
//! Nodes live in a single `Vec<Node>` owned by the [`NodeArena`] and refer to
//! each other by [`NodeIndex`]. Absent children are `NodeIndex::NONE` rather
//! than `Option`, keeping node payloads flat.
//!
//! Every node records its kind, its source span (token start to token end,
//! leading trivia excluded) and a kind-specific payload in [`NodeData`].

use bitflags::bitflags;
use serde::Serialize;

use crate::scanner::SyntaxKind;

/// Index of a node in its file's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

/// Ordered list of child nodes.
pub type NodeList = Vec<NodeIndex>;

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct ModifierFlags: u16 {
        const EXPORT = 1 << 0;
        const DECLARE = 1 << 1;
        const PUBLIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PROTECTED = 1 << 4;
        const STATIC = 1 << 5;
        const READONLY = 1 << 6;
    }
}

/// `let`, `const`, or `var`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, Serialize)]
pub struct IdentifierData {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LiteralData {
    /// Numeric literal source text, or cooked string value.
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFileData {
    pub statements: NodeList,
}

/// Function-like declarations: function declarations, methods, constructors,
/// method signatures, arrow functions, and function types.
#[derive(Clone, Debug, Serialize)]
pub struct FunctionData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
    /// Block, or an expression for concise arrow bodies.
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    /// `extends` target as a type reference.
    pub heritage: NodeIndex,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub heritage: NodeList,
    pub members: NodeList,
}

/// Property declarations (classes) and property signatures (interfaces).
#[derive(Clone, Debug, Serialize)]
pub struct PropertyData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeAliasData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableStatementData {
    pub modifiers: ModifierFlags,
    pub kind: VariableKind,
    pub declarations: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableDeclarationData {
    pub kind: VariableKind,
    pub name: NodeIndex,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportDeclData {
    pub specifiers: NodeList,
    pub module_specifier: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportSpecifierData {
    /// The exported name when renamed (`a` in `a as b`), else NONE.
    pub property_name: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlockData {
    pub statements: NodeList,
}

/// Nodes wrapping a single child: expression statements, `return`,
/// parenthesized expressions and types, `typeof`, array types, literal types.
#[derive(Clone, Debug, Serialize)]
pub struct WrapperData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfData {
    pub condition: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

/// `while`, `for(;;)` and `for..of`. For `for..of`, `initializer` is the
/// variable declaration and `condition` the iterated expression.
#[derive(Clone, Debug, Serialize)]
pub struct LoopData {
    pub initializer: NodeIndex,
    pub condition: NodeIndex,
    pub incrementor: NodeIndex,
    pub statement: NodeIndex,
}

/// Calls and `new` expressions.
#[derive(Clone, Debug, Serialize)]
pub struct CallData {
    pub expression: NodeIndex,
    pub arguments: NodeList,
}

/// Property access (`a.b`, `name_or_argument` is an identifier) and element
/// access (`a[i]`, `name_or_argument` is an expression).
#[derive(Clone, Debug, Serialize)]
pub struct AccessData {
    pub expression: NodeIndex,
    pub name_or_argument: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnaryData {
    pub operator: SyntaxKind,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct BinaryData {
    pub left: NodeIndex,
    pub operator: SyntaxKind,
    pub right: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConditionalData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct AsData {
    pub expression: NodeIndex,
    pub type_node: NodeIndex,
}

/// Array literals, object literals, and union types.
#[derive(Clone, Debug, Serialize)]
pub struct ListData {
    pub elements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyAssignmentData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeReferenceData {
    pub type_name: NodeIndex,
}

/// Kind-specific node payload.
#[derive(Clone, Debug, Serialize)]
pub enum NodeData {
    /// Keyword expressions/types and statements without children.
    Token,
    Identifier(IdentifierData),
    Literal(LiteralData),
    SourceFile(SourceFileData),
    Function(FunctionData),
    Parameter(ParameterData),
    Class(ClassData),
    Interface(InterfaceData),
    Property(PropertyData),
    TypeAlias(TypeAliasData),
    VariableStatement(VariableStatementData),
    VariableDeclaration(VariableDeclarationData),
    Import(ImportDeclData),
    ImportSpecifier(ImportSpecifierData),
    Block(BlockData),
    Wrapper(WrapperData),
    If(IfData),
    Loop(LoopData),
    Call(CallData),
    Access(AccessData),
    Unary(UnaryData),
    Binary(BinaryData),
    Conditional(ConditionalData),
    As(AsData),
    List(ListData),
    PropertyAssignment(PropertyAssignmentData),
    TypeReference(TypeReferenceData),
}

/// A syntax tree node.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub kind: SyntaxKind,
    /// Start of the node's first token (leading trivia excluded).
    pub pos: u32,
    pub end: u32,
    pub data: NodeData,
}

/// Owner of all nodes of one source file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            pos,
            end,
            data,
        });
        index
    }

    /// Get a node by index.
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Drop nodes created after a speculative parse was abandoned.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Kind of a node, `Unknown` for NONE or out-of-range indices.
    #[inline]
    pub fn kind(&self, index: NodeIndex) -> SyntaxKind {
        self.get(index).map_or(SyntaxKind::Unknown, |n| n.kind)
    }

    /// Text of an identifier node.
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match &self.get(index)?.data {
            NodeData::Identifier(data) => Some(&data.text),
            _ => None,
        }
    }

    /// Text of a string or numeric literal node.
    pub fn literal_text(&self, index: NodeIndex) -> Option<&str> {
        match &self.get(index)?.data {
            NodeData::Literal(data) => Some(&data.text),
            _ => None,
        }
    }

    pub fn get_function(&self, index: NodeIndex) -> Option<&FunctionData> {
        match &self.get(index)?.data {
            NodeData::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_parameter(&self, index: NodeIndex) -> Option<&ParameterData> {
        match &self.get(index)?.data {
            NodeData::Parameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_class(&self, index: NodeIndex) -> Option<&ClassData> {
        match &self.get(index)?.data {
            NodeData::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_interface(&self, index: NodeIndex) -> Option<&InterfaceData> {
        match &self.get(index)?.data {
            NodeData::Interface(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_property(&self, index: NodeIndex) -> Option<&PropertyData> {
        match &self.get(index)?.data {
            NodeData::Property(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_variable_declaration(&self, index: NodeIndex) -> Option<&VariableDeclarationData> {
        match &self.get(index)?.data {
            NodeData::VariableDeclaration(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_source_file(&self, index: NodeIndex) -> Option<&SourceFileData> {
        match &self.get(index)?.data {
            NodeData::SourceFile(data) => Some(data),
            _ => None,
        }
    }

    /// Declaration modifiers of a node, empty for nodes without modifiers.
    pub fn modifiers(&self, index: NodeIndex) -> ModifierFlags {
        let Some(node) = self.get(index) else {
            return ModifierFlags::empty();
        };
        match &node.data {
            NodeData::Function(data) => data.modifiers,
            NodeData::Parameter(data) => data.modifiers,
            NodeData::Class(data) => data.modifiers,
            NodeData::Interface(data) => data.modifiers,
            NodeData::Property(data) => data.modifiers,
            NodeData::TypeAlias(data) => data.modifiers,
            NodeData::VariableStatement(data) => data.modifiers,
            _ => ModifierFlags::empty(),
        }
    }

    /// Direct children of a node in source order.
    pub fn children(&self, index: NodeIndex) -> NodeList {
        let mut children = Vec::new();
        self.for_each_child(index, |child| children.push(child));
        children
    }

    /// Visit the direct children of a node in source order.
    pub fn for_each_child(&self, index: NodeIndex, mut visit: impl FnMut(NodeIndex)) {
        let Some(node) = self.get(index) else {
            return;
        };

        let mut push = |child: NodeIndex| {
            if child.is_some() {
                visit(child);
            }
        };

        match &node.data {
            NodeData::Token | NodeData::Identifier(_) | NodeData::Literal(_) => {}
            NodeData::SourceFile(data) => data.statements.iter().copied().for_each(&mut push),
            NodeData::Function(data) => {
                push(data.name);
                data.parameters.iter().copied().for_each(&mut push);
                push(data.return_type);
                push(data.body);
            }
            NodeData::Parameter(data) => {
                push(data.name);
                push(data.type_annotation);
                push(data.initializer);
            }
            NodeData::Class(data) => {
                push(data.name);
                push(data.heritage);
                data.members.iter().copied().for_each(&mut push);
            }
            NodeData::Interface(data) => {
                push(data.name);
                data.heritage.iter().copied().for_each(&mut push);
                data.members.iter().copied().for_each(&mut push);
            }
            NodeData::Property(data) => {
                push(data.name);
                push(data.type_annotation);
                push(data.initializer);
            }
            NodeData::TypeAlias(data) => {
                push(data.name);
                push(data.type_node);
            }
            NodeData::VariableStatement(data) => {
                data.declarations.iter().copied().for_each(&mut push)
            }
            NodeData::VariableDeclaration(data) => {
                push(data.name);
                push(data.type_annotation);
                push(data.initializer);
            }
            NodeData::Import(data) => {
                data.specifiers.iter().copied().for_each(&mut push);
                push(data.module_specifier);
            }
            NodeData::ImportSpecifier(data) => {
                push(data.property_name);
                push(data.name);
            }
            NodeData::Block(data) => data.statements.iter().copied().for_each(&mut push),
            NodeData::Wrapper(data) => push(data.expression),
            NodeData::If(data) => {
                push(data.condition);
                push(data.then_statement);
                push(data.else_statement);
            }
            NodeData::Loop(data) => {
                push(data.initializer);
                push(data.condition);
                push(data.incrementor);
                push(data.statement);
            }
            NodeData::Call(data) => {
                push(data.expression);
                data.arguments.iter().copied().for_each(&mut push);
            }
            NodeData::Access(data) => {
                push(data.expression);
                push(data.name_or_argument);
            }
            NodeData::Unary(data) => push(data.operand),
            NodeData::Binary(data) => {
                push(data.left);
                push(data.right);
            }
            NodeData::Conditional(data) => {
                push(data.condition);
                push(data.when_true);
                push(data.when_false);
            }
            NodeData::As(data) => {
                push(data.expression);
                push(data.type_node);
            }
            NodeData::List(data) => data.elements.iter().copied().for_each(&mut push),
            NodeData::PropertyAssignment(data) => {
                push(data.name);
                push(data.initializer);
            }
            NodeData::TypeReference(data) => push(data.type_name),
        }
    }
}
