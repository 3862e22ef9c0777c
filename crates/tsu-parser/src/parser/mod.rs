//! Arena AST and the recursive-descent parser that fills it.

pub mod node;
pub use node::{ModifierFlags, Node, NodeArena, NodeData, NodeIndex, NodeList, VariableKind};

pub mod state;
mod state_expressions;
mod state_statements;
mod state_types;

pub use state::{ParseDiagnostic, ParserState};
