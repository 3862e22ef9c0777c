//! Type representation.
//!
//! Types are identified by [`TypeId`], an index into the [`TypeInterner`].
//! Structural types (literals, arrays, unions) are deduplicated so identical
//! structure yields identical ids. Nominal types (class instances,
//! interfaces, class constructors, object literals, functions) are allocated
//! fresh per declaration or expression.
//!
//! [`TypeInterner`]: crate::interner::TypeInterner

use smallvec::SmallVec;

use crate::binder::SymbolId;

/// Interned type handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const UNDEFINED: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const NUMBER: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    /// Result of a failed resolution. Displays as `any` and relates to
    /// everything so one error does not cascade.
    pub const ERROR: TypeId = TypeId(9);
    pub const TRUE: TypeId = TypeId(10);
    pub const FALSE: TypeId = TypeId(11);

    /// Number of pre-interned types.
    pub(crate) const FIRST_DYNAMIC: u32 = 12;

    pub fn is_any_or_error(self) -> bool {
        self == TypeId::ANY || self == TypeId::ERROR
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Number,
    String,
    Boolean,
    Error,
}

/// Value of a literal type. Numbers keep their normalized source text so
/// `1.0` and `1` intern to the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Number(String),
    String(String),
    Boolean(bool),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
}

/// A call or construct signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl Signature {
    /// Number of arguments a call must supply.
    pub fn min_argument_count(&self) -> usize {
        self.params.iter().take_while(|p| !p.optional).count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Instance side of a class.
    ClassInstance,
    /// Static side of a class; carries the construct signature.
    ClassConstructor,
    Interface,
    /// Object literal or function type literal.
    Anonymous,
}

/// Members of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub kind: ObjectKind,
    /// Declared name for classes and interfaces.
    pub name: Option<String>,
    /// Declaring symbol, for nominal identity.
    pub symbol: Option<SymbolId>,
    pub properties: Vec<PropertyInfo>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    /// `extends` targets: the base class instance, or extended interfaces.
    pub base_types: SmallVec<[TypeId; 2]>,
}

impl ObjectShape {
    pub fn new(kind: ObjectKind, name: Option<String>, symbol: Option<SymbolId>) -> Self {
        ObjectShape {
            kind,
            name,
            symbol,
            properties: Vec::new(),
            call_signatures: Vec::new(),
            construct_signatures: Vec::new(),
            base_types: SmallVec::new(),
        }
    }

    /// Own property by name (inherited members are not consulted).
    pub fn own_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// The structure behind a [`TypeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Array(TypeId),
    /// Flattened, deduplicated members in first-seen order.
    Union(SmallVec<[TypeId; 4]>),
    Object(ObjectShape),
}
