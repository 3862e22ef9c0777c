//! Members of primitives and arrays (`s.length`, `xs.push(x)`).
//!
//! Only the members scripts commonly touch are modelled; there is no
//! standard library declaration file behind them.

use crate::interner::TypeInterner;
use crate::types::{ParamInfo, Signature, TypeId};

/// A receiver whose members come from the built-in tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApparentReceiver {
    Array(TypeId),
    String,
    Number,
    Boolean,
}

const ARRAY_MEMBERS: &[&str] = &[
    "length", "push", "pop", "indexOf", "includes", "join", "slice", "reverse", "forEach",
    "map", "filter",
];
const STRING_MEMBERS: &[&str] = &[
    "length",
    "charAt",
    "indexOf",
    "includes",
    "startsWith",
    "endsWith",
    "substring",
    "toUpperCase",
    "toLowerCase",
    "trim",
    "split",
    "replace",
];
const NUMBER_MEMBERS: &[&str] = &["toString", "toFixed"];
const BOOLEAN_MEMBERS: &[&str] = &["valueOf"];

impl ApparentReceiver {
    pub(crate) fn of(interner: &TypeInterner, type_id: TypeId) -> Option<Self> {
        if let Some(element) = interner.array_element(type_id) {
            return Some(ApparentReceiver::Array(element));
        }
        match interner.base_primitive(type_id) {
            TypeId::STRING => Some(ApparentReceiver::String),
            TypeId::NUMBER => Some(ApparentReceiver::Number),
            TypeId::BOOLEAN => Some(ApparentReceiver::Boolean),
            _ => None,
        }
    }

    /// Cache key: arrays by their own type, primitives by the primitive.
    pub(crate) fn key(self, interner: &mut TypeInterner) -> TypeId {
        match self {
            ApparentReceiver::Array(element) => interner.array(element),
            ApparentReceiver::String => TypeId::STRING,
            ApparentReceiver::Number => TypeId::NUMBER,
            ApparentReceiver::Boolean => TypeId::BOOLEAN,
        }
    }

    /// The interned member name, if the receiver has a member called `name`.
    pub(crate) fn member(self, name: &str) -> Option<&'static str> {
        let table = match self {
            ApparentReceiver::Array(_) => ARRAY_MEMBERS,
            ApparentReceiver::String => STRING_MEMBERS,
            ApparentReceiver::Number => NUMBER_MEMBERS,
            ApparentReceiver::Boolean => BOOLEAN_MEMBERS,
        };
        table.iter().copied().find(|member| *member == name)
    }

    /// Build the type of `member`.
    pub(crate) fn member_type(self, interner: &mut TypeInterner, member: &str) -> TypeId {
        if member == "length" {
            return TypeId::NUMBER;
        }
        let signature = match self {
            ApparentReceiver::Array(element) => {
                let array = interner.array(element);
                match member {
                    "push" => method(&[("item", element, false)], TypeId::NUMBER),
                    "pop" => method(&[], element),
                    "indexOf" => method(&[("searchElement", element, false)], TypeId::NUMBER),
                    "includes" => method(&[("searchElement", element, false)], TypeId::BOOLEAN),
                    "join" => method(&[("separator", TypeId::STRING, true)], TypeId::STRING),
                    "slice" => method(
                        &[("start", TypeId::NUMBER, true), ("end", TypeId::NUMBER, true)],
                        array,
                    ),
                    "reverse" => method(&[], array),
                    "forEach" => {
                        let callback = callback(interner, element, TypeId::VOID);
                        method(&[("callbackfn", callback, false)], TypeId::VOID)
                    }
                    "map" => {
                        let callback = callback(interner, element, TypeId::ANY);
                        let result = interner.array(TypeId::ANY);
                        method(&[("callbackfn", callback, false)], result)
                    }
                    "filter" => {
                        let predicate = callback(interner, element, TypeId::ANY);
                        method(&[("predicate", predicate, false)], array)
                    }
                    _ => return TypeId::ERROR,
                }
            }
            ApparentReceiver::String => match member {
                "charAt" => method(&[("pos", TypeId::NUMBER, false)], TypeId::STRING),
                "indexOf" => method(&[("searchString", TypeId::STRING, false)], TypeId::NUMBER),
                "includes" | "startsWith" | "endsWith" => {
                    method(&[("searchString", TypeId::STRING, false)], TypeId::BOOLEAN)
                }
                "substring" => method(
                    &[("start", TypeId::NUMBER, false), ("end", TypeId::NUMBER, true)],
                    TypeId::STRING,
                ),
                "toUpperCase" | "toLowerCase" | "trim" => method(&[], TypeId::STRING),
                "split" => {
                    let parts = interner.array(TypeId::STRING);
                    method(&[("separator", TypeId::STRING, false)], parts)
                }
                "replace" => method(
                    &[
                        ("searchValue", TypeId::STRING, false),
                        ("replaceValue", TypeId::STRING, false),
                    ],
                    TypeId::STRING,
                ),
                _ => return TypeId::ERROR,
            },
            ApparentReceiver::Number => match member {
                "toString" => method(&[("radix", TypeId::NUMBER, true)], TypeId::STRING),
                "toFixed" => method(&[("fractionDigits", TypeId::NUMBER, true)], TypeId::STRING),
                _ => return TypeId::ERROR,
            },
            ApparentReceiver::Boolean => match member {
                "valueOf" => method(&[], TypeId::BOOLEAN),
                _ => return TypeId::ERROR,
            },
        };
        interner.function(signature)
    }
}

fn method(params: &[(&str, TypeId, bool)], return_type: TypeId) -> Signature {
    Signature {
        params: params
            .iter()
            .map(|&(name, type_id, optional)| ParamInfo {
                name: name.to_string(),
                type_id,
                optional,
            })
            .collect(),
        return_type,
    }
}

/// `(value: T, index: number) => R`
fn callback(interner: &mut TypeInterner, element: TypeId, return_type: TypeId) -> TypeId {
    interner.function(method(
        &[("value", element, false), ("index", TypeId::NUMBER, true)],
        return_type,
    ))
}
