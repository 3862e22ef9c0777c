use super::*;
use crate::types::{ParamInfo, PropertyInfo};

#[test]
fn test_intrinsics_display_with_host_names() {
    let interner = TypeInterner::new();
    assert_eq!(interner.type_to_string(TypeId::NUMBER), "Number");
    assert_eq!(interner.type_to_string(TypeId::STRING), "String");
    assert_eq!(interner.type_to_string(TypeId::BOOLEAN), "Boolean");
    assert_eq!(interner.type_to_string(TypeId::VOID), "void");
    assert_eq!(interner.type_to_string(TypeId::ERROR), "any");
}

#[test]
fn test_structural_types_are_deduplicated() {
    let mut interner = TypeInterner::new();
    let a = interner.array(TypeId::NUMBER);
    let b = interner.array(TypeId::NUMBER);
    assert_eq!(a, b);

    let one = interner.number_literal("1.0");
    let other_one = interner.number_literal("1");
    assert_eq!(one, other_one);
    assert_eq!(interner.type_to_string(one), "1");
    let hex = interner.number_literal("0x10");
    assert_eq!(interner.type_to_string(hex), "16");
}

#[test]
fn test_objects_are_never_deduplicated() {
    let mut interner = TypeInterner::new();
    let a = interner.alloc_object(ObjectShape::new(ObjectKind::Anonymous, None, None));
    let b = interner.alloc_object(ObjectShape::new(ObjectKind::Anonymous, None, None));
    assert_ne!(a, b);
}

#[test]
fn test_union_flattens_and_keeps_first_seen_order() {
    let mut interner = TypeInterner::new();
    let inner = interner.union([TypeId::STRING, TypeId::NUMBER]);
    let outer = interner.union([TypeId::BOOLEAN, inner, TypeId::STRING]);
    assert_eq!(interner.type_to_string(outer), "Boolean | String | Number");
}

#[test]
fn test_union_absorbs_literals_and_collapses_booleans() {
    let mut interner = TypeInterner::new();
    let lit = interner.string_literal("a");
    let union = interner.union([lit, TypeId::STRING]);
    assert_eq!(union, TypeId::STRING);

    let booleans = interner.union([TypeId::TRUE, TypeId::NUMBER, TypeId::FALSE]);
    assert_eq!(interner.type_to_string(booleans), "Boolean | Number");

    assert_eq!(interner.union([TypeId::NUMBER, TypeId::ANY]), TypeId::ANY);
    assert_eq!(interner.union(Vec::new()), TypeId::NEVER);
}

#[test]
fn test_array_of_union_is_parenthesized() {
    let mut interner = TypeInterner::new();
    let union = interner.union([TypeId::NUMBER, TypeId::STRING]);
    let array = interner.array(union);
    let nested = interner.array(array);
    assert_eq!(interner.type_to_string(nested), "(Number | String)[][]");
}

#[test]
fn test_widen_literals_inside_unions() {
    let mut interner = TypeInterner::new();
    let one = interner.number_literal("1");
    let text = interner.string_literal("x");
    let union = interner.union([one, text]);
    let widened = interner.widen(union);
    assert_eq!(interner.type_to_string(widened), "Number | String");
}

#[test]
fn test_function_type_display() {
    let mut interner = TypeInterner::new();
    let function = interner.function(Signature {
        params: vec![
            ParamInfo {
                name: "a".into(),
                type_id: TypeId::NUMBER,
                optional: false,
            },
            ParamInfo {
                name: "b".into(),
                type_id: TypeId::STRING,
                optional: true,
            },
        ],
        return_type: TypeId::VOID,
    });
    assert_eq!(interner.type_to_string(function), "(a: Number, b?: String) => void");
    assert_eq!(interner.call_signatures(function).len(), 1);
}

#[test]
fn test_named_objects_display_their_name() {
    let mut interner = TypeInterner::new();
    let instance = interner.alloc_object(ObjectShape::new(
        ObjectKind::ClassInstance,
        Some("Actor".into()),
        None,
    ));
    let constructor = interner.alloc_object(ObjectShape::new(
        ObjectKind::ClassConstructor,
        Some("Actor".into()),
        None,
    ));
    assert_eq!(interner.type_to_string(instance), "Actor");
    assert_eq!(interner.type_to_string(constructor), "typeof Actor");
}

#[test]
fn test_set_object_shape_replaces_members() {
    let mut interner = TypeInterner::new();
    let id = interner.alloc_object(ObjectShape::new(ObjectKind::Interface, Some("I".into()), None));
    let mut shape = ObjectShape::new(ObjectKind::Interface, Some("I".into()), None);
    shape.properties.push(PropertyInfo {
        name: "x".into(),
        type_id: TypeId::NUMBER,
        optional: false,
        readonly: false,
    });
    interner.set_object_shape(id, shape);
    let stored = interner.object_shape(id).expect("object");
    assert!(stored.own_property("x").is_some());
}

#[test]
fn test_unknown_ids_read_as_error() {
    let interner = TypeInterner::new();
    assert_eq!(interner.get(TypeId(9999)), &TypeData::Intrinsic(IntrinsicKind::Error));
}
