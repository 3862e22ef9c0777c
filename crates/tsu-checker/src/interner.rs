//! Type interning and display.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::types::{
    IntrinsicKind, LiteralValue, ObjectKind, ObjectShape, Signature, TypeData, TypeId,
};

static ERROR_TYPE_DATA: TypeData = TypeData::Intrinsic(IntrinsicKind::Error);

/// Owner of all types of one checker instance.
pub struct TypeInterner {
    types: Vec<TypeData>,
    /// Structural types only; objects are never deduplicated.
    lookup: FxHashMap<TypeData, TypeId>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = TypeInterner {
            types: Vec::new(),
            lookup: FxHashMap::default(),
        };
        // Order must match the `TypeId` constants.
        for kind in [
            IntrinsicKind::Any,
            IntrinsicKind::Unknown,
            IntrinsicKind::Never,
            IntrinsicKind::Void,
            IntrinsicKind::Undefined,
            IntrinsicKind::Null,
            IntrinsicKind::Number,
            IntrinsicKind::String,
            IntrinsicKind::Boolean,
            IntrinsicKind::Error,
        ] {
            interner.intern(TypeData::Intrinsic(kind));
        }
        interner.intern(TypeData::Literal(LiteralValue::Boolean(true)));
        interner.intern(TypeData::Literal(LiteralValue::Boolean(false)));
        debug_assert_eq!(interner.types.len() as u32, TypeId::FIRST_DYNAMIC);
        interner
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        self.types
            .get(id.0 as usize)
            .unwrap_or(&ERROR_TYPE_DATA)
    }

    /// Intern a structural type.
    pub fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.lookup.insert(data, id);
        id
    }

    /// Allocate a fresh object type.
    pub fn alloc_object(&mut self, shape: ObjectShape) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeData::Object(shape));
        id
    }

    /// Replace the shape of an object type allocated earlier. Class and
    /// interface types are allocated before their members are resolved so
    /// members can refer back to them.
    pub fn set_object_shape(&mut self, id: TypeId, shape: ObjectShape) {
        if let Some(slot @ TypeData::Object(_)) = self.types.get_mut(id.0 as usize) {
            *slot = TypeData::Object(shape);
        }
    }

    pub fn object_shape(&self, id: TypeId) -> Option<&ObjectShape> {
        match self.get(id) {
            TypeData::Object(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn number_literal(&mut self, text: &str) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(normalize_number(
            text,
        ))))
    }

    pub fn string_literal(&mut self, text: &str) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::String(text.to_string())))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    /// A function type with a single call signature.
    pub fn function(&mut self, signature: Signature) -> TypeId {
        let mut shape = ObjectShape::new(ObjectKind::Anonymous, None, None);
        shape.call_signatures.push(signature);
        self.alloc_object(shape)
    }

    /// Build a union. Nested unions are flattened, duplicates dropped,
    /// literals absorbed by their primitive, and `any` wins outright.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; 4]> = SmallVec::new();
        for member in members {
            match self.get(member) {
                TypeData::Union(inner) => {
                    for &id in inner.iter() {
                        if !flat.contains(&id) {
                            flat.push(id);
                        }
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        if flat.iter().any(|&id| id.is_any_or_error()) {
            return TypeId::ANY;
        }
        flat.retain(|id| *id != TypeId::NEVER);
        if flat.contains(&TypeId::TRUE) && flat.contains(&TypeId::FALSE) {
            let at = flat.iter().position(|&id| id == TypeId::TRUE || id == TypeId::FALSE);
            flat.retain(|id| *id != TypeId::TRUE && *id != TypeId::FALSE);
            if !flat.contains(&TypeId::BOOLEAN) {
                flat.insert(at.unwrap_or(0).min(flat.len()), TypeId::BOOLEAN);
            }
        }
        let snapshot = flat.clone();
        flat.retain(|id| {
            let base = self.base_primitive(*id);
            base == *id || !snapshot.contains(&base)
        });

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => self.intern(TypeData::Union(flat)),
        }
    }

    pub fn union_members(&self, id: TypeId) -> SmallVec<[TypeId; 4]> {
        match self.get(id) {
            TypeData::Union(members) => members.clone(),
            _ => smallvec::smallvec![id],
        }
    }

    pub fn is_literal(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Literal(_))
    }

    /// Primitive a literal belongs to; other types map to themselves.
    pub fn base_primitive(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeData::Literal(LiteralValue::Number(_)) => TypeId::NUMBER,
            TypeData::Literal(LiteralValue::String(_)) => TypeId::STRING,
            TypeData::Literal(LiteralValue::Boolean(_)) => TypeId::BOOLEAN,
            _ => id,
        }
    }

    /// Widen literal types (also inside unions) to their primitives, as done
    /// for mutable bindings.
    pub fn widen(&mut self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeData::Literal(_) => self.base_primitive(id),
            TypeData::Union(members) => {
                let members = members.clone();
                let widened: Vec<TypeId> = members.iter().map(|&m| self.base_primitive(m)).collect();
                self.union(widened)
            }
            _ => id,
        }
    }

    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Array(element) => Some(*element),
            _ => None,
        }
    }

    pub fn call_signatures(&self, id: TypeId) -> &[Signature] {
        self.object_shape(id)
            .map_or(&[], |shape| shape.call_signatures.as_slice())
    }

    pub fn construct_signatures(&self, id: TypeId) -> &[Signature] {
        self.object_shape(id)
            .map_or(&[], |shape| shape.construct_signatures.as_slice())
    }

    pub fn base_types(&self, id: TypeId) -> &[TypeId] {
        self.object_shape(id)
            .map_or(&[], |shape| shape.base_types.as_slice())
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Display string for a type, as shown to the host and in diagnostics.
    ///
    /// Primitives use host-facing names (`Number`, `String`, `Boolean`).
    pub fn type_to_string(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(id, &mut out, 0);
        out
    }

    fn write_type(&self, id: TypeId, out: &mut String, depth: u32) {
        if depth > 8 {
            out.push_str("...");
            return;
        }
        match self.get(id) {
            TypeData::Intrinsic(kind) => out.push_str(intrinsic_name(*kind)),
            TypeData::Literal(LiteralValue::Number(text)) => out.push_str(text),
            TypeData::Literal(LiteralValue::String(text)) => {
                out.push('"');
                out.push_str(text);
                out.push('"');
            }
            TypeData::Literal(LiteralValue::Boolean(value)) => {
                out.push_str(if *value { "true" } else { "false" })
            }
            TypeData::Array(element) => {
                let needs_parens = match self.get(*element) {
                    TypeData::Union(_) => true,
                    TypeData::Object(shape) => {
                        shape.name.is_none() && !shape.call_signatures.is_empty()
                    }
                    _ => false,
                };
                if needs_parens {
                    out.push('(');
                }
                self.write_type(*element, out, depth + 1);
                if needs_parens {
                    out.push(')');
                }
                out.push_str("[]");
            }
            TypeData::Union(members) => {
                for (i, &member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.write_type(member, out, depth + 1);
                }
            }
            TypeData::Object(shape) => self.write_object(shape, out, depth),
        }
    }

    fn write_object(&self, shape: &ObjectShape, out: &mut String, depth: u32) {
        match (&shape.kind, &shape.name) {
            (ObjectKind::ClassConstructor, Some(name)) => {
                out.push_str("typeof ");
                out.push_str(name);
                return;
            }
            (_, Some(name)) => {
                out.push_str(name);
                return;
            }
            _ => {}
        }

        if shape.properties.is_empty()
            && shape.call_signatures.len() == 1
            && shape.construct_signatures.is_empty()
        {
            self.write_signature(&shape.call_signatures[0], " => ", out, depth);
            return;
        }

        if shape.properties.is_empty() && shape.call_signatures.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push_str("{ ");
        for signature in &shape.call_signatures {
            self.write_signature(signature, ": ", out, depth);
            out.push_str("; ");
        }
        for property in &shape.properties {
            out.push_str(&property.name);
            if property.optional {
                out.push('?');
            }
            out.push_str(": ");
            self.write_type(property.type_id, out, depth + 1);
            out.push_str("; ");
        }
        out.push('}');
    }

    fn write_signature(&self, signature: &Signature, arrow: &str, out: &mut String, depth: u32) {
        out.push('(');
        for (i, param) in signature.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name);
            if param.optional {
                out.push('?');
            }
            out.push_str(": ");
            self.write_type(param.type_id, out, depth + 1);
        }
        out.push(')');
        out.push_str(arrow);
        self.write_type(signature.return_type, out, depth + 1);
    }
}

fn intrinsic_name(kind: IntrinsicKind) -> &'static str {
    match kind {
        IntrinsicKind::Any | IntrinsicKind::Error => "any",
        IntrinsicKind::Unknown => "unknown",
        IntrinsicKind::Never => "never",
        IntrinsicKind::Void => "void",
        IntrinsicKind::Undefined => "undefined",
        IntrinsicKind::Null => "null",
        IntrinsicKind::Number => "Number",
        IntrinsicKind::String => "String",
        IntrinsicKind::Boolean => "Boolean",
    }
}

/// Canonical text of a numeric literal: `1.50` → `1.5`, `0x10` → `16`.
fn normalize_number(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let value = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok().map(|v| v as f64)
    } else {
        cleaned.parse::<f64>().ok()
    };
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 && v.abs() < 1e21 {
                format!("{}", v as i64)
            } else {
                format!("{v}")
            }
        }
        _ => cleaned,
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
