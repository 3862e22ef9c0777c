//! Assignability between types.
//!
//! Structural for object types, with `any`/error types relating to
//! everything. Under non-strict options `null` and `undefined` are
//! assignable to every type.

use tsu_common::diagnostics::{DiagnosticMessageChain, diagnostic_codes, format_message};
use tsu_common::limits::{MAX_ASSIGNABILITY_DEPTH, MAX_BASE_TYPE_DEPTH};
use tsu_parser::NodeIndex;

use crate::state::CheckerState;
use crate::types::{PropertyInfo, Signature, TypeData, TypeId};

impl CheckerState {
    /// Whether a value of type `source` may be stored in a slot of type
    /// `target`.
    pub fn is_type_assignable_to(&self, source: TypeId, target: TypeId) -> bool {
        self.is_assignable(source, target, 0)
    }

    /// Report `Type 'S' is not assignable to type 'T'` at `node` unless the
    /// types relate. Returns whether they do.
    pub(crate) fn check_type_assignable(
        &mut self,
        source: TypeId,
        target: TypeId,
        node: NodeIndex,
    ) -> bool {
        if self.is_type_assignable_to(source, target) {
            return true;
        }
        let source_text = self.type_to_string(source);
        let target_text = self.type_to_string(target);
        let elaboration = self.assignability_elaboration(source, target);
        self.error_at_node_with(
            node,
            format_message(
                diagnostic_codes::MSG_TYPE_NOT_ASSIGNABLE,
                &[&source_text, &target_text],
            ),
            diagnostic_codes::TYPE_NOT_ASSIGNABLE,
            elaboration,
        );
        false
    }

    /// Explain why an object type is not assignable: the first missing or
    /// incompatible property.
    pub(crate) fn assignability_elaboration(
        &self,
        source: TypeId,
        target: TypeId,
    ) -> Option<DiagnosticMessageChain> {
        self.interner.object_shape(source)?;
        self.interner.object_shape(target)?;

        for property in self.all_properties(target) {
            match self.property_of_type(source, &property.name) {
                None if !property.optional => {
                    return Some(DiagnosticMessageChain::new(format_message(
                        diagnostic_codes::MSG_PROPERTY_MISSING,
                        &[
                            &property.name,
                            &self.type_to_string(source),
                            &self.type_to_string(target),
                        ],
                    )));
                }
                Some(found) if !self.is_type_assignable_to(found.type_id, property.type_id) => {
                    let detail = DiagnosticMessageChain::new(format_message(
                        diagnostic_codes::MSG_TYPE_NOT_ASSIGNABLE,
                        &[
                            &self.type_to_string(found.type_id),
                            &self.type_to_string(property.type_id),
                        ],
                    ));
                    return Some(
                        DiagnosticMessageChain::new(format!(
                            "Types of property '{}' are incompatible.",
                            property.name
                        ))
                        .chain(detail),
                    );
                }
                _ => {}
            }
        }
        None
    }

    fn is_assignable(&self, source: TypeId, target: TypeId, depth: u32) -> bool {
        if source == target || depth > MAX_ASSIGNABILITY_DEPTH {
            return true;
        }
        if source.is_any_or_error()
            || matches!(target, TypeId::ANY | TypeId::UNKNOWN | TypeId::ERROR)
            || source == TypeId::NEVER
        {
            return true;
        }
        if !self.options().strict && matches!(source, TypeId::NULL | TypeId::UNDEFINED) {
            return true;
        }
        if source == TypeId::UNDEFINED && target == TypeId::VOID {
            return true;
        }

        if let TypeData::Union(members) = self.interner.get(source) {
            return members
                .iter()
                .all(|&member| self.is_assignable(member, target, depth + 1));
        }
        if let TypeData::Union(members) = self.interner.get(target) {
            return members
                .iter()
                .any(|&member| self.is_assignable(source, member, depth + 1));
        }

        match (self.interner.get(source), self.interner.get(target)) {
            (TypeData::Literal(_), _) => self.interner.base_primitive(source) == target,
            (TypeData::Array(source_element), TypeData::Array(target_element)) => {
                self.is_assignable(*source_element, *target_element, depth + 1)
            }
            (TypeData::Object(_), TypeData::Object(_)) => {
                self.is_object_assignable(source, target, depth)
            }
            (TypeData::Intrinsic(_) | TypeData::Array(_), TypeData::Object(shape)) => {
                // Any non-nullish value fits the empty object type.
                shape.properties.is_empty()
                    && shape.call_signatures.is_empty()
                    && shape.construct_signatures.is_empty()
                    && !matches!(source, TypeId::NULL | TypeId::UNDEFINED | TypeId::VOID)
            }
            _ => false,
        }
    }

    fn is_object_assignable(&self, source: TypeId, target: TypeId, depth: u32) -> bool {
        if self.derives_from(source, target) {
            return true;
        }

        for property in self.all_properties(target) {
            match self.property_of_type(source, &property.name) {
                Some(found) => {
                    if !self.is_assignable(found.type_id, property.type_id, depth + 1) {
                        return false;
                    }
                }
                None if property.optional => {}
                None => return false,
            }
        }

        let target_calls = self.interner.call_signatures(target);
        if let Some(target_signature) = target_calls.first() {
            let source_calls = self.interner.call_signatures(source);
            if !source_calls
                .iter()
                .any(|s| self.is_signature_assignable(s, target_signature, depth + 1))
            {
                return false;
            }
        }
        if !self.interner.construct_signatures(target).is_empty()
            && self.interner.construct_signatures(source).is_empty()
        {
            return false;
        }
        true
    }

    /// Parameters are compared bivariantly; a source may take fewer
    /// parameters than the target supplies.
    fn is_signature_assignable(&self, source: &Signature, target: &Signature, depth: u32) -> bool {
        if source.min_argument_count() > target.params.len() {
            return false;
        }
        let params_fit = source.params.iter().zip(&target.params).all(|(s, t)| {
            self.is_assignable(t.type_id, s.type_id, depth + 1)
                || self.is_assignable(s.type_id, t.type_id, depth + 1)
        });
        params_fit
            && (target.return_type == TypeId::VOID
                || self.is_assignable(source.return_type, target.return_type, depth + 1))
    }

    /// Whether `target` is `source` or one of its (transitive) base types.
    pub(crate) fn derives_from(&self, source: TypeId, target: TypeId) -> bool {
        let mut pending = vec![(source, 0u32)];
        while let Some((current, depth)) = pending.pop() {
            if current == target {
                return true;
            }
            if depth < MAX_BASE_TYPE_DEPTH {
                pending.extend(
                    self.interner
                        .base_types(current)
                        .iter()
                        .map(|&base| (base, depth + 1)),
                );
            }
        }
        false
    }

    /// Own and inherited properties; a derived declaration hides the base one.
    pub(crate) fn all_properties(&self, type_id: TypeId) -> Vec<PropertyInfo> {
        let mut result: Vec<PropertyInfo> = Vec::new();
        let mut pending = vec![(type_id, 0u32)];
        while let Some((current, depth)) = pending.pop() {
            let Some(shape) = self.interner.object_shape(current) else {
                continue;
            };
            for property in &shape.properties {
                if !result.iter().any(|p| p.name == property.name) {
                    result.push(property.clone());
                }
            }
            if depth < MAX_BASE_TYPE_DEPTH {
                pending.extend(shape.base_types.iter().rev().map(|&base| (base, depth + 1)));
            }
        }
        result
    }
}
