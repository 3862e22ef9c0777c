//! Host object types referenced by a file.
//!
//! Every node of the file is asked for its type. Types that are, or derive
//! from, the host root type are collected by display name. Constructor types
//! count through the instance type they construct; callable types and
//! literal types never count. A node whose type cannot be resolved is
//! skipped on its own and the walk carries on below it.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use tsu_checker::TypeId;
use tsu_common::limits::MAX_BASE_TYPE_DEPTH;
use tsu_parser::{NodeIndex, SourceFile};

use crate::frontend::Frontend;

pub const DEFAULT_ROOT_TYPE: &str = "UObject";

pub struct DependencyCollector<'a> {
    frontend: &'a mut dyn Frontend,
    root_type: &'a str,
    found: IndexSet<String>,
    /// Types already classified, with the result.
    classified: FxHashMap<TypeId, bool>,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(frontend: &'a mut dyn Frontend, root_type: &'a str) -> Self {
        DependencyCollector {
            frontend,
            root_type,
            found: IndexSet::new(),
            classified: FxHashMap::default(),
        }
    }

    /// Distinct dependency names in first-discovery order.
    pub fn collect(mut self, file: &SourceFile) -> Vec<String> {
        let mut stack = vec![file.root];
        while let Some(node) = stack.pop() {
            self.visit(file, node);
            let mut children = file.arena.children(node);
            children.reverse();
            stack.extend(children);
        }
        self.found.into_iter().collect()
    }

    fn visit(&mut self, file: &SourceFile, node: NodeIndex) {
        let type_id = match self.frontend.resolve_type(&file.file_name, node) {
            Ok(type_id) => type_id,
            Err(err) => {
                trace!(node = node.0, %err, "skipping node without type");
                return;
            }
        };
        if self.frontend.is_literal_type(type_id) {
            return;
        }
        if !self.frontend.call_signatures(type_id).is_empty() {
            return;
        }
        let type_id = self
            .frontend
            .construct_signatures(type_id)
            .first()
            .map_or(type_id, |signature| signature.return_type);

        if self.derives_from_root(type_id) {
            let name = self.frontend.type_display_string(type_id);
            if self.found.insert(name.clone()) {
                trace!(%name, "found dependency");
            }
        }
    }

    /// Whether `type_id` is the root type or has it among its transitive
    /// base types.
    fn derives_from_root(&mut self, type_id: TypeId) -> bool {
        if let Some(&known) = self.classified.get(&type_id) {
            return known;
        }

        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        let mut pending = vec![(type_id, 0u32)];
        let mut result = false;
        while let Some((current, depth)) = pending.pop() {
            if depth > MAX_BASE_TYPE_DEPTH || !visited.insert(current) {
                continue;
            }
            if self.frontend.type_display_string(current) == self.root_type {
                result = true;
                break;
            }
            pending.extend(
                self.frontend
                    .base_types_of(current)
                    .into_iter()
                    .map(|base| (base, depth + 1)),
            );
        }

        self.classified.insert(type_id, result);
        result
    }
}

/// Host object types referenced anywhere in `file`.
pub fn collect_dependencies<'a>(
    frontend: &'a mut dyn Frontend,
    file: &SourceFile,
    root_type: &'a str,
) -> Vec<String> {
    DependencyCollector::new(frontend, root_type).collect(file)
}

#[cfg(test)]
#[path = "../tests/dependencies_tests.rs"]
mod tests;
