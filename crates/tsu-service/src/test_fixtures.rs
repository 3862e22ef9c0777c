//! Scripted frontend for analyzer and collector tests.
//!
//! Types are looked up by node text: `with_node_type("Actor", t)` makes
//! every node spelled exactly `Actor` (identifiers and type references alike)
//! resolve to `t`. Every other node has no type.

use std::sync::Arc;

use anyhow::Result;
use rustc_hash::FxHashMap;
use tsu_checker::{
    EmitOutput, EmittedArtifact, ParamInfo, Signature, SourceHost, TypeId, TypeQueryError,
};
use tsu_common::Diagnostic;
use tsu_parser::{NodeIndex, SourceFile};

use crate::frontend::Frontend;

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeType {
    pub display: String,
    pub bases: Vec<TypeId>,
    pub literal: bool,
    pub callable: bool,
    /// Instance type produced by `new`.
    pub constructs: Option<TypeId>,
}

#[derive(Default)]
pub(crate) struct FakeFrontend {
    pub files: FxHashMap<String, Arc<SourceFile>>,
    pub types: Vec<FakeType>,
    pub node_types: FxHashMap<String, TypeId>,
    /// Return type by function name.
    pub return_types: FxHashMap<String, TypeId>,
    pub diagnostics: Vec<Diagnostic>,
    pub artifact_count: usize,
    pub emit_skipped: bool,
    pub synchronize_calls: usize,
    pub type_queries: usize,
}

impl FakeFrontend {
    pub fn new() -> Self {
        FakeFrontend {
            artifact_count: 1,
            ..FakeFrontend::default()
        }
    }

    pub fn add_type(&mut self, display: &str) -> TypeId {
        self.add(FakeType {
            display: display.to_string(),
            ..FakeType::default()
        })
    }

    pub fn add(&mut self, fake: FakeType) -> TypeId {
        self.types.push(fake);
        TypeId(self.types.len() as u32 - 1)
    }

    pub fn with_node_type(mut self, text: &str, type_id: TypeId) -> Self {
        self.node_types.insert(text.to_string(), type_id);
        self
    }

    pub fn with_return_type(mut self, function: &str, type_id: TypeId) -> Self {
        self.return_types.insert(function.to_string(), type_id);
        self
    }

    fn fake(&self, type_id: TypeId) -> Option<&FakeType> {
        self.types.get(type_id.0 as usize)
    }
}

impl Frontend for FakeFrontend {
    fn synchronize(&mut self, host: &mut dyn SourceHost) -> Result<()> {
        self.synchronize_calls += 1;
        for path in host.root_file_names() {
            if host.script_version(&path).is_none() {
                continue;
            }
            if let Some(text) = host.script_snapshot(&path) {
                self.files
                    .insert(path.clone(), Arc::new(SourceFile::parse(path, text)));
            }
        }
        Ok(())
    }

    fn source_file(&self, path: &str) -> Option<Arc<SourceFile>> {
        self.files.get(path).cloned()
    }

    fn diagnostics(&mut self, _path: &str) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }

    fn emit(&mut self, path: &str) -> Option<EmitOutput> {
        let file = self.files.get(path)?;
        let artifacts = (0..self.artifact_count)
            .map(|i| EmittedArtifact {
                file_name: format!("{path}.{i}.js"),
                text: file.text.to_string(),
            })
            .collect();
        Some(EmitOutput {
            emit_skipped: self.emit_skipped,
            artifacts,
        })
    }

    fn resolve_signature(&mut self, path: &str, declaration: NodeIndex) -> Option<Signature> {
        let file = self.files.get(path)?;
        let func = file.arena.get_function(declaration)?;
        let name = file.node_text(func.name);
        let return_type = *self.return_types.get(name)?;
        let params = func
            .parameters
            .iter()
            .filter_map(|&param| file.arena.get_parameter(param))
            .map(|data| ParamInfo {
                name: file.node_text(data.name).to_string(),
                type_id: TypeId::ANY,
                optional: data.question_token,
            })
            .collect();
        Some(Signature {
            params,
            return_type,
        })
    }

    fn resolve_type(&mut self, path: &str, node: NodeIndex) -> Result<TypeId, TypeQueryError> {
        self.type_queries += 1;
        let file = self
            .files
            .get(path)
            .ok_or_else(|| TypeQueryError::UnknownFile(path.to_string()))?;
        self.node_types
            .get(file.node_text(node).trim())
            .copied()
            .ok_or(TypeQueryError::NoType {
                node,
                kind: file.arena.kind(node),
            })
    }

    fn type_display_string(&self, type_id: TypeId) -> String {
        self.fake(type_id)
            .map_or_else(|| "any".to_string(), |fake| fake.display.clone())
    }

    fn base_types_of(&self, type_id: TypeId) -> Vec<TypeId> {
        self.fake(type_id)
            .map(|fake| fake.bases.clone())
            .unwrap_or_default()
    }

    fn is_literal_type(&self, type_id: TypeId) -> bool {
        self.fake(type_id).is_some_and(|fake| fake.literal)
    }

    fn call_signatures(&self, type_id: TypeId) -> Vec<Signature> {
        match self.fake(type_id) {
            Some(fake) if fake.callable => vec![Signature {
                params: Vec::new(),
                return_type: TypeId::VOID,
            }],
            _ => Vec::new(),
        }
    }

    fn construct_signatures(&self, type_id: TypeId) -> Vec<Signature> {
        match self.fake(type_id).and_then(|fake| fake.constructs) {
            Some(instance) => vec![Signature {
                params: Vec::new(),
                return_type: instance,
            }],
            None => Vec::new(),
        }
    }
}
