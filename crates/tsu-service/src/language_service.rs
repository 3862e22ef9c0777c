//! [`Frontend`] backed by the built-in checker.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::debug;
use tsu_checker::{
    CompilerOptions, EmitOutput, Program, Signature, SourceHost, TypeId, TypeQueryError,
};
use tsu_common::Diagnostic;
use tsu_parser::{NodeIndex, SourceFile};

use crate::frontend::Frontend;

pub struct LanguageService {
    program: Program,
}

impl LanguageService {
    pub fn new(options: CompilerOptions) -> Self {
        LanguageService {
            program: Program::new(options),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

impl Frontend for LanguageService {
    fn synchronize(&mut self, host: &mut dyn SourceHost) -> Result<()> {
        let start = Instant::now();
        let rebuilt = self.program.synchronize(host);
        debug!(rebuilt, elapsed = ?start.elapsed(), "synchronized program");
        Ok(())
    }

    fn source_file(&self, path: &str) -> Option<Arc<SourceFile>> {
        self.program.source_file(path)
    }

    fn diagnostics(&mut self, path: &str) -> Vec<Diagnostic> {
        self.program.diagnostics(path)
    }

    fn emit(&mut self, path: &str) -> Option<EmitOutput> {
        self.program.emit(path)
    }

    fn resolve_signature(&mut self, path: &str, declaration: NodeIndex) -> Option<Signature> {
        self.program.signature_of(path, declaration)
    }

    fn resolve_type(&mut self, path: &str, node: NodeIndex) -> Result<TypeId, TypeQueryError> {
        self.program.type_at(path, node)
    }

    fn type_display_string(&self, type_id: TypeId) -> String {
        self.program
            .checker()
            .map_or_else(|| "any".to_string(), |checker| checker.type_to_string(type_id))
    }

    fn base_types_of(&self, type_id: TypeId) -> Vec<TypeId> {
        self.program
            .checker()
            .map(|checker| checker.base_types(type_id))
            .unwrap_or_default()
    }

    fn is_literal_type(&self, type_id: TypeId) -> bool {
        self.program
            .checker()
            .is_some_and(|checker| checker.is_literal_type(type_id))
    }

    fn call_signatures(&self, type_id: TypeId) -> Vec<Signature> {
        self.program
            .checker()
            .map(|checker| checker.call_signatures(type_id).to_vec())
            .unwrap_or_default()
    }

    fn construct_signatures(&self, type_id: TypeId) -> Vec<Signature> {
        self.program
            .checker()
            .map(|checker| checker.construct_signatures(type_id).to_vec())
            .unwrap_or_default()
    }
}
