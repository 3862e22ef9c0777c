//! Incremental program: parse cache, binding, checking and emission over a
//! host-provided file set.
//!
//! The host hands out a version string per file. A file is re-parsed only
//! when its version changes; the checker is rebuilt only when the file set or
//! at least one file changed since the last [`Program::synchronize`].

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};
use tsu_common::diagnostics::Diagnostic;
use tsu_common::paths::normalize_path;
use tsu_parser::{NodeData, NodeIndex, SourceFile, SyntaxKind};

use crate::emitter::{EmitOptions, EmitOutput, emit_file};
use crate::module_resolution::resolve_module;
use crate::state::{CheckerOptions, CheckerState, TypeQueryError};
use crate::types::{Signature, TypeId};

/// Compiler options honored by the program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub strict: bool,
    pub no_implicit_any: bool,
    pub no_emit: bool,
    pub source_map: bool,
    pub out_dir: Option<String>,
    pub type_roots: Vec<String>,
}

impl CompilerOptions {
    pub fn checker_options(&self) -> CheckerOptions {
        CheckerOptions {
            strict: self.strict,
            no_implicit_any: self.strict || self.no_implicit_any,
        }
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            no_emit: self.no_emit,
            source_map: self.source_map,
            out_dir: self.out_dir.clone(),
        }
    }
}

/// Where the program gets its files from.
pub trait SourceHost {
    /// Files the program starts from; imports are followed from these.
    fn root_file_names(&self) -> Vec<String>;
    /// Current version of a file, `None` when it does not exist.
    fn script_version(&mut self, path: &str) -> Option<String>;
    /// Current content of a file.
    fn script_snapshot(&mut self, path: &str) -> Option<Arc<str>>;
    fn file_exists(&self, path: &str) -> bool;
}

struct ParsedFile {
    version: String,
    source: Arc<SourceFile>,
}

pub struct Program {
    options: CompilerOptions,
    parsed: FxHashMap<String, ParsedFile>,
    /// `(path, version)` of every file in the current checker, in file id
    /// order.
    files: Vec<(String, String)>,
    checker: Option<CheckerState>,
}

impl Program {
    pub fn new(options: CompilerOptions) -> Self {
        Program {
            options,
            parsed: FxHashMap::default(),
            files: Vec::new(),
            checker: None,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Bring the program up to date with `host`. Returns whether the checker
    /// was rebuilt.
    pub fn synchronize(&mut self, host: &mut dyn SourceHost) -> bool {
        let mut queue: VecDeque<String> = host
            .root_file_names()
            .iter()
            .map(|name| normalize_path(name))
            .collect();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut files: Vec<(String, String)> = Vec::new();
        let mut sources: Vec<Arc<SourceFile>> = Vec::new();

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(version) = host.script_version(&path) else {
                trace!(%path, "skipping missing file");
                continue;
            };
            let Some(source) = self.parsed_file(host, &path, &version) else {
                continue;
            };

            for specifier in import_specifiers(&source) {
                if let Some(resolved) = resolve_module(&path, &specifier, |p| host.file_exists(p)) {
                    if !seen.contains(&resolved) {
                        queue.push_back(resolved);
                    }
                }
            }
            files.push((path, version));
            sources.push(source);
        }

        let live: FxHashSet<&str> = files.iter().map(|(path, _)| path.as_str()).collect();
        self.parsed.retain(|path, _| live.contains(path.as_str()));

        if self.checker.is_some() && files == self.files {
            trace!(files = files.len(), "program unchanged");
            return false;
        }
        debug!(files = files.len(), "rebuilding program");
        self.checker = Some(CheckerState::new(sources, self.options.checker_options()));
        self.files = files;
        true
    }

    fn parsed_file(
        &mut self,
        host: &mut dyn SourceHost,
        path: &str,
        version: &str,
    ) -> Option<Arc<SourceFile>> {
        if let Some(cached) = self.parsed.get(path)
            && cached.version == version
        {
            return Some(Arc::clone(&cached.source));
        }
        let text = host.script_snapshot(path)?;
        let source = Arc::new(SourceFile::parse(path, text));
        trace!(%path, %version, "parsed file");
        self.parsed.insert(
            path.to_string(),
            ParsedFile {
                version: version.to_string(),
                source: Arc::clone(&source),
            },
        );
        Some(source)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(path, _)| path.as_str())
    }

    pub fn source_file(&self, path: &str) -> Option<Arc<SourceFile>> {
        let checker = self.checker.as_ref()?;
        let id = checker.file_id(&normalize_path(path))?;
        checker.source_file(id).cloned()
    }

    /// Diagnostics of one file: syntax errors when there are any, otherwise
    /// binder and checker errors.
    pub fn diagnostics(&mut self, path: &str) -> Vec<Diagnostic> {
        let Some(source) = self.source_file(path) else {
            return Vec::new();
        };
        let syntactic = source.syntactic_diagnostics();
        if !syntactic.is_empty() {
            return syntactic;
        }
        let Some(checker) = self.checker.as_mut() else {
            return Vec::new();
        };
        match checker.file_id(&source.file_name) {
            Some(id) => checker.semantic_diagnostics(id),
            None => Vec::new(),
        }
    }

    /// Emit one file, `None` when it is not part of the program.
    pub fn emit(&self, path: &str) -> Option<EmitOutput> {
        let source = self.source_file(path)?;
        Some(emit_file(&source, &self.options.emit_options()))
    }

    pub fn type_at(&mut self, path: &str, node: NodeIndex) -> Result<TypeId, TypeQueryError> {
        let path = normalize_path(path);
        let checker = self
            .checker
            .as_mut()
            .ok_or_else(|| TypeQueryError::UnknownFile(path.clone()))?;
        let id = checker
            .file_id(&path)
            .ok_or_else(|| TypeQueryError::UnknownFile(path.clone()))?;
        checker.type_at(id, node)
    }

    pub fn signature_of(&mut self, path: &str, declaration: NodeIndex) -> Option<Signature> {
        let checker = self.checker.as_mut()?;
        let id = checker.file_id(&normalize_path(path))?;
        checker.function_signature(id, declaration)
    }

    pub fn checker(&self) -> Option<&CheckerState> {
        self.checker.as_ref()
    }
}

/// Module specifiers of a file's top-level imports.
fn import_specifiers(file: &SourceFile) -> Vec<String> {
    file.statements()
        .iter()
        .filter(|&&statement| file.arena.kind(statement) == SyntaxKind::ImportDeclaration)
        .filter_map(|&statement| match file.arena.get(statement).map(|n| &n.data) {
            Some(NodeData::Import(import)) => file
                .arena
                .literal_text(import.module_specifier)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}
