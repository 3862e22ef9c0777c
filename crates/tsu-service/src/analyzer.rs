//! One file's analysis: version bump, diagnostics, emission, exports and
//! dependencies.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, info};
use tsu_common::paths::{base_name, file_stem, normalize_path};
use tsu_common::{Diagnostic, format_diagnostic};
use tsu_parser::SourceFile;

use crate::dependencies::collect_dependencies;
use crate::frontend::Frontend;
use crate::registry::ScriptRegistry;
use crate::signature::{FunctionDescriptor, extract_exports};

/// Result of analyzing a file that has no diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSuccess {
    pub file_name: String,
    /// File name without extension.
    pub name: String,
    pub path: String,
    /// Emitted JavaScript.
    pub source: String,
    /// Rejected exports; empty for a fully bindable file.
    pub diagnostics: Vec<String>,
    pub exports: Vec<FunctionDescriptor>,
    pub dependencies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub diagnostics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success(AnalysisSuccess),
    Failure(AnalysisFailure),
}

impl Response {
    pub fn failure(diagnostics: Vec<String>) -> Self {
        Response::Failure(AnalysisFailure { diagnostics })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn diagnostics(&self) -> &[String] {
        match self {
            Response::Success(success) => &success.diagnostics,
            Response::Failure(failure) => &failure.diagnostics,
        }
    }
}

pub struct Analyzer<F: Frontend> {
    registry: ScriptRegistry,
    frontend: F,
    root_type: String,
    project_dir: String,
}

impl<F: Frontend> Analyzer<F> {
    pub fn new(
        registry: ScriptRegistry,
        frontend: F,
        root_type: impl Into<String>,
        project_dir: &Path,
    ) -> Self {
        Analyzer {
            registry,
            frontend,
            root_type: root_type.into(),
            project_dir: normalize_path(&project_dir.to_string_lossy()),
        }
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    /// Absolute, normalized form of a requested path. Relative paths are
    /// taken from the project directory.
    pub fn resolve_path(&self, file: &str) -> String {
        let normalized = file.replace('\\', "/");
        if normalized.starts_with('/') || Path::new(file).is_absolute() {
            normalize_path(&normalized)
        } else {
            normalize_path(&format!("{}/{}", self.project_dir, normalized))
        }
    }

    /// Analyze one file.
    ///
    /// Errors are either a [`RegistryError`](crate::registry::RegistryError)
    /// (the file's modification time is unavailable) or a broken frontend
    /// invariant. Diagnostics in the file are not errors; they produce a
    /// [`Response::Failure`].
    pub fn analyze(&mut self, file: &str) -> Result<Response> {
        let path = self.resolve_path(file);
        let _span = debug_span!("analyze", %path).entered();
        let start = Instant::now();

        let modified_time = ScriptRegistry::modified_time(&path)?;
        let version = self.registry.ensure_tracked(&path, modified_time);
        debug!(version, "registered script");

        self.frontend
            .synchronize(&mut self.registry)
            .context("failed to synchronize program")?;
        let source = self
            .frontend
            .source_file(&path)
            .ok_or_else(|| anyhow!("failed to get source file: {path}"))?;

        let diagnostics = self.frontend.diagnostics(&path);
        if !diagnostics.is_empty() {
            let formatted = self.format_diagnostics(&source, &diagnostics);
            info!(count = formatted.len(), elapsed = ?start.elapsed(), "file has diagnostics");
            return Ok(Response::failure(formatted));
        }

        let output = self
            .frontend
            .emit(&path)
            .ok_or_else(|| anyhow!("failed to emit: {path}"))?;
        if output.emit_skipped {
            bail!("emit skipped: {path}");
        }
        let artifact_count = output.artifacts.len();
        let Some(artifact) = output.artifacts.into_iter().next().filter(|_| artifact_count == 1)
        else {
            bail!("unexpected number of output files: {artifact_count}");
        };

        self.registry.mark_analyzed(&path, modified_time);

        let mut rejections = Vec::new();
        let exports = extract_exports(&mut self.frontend, &source, &mut rejections);
        let dependencies = collect_dependencies(&mut self.frontend, &source, &self.root_type);

        info!(
            exports = exports.len(),
            dependencies = dependencies.len(),
            rejected = rejections.len(),
            elapsed = ?start.elapsed(),
            "analyzed script"
        );
        Ok(Response::Success(AnalysisSuccess {
            file_name: base_name(&path).to_string(),
            name: file_stem(&path).to_string(),
            path,
            source: artifact.text,
            diagnostics: rejections,
            exports,
            dependencies,
        }))
    }

    fn format_diagnostics(&self, source: &SourceFile, diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics
            .iter()
            .map(|diagnostic| match diagnostic.file.as_deref() {
                Some(file) if file == source.file_name => {
                    format_diagnostic(diagnostic, Some(&source.text))
                }
                Some(file) => {
                    let other = self.frontend.source_file(file);
                    format_diagnostic(diagnostic, other.as_ref().map(|f| &*f.text))
                }
                None => format_diagnostic(diagnostic, None),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod tests;
