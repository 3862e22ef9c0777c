//! Incremental script analysis service.
//!
//! This crate provides:
//! - Project configuration loading (`config`)
//! - The script registry: versions and snapshots (`ScriptRegistry`)
//! - The `Frontend` capability and its checker-backed `LanguageService`
//! - The `Analyzer` with its signature extractor, type descriptor parser and
//!   dependency collector
//! - The line protocol with its response cache (`ProtocolServer`)

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

// Configuration
pub mod config;
pub use config::{ProjectConfig, load_project};

// Versions and snapshots
pub mod registry;
pub use registry::{RegistryError, ScriptRegistry, ScriptVersion};

// Type-checking capability
pub mod frontend;
pub use frontend::Frontend;

pub mod language_service;
pub use language_service::LanguageService;

// Analysis
pub mod analyzer;
pub use analyzer::{AnalysisFailure, AnalysisSuccess, Analyzer, Response};

pub mod dependencies;
pub use dependencies::{DEFAULT_ROOT_TYPE, collect_dependencies};

pub mod signature;
pub use signature::{FunctionDescriptor, ParameterDescriptor, extract_exports};

pub mod type_descriptor;
pub use type_descriptor::{TypeDescriptor, parse_type};

// Wire protocol
pub mod protocol;
pub use protocol::{DEFAULT_CACHE_TTL, ProtocolServer};

#[cfg(test)]
pub(crate) mod test_fixtures;

/// Settings of a running service that do not come from `tsconfig.json`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Host root type; types deriving from it are dependencies.
    pub root_type: String,
    /// How long a serialized response is reused for repeated requests.
    pub cache_ttl: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Load the project configuration for `project_dir` and build a server
/// backed by the built-in checker.
pub fn start_server(
    project_dir: &Path,
    settings: &ServiceSettings,
) -> Result<ProtocolServer<LanguageService>> {
    let project = load_project(project_dir)?;
    let registry = ScriptRegistry::new(project.declaration_files);
    let frontend = LanguageService::new(project.compiler_options);
    let analyzer = Analyzer::new(
        registry,
        frontend,
        settings.root_type.clone(),
        &project.project_dir,
    );
    Ok(ProtocolServer::new(analyzer, settings.cache_ttl))
}
