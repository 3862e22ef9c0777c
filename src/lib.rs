//! tsu: generates host-bindable descriptors from TypeScript scripts.
//!
//! The service answers one request per line: given a script path it type
//! checks the file against the project, emits its JavaScript, describes its
//! exported functions and lists the host object types it references.
//!
//! This crate re-exports the workspace crates under one roof:
//! - `common`: diagnostics, positions, paths, limits
//! - `parser`: the script parser
//! - `checker`: binder, checker, emitter, incremental `Program`
//! - `service`: registry, analyzer, line protocol

pub use tsu_checker as checker;
pub use tsu_common as common;
pub use tsu_parser as parser;
pub use tsu_service as service;

pub use tsu_service::{
    AnalysisFailure, AnalysisSuccess, FunctionDescriptor, ParameterDescriptor, ProtocolServer,
    Response, ServiceSettings, TypeDescriptor, parse_type, start_server,
};
