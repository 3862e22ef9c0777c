//! Command-line surface of the tsu service.

pub mod args;
pub mod tracing_config;

pub use args::ServerArgs;
pub use tracing_config::init_tracing;
