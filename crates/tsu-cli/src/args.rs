use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use tsu_service::{DEFAULT_ROOT_TYPE, ServiceSettings};

/// CLI arguments for the tsu-server binary.
#[derive(Parser, Debug)]
#[command(
    name = "tsu-server",
    version,
    about = "Script analysis service - one JSON request per stdin line, one JSON response per stdout line"
)]
pub struct ServerArgs {
    /// Project directory; `tsconfig.json` is looked up here and in its ancestors.
    pub project_dir: PathBuf,

    /// Host root type. Referenced types deriving from it are reported as dependencies.
    #[arg(long = "root-type", default_value = DEFAULT_ROOT_TYPE)]
    pub root_type: String,

    /// How long (in milliseconds) a response is reused for repeated requests.
    #[arg(long = "cache-ttl-ms", default_value_t = 1000)]
    pub cache_ttl_ms: u64,
}

impl ServerArgs {
    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            root_type: self.root_type.clone(),
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
        }
    }
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
