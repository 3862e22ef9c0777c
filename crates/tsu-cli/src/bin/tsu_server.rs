//! tsu-server: analyzes script files on request.
//!
//! Each stdin line is a JSON request `{"file": "<path>"}`; each stdout line is
//! the JSON response for one request, in request order. The process exits
//! when stdin closes.
//!
//! ```bash
//! echo '{"file":"scripts/door.ts"}' | tsu-server ./game
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tsu_cli::{ServerArgs, init_tracing};
use tsu_service::start_server;

fn main() -> Result<()> {
    init_tracing();

    let args = ServerArgs::parse();
    let mut server = start_server(&args.project_dir, &args.settings()).with_context(|| {
        format!("failed to initialize server for {}", args.project_dir.display())
    })?;
    info!(project = %args.project_dir.display(), root_type = %args.root_type, "tsu-server ready");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server.serve(stdin.lock(), stdout.lock())
}
