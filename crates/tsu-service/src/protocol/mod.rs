//! Line protocol: one JSON request per input line, one JSON response per
//! output line, in arrival order.
//!
//! Responses are cached by requested path for a short delay; a repeated
//! request inside that window is answered with the cached bytes without
//! analyzing the file again.

pub mod line_buffer;
pub mod messages;
pub mod response_cache;

pub use line_buffer::LineBuffer;
pub use messages::Request;
pub use response_cache::{DEFAULT_CACHE_TTL, ResponseCache};

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analyzer::Analyzer;
use crate::frontend::Frontend;
use crate::registry::RegistryError;

const READ_CHUNK_SIZE: usize = 64 * 1024;

pub struct ProtocolServer<F: Frontend> {
    analyzer: Analyzer<F>,
    cache: ResponseCache,
    lines: LineBuffer,
    requests_handled: u64,
}

impl<F: Frontend> ProtocolServer<F> {
    pub fn new(analyzer: Analyzer<F>, cache_ttl: Duration) -> Self {
        ProtocolServer {
            analyzer,
            cache: ResponseCache::new(cache_ttl),
            lines: LineBuffer::new(),
            requests_handled: 0,
        }
    }

    pub fn analyzer(&self) -> &Analyzer<F> {
        &self.analyzer
    }

    pub fn requests_handled(&self) -> u64 {
        self.requests_handled
    }

    /// Answer one request line. Blank lines get no response.
    ///
    /// Errors are fatal: the frontend broke an invariant or the response
    /// could not be serialized.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Result<Option<String>> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        self.requests_handled += 1;

        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "malformed request");
                let response = messages::malformed_request(&err);
                return messages::serialize_response(&response)
                    .map(Some)
                    .context("failed to serialize response");
            }
        };

        if let Some(cached) = self.cache.get(&request.file, now) {
            debug!(file = %request.file, "response cache hit");
            return Ok(Some(cached.to_string()));
        }
        debug!(file = %request.file, "response cache miss");

        let response = match self.analyzer.analyze(&request.file) {
            Ok(response) => response,
            Err(err) => match err.downcast_ref::<RegistryError>() {
                Some(registry_error) => {
                    warn!(file = %request.file, %registry_error, "cannot analyze file");
                    let response = messages::unreadable_file(registry_error);
                    return messages::serialize_response(&response)
                        .map(Some)
                        .context("failed to serialize response");
                }
                None => {
                    return Err(err.context(format!("failed to analyze {}", request.file)));
                }
            },
        };

        let serialized =
            messages::serialize_response(&response).context("failed to serialize response")?;
        self.cache.insert(request.file, serialized.clone(), now);
        Ok(Some(serialized))
    }

    /// Feed a chunk of input and write a response for every line it
    /// completes.
    pub fn feed(&mut self, chunk: &[u8], output: &mut dyn Write) -> Result<()> {
        for line in self.lines.push(chunk) {
            self.respond(&line, output)?;
        }
        Ok(())
    }

    /// Handle the unterminated tail left at end of input.
    pub fn finish(&mut self, output: &mut dyn Write) -> Result<()> {
        if let Some(line) = self.lines.finish() {
            self.respond(&line, output)?;
        }
        Ok(())
    }

    fn respond(&mut self, line: &str, output: &mut dyn Write) -> Result<()> {
        if let Some(response) = self.handle_line(line, Instant::now())? {
            writeln!(output, "{response}").context("failed to write response")?;
            output.flush().context("failed to flush output")?;
        }
        Ok(())
    }

    /// Serve requests from `input` until end of input.
    pub fn serve(&mut self, mut input: impl Read, mut output: impl Write) -> Result<()> {
        info!("serving requests");
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err).context("failed to read from input"),
            };
            self.feed(&chunk[..read], &mut output)?;
        }
        self.finish(&mut output)?;
        info!(requests = self.requests_handled, "input closed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/protocol_tests.rs"]
mod tests;
