//! Wire messages.

use serde::{Deserialize, Serialize};
use tsu_common::diagnostics::SERVICE_TAG;

use crate::analyzer::Response;

/// One request line: analyze `file`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub file: String,
}

impl Request {
    pub fn parse(line: &str) -> Result<Request, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Failure for a line that is not a valid request.
pub fn malformed_request(error: &serde_json::Error) -> Response {
    Response::failure(vec![format!("[{SERVICE_TAG}]: invalid request: {error}")])
}

/// Failure for a file whose modification time could not be read.
pub fn unreadable_file(error: &dyn std::error::Error) -> Response {
    Response::failure(vec![format!("[{SERVICE_TAG}]: {error}")])
}

pub fn serialize_response(response: &Response) -> serde_json::Result<String> {
    serde_json::to_string(response)
}
