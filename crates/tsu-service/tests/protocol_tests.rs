use super::*;
use crate::analyzer::Response;
use crate::registry::ScriptRegistry;
use crate::test_fixtures::FakeFrontend;
use std::fs;
use std::io::Cursor;
use tsu_common::paths::normalize_path;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn write(&self, name: &str, text: &str) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, text).expect("write");
        normalize_path(&path.to_string_lossy())
    }

    fn server_with(&self, frontend: FakeFrontend) -> ProtocolServer<FakeFrontend> {
        let analyzer = Analyzer::new(
            ScriptRegistry::new(Vec::new()),
            frontend,
            "UObject",
            self.dir.path(),
        );
        ProtocolServer::new(analyzer, Duration::from_millis(1000))
    }

    fn server(&self) -> ProtocolServer<FakeFrontend> {
        self.server_with(FakeFrontend::new())
    }
}

fn request(file: &str) -> String {
    serde_json::json!({ "file": file }).to_string()
}

fn parse_response(line: &str) -> Response {
    serde_json::from_str(line).expect("response json")
}

fn synchronize_calls(server: &ProtocolServer<FakeFrontend>) -> usize {
    server.analyzer().frontend().synchronize_calls
}

#[test]
fn test_blank_line_gets_no_response() {
    let fixture = Fixture::new();
    let mut server = fixture.server();
    assert_eq!(server.handle_line("", Instant::now()).expect("handle"), None);
    assert_eq!(server.handle_line("  \t", Instant::now()).expect("handle"), None);
    assert_eq!(server.requests_handled(), 0);
}

#[test]
fn test_malformed_request_is_failure_and_not_cached() {
    let fixture = Fixture::new();
    let mut server = fixture.server();

    let line = server
        .handle_line("{\"path\": 1}", Instant::now())
        .expect("handle")
        .expect("response");
    let response = parse_response(&line);
    assert!(!response.is_success());
    assert!(response.diagnostics()[0].starts_with("[TSU]: invalid request: "));
    assert!(server.cache.is_empty());
    assert_eq!(synchronize_calls(&server), 0);
}

#[test]
fn test_missing_file_is_failure_and_not_cached() {
    let fixture = Fixture::new();
    let mut server = fixture.server();

    let line = server
        .handle_line(&request("gone.ts"), Instant::now())
        .expect("handle")
        .expect("response");
    let response = parse_response(&line);
    let expected_path = normalize_path(&fixture.dir.path().join("gone.ts").to_string_lossy());
    assert_eq!(
        response.diagnostics(),
        [format!("[TSU]: failed to get last modified time for: '{expected_path}'")]
    );
    assert!(server.cache.is_empty());
}

#[test]
fn test_repeat_within_delay_is_served_from_cache() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export function f(): void {}\n");
    let mut server = fixture.server();
    let start = Instant::now();

    let first = server.handle_line(&request(&path), start).expect("first");
    let second = server
        .handle_line(&request(&path), start + Duration::from_millis(999))
        .expect("second");
    assert_eq!(first, second);
    assert_eq!(synchronize_calls(&server), 1);
    assert_eq!(server.requests_handled(), 2);
}

#[test]
fn test_repeat_after_delay_is_analyzed_again() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut server = fixture.server();
    let start = Instant::now();

    server.handle_line(&request(&path), start).expect("first");
    server
        .handle_line(&request(&path), start + Duration::from_millis(1000))
        .expect("second");
    assert_eq!(synchronize_calls(&server), 2);
}

#[test]
fn test_cache_is_keyed_by_requested_text() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut server = fixture.server();
    let now = Instant::now();

    server.handle_line(&request(&path), now).expect("absolute");
    server.handle_line(&request("a.ts"), now).expect("relative");
    assert_eq!(synchronize_calls(&server), 2);
    assert_eq!(server.cache.len(), 2);
}

#[test]
fn test_frontend_invariant_failure_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut frontend = FakeFrontend::new();
    frontend.artifact_count = 0;
    let mut server = fixture.server_with(frontend);

    let err = server
        .handle_line(&request(&path), Instant::now())
        .expect_err("fatal");
    assert!(err.to_string().starts_with("failed to analyze "));
    assert!(server.cache.is_empty());
}

#[test]
fn test_feed_handles_split_lines_in_order() {
    let fixture = Fixture::new();
    let a = fixture.write("a.ts", "export {};\n");
    let b = fixture.write("b.ts", "export {};\n");
    let mut server = fixture.server();

    let input = format!("{}\n\n{}\n", request(&a), request(&b));
    let (head, tail) = input.as_bytes().split_at(7);
    let mut output = Vec::new();
    server.feed(head, &mut output).expect("feed head");
    assert!(output.is_empty());
    server.feed(tail, &mut output).expect("feed tail");

    let text = String::from_utf8(output).expect("utf8");
    let names: Vec<String> = text
        .lines()
        .map(|line| match parse_response(line) {
            Response::Success(success) => success.file_name,
            Response::Failure(failure) => panic!("unexpected failure: {:?}", failure.diagnostics),
        })
        .collect();
    assert_eq!(names, vec!["a.ts", "b.ts"]);
}

#[test]
fn test_finish_answers_unterminated_request() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut server = fixture.server();

    let mut output = Vec::new();
    server.feed(request(&path).as_bytes(), &mut output).expect("feed");
    assert!(output.is_empty());
    server.finish(&mut output).expect("finish");
    assert_eq!(String::from_utf8(output).expect("utf8").lines().count(), 1);
}

#[test]
fn test_serve_until_end_of_input() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut server = fixture.server();

    let input = format!("{}\r\nnot json\n{}", request(&path), request("missing.ts"));
    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve");

    let responses: Vec<Response> = String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(parse_response)
        .collect();
    assert_eq!(responses.len(), 3);
    assert!(responses[0].is_success());
    assert!(!responses[1].is_success());
    assert!(!responses[2].is_success());
    assert_eq!(server.requests_handled(), 3);
}
