use super::*;
use crate::registry::RegistryError;
use crate::signature::ParameterDescriptor;
use crate::test_fixtures::{FakeFrontend, FakeType};
use crate::type_descriptor::TypeDescriptor;
use std::fs;

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

    fn analyzer(&self, frontend: FakeFrontend) -> Analyzer<FakeFrontend> {
        Analyzer::new(ScriptRegistry::new(Vec::new()), frontend, "UObject", self.dir.path())
    }
}

fn success(response: Response) -> AnalysisSuccess {
    match response {
        Response::Success(success) => success,
        Response::Failure(failure) => panic!("expected success, got {:?}", failure.diagnostics),
    }
}

fn descriptor(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(name, 0)
}

#[test]
fn test_success_describes_file_and_exports() {
    let fixture = Fixture::new();
    let text = "export function add(a: number, b?: string): number { return a; }\n";
    let path = fixture.write("main.ts", text);

    let mut frontend = FakeFrontend::new();
    let number = frontend.add_type("number");
    let string = frontend.add_type("string");
    let frontend = frontend
        .with_node_type("number", number)
        .with_node_type("string", string)
        .with_return_type("add", number);
    let mut analyzer = fixture.analyzer(frontend);

    let result = success(analyzer.analyze(&path).expect("analyze"));
    assert_eq!(result.file_name, "main.ts");
    assert_eq!(result.name, "main");
    assert_eq!(result.path, path);
    assert_eq!(result.source, text);
    assert!(result.diagnostics.is_empty());
    assert!(result.dependencies.is_empty());
    assert_eq!(
        result.exports,
        vec![FunctionDescriptor {
            name: "add".into(),
            parameters: vec![
                ParameterDescriptor {
                    name: "a".into(),
                    types: vec![descriptor("number")],
                    optional: false,
                },
                ParameterDescriptor {
                    name: "b".into(),
                    types: vec![descriptor("string")],
                    optional: true,
                },
            ],
            return_types: vec![descriptor("number")],
            line: 1,
            character: 17,
        }]
    );
}

#[test]
fn test_union_return_is_rejected_but_file_succeeds() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "pick.ts",
        "export function keep(): void {}\nexport function pick(flag: boolean) { return flag ? 1 : \"a\"; }\n",
    );

    let mut frontend = FakeFrontend::new();
    let void = frontend.add_type("void");
    let union = frontend.add_type("1 | \"a\"");
    let frontend = frontend
        .with_return_type("keep", void)
        .with_return_type("pick", union);
    let mut analyzer = fixture.analyzer(frontend);

    let result = success(analyzer.analyze(&path).expect("analyze"));
    assert_eq!(
        result.exports.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["keep"]
    );
    assert_eq!(
        result.diagnostics,
        vec!["[TSU] pick.ts(2,17): Disallowed union return type for 'pick' (1 | \"a\")"]
    );
}

#[test]
fn test_frontend_diagnostics_produce_failure() {
    let fixture = Fixture::new();
    let path = fixture.write("bad.ts", "let a = 1;\nlet b = missing;\n");

    let mut frontend = FakeFrontend::new();
    frontend.diagnostics = vec![Diagnostic::error(
        path.clone(),
        19,
        7,
        "Cannot find name 'missing'.",
        2304,
    )];
    let mut analyzer = fixture.analyzer(frontend);

    let response = analyzer.analyze(&path).expect("analyze");
    assert!(!response.is_success());
    assert_eq!(
        response.diagnostics(),
        ["[TS]: bad.ts(2,9): error TS2304: Cannot find name 'missing'."]
    );
}

#[test]
fn test_unattached_diagnostic_has_no_position() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");

    let mut frontend = FakeFrontend::new();
    frontend.diagnostics = vec![Diagnostic {
        file: None,
        ..Diagnostic::error("", 0, 0, "Option 'outDir' is invalid.", 5023)
    }];
    let mut analyzer = fixture.analyzer(frontend);

    let response = analyzer.analyze(&path).expect("analyze");
    assert_eq!(response.diagnostics(), ["[TS]: Option 'outDir' is invalid."]);
}

#[test]
fn test_missing_file_is_registry_error() {
    let fixture = Fixture::new();
    let mut analyzer = fixture.analyzer(FakeFrontend::new());

    let err = analyzer.analyze("missing.ts").expect_err("missing file");
    let registry_error = err.downcast_ref::<RegistryError>().expect("registry error");
    assert!(registry_error.path.ends_with("/missing.ts"));
    assert_eq!(analyzer.frontend().synchronize_calls, 0);
    assert!(!analyzer.registry().is_tracked(&registry_error.path));
}

#[test]
fn test_unexpected_artifact_count_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");

    let mut frontend = FakeFrontend::new();
    frontend.artifact_count = 2;
    let mut analyzer = fixture.analyzer(frontend);

    let err = analyzer.analyze(&path).expect_err("two artifacts");
    assert_eq!(err.to_string(), "unexpected number of output files: 2");
}

#[test]
fn test_skipped_emit_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");

    let mut frontend = FakeFrontend::new();
    frontend.emit_skipped = true;
    let mut analyzer = fixture.analyzer(frontend);

    let err = analyzer.analyze(&path).expect_err("emit skipped");
    assert!(err.to_string().starts_with("emit skipped: "));
}

#[test]
fn test_relative_request_resolves_against_project_dir() {
    let fixture = Fixture::new();
    let path = fixture.write("rel.ts", "export {};\n");
    let mut analyzer = fixture.analyzer(FakeFrontend::new());

    let result = success(analyzer.analyze("./rel.ts").expect("analyze"));
    assert_eq!(result.path, path);
    assert!(analyzer.registry().is_tracked(&path));
}

#[test]
fn test_each_request_bumps_version_and_resynchronizes() {
    let fixture = Fixture::new();
    let path = fixture.write("a.ts", "export {};\n");
    let mut analyzer = fixture.analyzer(FakeFrontend::new());

    analyzer.analyze(&path).expect("first");
    analyzer.analyze(&path).expect("second");
    assert_eq!(analyzer.frontend().synchronize_calls, 2);
    assert_eq!(analyzer.registry().version_of(&path).map(|v| v.version), Some(1));
}

#[test]
fn test_dependencies_are_reported() {
    let fixture = Fixture::new();
    let path = fixture.write("deps.ts", "const actor = new Actor();\n");

    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let actor = frontend.add(FakeType {
        display: "Actor".into(),
        bases: vec![root],
        ..FakeType::default()
    });
    let actor_class = frontend.add(FakeType {
        display: "typeof Actor".into(),
        constructs: Some(actor),
        ..FakeType::default()
    });
    let frontend = frontend
        .with_node_type("Actor", actor_class)
        .with_node_type("new Actor()", actor);
    let mut analyzer = fixture.analyzer(frontend);

    let result = success(analyzer.analyze(&path).expect("analyze"));
    assert_eq!(result.dependencies, vec!["Actor"]);
}

#[test]
fn test_response_serializes_camel_case() {
    let response = Response::Success(AnalysisSuccess {
        file_name: "a.ts".into(),
        name: "a".into(),
        path: "/p/a.ts".into(),
        source: "".into(),
        diagnostics: Vec::new(),
        exports: vec![FunctionDescriptor {
            name: "f".into(),
            parameters: Vec::new(),
            return_types: vec![TypeDescriptor::new("number", 1)],
            line: 1,
            character: 17,
        }],
        dependencies: Vec::new(),
    });
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json["fileName"], "a.ts");
    assert_eq!(json["exports"][0]["returnTypes"][0]["dimensions"], 1);

    let failure = serde_json::to_string(&Response::failure(vec!["x".into()])).expect("serialize");
    assert_eq!(failure, r#"{"diagnostics":["x"]}"#);
}

