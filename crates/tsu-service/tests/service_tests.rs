//! End-to-end tests of the service against on-disk projects.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use tsu_common::paths::normalize_path;
use tsu_service::{
    AnalysisSuccess, ParameterDescriptor, ProtocolServer, Response, ServiceSettings, TypeDescriptor,
    LanguageService, start_server,
};

const HOST_TYPES: &str = "\
declare class UObject {}
declare class AActor extends UObject {
    tick(delta: number): void;
}
declare class APawn extends AActor {}
declare class FVector {}
";

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new(tsconfig: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tsconfig.json"), tsconfig).expect("write tsconfig");
        Project { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, text: &str) -> String {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, text).expect("write");
        normalize_path(&path.to_string_lossy())
    }

    fn server(&self) -> ProtocolServer<LanguageService> {
        start_server(self.path(), &ServiceSettings::default()).expect("start server")
    }
}

fn ask(server: &mut ProtocolServer<LanguageService>, file: &str, now: Instant) -> Response {
    let line = serde_json::json!({ "file": file }).to_string();
    let response = server
        .handle_line(&line, now)
        .expect("handle request")
        .expect("response line");
    serde_json::from_str(&response).expect("response json")
}

fn success(response: Response) -> AnalysisSuccess {
    match response {
        Response::Success(success) => success,
        Response::Failure(failure) => panic!("expected success, got {:?}", failure.diagnostics),
    }
}

#[test]
fn test_exported_function_is_described() {
    let project = Project::new("{}");
    let path = project.write("a.ts", "export function f(x: number): number { return x; }\n");
    let mut server = project.server();

    let result = success(ask(&mut server, "a.ts", Instant::now()));
    assert_eq!(result.file_name, "a.ts");
    assert_eq!(result.name, "a");
    assert_eq!(result.path, path);
    assert!(result.diagnostics.is_empty());
    assert!(result.source.contains("export function f(x"));
    assert!(!result.source.contains(": number"));

    let export = &result.exports[0];
    assert_eq!(result.exports.len(), 1);
    assert_eq!(export.name, "f");
    assert_eq!(
        export.parameters,
        vec![ParameterDescriptor {
            name: "x".into(),
            types: vec![TypeDescriptor::new("Number", 0)],
            optional: false,
        }]
    );
    assert_eq!(export.return_types, vec![TypeDescriptor::new("Number", 0)]);
    assert_eq!((export.line, export.character), (1, 17));
}

#[test]
fn test_union_return_is_reported_not_exported() {
    let project = Project::new("{}");
    project.write(
        "b.ts",
        "class Foo { a: number = 1; }\n\
         class Bar { b: string = \"\"; }\n\
         export function g(flag: boolean): Foo | Bar { return flag ? new Foo() : new Bar(); }\n\
         export function h(items: string[], scale?: number): void {}\n",
    );
    let mut server = project.server();

    let result = success(ask(&mut server, "b.ts", Instant::now()));
    assert_eq!(
        result.diagnostics,
        vec!["[TSU] b.ts(3,17): Disallowed union return type for 'g' (Foo | Bar)"]
    );
    let names: Vec<&str> = result.exports.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["h"]);
    let params = &result.exports[0].parameters;
    assert_eq!(params[0].types, vec![TypeDescriptor::new("String", 1)]);
    assert!(params[1].optional);
    assert_eq!(result.exports[0].return_types, vec![TypeDescriptor::new("void", 0)]);
}

#[test]
fn test_defaulted_parameter_is_not_optional() {
    let project = Project::new("{}");
    project.write("d.ts", "export function f(x?: number, y: number = 2): void {}\n");
    let mut server = project.server();

    let result = success(ask(&mut server, "d.ts", Instant::now()));
    assert!(result.diagnostics.is_empty());
    assert_eq!(
        result.exports[0].parameters,
        vec![
            ParameterDescriptor {
                name: "x".into(),
                types: vec![TypeDescriptor::new("Number", 0)],
                optional: true,
            },
            ParameterDescriptor {
                name: "y".into(),
                types: vec![TypeDescriptor::new("Number", 0)],
                optional: false,
            },
        ]
    );
}

#[test]
fn test_host_types_are_dependencies() {
    let project = Project::new("{}");
    project.write("types/host.d.ts", HOST_TYPES);
    project.write(
        "spawner.ts",
        "export function spawn(origin: FVector): void {\n\
         \x20   const pawn = new APawn();\n\
         \x20   pawn.tick(1);\n\
         \x20   const actor: AActor = pawn;\n\
         }\n",
    );
    let mut server = project.server();

    let result = success(ask(&mut server, "spawner.ts", Instant::now()));
    assert_eq!(result.dependencies, vec!["APawn", "AActor"]);
}

#[test]
fn test_custom_root_type() {
    let project = Project::new("{}");
    project.write("types/host.d.ts", HOST_TYPES);
    project.write("uses.ts", "export function make(): void { new APawn(); }\n");
    let settings = ServiceSettings {
        root_type: "AActor".into(),
        ..ServiceSettings::default()
    };
    let mut server = start_server(project.path(), &settings).expect("start server");

    let result = success(ask(&mut server, "uses.ts", Instant::now()));
    assert_eq!(result.dependencies, vec!["APawn"]);
}

#[test]
fn test_syntax_error_is_failure() {
    let project = Project::new("{}");
    project.write("bad.ts", "export function broken( {\n");
    let mut server = project.server();

    let response = ask(&mut server, "bad.ts", Instant::now());
    assert!(!response.is_success());
    assert!(response.diagnostics()[0].starts_with("[TS]: bad.ts(1,"));
}

#[test]
fn test_type_error_is_failure() {
    let project = Project::new("{}");
    project.write("types.ts", "export const count: number = \"many\";\n");
    let mut server = project.server();

    let response = ask(&mut server, "types.ts", Instant::now());
    assert_eq!(response.diagnostics().len(), 1);
    assert!(response.diagnostics()[0].starts_with("[TS]: types.ts(1,14): error TS2322: "));
}

#[test]
fn test_strict_reports_implicit_any() {
    let project = Project::new(
        "{\n  // host scripts are strict\n  \"compilerOptions\": { \"strict\": \"true\", },\n}\n",
    );
    project.write("loose.ts", "export function f(a) { return a; }\n");
    let mut server = project.server();

    let response = ask(&mut server, "loose.ts", Instant::now());
    assert!(response.diagnostics()[0].contains("error TS7006: "));
}

#[test]
fn test_edit_is_seen_after_cache_window() {
    let project = Project::new("{}");
    let path = project.write("live.ts", "export function f(): number { return 1; }\n");
    let mut server = project.server();
    let start = Instant::now();

    let first = success(ask(&mut server, "live.ts", start));
    assert_eq!(first.exports[0].return_types, vec![TypeDescriptor::new("Number", 0)]);

    fs::write(&path, "export function f(): string { return \"1\"; }\n").expect("rewrite");
    File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(SystemTime::now() + Duration::from_secs(10)))
        .expect("set mtime");

    let cached = success(ask(&mut server, "live.ts", start + Duration::from_millis(500)));
    assert_eq!(cached, first);

    let fresh = success(ask(&mut server, "live.ts", start + Duration::from_millis(1500)));
    assert_eq!(fresh.exports[0].return_types, vec![TypeDescriptor::new("String", 0)]);
}

#[test]
fn test_recreated_file_is_analyzed_fresh() {
    let project = Project::new("{}");
    let path = project.write("a.ts", "export function first(): void {}\n");
    project.write("b.ts", "export function other(): void {}\n");
    let mut server = project.server();
    let start = Instant::now();

    let before = success(ask(&mut server, "a.ts", start));
    assert_eq!(before.exports[0].name, "first");

    fs::remove_file(&path).expect("remove");
    success(ask(&mut server, "b.ts", start + Duration::from_millis(10)));

    project.write("a.ts", "export function second(): void {}\n");
    let after = success(ask(&mut server, "a.ts", start + Duration::from_millis(1500)));
    assert_eq!(after.exports[0].name, "second");
    assert!(after.source.contains("second"));
    let version = server.analyzer().registry().version_of(&path).map(|v| v.version);
    assert!(version > Some(0));
}

#[test]
fn test_imported_module_is_followed() {
    let project = Project::new("{}");
    project.write("lib/math.ts", "export function twice(n: number): number { return n * 2; }\n");
    project.write(
        "main.ts",
        "import { twice } from \"./lib/math\";\nexport function run(): number { return twice(2); }\n",
    );
    let mut server = project.server();

    let result = success(ask(&mut server, "main.ts", Instant::now()));
    assert_eq!(result.exports[0].name, "run");
}

#[test]
fn test_source_map_breaks_single_artifact_emission() {
    let project = Project::new(r#"{ "compilerOptions": { "sourceMap": true } }"#);
    let path = project.write("a.ts", "export function f(): void {}\n");
    let mut server = project.server();

    let line = serde_json::json!({ "file": path }).to_string();
    let err = server.handle_line(&line, Instant::now()).expect_err("two artifacts");
    assert!(format!("{err:#}").contains("unexpected number of output files: 2"));
}

#[test]
fn test_missing_tsconfig_fails_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(start_server(dir.path(), &ServiceSettings::default()).is_err());
}

#[test]
fn test_broken_tsconfig_fails_startup() {
    let project = Project::new("{ \"compilerOptions\": ");
    assert!(start_server(project.path(), &ServiceSettings::default()).is_err());
}
