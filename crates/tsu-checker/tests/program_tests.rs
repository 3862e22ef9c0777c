//! Program synchronization against an in-memory host.

use std::sync::Arc;

use indexmap::IndexMap;
use tsu_checker::{CompilerOptions, Program, SourceHost};

#[derive(Default)]
struct MemoryHost {
    roots: Vec<String>,
    files: IndexMap<String, (u32, Arc<str>)>,
    snapshot_reads: usize,
}

impl MemoryHost {
    fn write(&mut self, path: &str, text: &str) {
        let version = self.files.get(path).map_or(0, |(v, _)| v + 1);
        self.files.insert(path.to_string(), (version, Arc::from(text)));
    }

    fn root(&mut self, path: &str, text: &str) {
        self.write(path, text);
        self.roots.push(path.to_string());
    }
}

impl SourceHost for MemoryHost {
    fn root_file_names(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn script_version(&mut self, path: &str) -> Option<String> {
        self.files.get(path).map(|(v, _)| v.to_string())
    }

    fn script_snapshot(&mut self, path: &str) -> Option<Arc<str>> {
        self.snapshot_reads += 1;
        self.files.get(path).map(|(_, text)| Arc::clone(text))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

#[test]
fn test_unchanged_versions_reuse_the_program() {
    let mut host = MemoryHost::default();
    host.root("/p/main.ts", "let x = 1;");
    let mut program = Program::new(CompilerOptions::default());

    assert!(program.synchronize(&mut host));
    let first = program.source_file("/p/main.ts").expect("parsed");
    assert!(!program.synchronize(&mut host));
    let second = program.source_file("/p/main.ts").expect("parsed");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(host.snapshot_reads, 1);
}

#[test]
fn test_version_bump_reparses_only_that_file() {
    let mut host = MemoryHost::default();
    host.root("/p/a.ts", "let a = 1;");
    host.root("/p/b.ts", "let b = 1;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);
    let b_before = program.source_file("/p/b.ts").expect("parsed");

    host.write("/p/a.ts", "let a = 'changed';");
    assert!(program.synchronize(&mut host));
    assert_eq!(host.snapshot_reads, 3);
    let b_after = program.source_file("/p/b.ts").expect("parsed");
    assert!(Arc::ptr_eq(&b_before, &b_after));
    let a = program.source_file("/p/a.ts").expect("parsed");
    assert!(a.text.contains("changed"));
}

#[test]
fn test_relative_imports_are_followed() {
    let mut host = MemoryHost::default();
    host.root("/p/src/main.ts", "import { helper } from './util/helper';\nhelper();");
    host.write("/p/src/util/helper.ts", "export function helper(): void {}");
    host.write("/p/src/unrelated.ts", "let u = 1;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);

    let names: Vec<&str> = program.file_names().collect();
    assert_eq!(names, vec!["/p/src/main.ts", "/p/src/util/helper.ts"]);
    assert!(program.diagnostics("/p/src/main.ts").is_empty());
}

#[test]
fn test_syntax_errors_hide_semantic_errors() {
    let mut host = MemoryHost::default();
    host.root("/p/main.ts", "let x: number = 'a';\nlet = ;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);

    let diagnostics = program.diagnostics("/p/main.ts");
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d.code < 2000), "{diagnostics:?}");
}

#[test]
fn test_semantic_errors_after_fix() {
    let mut host = MemoryHost::default();
    host.root("/p/main.ts", "let x: number = 1;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);
    assert!(program.diagnostics("/p/main.ts").is_empty());

    host.write("/p/main.ts", "let x: number = 'a';");
    program.synchronize(&mut host);
    let codes: Vec<u32> = program
        .diagnostics("/p/main.ts")
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![2322]);
}

#[test]
fn test_strict_option_reaches_the_checker() {
    let mut host = MemoryHost::default();
    host.root("/p/main.ts", "function f(a) {}");
    let options = CompilerOptions {
        strict: true,
        ..CompilerOptions::default()
    };
    let mut program = Program::new(options);
    program.synchronize(&mut host);
    let codes: Vec<u32> = program
        .diagnostics("/p/main.ts")
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![7006]);
}

#[test]
fn test_emit_uses_program_options() {
    let mut host = MemoryHost::default();
    host.root("/p/src/main.ts", "export function f(a: number) { return a; }");
    let options = CompilerOptions {
        source_map: true,
        out_dir: Some("/p/out".into()),
        ..CompilerOptions::default()
    };
    let mut program = Program::new(options);
    program.synchronize(&mut host);

    let output = program.emit("/p/src/main.ts").expect("in program");
    assert_eq!(output.artifacts.len(), 2);
    assert_eq!(output.artifacts[0].file_name, "/p/out/main.js");
    assert!(program.emit("/p/src/other.ts").is_none());
}

#[test]
fn test_missing_roots_are_skipped() {
    let mut host = MemoryHost::default();
    host.roots.push("/p/gone.ts".into());
    host.root("/p/main.ts", "let x = 1;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);
    let names: Vec<&str> = program.file_names().collect();
    assert_eq!(names, vec!["/p/main.ts"]);
}

#[test]
fn test_vanished_file_is_reparsed_when_it_returns() {
    let mut host = MemoryHost::default();
    host.root("/p/a.ts", "let first = 1;");
    let mut program = Program::new(CompilerOptions::default());
    program.synchronize(&mut host);

    host.files.shift_remove("/p/a.ts");
    program.synchronize(&mut host);
    assert_eq!(program.file_names().count(), 0);

    // Same version string as before, different content.
    host.write("/p/a.ts", "let second = 2;");
    program.synchronize(&mut host);
    let a = program.source_file("/p/a.ts").expect("parsed");
    assert!(a.text.contains("second"));
}
