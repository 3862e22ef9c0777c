//! Checker diagnostics over small programs.

use std::sync::Arc;

use tsu_checker::{CheckerOptions, CheckerState};
use tsu_common::Diagnostic;
use tsu_parser::SourceFile;

fn diagnostics_with(files: &[(&str, &str)], options: CheckerOptions) -> Vec<Diagnostic> {
    let sources = files
        .iter()
        .map(|(name, text)| Arc::new(SourceFile::parse(*name, *text)))
        .collect();
    let mut checker = CheckerState::new(sources, options);
    let id = checker.file_id(files[0].0).expect("first file is in the program");
    checker.semantic_diagnostics(id)
}

fn codes(text: &str) -> Vec<u32> {
    diagnostics_with(&[("/p/main.ts", text)], CheckerOptions::default())
        .iter()
        .map(|d| d.code)
        .collect()
}

fn strict_codes(text: &str) -> Vec<u32> {
    let options = CheckerOptions {
        strict: true,
        no_implicit_any: true,
    };
    diagnostics_with(&[("/p/main.ts", text)], options)
        .iter()
        .map(|d| d.code)
        .collect()
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let text = r#"
interface Vector { x: number; y: number; }
class Actor {
    position: Vector = { x: 0, y: 0 };
    constructor(public name: string) {}
    move(dx: number): void { this.position.x += dx; }
}
class Pawn extends Actor {
    speed = 2;
    run(): number { this.move(this.speed); return this.speed; }
}
export function spawn(name: string, count?: number): Pawn[] {
    const pawns: Pawn[] = [];
    for (let i = 0; i < (count ?? 1); i++) {
        pawns.push(new Pawn(name));
    }
    for (const pawn of pawns) {
        if (pawn.run() > 3) { break; }
    }
    return pawns;
}
"#;
    assert_eq!(codes(text), Vec::<u32>::new());
}

#[test]
fn test_cannot_find_name() {
    assert_eq!(codes("let x = y + 1;"), vec![2304]);
    assert_eq!(codes("let v: Missing;"), vec![2304]);
}

#[test]
fn test_type_not_assignable() {
    assert_eq!(codes("let x: number = 'a';"), vec![2322]);
    assert_eq!(codes("function f(): string { return 1; }"), vec![2322]);
    assert_eq!(codes("let n = 1; n = 'x';"), vec![2322]);
}

#[test]
fn test_missing_property_elaboration() {
    let diagnostics = diagnostics_with(
        &[(
            "/p/main.ts",
            "interface P { x: number; y: number; }\nconst p: P = { x: 1 };",
        )],
        CheckerOptions::default(),
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 2322);
    let detail = &diagnostics[0].message.next[0].message_text;
    assert!(detail.contains("Property 'y' is missing"), "{detail}");
}

#[test]
fn test_argument_checks() {
    assert_eq!(codes("function f(a: number) {}\nf('x');"), vec![2345]);
    assert_eq!(codes("function f(a: number) {}\nf();"), vec![2554]);
    assert_eq!(codes("function f(a: number, b?: number) {}\nf(1, 2, 3);"), vec![2554]);
}

#[test]
fn test_expected_arguments_message_shows_range() {
    let diagnostics = diagnostics_with(
        &[("/p/main.ts", "function f(a: number, b?: number) {}\nf();")],
        CheckerOptions::default(),
    );
    assert_eq!(diagnostics[0].message_text(), "Expected 1-2 arguments, but got 0.");
}

#[test]
fn test_property_does_not_exist() {
    let diagnostics = diagnostics_with(
        &[("/p/main.ts", "class A { x = 1; }\nconst a = new A();\na.y;")],
        CheckerOptions::default(),
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 2339);
    assert_eq!(
        diagnostics[0].message_text(),
        "Property 'y' does not exist on type 'A'."
    );
}

#[test]
fn test_not_callable_and_not_constructable() {
    assert_eq!(codes("const n = 1;\nn();"), vec![2349]);
    assert_eq!(codes("function f() {}\nnew f();"), vec![2351]);
}

#[test]
fn test_must_return_a_value() {
    assert_eq!(codes("function f(): number { }"), vec![2355]);
    assert_eq!(codes("function f(): void { }"), Vec::<u32>::new());
    assert_eq!(codes("function f(): any { }"), Vec::<u32>::new());
}

#[test]
fn test_duplicate_identifier() {
    assert_eq!(codes("let a = 1;\nlet a = 2;"), vec![2300, 2300]);
    assert_eq!(codes("interface I { a: number; }\ninterface I { b: number; }"), Vec::<u32>::new());
}

#[test]
fn test_const_assignment() {
    assert_eq!(codes("const a = 1;\na = 2;"), vec![2588]);
    assert_eq!(codes("const b = 'x';\nb = 2;"), vec![2588]);
    assert_eq!(codes("const c: number = 1;\nc = 'y';"), vec![2588]);
}

#[test]
fn test_type_and_value_confusion() {
    assert_eq!(codes("interface I {}\nconst x = I;"), vec![2693]);
    assert_eq!(codes("const v = 1;\nlet x: v;"), vec![2749]);
}

#[test]
fn test_control_flow_statement_placement() {
    assert_eq!(codes("break;"), vec![1105]);
    assert_eq!(codes("while (true) { continue; }"), Vec::<u32>::new());
    assert_eq!(codes("return 1;"), vec![1108]);
}

#[test]
fn test_overloads_need_an_implementation() {
    assert_eq!(codes("function f(a: number): void;"), vec![2391]);
    assert_eq!(
        codes("function f(a: number): void;\nfunction f(a: any) {}\nf(1);"),
        Vec::<u32>::new()
    );
    assert_eq!(codes("declare function g(): void;\ng();"), Vec::<u32>::new());
    assert_eq!(codes("declare function g(): void {}"), vec![1183]);
}

#[test]
fn test_null_assignability_depends_on_strict() {
    assert_eq!(codes("let x: number = null;"), Vec::<u32>::new());
    assert_eq!(strict_codes("let x: number = null;"), vec![2322]);
}

#[test]
fn test_implicit_any_parameters() {
    assert_eq!(codes("function f(a) {}"), Vec::<u32>::new());
    assert_eq!(strict_codes("function f(a) {}"), vec![7006]);
    assert_eq!(
        strict_codes("function run(cb: (n: number) => void) {}\nrun(n => {});"),
        Vec::<u32>::new()
    );
}

#[test]
fn test_imports_between_files() {
    let files = [
        (
            "/p/main.ts",
            "import { Actor, make as build } from './lib';\nconst a: Actor = build();",
        ),
        (
            "/p/lib.ts",
            "export class Actor {}\nexport function make(): Actor { return new Actor(); }",
        ),
    ];
    let diagnostics = diagnostics_with(&files, CheckerOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_import_errors() {
    let files = [
        ("/p/main.ts", "import { missing } from './lib';\nimport { x } from './nowhere';"),
        ("/p/lib.ts", "export const present = 1;"),
    ];
    let codes: Vec<u32> = diagnostics_with(&files, CheckerOptions::default())
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![2305, 2307]);
}

#[test]
fn test_declaration_file_globals_are_visible() {
    let files = [
        ("/p/main.ts", "const o: UObject = makeObject();\no.name;"),
        (
            "/p/types/host.d.ts",
            "declare class UObject { name: string; }\ndeclare function makeObject(): UObject;",
        ),
    ];
    let diagnostics = diagnostics_with(&files, CheckerOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_deeply_nested_expression_does_not_overflow() {
    let text = format!("let x = {}1{};", "(".repeat(2000), ")".repeat(2000));
    // The parser bails out with a syntax error; the checker must simply not
    // crash on what remains.
    let _ = codes(&text);
}
