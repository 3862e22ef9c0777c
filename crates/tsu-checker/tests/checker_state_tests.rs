use super::*;

fn checker_for(text: &str) -> CheckerState {
    CheckerState::new(
        vec![Arc::new(SourceFile::parse("/p/test.ts", text))],
        CheckerOptions::default(),
    )
}

/// First identifier node with the given text.
fn identifier(checker: &CheckerState, name: &str) -> NodeIndex {
    let file = checker.source_file(0).expect("file");
    (0..file.arena.len() as u32)
        .map(NodeIndex)
        .find(|&node| file.arena.identifier_text(node) == Some(name))
        .unwrap_or_else(|| panic!("no identifier {name}"))
}

fn display_of(checker: &mut CheckerState, name: &str) -> String {
    let node = identifier(checker, name);
    let type_id = checker.type_at(0, node).expect("type");
    checker.type_to_string(type_id)
}

#[test]
fn test_const_keeps_literal_and_let_widens() {
    let mut checker = checker_for("const a = 1;\nlet b = 1;\nlet c = 'x';");
    assert_eq!(display_of(&mut checker, "a"), "1");
    assert_eq!(display_of(&mut checker, "b"), "Number");
    assert_eq!(display_of(&mut checker, "c"), "String");
}

#[test]
fn test_return_type_is_inferred_from_body() {
    let mut checker = checker_for("function f(flag: boolean) { if (flag) { return 1; } return 'a'; }");
    let file = checker.source_file(0).cloned().expect("file");
    let signature = checker
        .function_signature(0, file.statements()[0])
        .expect("signature");
    assert_eq!(checker.type_to_string(signature.return_type), "Number | String");
}

#[test]
fn test_function_without_returns_is_void() {
    let mut checker = checker_for("function f() { let x = 1; }");
    let file = checker.source_file(0).cloned().expect("file");
    let signature = checker
        .function_signature(0, file.statements()[0])
        .expect("signature");
    assert_eq!(signature.return_type, TypeId::VOID);
}

#[test]
fn test_mutually_recursive_inference_terminates() {
    let mut checker = checker_for(
        "function f() { return g(); }\nfunction g() { return f(); }\nconst r = f();",
    );
    assert!(checker.semantic_diagnostics(0).is_empty());
    assert_eq!(display_of(&mut checker, "r"), "any");
}

#[test]
fn test_this_inside_method_is_instance_type() {
    let mut checker = checker_for(
        "class Counter {\n  count = 0;\n  next() { return this.count + 1; }\n}\nconst n = new Counter().next();",
    );
    assert!(checker.semantic_diagnostics(0).is_empty());
    assert_eq!(display_of(&mut checker, "n"), "Number");
    assert_eq!(display_of(&mut checker, "count"), "Number");
}

#[test]
fn test_class_identifier_has_constructor_type() {
    let mut checker = checker_for("class Actor {}\nconst a = new Actor();");
    let node = identifier(&checker, "Actor");
    let ctor = checker.type_at(0, node).expect("type");
    assert_eq!(checker.type_to_string(ctor), "typeof Actor");
    let signatures = checker.construct_signatures(ctor);
    assert_eq!(signatures.len(), 1);
    assert_eq!(checker.type_to_string(signatures[0].return_type), "Actor");
    assert_eq!(display_of(&mut checker, "a"), "Actor");
}

#[test]
fn test_base_types_follow_extends() {
    let mut checker = checker_for("class A {}\nclass B extends A {}\nlet b = new B();");
    let node = identifier(&checker, "b");
    let b = checker.type_at(0, node).expect("type");
    let bases = checker.base_types(b);
    assert_eq!(bases.len(), 1);
    assert_eq!(checker.type_symbol_name(bases[0]), Some("A"));
}

#[test]
fn test_statements_have_no_type() {
    let mut checker = checker_for("let x = 1;");
    let file = checker.source_file(0).cloned().expect("file");
    let statement = file.statements()[0];
    assert!(matches!(
        checker.type_at(0, statement),
        Err(TypeQueryError::NoType { .. })
    ));
    assert!(matches!(
        checker.type_at(7, statement),
        Err(TypeQueryError::UnknownFile(_))
    ));
}

#[test]
fn test_lazy_resolution_does_not_duplicate_diagnostics() {
    // `a` is resolved lazily through `b` before the full check reaches it.
    let mut checker = checker_for("const b = a;\nconst a = missing;");
    let diagnostics = checker.semantic_diagnostics(0);
    let codes: Vec<u32> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2304]);
}

#[test]
fn test_arrow_parameters_take_contextual_types() {
    let mut checker = checker_for(
        "function apply(cb: (n: number) => string) { return cb(1); }\nconst r = apply(v => 'x' + v);",
    );
    assert!(checker.semantic_diagnostics(0).is_empty());
    assert_eq!(display_of(&mut checker, "v"), "Number");
    assert_eq!(display_of(&mut checker, "r"), "String");
}

#[test]
fn test_apparent_members_of_arrays_and_strings() {
    let mut checker = checker_for(
        "const xs = [1, 2];\nconst n = xs.length;\nconst s = 'abc'.toUpperCase();\nxs.push(3);",
    );
    assert!(checker.semantic_diagnostics(0).is_empty());
    assert_eq!(display_of(&mut checker, "xs"), "Number[]");
    assert_eq!(display_of(&mut checker, "n"), "Number");
    assert_eq!(display_of(&mut checker, "s"), "String");
}
