use super::*;
use crate::test_fixtures::{FakeFrontend, FakeType};
use std::sync::Arc;

fn parse(text: &str) -> Arc<SourceFile> {
    Arc::new(SourceFile::parse("/p/main.ts", text))
}

fn derived(frontend: &mut FakeFrontend, display: &str, bases: Vec<TypeId>) -> TypeId {
    frontend.add(FakeType {
        display: display.into(),
        bases,
        ..FakeType::default()
    })
}

fn collect(frontend: &mut FakeFrontend, file: &Arc<SourceFile>, root_type: &str) -> Vec<String> {
    frontend.files.insert(file.file_name.clone(), Arc::clone(file));
    collect_dependencies(frontend, file, root_type)
}

#[test]
fn test_transitive_bases_in_first_discovery_order() {
    let file = parse("let p: Pawn;\nlet a: Actor;\nlet again: Pawn;\n");
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let actor = derived(&mut frontend, "Actor", vec![root]);
    let pawn = derived(&mut frontend, "Pawn", vec![actor]);
    let mut frontend = frontend
        .with_node_type("Actor", actor)
        .with_node_type("Pawn", pawn);

    assert_eq!(collect(&mut frontend, &file, "UObject"), vec!["Pawn", "Actor"]);
}

#[test]
fn test_root_type_itself_is_a_dependency() {
    let file = parse("let o: UObject;\n");
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let mut frontend = frontend.with_node_type("UObject", root);

    assert_eq!(collect(&mut frontend, &file, "UObject"), vec!["UObject"]);
}

#[test]
fn test_unrelated_types_are_ignored() {
    let file = parse("let v: Vector;\n");
    let mut frontend = FakeFrontend::new();
    let _root = frontend.add_type("UObject");
    let vector = derived(&mut frontend, "Vector", Vec::new());
    let mut frontend = frontend.with_node_type("Vector", vector);

    assert!(collect(&mut frontend, &file, "UObject").is_empty());
}

#[test]
fn test_literal_and_callable_types_never_count() {
    let file = parse("let x = spawn;\nlet y = 1;\n");
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let callable = frontend.add(FakeType {
        display: "() => void".into(),
        bases: vec![root],
        callable: true,
        ..FakeType::default()
    });
    let literal = frontend.add(FakeType {
        display: "1".into(),
        bases: vec![root],
        literal: true,
        ..FakeType::default()
    });
    let mut frontend = frontend
        .with_node_type("spawn", callable)
        .with_node_type("1", literal);

    assert!(collect(&mut frontend, &file, "UObject").is_empty());
}

#[test]
fn test_constructor_counts_through_instance_type() {
    let file = parse("const a = Actor;\n");
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let actor = derived(&mut frontend, "Actor", vec![root]);
    let actor_class = frontend.add(FakeType {
        display: "typeof Actor".into(),
        constructs: Some(actor),
        ..FakeType::default()
    });
    let mut frontend = frontend.with_node_type("Actor", actor_class);

    assert_eq!(collect(&mut frontend, &file, "UObject"), vec!["Actor"]);
}

#[test]
fn test_cyclic_bases_terminate() {
    let file = parse("let a: A;\n");
    let mut frontend = FakeFrontend::new();
    let _root = frontend.add_type("UObject");
    let a = derived(&mut frontend, "A", Vec::new());
    let b = derived(&mut frontend, "B", vec![a]);
    frontend.types[a.0 as usize].bases = vec![b];
    let mut frontend = frontend.with_node_type("A", a);

    assert!(collect(&mut frontend, &file, "UObject").is_empty());
}

#[test]
fn test_custom_root_type() {
    let file = parse("let w: Widget;\n");
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("HostBase");
    let widget = derived(&mut frontend, "Widget", vec![root]);
    let mut frontend = frontend.with_node_type("Widget", widget);

    assert!(collect(&mut frontend, &file, "UObject").is_empty());
    assert_eq!(collect(&mut frontend, &file, "HostBase"), vec!["Widget"]);
}

#[test]
fn test_classification_is_memoized_per_collection() {
    let mut frontend = FakeFrontend::new();
    let root = frontend.add_type("UObject");
    let actor = derived(&mut frontend, "Actor", vec![root]);

    let mut collector = DependencyCollector::new(&mut frontend, "UObject");
    assert!(collector.derives_from_root(actor));
    assert_eq!(collector.classified.get(&actor), Some(&true));
}
