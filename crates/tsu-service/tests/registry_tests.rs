use super::*;
use std::fs::{self, File};
use std::time::Duration;

fn write_with_mtime(path: &Path, text: &str, mtime: SystemTime) {
    fs::write(path, text).expect("write");
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(mtime))
        .expect("set mtime");
}

fn path_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

#[test]
fn test_ensure_tracked_creates_then_bumps() {
    let mut registry = ScriptRegistry::new(Vec::new());
    let now = SystemTime::now();
    assert_eq!(registry.ensure_tracked("/p/a.ts", now), 0);
    assert_eq!(registry.ensure_tracked("/p/a.ts", now), 1);
    assert_eq!(registry.ensure_tracked("/p/./a.ts", now), 2);
    assert_eq!(registry.tracked_files().collect::<Vec<_>>(), vec!["/p/a.ts"]);
}

#[test]
fn test_roots_are_declarations_then_tracked_files() {
    let mut registry = ScriptRegistry::new(vec!["/p/types/host.d.ts".into()]);
    registry.ensure_tracked("/p/b.ts", SystemTime::now());
    registry.ensure_tracked("/p/a.ts", SystemTime::now());
    assert_eq!(
        registry.root_file_names(),
        vec!["/p/types/host.d.ts", "/p/b.ts", "/p/a.ts"]
    );
}

#[test]
fn test_version_bumps_only_when_mtime_advances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("a.ts");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    write_with_mtime(&file, "let a = 1;", t0);
    let path = path_string(&file);

    let mut registry = ScriptRegistry::new(Vec::new());
    let mtime = ScriptRegistry::modified_time(&path).expect("mtime");
    registry.ensure_tracked(&path, mtime);
    assert_eq!(registry.script_version(&path).as_deref(), Some("0"));
    assert_eq!(registry.script_version(&path).as_deref(), Some("0"));

    write_with_mtime(&file, "let a = 2;", t0 + Duration::from_secs(5));
    assert_eq!(registry.script_version(&path).as_deref(), Some("1"));
    assert_eq!(registry.script_version(&path).as_deref(), Some("1"));

    // An older timestamp never moves the version backwards.
    write_with_mtime(&file, "let a = 3;", t0);
    assert_eq!(registry.script_version(&path).as_deref(), Some("1"));
}

#[test]
fn test_missing_file_has_no_version_and_no_mtime() {
    let mut registry = ScriptRegistry::new(Vec::new());
    assert_eq!(registry.script_version("/definitely/not/here.ts"), None);
    let err = ScriptRegistry::modified_time("/definitely/not/here.ts").expect_err("missing");
    assert!(err.to_string().contains("/definitely/not/here.ts"));
}

#[test]
fn test_deleted_file_keeps_its_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("a.ts");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    write_with_mtime(&file, "export function first(): void {}", t0);
    let path = path_string(&file);

    let mut registry = ScriptRegistry::new(Vec::new());
    registry.ensure_tracked(&path, t0);
    assert_eq!(registry.script_version(&path).as_deref(), Some("0"));

    fs::remove_file(&file).expect("remove");
    assert_eq!(registry.script_version(&path), None);
    assert_eq!(registry.script_snapshot(&path), None);
    assert_eq!(registry.version_of(&path).map(|v| v.version), Some(0));

    write_with_mtime(&file, "export function second(): void {}", t0);
    assert_eq!(registry.ensure_tracked(&path, t0), 1);
    assert_eq!(registry.script_version(&path).as_deref(), Some("1"));
}

#[test]
fn test_project_files_are_always_reread() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("a.ts");
    fs::write(&file, "first").expect("write");
    let path = path_string(&file);

    let mut registry = ScriptRegistry::new(Vec::new());
    assert_eq!(registry.script_snapshot(&path).as_deref(), Some("first"));
    fs::write(&file, "second").expect("write");
    assert_eq!(registry.script_snapshot(&path).as_deref(), Some("second"));
}

#[test]
fn test_library_files_are_snapshotted_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let package = dir.path().join("node_modules/@types/host");
    fs::create_dir_all(&package).expect("mkdir");
    let file = package.join("index.d.ts");
    fs::write(&file, "declare class UObject {}").expect("write");
    let path = path_string(&file);

    let mut registry = ScriptRegistry::new(Vec::new());
    assert_eq!(registry.script_version(&path).as_deref(), Some("0"));
    let first = registry.script_snapshot(&path).expect("snapshot");

    fs::remove_file(&file).expect("remove");
    let second = registry.script_snapshot(&path).expect("still cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(registry.file_exists(&path));
    assert_eq!(registry.script_version(&path).as_deref(), Some("0"));
}

#[test]
fn test_mark_analyzed_records_mtime() {
    let mut registry = ScriptRegistry::new(Vec::new());
    let t0 = SystemTime::UNIX_EPOCH;
    let t1 = t0 + Duration::from_secs(10);
    registry.ensure_tracked("/p/a.ts", t0);
    registry.mark_analyzed("/p/a.ts", t1);
    let version = registry.version_of("/p/a.ts").expect("known");
    assert_eq!(version.modified_time, t1);
    assert_eq!(version.version, 0);
}
