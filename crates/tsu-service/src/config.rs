//! Project configuration: `tsconfig.json` discovery, parsing and the ambient
//! declaration file set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};
use tsu_checker::CompilerOptions;
use tsu_common::paths::{is_declaration_file, normalize_path};
use walkdir::WalkDir;

pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

const DEFAULT_INCLUDE: &str = "**/*";
const DEFAULT_EXCLUDE: [&str; 3] = ["node_modules", "bower_components", "jspm_packages"];
const DEFAULT_TYPE_ROOT: &str = "node_modules/@types";

/// Accepts `true`, `false` and their string spellings.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<TsCompilerOptions>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// `compilerOptions` as written. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsCompilerOptions {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_implicit_any: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_emit: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub source_map: Option<bool>,
    #[serde(default)]
    pub out_dir: Option<String>,
    #[serde(default)]
    pub type_roots: Option<Vec<String>>,
}

/// Everything the service needs from the project configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub project_dir: PathBuf,
    pub compiler_options: CompilerOptions,
    /// Ambient `.d.ts` files that are part of every program.
    pub declaration_files: Vec<String>,
}

/// Locate and load the configuration governing `project_dir`.
pub fn load_project(project_dir: &Path) -> Result<ProjectConfig> {
    let project_dir = std::path::absolute(project_dir)
        .with_context(|| format!("invalid project directory: {}", project_dir.display()))?;
    let config_path = find_tsconfig(&project_dir)
        .ok_or_else(|| anyhow!("failed to find tsconfig in: {}", project_dir.display()))?;
    let config = load_tsconfig(&config_path)?;
    let base_dir = config_path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?
        .to_path_buf();

    let compiler_options = resolve_compiler_options(&config, &base_dir);
    let declaration_files = discover_declaration_files(&config, &base_dir, &compiler_options)?;
    info!(
        config = %config_path.display(),
        declarations = declaration_files.len(),
        "loaded project configuration"
    );

    Ok(ProjectConfig {
        config_path,
        project_dir,
        compiler_options,
        declaration_files,
    })
}

/// First `tsconfig.json` in `start` or any of its ancestors.
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

pub fn parse_tsconfig(source: &str) -> Result<TsConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse tsconfig JSON")?;
    Ok(config)
}

/// Load a config file, following `extends`.
pub fn load_tsconfig(path: &Path) -> Result<TsConfig> {
    let mut visited = HashSet::new();
    load_tsconfig_inner(path, &mut visited)
}

fn load_tsconfig_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("tsconfig extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
    let mut config = parse_tsconfig(&source)
        .with_context(|| format!("failed to parse tsconfig: {}", path.display()))?;

    if let Some(extends_path) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends_path)?;
        debug!(base = %base_path.display(), "following tsconfig extends");
        let base_config = load_tsconfig_inner(&base_path, visited)?;
        config = merge_configs(base_config, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }

    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base_dir.join(candidate))
    }
}

fn merge_configs(base: TsConfig, mut child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(base_opts), Some(child_opts)) => Some(TsCompilerOptions {
            strict: child_opts.strict.or(base_opts.strict),
            no_implicit_any: child_opts.no_implicit_any.or(base_opts.no_implicit_any),
            no_emit: child_opts.no_emit.or(base_opts.no_emit),
            source_map: child_opts.source_map.or(base_opts.source_map),
            out_dir: child_opts.out_dir.or(base_opts.out_dir),
            type_roots: child_opts.type_roots.or(base_opts.type_roots),
        }),
        (base_opts, child_opts) => child_opts.or(base_opts),
    };

    TsConfig {
        extends: None,
        compiler_options,
        include: child.include.or(base.include),
        exclude: child.exclude.or(base.exclude),
        files: child.files.or(base.files),
    }
}

/// Compiler options with paths made absolute against `base_dir`.
pub fn resolve_compiler_options(config: &TsConfig, base_dir: &Path) -> CompilerOptions {
    let options = config.compiler_options.clone().unwrap_or_default();
    let absolute = |value: &str| normalize_path(&base_dir.join(value).to_string_lossy());

    let type_roots = match &options.type_roots {
        Some(roots) => roots.iter().map(|root| absolute(root)).collect(),
        None => vec![absolute(DEFAULT_TYPE_ROOT)],
    };

    CompilerOptions {
        strict: options.strict.unwrap_or(false),
        no_implicit_any: options.no_implicit_any.unwrap_or(false),
        no_emit: options.no_emit.unwrap_or(false),
        source_map: options.source_map.unwrap_or(false),
        out_dir: options.out_dir.as_deref().map(absolute),
        type_roots,
    }
}

// =============================================================================
// Declaration file discovery
// =============================================================================

/// `*.d.ts` files selected by `files`/`include`/`exclude`, plus every
/// `index.d.ts` package under the type roots.
fn discover_declaration_files(
    config: &TsConfig,
    base_dir: &Path,
    options: &CompilerOptions,
) -> Result<Vec<String>> {
    let include: Vec<String> = config
        .include
        .clone()
        .unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()]);
    let mut exclude: Vec<String> = config
        .exclude
        .clone()
        .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect());
    if let Some(out_dir) = &options.out_dir {
        exclude.push(out_dir.clone());
    }

    let include_set = build_glob_set(&include, base_dir)?;
    let exclude_set = build_glob_set(&exclude, base_dir)?;

    let mut found: Vec<String> = Vec::new();
    let mut push = |path: String| {
        if !found.contains(&path) {
            found.push(path);
        }
    };

    for file in config.files.iter().flatten() {
        if is_declaration_file(file) {
            push(normalize_path(&base_dir.join(file).to_string_lossy()));
        }
    }

    let walker = WalkDir::new(base_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !matches_glob(&exclude_set, base_dir, entry.path())
        });
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = normalize_path(&entry.path().to_string_lossy());
        if is_declaration_file(&path) && matches_glob(&include_set, base_dir, entry.path()) {
            push(path);
        }
    }

    for root in &options.type_roots {
        for package in type_root_packages(Path::new(root)) {
            push(package);
        }
    }

    Ok(found)
}

/// Glob set over paths relative to `base_dir`. A pattern without wildcards
/// also matches everything below it.
fn build_glob_set(patterns: &[String], base_dir: &Path) -> Result<GlobSet> {
    let base = normalize_path(&base_dir.to_string_lossy());
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let mut pattern = normalize_path(pattern);
        if let Some(relative) = pattern.strip_prefix(&format!("{base}/")) {
            pattern = relative.to_string();
        }
        let mut variants = vec![pattern.clone()];
        if !pattern.contains('*') {
            variants.push(format!("{pattern}/**"));
        }
        for variant in variants {
            let glob = GlobBuilder::new(&variant)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern in tsconfig: {variant}"))?;
            builder.add(glob);
        }
    }
    builder.build().context("failed to compile tsconfig globs")
}

fn matches_glob(set: &GlobSet, base_dir: &Path, path: &Path) -> bool {
    path.strip_prefix(base_dir)
        .map(|relative| set.is_match(normalize_path(&relative.to_string_lossy())))
        .unwrap_or(false)
}

fn type_root_packages(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut packages: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path().join("index.d.ts"))
        .filter(|index| index.is_file())
        .map(|index| normalize_path(&index.to_string_lossy()))
        .collect();
    packages.sort();
    packages
}

// =============================================================================
// JSON with comments
// =============================================================================

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars.clone().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_string_booleans() {
        let config = parse_tsconfig(r#"{"compilerOptions": {"strict": "true", "noEmit": false}}"#)
            .expect("valid");
        let options = config.compiler_options.expect("options");
        assert_eq!(options.strict, Some(true));
        assert_eq!(options.no_emit, Some(false));
    }

    #[test]
    fn test_parse_invalid_boolean_string() {
        assert!(parse_tsconfig(r#"{"compilerOptions": {"strict": "maybe"}}"#).is_err());
    }

    #[test]
    fn test_comments_and_trailing_commas() {
        let source = r#"{
            // line comment
            "compilerOptions": { /* block */ "outDir": "out//x", },
            "include": ["src",],
        }"#;
        let config = parse_tsconfig(source).expect("valid");
        let options = config.compiler_options.expect("options");
        assert_eq!(options.out_dir.as_deref(), Some("out//x"));
        assert_eq!(config.include, Some(vec!["src".to_string()]));
    }

    #[test]
    fn test_find_tsconfig_walks_ancestors() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").expect("write");
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).expect("mkdir");
        assert_eq!(
            find_tsconfig(&nested),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_extends_merges_and_detects_cycles() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("base.json"),
            r#"{"compilerOptions": {"strict": true, "sourceMap": true}}"#,
        )
        .expect("write");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"extends": "./base", "compilerOptions": {"sourceMap": false}}"#,
        )
        .expect("write");
        let config = load_tsconfig(&dir.path().join(CONFIG_FILE_NAME)).expect("loads");
        let options = config.compiler_options.expect("options");
        assert_eq!(options.strict, Some(true));
        assert_eq!(options.source_map, Some(false));

        fs::write(dir.path().join("base.json"), r#"{"extends": "./tsconfig"}"#).expect("write");
        let err = load_tsconfig(&dir.path().join(CONFIG_FILE_NAME)).expect_err("cycle");
        assert!(format!("{err:#}").contains("cycle"));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The temp dir may live below a directory with a tsconfig; only assert
        // when the lookup really finds nothing.
        if find_tsconfig(dir.path()).is_none() {
            assert!(load_project(dir.path()).is_err());
        }
    }

    #[test]
    fn test_project_discovers_declaration_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(
            root.join(CONFIG_FILE_NAME),
            r#"{"compilerOptions": {"outDir": "out"}, "exclude": ["ignored"]}"#,
        )
        .expect("write");
        for (path, text) in [
            ("types/host.d.ts", "declare class UObject {}"),
            ("ignored/skip.d.ts", ""),
            ("scripts/a.ts", "export {}"),
            ("node_modules/@types/host-api/index.d.ts", ""),
        ] {
            let full = root.join(path);
            fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
            fs::write(full, text).expect("write");
        }

        let project = load_project(root).expect("loads");
        let names: Vec<&str> = project
            .declaration_files
            .iter()
            .map(|p| p.rsplit_once('/').map_or(p.as_str(), |(dir, _)| dir))
            .collect();
        assert!(names.iter().any(|d| d.ends_with("/types")), "{names:?}");
        assert!(names.iter().any(|d| d.ends_with("@types/host-api")), "{names:?}");
        assert!(!names.iter().any(|d| d.ends_with("/ignored")), "{names:?}");
        assert!(
            project
                .compiler_options
                .out_dir
                .as_deref()
                .is_some_and(|out| out.ends_with("/out"))
        );
    }
}
