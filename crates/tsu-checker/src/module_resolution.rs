//! Relative module specifier resolution.
//!
//! Only project-relative specifiers (`./x`, `../x`, `/abs/x`) resolve. Each
//! specifier expands to an ordered candidate list; the first candidate that
//! exists wins.

use tsu_common::paths::resolve_relative;

pub fn is_relative_module_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Candidate file paths for `specifier` imported from `from_file`.
pub fn module_candidates(from_file: &str, specifier: &str) -> Vec<String> {
    if !is_relative_module_specifier(specifier) {
        return Vec::new();
    }
    let base = resolve_relative(from_file, specifier);
    if base.ends_with(".ts") {
        return vec![base];
    }
    vec![
        format!("{base}.ts"),
        format!("{base}.d.ts"),
        format!("{base}/index.ts"),
        format!("{base}/index.d.ts"),
    ]
}

/// First candidate accepted by `exists`.
pub fn resolve_module(
    from_file: &str,
    specifier: &str,
    mut exists: impl FnMut(&str) -> bool,
) -> Option<String> {
    module_candidates(from_file, specifier)
        .into_iter()
        .find(|candidate| exists(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_for_extensionless_specifier() {
        assert_eq!(
            module_candidates("/p/scripts/a.ts", "./lib/b"),
            vec![
                "/p/scripts/lib/b.ts",
                "/p/scripts/lib/b.d.ts",
                "/p/scripts/lib/b/index.ts",
                "/p/scripts/lib/b/index.d.ts",
            ]
        );
    }

    #[test]
    fn test_bare_specifiers_do_not_resolve() {
        assert!(module_candidates("/p/a.ts", "ue").is_empty());
        assert_eq!(resolve_module("/p/a.ts", "ue", |_| true), None);
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let resolved = resolve_module("/p/a.ts", "../q/b", |path| path.ends_with(".d.ts"));
        assert_eq!(resolved.as_deref(), Some("/q/b.d.ts"));
    }
}
