//! package.json handling.
//!
//! Flattens the `dependencies` and `devDependencies` sections into one
//! de-duplicated list of declarations.

use crate::error::{NpmError, Result};
use depimpact_core::{DependencyDeclaration, DependencyKind, ImpactError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Manifest sections that are analyzed, in precedence order.
///
/// A name declared in more than one section keeps the kind of the first
/// section it appears in.
pub const SECTIONS: [(&str, DependencyKind); 2] = [
    ("dependencies", DependencyKind::Production),
    ("devDependencies", DependencyKind::Development),
];

/// Parses package.json content into a JSON value.
///
/// # Errors
///
/// Returns `NpmError::JsonParseError` for malformed JSON and
/// `NpmError::InvalidStructure` when the document is not a JSON object.
pub fn parse_manifest(content: &str) -> Result<Value> {
    let root: Value =
        serde_json::from_str(content).map_err(|e| NpmError::JsonParseError { source: e })?;
    if !root.is_object() {
        return Err(NpmError::invalid_structure("manifest must be a JSON object"));
    }
    Ok(root)
}

/// Collects every declared dependency, sorted by name.
///
/// Sections that are missing or are not objects count as empty. Range values
/// that are not strings are kept as declarations without a range.
///
/// # Errors
///
/// Returns `ImpactError::InvalidInput` when `manifest` is not a JSON object.
///
/// # Examples
///
/// ```
/// use depimpact_core::DependencyKind;
/// use depimpact_npm::manifest::collect_declarations;
/// use serde_json::json;
///
/// let manifest = json!({
///     "dependencies": { "react": "^18.2.0" },
///     "devDependencies": { "react": "^18.0.0", "jest": "^29.0.0" }
/// });
///
/// let deps = collect_declarations(&manifest).unwrap();
/// assert_eq!(deps.len(), 2);
/// assert_eq!(deps[1].name, "react");
/// assert_eq!(deps[1].kind, DependencyKind::Production);
/// ```
pub fn collect_declarations(
    manifest: &Value,
) -> depimpact_core::Result<Vec<DependencyDeclaration>> {
    let root = manifest.as_object().ok_or_else(|| {
        ImpactError::InvalidInput("manifest must be a JSON object with dependency maps".into())
    })?;

    let mut declared: BTreeMap<String, DependencyDeclaration> = BTreeMap::new();
    for (section, kind) in SECTIONS {
        let Some(value) = root.get(section) else {
            continue;
        };
        let Some(deps) = value.as_object() else {
            tracing::warn!("ignoring malformed {} section: expected an object", section);
            continue;
        };

        for (name, range) in deps {
            if range.as_str().is_none() {
                tracing::debug!("{} in {} has a non-string range", name, section);
            }
            declared
                .entry(name.clone())
                .or_insert_with(|| DependencyDeclaration::new(name.as_str(), range.as_str(), kind));
        }
    }

    Ok(declared.into_values().collect())
}

/// Number of entries in each analyzed section, ignoring malformed sections.
pub fn section_counts(manifest: &Value) -> (usize, usize) {
    let count = |section: &str| {
        manifest
            .get(section)
            .and_then(Value::as_object)
            .map_or(0, serde_json::Map::len)
    };
    (count("dependencies"), count("devDependencies"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_production_and_development() {
        let manifest = json!({
            "name": "app",
            "dependencies": { "express": "^4.18.2", "lodash": "^4.17.21" },
            "devDependencies": { "typescript": "^5.0.0" }
        });

        let deps = collect_declarations(&manifest).unwrap();

        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["express", "lodash", "typescript"]);
        assert_eq!(deps[0].kind, DependencyKind::Production);
        assert_eq!(deps[2].kind, DependencyKind::Development);
        assert_eq!(deps[0].declared_range.as_deref(), Some("^4.18.2"));
    }

    #[test]
    fn test_production_wins_over_development() {
        let manifest = json!({
            "devDependencies": { "react": "^17.0.0" },
            "dependencies": { "react": "^18.2.0" }
        });

        let deps = collect_declarations(&manifest).unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind, DependencyKind::Production);
        assert_eq!(deps[0].declared_range.as_deref(), Some("^18.2.0"));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let manifest = json!({ "name": "empty", "version": "1.0.0" });
        assert!(collect_declarations(&manifest).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_sections_are_empty() {
        let manifest = json!({
            "dependencies": ["not", "a", "map"],
            "devDependencies": "nope"
        });
        assert!(collect_declarations(&manifest).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_range_kept_without_range() {
        let manifest = json!({ "dependencies": { "weird": 42 } });

        let deps = collect_declarations(&manifest).unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].declared_range, None);
    }

    #[test]
    fn test_non_object_manifest_is_invalid_input() {
        for manifest in [json!(null), json!([1, 2]), json!("package.json")] {
            let err = collect_declarations(&manifest).unwrap_err();
            assert!(matches!(err, ImpactError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_scoped_package_names() {
        let manifest = json!({
            "devDependencies": { "@vitest/coverage-v8": "^3.1.4", "vitest": "^3.1.4" }
        });

        let deps = collect_declarations(&manifest).unwrap();

        assert_eq!(deps[0].name, "@vitest/coverage-v8");
        assert_eq!(deps[1].name, "vitest");
    }

    #[test]
    fn test_parse_manifest() {
        let root = parse_manifest(r#"{ "name": "app", "dependencies": {} }"#).unwrap();
        assert_eq!(root["name"], "app");

        assert!(matches!(
            parse_manifest("{ invalid json }"),
            Err(NpmError::JsonParseError { .. })
        ));
        assert!(matches!(
            parse_manifest("[]"),
            Err(NpmError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn test_section_counts() {
        let manifest = json!({
            "dependencies": { "a": "1", "b": "2" },
            "devDependencies": { "c": "3" }
        });
        assert_eq!(section_counts(&manifest), (2, 1));
        assert_eq!(section_counts(&json!({})), (0, 0));
    }
}
