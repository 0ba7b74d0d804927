//! Inventory-level entity checks
//!
//! Repositories carry no typed entity vocabulary; the checks here are
//! structural: names, absolute paths, manifest shapes.

use std::collections::BTreeSet;

use serde_json::Value;

use archdoc_model::vocab;

use super::Checks;

pub(crate) fn check_entities(checks: &mut Checks<'_>, items: &[Value]) {
    let mut seen_paths = BTreeSet::new();
    let mut seen_names = BTreeSet::new();

    for (idx, item) in items.iter().enumerate() {
        let base = format!("repositories[{idx}]");
        let Some(repo) = item.as_object() else {
            checks.blocking(base, "repository entry must be an object");
            continue;
        };

        match checks.require_str(repo, &base, "name") {
            None => {}
            Some(name) => {
                let name = name.to_string();
                checks.set_entity(&name);
                if !seen_names.insert(name.clone()) {
                    checks.blocking(format!("{base}.name"), format!("duplicate repository name: {name}"));
                }
            }
        }

        if let Some(path) = checks.require_str(repo, &base, "path") {
            let path = path.to_string();
            if !path.starts_with('/') {
                checks.blocking(
                    format!("{base}.path"),
                    format!("repository path must be absolute: {path}"),
                );
            }
            if !seen_paths.insert(path.clone()) {
                checks.blocking(
                    format!("{base}.path"),
                    format!("duplicate repository path: {path}"),
                );
            }
        }

        if let Some(manifests) = checks.optional_array(repo, &base, "manifests") {
            let manifests = manifests.clone();
            if manifests.is_empty() {
                checks.warning(
                    format!("{base}.manifests"),
                    "repository lists no package manifests",
                );
            }
            for (midx, manifest) in manifests.iter().enumerate() {
                let mbase = format!("{base}.manifests[{midx}]");
                let Some(manifest) = manifest.as_object() else {
                    checks.blocking(mbase, "manifest entry must be an object");
                    continue;
                };
                if let Some(kind) = checks.require_str(manifest, &mbase, "type") {
                    let kind = kind.to_string();
                    checks.check_enum(
                        &kind,
                        vocab::MANIFEST_TYPES,
                        &format!("{mbase}.type"),
                        "manifest type",
                    );
                }
                if let Some(path) = checks.require_str(manifest, &mbase, "path") {
                    if path.starts_with('/') {
                        let message = format!("manifest path must be repository-relative: {path}");
                        checks.blocking(format!("{mbase}.path"), message);
                    }
                }
            }
        } else {
            checks.warning(
                format!("{base}.manifests"),
                "repository lists no package manifests",
            );
        }

        checks.clear_entity();
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use archdoc_model::{FindingSeverity, Level};
    use serde_json::json;

    fn doc(repositories: serde_json::Value) -> serde_json::Value {
        json!({
            "metadata": {
                "schema_version": "1.0.0",
                "generator": "explorer",
                "timestamp": "2026-03-01T12:00:00.000Z"
            },
            "repositories": repositories
        })
    }

    #[test]
    fn relative_repository_path_blocks() {
        let outcome = SchemaValidator::new().validate(
            Level::Inventory,
            &doc(json!([{"name": "a", "path": "repos/a", "manifests": []}])),
        );
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "repositories[0].path"));
    }

    #[test]
    fn duplicate_repository_paths_block() {
        let outcome = SchemaValidator::new().validate(
            Level::Inventory,
            &doc(json!([
                {"name": "a", "path": "/srv/x", "manifests": []},
                {"name": "b", "path": "/srv/x", "manifests": []}
            ])),
        );
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("duplicate repository path")));
    }

    #[test]
    fn unknown_manifest_type_blocks() {
        let outcome = SchemaValidator::new().validate(
            Level::Inventory,
            &doc(json!([{
                "name": "a", "path": "/srv/a",
                "manifests": [{"type": "bazel", "path": "BUILD"}]
            }])),
        );
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("bazel")));
    }

    #[test]
    fn missing_manifests_is_a_warning_only() {
        let outcome = SchemaValidator::new().validate(
            Level::Inventory,
            &doc(json!([{"name": "a", "path": "/srv/a"}])),
        );
        assert!(!outcome.is_blocked());
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Warning
                && f.path == "repositories[0].manifests"));
    }

    #[test]
    fn absolute_manifest_path_blocks() {
        let outcome = SchemaValidator::new().validate(
            Level::Inventory,
            &doc(json!([{
                "name": "a", "path": "/srv/a",
                "manifests": [{"type": "cargo", "path": "/srv/a/Cargo.toml"}]
            }])),
        );
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("repository-relative")));
    }
}
