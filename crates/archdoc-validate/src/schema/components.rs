//! C3 component entity checks
//!
//! Structure, patterns and metrics are optional blocks; when present
//! their inner shapes are still checked field by field.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use archdoc_model::{vocab, Level};

use super::Checks;

pub(crate) fn check_entities(checks: &mut Checks<'_>, items: &[Value]) {
    let mut seen_ids = BTreeSet::new();

    for (idx, item) in items.iter().enumerate() {
        let base = format!("components[{idx}]");
        let Some(component) = item.as_object() else {
            checks.blocking(base, "component entry must be an object");
            continue;
        };

        if let Some(id) = checks.require_str(component, &base, "id") {
            let id = id.to_string();
            checks.set_entity(&id);
            checks.check_id(&id, &format!("{base}.id"));
            if !seen_ids.insert(id.clone()) {
                checks.blocking(format!("{base}.id"), format!("duplicate component id: {id}"));
            }
        }

        checks.require_str(component, &base, "name");

        if let Some(kind) = checks.require_str(component, &base, "type") {
            let kind = kind.to_string();
            checks.check_enum(
                &kind,
                vocab::entity_types(Level::Component),
                &format!("{base}.type"),
                "component type",
            );
        }

        if let Some(container_id) = checks.require_str(component, &base, "container_id") {
            let container_id = container_id.to_string();
            checks.check_id(&container_id, &format!("{base}.container_id"));
        }

        checks.check_description(component, &base);
        check_structure(checks, component, &base);
        check_patterns(checks, component, &base);
        check_metrics(checks, component, &base);
        checks.check_observations(component, &base);
        checks.check_relations(component, &base);
        checks.clear_entity();
    }
}

fn check_structure(checks: &mut Checks<'_>, component: &Map<String, Value>, base: &str) {
    let Some(structure) = checks.optional_obj(component, base, "structure") else {
        return;
    };
    let structure = structure.clone();
    let sbase = format!("{base}.structure");
    checks.require_str(&structure, &sbase, "path");
    checks.require_str(&structure, &sbase, "language");

    if let Some(files) = checks.optional_array(&structure, &sbase, "files") {
        let files = files.clone();
        for (fidx, file) in files.iter().enumerate() {
            let fbase = format!("{sbase}.files[{fidx}]");
            let Some(file) = file.as_object() else {
                checks.blocking(fbase, "file entry must be an object");
                continue;
            };
            checks.require_str(file, &fbase, "path");
            if let Some(lines) = file.get("lines") {
                if !lines.is_u64() {
                    checks.blocking(
                        format!("{fbase}.lines"),
                        "field 'lines' must be a non-negative integer",
                    );
                }
            }
        }
    }

    if let Some(exports) = checks.optional_array(&structure, &sbase, "exports") {
        let exports = exports.clone();
        for (eidx, export) in exports.iter().enumerate() {
            let ebase = format!("{sbase}.exports[{eidx}]");
            let Some(export) = export.as_object() else {
                checks.blocking(ebase, "export entry must be an object");
                continue;
            };
            checks.require_str(export, &ebase, "name");
        }
    }
}

fn check_patterns(checks: &mut Checks<'_>, component: &Map<String, Value>, base: &str) {
    let Some(patterns) = checks.optional_array(component, base, "patterns") else {
        return;
    };
    let patterns = patterns.clone();
    for (pidx, pattern) in patterns.iter().enumerate() {
        let pbase = format!("{base}.patterns[{pidx}]");
        let Some(pattern) = pattern.as_object() else {
            checks.blocking(pbase, "pattern entry must be an object");
            continue;
        };
        checks.require_str(pattern, &pbase, "name");
        checks.optional_str(pattern, &pbase, "category");
        checks.optional_str(pattern, &pbase, "description");
    }
}

fn check_metrics(checks: &mut Checks<'_>, component: &Map<String, Value>, base: &str) {
    let Some(metrics) = checks.optional_obj(component, base, "metrics") else {
        return;
    };
    let metrics = metrics.clone();
    let mbase = format!("{base}.metrics");

    for key in ["lines_of_code", "cyclomatic_complexity"] {
        if let Some(value) = metrics.get(key) {
            if !value.is_u64() {
                checks.blocking(
                    format!("{mbase}.{key}"),
                    format!("field '{key}' must be a non-negative integer"),
                );
            }
        }
    }

    if let Some(coverage) = metrics.get("test_coverage") {
        match coverage.as_f64() {
            Some(pct) if (0.0..=100.0).contains(&pct) => {}
            _ => checks.blocking(
                format!("{mbase}.test_coverage"),
                "field 'test_coverage' must be a number between 0 and 100",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use archdoc_model::Level;
    use serde_json::json;

    fn doc(components: serde_json::Value) -> serde_json::Value {
        json!({
            "metadata": {
                "schema_version": "1.0.0",
                "generator": "explorer",
                "timestamp": "2026-03-01T12:00:03.000Z",
                "parent_timestamp": "2026-03-01T12:00:02.000Z"
            },
            "components": components
        })
    }

    fn component() -> serde_json::Value {
        json!({
            "id": "invoice-service",
            "name": "InvoiceService",
            "type": "service",
            "container_id": "billing-api",
            "description": "creates and finalizes invoices",
            "structure": {
                "path": "src/invoice",
                "language": "rust",
                "files": [{"path": "src/invoice/mod.rs", "lines": 412}],
                "exports": [{"name": "InvoiceService", "type": "struct"}]
            },
            "patterns": [{"name": "repository", "category": "structural"}],
            "metrics": {"lines_of_code": 412, "cyclomatic_complexity": 17, "test_coverage": 83.5},
            "observations": [{
                "id": "obs-1", "category": "code-quality",
                "description": "well covered by integration tests"
            }],
            "relations": [{
                "id": "rel-1", "source": "invoice-service", "target": "invoice-repository",
                "type": "injects", "description": "constructor-injected persistence"
            }]
        })
    }

    #[test]
    fn conforming_component_passes() {
        let outcome =
            SchemaValidator::new().validate(Level::Component, &doc(json!([component()])));
        assert!(!outcome.is_blocked(), "findings: {:?}", outcome.findings);
        assert!(outcome.document.is_some());
    }

    #[test]
    fn structure_is_optional() {
        let mut c = component();
        let obj = c.as_object_mut().unwrap();
        obj.remove("structure");
        obj.remove("patterns");
        obj.remove("metrics");
        let outcome = SchemaValidator::new().validate(Level::Component, &doc(json!([c])));
        assert!(!outcome.is_blocked(), "findings: {:?}", outcome.findings);
    }

    #[test]
    fn negative_line_counts_block() {
        let mut c = component();
        c["structure"]["files"][0]["lines"] = json!(-3);
        let outcome = SchemaValidator::new().validate(Level::Component, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("lines")));
    }

    #[test]
    fn coverage_over_100_blocks() {
        let mut c = component();
        c["metrics"]["test_coverage"] = json!(120.0);
        let outcome = SchemaValidator::new().validate(Level::Component, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("test_coverage")));
    }

    #[test]
    fn unknown_component_type_blocks() {
        let mut c = component();
        c["type"] = json!("microservice");
        let outcome = SchemaValidator::new().validate(Level::Component, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "components[0].type"));
    }
}
