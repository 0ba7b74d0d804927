//! C2 container entity checks
//!
//! Containers additionally require `technology` and `runtime` blocks;
//! `container_technology` becomes required when `containerized` is true.

use std::collections::BTreeSet;

use serde_json::Value;

use archdoc_model::{vocab, Level};

use super::Checks;

pub(crate) fn check_entities(checks: &mut Checks<'_>, items: &[Value]) {
    let mut seen_ids = BTreeSet::new();

    for (idx, item) in items.iter().enumerate() {
        let base = format!("containers[{idx}]");
        let Some(container) = item.as_object() else {
            checks.blocking(base, "container entry must be an object");
            continue;
        };

        if let Some(id) = checks.require_str(container, &base, "id") {
            let id = id.to_string();
            checks.set_entity(&id);
            checks.check_id(&id, &format!("{base}.id"));
            if !seen_ids.insert(id.clone()) {
                checks.blocking(format!("{base}.id"), format!("duplicate container id: {id}"));
            }
        }

        checks.require_str(container, &base, "name");

        if let Some(kind) = checks.require_str(container, &base, "type") {
            let kind = kind.to_string();
            checks.check_enum(
                &kind,
                vocab::entity_types(Level::Container),
                &format!("{base}.type"),
                "container type",
            );
        }

        if let Some(system_id) = checks.require_str(container, &base, "system_id") {
            let system_id = system_id.to_string();
            checks.check_id(&system_id, &format!("{base}.system_id"));
        }

        checks.check_description(container, &base);
        check_technology(checks, container, &base);
        check_runtime(checks, container, &base);
        checks.check_observations(container, &base);
        checks.check_relations(container, &base);
        checks.clear_entity();
    }
}

fn check_technology(
    checks: &mut Checks<'_>,
    container: &serde_json::Map<String, Value>,
    base: &str,
) {
    let Some(technology) = checks.require_obj(container, base, "technology") else {
        return;
    };
    let technology = technology.clone();
    let tbase = format!("{base}.technology");
    checks.require_str(&technology, &tbase, "primary_language");
    checks.require_str(&technology, &tbase, "framework");

    if let Some(libraries) = checks.optional_array(&technology, &tbase, "libraries") {
        let libraries = libraries.clone();
        for (lidx, library) in libraries.iter().enumerate() {
            let lbase = format!("{tbase}.libraries[{lidx}]");
            let Some(library) = library.as_object() else {
                checks.blocking(lbase, "library entry must be an object");
                continue;
            };
            checks.require_str(library, &lbase, "name");
            checks.optional_str(library, &lbase, "version");
            checks.optional_str(library, &lbase, "purpose");
        }
    }
}

fn check_runtime(checks: &mut Checks<'_>, container: &serde_json::Map<String, Value>, base: &str) {
    let Some(runtime) = checks.require_obj(container, base, "runtime") else {
        return;
    };
    let runtime = runtime.clone();
    let rbase = format!("{base}.runtime");

    if let Some(environment) = checks.require_str(&runtime, &rbase, "environment") {
        let environment = environment.to_string();
        checks.check_enum(
            &environment,
            vocab::RUNTIME_ENVIRONMENTS,
            &format!("{rbase}.environment"),
            "runtime environment",
        );
    }

    checks.require_str(&runtime, &rbase, "platform");

    if checks.require_bool(&runtime, &rbase, "containerized") == Some(true) {
        checks.require_str(&runtime, &rbase, "container_technology");
    } else {
        checks.optional_str(&runtime, &rbase, "container_technology");
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use archdoc_model::Level;
    use serde_json::json;

    fn doc(containers: serde_json::Value) -> serde_json::Value {
        json!({
            "metadata": {
                "schema_version": "1.0.0",
                "generator": "explorer",
                "timestamp": "2026-03-01T12:00:02.000Z",
                "parent_timestamp": "2026-03-01T12:00:01.000Z"
            },
            "containers": containers
        })
    }

    fn container() -> serde_json::Value {
        json!({
            "id": "billing-api",
            "name": "Billing API",
            "type": "api",
            "system_id": "billing",
            "description": "REST surface for invoicing",
            "technology": {
                "primary_language": "rust",
                "framework": "axum",
                "libraries": [{"name": "serde", "version": "1.0", "purpose": "serialization"}]
            },
            "runtime": {
                "environment": "cloud",
                "platform": "linux",
                "containerized": true,
                "container_technology": "docker"
            },
            "observations": [{
                "id": "obs-1", "category": "technology",
                "description": "single binary deployment"
            }],
            "relations": [{
                "id": "rel-1", "source": "billing-api", "target": "billing-db",
                "type": "database-connection", "description": "primary persistence layer"
            }]
        })
    }

    #[test]
    fn conforming_container_passes() {
        let outcome =
            SchemaValidator::new().validate(Level::Container, &doc(json!([container()])));
        assert!(!outcome.is_blocked(), "findings: {:?}", outcome.findings);
        assert!(outcome.document.is_some());
    }

    #[test]
    fn missing_technology_block_blocks() {
        let mut c = container();
        c.as_object_mut().unwrap().remove("technology");
        let outcome = SchemaValidator::new().validate(Level::Container, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "containers[0].technology"));
    }

    #[test]
    fn containerized_requires_container_technology() {
        let mut c = container();
        c["runtime"].as_object_mut().unwrap().remove("container_technology");
        let outcome = SchemaValidator::new().validate(Level::Container, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("container_technology")));
    }

    #[test]
    fn uncontainerized_runtime_omits_container_technology() {
        let mut c = container();
        c["runtime"] = json!({
            "environment": "server", "platform": "linux", "containerized": false
        });
        let outcome = SchemaValidator::new().validate(Level::Container, &doc(json!([c])));
        assert!(!outcome.is_blocked(), "findings: {:?}", outcome.findings);
    }

    #[test]
    fn unknown_runtime_environment_blocks() {
        let mut c = container();
        c["runtime"]["environment"] = json!("orbit");
        let outcome = SchemaValidator::new().validate(Level::Container, &doc(json!([c])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("environment")));
    }

    #[test]
    fn missing_parent_timestamp_blocks_below_inventory() {
        let mut d = doc(json!([container()]));
        d["metadata"].as_object_mut().unwrap().remove("parent_timestamp");
        let outcome = SchemaValidator::new().validate(Level::Container, &d);
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "metadata.parent_timestamp"));
    }
}
