//! C1 system entity checks

use std::collections::BTreeSet;

use serde_json::Value;

use archdoc_model::{vocab, Level};

use super::Checks;

pub(crate) fn check_entities(checks: &mut Checks<'_>, items: &[Value]) {
    let mut seen_ids = BTreeSet::new();

    for (idx, item) in items.iter().enumerate() {
        let base = format!("systems[{idx}]");
        let Some(system) = item.as_object() else {
            checks.blocking(base, "system entry must be an object");
            continue;
        };

        if let Some(id) = checks.require_str(system, &base, "id") {
            let id = id.to_string();
            checks.set_entity(&id);
            checks.check_id(&id, &format!("{base}.id"));
            if !seen_ids.insert(id.clone()) {
                checks.blocking(format!("{base}.id"), format!("duplicate system id: {id}"));
            }
        }

        checks.require_str(system, &base, "name");

        if let Some(kind) = checks.require_str(system, &base, "type") {
            let kind = kind.to_string();
            checks.check_enum(
                &kind,
                vocab::entity_types(Level::System),
                &format!("{base}.type"),
                "system type",
            );
        }

        checks.check_description(system, &base);

        if let Some(repositories) = checks.require_array(system, &base, "repositories") {
            let repositories = repositories.clone();
            if repositories.is_empty() {
                checks.blocking(
                    format!("{base}.repositories"),
                    "system must reference at least one repository",
                );
            }
            for (ridx, repo) in repositories.iter().enumerate() {
                if !repo.is_string() {
                    checks.blocking(
                        format!("{base}.repositories[{ridx}]"),
                        "repository references must be strings",
                    );
                }
            }
        }

        checks.check_observations(system, &base);
        checks.check_relations(system, &base);
        checks.clear_entity();
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use archdoc_model::Level;
    use serde_json::json;

    fn doc(systems: serde_json::Value) -> serde_json::Value {
        json!({
            "metadata": {
                "schema_version": "1.0.0",
                "generator": "explorer",
                "timestamp": "2026-03-01T12:00:01.000Z",
                "parent_timestamp": "2026-03-01T12:00:00.000Z"
            },
            "systems": systems
        })
    }

    fn system(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Shop",
            "type": "web-application",
            "description": "customer-facing storefront",
            "repositories": ["shop-frontend"],
            "observations": [{
                "id": "obs-1", "category": "architectural",
                "description": "monolith with a thin API layer"
            }],
            "relations": [{
                "id": "rel-1", "source": id, "target": "payment-gateway",
                "type": "http-rest", "description": "charges cards via the gateway",
                "external": true
            }]
        })
    }

    #[test]
    fn conforming_system_passes() {
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([system("shop")])));
        assert!(!outcome.is_blocked(), "findings: {:?}", outcome.findings);
    }

    #[test]
    fn uppercase_id_blocks() {
        let outcome =
            SchemaValidator::new().validate(Level::System, &doc(json!([system("Shop")])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "systems[0].id"));
    }

    #[test]
    fn duplicate_system_ids_block() {
        let outcome = SchemaValidator::new()
            .validate(Level::System, &doc(json!([system("shop"), system("shop")])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("duplicate system id")));
    }

    #[test]
    fn unknown_system_type_blocks() {
        let mut s = system("shop");
        s["type"] = json!("mainframe");
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path == "systems[0].type"));
    }

    #[test]
    fn empty_repositories_block() {
        let mut s = system("shop");
        s["repositories"] = json!([]);
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        assert!(outcome.is_blocked());
    }

    #[test]
    fn unknown_observation_category_blocks() {
        let mut s = system("shop");
        s["observations"][0]["category"] = json!("vibes");
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("category")));
    }

    #[test]
    fn critical_observation_without_recommendation_warns() {
        let mut s = system("shop");
        s["observations"][0]["severity"] = json!("critical");
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        let hits: Vec<_> = outcome
            .findings
            .iter()
            .filter(|f| f.path == "systems[0].observations[0].recommendation")
            .collect();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].is_blocking());

        let mut s = system("shop");
        s["observations"][0]["severity"] = json!("critical");
        s["observations"][0]["recommendation"] = json!("rotate the signing keys");
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        assert!(outcome
            .findings
            .iter()
            .all(|f| f.path != "systems[0].observations[0].recommendation"));
    }

    #[test]
    fn blocking_findings_carry_the_entity_id() {
        let mut s = system("shop");
        s["type"] = json!("mainframe");
        let outcome = SchemaValidator::new().validate(Level::System, &doc(json!([s])));
        let finding = outcome
            .findings
            .iter()
            .find(|f| f.path == "systems[0].type")
            .unwrap();
        assert_eq!(finding.entity.as_deref(), Some("shop"));
    }
}
