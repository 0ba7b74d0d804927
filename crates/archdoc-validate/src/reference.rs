//! Cross-document reference graph checking
//!
//! Runs after schema validation on the typed documents. Checks parent
//! references (container → system, component → container), relation
//! targets against the level's known id set, system repository names
//! against the inventory, and reports relation cycles.
//!
//! Relation targets marked `external: true` are exempt from resolution;
//! everything else must resolve at the current level or any level above
//! it (a container may relate to a system, never to a component).

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use archdoc_model::{Document, EntityRef, Finding, Level};

/// Known entity ids per level, accumulated chain-wide
///
/// Inventory ids are repository names. Later levels register their
/// entity ids so children can resolve parent references.
#[derive(Debug, Default, Clone)]
pub struct KnownIds {
    ids: BTreeMap<Level, BTreeSet<String>>,
}

impl KnownIds {
    /// Empty id registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every entity id of a validated document
    pub fn register(&mut self, document: &Document) {
        let set = self.ids.entry(document.level()).or_default();
        for id in document.entity_ids() {
            set.insert(id.to_string());
        }
    }

    /// Whether `id` is known at `level`
    #[inline]
    #[must_use]
    pub fn contains(&self, level: Level, id: &str) -> bool {
        self.ids.get(&level).is_some_and(|set| set.contains(id))
    }

    /// Whether `id` is known at `level` or any level above it
    ///
    /// Relation endpoints may point upward in the hierarchy, so they
    /// resolve against the union of every level registered so far, down
    /// to and including the current one.
    #[must_use]
    pub fn contains_up_to(&self, level: Level, id: &str) -> bool {
        Level::ALL
            .into_iter()
            .take_while(|l| *l <= level)
            .any(|l| self.contains(l, id))
    }

    /// All ids registered at `level`
    #[must_use]
    pub fn at(&self, level: Level) -> impl Iterator<Item = &str> {
        self.ids
            .get(&level)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

/// Validates references within and across documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceGraphChecker;

impl ReferenceGraphChecker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check one document against the ids known so far
    ///
    /// `known` must already contain the ids of all ancestor levels; the
    /// caller registers this document's own ids before calling so that
    /// same-level relation targets resolve.
    #[must_use]
    pub fn check(&self, document: &Document, known: &KnownIds) -> Vec<Finding> {
        let mut findings = Vec::new();
        let level = document.level();

        match document {
            Document::Inventory(_) => {}
            Document::Systems(doc) => {
                for (idx, system) in doc.systems.iter().enumerate() {
                    for (ridx, repo) in system.repositories.iter().enumerate() {
                        if !known.contains(Level::Inventory, repo) {
                            findings.push(
                                Finding::warning(
                                    level,
                                    format!("systems[{idx}].repositories[{ridx}]"),
                                    format!("repository not found in inventory: {repo}"),
                                )
                                .with_entity(system.id.clone()),
                            );
                        }
                    }
                }
            }
            Document::Containers(_) | Document::Components(_) => {}
        }

        for (idx, entity) in document.entities().iter().enumerate() {
            if let Some((field, parent_id)) = entity.parent_ref() {
                let parent_level = level.parent().unwrap_or(Level::Inventory);
                if !known.contains(parent_level, parent_id) {
                    findings.push(
                        Finding::blocking(
                            level,
                            format!("{}[{idx}].{field}", level.array_field()),
                            format!(
                                "{field} references unknown {}: {parent_id}",
                                parent_level.code()
                            ),
                        )
                        .with_entity(entity.id().to_string()),
                    );
                }
            }
            self.check_relations(*entity, idx, known, &mut findings);
        }

        findings.extend(detect_cycles(document));

        debug!(
            level = %level,
            findings = findings.len(),
            "reference graph checked"
        );
        findings
    }

    /// Check that orphaned parents get flagged: every id at `parent_level`
    /// should be referenced by at least one entity in `document`
    #[must_use]
    pub fn check_coverage(&self, document: &Document, known: &KnownIds) -> Vec<Finding> {
        let level = document.level();
        let Some(parent_level) = level.parent() else {
            return Vec::new();
        };
        if parent_level == Level::Inventory {
            return Vec::new();
        }

        let referenced: BTreeSet<&str> = document
            .entities()
            .iter()
            .filter_map(|e| e.parent_ref().map(|(_, id)| id))
            .collect();

        known
            .at(parent_level)
            .filter(|id| !referenced.contains(id))
            .map(|id| {
                Finding::warning(
                    level,
                    level.array_field(),
                    format!("{} {id} has no {} entries", parent_level.code(), level.code()),
                )
            })
            .collect()
    }

    fn check_relations(
        &self,
        entity: EntityRef<'_>,
        idx: usize,
        known: &KnownIds,
        findings: &mut Vec<Finding>,
    ) {
        let level = entity.level();
        for (ridx, relation) in entity.relations().iter().enumerate() {
            let base = format!("{}[{idx}].relations[{ridx}]", level.array_field());

            if relation.source == relation.target {
                findings.push(
                    Finding::blocking(
                        level,
                        format!("{base}.target"),
                        format!("relation {} is self-referencing: {}", relation.id, relation.source),
                    )
                    .with_entity(entity.id().to_string()),
                );
                continue;
            }

            if relation.source != entity.id() && !known.contains_up_to(level, &relation.source) {
                findings.push(
                    Finding::blocking(
                        level,
                        format!("{base}.source"),
                        format!("relation source not found: {}", relation.source),
                    )
                    .with_entity(entity.id().to_string()),
                );
            }

            if !relation.external && !known.contains_up_to(level, &relation.target) {
                findings.push(
                    Finding::blocking(
                        level,
                        format!("{base}.target"),
                        format!(
                            "relation target not found: {} (mark external relations with external: true)",
                            relation.target
                        ),
                    )
                    .with_entity(entity.id().to_string()),
                );
            }
        }
    }
}

/// Depth-first cycle detection over the intra-document relation graph
///
/// Cycles between entities are legal architecture (mutual calls exist in
/// the wild) but worth surfacing, so they warn rather than block.
fn detect_cycles(document: &Document) -> Vec<Finding> {
    let level = document.level();
    let mut edges: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let ids: BTreeSet<&str> = document.entity_ids().into_iter().collect();

    for entity in document.entities() {
        for relation in entity.relations() {
            if ids.contains(relation.source.as_str()) && ids.contains(relation.target.as_str()) {
                edges
                    .entry(relation.source.as_str())
                    .or_default()
                    .push(relation.target.as_str());
            }
        }
    }

    let mut findings = Vec::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();

    for &start in ids.iter() {
        if visited.contains(start) {
            continue;
        }
        let mut stack = vec![(start, 0usize)];
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: BTreeSet<&str> = BTreeSet::new();

        while let Some((node, child)) = stack.pop() {
            if child == 0 {
                visited.insert(node);
                path.push(node);
                on_path.insert(node);
            }
            let children = edges.get(node).map_or(&[][..], Vec::as_slice);
            if child < children.len() {
                stack.push((node, child + 1));
                let next = children[child];
                if on_path.contains(next) {
                    let mut cycle: Vec<&str> = path
                        .iter()
                        .skip_while(|n| **n != next)
                        .copied()
                        .collect();
                    cycle.push(next);
                    findings.push(Finding::warning(
                        level,
                        level.array_field(),
                        format!("relation cycle detected: {}", cycle.join(" -> ")),
                    ));
                } else if !visited.contains(next) {
                    stack.push((next, 0));
                }
            } else {
                path.pop();
                on_path.remove(node);
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdoc_model::{ContainerDocument, InventoryDocument, SystemDocument};
    use serde_json::json;

    fn inventory() -> Document {
        let doc: InventoryDocument = serde_json::from_value(json!({
            "metadata": {"schema_version": "1.0.0", "generator": "explorer",
                         "timestamp": "2026-03-01T12:00:00.000Z"},
            "repositories": [
                {"name": "shop-frontend", "path": "/srv/repos/shop-frontend"},
                {"name": "shop-backend", "path": "/srv/repos/shop-backend"}
            ]
        }))
        .unwrap();
        Document::Inventory(doc)
    }

    fn systems(relations: serde_json::Value) -> Document {
        let doc: SystemDocument = serde_json::from_value(json!({
            "metadata": {"schema_version": "1.0.0", "generator": "explorer",
                         "timestamp": "2026-03-01T12:00:01.000Z",
                         "parent_timestamp": "2026-03-01T12:00:00.000Z"},
            "systems": [
                {"id": "shop", "name": "Shop", "type": "web-application",
                 "description": "customer-facing storefront",
                 "repositories": ["shop-frontend"], "relations": relations.clone()},
                {"id": "billing", "name": "Billing", "type": "internal-service",
                 "description": "invoicing and payment collection",
                 "repositories": ["shop-backend"]}
            ]
        }))
        .unwrap();
        Document::Systems(doc)
    }

    fn containers(system_id: &str, relations: serde_json::Value) -> Document {
        let doc: ContainerDocument = serde_json::from_value(json!({
            "metadata": {"schema_version": "1.0.0", "generator": "explorer",
                         "timestamp": "2026-03-01T12:00:02.000Z",
                         "parent_timestamp": "2026-03-01T12:00:01.000Z"},
            "containers": [
                {"id": "shop-web", "name": "Shop Web", "type": "spa",
                 "system_id": system_id, "description": "browser frontend",
                 "technology": {"primary_language": "typescript", "framework": "react"},
                 "runtime": {"environment": "browser", "platform": "web", "containerized": false},
                 "relations": relations}
            ]
        }))
        .unwrap();
        Document::Containers(doc)
    }

    fn known_for(docs: &[&Document]) -> KnownIds {
        let mut known = KnownIds::new();
        for doc in docs {
            known.register(doc);
        }
        known
    }

    #[test]
    fn resolvable_references_produce_no_findings() {
        let inv = inventory();
        let sys = systems(json!([
            {"id": "rel-1", "source": "shop", "target": "billing",
             "type": "http-rest", "description": "invoice lookups"}
        ]));
        let known = known_for(&[&inv, &sys]);
        let findings = ReferenceGraphChecker::new().check(&sys, &known);
        assert!(findings.is_empty(), "findings: {findings:?}");
    }

    #[test]
    fn dangling_target_blocks_unless_external() {
        let inv = inventory();
        let sys = systems(json!([
            {"id": "rel-1", "source": "shop", "target": "stripe",
             "type": "external-api", "description": "card processing"}
        ]));
        let known = known_for(&[&inv, &sys]);
        let findings = ReferenceGraphChecker::new().check(&sys, &known);
        assert!(findings.iter().any(|f| f.is_blocking()));

        let sys = systems(json!([
            {"id": "rel-1", "source": "shop", "target": "stripe",
             "type": "external-api", "description": "card processing", "external": true}
        ]));
        let known = known_for(&[&inv, &sys]);
        let findings = ReferenceGraphChecker::new().check(&sys, &known);
        assert!(findings.is_empty(), "findings: {findings:?}");
    }

    #[test]
    fn relation_target_at_an_ancestor_level_resolves() {
        let inv = inventory();
        let sys = systems(json!([]));
        let cont = containers(
            "shop",
            json!([
                {"id": "rel-1", "source": "shop-web", "target": "billing",
                 "type": "http-rest", "description": "invoice lookups"}
            ]),
        );
        let known = known_for(&[&inv, &sys, &cont]);
        let findings = ReferenceGraphChecker::new().check(&cont, &known);
        assert!(findings.is_empty(), "findings: {findings:?}");

        // an id nobody registered still blocks at the lower level
        let cont = containers(
            "shop",
            json!([
                {"id": "rel-1", "source": "shop-web", "target": "warehouse",
                 "type": "http-rest", "description": "stock lookups"}
            ]),
        );
        let known = known_for(&[&inv, &sys, &cont]);
        let findings = ReferenceGraphChecker::new().check(&cont, &known);
        assert!(findings
            .iter()
            .any(|f| f.is_blocking() && f.path.ends_with("relations[0].target")));
    }

    #[test]
    fn self_referencing_relation_blocks() {
        let inv = inventory();
        let sys = systems(json!([
            {"id": "rel-1", "source": "shop", "target": "shop",
             "type": "calls", "description": "recursive self-call"}
        ]));
        let known = known_for(&[&inv, &sys]);
        let findings = ReferenceGraphChecker::new().check(&sys, &known);
        assert!(findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("self-referencing")));
    }

    #[test]
    fn unknown_parent_reference_blocks() {
        let inv = inventory();
        let sys = systems(json!([]));
        let cont = containers("warehouse", json!([]));
        let known = known_for(&[&inv, &sys, &cont]);
        let findings = ReferenceGraphChecker::new().check(&cont, &known);
        assert!(findings
            .iter()
            .any(|f| f.is_blocking() && f.message.contains("warehouse")));
    }

    #[test]
    fn unknown_repository_reference_warns() {
        let inv = inventory();
        let mut known = KnownIds::new();
        known.register(&inv);
        let sys = systems(json!([]));
        known.register(&sys);

        let doc: SystemDocument = serde_json::from_value(json!({
            "metadata": {"schema_version": "1.0.0", "generator": "explorer",
                         "timestamp": "2026-03-01T12:00:01.000Z",
                         "parent_timestamp": "2026-03-01T12:00:00.000Z"},
            "systems": [{"id": "shop", "name": "Shop", "type": "web-application",
                         "description": "customer-facing storefront",
                         "repositories": ["missing-repo"]}]
        }))
        .unwrap();
        let doc = Document::Systems(doc);
        let findings = ReferenceGraphChecker::new().check(&doc, &known);
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_blocking());
        assert!(findings[0].message.contains("missing-repo"));
    }

    #[test]
    fn systems_without_containers_warn() {
        let inv = inventory();
        let sys = systems(json!([]));
        let cont = containers("shop", json!([]));
        let known = known_for(&[&inv, &sys, &cont]);
        let findings = ReferenceGraphChecker::new().check_coverage(&cont, &known);
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_blocking());
        assert!(findings[0].message.contains("billing"));
    }

    #[test]
    fn relation_cycle_warns() {
        let inv = inventory();
        let doc: SystemDocument = serde_json::from_value(json!({
            "metadata": {"schema_version": "1.0.0", "generator": "explorer",
                         "timestamp": "2026-03-01T12:00:01.000Z",
                         "parent_timestamp": "2026-03-01T12:00:00.000Z"},
            "systems": [
                {"id": "a", "name": "A", "type": "api-service", "description": "service a",
                 "repositories": ["shop-frontend"],
                 "relations": [{"id": "rel-1", "source": "a", "target": "b",
                                "type": "calls", "description": "forward call"}]},
                {"id": "b", "name": "B", "type": "api-service", "description": "service b",
                 "repositories": ["shop-backend"],
                 "relations": [{"id": "rel-2", "source": "b", "target": "a",
                                "type": "calls", "description": "callback channel"}]}
            ]
        }))
        .unwrap();
        let doc = Document::Systems(doc);
        let known = known_for(&[&inv, &doc]);
        let findings = ReferenceGraphChecker::new().check(&doc, &known);
        let cycles: Vec<_> = findings
            .iter()
            .filter(|f| f.message.contains("cycle"))
            .collect();
        assert!(!cycles.is_empty());
        assert!(cycles.iter().all(|f| !f.is_blocking()));
    }
}
