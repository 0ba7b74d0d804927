//! Schema conformance checking
//!
//! One validator per document level, expressed as exhaustive field checks
//! over raw `serde_json::Value` input. Unknown fields are never rejected
//! (forward compatibility); missing required fields, wrong primitive
//! types, invalid enum values and malformed id patterns are blocking.
//! When no blocking finding was raised the typed [`Document`] is
//! materialized for the downstream stages.

mod components;
mod containers;
mod inventory;
mod systems;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use archdoc_model::{
    vocab, Document, Finding, Level, SchemaVersion, Severity, MIN_DESCRIPTION_LEN,
    SUPPORTED_SCHEMA_VERSION,
};

/// Entity id pattern: kebab-case, `^[a-z0-9]+(-[a-z0-9]+)*$`
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static pattern"));

/// Result of one schema validation pass
#[derive(Debug)]
pub struct ValidationOutcome {
    /// Ordered findings, blocking and warning
    pub findings: Vec<Finding>,
    /// Typed document, present only when nothing blocking was found
    pub document: Option<Document>,
}

impl ValidationOutcome {
    /// Whether any blocking finding was raised
    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.findings.iter().any(Finding::is_blocking)
    }
}

/// Checks one raw JSON document against its level's structural schema
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator {
    supported: SchemaVersion,
}

impl SchemaValidator {
    /// Validator for the schema version this pipeline supports
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: SUPPORTED_SCHEMA_VERSION,
        }
    }

    /// Validate a parsed JSON document of the given level
    #[must_use]
    pub fn validate(&self, level: Level, raw: &Value) -> ValidationOutcome {
        let mut findings = Vec::new();

        let Some(root) = raw.as_object() else {
            findings.push(Finding::blocking(level, "$", "document root must be an object"));
            return ValidationOutcome {
                findings,
                document: None,
            };
        };

        let mut checks = Checks::new(level, self.supported, &mut findings);
        checks.check_metadata(root);

        let field = level.array_field();
        if let Some(items) = checks.require_array(root, "", field) {
            if items.is_empty() {
                checks.blocking(field, format!("no entries found ({field} array is empty)"));
            } else {
                let items = items.clone();
                match level {
                    Level::Inventory => inventory::check_entities(&mut checks, &items),
                    Level::System => systems::check_entities(&mut checks, &items),
                    Level::Container => containers::check_entities(&mut checks, &items),
                    Level::Component => components::check_entities(&mut checks, &items),
                }
            }
        }

        let document = if findings.iter().any(Finding::is_blocking) {
            None
        } else {
            materialize(level, raw, &mut findings)
        };

        ValidationOutcome { findings, document }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn materialize(level: Level, raw: &Value, findings: &mut Vec<Finding>) -> Option<Document> {
    let result = match level {
        Level::Inventory => serde_json::from_value(raw.clone()).map(Document::Inventory),
        Level::System => serde_json::from_value(raw.clone()).map(Document::Systems),
        Level::Container => serde_json::from_value(raw.clone()).map(Document::Containers),
        Level::Component => serde_json::from_value(raw.clone()).map(Document::Components),
    };
    match result {
        Ok(document) => Some(document),
        Err(err) => {
            findings.push(Finding::blocking(
                level,
                "$",
                format!("document failed to materialize: {err}"),
            ));
            None
        }
    }
}

/// Shared field-checking helpers carrying the finding sink
pub(crate) struct Checks<'a> {
    level: Level,
    supported: SchemaVersion,
    entity: Option<String>,
    findings: &'a mut Vec<Finding>,
}

impl<'a> Checks<'a> {
    fn new(level: Level, supported: SchemaVersion, findings: &'a mut Vec<Finding>) -> Self {
        Self {
            level,
            supported,
            entity: None,
            findings,
        }
    }

    pub(crate) fn set_entity(&mut self, id: &str) {
        self.entity = Some(id.to_string());
    }

    pub(crate) fn clear_entity(&mut self) {
        self.entity = None;
    }

    pub(crate) fn blocking(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let mut finding = Finding::blocking(self.level, path, message);
        if let Some(entity) = &self.entity {
            finding = finding.with_entity(entity.clone());
        }
        self.findings.push(finding);
    }

    pub(crate) fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let mut finding = Finding::warning(self.level, path, message);
        if let Some(entity) = &self.entity {
            finding = finding.with_entity(entity.clone());
        }
        self.findings.push(finding);
    }

    fn join(base: &str, key: &str) -> String {
        if base.is_empty() {
            key.to_string()
        } else {
            format!("{base}.{key}")
        }
    }

    pub(crate) fn require_str<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v str> {
        let path = Self::join(base, key);
        match obj.get(key) {
            None => {
                self.blocking(path, format!("missing required field '{key}'"));
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.blocking(path, format!("field '{key}' must be a string"));
                None
            }
        }
    }

    pub(crate) fn optional_str<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v str> {
        match obj.get(key) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.blocking(
                    Self::join(base, key),
                    format!("field '{key}' must be a string"),
                );
                None
            }
        }
    }

    pub(crate) fn require_obj<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        let path = Self::join(base, key);
        match obj.get(key) {
            None => {
                self.blocking(path, format!("missing required field '{key}'"));
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.blocking(path, format!("field '{key}' must be an object"));
                None
            }
        }
    }

    pub(crate) fn optional_obj<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        match obj.get(key) {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.blocking(
                    Self::join(base, key),
                    format!("field '{key}' must be an object"),
                );
                None
            }
        }
    }

    pub(crate) fn require_array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v Vec<Value>> {
        let path = Self::join(base, key);
        match obj.get(key) {
            None => {
                self.blocking(path, format!("missing required field '{key}'"));
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.blocking(path, format!("field '{key}' must be an array"));
                None
            }
        }
    }

    pub(crate) fn optional_array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<&'v Vec<Value>> {
        match obj.get(key) {
            None => None,
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.blocking(
                    Self::join(base, key),
                    format!("field '{key}' must be an array"),
                );
                None
            }
        }
    }

    pub(crate) fn require_bool(
        &mut self,
        obj: &Map<String, Value>,
        base: &str,
        key: &str,
    ) -> Option<bool> {
        let path = Self::join(base, key);
        match obj.get(key) {
            None => {
                self.blocking(path, format!("missing required field '{key}'"));
                None
            }
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.blocking(path, format!("field '{key}' must be a boolean"));
                None
            }
        }
    }

    /// Kebab-case id pattern check
    pub(crate) fn check_id(&mut self, id: &str, path: &str) {
        if !ID_PATTERN.is_match(id) {
            self.blocking(
                path,
                format!("invalid id format: {id} (must match ^[a-z0-9]+(-[a-z0-9]+)*$)"),
            );
        }
    }

    /// Closed-vocabulary membership check (blocking on miss)
    pub(crate) fn check_enum(&mut self, value: &str, allowed: &[&str], path: &str, what: &str) {
        if !allowed.contains(&value) {
            self.blocking(path, format!("invalid {what}: {value}"));
        }
    }

    /// Required description with a short-description lint
    pub(crate) fn check_description(&mut self, obj: &Map<String, Value>, base: &str) {
        if let Some(description) = self.require_str(obj, base, "description") {
            if description.len() < MIN_DESCRIPTION_LEN {
                let text = format!(
                    "short description (< {MIN_DESCRIPTION_LEN} chars)"
                );
                self.warning(Self::join(base, "description"), text);
            }
        }
    }

    /// ISO-8601 timestamp with a `Z` suffix; non-millisecond fractions warn
    pub(crate) fn check_timestamp_value(&mut self, s: &str, path: &str) {
        if !s.ends_with('Z') {
            self.blocking(path, format!("timestamp must be UTC with a Z suffix: {s}"));
            return;
        }
        if chrono::DateTime::parse_from_rfc3339(s).is_err() {
            self.blocking(path, format!("invalid timestamp format: {s} (expected ISO 8601)"));
            return;
        }
        if fractional_digits(s) != 3 {
            self.warning(
                path,
                format!("timestamp should carry millisecond precision: {s}"),
            );
        }
    }

    fn check_metadata(&mut self, root: &Map<String, Value>) {
        let Some(metadata) = self.require_obj(root, "", "metadata") else {
            return;
        };

        if let Some(version) = self.require_str(metadata, "metadata", "schema_version") {
            match version.parse::<SchemaVersion>() {
                Err(_) => self.blocking(
                    "metadata.schema_version",
                    format!("invalid schema_version format: {version} (expected semver)"),
                ),
                Ok(parsed) => {
                    if parsed.major != self.supported.major {
                        self.blocking(
                            "metadata.schema_version",
                            format!(
                                "unsupported schema major version: {parsed} (supported: {})",
                                self.supported
                            ),
                        );
                    } else if parsed != self.supported {
                        self.warning(
                            "metadata.schema_version",
                            format!(
                                "schema version {parsed} differs from supported {}",
                                self.supported
                            ),
                        );
                    }
                }
            }
        }

        self.require_str(metadata, "metadata", "generator");

        if let Some(timestamp) = self.require_str(metadata, "metadata", "timestamp") {
            let timestamp = timestamp.to_string();
            self.check_timestamp_value(&timestamp, "metadata.timestamp");
        }

        if self.level.parent().is_some() {
            if let Some(parent) = self.require_str(metadata, "metadata", "parent_timestamp") {
                let parent = parent.to_string();
                self.check_timestamp_value(&parent, "metadata.parent_timestamp");
            }
        } else if metadata.contains_key("parent_timestamp") {
            self.warning(
                "metadata.parent_timestamp",
                "inventory documents have no parent; parent_timestamp is ignored",
            );
        }
    }

    /// Shared observation checks for one entity
    pub(crate) fn check_observations(&mut self, entity: &Map<String, Value>, base: &str) {
        let Some(observations) = self.optional_array(entity, base, "observations") else {
            self.warning(
                Self::join(base, "observations"),
                "no observations; add observations to document entity characteristics",
            );
            return;
        };
        if observations.is_empty() {
            self.warning(
                Self::join(base, "observations"),
                "no observations; add observations to document entity characteristics",
            );
            return;
        }

        let categories = vocab::observation_categories(self.level);
        let mut seen_ids = BTreeSet::new();
        let observations = observations.clone();

        for (idx, item) in observations.iter().enumerate() {
            let obs_base = format!("{base}.observations[{idx}]");
            let Some(obs) = item.as_object() else {
                self.blocking(obs_base, "observation must be an object");
                continue;
            };

            if let Some(id) = self.require_str(obs, &obs_base, "id") {
                if !id.starts_with("obs-") {
                    let message = format!("invalid observation id: {id} (must match obs-*)");
                    self.blocking(format!("{obs_base}.id"), message);
                }
                if !seen_ids.insert(id.to_string()) {
                    let message = format!("duplicate observation id: {id}");
                    self.blocking(format!("{obs_base}.id"), message);
                }
            }

            if let Some(category) = self.require_str(obs, &obs_base, "category") {
                let category = category.to_string();
                self.check_enum(
                    &category,
                    categories,
                    &format!("{obs_base}.category"),
                    "observation category",
                );
            }

            let severity = self
                .optional_str(obs, &obs_base, "severity")
                .map(str::to_string);
            if let Some(severity) = &severity {
                self.check_enum(
                    severity,
                    &["info", "warning", "critical"],
                    &format!("{obs_base}.severity"),
                    "severity",
                );
            }

            self.check_description(obs, &obs_base);

            if let Some(evidence) = self.optional_obj(obs, &obs_base, "evidence") {
                let evidence = evidence.clone();
                let ev_base = format!("{obs_base}.evidence");
                if let Some(kind) = self.require_str(&evidence, &ev_base, "type") {
                    let kind = kind.to_string();
                    self.check_enum(
                        &kind,
                        &["file", "code", "config", "metric", "pattern"],
                        &format!("{ev_base}.type"),
                        "evidence type",
                    );
                }
                self.require_str(&evidence, &ev_base, "location");
                self.optional_str(&evidence, &ev_base, "snippet");
            }

            if let Some(tags) = self.optional_array(obs, &obs_base, "tags") {
                if tags.iter().any(|t| !t.is_string()) {
                    self.blocking(format!("{obs_base}.tags"), "tags must be strings");
                }
            }

            // Policy: critical observations should carry a remediation hint
            if severity.as_deref() == Some(Severity::Critical.as_str())
                && !obs.contains_key("recommendation")
            {
                self.warning(
                    format!("{obs_base}.recommendation"),
                    "critical observation without a recommendation",
                );
            }
        }
    }

    /// Shared relation checks for one entity
    pub(crate) fn check_relations(&mut self, entity: &Map<String, Value>, base: &str) {
        let Some(relations) = self.optional_array(entity, base, "relations") else {
            self.warning(
                Self::join(base, "relations"),
                "no relations; add relations to document entity dependencies",
            );
            return;
        };
        if relations.is_empty() {
            self.warning(
                Self::join(base, "relations"),
                "no relations; add relations to document entity dependencies",
            );
            return;
        }

        let types = vocab::relation_types(self.level);
        let mut seen_ids = BTreeSet::new();
        let relations = relations.clone();

        for (idx, item) in relations.iter().enumerate() {
            let rel_base = format!("{base}.relations[{idx}]");
            let Some(rel) = item.as_object() else {
                self.blocking(rel_base, "relation must be an object");
                continue;
            };

            if let Some(id) = self.require_str(rel, &rel_base, "id") {
                if !id.starts_with("rel-") {
                    let message = format!("invalid relation id: {id} (must match rel-*)");
                    self.blocking(format!("{rel_base}.id"), message);
                }
                if !seen_ids.insert(id.to_string()) {
                    let message = format!("duplicate relation id: {id}");
                    self.blocking(format!("{rel_base}.id"), message);
                }
            }

            self.require_str(rel, &rel_base, "source");
            self.require_str(rel, &rel_base, "target");

            if let Some(kind) = self.require_str(rel, &rel_base, "type") {
                let kind = kind.to_string();
                self.check_enum(&kind, types, &format!("{rel_base}.type"), "relation type");
            }

            if let Some(direction) = self.optional_str(rel, &rel_base, "direction") {
                let direction = direction.to_string();
                self.check_enum(
                    &direction,
                    &["unidirectional", "bidirectional"],
                    &format!("{rel_base}.direction"),
                    "direction",
                );
            }

            self.optional_str(rel, &rel_base, "protocol");

            if let Some(external) = rel.get("external") {
                if !external.is_boolean() {
                    self.blocking(
                        format!("{rel_base}.external"),
                        "field 'external' must be a boolean",
                    );
                }
            }

            if let Some(metadata) = self.optional_obj(rel, &rel_base, "metadata") {
                if metadata.values().any(|v| !v.is_string()) {
                    self.blocking(
                        format!("{rel_base}.metadata"),
                        "relation metadata values must be strings",
                    );
                }
            }

            self.check_description(rel, &rel_base);
        }
    }
}

fn fractional_digits(timestamp: &str) -> usize {
    match timestamp.find('.') {
        None => 0,
        Some(dot) => timestamp[dot + 1..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count(),
    }
}
