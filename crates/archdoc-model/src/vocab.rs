//! Controlled vocabularies
//!
//! Allowed entity types, observation categories and relation types per
//! level. Membership failures are blocking schema findings; the lists are
//! closed on purpose so that new vocabulary lands here, not in callers.

use crate::level::Level;

/// Allowed `type` values for C1 systems
pub const SYSTEM_TYPES: &[&str] = &[
    "web-application",
    "mobile-application",
    "desktop-application",
    "api-service",
    "database",
    "message-broker",
    "cache",
    "cdn",
    "external-service",
    "user-facing",
    "internal-service",
    "data-store",
    "integration",
    "other",
];

/// Allowed `type` values for C2 containers
pub const CONTAINER_TYPES: &[&str] = &[
    "web-server",
    "app-server",
    "database",
    "cache",
    "message-broker",
    "spa",
    "api",
    "worker",
    "file-storage",
    "web-application",
    "application-server",
    "spa-client",
    "mobile-app",
    "desktop-app",
];

/// Allowed `type` values for C3 components
pub const COMPONENT_TYPES: &[&str] = &[
    "service",
    "controller",
    "repository",
    "model",
    "utility",
    "middleware",
    "view",
    "component",
    "config",
    "facade",
    "factory",
    "adapter",
];

/// Allowed runtime environments for containers
pub const RUNTIME_ENVIRONMENTS: &[&str] = &["browser", "server", "cloud", "edge", "mobile"];

/// Allowed package manifest types in the inventory
pub const MANIFEST_TYPES: &[&str] = &[
    "npm",
    "composer",
    "cargo",
    "go-mod",
    "gradle",
    "maven",
    "requirements-txt",
    "pyproject-toml",
    "gemfile",
    "unknown",
];

const SYSTEM_OBSERVATION_CATEGORIES: &[&str] = &[
    "architectural",
    "technical",
    "quality",
    "security",
    "performance",
    "scalability",
    "maintainability",
    "integration",
    "deployment",
    "data",
    "testing",
    "documentation",
];

const CONTAINER_OBSERVATION_CATEGORIES: &[&str] = &[
    "architectural",
    "technical",
    "quality",
    "security",
    "performance",
    "scalability",
    "maintainability",
    "integration",
    "deployment",
    "data",
    "testing",
    "documentation",
    "technology",
    "runtime",
    "communication",
    "data-storage",
    "authentication",
    "configuration",
    "monitoring",
    "dependencies",
];

const COMPONENT_OBSERVATION_CATEGORIES: &[&str] = &[
    "design-patterns",
    "code-quality",
    "dependencies",
    "testing",
    "complexity",
    "maintainability",
    "code-structure",
    "error-handling",
    "performance",
    "security",
    "documentation",
    "coupling",
    "cohesion",
];

const SYSTEM_RELATION_TYPES: &[&str] = &[
    "http-rest",
    "http-graphql",
    "http-soap",
    "grpc",
    "websocket",
    "message-queue",
    "event-stream",
    "database-query",
    "database-write",
    "file-io",
    "dependency",
    "inheritance",
    "composition",
    "aggregation",
    "uses",
    "calls",
    "contains",
    "http",
    "https",
    "graphql",
    "rpc",
    "database-connection",
    "file-transfer",
    "authentication",
    "soap",
    "smtp",
    "external-api",
];

const CONTAINER_RELATION_TYPES: &[&str] = &[
    "http-rest",
    "http-graphql",
    "grpc",
    "websocket",
    "database-connection",
    "database-query",
    "database-write",
    "database-read-write",
    "cache-access",
    "cache-read",
    "cache-write",
    "cache-read-write",
    "message-publish",
    "message-subscribe",
    "message-consumer",
    "file-read",
    "file-write",
    "cdn-fetch",
    "stream",
    "dependency",
    "uses",
    "calls",
    "contains",
];

const COMPONENT_RELATION_TYPES: &[&str] = &[
    "dependency",
    "interface-implementation",
    "event-publisher",
    "event-subscriber",
    "uses",
    "calls",
    "imports",
    "injects",
    "observes",
    "delegates",
    "provides",
    "consumes",
    "inherits",
    "implements",
    "composes",
    "aggregates",
    "notifies",
    "extends",
];

/// Allowed entity `type` values for a level
///
/// The inventory has no typed entities; its slice is empty.
#[must_use]
pub fn entity_types(level: Level) -> &'static [&'static str] {
    match level {
        Level::Inventory => &[],
        Level::System => SYSTEM_TYPES,
        Level::Container => CONTAINER_TYPES,
        Level::Component => COMPONENT_TYPES,
    }
}

/// Allowed observation categories for a level
#[must_use]
pub fn observation_categories(level: Level) -> &'static [&'static str] {
    match level {
        Level::Inventory => &[],
        Level::System => SYSTEM_OBSERVATION_CATEGORIES,
        Level::Container => CONTAINER_OBSERVATION_CATEGORIES,
        Level::Component => COMPONENT_OBSERVATION_CATEGORIES,
    }
}

/// Allowed relation types for a level
#[must_use]
pub fn relation_types(level: Level) -> &'static [&'static str] {
    match level {
        Level::Inventory => &[],
        Level::System => SYSTEM_RELATION_TYPES,
        Level::Container => CONTAINER_RELATION_TYPES,
        Level::Component => COMPONENT_RELATION_TYPES,
    }
}
