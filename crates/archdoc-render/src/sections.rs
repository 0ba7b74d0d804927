//! Section renderers
//!
//! Each fixed section is rendered by one function returning a complete
//! `## Heading` block. Section order per level is the contract the merge
//! layer relies on: manual sections are re-anchored against these names.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use archdoc_model::{
    Component, Container, Direction, EntityRef, Level, Observation, Relation, System,
};

/// Fixed section headings, in render order, for a level
#[must_use]
pub fn fixed_sections(level: Level) -> &'static [&'static str] {
    match level {
        Level::Inventory => &[],
        Level::System => &["Overview", "Repositories", "Observations", "Relations", "Metadata"],
        Level::Container => &[
            "Overview",
            "Technology Stack",
            "Runtime Environment",
            "Observations",
            "Relations",
            "Metadata",
        ],
        Level::Component => &[
            "Overview",
            "Code Structure",
            "Design Patterns",
            "Metrics",
            "Observations",
            "Relations",
            "Metadata",
        ],
    }
}

pub(crate) fn overview(entity: EntityRef<'_>) -> String {
    let mut out = String::from("## Overview\n\n");
    let description = match entity {
        EntityRef::System(s) => &s.description,
        EntityRef::Container(c) => &c.description,
        EntityRef::Component(c) => &c.description,
    };
    let _ = writeln!(out, "{description}\n");
    let _ = writeln!(out, "- **Type:** `{}`", entity.kind());
    if let Some((field, parent)) = entity.parent_ref() {
        let label = match field {
            "system_id" => "System",
            _ => "Container",
        };
        let _ = writeln!(out, "- **{label}:** `{parent}`");
    }
    out.push('\n');
    out
}

pub(crate) fn repositories(system: &System) -> String {
    let mut out = String::from("## Repositories\n\n");
    for repo in &system.repositories {
        let _ = writeln!(out, "- `{repo}`");
    }
    out.push('\n');
    out
}

pub(crate) fn technology(container: &Container) -> String {
    let tech = &container.technology;
    let mut out = String::from("## Technology Stack\n\n");
    let _ = writeln!(out, "- **Primary language:** {}", tech.primary_language);
    let _ = writeln!(out, "- **Framework:** {}", tech.framework);
    if !tech.libraries.is_empty() {
        out.push('\n');
        out.push_str("| Library | Version | Purpose |\n");
        out.push_str("| --- | --- | --- |\n");
        for library in &tech.libraries {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                cell(&library.name),
                cell(library.version.as_deref().unwrap_or("-")),
                cell(library.purpose.as_deref().unwrap_or("-")),
            );
        }
    }
    out.push('\n');
    out
}

pub(crate) fn runtime(container: &Container) -> String {
    let runtime = &container.runtime;
    let mut out = String::from("## Runtime Environment\n\n");
    let _ = writeln!(out, "- **Environment:** {}", runtime.environment);
    let _ = writeln!(out, "- **Platform:** {}", runtime.platform);
    if runtime.containerized {
        let technology = runtime.container_technology.as_deref().unwrap_or("unknown");
        let _ = writeln!(out, "- **Containerized:** yes ({technology})");
    } else {
        let _ = writeln!(out, "- **Containerized:** no");
    }
    out.push('\n');
    out
}

pub(crate) fn code_structure(component: &Component) -> String {
    let mut out = String::from("## Code Structure\n\n");
    let Some(structure) = &component.structure else {
        out.push_str("_No structure recorded._\n\n");
        return out;
    };
    let _ = writeln!(out, "- **Path:** `{}`", structure.path);
    let _ = writeln!(out, "- **Language:** {}", structure.language);
    if !structure.files.is_empty() {
        out.push('\n');
        out.push_str("| File | Lines | Type |\n");
        out.push_str("| --- | --- | --- |\n");
        for file in &structure.files {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} |",
                cell(&file.path),
                file.lines,
                cell(file.kind.as_deref().unwrap_or("-")),
            );
        }
    }
    if !structure.exports.is_empty() {
        out.push('\n');
        let names: Vec<String> = structure
            .exports
            .iter()
            .map(|e| format!("`{}`", e.name))
            .collect();
        let _ = writeln!(out, "**Exports:** {}", names.join(", "));
    }
    out.push('\n');
    out
}

pub(crate) fn design_patterns(component: &Component) -> String {
    let mut out = String::from("## Design Patterns\n\n");
    if component.patterns.is_empty() {
        out.push_str("_No patterns recorded._\n\n");
        return out;
    }
    for pattern in &component.patterns {
        let mut line = format!("- **{}**", pattern.name);
        if let Some(category) = &pattern.category {
            let _ = write!(line, " ({category})");
        }
        if let Some(description) = &pattern.description {
            let _ = write!(line, ": {description}");
        }
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');
    out
}

pub(crate) fn metrics(component: &Component) -> String {
    let mut out = String::from("## Metrics\n\n");
    let Some(metrics) = &component.metrics else {
        out.push_str("_No metrics recorded._\n\n");
        return out;
    };
    if let Some(loc) = metrics.lines_of_code {
        let _ = writeln!(out, "- **Lines of code:** {loc}");
    }
    if let Some(complexity) = metrics.cyclomatic_complexity {
        let _ = writeln!(out, "- **Cyclomatic complexity:** {complexity}");
    }
    if let Some(coverage) = metrics.test_coverage {
        let _ = writeln!(out, "- **Test coverage:** {coverage}%");
    }
    out.push('\n');
    out
}

/// Observations grouped by category (alphabetical), ordered within each
/// category by severity (critical first) then id
pub(crate) fn observations(entity: EntityRef<'_>) -> String {
    let mut out = String::from("## Observations\n\n");
    let all = entity.observations();
    if all.is_empty() {
        out.push_str("_No observations recorded._\n\n");
        return out;
    }

    let mut grouped: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in all {
        grouped.entry(obs.category.as_str()).or_default().push(obs);
    }

    for (category, mut items) in grouped {
        items.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then_with(|| a.id.cmp(&b.id))
        });
        let _ = writeln!(out, "### {category}\n");
        for obs in items {
            let _ = writeln!(out, "- **[{}]** {}", obs.severity, obs.description);
            if let Some(evidence) = &obs.evidence {
                let _ = writeln!(
                    out,
                    "  - Evidence: `{}` at `{}`",
                    evidence.kind.as_str(),
                    evidence.location
                );
                if let Some(snippet) = &evidence.snippet {
                    out.push('\n');
                    out.push_str("  ```\n");
                    for line in snippet.lines() {
                        let _ = writeln!(out, "  {line}");
                    }
                    out.push_str("  ```\n");
                }
            }
            if let Some(recommendation) = &obs.recommendation {
                let _ = writeln!(out, "  - Recommendation: {recommendation}");
            }
            if !obs.tags.is_empty() {
                let tags: Vec<String> = obs.tags.iter().map(|t| format!("`{t}`")).collect();
                let _ = writeln!(out, "  - Tags: {}", tags.join(", "));
            }
        }
        out.push('\n');
    }
    out
}

/// Relations as a table, sorted by type then target
pub(crate) fn relations(entity: EntityRef<'_>) -> String {
    let mut out = String::from("## Relations\n\n");
    if entity.relations().is_empty() {
        out.push_str("_No relations recorded._\n\n");
        return out;
    }
    let mut all: Vec<&Relation> = entity.relations().iter().collect();
    all.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.target.cmp(&b.target)));

    out.push_str("| Target | Type | Description | Details |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for relation in all {
        let _ = writeln!(out, "{}", relation_row(relation));
    }
    out.push('\n');
    out
}

fn relation_row(relation: &Relation) -> String {
    let target = if relation.external {
        format!("`{}` (external)", relation.target)
    } else {
        format!("`{}`", relation.target)
    };
    let mut details: Vec<String> = Vec::new();
    if let Some(protocol) = &relation.protocol {
        details.push(format!("protocol: {protocol}"));
    }
    if relation.direction == Direction::Bidirectional {
        details.push("bidirectional".to_string());
    }
    for (key, value) in &relation.metadata {
        details.push(format!("{key}: {value}"));
    }
    let details = if details.is_empty() {
        "-".to_string()
    } else {
        details.join(", ")
    };
    format!(
        "| {} | {} | {} | {} |",
        target,
        cell(&relation.kind),
        cell(&relation.description),
        cell(&details),
    )
}

pub(crate) fn metadata_section(
    entity: EntityRef<'_>,
    generated_at: &str,
    source_checksum: &str,
) -> String {
    let mut out = String::from("## Metadata\n\n");
    let _ = writeln!(out, "- **Entity ID:** `{}`", entity.id());
    let _ = writeln!(out, "- **Level:** {}", entity.level().code());
    let _ = writeln!(out, "- **Generated:** {generated_at}");
    let _ = writeln!(out, "- **Source checksum:** `{source_checksum}`");
    out.push('\n');
    out
}

/// Escape pipes so free text cannot break table rows
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
