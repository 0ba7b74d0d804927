//! Page assembly
//!
//! [`TemplateRenderer`] turns one validated entity into a complete page:
//! frontmatter, `# title`, the level's fixed sections in order, and any
//! manual sections preserved from the previous render. Rendering never
//! fails the pipeline; when assembly errors out, a minimal fallback page
//! (frontmatter plus a raw JSON dump) is produced and a warning raised.

use chrono::{DateTime, Utc};
use tracing::warn;

use archdoc_model::{format_timestamp, EntityRef, Finding};

use crate::error::RenderError;
use crate::frontmatter::Frontmatter;
use crate::merge::{extract_manual_sections, reinsert_manual_sections};
use crate::sections;

/// Per-run inputs shared by every page
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Generation instant stamped into frontmatter and the metadata section
    pub generated_at: DateTime<Utc>,
    /// Checksum of the canonical source entity
    pub source_checksum: String,
}

/// One rendered page plus anything the renderer wants to report
#[derive(Debug)]
pub struct RenderOutcome {
    /// Complete page, frontmatter included
    pub markdown: String,
    /// Warnings raised during rendering
    pub findings: Vec<Finding>,
    /// Whether the minimal fallback page was produced
    pub fell_back: bool,
}

/// Renders validated entities to markdown pages
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render one entity, preserving manual sections from `previous`
    ///
    /// `previous` is the page currently in the store for this entity, if
    /// any. Pages without parseable frontmatter are treated as foreign
    /// and left out of the merge.
    #[must_use]
    pub fn render(
        &self,
        entity: EntityRef<'_>,
        ctx: &RenderContext,
        previous: Option<&str>,
    ) -> RenderOutcome {
        let mut findings = Vec::new();

        match self.assemble(entity, ctx, previous) {
            Ok(markdown) => RenderOutcome {
                markdown,
                findings,
                fell_back: false,
            },
            Err(err) => {
                warn!(entity = entity.id(), error = %err, "falling back to minimal render");
                findings.push(
                    Finding::warning(
                        entity.level(),
                        entity.level().array_field(),
                        format!("template rendering failed, minimal page produced: {err}"),
                    )
                    .with_entity(entity.id().to_string()),
                );
                RenderOutcome {
                    markdown: self.fallback(entity, ctx),
                    findings,
                    fell_back: true,
                }
            }
        }
    }

    fn assemble(
        &self,
        entity: EntityRef<'_>,
        ctx: &RenderContext,
        previous: Option<&str>,
    ) -> Result<String, RenderError> {
        let mut page = self.frontmatter(entity, ctx).render()?;
        page.push_str(&format!("# {}\n\n", entity.name()));

        let generated_at = format_timestamp(ctx.generated_at);
        page.push_str(&sections::overview(entity));
        match entity {
            EntityRef::System(system) => {
                page.push_str(&sections::repositories(system));
            }
            EntityRef::Container(container) => {
                page.push_str(&sections::technology(container));
                page.push_str(&sections::runtime(container));
            }
            EntityRef::Component(component) => {
                page.push_str(&sections::code_structure(component));
                page.push_str(&sections::design_patterns(component));
                page.push_str(&sections::metrics(component));
            }
        }
        page.push_str(&sections::observations(entity));
        page.push_str(&sections::relations(entity));
        page.push_str(&sections::metadata_section(
            entity,
            &generated_at,
            &ctx.source_checksum,
        ));

        if let Some(previous) = previous {
            if let Some((_, body)) = Frontmatter::parse(previous) {
                let fixed = sections::fixed_sections(entity.level());
                let manual = extract_manual_sections(body, fixed);
                if !manual.is_empty() {
                    page = reinsert_manual_sections(&page, &manual);
                }
            }
        }

        Ok(page)
    }

    /// Minimal page: frontmatter, title, raw entity dump
    fn fallback(&self, entity: EntityRef<'_>, ctx: &RenderContext) -> String {
        let header = self
            .frontmatter(entity, ctx)
            .render()
            .unwrap_or_else(|_| String::from("---\n---\n\n"));
        let dump = entity
            .to_value()
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or_else(|_| String::from("{}"));
        format!(
            "{header}# {}\n\n```json\n{dump}\n```\n",
            entity.name()
        )
    }

    fn frontmatter(&self, entity: EntityRef<'_>, ctx: &RenderContext) -> Frontmatter {
        Frontmatter::new(
            entity.id(),
            entity.name(),
            entity.level(),
            ctx.generated_at,
            ctx.source_checksum.clone(),
            vec![entity.kind().to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdoc_model::{Container, System};
    use chrono::TimeZone;

    fn ctx() -> RenderContext {
        RenderContext {
            generated_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 5).unwrap(),
            source_checksum: "b".repeat(64),
        }
    }

    fn system() -> System {
        serde_json::from_str(
            r#"{
                "id": "shop", "name": "Shop", "type": "web-application",
                "description": "customer-facing storefront",
                "repositories": ["shop-frontend", "shop-backend"],
                "observations": [{"id": "obs-1", "category": "architectural",
                                  "description": "monolith with a thin API layer"}],
                "relations": [{"id": "rel-1", "source": "shop", "target": "billing",
                               "type": "http-rest", "description": "invoice lookups"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn system_page_has_all_fixed_sections_in_order() {
        let system = system();
        let outcome = TemplateRenderer::new().render(EntityRef::System(&system), &ctx(), None);
        assert!(!outcome.fell_back);
        assert!(outcome.findings.is_empty());

        let page = &outcome.markdown;
        let (frontmatter, body) = Frontmatter::parse(page).unwrap();
        assert_eq!(frontmatter.id, "shop");
        assert_eq!(frontmatter.level, "c1");
        assert!(body.starts_with("# Shop"));

        let mut last = 0;
        for heading in sections::fixed_sections(archdoc_model::Level::System) {
            let pos = body
                .find(&format!("## {heading}"))
                .unwrap_or_else(|| panic!("missing section {heading}"));
            assert!(pos > last, "section {heading} out of order");
            last = pos;
        }
    }

    #[test]
    fn container_page_includes_technology_and_runtime() {
        let container: Container = serde_json::from_str(
            r#"{
                "id": "billing-api", "name": "Billing API", "type": "api",
                "system_id": "billing", "description": "REST surface for invoicing",
                "technology": {"primary_language": "rust", "framework": "axum"},
                "runtime": {"environment": "cloud", "platform": "linux",
                            "containerized": true, "container_technology": "docker"}
            }"#,
        )
        .unwrap();
        let outcome =
            TemplateRenderer::new().render(EntityRef::Container(&container), &ctx(), None);
        let page = &outcome.markdown;
        assert!(page.contains("## Technology Stack"));
        assert!(page.contains("- **Containerized:** yes (docker)"));
        assert!(page.contains("- **System:** `billing`"));
    }

    #[test]
    fn manual_sections_survive_a_re_render() {
        let system = system();
        let renderer = TemplateRenderer::new();
        let first = renderer.render(EntityRef::System(&system), &ctx(), None);

        let edited = first.markdown.replace(
            "## Observations",
            "## Team Notes\n\nOn-call rotations live in the wiki.\n\n## Observations",
        );

        let second = renderer.render(EntityRef::System(&system), &ctx(), Some(&edited));
        let page = &second.markdown;
        assert!(page.contains("## Team Notes"));
        let overview = page.find("## Overview").unwrap();
        let notes = page.find("## Team Notes").unwrap();
        let observations = page.find("## Observations").unwrap();
        assert!(overview < notes && notes < observations);
    }

    #[test]
    fn foreign_previous_page_is_ignored() {
        let system = system();
        let outcome = TemplateRenderer::new().render(
            EntityRef::System(&system),
            &ctx(),
            Some("# Hand-written page\n\n## My Notes\n\ntext\n"),
        );
        assert!(!outcome.markdown.contains("My Notes"));
    }
}
