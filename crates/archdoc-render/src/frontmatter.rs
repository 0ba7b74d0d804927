//! YAML frontmatter on rendered pages
//!
//! Every page starts with a fenced YAML block carrying the identity the
//! pipeline needs to recognize its own output: entity id, level,
//! generation instant and the checksum of the source entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use archdoc_model::{format_timestamp, Level};

use crate::error::RenderError;

const FENCE: &str = "---";

/// Frontmatter block of one rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Entity id the page documents
    pub id: String,
    /// Display title
    pub title: String,
    /// Level code (`c1`, `c2`, `c3`)
    pub level: String,
    /// When this page was generated (ISO-8601 millis, UTC)
    pub generated_at: String,
    /// Checksum of the canonical source entity
    pub source_checksum: String,
    /// Entity type plus any observation tags worth surfacing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Frontmatter {
    /// Build frontmatter for one entity page
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        level: Level,
        generated_at: DateTime<Utc>,
        source_checksum: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level: level.code().to_string(),
            generated_at: format_timestamp(generated_at),
            source_checksum: source_checksum.into(),
            tags,
        }
    }

    /// Serialize as a fenced YAML block, trailing blank line included
    ///
    /// # Errors
    /// Returns an error when YAML serialization fails.
    pub fn render(&self) -> Result<String, RenderError> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n\n"))
    }

    /// Split a page into frontmatter and body
    ///
    /// Returns `None` when the page carries no parseable frontmatter,
    /// which marks it as not produced by this pipeline.
    #[must_use]
    pub fn parse(page: &str) -> Option<(Frontmatter, &str)> {
        let rest = page.strip_prefix(FENCE)?.strip_prefix('\n')?;
        let end = rest.find("\n---")?;
        let yaml = &rest[..end + 1];
        let frontmatter: Frontmatter = serde_yaml::from_str(yaml).ok()?;
        let body = rest[end + 1..]
            .strip_prefix(FENCE)?
            .trim_start_matches('\n');
        Some((frontmatter, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Frontmatter {
        Frontmatter::new(
            "billing-api",
            "Billing API",
            Level::Container,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            "a".repeat(64),
            vec!["api".to_string()],
        )
    }

    #[test]
    fn render_then_parse_round_trips() {
        let frontmatter = sample();
        let page = format!("{}# Billing API\n", frontmatter.render().unwrap());
        let (parsed, body) = Frontmatter::parse(&page).unwrap();
        assert_eq!(parsed, frontmatter);
        assert_eq!(body, "# Billing API\n");
    }

    #[test]
    fn pages_without_frontmatter_are_foreign() {
        assert!(Frontmatter::parse("# Hand-written page\n").is_none());
        assert!(Frontmatter::parse("---\nnot: [valid\n---\n").is_none());
    }

    #[test]
    fn generated_at_uses_millisecond_format() {
        let frontmatter = sample();
        assert_eq!(frontmatter.generated_at, "2026-03-01T12:00:00.000Z");
    }
}
