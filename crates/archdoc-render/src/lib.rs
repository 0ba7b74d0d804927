//! Markdown rendering for validated discovery documents
//!
//! One page per renderable entity: YAML [`Frontmatter`], a `# title`,
//! the level's fixed sections in a stable order, and reader-authored
//! sections preserved across re-renders by the [`merge`] layer.
//!
//! Rendering is infallible from the pipeline's point of view: assembly
//! errors degrade to a minimal fallback page and a warning finding.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod frontmatter;
pub mod merge;
mod sections;
mod template;

pub use error::RenderError;
pub use frontmatter::Frontmatter;
pub use merge::{extract_manual_sections, reinsert_manual_sections, ManualSection};
pub use sections::fixed_sections;
pub use template::{RenderContext, RenderOutcome, TemplateRenderer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
