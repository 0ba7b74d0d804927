//! Rendering errors

/// Errors raised while producing markdown
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Frontmatter could not be serialized
    #[error("frontmatter serialization failed: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    /// Entity could not be serialized for the raw dump
    #[error("entity serialization failed: {0}")]
    Entity(#[from] serde_json::Error),
}
