//! Shared reference context

use async_trait::async_trait;

/// Reference guidance shared by every stage of one pipeline run
///
/// Immutable once fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceContext {
    segments: Vec<String>,
}

impl ReferenceContext {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Segments in their original order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// All segments joined into one block of text
    pub fn joined(&self) -> String {
        self.segments.join("\n\n")
    }

    /// Total number of characters across all segments
    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Source of the reference context, queried once per pipeline run
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn fetch_reference_context(&self) -> anyhow::Result<ReferenceContext>;
}
