//! Directory-backed reference context

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::pipeline::{ContextProvider, ReferenceContext};

const GUIDANCE_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Reads every guidance file in a directory, ordered by file name
#[derive(Debug, Clone)]
pub struct DirectoryContextProvider {
    dir: PathBuf,
}

impl DirectoryContextProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn is_guidance_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GUIDANCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[async_trait]
impl ContextProvider for DirectoryContextProvider {
    async fn fetch_reference_context(&self) -> anyhow::Result<ReferenceContext> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("cannot read guidance directory {}", self.dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_guidance_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut segments = Vec::with_capacity(paths.len());
        for path in &paths {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("cannot read guidance file {}", path.display()))?;
            let text = text.trim();
            if !text.is_empty() {
                debug!("Loaded guidance file {}", path.display());
                segments.push(text.to_string());
            }
        }

        if segments.is_empty() {
            anyhow::bail!("no guidance found in {}", self.dir.display());
        }

        Ok(ReferenceContext::new(segments))
    }
}
