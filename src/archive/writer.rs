// src/archive/writer.rs
// =============================================================================
// Persists saved pages.
//
// The crawl engine only knows the ArtifactWriter trait: "store this content
// under this name". FsArtifactWriter is the real implementation and writes
// into one output directory; tests plug in an in-memory writer instead.
//
// Every saved page starts with a provenance header pointing at its source:
//
//   # 来源: https://nextdevkit.com/zh/docs
//
//   ---
//
//   <page content>
// =============================================================================

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::links::CanonicalUrl;

/// Label of the provenance header line ("source").
pub const PROVENANCE_LABEL: &str = "来源";

/// Storage for saved pages.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    /// Stores `content` under `name`, creating the storage location if it
    /// doesn't exist yet. An existing artifact with the same name is replaced.
    async fn write(&self, name: &str, content: &str) -> io::Result<()>;
}

/// Builds the body of a saved page: provenance header, then the content.
pub fn render_artifact(source: &CanonicalUrl, content: &str) -> String {
    format!("# {}: {}\n\n---\n\n{}", PROVENANCE_LABEL, source, content)
}

/// Writes artifacts as files inside one directory.
#[derive(Debug, Clone)]
pub struct FsArtifactWriter {
    root: PathBuf,
}

impl FsArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsArtifactWriter { root: root.into() }
    }
}

#[async_trait]
impl ArtifactWriter for FsArtifactWriter {
    async fn write(&self, name: &str, content: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        tokio::fs::write(&path, content.as_bytes()).await?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(())
    }
}
