// src/archive/mod.rs
// =============================================================================
// Everything about saved pages ("artifacts"):
// - naming: URL -> file name
// - writer: the ArtifactWriter seam and the filesystem implementation
// =============================================================================

mod naming;
mod writer;

pub use naming::artifact_name;
pub use writer::{render_artifact, ArtifactWriter, FsArtifactWriter};
