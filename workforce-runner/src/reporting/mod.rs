//! Console summaries and the persisted run manifest.

pub mod console;
pub mod manifest;

pub use console::{format_thousands, render_report};
pub use manifest::{write_manifest, ArtifactEntry, RunManifest, MANIFEST_FILE};
