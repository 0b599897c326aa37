//! Run manifest export (JSON).
//!
//! Lists every artifact with its size and BLAKE3 hash, so two runs over the
//! same inputs can be checked for byte-identical output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::report::{GrowthSummary, RunReport, StepOutcome};

pub const MANIFEST_FILE: &str = "run_manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub bytes: u64,
    pub blake3: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// BLAKE3 over the artifact hashes, in write order.
    pub output_hash: String,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepOutcome>,
    pub artifacts: Vec<ArtifactEntry>,
    pub growth: Option<GrowthSummary>,
}

pub fn hash_file(path: &Path) -> Result<ArtifactEntry> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read artifact {}", path.display()))?;
    Ok(ArtifactEntry {
        path: path.to_path_buf(),
        bytes: bytes.len() as u64,
        blake3: blake3::hash(&bytes).to_hex().to_string(),
    })
}

pub fn build_manifest(report: &RunReport) -> Result<RunManifest> {
    let artifacts = report
        .artifacts
        .iter()
        .map(|p| hash_file(p))
        .collect::<Result<Vec<_>>>()?;

    let mut hasher = blake3::Hasher::new();
    for entry in &artifacts {
        hasher.update(entry.blake3.as_bytes());
    }

    Ok(RunManifest {
        output_hash: hasher.finalize().to_hex().to_string(),
        command: report.command.clone(),
        started_at: report.started_at,
        finished_at: Utc::now(),
        steps: report.steps.clone(),
        artifacts,
        growth: report.growth.clone(),
    })
}

pub fn write_manifest(path: &Path, report: &RunReport) -> Result<RunManifest> {
    let manifest = build_manifest(report)?;
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(manifest)
}
