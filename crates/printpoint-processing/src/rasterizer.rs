//! Adapter around the external page-rendering engine. The engine is invoked
//! as a subprocess per PDF and writes one PNG per page; its own numbering
//! scheme is renamed to the canonical `{basename}_{index}.png` form.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct Rasterizer {
    engine_path: String,
    dpi: u32,
}

impl Rasterizer {
    pub fn new(engine_path: impl Into<String>, dpi: u32) -> Self {
        Self {
            engine_path: engine_path.into(),
            dpi,
        }
    }

    /// Render every page of `pdf` into `out_dir` as
    /// `{basename}_{index}.png` with 1-based indices. Returns the produced
    /// file names, ordered by page index.
    pub async fn render_pages(
        &self,
        pdf: &Path,
        out_dir: &Path,
        basename: &str,
    ) -> Result<Vec<String>> {
        let prefix = out_dir.join(basename);
        let args = vec![
            "-png".to_string(),
            "-r".to_string(),
            self.dpi.to_string(),
            pdf.to_string_lossy().into_owned(),
            prefix.to_string_lossy().into_owned(),
        ];

        tracing::debug!(
            engine = %self.engine_path,
            pdf = %pdf.display(),
            dpi = self.dpi,
            "invoking render engine"
        );

        let output = Command::new(&self.engine_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("failed to spawn render engine '{}'", self.engine_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "render engine exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let renamed = canonicalize_outputs(out_dir, basename).await?;
        if renamed.is_empty() {
            return Err(anyhow!("render engine produced no page images"));
        }
        Ok(renamed)
    }
}

/// Rename the engine's `{basename}-N.png` outputs (N possibly zero-padded)
/// to `{basename}_{n}.png`, returning the canonical names ordered by index.
async fn canonicalize_outputs(out_dir: &Path, basename: &str) -> Result<Vec<String>> {
    let dash_prefix = format!("{}-", basename);
    let mut produced: Vec<(u32, PathBuf)> = Vec::new();

    let mut entries = tokio::fs::read_dir(out_dir)
        .await
        .context("failed to read render output directory")?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(rest) = file_name.strip_prefix(&dash_prefix) else {
            continue;
        };
        let Some(digits) = rest.strip_suffix(".png") else {
            continue;
        };
        if let Ok(index) = digits.parse::<u32>() {
            produced.push((index, entry.path()));
        }
    }

    produced.sort_by_key(|(index, _)| *index);

    let mut names = Vec::with_capacity(produced.len());
    for (index, path) in produced {
        let canonical = format!("{}_{}.png", basename, index);
        let target = out_dir.join(&canonical);
        tokio::fs::rename(&path, &target)
            .await
            .with_context(|| format!("failed to rename page image to {}", canonical))?;
        names.push(canonical);
    }
    Ok(names)
}
