//! Markdown to Word conversion through the `pandoc` executable.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// `report.md` -> `report.docx`, after checking the input is an existing
/// markdown file.
pub fn docx_output_path(input: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(PipelineError::Convert(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let is_markdown = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| MARKDOWN_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);
    if !is_markdown {
        return Err(PipelineError::Convert(format!(
            "Input file must be a Markdown file (.md or .markdown): {}",
            input.display()
        )));
    }

    Ok(input.with_extension("docx"))
}

pub fn convert_markdown_to_docx(input: &Path) -> Result<PathBuf> {
    let output = docx_output_path(input)?;

    let pandoc = which::which("pandoc")
        .map_err(|e| PipelineError::Convert(format!("pandoc is not installed or not on PATH: {}", e)))?;

    let result = Command::new(pandoc)
        .arg(input)
        .arg("--from")
        .arg("markdown")
        .arg("--to")
        .arg("docx")
        .arg("--output")
        .arg(&output)
        .output()
        .map_err(|e| PipelineError::Convert(format!("Error during conversion: {}", e)))?;

    if !result.status.success() {
        return Err(PipelineError::Convert(format!(
            "Error during conversion: pandoc exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }

    info!("Successfully converted: {} -> {}", input.display(), output.display());
    Ok(output)
}
