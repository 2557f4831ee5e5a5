use crate::cli::CutArgs;
use crate::pdf::render::RenderOptions;
use crate::splitter::Splitter;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    page: u32,
    cut: &CutArgs,
    width: u16,
    output: Q,
) -> Result<()> {
    let config = cut.config()?;
    let splitter = Splitter::open(&path)
        .with_context(|| format!("Failed to open PDF: {}", path.as_ref().display()))?;

    let preview = splitter.preview(page, &config, &RenderOptions { width })?;
    preview
        .save_png(&output)
        .with_context(|| format!("Failed to write preview: {}", output.as_ref().display()))?;

    println!(
        "Page {} of {} ({} x {} px, {} cut(s) {}) written to {}",
        page,
        splitter.page_count(),
        preview.width(),
        preview.height(),
        config.interior().len(),
        config.axis(),
        output.as_ref().display()
    );

    Ok(())
}
