use crate::cli::CutArgs;
use crate::splitter::Splitter;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(input: P, cut: &CutArgs, output: Option<PathBuf>) -> Result<()> {
    let input = input.as_ref();
    let config = cut.config()?;
    let splitter = Splitter::open(input)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    let output = match output {
        Some(path) => {
            splitter
                .split_to_path(&config, &path)
                .with_context(|| format!("Failed to write split PDF: {}", path.display()))?;
            path
        }
        // Nothing else owns the file once we exit, so keep it on disk.
        None => splitter
            .split_to_temp(&config)?
            .keep()
            .context("Failed to keep temporary output")?,
    };

    println!(
        "Split {} page(s) into {} part(s) each ({} pages) at {}",
        splitter.page_count(),
        config.parts(),
        splitter.page_count() as usize * config.parts(),
        output.display()
    );

    Ok(())
}
