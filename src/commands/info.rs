use crate::splitter::Splitter;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let splitter = Splitter::open(&path)
        .with_context(|| format!("Failed to open PDF: {}", path.as_ref().display()))?;

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", splitter.page_count());

    for (page, rect) in splitter.page_boxes() {
        println!(
            "  p{}: {} x {} at ({}, {})",
            page,
            format_units(rect.width()),
            format_units(rect.height()),
            format_units(rect.left),
            format_units(rect.bottom)
        );
    }

    Ok(())
}

/// Page units with at most two decimals, trailing zeros dropped
fn format_units(value: f32) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
