use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SplitError};

/// Smallest part count offered by the interactive surfaces
pub const MIN_PARTS: u32 = 2;
/// Largest part count offered by the interactive surfaces
pub const MAX_PARTS: u32 = 6;
pub const DEFAULT_PARTS: u32 = 3;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Vertical cut lines, measured from the left edge
    #[default]
    Vertical,
    /// Horizontal cut lines, measured from the top edge
    Horizontal,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vertical => f.write_str("vertical"),
            Axis::Horizontal => f.write_str("horizontal"),
        }
    }
}

/// Axis plus the full cut list (0 and 100 included), shared by every page
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    axis: Axis,
    cuts: Vec<f32>,
}

impl SplitConfig {
    /// Build from a complete cut list, rejecting anything that would
    /// produce an empty or inverted sub-page.
    pub fn new(axis: Axis, cuts: Vec<f32>) -> Result<Self> {
        validate_cuts(&cuts)?;
        Ok(SplitConfig { axis, cuts })
    }

    /// Cuts at `i * 100 / parts`
    pub fn even(axis: Axis, parts: u32) -> Result<Self> {
        if parts == 0 {
            return Err(SplitError::input("split count must be at least 1"));
        }
        Self::new(axis, even_cuts(parts))
    }

    /// Interpret user input the way the form does: an empty cut string
    /// means an even split, otherwise the cuts must agree with `parts`
    /// when one is given.
    pub fn from_input(axis: Axis, parts: Option<u32>, input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Self::even(axis, parts.unwrap_or(DEFAULT_PARTS));
        }

        let cuts = parse_cut_percentages(input)?;
        let described = (cuts.len() - 1) as u32;
        if let Some(parts) = parts {
            if parts != described {
                return Err(SplitError::input(format!(
                    "{} cut(s) describe {} part(s), but {} were requested",
                    cuts.len() - 2,
                    described,
                    parts
                )));
            }
        }

        Self::new(axis, cuts)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn parts(&self) -> usize {
        self.cuts.len() - 1
    }

    pub fn cuts(&self) -> &[f32] {
        &self.cuts
    }

    /// Cut positions without the 0 and 100 boundaries
    pub fn interior(&self) -> &[f32] {
        &self.cuts[1..self.cuts.len() - 1]
    }
}

/// Reject part counts outside what the form offers
pub fn check_interactive_parts(parts: u32) -> Result<()> {
    if !(MIN_PARTS..=MAX_PARTS).contains(&parts) {
        return Err(SplitError::input(format!(
            "split count must be between {} and {}, got {}",
            MIN_PARTS, MAX_PARTS, parts
        )));
    }
    Ok(())
}

/// `SplitConfig::from_input` limited to the 2-6 parts the form offers
pub fn interactive_config(axis: Axis, parts: Option<u32>, input: &str) -> Result<SplitConfig> {
    if let Some(parts) = parts {
        check_interactive_parts(parts)?;
    }
    let config = SplitConfig::from_input(axis, parts, input)?;
    check_interactive_parts(config.parts() as u32)?;
    Ok(config)
}

pub fn even_cuts(parts: u32) -> Vec<f32> {
    let mut cuts = Vec::with_capacity(parts as usize + 1);
    cuts.push(0.0);
    for i in 1..parts {
        cuts.push(i as f32 * 100.0 / parts as f32);
    }
    cuts.push(100.0);
    cuts
}

/// Parse a comma-separated list like "33.3, 66.6" or "0,50,100".
///
/// Missing 0 and 100 boundaries are added, so interior-only input is the
/// common case.
pub fn parse_cut_percentages(s: &str) -> Result<Vec<f32>> {
    let mut cuts = s
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| SplitError::input(format!("'{}' is not a number", part)))
        })
        .collect::<Result<Vec<_>>>()?;

    if cuts.first() != Some(&0.0) {
        cuts.insert(0, 0.0);
    }
    if cuts.last() != Some(&100.0) {
        cuts.push(100.0);
    }

    validate_cuts(&cuts)?;
    Ok(cuts)
}

/// Map each percentage onto `dimension`.
pub fn derive_cuts(cuts: &[f32], dimension: f32) -> Result<Vec<f32>> {
    validate_cuts(cuts)?;
    Ok(cuts.iter().map(|p| dimension * p / 100.0).collect())
}

fn validate_cuts(cuts: &[f32]) -> Result<()> {
    if cuts.len() < 2 {
        return Err(SplitError::input("need at least the 0 and 100 boundaries"));
    }
    if cuts[0] != 0.0 || cuts[cuts.len() - 1] != 100.0 {
        return Err(SplitError::input(format!(
            "cuts must start at 0 and end at 100, got {:?}",
            cuts
        )));
    }
    if let Some(pair) = cuts.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(SplitError::input(format!(
            "cuts must be strictly increasing, but {} is followed by {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}
