use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::cuts::{interactive_config, Axis, SplitConfig, MAX_PARTS, MIN_PARTS};
use crate::pdf::render::DEFAULT_RENDER_WIDTH;

#[derive(Parser)]
#[command(name = "pdfslice")]
#[command(about = "Cut every page of a PDF into sub-pages along percentage cut lines")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// How each page is cut
#[derive(Args, Debug, Clone)]
pub struct CutArgs {
    /// Direction of the cut lines
    #[arg(short, long, value_enum, default_value_t = Axis::Vertical)]
    pub axis: Axis,

    /// Number of parts per page [default: 3, or as many as the cuts describe]
    #[arg(
        short = 'n',
        long,
        value_parser = clap::value_parser!(u32).range(MIN_PARTS as i64..=MAX_PARTS as i64)
    )]
    pub count: Option<u32>,

    /// Cut positions in percent, comma separated (e.g., "30,70"); even
    /// split when omitted
    #[arg(short, long, default_value = "")]
    pub cuts: String,
}

impl CutArgs {
    pub fn config(&self) -> crate::error::Result<SplitConfig> {
        interactive_config(self.axis, self.count, &self.cuts)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Show page count and page sizes
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Render one page with the cut lines drawn over it
    Preview {
        /// PDF file to preview
        path: PathBuf,

        /// Page to render (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[command(flatten)]
        cut: CutArgs,

        /// Image width in pixels
        #[arg(short, long, default_value_t = DEFAULT_RENDER_WIDTH)]
        width: u16,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Cut every page and write the result to a new PDF
    #[command(alias = "cut")]
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        cut: CutArgs,

        /// Output file; a temporary file is created when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
