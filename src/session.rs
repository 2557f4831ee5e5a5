use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::cuts::SplitConfig;
use crate::error::{Result, SplitError};
use crate::pdf::render::{Preview, RenderOptions};
use crate::splitter::Splitter;

/// Where a split landed
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub path: PathBuf,
    pub source_pages: u32,
    pub parts_per_page: usize,
    pub page_count: u32,
}

/// Per-user state: the loaded document plus the temporary files generated
/// from it. Temporary outputs live until the next load or until the session
/// is dropped.
#[derive(Default)]
pub struct Session {
    splitter: Option<Splitter>,
    outputs: Vec<TempPath>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new document, replacing the current one. On failure the
    /// current document stays loaded.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<u32> {
        let splitter = Splitter::open(path)?;
        Ok(self.replace(splitter))
    }

    #[allow(dead_code)]
    pub fn load_bytes(&mut self, bytes: Vec<u8>, name: impl Into<String>) -> Result<u32> {
        let splitter = Splitter::load(bytes, name)?;
        Ok(self.replace(splitter))
    }

    fn replace(&mut self, splitter: Splitter) -> u32 {
        self.reset();
        let pages = splitter.page_count();
        self.splitter = Some(splitter);
        pages
    }

    /// Drop the document and delete every temporary output
    pub fn reset(&mut self) {
        if !self.outputs.is_empty() {
            tracing::debug!(count = self.outputs.len(), "removing temporary outputs");
        }
        self.outputs.clear();
        self.splitter = None;
    }

    pub fn splitter(&self) -> Result<&Splitter> {
        self.splitter.as_ref().ok_or(SplitError::NotLoaded)
    }

    pub fn preview(
        &self,
        page: u32,
        config: &SplitConfig,
        options: &RenderOptions,
    ) -> Result<Preview> {
        self.splitter()?.preview(page, config, options)
    }

    /// Split into `output`, or into a session-owned temporary file when no
    /// output is given.
    pub fn split(&mut self, config: &SplitConfig, output: Option<&Path>) -> Result<SplitOutcome> {
        let splitter = self.splitter()?;
        let source_pages = splitter.page_count();

        let path = match output {
            Some(path) => {
                splitter.split_to_path(config, path)?;
                path.to_path_buf()
            }
            None => {
                let temp = splitter.split_to_temp(config)?;
                let path = temp.to_path_buf();
                self.outputs.push(temp);
                path
            }
        };

        Ok(SplitOutcome {
            path,
            source_pages,
            parts_per_page: config.parts(),
            page_count: source_pages * config.parts() as u32,
        })
    }
}
