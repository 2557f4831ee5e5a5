use lopdf::Document;
use std::path::Path;
use tempfile::TempPath;

use crate::cuts::SplitConfig;
use crate::error::{Result, SplitError};
use crate::pdf::render::{draw_cut_lines, render_page, Preview, RenderOptions};
use crate::pdf::split::{split_document, write_temp, write_to_path};
use crate::pdf::{PdfDocument, Rect};

/// One loaded document and the operations the form offers on it
pub struct Splitter {
    document: PdfDocument,
}

impl Splitter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_document(PdfDocument::open(path)?)
    }

    pub fn load(bytes: Vec<u8>, name: impl Into<String>) -> Result<Self> {
        Self::from_document(PdfDocument::load(bytes, name)?)
    }

    fn from_document(document: PdfDocument) -> Result<Self> {
        tracing::info!(
            name = %document.name,
            pages = document.page_count(),
            "loaded PDF"
        );
        Ok(Splitter { document })
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    pub fn page_boxes(&self) -> Vec<(u32, Rect)> {
        self.document.page_boxes()
    }

    fn check_page(&self, page: u32) -> Result<()> {
        let total = self.page_count();
        if page == 0 || page > total {
            return Err(SplitError::Range { page, total });
        }
        Ok(())
    }

    /// Render `page` (1-based) with the configured cut lines drawn over it.
    pub fn preview(
        &self,
        page: u32,
        config: &SplitConfig,
        options: &RenderOptions,
    ) -> Result<Preview> {
        self.check_page(page)?;

        let mut image = render_page(&self.document.bytes, page, options)?;
        draw_cut_lines(&mut image, config.axis(), config.interior());

        tracing::info!(
            page,
            axis = %config.axis(),
            width = image.width(),
            height = image.height(),
            "rendered preview"
        );

        Ok(Preview {
            page,
            axis: config.axis(),
            cut_percentages: config.cuts().to_vec(),
            image,
        })
    }

    /// Crop every page into `config.parts()` sub-pages.
    pub fn split_all(&self, config: &SplitConfig) -> Result<Document> {
        let doc = split_document(&self.document, config)?;
        tracing::info!(
            source_pages = self.page_count(),
            parts = config.parts(),
            axis = %config.axis(),
            "split document"
        );
        Ok(doc)
    }

    /// Split and write to a new temporary file
    pub fn split_to_temp(&self, config: &SplitConfig) -> Result<TempPath> {
        let mut doc = self.split_all(config)?;
        let path = write_temp(&mut doc)?;
        tracing::info!(path = %path.display(), "wrote split PDF");
        Ok(path)
    }

    pub fn split_to_path<P: AsRef<Path>>(&self, config: &SplitConfig, path: P) -> Result<()> {
        let mut doc = self.split_all(config)?;
        write_to_path(&mut doc, &path)?;
        tracing::info!(path = %path.as_ref().display(), "wrote split PDF");
        Ok(())
    }
}
