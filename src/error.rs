use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitError>;

#[derive(Error, Debug)]
pub enum SplitError {
    /// Bytes could not be parsed as a PDF, or the PDF has no pages
    #[error("Invalid PDF: {reason}")]
    Format { reason: String },

    /// 1-based page number outside the document
    #[error("Page {page} is out of range (1-{total})")]
    Range { page: u32, total: u32 },

    /// Cut list or split count rejected
    #[error("Invalid cut input: {reason}")]
    Input { reason: String },

    #[error("No PDF loaded")]
    NotLoaded,

    /// PDFium could not be bound or failed to rasterize
    #[error("Render error: {reason}")]
    Render { reason: String },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplitError {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        SplitError::Input {
            reason: reason.into(),
        }
    }

    pub(crate) fn format(reason: impl Into<String>) -> Self {
        SplitError::Format {
            reason: reason.into(),
        }
    }

    pub(crate) fn render(reason: impl std::fmt::Display) -> Self {
        SplitError::Render {
            reason: reason.to_string(),
        }
    }
}
