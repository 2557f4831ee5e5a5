pub mod document;
pub mod page_box;
pub mod render;
pub mod split;

pub use document::PdfDocument;
pub use page_box::Rect;

#[cfg(test)]
pub(crate) mod testing;
