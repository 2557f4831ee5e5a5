use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

use super::page_box::Rect;
use crate::error::{Result, SplitError};

/// Attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no usable MediaBox anywhere in its tree
const FALLBACK_MEDIA_BOX: Rect = Rect {
    left: 0.0,
    bottom: 0.0,
    right: 612.0,
    top: 792.0,
};

pub struct PdfDocument {
    pub doc: Document,
    /// Source bytes, kept for the rasterizer
    pub bytes: Vec<u8>,
    pub name: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let bytes = std::fs::read(&path)?;
        Self::load(bytes, name)
    }

    /// Parse in-memory bytes. A PDF without pages is rejected, since there
    /// is nothing to split or preview.
    pub fn load(bytes: Vec<u8>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let doc = Document::load_mem(&bytes)
            .map_err(|e| SplitError::format(format!("{}: {}", name, e)))?;

        if doc.get_pages().is_empty() {
            return Err(SplitError::format(format!("{}: document has no pages", name)));
        }

        Ok(PdfDocument { doc, bytes, name })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.doc
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(SplitError::Range {
                page,
                total: self.page_count(),
            })
    }

    /// Bounding box of a page, following the page tree for an inherited
    /// MediaBox.
    #[allow(dead_code)]
    pub fn page_box(&self, page: u32) -> Result<Rect> {
        let page_id = self.page_id(page)?;
        Ok(self.media_box(page_id))
    }

    pub fn page_boxes(&self) -> Vec<(u32, Rect)> {
        self.page_ids()
            .into_iter()
            .map(|(num, id)| (num, self.media_box(id)))
            .collect()
    }

    pub(crate) fn media_box(&self, page_id: ObjectId) -> Rect {
        match self.inherited(page_id, b"MediaBox") {
            Some(obj) => self.rect_from_object(&obj).unwrap_or_else(|| {
                tracing::warn!(?page_id, "malformed MediaBox, assuming US Letter");
                FALLBACK_MEDIA_BOX
            }),
            None => {
                tracing::warn!(?page_id, "page has no MediaBox, assuming US Letter");
                FALLBACK_MEDIA_BOX
            }
        }
    }

    /// Look up `key` on the page, then on each ancestor Pages node
    pub fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Copy of the page dictionary with inherited attributes made explicit
    pub fn flattened_page(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut dict = self.doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE_KEYS {
            if !dict.has(key) {
                if let Some(value) = self.inherited(page_id, key) {
                    dict.set(key, value);
                }
            }
        }
        Ok(dict)
    }

    /// The page's annotation dictionaries, resolved. Entries that are not
    /// dictionaries are skipped.
    pub fn annotations(&self, page_id: ObjectId) -> Vec<Dictionary> {
        let Ok(page) = self.doc.get_dictionary(page_id) else {
            return Vec::new();
        };
        let Ok(annots) = page.get(b"Annots").map(|obj| self.resolve(obj)) else {
            return Vec::new();
        };
        annots
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| self.resolve(item).as_dict().ok().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn rect_from_object(&self, obj: &Object) -> Option<Rect> {
        let array = self.resolve(obj).as_array().ok()?;
        let numbers = array
            .iter()
            .map(|value| self.resolve(value).as_float().ok())
            .collect::<Option<Vec<f32>>>()?;
        Rect::from_numbers(&numbers)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }
}
