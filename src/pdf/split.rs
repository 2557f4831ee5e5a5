use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

use super::page_box::crop_rects;
use super::PdfDocument;
use crate::cuts::SplitConfig;
use crate::error::Result;

/// Page entries that would no longer match the cropped MediaBox, or that
/// index into catalog structures the output leaves out
const STALE_PAGE_KEYS: [&[u8]; 5] = [b"BleedBox", b"TrimBox", b"ArtBox", b"StructParents", b"B"];

/// Annotation entries linking to other annotations, form fields or the
/// structure tree
const ANNOT_LINK_KEYS: [&[u8]; 4] = [b"Popup", b"Parent", b"IRT", b"StructParent"];

/// Catalog entries carried into the output. Everything else (outlines,
/// page labels, named destinations, OpenAction, AcroForm, structure tree)
/// addresses the replaced page objects.
const KEPT_CATALOG_KEYS: [&[u8]; 5] = [
    b"Version",
    b"Lang",
    b"ViewerPreferences",
    b"PageLayout",
    b"Metadata",
];

/// Rewrite every page as `config.parts()` cropped copies.
///
/// Output order is page-major: page 1's parts, then page 2's, and so on.
/// Each copy shares the source page's content streams and resources and
/// gets its own copy of every annotation. Link destinations that named a
/// source page land on that page's first part.
pub fn split_document(source: &PdfDocument, config: &SplitConfig) -> Result<Document> {
    let mut doc = source.doc.clone();
    let old_root = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.new_object_id();

    let mut layout = Vec::new();
    let mut first_part = BTreeMap::new();
    for (num, page_id) in source.page_ids() {
        let rects = crop_rects(source.media_box(page_id), config)?;
        let ids: Vec<ObjectId> = rects.iter().map(|_| doc.new_object_id()).collect();
        if let Some(&first) = ids.first() {
            first_part.insert(page_id, first);
        }
        layout.push((num, page_id, rects, ids));
    }

    let mut kids = Vec::new();
    for (num, page_id, rects, ids) in layout {
        let page = source.flattened_page(page_id)?;
        let annots = source.annotations(page_id);

        for (part, (rect, id)) in rects.into_iter().zip(ids).enumerate() {
            tracing::debug!(page = num, part = part + 1, ?rect, "cropping");

            let mut copy = page.clone();
            for key in STALE_PAGE_KEYS {
                copy.remove(key);
            }
            copy.set("MediaBox", rect.to_object());
            copy.set("CropBox", rect.to_object());
            copy.set("Parent", pages_id);
            if copy.has(b"Annots") {
                let refs: Vec<Object> = annots
                    .iter()
                    .map(|annot| {
                        let annot = copy_annotation(annot, id, source, &first_part);
                        Object::Reference(doc.add_object(annot))
                    })
                    .collect();
                copy.set("Annots", refs);
            }

            doc.objects.insert(id, Object::Dictionary(copy));
            kids.push(Object::Reference(id));
        }
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    let old_catalog = doc.get_dictionary(old_root)?;
    for key in KEPT_CATALOG_KEYS {
        if let Ok(value) = old_catalog.get(key) {
            catalog.set(key, value.clone());
        }
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    doc.prune_objects();
    let dropped = drop_dangling_references(&mut doc);
    if dropped > 0 {
        tracing::debug!(dropped, "nulled references to removed objects");
    }
    Ok(doc)
}

/// A private copy of `annot` attached to `page`
fn copy_annotation(
    annot: &Dictionary,
    page: ObjectId,
    source: &PdfDocument,
    first_part: &BTreeMap<ObjectId, ObjectId>,
) -> Dictionary {
    let mut copy = annot.clone();
    for key in ANNOT_LINK_KEYS {
        copy.remove(key);
    }
    copy.set("P", page);

    if let Ok(Object::Array(dest)) = copy.get_mut(b"Dest") {
        retarget(dest, first_part);
    }
    let action = match copy.get(b"A") {
        Ok(Object::Dictionary(action)) => Some(action.clone()),
        Ok(Object::Reference(id)) => source.doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    };
    if let Some(mut action) = action {
        if let Ok(Object::Array(dest)) = action.get_mut(b"D") {
            retarget(dest, first_part);
        }
        copy.set("A", action);
    }
    copy
}

/// Point an explicit destination `[page /Fit ...]` at the new page
fn retarget(dest: &mut [Object], first_part: &BTreeMap<ObjectId, ObjectId>) {
    if let Some(Object::Reference(id)) = dest.first_mut() {
        if let Some(new_id) = first_part.get(&*id) {
            *id = *new_id;
        }
    }
}

/// Replace every reference to a missing object with null. Returns how
/// many were replaced.
fn drop_dangling_references(doc: &mut Document) -> usize {
    let live: BTreeSet<ObjectId> = doc.objects.keys().copied().collect();
    let mut dropped = 0;
    for object in doc.objects.values_mut() {
        dropped += null_missing(object, &live);
    }
    for (_, value) in doc.trailer.iter_mut() {
        dropped += null_missing(value, &live);
    }
    dropped
}

fn null_missing(object: &mut Object, live: &BTreeSet<ObjectId>) -> usize {
    match object {
        Object::Reference(id) => {
            if live.contains(id) {
                0
            } else {
                *object = Object::Null;
                1
            }
        }
        Object::Array(items) => items.iter_mut().map(|item| null_missing(item, live)).sum(),
        Object::Dictionary(dict) => dict.iter_mut().map(|(_, value)| null_missing(value, live)).sum(),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .map(|(_, value)| null_missing(value, live))
            .sum(),
        _ => 0,
    }
}

/// Serialize into a fresh temporary file. The file is deleted when the
/// returned path is dropped unless the caller keeps it.
pub fn write_temp(doc: &mut Document) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("pdfslice-")
        .suffix(".pdf")
        .tempfile()?;
    doc.save_to(file.as_file_mut())?;
    Ok(file.into_temp_path())
}

/// Write to `path` through a sibling temporary file, so a failed save
/// never leaves a partial PDF behind.
pub fn write_to_path<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    doc.save_to(file.as_file_mut())?;
    file.persist(path).map_err(std::io::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuts::Axis;
    use crate::pdf::testing::{annotated_pdf, nested_tree_pdf, sample_pdf};
    use crate::pdf::Rect;

    fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
        match object {
            Object::Reference(id) => out.push(*id),
            Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
            Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| collect_references(v, out)),
            Object::Stream(stream) => stream
                .dict
                .iter()
                .for_each(|(_, v)| collect_references(v, out)),
            _ => {}
        }
    }

    fn reload(doc: &mut Document) -> PdfDocument {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        PdfDocument::load(buffer, "output").unwrap()
    }

    #[test]
    fn test_vertical_halves_of_600_by_800() {
        let source = PdfDocument::load(sample_pdf(&[(600, 800)]), "sample").unwrap();
        let config = SplitConfig::new(Axis::Vertical, vec![0.0, 50.0, 100.0]).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let out = reload(&mut out);

        assert_eq!(out.page_count(), 2);
        let boxes: Vec<Rect> = out.page_boxes().into_iter().map(|(_, r)| r).collect();
        assert_eq!(boxes[0], Rect::new(0.0, 0.0, 300.0, 800.0));
        assert_eq!(boxes[1], Rect::new(300.0, 0.0, 600.0, 800.0));
        for rect in boxes {
            assert_eq!(rect.width(), 300.0);
            assert_eq!(rect.height(), 800.0);
        }
    }

    #[test]
    fn test_page_count_is_pages_times_parts() {
        let source =
            PdfDocument::load(sample_pdf(&[(612, 792), (612, 792), (612, 792)]), "sample")
                .unwrap();
        for parts in 1..=6 {
            let config = SplitConfig::even(Axis::Horizontal, parts).unwrap();
            let mut out = split_document(&source, &config).unwrap();
            assert_eq!(reload(&mut out).page_count(), 3 * parts);
        }
    }

    #[test]
    fn test_page_major_order_with_mixed_sizes() {
        let source = PdfDocument::load(sample_pdf(&[(600, 800), (1000, 400)]), "sample").unwrap();
        let config = SplitConfig::new(Axis::Vertical, vec![0.0, 25.0, 100.0]).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let boxes: Vec<Rect> = reload(&mut out)
            .page_boxes()
            .into_iter()
            .map(|(_, r)| r)
            .collect();

        assert_eq!(
            boxes,
            vec![
                Rect::new(0.0, 0.0, 150.0, 800.0),
                Rect::new(150.0, 0.0, 600.0, 800.0),
                Rect::new(0.0, 0.0, 250.0, 400.0),
                Rect::new(250.0, 0.0, 1000.0, 400.0),
            ]
        );
    }

    #[test]
    fn test_copies_share_content() {
        let source = PdfDocument::load(sample_pdf(&[(600, 800)]), "sample").unwrap();
        let config = SplitConfig::even(Axis::Vertical, 3).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let out = reload(&mut out);

        let contents: Vec<lopdf::ObjectId> = out
            .page_ids()
            .into_iter()
            .map(|(_, id)| {
                let page = out.doc.get_dictionary(id).unwrap();
                assert!(page.has(b"CropBox"));
                assert!(page.has(b"Resources"));
                page.get(b"Contents").unwrap().as_reference().unwrap()
            })
            .collect();
        assert!(contents.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_nested_tree_is_flattened() {
        let source = PdfDocument::load(nested_tree_pdf(), "nested").unwrap();
        let config = SplitConfig::even(Axis::Horizontal, 2).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let out = reload(&mut out);

        assert_eq!(out.page_count(), 6);
        for (num, rect) in out.page_boxes() {
            let expected = if num % 2 == 1 {
                Rect::new(0.0, 100.0, 400.0, 200.0)
            } else {
                Rect::new(0.0, 0.0, 400.0, 100.0)
            };
            assert_eq!(rect, expected);
        }
        for (_, id) in out.page_ids() {
            assert!(out.doc.get_dictionary(id).unwrap().has(b"Resources"));
        }
    }

    #[test]
    fn test_source_document_untouched() {
        let source = PdfDocument::load(sample_pdf(&[(600, 800)]), "sample").unwrap();
        let config = SplitConfig::even(Axis::Vertical, 4).unwrap();
        split_document(&source, &config).unwrap();

        assert_eq!(source.page_count(), 1);
        assert_eq!(source.page_box(1).unwrap(), Rect::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn test_write_temp_produces_loadable_pdf() {
        let source = PdfDocument::load(sample_pdf(&[(600, 800)]), "sample").unwrap();
        let config = SplitConfig::even(Axis::Vertical, 2).unwrap();
        let mut out = split_document(&source, &config).unwrap();

        let path = write_temp(&mut out).unwrap();
        let written = PdfDocument::open(&path).unwrap();
        assert_eq!(written.page_count(), 2);

        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("split.pdf");
        let source = PdfDocument::load(sample_pdf(&[(600, 800)]), "sample").unwrap();
        let config = SplitConfig::even(Axis::Vertical, 2).unwrap();
        let mut out = split_document(&source, &config).unwrap();

        write_to_path(&mut out, &target).unwrap();
        assert_eq!(PdfDocument::open(&target).unwrap().page_count(), 2);
    }

    #[test]
    fn test_no_reference_points_at_a_removed_object() {
        let source = PdfDocument::load(annotated_pdf(), "annotated").unwrap();
        let config = SplitConfig::even(Axis::Vertical, 2).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let out = reload(&mut out);

        let mut refs = Vec::new();
        for object in out.doc.objects.values() {
            collect_references(object, &mut refs);
        }
        for (_, value) in out.doc.trailer.iter() {
            collect_references(value, &mut refs);
        }
        assert!(!refs.is_empty());
        for id in refs {
            assert!(out.doc.objects.contains_key(&id), "dangling reference {:?}", id);
        }

        let catalog = out.doc.catalog().unwrap();
        assert!(!catalog.has(b"OpenAction"));
        assert!(!catalog.has(b"AcroForm"));
    }

    #[test]
    fn test_each_part_owns_its_annotations() {
        let source = PdfDocument::load(annotated_pdf(), "annotated").unwrap();
        let config = SplitConfig::even(Axis::Horizontal, 2).unwrap();

        let mut out = split_document(&source, &config).unwrap();
        let out = reload(&mut out);
        let pages = out.page_ids();
        assert_eq!(pages.len(), 4);

        let mut seen = Vec::new();
        for (_, page_id) in &pages {
            let page = out.doc.get_dictionary(*page_id).unwrap();
            assert!(!page.has(b"StructParents"));
            let annots = page.get(b"Annots").unwrap().as_array().unwrap();
            assert_eq!(annots.len(), 1);
            let annot_id = annots[0].as_reference().unwrap();
            assert!(!seen.contains(&annot_id));
            seen.push(annot_id);

            let annot = out.doc.get_dictionary(annot_id).unwrap();
            assert_eq!(annot.get(b"P").unwrap().as_reference().unwrap(), *page_id);
        }

        // the link on page 1 jumped to page 2, now its first part
        let link = out.doc.get_dictionary(seen[0]).unwrap();
        let dest = link.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), pages[2].1);
    }
}
