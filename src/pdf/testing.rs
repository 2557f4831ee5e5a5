//! In-memory PDFs for tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

fn page_content(doc: &mut Document, label: &str) -> Object {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 50.into()]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
        ],
    };
    let stream = Stream::new(Dictionary::new(), content.encode().unwrap());
    Object::Reference(doc.add_object(stream))
}

fn font_resources(doc: &mut Document) -> Object {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    Object::Dictionary(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    })
}

fn finish(doc: Document, pages_id: ObjectId) -> Vec<u8> {
    finish_with_catalog(doc, pages_id, Dictionary::new())
}

fn finish_with_catalog(mut doc: Document, pages_id: ObjectId, mut catalog: Dictionary) -> Vec<u8> {
    catalog.set("Type", "Catalog");
    catalog.set("Pages", pages_id);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// One page per `(width, height)`, each with its own MediaBox
pub fn sample_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources = font_resources(&mut doc);

    let mut kids = Vec::new();
    for (i, &(width, height)) in sizes.iter().enumerate() {
        let contents = page_content(&mut doc, &format!("Page {}", i + 1));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => contents,
            "Resources" => resources.clone(),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    finish(doc, pages_id)
}

/// Three 400x200 pages under an intermediate Pages node; MediaBox and
/// Resources live only on the root.
pub fn nested_tree_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let root_id = doc.new_object_id();
    let middle_id = doc.new_object_id();
    let resources = font_resources(&mut doc);

    let mut middle_kids = Vec::new();
    for i in 0..2 {
        let contents = page_content(&mut doc, &format!("Nested {}", i + 1));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => middle_id,
            "Contents" => contents,
        });
        middle_kids.push(Object::Reference(page_id));
    }
    let contents = page_content(&mut doc, "Top");
    let top_page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => root_id,
        "Contents" => contents,
    });

    doc.objects.insert(
        middle_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Count" => 2i64,
            "Kids" => middle_kids,
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 3i64,
            "Kids" => vec![Object::Reference(middle_id), Object::Reference(top_page)],
            "MediaBox" => vec![0.into(), 0.into(), 400.into(), 200.into()],
            "Resources" => resources,
        }),
    );
    finish(doc, root_id)
}

/// Two 600x800 pages whose annotations and catalog point at pages:
/// a link on page 1 jumping to page 2, a form widget on page 2 listed in
/// the AcroForm, and an OpenAction showing page 1.
pub fn annotated_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let first_id = doc.new_object_id();
    let second_id = doc.new_object_id();
    let resources = font_resources(&mut doc);

    let link_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![50.into(), 50.into(), 200.into(), 80.into()],
        "P" => first_id,
        "Dest" => vec![Object::Reference(second_id), "Fit".into()],
    });
    let widget_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "Rect" => vec![50.into(), 700.into(), 250.into(), 730.into()],
        "P" => second_id,
        "FT" => "Tx",
        "T" => Object::string_literal("name"),
    });

    for (page_id, label, annot_id) in [(first_id, "Linked", link_id), (second_id, "Form", widget_id)] {
        let contents = page_content(&mut doc, label);
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
                "Contents" => contents,
                "Resources" => resources.clone(),
                "Annots" => vec![Object::Reference(annot_id)],
                "StructParents" => 0i64,
            }),
        );
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 2i64,
            "Kids" => vec![Object::Reference(first_id), Object::Reference(second_id)],
        }),
    );
    let catalog = dictionary! {
        "OpenAction" => vec![Object::Reference(first_id), "Fit".into()],
        "AcroForm" => dictionary! { "Fields" => vec![Object::Reference(widget_id)] },
    };
    finish_with_catalog(doc, pages_id, catalog)
}
