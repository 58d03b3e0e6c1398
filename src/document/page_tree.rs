//! Page tree traversal over the resolved graph.

use crate::types::PdfValue;
use std::collections::HashMap;

/// Page-dictionary object number → 1-based page ordinal in document
/// order.
pub type PageIndex = HashMap<u32, usize>;

/// Assigns ordinals to the page leaves reachable from `Root.Pages`,
/// depth-first and left-to-right over `Kids`.
///
/// Works over an already-resolved graph, so it cannot fail: a missing
/// or malformed page tree simply yields an empty index, and a leaf
/// without a `_ref` tag is skipped.
pub fn build_page_index(graph: &PdfValue) -> PageIndex {
    let mut index = PageIndex::new();

    let root = graph
        .as_dict()
        .and_then(|trailer| trailer.get("Root"))
        .and_then(PdfValue::as_dict);
    let pages = match root.and_then(|catalog| catalog.get("Pages")) {
        Some(pages) => pages,
        None => return index,
    };

    let mut next_ordinal = 1;
    collect_pages(pages, &mut index, &mut next_ordinal);
    log::debug!("page index: {} page(s)", index.len());
    index
}

fn collect_pages(node: &PdfValue, index: &mut PageIndex, next_ordinal: &mut usize) {
    let dict = match node.as_dict() {
        Some(dict) => dict,
        None => return,
    };

    match dict.get_type().map(|name| name.without_slash()) {
        Some("Pages") => {
            if let Some(PdfValue::Array(kids)) = dict.get("Kids") {
                for kid in kids.iter() {
                    collect_pages(kid, index, next_ordinal);
                }
            }
        }
        Some("Page") => {
            if let Some(PdfValue::Reference(reference)) = dict.get("_ref") {
                index.insert(reference.object_number, *next_ordinal);
                *next_ordinal += 1;
            }
        }
        _ => {}
    }
}
