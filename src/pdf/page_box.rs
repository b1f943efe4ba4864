//! Page tree attribute lookup

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::layout::PageDimensions;

/// MediaBox used when a page and all its ancestors lack one (US Letter)
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against cyclic Parent or reference chains in broken files
const MAX_DEPTH: usize = 64;

/// Follow references until a direct object is reached
pub fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> Result<&'a Object> {
    for _ in 0..MAX_DEPTH {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id)?,
            _ => return Ok(obj),
        }
    }
    Err(Error::General("Reference chain too deep".to_string()))
}

/// Look up `key` on a page, walking up through Parent nodes when the page
/// itself does not carry it.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_DEPTH {
        let dict = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => node_id = *parent,
            _ => return None,
        }
    }
    None
}

/// The page's effective MediaBox as `[llx, lly, urx, ury]` with the lower
/// left corner first.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    let Some(obj) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return Ok(DEFAULT_MEDIA_BOX);
    };

    let array = match resolve(doc, &obj)?.as_array() {
        Ok(array) if array.len() == 4 => array,
        _ => return Ok(DEFAULT_MEDIA_BOX),
    };

    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(array) {
        *slot = resolve(doc, item)?.as_float()?;
    }

    let [x0, y0, x1, y1] = values;
    let rect = [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
    if rect[2] - rect[0] <= 0.0 || rect[3] - rect[1] <= 0.0 {
        return Ok(DEFAULT_MEDIA_BOX);
    }
    Ok(rect)
}

/// Width and height of the page's MediaBox in points
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<PageDimensions> {
    let [llx, lly, urx, ury] = media_box(doc, page_id)?;
    Ok(PageDimensions::new(urx - llx, ury - lly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn doc_with_inherited_box() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => Object::Integer(1),
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(842), Object::Real(595.0)],
                "Rotate" => Object::Integer(90),
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_inherited_media_box() {
        let (doc, page_id) = doc_with_inherited_box();
        assert_eq!(
            page_dimensions(&doc, page_id).unwrap(),
            PageDimensions::new(842.0, 595.0)
        );
        assert!(matches!(
            inherited_attribute(&doc, page_id, b"Rotate"),
            Some(Object::Integer(90))
        ));
        assert!(inherited_attribute(&doc, page_id, b"CropBox").is_none());
    }

    #[test]
    fn test_missing_media_box_defaults_to_letter() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(media_box(&doc, page_id).unwrap(), DEFAULT_MEDIA_BOX);
    }

    #[test]
    fn test_flipped_media_box_is_normalized() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![Object::Integer(100), Object::Integer(200), Object::Integer(0), Object::Integer(0)],
        });
        assert_eq!(media_box(&doc, page_id).unwrap(), [0.0, 0.0, 100.0, 200.0]);
    }
}
