//! Source pages as Form XObjects
//!
//! Each source page used by an export is copied once into the output
//! document as a Form XObject together with everything its resources
//! reference. Output pages then draw it with a single `Do`.

use crate::layout::Rect;
use crate::types::RenderError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, RenderError>;

/// Page-tree keys a page may inherit from its ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copy `page_id` of `source` into `output` as a Form XObject.
///
/// The form matrix shifts the MediaBox origin to `(0, 0)`, so drawing the
/// form at `(x, y)` puts the page's lower-left corner there even when the
/// source MediaBox does not start at the origin.
///
/// `cache` maps objects of `source` already present in `output` and must be
/// reused for every page of the same source.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let media_box = page_media_box(source, page_id)?;
    let content = page_content(source, page_id)?;

    let mut form = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Form".to_vec())),
        ("FormType", Object::Integer(1)),
        (
            "BBox",
            reals(&[media_box.x, media_box.y, media_box.right(), media_box.top()]),
        ),
        ("Matrix", reals(&[1.0, 0.0, 0.0, 1.0, -media_box.x, -media_box.y])),
    ]);

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        let copied = copy_object_deep(output, source, &resources, cache)?;
        form.set("Resources", copied);
    }

    Ok(output.add_object(Stream::new(form, content)))
}

fn reals(values: &[f32]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
}

/// Decoded page content. Multiple content streams are joined with newlines;
/// a page without `/Contents` yields an empty stream.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc.get_dictionary(page_id)?;

    let stream_ids: Vec<ObjectId> = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => references(items),
            _ => vec![*id],
        },
        Ok(Object::Array(items)) => references(items),
        _ => Vec::new(),
    };

    let mut parts = Vec::with_capacity(stream_ids.len());
    for id in stream_ids {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            parts.push(
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
            );
        }
    }
    Ok(parts.join(&b'\n'))
}

fn references(items: &[Object]) -> Vec<ObjectId> {
    items.iter().filter_map(|o| o.as_reference().ok()).collect()
}

// =============================================================================
// Object copying
// =============================================================================

/// Copy `obj` from `source` into `output`, following references.
///
/// Each referenced source object is copied at most once per `cache`. The
/// output id is recorded before the object's children are visited, so
/// reference cycles (e.g. `/Parent` links in annotations) terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    Ok(match obj {
        Object::Reference(id) => Object::Reference(copy_reference(output, source, *id, cache)?),
        Object::Dictionary(dict) => Object::Dictionary(copy_dictionary(output, source, dict, cache)?),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect::<Result<_>>()?,
        ),
        Object::Stream(stream) => {
            let mut copy = Stream::new(
                copy_dictionary(output, source, &stream.dict, cache)?,
                stream.content.clone(),
            );
            copy.allows_compression = stream.allows_compression;
            Object::Stream(copy)
        }
        other => other.clone(),
    })
}

fn copy_reference(
    output: &mut Document,
    source: &Document,
    id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    if let Some(copied) = cache.get(&id) {
        return Ok(*copied);
    }

    let new_id = output.new_object_id();
    cache.insert(id, new_id);
    let copied = copy_object_deep(output, source, source.get_object(id)?, cache)?;
    output.objects.insert(new_id, copied);
    Ok(new_id)
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        copy.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(copy)
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Look up a page attribute, walking up the page tree for inheritable keys.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let inheritable = INHERITABLE_KEYS.contains(&key);
    let mut current = doc.get_dictionary(page_id).ok()?;

    // Bounded walk; a malformed tree may loop through Parent
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value).clone());
        }
        if !inheritable {
            return None;
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// The page's MediaBox as a rectangle in default user space
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<Rect> {
    let numbers = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok().cloned())
        .map(|arr| arr.iter().filter_map(number).collect::<Vec<_>>());

    match numbers.as_deref() {
        Some([x0, y0, x1, y1]) => Ok(Rect::new(
            x0.min(*x1),
            y0.min(*y1),
            (x1 - x0).abs(),
            (y1 - y0).abs(),
        )),
        _ => Err(RenderError::MissingMediaBox),
    }
}

/// Width and height of the page's MediaBox in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let media_box = page_media_box(doc, page_id)?;
    Ok((media_box.width, media_box.height))
}

/// The page's `/Rotate` value normalized to 0, 90, 180 or 270
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .map(|r| r.rem_euclid(360))
        .unwrap_or(0)
}

fn number(obj: &Object) -> Option<f32> {
    match *obj {
        Object::Real(value) => Some(value),
        Object::Integer(value) => Some(value as f32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_array(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    /// A one-page document whose MediaBox and Rotate live on the Pages node
    fn inherited_doc() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m 10 10 l S".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
            ("MediaBox", number_array(&[10, 20, 310, 420])),
            ("Rotate", Object::Integer(-90)),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        (doc, page_id)
    }

    #[test]
    fn test_media_box_is_inherited() {
        let (doc, page_id) = inherited_doc();
        let media_box = page_media_box(&doc, page_id).unwrap();
        assert_eq!(media_box, Rect::new(10.0, 20.0, 300.0, 400.0));
        assert_eq!(get_page_dimensions(&doc, page_id).unwrap(), (300.0, 400.0));
    }

    #[test]
    fn test_rotation_is_normalized() {
        let (doc, page_id) = inherited_doc();
        assert_eq!(page_rotation(&doc, page_id), 270);
    }

    #[test]
    fn test_missing_media_box_is_an_error() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(Dictionary::from_iter(vec![(
            "Type",
            Object::Name(b"Page".to_vec()),
        )]));
        assert!(page_media_box(&doc, page_id).is_err());
    }

    #[test]
    fn test_xobject_is_anchored_at_media_box_origin() {
        let (source, page_id) = inherited_doc();
        let mut output = Document::with_version("1.7");
        let mut cache = HashMap::new();

        let xobject_id = create_page_xobject(&mut output, &source, page_id, &mut cache).unwrap();
        let stream = output.get_object(xobject_id).unwrap().as_stream().unwrap();

        assert_eq!(stream.content, b"0 0 m 10 10 l S".to_vec());
        let matrix = stream.dict.get(b"Matrix").unwrap().as_array().unwrap();
        assert_eq!(matrix[4].as_float().unwrap(), -10.0);
        assert_eq!(matrix[5].as_float().unwrap(), -20.0);
        assert!(stream.dict.get(b"Resources").is_ok());
    }

    #[test]
    fn test_copy_handles_reference_cycles() {
        let mut source = Document::with_version("1.7");
        let a_id = source.new_object_id();
        let b_id = source.add_object(Dictionary::from_iter(vec![("Next", Object::Reference(a_id))]));
        source.objects.insert(
            a_id,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(b_id))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = HashMap::new();
        let copied =
            copy_object_deep(&mut output, &source, &Object::Reference(a_id), &mut cache).unwrap();

        assert!(matches!(copied, Object::Reference(_)));
        assert_eq!(cache.len(), 2);
        assert_eq!(output.objects.len(), 2);
    }
}
