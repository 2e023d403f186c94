//! Source page import
//!
//! Source pages are copied into the output document as Form XObjects, which
//! can then be painted into any number of cells with a `cm` transform. This
//! module also reads the page geometry (visible box and rotation) the
//! planners work from.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::{Rect, SourcePage};
use crate::types::{PageRotation, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Maps object ids of the source document to their copies in the output
pub type ObjectCache = HashMap<ObjectId, ObjectId>;

// =============================================================================
// Page Geometry
// =============================================================================

/// Read the geometry of a source page.
///
/// The visible box is the CropBox clipped to the MediaBox, falling back to
/// the MediaBox. Both boxes and `/Rotate` may be inherited from the page
/// tree. A `/Rotate` that is not a quarter turn is ignored.
pub fn read_source_page(doc: &Document, page_id: ObjectId, index: usize) -> Result<SourcePage> {
    let media_box = inherited(doc, page_id, b"MediaBox")?
        .and_then(|obj| read_rect(doc, &obj))
        .filter(Rect::is_drawable)
        .unwrap_or_else(|| Rect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1));

    let content_box = inherited(doc, page_id, b"CropBox")?
        .and_then(|obj| read_rect(doc, &obj))
        .and_then(|crop| intersect(&crop, &media_box))
        .unwrap_or(media_box);

    let degrees = match inherited(doc, page_id, b"Rotate")? {
        Some(Object::Integer(degrees)) => degrees,
        Some(Object::Real(degrees)) => degrees.round() as i64,
        _ => 0,
    };
    let rotation = PageRotation::from_degrees(degrees).unwrap_or_else(|_| {
        log::warn!(
            "page {}: /Rotate {} is not a multiple of 90, ignoring it",
            index + 1,
            degrees
        );
        PageRotation::None
    });

    Ok(SourcePage::new(index, content_box, rotation))
}

/// Look up a page attribute, walking up `/Parent` links when the page itself
/// does not carry it.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current = doc.get_dictionary(page_id)?;
    // Bounded walk; malformed files can contain Parent cycles
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Ok(Some(resolve(doc, value).clone()));
        }
        match current.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => current = doc.get_dictionary(parent_id)?,
            Err(_) => break,
        }
    }
    Ok(None)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Read a PDF rectangle `[llx lly urx ury]`, normalizing swapped corners
fn read_rect(doc: &Document, obj: &Object) -> Option<Rect> {
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut n = [0.0f32; 4];
    for (slot, value) in n.iter_mut().zip(values) {
        *slot = number(resolve(doc, value))?;
    }
    Some(Rect::from_corners(n[0], n[1], n[2], n[3]))
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn intersect(a: &Rect, b: &Rect) -> Option<Rect> {
    let rect = Rect::from_corners(
        a.x.max(b.x),
        a.y.max(b.y),
        a.right().min(b.right()),
        a.top().min(b.top()),
    );
    rect.is_drawable().then_some(rect)
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Copy a source page into `output` as a Form XObject.
///
/// The form's BBox is the visible box, so content outside the crop box is
/// clipped wherever the form is painted. Resources are deep-copied through
/// `cache` so objects shared between pages are only copied once.
pub fn import_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    geometry: &SourcePage,
    cache: &mut ObjectCache,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let content = page_content(source, page_dict)?;

    let b = &geometry.content_box;
    let mut form = Dictionary::new();
    form.set("Type", Object::Name(b"XObject".to_vec()));
    form.set("Subtype", Object::Name(b"Form".to_vec()));
    form.set("FormType", Object::Integer(1));
    form.set(
        "BBox",
        Object::Array(vec![
            Object::Real(b.x),
            Object::Real(b.y),
            Object::Real(b.right()),
            Object::Real(b.top()),
        ]),
    );

    if let Some(resources) = inherited(source, page_id, b"Resources")? {
        form.set("Resources", copy_object_deep(output, source, &resources, cache)?);
    }

    Ok(output.add_object(Stream::new(form, content)))
}

/// Decompressed content of a page; multiple content streams are joined
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let refs = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => return Ok(Vec::new()),
    };

    let mut content = Vec::new();
    for obj in &refs {
        let Object::Reference(id) = obj else { continue };
        if let Ok(stream) = doc.get_object(*id)?.as_stream() {
            content.extend(
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
            );
            content.push(b'\n');
        }
    }
    Ok(content)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from `source` into `output`, following references.
///
/// `/Parent` entries are dropped so copying an annotation or a resource that
/// points back into the page tree does not drag the whole tree along.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut ObjectCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            // Reserve the id first so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = copy_object_deep(output, source, source.get_object(*id)?, cache)?;
            output.objects.insert(new_id, copied);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let items: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(items?))
        }
        Object::Stream(stream) => {
            let dict = copy_dictionary(output, source, &stream.dict, cache)?;
            let mut copy = Stream::new(dict, stream.content.clone());
            copy.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copy))
        }
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut ObjectCache,
) -> Result<Dictionary> {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        copy.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(copy)
}
