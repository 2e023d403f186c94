//! lopdf-backed page source and sink
//!
//! [`LopdfSource`] reads page geometry from a loaded document.
//! [`LopdfSink`] builds a fresh output document: every destination page gets
//! one content stream, and each source page is imported once as a Form
//! XObject and shared by every cell that shows it.

use crate::compose::{PageHandle, PageSink, PageSource};
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::{DrawOp, Rect, SourcePage};
use crate::types::{LayoutError, PageRotation, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use super::xobject::{ObjectCache, import_page_xobject, read_source_page};

// =============================================================================
// Source
// =============================================================================

/// Read-only view of a loaded document's pages
pub struct LopdfSource<'a> {
    doc: &'a Document,
    page_ids: Vec<ObjectId>,
}

impl<'a> LopdfSource<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            page_ids: doc.get_pages().into_values().collect(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            LayoutError::InvalidLayout(format!(
                "page {} out of range ({} pages)",
                index,
                self.page_ids.len()
            ))
        })
    }

    /// Geometry of every page. An unreadable page is logged and planned at
    /// the fallback size; composing its cells then leaves them blank.
    pub fn pages(&self) -> Vec<SourcePage> {
        (0..self.page_count())
            .map(|i| {
                self.page(i).unwrap_or_else(|e| {
                    log::warn!("page {}: {}; planning it at the default size", i + 1, e);
                    let (width, height) = DEFAULT_PAGE_DIMENSIONS;
                    SourcePage::new(i, Rect::new(0.0, 0.0, width, height), PageRotation::None)
                })
            })
            .collect()
    }
}

impl PageSource for LopdfSource<'_> {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&self, index: usize) -> Result<SourcePage> {
        read_source_page(self.doc, self.page_id(index)?, index)
    }
}

// =============================================================================
// Sink
// =============================================================================

struct PendingPage {
    width: f32,
    height: f32,
    content: String,
    /// Resource name -> imported form
    xobjects: BTreeMap<String, ObjectId>,
}

/// Builds the output document page by page
pub struct LopdfSink<'a> {
    source: LopdfSource<'a>,
    output: Document,
    pages: Vec<PendingPage>,
    /// Source page index -> imported form
    forms: HashMap<usize, ObjectId>,
    objects: ObjectCache,
}

impl<'a> LopdfSink<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source: LopdfSource::new(source),
            output: Document::with_version("1.7"),
            pages: Vec::new(),
            forms: HashMap::new(),
            objects: ObjectCache::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn pending(&mut self, page: PageHandle) -> Result<&mut PendingPage> {
        self.pages
            .get_mut(page.0)
            .ok_or_else(|| LayoutError::InvalidLayout(format!("unknown destination page {}", page.0)))
    }

    /// Write the page tree and catalog and return the finished document
    pub fn finish(mut self) -> Document {
        let pages_tree_id = self.output.new_object_id();
        let mut page_refs = Vec::with_capacity(self.pages.len());

        for page in std::mem::take(&mut self.pages) {
            let content_id = self
                .output
                .add_object(Stream::new(Dictionary::new(), page.content.into_bytes()));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.xobjects {
                xobjects.set(name, Object::Reference(id));
            }
            let mut resources = Dictionary::new();
            resources.set("XObject", Object::Dictionary(xobjects));

            let page_dict = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_tree_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page.width),
                        Object::Real(page.height),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_refs.push(Object::Reference(self.output.add_object(page_dict)));
        }

        finalize_document(&mut self.output, pages_tree_id, page_refs);
        self.output
    }
}

impl PageSink for LopdfSink<'_> {
    fn add_page(&mut self, width: f32, height: f32) -> Result<PageHandle> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidLayout(format!(
                "destination page would be {}x{}",
                width, height
            )));
        }
        self.pages.push(PendingPage {
            width,
            height,
            content: String::new(),
            xobjects: BTreeMap::new(),
        });
        Ok(PageHandle(self.pages.len() - 1))
    }

    fn import_content(&mut self, page: PageHandle, source_index: usize) -> Result<()> {
        self.pending(page)?;

        let form_id = match self.forms.get(&source_index) {
            Some(&id) => id,
            None => {
                let geometry = self.source.page(source_index)?;
                let page_id = self.source.page_id(source_index)?;
                let id = import_page_xobject(
                    &mut self.output,
                    self.source.document(),
                    page_id,
                    &geometry,
                    &mut self.objects,
                )?;
                self.forms.insert(source_index, id);
                id
            }
        };

        self.pending(page)?
            .xobjects
            .insert(xobject_name(source_index), form_id);
        Ok(())
    }

    fn emit(&mut self, page: PageHandle, ops: &[DrawOp]) -> Result<()> {
        let pending = self.pending(page)?;
        for op in ops {
            if let DrawOp::DrawContent { source_page } = op {
                if !pending.xobjects.contains_key(&xobject_name(*source_page)) {
                    return Err(LayoutError::CellProjection {
                        page: *source_page,
                        reason: "content drawn before it was imported".to_string(),
                    });
                }
            }
        }
        write_ops(&mut pending.content, ops);
        Ok(())
    }
}

fn xobject_name(source_index: usize) -> String {
    format!("X{}", source_index)
}

/// Append content stream operators for `ops`
pub fn write_ops(out: &mut String, ops: &[DrawOp]) {
    for op in ops {
        // Writing into a String cannot fail
        let _ = match op {
            DrawOp::SaveState => writeln!(out, "q"),
            DrawOp::RestoreState => writeln!(out, "Q"),
            DrawOp::Transform(t) => writeln!(out, "{} cm", t.to_operands()),
            DrawOp::ClipRect(r) => writeln!(out, "{} {} {} {} re W n", r.x, r.y, r.width, r.height),
            DrawOp::DrawContent { source_page } => {
                writeln!(out, "/{} Do", xobject_name(*source_page))
            }
            DrawOp::StrokeRect { rect, line_width } => writeln!(
                out,
                "{} w {} {} {} {} re S",
                line_width, rect.x, rect.y, rect.width, rect.height
            ),
        };
    }
}

/// Create pages tree and catalog, finalize document structure
pub(crate) fn finalize_document(
    output: &mut Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Transform;

    #[test]
    fn test_write_ops() {
        let mut out = String::new();
        write_ops(
            &mut out,
            &[
                DrawOp::SaveState,
                DrawOp::ClipRect(Rect::new(0.0, 0.0, 10.0, 20.0)),
                DrawOp::Transform(Transform::translate(5.0, 6.0)),
                DrawOp::DrawContent { source_page: 3 },
                DrawOp::RestoreState,
                DrawOp::StrokeRect {
                    rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                    line_width: 1.5,
                },
            ],
        );
        assert_eq!(
            out,
            "q\n0 0 10 20 re W n\n1 0 0 1 5 6 cm\n/X3 Do\nQ\n1.5 w 1 2 3 4 re S\n"
        );
    }

    #[test]
    fn test_sink_rejects_degenerate_page() {
        let source = Document::with_version("1.7");
        let mut sink = LopdfSink::new(&source);
        assert!(sink.add_page(0.0, 100.0).is_err());
        assert!(sink.add_page(f32::NAN, 100.0).is_err());
        assert!(sink.add_page(100.0, 100.0).is_ok());
    }

    #[test]
    fn test_draw_requires_import() {
        let source = Document::with_version("1.7");
        let mut sink = LopdfSink::new(&source);
        let page = sink.add_page(100.0, 100.0).unwrap();
        let result = sink.emit(page, &[DrawOp::DrawContent { source_page: 0 }]);
        assert!(matches!(result, Err(LayoutError::CellProjection { page: 0, .. })));
    }

    #[test]
    fn test_import_missing_page_fails() {
        let source = Document::with_version("1.7");
        let mut sink = LopdfSink::new(&source);
        let page = sink.add_page(100.0, 100.0).unwrap();
        assert!(sink.import_content(page, 0).is_err());
    }

    #[test]
    fn test_finish_empty_document() {
        let source = Document::with_version("1.7");
        let doc = LopdfSink::new(&source).finish();
        assert_eq!(doc.get_pages().len(), 0);
    }
}
