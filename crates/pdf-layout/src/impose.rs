//! High-level layout operations
//!
//! Each operation follows the same three steps:
//! 1. Validate options (fail fast, before any plan exists)
//! 2. Build a [`LayoutPlan`] from the source page geometry
//! 3. Compose the plan into a fresh lopdf document
//!
//! The async entry points clone their inputs and run the synchronous work on
//! the blocking pool. A document is only returned once its whole plan was
//! composed.

use crate::compose::{PageCanvasComposer, PageSource};
use crate::layout::{
    CellProjector, LayoutPlan, ProjectionOptions, booklet_plan, nup_plan, poster_plan,
    section_split_plans,
};
use crate::options::{BookletOptions, LayoutOperation, NupOptions, PosterOptions, SectionSplitOptions};
use crate::render::{LopdfSink, LopdfSource};
use crate::types::*;
use lopdf::Document;
use std::path::{Path, PathBuf};

// =============================================================================
// I/O
// =============================================================================

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save a layout result
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, LayoutError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Save several documents; with more than one, each gets a `_<n>` suffix
/// (1-based) before the extension.
pub async fn save_all(docs: Vec<Document>, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let count = docs.len();
    let mut written = Vec::with_capacity(count);

    for (i, doc) in docs.into_iter().enumerate() {
        let target = if count == 1 {
            path.to_path_buf()
        } else {
            numbered_path(path, i + 1)
        };
        save_pdf(doc, &target).await?;
        written.push(target);
    }
    Ok(written)
}

/// `out.pdf` -> `out_3.pdf`
pub fn numbered_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    path.with_file_name(name)
}

// =============================================================================
// Operations
// =============================================================================

/// Arrange a document as a saddle-stitched booklet
pub async fn booklet(doc: &Document, options: &BookletOptions) -> Result<Document> {
    single(run(doc, &LayoutOperation::Booklet(options.clone())).await?)
}

/// Place several source pages on each sheet of a fixed paper size
pub async fn multi_page_layout(doc: &Document, options: &NupOptions) -> Result<Document> {
    single(run(doc, &LayoutOperation::MultiPage(options.clone())).await?)
}

/// Cut pages into sections. Returns one document, or one per source page
/// when `merge` is off.
pub async fn split_sections(doc: &Document, options: &SectionSplitOptions) -> Result<Vec<Document>> {
    run(doc, &LayoutOperation::SplitSections(options.clone())).await
}

/// Enlarge every page across several sheets of a target paper size
pub async fn poster(doc: &Document, options: &PosterOptions) -> Result<Document> {
    single(run(doc, &LayoutOperation::Poster(options.clone())).await?)
}

/// Run any layout operation; one output document per plan
pub async fn run(doc: &Document, operation: &LayoutOperation) -> Result<Vec<Document>> {
    operation.validate()?;

    let doc = doc.clone();
    let operation = operation.clone();

    tokio::task::spawn_blocking(move || run_sync(&doc, &operation)).await?
}

fn run_sync(doc: &Document, operation: &LayoutOperation) -> Result<Vec<Document>> {
    let plans = plan_layout(doc, operation)?;
    let projector = CellProjector::new(ProjectionOptions {
        add_border: add_border(operation),
        ..Default::default()
    });

    plans
        .iter()
        .map(|plan| compose_document(doc, plan, projector))
        .collect()
}

/// Build the plans for `operation` without rendering anything
pub fn plan_layout(doc: &Document, operation: &LayoutOperation) -> Result<Vec<LayoutPlan>> {
    operation.validate()?;
    let source = LopdfSource::new(doc);

    match operation {
        LayoutOperation::Booklet(options) => {
            let first = match source.page_count() {
                0 => None,
                _ => Some(source.page(0)?),
            };
            Ok(vec![booklet_plan(first.as_ref(), source.page_count(), options)?])
        }
        LayoutOperation::MultiPage(options) => Ok(vec![nup_plan(source.page_count(), options)?]),
        LayoutOperation::SplitSections(options) => section_split_plans(&source.pages(), options),
        LayoutOperation::Poster(options) => Ok(vec![poster_plan(&source.pages(), options)?]),
    }
}

/// Compose one plan against `doc` into a new document
pub fn compose_document(doc: &Document, plan: &LayoutPlan, projector: CellProjector) -> Result<Document> {
    let source = LopdfSource::new(doc);
    let mut sink = LopdfSink::new(doc);
    let report = PageCanvasComposer::new(projector).compose(plan, &source, &mut sink)?;

    if report.failed_cells > 0 {
        log::warn!(
            "{} of {} cells could not be placed and were left blank",
            report.failed_cells,
            report.cells
        );
    }
    Ok(sink.finish())
}

fn add_border(operation: &LayoutOperation) -> bool {
    match operation {
        LayoutOperation::Booklet(o) => o.add_border,
        LayoutOperation::MultiPage(o) => o.add_border,
        LayoutOperation::SplitSections(_) => false,
        LayoutOperation::Poster(o) => o.add_border,
    }
}

fn single(mut docs: Vec<Document>) -> Result<Document> {
    match docs.len() {
        1 => Ok(docs.remove(0)),
        n => Err(LayoutError::InvalidLayout(format!(
            "expected one output document, got {}",
            n
        ))),
    }
}
