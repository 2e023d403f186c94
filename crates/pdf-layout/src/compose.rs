//! Page canvas composition
//!
//! Walks a [`LayoutPlan`] and turns it into destination pages through two
//! seams:
//! - [`PageSource`]: read-only access to the input pages
//! - [`PageSink`]: creates destination pages and receives draw instructions
//!
//! The PDF-backed implementations live in [`crate::render`]. A failure while
//! placing one cell is logged and leaves that cell blank; a failure to create
//! a destination page aborts the whole run.

use crate::layout::{CellAssignment, CellContent, CellProjector, LayoutPlan, Projection, SourcePage};
use crate::types::{LayoutError, Result};

/// Read-only access to the pages of an input document
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Geometry of the page at a 0-based index
    fn page(&self, index: usize) -> Result<SourcePage>;
}

/// Opaque handle to a destination page created by a [`PageSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

/// Receiver of destination pages and their drawing instructions
pub trait PageSink {
    /// Append an empty destination page
    fn add_page(&mut self, width: f32, height: f32) -> Result<PageHandle>;

    /// Make the content of a source page drawable on `page`
    fn import_content(&mut self, page: PageHandle, source_index: usize) -> Result<()>;

    /// Append drawing instructions to `page`
    fn emit(&mut self, page: PageHandle, ops: &[crate::layout::DrawOp]) -> Result<()>;
}

/// Where the composer currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerState {
    #[default]
    Idle,
    BuildingPage { page: usize },
    EmittingCell { page: usize, cell: usize },
    PageComplete { page: usize },
}

/// Counters collected while composing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComposeReport {
    pub pages: usize,
    pub cells: usize,
    pub blank_cells: usize,
    /// Cells whose source page could not be placed and were left blank
    pub failed_cells: usize,
}

/// Composes planned pages onto a sink
#[derive(Debug, Clone, Default)]
pub struct PageCanvasComposer {
    projector: CellProjector,
    state: ComposerState,
}

impl PageCanvasComposer {
    pub fn new(projector: CellProjector) -> Self {
        Self {
            projector,
            state: ComposerState::Idle,
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    fn transition(&mut self, next: ComposerState) {
        log::trace!("composer: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Emit every page of `plan`, in order
    pub fn compose<S, K>(&mut self, plan: &LayoutPlan, source: &S, sink: &mut K) -> Result<ComposeReport>
    where
        S: PageSource + ?Sized,
        K: PageSink + ?Sized,
    {
        let mut report = ComposeReport::default();

        for (page_num, dest) in plan.pages.iter().enumerate() {
            self.transition(ComposerState::BuildingPage { page: page_num });
            let handle = sink.add_page(dest.width, dest.height)?;

            for (cell_num, assignment) in dest.cells.iter().enumerate() {
                self.transition(ComposerState::EmittingCell {
                    page: page_num,
                    cell: cell_num,
                });
                report.cells += 1;

                let placed = self
                    .place_cell(assignment, handle, source, sink)
                    .and_then(|projection| {
                        sink.emit(handle, &projection.ops)?;
                        Ok(projection.has_content())
                    });

                match placed {
                    Ok(has_content) => {
                        if !has_content {
                            report.blank_cells += 1;
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "Leaving cell {} of page {} blank: {}",
                            cell_num + 1,
                            page_num + 1,
                            e
                        );
                        report.failed_cells += 1;
                        report.blank_cells += 1;
                        sink.emit(handle, &self.projector.blank(&assignment.cell).ops)?;
                    }
                }
            }

            self.transition(ComposerState::PageComplete { page: page_num });
            report.pages += 1;
        }

        self.transition(ComposerState::Idle);
        log::debug!(
            "Composed {} pages ({} cells, {} blank, {} failed)",
            report.pages,
            report.cells,
            report.blank_cells,
            report.failed_cells
        );
        Ok(report)
    }

    fn place_cell<S, K>(
        &self,
        assignment: &CellAssignment,
        handle: PageHandle,
        source: &S,
        sink: &mut K,
    ) -> Result<Projection>
    where
        S: PageSource + ?Sized,
        K: PageSink + ?Sized,
    {
        let index = match assignment.content {
            CellContent::Blank => return Ok(self.projector.blank(&assignment.cell)),
            CellContent::Page(index) => index,
        };

        let failed = |e: LayoutError| LayoutError::CellProjection {
            page: index,
            reason: e.to_string(),
        };

        if index >= source.page_count() {
            return Err(LayoutError::CellProjection {
                page: index,
                reason: format!("document has {} pages", source.page_count()),
            });
        }
        let page = source.page(index).map_err(failed)?;
        let projection = self
            .projector
            .project_assignment(assignment, Some(&page))
            .map_err(failed)?;
        sink.import_content(handle, index).map_err(failed)?;
        Ok(projection)
    }
}
