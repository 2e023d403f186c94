//! Layout data types
//!
//! These types represent the plan produced by the sequencers and planners
//! and consumed by the composer. A plan holds no document handles, only
//! page indices and geometry.

use super::Rect;
use crate::types::PageRotation;

/// Read-only view of one page of the input document
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePage {
    /// 0-based index in the source document
    pub index: usize,
    /// Visible region of the page (crop box)
    pub content_box: Rect,
    /// Normalized display rotation
    pub rotation: PageRotation,
}

impl SourcePage {
    pub fn new(index: usize, content_box: Rect, rotation: PageRotation) -> Self {
        Self {
            index,
            content_box,
            rotation,
        }
    }

    /// Displayed size of the visible region, rotation applied
    pub fn display_size(&self) -> (f32, f32) {
        super::rotated_bounds(&self.content_box, self.rotation)
    }
}

/// What occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellContent {
    /// A source page by 0-based index
    Page(usize),
    /// Padding; nothing is drawn except an optional border
    Blank,
}

impl CellContent {
    /// `Page(index)` when `index < total_pages`, otherwise `Blank`
    pub fn page_or_blank(index: usize, total_pages: usize) -> Self {
        if index < total_pages {
            CellContent::Page(index)
        } else {
            CellContent::Blank
        }
    }

    pub fn page(&self) -> Option<usize> {
        match self {
            CellContent::Page(index) => Some(*index),
            CellContent::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellContent::Blank)
    }
}

/// How a source page is placed into its cell
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// Scale to fit and center (booklet, N-up)
    Fit,
    /// Unscaled slice of the page: the displayed page is shifted by
    /// `offset` and clipped to the cell (section split)
    Slice { offset: (f32, f32) },
    /// Fit a sub-region of the displayed page into the cell (poster tiles)
    FitRegion { region: Rect },
}

/// A cell on a destination page and what goes into it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAssignment {
    pub cell: Rect,
    pub content: CellContent,
    pub placement: Placement,
}

impl CellAssignment {
    pub fn fit(cell: Rect, content: CellContent) -> Self {
        Self {
            cell,
            content,
            placement: Placement::Fit,
        }
    }
}

/// One face of a booklet sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Side {
    pub left: CellContent,
    pub right: CellContent,
    pub is_back: bool,
}

impl Side {
    pub fn new(left: CellContent, right: CellContent, is_back: bool) -> Self {
        Self {
            left,
            right,
            is_back,
        }
    }

    /// The same face with left and right exchanged
    pub fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            is_back: self.is_back,
        }
    }
}

/// A page of the destination document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DestinationPage {
    pub width: f32,
    pub height: f32,
    pub cells: Vec<CellAssignment>,
}

impl DestinationPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cells: Vec::new(),
        }
    }
}

/// Ordered destination pages; the sole hand-off between planning and composing
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutPlan {
    pub pages: Vec<DestinationPage>,
}

impl LayoutPlan {
    pub fn new(pages: Vec<DestinationPage>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Every source page index referenced by the plan, in cell order
    pub fn referenced_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .flat_map(|p| p.cells.iter())
            .filter_map(|c| c.content.page())
            .collect()
    }
}
