//! Shared constants for page layout
//!
//! This module centralizes magic numbers and limits used throughout
//! the layout engine.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Fallback page size when a source page has no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

// =============================================================================
// Borders
// =============================================================================

/// Stroke width of cell borders (points)
pub const BORDER_LINE_WIDTH: f32 = 1.5;

// =============================================================================
// Grid Limits
// =============================================================================

/// Largest accepted N-up cell count
pub const MAX_PAGES_PER_SHEET: usize = 100_000;

/// Largest accepted column count for custom N-up grids
pub const MAX_COLS: usize = 300;

/// Largest accepted row count for custom N-up grids
pub const MAX_ROWS: usize = 300;

/// Largest accepted division count for section split and poster tiling
pub const MAX_DIVISIONS: usize = 300;

// =============================================================================
// Booklet
// =============================================================================

/// Source pages carried by one folded sheet (two faces, two cells each)
pub const PAGES_PER_BOOKLET_SHEET: usize = 4;

/// Minimum width left to each booklet cell after gutter clamping (points)
pub const MIN_BOOKLET_CELL_MARGIN: f32 = 1.0;
