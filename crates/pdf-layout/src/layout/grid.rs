//! Grid layout planning
//!
//! This module handles every layout that partitions a page into a regular
//! grid of cells:
//! - N-up: several source pages per destination sheet
//! - Section split: one source page cut into many destination pages
//! - Poster: section split with each tile enlarged onto a fixed paper size
//!
//! Rows are numbered from the top, while PDF coordinates grow upwards from
//! the bottom; [`grid_cell`] performs that inversion in one place.

use crate::options::{NupOptions, PosterOptions, SectionSplitOptions};
use crate::types::{LayoutError, Orientation, PageOrder, PaperSize, Result};

use super::{CellAssignment, CellContent, DestinationPage, LayoutPlan, Placement, Rect, SourcePage};

// =============================================================================
// Grid Primitives
// =============================================================================

/// Resolve an N-up page count to `(cols, rows)`.
///
/// 2 and 3 lay out in a single row; any other value must be an exact
/// perfect square.
pub fn nup_grid(pages_per_sheet: usize) -> Result<(usize, usize)> {
    match pages_per_sheet {
        2 | 3 => Ok((pages_per_sheet, 1)),
        n if n > 0 && n.isqrt() * n.isqrt() == n => Ok((n.isqrt(), n.isqrt())),
        n => Err(LayoutError::invalid_parameter(
            "pagesPerSheet",
            format!("must be 2, 3 or a perfect square, got {}", n),
        )),
    }
}

/// Grid position `(row, col)` of the `local_index`-th page on a sheet
pub fn cell_position(local_index: usize, cols: usize, rows: usize, order: PageOrder) -> (usize, usize) {
    match order {
        PageOrder::LrTd => (local_index / cols, local_index % cols),
        PageOrder::RlTd => (local_index / cols, cols - 1 - local_index % cols),
        PageOrder::TdLr => (local_index % rows, local_index / rows),
        PageOrder::TdRl => (local_index % rows, cols - 1 - local_index / rows),
    }
}

/// Bounds of cell `(row, col)` in a `cols x rows` grid over `area`.
/// Row 0 is the top row.
pub fn grid_cell(area: &Rect, cols: usize, rows: usize, row: usize, col: usize) -> Rect {
    let cell_width = area.width / cols as f32;
    let cell_height = area.height / rows as f32;
    Rect::new(
        area.x + col as f32 * cell_width,
        area.y + (rows - row - 1) as f32 * cell_height,
        cell_width,
        cell_height,
    )
}

/// Area of one sheet of `paper`; custom sizes must be finite and positive
fn sheet_area(paper: PaperSize, orientation: Orientation) -> Result<Rect> {
    let (width, height) = paper.dimensions_pt(orientation);
    let area = Rect::new(0.0, 0.0, width, height);
    if !area.is_drawable() {
        return Err(LayoutError::InvalidLayout(format!(
            "paper size {}x{} pt is not drawable",
            width, height
        )));
    }
    Ok(area)
}

// =============================================================================
// N-up
// =============================================================================

/// Plan an N-up layout on a fixed paper size.
///
/// Page `i` lands on sheet `i / per_sheet`; every sheet is fully populated
/// with cells, the unused tail of the last sheet as blanks.
pub fn nup_plan(total_pages: usize, options: &NupOptions) -> Result<LayoutPlan> {
    let (cols, rows) = options.grid()?;
    let per_sheet = cols * rows;
    let sheet_area = sheet_area(options.paper_size, options.orientation)?;
    let (page_width, page_height) = (sheet_area.width, sheet_area.height);

    let sheets = total_pages.div_ceil(per_sheet);
    let mut pages = Vec::with_capacity(sheets);

    for sheet in 0..sheets {
        let mut page = DestinationPage::new(page_width, page_height);
        for local in 0..per_sheet {
            let (row, col) = cell_position(local, cols, rows, options.page_order);
            let cell = grid_cell(&sheet_area, cols, rows, row, col);
            let content = CellContent::page_or_blank(sheet * per_sheet + local, total_pages);
            page.cells.push(CellAssignment::fit(cell, content));
        }
        pages.push(page);
    }

    log::debug!(
        "N-up: {} source pages on {} sheets of {}x{} cells",
        total_pages,
        sheets,
        cols,
        rows
    );

    Ok(LayoutPlan::new(pages))
}

// =============================================================================
// Section Split
// =============================================================================

/// Plan a section split.
///
/// Each included page becomes `H*V` pages, one per section, sized from that
/// page's own visible box and emitted top row first, left to right.
/// Excluded pages are passed through at their own size. With `merge` the
/// result is a single plan; otherwise one plan per source page.
pub fn section_split_plans(
    pages: &[SourcePage],
    options: &SectionSplitOptions,
) -> Result<Vec<LayoutPlan>> {
    options.validate()?;
    let included = options.split_mode.included_pages(pages.len())?;
    let (h, v) = options.sections();

    let mut plans = Vec::with_capacity(pages.len());
    for (page, &split) in pages.iter().zip(included.iter()) {
        let plan = if split {
            split_page(page, h, v)?
        } else {
            passthrough_page(page)
        };
        plans.push(plan);
    }

    if options.merge {
        let merged = plans.into_iter().flat_map(|p| p.pages).collect();
        return Ok(vec![LayoutPlan::new(merged)]);
    }
    Ok(plans)
}

fn split_page(page: &SourcePage, h: usize, v: usize) -> Result<LayoutPlan> {
    let (width, height) = page.display_size();
    let area = Rect::new(0.0, 0.0, width, height);

    let mut out = Vec::with_capacity(h * v);
    for j in 0..v {
        for i in 0..h {
            let region = grid_cell(&area, h, v, j, i);
            if !region.is_drawable() {
                return Err(LayoutError::InvalidLayout(format!(
                    "page {} section is {}x{}",
                    page.index, region.width, region.height
                )));
            }
            // region.y == sub_h * (v - 1 - j)
            let cell = Rect::new(0.0, 0.0, region.width, region.height);
            out.push(DestinationPage {
                width: region.width,
                height: region.height,
                cells: vec![CellAssignment {
                    cell,
                    content: CellContent::Page(page.index),
                    placement: Placement::Slice {
                        offset: (-region.x, -region.y),
                    },
                }],
            });
        }
    }
    Ok(LayoutPlan::new(out))
}

fn passthrough_page(page: &SourcePage) -> LayoutPlan {
    let (width, height) = page.display_size();
    LayoutPlan::new(vec![DestinationPage {
        width,
        height,
        cells: vec![CellAssignment::fit(
            Rect::new(0.0, 0.0, width, height),
            CellContent::Page(page.index),
        )],
    }])
}

// =============================================================================
// Poster
// =============================================================================

/// Plan poster tiles: every page is cut into `x_factor x y_factor` tiles and
/// each tile is fitted onto its own sheet of the target paper size.
pub fn poster_plan(pages: &[SourcePage], options: &PosterOptions) -> Result<LayoutPlan> {
    options.validate()?;
    let target = sheet_area(options.paper_size, options.orientation)?;
    let (target_w, target_h) = (target.width, target.height);
    let (cols, rows) = (options.x_factor, options.y_factor);

    let mut out = Vec::with_capacity(pages.len() * cols * rows);
    for page in pages {
        let (width, height) = page.display_size();
        let area = Rect::new(0.0, 0.0, width, height);

        for row in 0..rows {
            for col in 0..cols {
                let actual_col = if options.right_to_left {
                    cols - 1 - col
                } else {
                    col
                };
                let region = grid_cell(&area, cols, rows, row, actual_col);
                out.push(DestinationPage {
                    width: target_w,
                    height: target_h,
                    cells: vec![CellAssignment {
                        cell: target,
                        content: CellContent::Page(page.index),
                        placement: Placement::FitRegion { region },
                    }],
                });
            }
        }
    }

    log::debug!(
        "Poster: {} pages -> {} tiles on {}x{}",
        pages.len(),
        out.len(),
        target_w,
        target_h
    );

    Ok(LayoutPlan::new(out))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NupMode;
    use crate::types::{PageRotation, SplitMode};

    fn source(index: usize, w: f32, h: f32) -> SourcePage {
        SourcePage::new(index, Rect::new(0.0, 0.0, w, h), PageRotation::None)
    }

    #[test]
    fn test_nup_grid_dimensions() {
        assert_eq!(nup_grid(2).unwrap(), (2, 1));
        assert_eq!(nup_grid(3).unwrap(), (3, 1));
        assert_eq!(nup_grid(4).unwrap(), (2, 2));
        assert_eq!(nup_grid(9).unwrap(), (3, 3));
        assert_eq!(nup_grid(16).unwrap(), (4, 4));
    }

    #[test]
    fn test_nup_grid_rejects_non_squares() {
        for n in [0, 5, 6, 8, 15, 17] {
            assert!(
                matches!(nup_grid(n), Err(LayoutError::InvalidParameter(_))),
                "accepted {}",
                n
            );
        }
    }

    #[test]
    fn test_cell_position_orders() {
        // 3 cols x 2 rows
        assert_eq!(cell_position(4, 3, 2, PageOrder::LrTd), (1, 1));
        assert_eq!(cell_position(0, 3, 2, PageOrder::RlTd), (0, 2));
        assert_eq!(cell_position(1, 3, 2, PageOrder::TdLr), (1, 0));
        assert_eq!(cell_position(2, 3, 2, PageOrder::TdRl), (0, 1));
    }

    #[test]
    fn test_grid_cell_top_row_first() {
        let area = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(grid_cell(&area, 2, 2, 0, 0), Rect::new(0.0, 50.0, 100.0, 50.0));
        assert_eq!(grid_cell(&area, 2, 2, 1, 1), Rect::new(100.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_nup_assignment() {
        let options = NupOptions {
            mode: NupMode::PagesPerSheet(4),
            ..Default::default()
        };
        let plan = nup_plan(6, &options).unwrap();
        assert_eq!(plan.len(), 2);

        // Page 5 -> sheet 1, local index 1, row 0, col 1
        let sheet = &plan.pages[1];
        let cell = sheet.cells.iter().find(|c| c.content == CellContent::Page(5)).unwrap();
        let expected = grid_cell(&Rect::new(0.0, 0.0, sheet.width, sheet.height), 2, 2, 0, 1);
        assert_eq!(cell.cell, expected);

        // Tail of the last sheet is blank
        assert_eq!(sheet.cells.iter().filter(|c| c.content.is_blank()).count(), 2);
        assert_eq!(plan.referenced_pages(), (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_nup_new_sheet_on_boundary() {
        let options = NupOptions {
            mode: NupMode::PagesPerSheet(2),
            ..Default::default()
        };
        assert_eq!(nup_plan(4, &options).unwrap().len(), 2);
        assert_eq!(nup_plan(5, &options).unwrap().len(), 3);
        assert!(nup_plan(0, &options).unwrap().is_empty());
    }

    #[test]
    fn test_nup_custom_grid_limits() {
        let options = NupOptions {
            mode: NupMode::Custom { rows: 0, cols: 3 },
            ..Default::default()
        };
        assert!(matches!(nup_plan(3, &options), Err(LayoutError::InvalidParameter(_))));

        let options = NupOptions {
            mode: NupMode::Custom { rows: 1, cols: 301 },
            ..Default::default()
        };
        assert!(nup_plan(3, &options).is_err());

        let options = NupOptions {
            mode: NupMode::Custom { rows: 2, cols: 3 },
            ..Default::default()
        };
        assert_eq!(nup_plan(7, &options).unwrap().len(), 2);
    }

    #[test]
    fn test_section_split_translation() {
        let pages = [source(0, 300.0, 200.0)];
        let options = SectionSplitOptions {
            horizontal_divisions: 2,
            vertical_divisions: 1,
            merge: true,
            split_mode: SplitMode::All,
        };
        let plans = section_split_plans(&pages, &options).unwrap();
        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        assert_eq!(plan.len(), 6);

        for page in &plan.pages {
            assert_eq!((page.width, page.height), (100.0, 100.0));
        }
        // First section is the top-left: i=0, j=0 -> (0, -100)
        assert_eq!(
            plan.pages[0].cells[0].placement,
            Placement::Slice { offset: (-0.0, -100.0) }
        );
        // Last section is the bottom-right: i=2, j=1 -> (-200, 0)
        assert_eq!(
            plan.pages[5].cells[0].placement,
            Placement::Slice { offset: (-200.0, -0.0) }
        );
    }

    #[test]
    fn test_section_split_per_page_plans_and_passthrough() {
        let pages = [source(0, 100.0, 100.0), source(1, 200.0, 400.0), source(2, 100.0, 100.0)];
        let options = SectionSplitOptions {
            horizontal_divisions: 1,
            vertical_divisions: 1,
            merge: false,
            split_mode: SplitMode::AllExceptFirstAndLast,
        };
        let plans = section_split_plans(&pages, &options).unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].len(), 1);
        assert_eq!(plans[1].len(), 4);
        assert_eq!(plans[2].len(), 1);
        // Sized from the page's own box
        assert_eq!((plans[1].pages[0].width, plans[1].pages[0].height), (100.0, 200.0));
        assert_eq!(plans[0].pages[0].cells[0].placement, Placement::Fit);
    }

    #[test]
    fn test_section_split_custom_selection() {
        let pages: Vec<_> = (0..4).map(|i| source(i, 100.0, 100.0)).collect();
        let options = SectionSplitOptions {
            horizontal_divisions: 0,
            vertical_divisions: 1,
            merge: true,
            split_mode: SplitMode::Custom("2-3".to_string()),
        };
        let plan = &section_split_plans(&pages, &options).unwrap()[0];
        // pages 0 and 3 pass through, 1 and 2 split into two each
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_section_split_rotated_page_uses_display_size() {
        let pages = [SourcePage::new(0, Rect::new(0.0, 0.0, 200.0, 100.0), PageRotation::Clockwise90)];
        let options = SectionSplitOptions {
            horizontal_divisions: 1,
            merge: true,
            ..Default::default()
        };
        let plan = &section_split_plans(&pages, &options).unwrap()[0];
        assert_eq!((plan.pages[0].width, plan.pages[0].height), (50.0, 200.0));
    }

    #[test]
    fn test_poster_tiles() {
        let pages = [source(0, 1000.0, 1000.0)];
        let options = PosterOptions {
            x_factor: 2,
            y_factor: 3,
            right_to_left: true,
            ..Default::default()
        };
        let plan = poster_plan(&pages, &options).unwrap();
        assert_eq!(plan.len(), 6);

        // First tile: top row, rightmost column
        match plan.pages[0].cells[0].placement {
            Placement::FitRegion { region } => {
                assert_eq!(region.x, 500.0);
                assert!((region.y - 2000.0 / 3.0).abs() < 1e-3);
            }
            other => panic!("unexpected placement {:?}", other),
        }
    }

    #[test]
    fn test_poster_rejects_zero_factor() {
        let options = PosterOptions {
            x_factor: 0,
            ..Default::default()
        };
        assert!(poster_plan(&[source(0, 10.0, 10.0)], &options).is_err());
    }

    #[test]
    fn test_degenerate_paper_size_rejected() {
        let paper_size = PaperSize::Custom {
            width_mm: 0.0,
            height_mm: -10.0,
        };
        let nup = NupOptions {
            paper_size,
            ..Default::default()
        };
        assert!(matches!(nup_plan(4, &nup), Err(LayoutError::InvalidLayout(_))));

        let poster = PosterOptions {
            paper_size: PaperSize::Custom {
                width_mm: f32::NAN,
                height_mm: 100.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            poster_plan(&[source(0, 10.0, 10.0)], &poster),
            Err(LayoutError::InvalidLayout(_))
        ));
    }
}
