//! Booklet (saddle-stitch) sequencing
//!
//! This module decides which source pages share each face of each folded
//! sheet. For a padded page count `N` and sheet `s`:
//!
//! ```text
//!   front: [N-1-2s | 2s  ]      e.g. N=8, s=0: [8 | 1]
//!   back:  [2s+1   | N-2-2s]                   [2 | 7]
//! ```
//!
//! Stacking the sheets in order and folding them once yields the pages in
//! reading order.

use crate::constants::{MIN_BOOKLET_CELL_MARGIN, PAGES_PER_BOOKLET_SHEET};
use crate::options::BookletOptions;
use crate::types::{LayoutError, Result, SpineLocation};

use super::{CellAssignment, CellContent, DestinationPage, LayoutPlan, Rect, Side, SourcePage};

/// Round a page count up to the next multiple of four
pub fn round_up_to_multiple_of_4(total_pages: usize) -> usize {
    total_pages.div_ceil(PAGES_PER_BOOKLET_SHEET) * PAGES_PER_BOOKLET_SHEET
}

/// Produce the ordered faces of a booklet.
///
/// Pure function of its inputs; indices past `total_pages` are padding and
/// come back as [`CellContent::Blank`].
pub fn sequence_sides(total_pages: usize, options: &BookletOptions) -> Vec<Side> {
    let padded = round_up_to_multiple_of_4(total_pages);
    let sheets = padded / PAGES_PER_BOOKLET_SHEET;
    let slot = |index: usize| CellContent::page_or_blank(index, total_pages);

    // Short-edge duplexers flip the back face horizontally. Manual duplexing
    // is left alone: the operator turns the stack over by hand.
    let swap_back = options.double_sided && options.flip_on_short_edge;

    let mut sides = Vec::with_capacity(sheets * 2);
    for s in 0..sheets {
        let front = Side::new(slot(padded - 1 - 2 * s), slot(2 * s), false);
        let back = Side::new(slot(2 * s + 1), slot(padded - 2 - 2 * s), true);
        let back = if swap_back { back.mirrored() } else { back };

        if options.duplex_pass.includes_front() {
            sides.push(front);
        }
        if options.duplex_pass.includes_back() {
            sides.push(back);
        }
    }

    if options.spine_location == SpineLocation::Right {
        sides.iter_mut().for_each(|side| *side = side.mirrored());
    }

    sides
}

/// Clamp a requested gutter to `[0, page_width/2 - 1]`
pub fn clamp_gutter(requested: f32, page_width: f32) -> f32 {
    let max = (page_width / 2.0 - MIN_BOOKLET_CELL_MARGIN).max(0.0);
    if requested.is_nan() {
        return 0.0;
    }
    requested.clamp(0.0, max)
}

/// Left and right cells of a landscape booklet face
pub fn booklet_cells(page_width: f32, page_height: f32, gutter: f32) -> Result<(Rect, Rect)> {
    let half = page_width / 2.0;
    let cell_width = half - gutter / 2.0;
    let left = Rect::new(0.0, 0.0, cell_width, page_height);
    let right = Rect::new(half + gutter / 2.0, 0.0, cell_width, page_height);

    if !left.is_drawable() {
        return Err(LayoutError::InvalidLayout(format!(
            "booklet cell would be {}x{} on a {}x{} sheet",
            cell_width, page_height, page_width, page_height
        )));
    }
    Ok((left, right))
}

/// Build the full booklet plan.
///
/// The destination size is the first page's visible box turned landscape;
/// every face becomes one destination page with a left and a right cell.
pub fn booklet_plan(
    first_page: Option<&SourcePage>,
    total_pages: usize,
    options: &BookletOptions,
) -> Result<LayoutPlan> {
    options.validate()?;

    let sides = sequence_sides(total_pages, options);
    let Some(first_page) = first_page else {
        return Ok(LayoutPlan::default());
    };

    let (display_w, display_h) = first_page.display_size();
    let (page_width, page_height) = (display_w.max(display_h), display_w.min(display_h));

    let gutter = if options.add_gutter {
        clamp_gutter(options.gutter_size, page_width)
    } else {
        0.0
    };
    let (left_cell, right_cell) = booklet_cells(page_width, page_height, gutter)?;

    log::debug!(
        "Booklet: {} source pages -> {} faces on {}x{} (gutter {})",
        total_pages,
        sides.len(),
        page_width,
        page_height,
        gutter
    );

    let pages = sides
        .iter()
        .map(|side| DestinationPage {
            width: page_width,
            height: page_height,
            cells: vec![
                CellAssignment::fit(left_cell, side.left),
                CellAssignment::fit(right_cell, side.right),
            ],
        })
        .collect();

    Ok(LayoutPlan::new(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DuplexPass, PageRotation};
    use CellContent::{Blank, Page};

    fn options() -> BookletOptions {
        BookletOptions::default()
    }

    #[test]
    fn test_padding_invariant() {
        for total in 0..64 {
            let padded = round_up_to_multiple_of_4(total);
            assert_eq!(padded % 4, 0);
            assert!(padded - total <= 3);
        }
    }

    #[test]
    fn test_five_page_booklet() {
        // N = 8, two sheets; positions 5, 6 and 7 are padding
        let sides = sequence_sides(5, &options());
        assert_eq!(
            sides,
            vec![
                Side::new(Blank, Page(0), false),
                Side::new(Page(1), Blank, true),
                Side::new(Blank, Page(2), false),
                Side::new(Page(3), Page(4), true),
            ]
        );
    }

    #[test]
    fn test_coverage_invariant() {
        for total in 0..40 {
            let sides = sequence_sides(total, &options());
            let mut seen: Vec<usize> = sides
                .iter()
                .flat_map(|s| [s.left, s.right])
                .filter_map(|c| c.page())
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..total).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_short_edge_flip_swaps_backs_only() {
        let long_edge = BookletOptions {
            double_sided: true,
            flip_on_short_edge: false,
            ..options()
        };
        let short_edge = BookletOptions {
            flip_on_short_edge: true,
            ..long_edge.clone()
        };

        let long = sequence_sides(12, &long_edge);
        let short = sequence_sides(12, &short_edge);
        for (l, s) in long.iter().zip(short.iter()) {
            if l.is_back {
                assert_eq!(*s, l.mirrored());
            } else {
                assert_eq!(s, l);
            }
        }
    }

    #[test]
    fn test_manual_duplex_skips_flip() {
        let manual = BookletOptions {
            double_sided: false,
            flip_on_short_edge: true,
            ..options()
        };
        assert_eq!(sequence_sides(8, &manual), sequence_sides(8, &options()));
    }

    #[test]
    fn test_duplex_filtering() {
        let total = 10;
        let sheets = round_up_to_multiple_of_4(total) / 4;

        let first = sequence_sides(
            total,
            &BookletOptions {
                duplex_pass: DuplexPass::First,
                ..options()
            },
        );
        assert_eq!(first.len(), sheets);
        assert!(first.iter().all(|s| !s.is_back));

        let second = sequence_sides(
            total,
            &BookletOptions {
                duplex_pass: DuplexPass::Second,
                ..options()
            },
        );
        assert_eq!(second.len(), sheets);
        assert!(second.iter().all(|s| s.is_back));

        assert_eq!(sequence_sides(total, &options()).len(), 2 * sheets);
    }

    #[test]
    fn test_right_spine_mirrors_every_side() {
        let rtl = BookletOptions {
            spine_location: SpineLocation::Right,
            ..options()
        };
        let ltr = sequence_sides(8, &options());
        let mirrored = sequence_sides(8, &rtl);
        for (l, r) in ltr.iter().zip(mirrored.iter()) {
            assert_eq!(*r, l.mirrored());
        }
    }

    #[test]
    fn test_idempotent() {
        let opts = BookletOptions {
            double_sided: true,
            flip_on_short_edge: true,
            ..options()
        };
        assert_eq!(sequence_sides(23, &opts), sequence_sides(23, &opts));
    }

    #[test]
    fn test_empty_document() {
        assert!(sequence_sides(0, &options()).is_empty());
        assert!(booklet_plan(None, 0, &options()).unwrap().is_empty());
    }

    #[test]
    fn test_gutter_clamp() {
        let page_width = 842.0;
        assert_eq!(clamp_gutter(page_width, page_width), page_width / 2.0 - 1.0);
        assert_eq!(clamp_gutter(-10.0, page_width), 0.0);
        assert_eq!(clamp_gutter(12.0, page_width), 12.0);

        let (left, right) =
            booklet_cells(page_width, 595.0, clamp_gutter(page_width, page_width)).unwrap();
        assert!(left.width > 0.0);
        assert_eq!(left.width, right.width);
        assert!(left.right() <= right.x);
    }

    #[test]
    fn test_plan_is_landscape_of_first_page() {
        let first = SourcePage::new(0, Rect::new(0.0, 0.0, 595.0, 842.0), PageRotation::None);
        let plan = booklet_plan(Some(&first), 4, &options()).unwrap();

        assert_eq!(plan.len(), 2);
        for page in &plan.pages {
            assert_eq!((page.width, page.height), (842.0, 595.0));
            assert_eq!(page.cells.len(), 2);
        }
        assert_eq!(plan.pages[0].cells[0].content, Page(3));
        assert_eq!(plan.pages[0].cells[1].content, Page(0));
    }

    #[test]
    fn test_gutter_splits_cells() {
        let first = SourcePage::new(0, Rect::new(0.0, 0.0, 500.0, 1000.0), PageRotation::None);
        let opts = BookletOptions {
            add_gutter: true,
            gutter_size: 20.0,
            ..options()
        };
        let plan = booklet_plan(Some(&first), 4, &opts).unwrap();
        let cells = &plan.pages[0].cells;
        assert_eq!(cells[0].cell, Rect::new(0.0, 0.0, 490.0, 500.0));
        assert_eq!(cells[1].cell, Rect::new(510.0, 0.0, 490.0, 500.0));
    }

    #[test]
    fn test_rejects_four_up_booklet() {
        let opts = BookletOptions {
            pages_per_sheet: 4,
            ..options()
        };
        assert!(matches!(
            booklet_plan(None, 8, &opts),
            Err(LayoutError::InvalidParameter(_))
        ));
    }
}
