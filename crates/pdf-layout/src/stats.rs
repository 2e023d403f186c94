use crate::constants::PAGES_PER_BOOKLET_SHEET;
use crate::layout::{LayoutPlan, round_up_to_multiple_of_4};
use crate::options::BookletOptions;
use crate::types::*;

/// Summary of a layout plan, available before anything is rendered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutStatistics {
    pub output_pages: usize,
    pub cells: usize,
    pub filled_cells: usize,
    pub blank_cells: usize,
    /// Distinct source pages shown by the plan
    pub source_pages_used: usize,
}

/// Booklet-specific counts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookletStatistics {
    pub source_pages: usize,
    /// Physical sheets, each printed on both faces
    pub sheets: usize,
    /// Faces emitted after duplex-pass filtering
    pub output_pages: usize,
    pub blank_pages_added: usize,
}

/// Calculate statistics for a plan
pub fn plan_statistics(plan: &LayoutPlan) -> LayoutStatistics {
    let cells: usize = plan.pages.iter().map(|p| p.cells.len()).sum();
    let mut used = plan.referenced_pages();
    let filled_cells = used.len();
    used.sort_unstable();
    used.dedup();

    LayoutStatistics {
        output_pages: plan.len(),
        cells,
        filled_cells,
        blank_cells: cells - filled_cells,
        source_pages_used: used.len(),
    }
}

/// Calculate booklet statistics without building a plan
pub fn booklet_statistics(total_pages: usize, options: &BookletOptions) -> Result<BookletStatistics> {
    options.validate()?;

    let padded = round_up_to_multiple_of_4(total_pages);
    let sheets = padded / PAGES_PER_BOOKLET_SHEET;
    let faces_per_sheet = [
        options.duplex_pass.includes_front(),
        options.duplex_pass.includes_back(),
    ]
    .iter()
    .filter(|included| **included)
    .count();

    Ok(BookletStatistics {
        source_pages: total_pages,
        sheets,
        output_pages: sheets * faces_per_sheet,
        blank_pages_added: padded - total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Rect, SourcePage, booklet_plan};

    #[test]
    fn test_booklet_statistics_match_plan() {
        let first = SourcePage::new(0, Rect::new(0.0, 0.0, 595.0, 842.0), PageRotation::None);
        for total in 1..20 {
            let options = BookletOptions::default();
            let stats = booklet_statistics(total, &options).unwrap();
            let plan = booklet_plan(Some(&first), total, &options).unwrap();

            assert_eq!(stats.output_pages, plan.len());
            let plan_stats = plan_statistics(&plan);
            assert_eq!(plan_stats.blank_cells, stats.blank_pages_added);
            assert_eq!(plan_stats.source_pages_used, total);
        }
    }

    #[test]
    fn test_single_pass_statistics() {
        let options = BookletOptions {
            duplex_pass: DuplexPass::Second,
            ..Default::default()
        };
        let stats = booklet_statistics(10, &options).unwrap();
        assert_eq!(stats.sheets, 3);
        assert_eq!(stats.output_pages, 3);
        assert_eq!(stats.blank_pages_added, 2);
    }
}
