use crate::constants::{MAX_COLS, MAX_DIVISIONS, MAX_PAGES_PER_SHEET, MAX_ROWS};
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Booklet (saddle-stitch) imposition options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BookletOptions {
    /// Pages per face; booklets are only defined for 2
    pub pages_per_sheet: usize,
    pub add_border: bool,
    pub spine_location: SpineLocation,
    pub add_gutter: bool,
    /// Gutter width in points, clamped to leave two usable cells
    pub gutter_size: f32,
    /// Printer duplexes automatically
    pub double_sided: bool,
    pub duplex_pass: DuplexPass,
    /// Printer flips on the short edge (only relevant with `double_sided`)
    pub flip_on_short_edge: bool,
}

impl Default for BookletOptions {
    fn default() -> Self {
        Self {
            pages_per_sheet: 2,
            add_border: false,
            spine_location: SpineLocation::Left,
            add_gutter: false,
            gutter_size: 12.0,
            double_sided: true,
            duplex_pass: DuplexPass::Both,
            flip_on_short_edge: false,
        }
    }
}

impl BookletOptions {
    pub fn validate(&self) -> Result<()> {
        if self.pages_per_sheet != 2 {
            return Err(LayoutError::invalid_parameter(
                "pagesPerSheet",
                format!(
                    "booklets support only 2 pages per sheet, got {}; use multi-page layout instead",
                    self.pages_per_sheet
                ),
            ));
        }
        Ok(())
    }
}

/// How the N-up grid is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NupMode {
    /// 2, 3, or a perfect square
    PagesPerSheet(usize),
    /// Explicit grid
    Custom { rows: usize, cols: usize },
}

impl Default for NupMode {
    fn default() -> Self {
        NupMode::PagesPerSheet(4)
    }
}

/// N-up multi-page layout options
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NupOptions {
    pub mode: NupMode,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub page_order: PageOrder,
    pub add_border: bool,
}

impl NupOptions {
    /// Validate and resolve to `(cols, rows)`
    pub fn grid(&self) -> Result<(usize, usize)> {
        let (cols, rows) = match self.mode {
            NupMode::PagesPerSheet(n) => crate::layout::nup_grid(n)?,
            NupMode::Custom { rows, cols } => {
                if rows == 0 || cols == 0 {
                    return Err(LayoutError::invalid_parameter(
                        "rows and cols",
                        "only strictly positive values are allowed",
                    ));
                }
                (cols, rows)
            }
        };

        if cols > MAX_COLS {
            return Err(LayoutError::invalid_parameter(
                "cols",
                format!("must be at most {}", MAX_COLS),
            ));
        }
        if rows > MAX_ROWS {
            return Err(LayoutError::invalid_parameter(
                "rows",
                format!("must be at most {}", MAX_ROWS),
            ));
        }
        if cols * rows > MAX_PAGES_PER_SHEET {
            return Err(LayoutError::invalid_parameter(
                "pagesPerSheet",
                format!("must be at most {}", MAX_PAGES_PER_SHEET),
            ));
        }
        Ok((cols, rows))
    }

    pub fn validate(&self) -> Result<()> {
        self.grid().map(|_| ())
    }
}

/// Section split options
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SectionSplitOptions {
    /// Number of cuts across the page width; `H = horizontal_divisions + 1`
    pub horizontal_divisions: usize,
    /// Number of cuts across the page height; `V = vertical_divisions + 1`
    pub vertical_divisions: usize,
    /// Put every section of every page into one document
    pub merge: bool,
    pub split_mode: SplitMode,
}

impl SectionSplitOptions {
    /// `(H, V)` section counts
    pub fn sections(&self) -> (usize, usize) {
        (self.horizontal_divisions + 1, self.vertical_divisions + 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizontal_divisions > MAX_DIVISIONS {
            return Err(LayoutError::invalid_parameter(
                "horizontalDivisions",
                format!("must be at most {}", MAX_DIVISIONS),
            ));
        }
        if self.vertical_divisions > MAX_DIVISIONS {
            return Err(LayoutError::invalid_parameter(
                "verticalDivisions",
                format!("must be at most {}", MAX_DIVISIONS),
            ));
        }
        if let SplitMode::Custom(list) = &self.split_mode {
            if list.trim().is_empty() {
                return Err(LayoutError::invalid_parameter(
                    "pageNumbers",
                    "required when splitMode is CUSTOM",
                ));
            }
        }
        Ok(())
    }
}

/// Poster tiling options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PosterOptions {
    /// Target sheet each tile is printed on
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    /// Tiles across the page width
    pub x_factor: usize,
    /// Tiles down the page height
    pub y_factor: usize,
    /// Emit the columns of each row right to left
    pub right_to_left: bool,
    pub add_border: bool,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            x_factor: 2,
            y_factor: 2,
            right_to_left: false,
            add_border: false,
        }
    }
}

impl PosterOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("xFactor", self.x_factor), ("yFactor", self.y_factor)] {
            if value == 0 || value > MAX_DIVISIONS {
                return Err(LayoutError::invalid_parameter(
                    name,
                    format!("must be between 1 and {}", MAX_DIVISIONS),
                ));
            }
        }
        Ok(())
    }
}

/// One layout operation and its parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayoutOperation {
    Booklet(BookletOptions),
    MultiPage(NupOptions),
    SplitSections(SectionSplitOptions),
    Poster(PosterOptions),
}

impl LayoutOperation {
    pub fn validate(&self) -> Result<()> {
        match self {
            LayoutOperation::Booklet(o) => o.validate(),
            LayoutOperation::MultiPage(o) => o.validate(),
            LayoutOperation::SplitSections(o) => o.validate(),
            LayoutOperation::Poster(o) => o.validate(),
        }
    }
}

/// A complete job: input, output and operation, storable as JSON
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutJob {
    pub input: PathBuf,
    /// Output file; split jobs without `merge` append `_<n>` per document
    pub output: PathBuf,
    pub operation: LayoutOperation,
}

impl LayoutJob {
    /// Load a job from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let job: LayoutJob = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse job: {}", e)))?;
        job.operation.validate()?;
        Ok(job)
    }

    /// Save the job to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize job: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
