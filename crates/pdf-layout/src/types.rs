use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    #[error("Failed to project source page {page}: {reason}")]
    CellProjection { page: usize, reason: String },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

impl LayoutError {
    pub(crate) fn invalid_parameter(name: &str, constraint: impl std::fmt::Display) -> Self {
        LayoutError::InvalidParameter(format!("{}: {}", name, constraint))
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

impl FromStr for Orientation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "PORTRAIT" => Ok(Orientation::Portrait),
            "LANDSCAPE" => Ok(Orientation::Landscape),
            _ => Err(LayoutError::invalid_parameter(
                "orientation",
                "only 'PORTRAIT' and 'LANDSCAPE' are supported",
            )),
        }
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Dimensions in points with orientation applied
    pub fn dimensions_pt(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        let (w, h) = (crate::constants::mm_to_pt(w), crate::constants::mm_to_pt(h));
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

impl FromStr for PaperSize {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A3" => Ok(PaperSize::A3),
            "A4" => Ok(PaperSize::A4),
            "A5" => Ok(PaperSize::A5),
            "LETTER" => Ok(PaperSize::Letter),
            "LEGAL" => Ok(PaperSize::Legal),
            "TABLOID" => Ok(PaperSize::Tabloid),
            other => Err(LayoutError::invalid_parameter(
                "pageSize",
                format!("unsupported paper size '{}'", other),
            )),
        }
    }
}

/// Rotation of a source page, as stored in its `/Rotate` entry.
///
/// PDF rotations turn the page clockwise when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageRotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl PageRotation {
    pub fn degrees(self) -> i32 {
        match self {
            PageRotation::None => 0,
            PageRotation::Clockwise90 => 90,
            PageRotation::Clockwise180 => 180,
            PageRotation::Clockwise270 => 270,
        }
    }

    /// Normalize an arbitrary multiple of 90 (negative or > 360 allowed).
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(PageRotation::None),
            90 => Ok(PageRotation::Clockwise90),
            180 => Ok(PageRotation::Clockwise180),
            270 => Ok(PageRotation::Clockwise270),
            _ => Err(LayoutError::invalid_parameter(
                "rotation",
                format!("{} is not a multiple of 90", degrees),
            )),
        }
    }

    /// True for quarter turns, where width and height trade places
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, PageRotation::Clockwise90 | PageRotation::Clockwise270)
    }
}

/// Which passes of a duplex print job to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplexPass {
    /// Fronts and backs interleaved
    #[default]
    Both,
    /// Front faces only (first pass through the printer)
    First,
    /// Back faces only (second pass)
    Second,
}

impl DuplexPass {
    pub fn includes_front(self) -> bool {
        matches!(self, DuplexPass::Both | DuplexPass::First)
    }

    pub fn includes_back(self) -> bool {
        matches!(self, DuplexPass::Both | DuplexPass::Second)
    }
}

impl FromStr for DuplexPass {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "BOTH" => Ok(DuplexPass::Both),
            "FIRST" => Ok(DuplexPass::First),
            "SECOND" => Ok(DuplexPass::Second),
            _ => Err(LayoutError::invalid_parameter(
                "duplexPass",
                "only 'BOTH', 'FIRST' and 'SECOND' are supported",
            )),
        }
    }
}

/// Edge of the folded booklet that carries the spine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpineLocation {
    /// Left-to-right reading order
    #[default]
    Left,
    /// Right-to-left reading order; every side is mirrored
    Right,
}

impl FromStr for SpineLocation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "LEFT" => Ok(SpineLocation::Left),
            "RIGHT" => Ok(SpineLocation::Right),
            _ => Err(LayoutError::invalid_parameter(
                "spineLocation",
                "only 'LEFT' and 'RIGHT' are supported",
            )),
        }
    }
}

/// Order in which source pages fill the cells of an N-up sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageOrder {
    /// Left to right, then top to bottom
    #[default]
    LrTd,
    /// Right to left, then top to bottom
    RlTd,
    /// Top to bottom, then left to right
    TdLr,
    /// Top to bottom, then right to left
    TdRl,
}

impl FromStr for PageOrder {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "LR_TD" => Ok(PageOrder::LrTd),
            "RL_TD" => Ok(PageOrder::RlTd),
            "TD_LR" => Ok(PageOrder::TdLr),
            "TD_RL" => Ok(PageOrder::TdRl),
            _ => Err(LayoutError::invalid_parameter(
                "pageOrder",
                "only 'LR_TD', 'RL_TD', 'TD_LR', and 'TD_RL' are supported",
            )),
        }
    }
}

/// Which source pages a section split applies to.
///
/// Pages outside the selection are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitMode {
    #[default]
    All,
    AllExceptFirst,
    AllExceptLast,
    AllExceptFirstAndLast,
    /// Explicit 1-based page list, e.g. `"1,3,5-7"`
    Custom(String),
}

impl SplitMode {
    /// Parse the request form of a split mode; `page_numbers` is only
    /// consulted for `CUSTOM`.
    pub fn parse(mode: &str, page_numbers: Option<&str>) -> Result<Self> {
        match mode.trim().to_ascii_uppercase().as_str() {
            "" | "SPLIT_ALL" => Ok(SplitMode::All),
            "SPLIT_ALL_EXCEPT_FIRST" => Ok(SplitMode::AllExceptFirst),
            "SPLIT_ALL_EXCEPT_LAST" => Ok(SplitMode::AllExceptLast),
            "SPLIT_ALL_EXCEPT_FIRST_AND_LAST" => Ok(SplitMode::AllExceptFirstAndLast),
            "CUSTOM" => match page_numbers {
                Some(pages) if !pages.trim().is_empty() => Ok(SplitMode::Custom(pages.to_string())),
                _ => Err(LayoutError::invalid_parameter(
                    "pageNumbers",
                    "required when splitMode is CUSTOM",
                )),
            },
            other => Err(LayoutError::invalid_parameter(
                "splitMode",
                format!("unsupported split mode '{}'", other),
            )),
        }
    }

    /// Resolve to a per-page inclusion mask for a document of `total_pages`.
    pub fn included_pages(&self, total_pages: usize) -> Result<Vec<bool>> {
        let last = total_pages.saturating_sub(1);
        let mask = match self {
            SplitMode::All => vec![true; total_pages],
            SplitMode::AllExceptFirst => (0..total_pages).map(|i| i != 0).collect(),
            SplitMode::AllExceptLast => (0..total_pages).map(|i| i != last).collect(),
            SplitMode::AllExceptFirstAndLast => {
                (0..total_pages).map(|i| i != 0 && i != last).collect()
            }
            SplitMode::Custom(list) => {
                let selected = parse_page_list(list, total_pages)?;
                let mut mask = vec![false; total_pages];
                for idx in selected {
                    mask[idx] = true;
                }
                mask
            }
        };
        Ok(mask)
    }
}

/// Parse a 1-based page list (`"all"`, `"3"`, `"1,4-6"`) into sorted, unique
/// 0-based indices. Numbers beyond the document are rejected.
pub fn parse_page_list(list: &str, total_pages: usize) -> Result<Vec<usize>> {
    let list = list.trim();
    if list.eq_ignore_ascii_case("all") {
        return Ok((0..total_pages).collect());
    }

    let parse_number = |s: &str| -> Result<usize> {
        let n: usize = s.trim().parse().map_err(|_| {
            LayoutError::invalid_parameter("pageNumbers", format!("'{}' is not a page number", s))
        })?;
        if n == 0 || n > total_pages {
            return Err(LayoutError::invalid_parameter(
                "pageNumbers",
                format!("page {} is outside 1..={}", n, total_pages),
            ));
        }
        Ok(n - 1)
    };

    let mut pages = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_number(start)?, parse_number(end)?);
                if start > end {
                    return Err(LayoutError::invalid_parameter(
                        "pageNumbers",
                        format!("range '{}' is descending", part.trim()),
                    ));
                }
                pages.extend(start..=end);
            }
            None => pages.push(parse_number(part)?),
        }
    }
    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}
