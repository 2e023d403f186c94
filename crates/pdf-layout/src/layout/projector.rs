//! Cell projection
//!
//! Computes the draw instructions that place one source page inside one
//! destination cell:
//! - Rotation-aware fit scaling
//! - Centering, with compensation for crop boxes that do not start at the origin
//! - Quarter-turn rotation with a correction back into the positive quadrant
//! - Optional cell border, drawn after the content

use crate::constants::BORDER_LINE_WIDTH;
use crate::types::{LayoutError, Result};

use super::{CellAssignment, Placement, Rect, SourcePage, Transform, fit_scale};

/// One drawing instruction for a destination page content stream
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SaveState,
    RestoreState,
    /// Concatenate a matrix onto the current transform
    Transform(Transform),
    /// Intersect the clipping path with a rectangle
    ClipRect(Rect),
    /// Paint the imported content of a source page
    DrawContent { source_page: usize },
    /// Stroke a rectangle outline
    StrokeRect { rect: Rect, line_width: f32 },
}

/// Options for projecting pages into cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    /// Stroke the outline of every cell
    pub add_border: bool,
    /// Empty space kept between the cell edge and the content, on every side
    pub inset: f32,
    /// Extra uniform scale applied on top of the fit scale
    pub scale_factor: f32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            add_border: false,
            inset: 0.0,
            scale_factor: 1.0,
        }
    }
}

/// Result of projecting a cell
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Ordered draw instructions for the cell
    pub ops: Vec<DrawOp>,
    /// Final scale applied to the source content (1.0 for blank cells)
    pub scale: f32,
    /// Area covered by the drawn content, `None` for blank cells
    pub drawn: Option<Rect>,
}

impl Projection {
    /// The single matrix equivalent to all `Transform` ops, in order
    pub fn composed(&self) -> Transform {
        self.ops.iter().fold(Transform::IDENTITY, |acc, op| match op {
            DrawOp::Transform(t) => acc.concat(t),
            _ => acc,
        })
    }

    pub fn has_content(&self) -> bool {
        self.drawn.is_some()
    }
}

/// Transform from a page's own coordinates to its displayed frame: the
/// visible box lands on `[0, display_w] x [0, display_h]` the right way up.
///
/// The crop box origin is removed first, then the page is rotated clockwise
/// about the origin and shifted back into the positive quadrant. The shift
/// uses the pre-rotation box size: 90° needs `(-w, 0)`, 180° `(-w, -h)`,
/// 270° `(0, -h)`.
pub fn display_transform(page: &SourcePage) -> Transform {
    let b = &page.content_box;
    let correction = match page.rotation.degrees() {
        90 => (-b.width, 0.0),
        180 => (-b.width, -b.height),
        270 => (0.0, -b.height),
        _ => (0.0, 0.0),
    };
    Transform::rotate_clockwise(page.rotation)
        .concat(&Transform::translate(correction.0, correction.1))
        .concat(&Transform::translate(-b.x, -b.y))
}

/// Projects source pages into cells
#[derive(Debug, Clone, Copy, Default)]
pub struct CellProjector {
    options: ProjectionOptions,
}

impl CellProjector {
    pub fn new(options: ProjectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// Project a planned cell. `source` must be the page named by the
    /// assignment, or `None` for blank cells.
    pub fn project_assignment(
        &self,
        assignment: &CellAssignment,
        source: Option<&SourcePage>,
    ) -> Result<Projection> {
        match (assignment.placement, source) {
            (_, None) => Ok(self.blank(&assignment.cell)),
            (Placement::Fit, Some(page)) => self.project(Some(page), &assignment.cell),
            (Placement::Slice { offset }, Some(page)) => {
                self.project_slice(page, &assignment.cell, offset)
            }
            (Placement::FitRegion { region }, Some(page)) => {
                self.project_region(page, &assignment.cell, &region)
            }
        }
    }

    /// Fit `source` into `cell`, centered, preserving aspect ratio.
    pub fn project(&self, source: Option<&SourcePage>, cell: &Rect) -> Result<Projection> {
        let Some(page) = source else {
            return Ok(self.blank(cell));
        };

        let area = cell.inset(self.options.inset);
        let (eff_w, eff_h) = page.display_size();
        let scale = fit_scale(eff_w, eff_h, area.width, area.height)? * self.options.scale_factor;

        let drawn_w = eff_w * scale;
        let drawn_h = eff_h * scale;
        let tx = area.x + (area.width - drawn_w) / 2.0;
        let ty = area.y + (area.height - drawn_h) / 2.0;

        let mut ops = vec![
            DrawOp::SaveState,
            DrawOp::Transform(Transform::translate(tx, ty)),
            DrawOp::Transform(Transform::scale(scale, scale)),
            DrawOp::Transform(display_transform(page)),
            DrawOp::DrawContent {
                source_page: page.index,
            },
            DrawOp::RestoreState,
        ];
        self.push_border(&mut ops, cell);

        Ok(Projection {
            ops,
            scale,
            drawn: Some(Rect::new(tx, ty, drawn_w, drawn_h)),
        })
    }

    /// Draw the displayed page unscaled, shifted by `offset` relative to the
    /// cell origin, and clipped to the cell.
    pub fn project_slice(
        &self,
        page: &SourcePage,
        cell: &Rect,
        offset: (f32, f32),
    ) -> Result<Projection> {
        ensure_drawable(cell)?;

        let mut ops = vec![
            DrawOp::SaveState,
            DrawOp::ClipRect(*cell),
            DrawOp::Transform(Transform::translate(cell.x + offset.0, cell.y + offset.1)),
            DrawOp::Transform(display_transform(page)),
            DrawOp::DrawContent {
                source_page: page.index,
            },
            DrawOp::RestoreState,
        ];
        self.push_border(&mut ops, cell);

        Ok(Projection {
            ops,
            scale: 1.0,
            drawn: Some(*cell),
        })
    }

    /// Fit `region` of the displayed page into `cell`, centered, and clip
    /// away everything outside the region.
    pub fn project_region(
        &self,
        page: &SourcePage,
        cell: &Rect,
        region: &Rect,
    ) -> Result<Projection> {
        let area = cell.inset(self.options.inset);
        let scale = fit_scale(region.width, region.height, area.width, area.height)?
            * self.options.scale_factor;

        let drawn = Rect::new(
            area.x + (area.width - region.width * scale) / 2.0,
            area.y + (area.height - region.height * scale) / 2.0,
            region.width * scale,
            region.height * scale,
        );

        let mut ops = vec![
            DrawOp::SaveState,
            DrawOp::ClipRect(drawn),
            DrawOp::Transform(Transform::translate(drawn.x, drawn.y)),
            DrawOp::Transform(Transform::scale(scale, scale)),
            DrawOp::Transform(Transform::translate(-region.x, -region.y)),
            DrawOp::Transform(display_transform(page)),
            DrawOp::DrawContent {
                source_page: page.index,
            },
            DrawOp::RestoreState,
        ];
        self.push_border(&mut ops, cell);

        Ok(Projection {
            ops,
            scale,
            drawn: Some(drawn),
        })
    }

    /// Border-only projection, used for blank cells and failed cells
    pub fn blank(&self, cell: &Rect) -> Projection {
        let mut ops = Vec::new();
        self.push_border(&mut ops, cell);
        Projection {
            ops,
            scale: 1.0,
            drawn: None,
        }
    }

    fn push_border(&self, ops: &mut Vec<DrawOp>, cell: &Rect) {
        if self.options.add_border {
            ops.push(DrawOp::SaveState);
            ops.push(DrawOp::StrokeRect {
                rect: *cell,
                line_width: BORDER_LINE_WIDTH,
            });
            ops.push(DrawOp::RestoreState);
        }
    }
}

fn ensure_drawable(cell: &Rect) -> Result<()> {
    if cell.is_drawable() {
        Ok(())
    } else {
        Err(LayoutError::InvalidLayout(format!(
            "cell has non-positive size {}x{}",
            cell.width, cell.height
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageRotation;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn page(w: f32, h: f32, rotation: PageRotation) -> SourcePage {
        SourcePage::new(0, Rect::new(0.0, 0.0, w, h), rotation)
    }

    #[test]
    fn test_scale_fit_and_vertical_centering() {
        let projector = CellProjector::default();
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let projection = projector
            .project(Some(&page(200.0, 100.0, PageRotation::None)), &cell)
            .unwrap();

        assert!(approx(projection.scale, 0.5));
        let drawn = projection.drawn.unwrap();
        assert!(approx(drawn.width, 100.0));
        assert!(approx(drawn.height, 50.0));
        assert!(approx(drawn.x, 0.0));
        assert!(approx(drawn.y, 25.0));
    }

    #[test]
    fn test_rotation_swaps_before_fit() {
        let projector = CellProjector::default();
        let cell = Rect::new(0.0, 0.0, 100.0, 200.0);
        let source = page(200.0, 100.0, PageRotation::Clockwise90);
        assert_eq!(source.display_size(), (100.0, 200.0));

        let projection = projector.project(Some(&source), &cell).unwrap();
        assert!(approx(projection.scale, 1.0));
    }

    #[test]
    fn test_rotated_content_lands_inside_cell() {
        let projector = CellProjector::default();
        let cell = Rect::new(300.0, 40.0, 150.0, 120.0);

        for rotation in [
            PageRotation::None,
            PageRotation::Clockwise90,
            PageRotation::Clockwise180,
            PageRotation::Clockwise270,
        ] {
            let source = SourcePage::new(0, Rect::new(20.0, 30.0, 200.0, 100.0), rotation);
            let projection = projector.project(Some(&source), &cell).unwrap();
            let mapped = projection.composed().apply_rect(&source.content_box);
            let drawn = projection.drawn.unwrap();

            assert!(
                cell.contains_rect(&mapped, 0.01),
                "{:?}: {:?} not in {:?}",
                rotation,
                mapped,
                cell
            );
            assert!(approx(mapped.x, drawn.x) && approx(mapped.y, drawn.y));
            assert!(approx(mapped.width, drawn.width) && approx(mapped.height, drawn.height));
        }
    }

    #[test]
    fn test_rotation_keeps_top_edge_orientation() {
        // Clockwise 90: the original top edge ends up on the right
        let source = page(200.0, 100.0, PageRotation::Clockwise90);
        let t = display_transform(&source);
        let (x, _) = t.apply(100.0, 100.0);
        assert!(approx(x, 100.0));
        // Original left edge ends up at the top
        let (_, y) = t.apply(0.0, 50.0);
        assert!(approx(y, 200.0));
    }

    #[test]
    fn test_crop_offset_compensation() {
        let projector = CellProjector::default();
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let source = SourcePage::new(0, Rect::new(50.0, 50.0, 200.0, 100.0), PageRotation::None);
        let projection = projector.project(Some(&source), &cell).unwrap();

        let composed = projection.composed();
        // tx = 0 + (100 - 100)/2 - 50*0.5, ty = 25 - 50*0.5
        assert!(approx(composed.e, -25.0));
        assert!(approx(composed.f, 0.0));
        let (x, y) = composed.apply(50.0, 50.0);
        assert!(approx(x, 0.0) && approx(y, 25.0));
    }

    #[test]
    fn test_op_order_and_border_after_content() {
        let projector = CellProjector::new(ProjectionOptions {
            add_border: true,
            ..Default::default()
        });
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let projection = projector
            .project(Some(&page(100.0, 100.0, PageRotation::None)), &cell)
            .unwrap();

        assert_eq!(projection.ops.first(), Some(&DrawOp::SaveState));
        let draw_idx = projection
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::DrawContent { .. }))
            .unwrap();
        let border_idx = projection
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::StrokeRect { .. }))
            .unwrap();
        assert!(border_idx > draw_idx);
        assert_eq!(projection.ops[draw_idx + 1], DrawOp::RestoreState);
    }

    #[test]
    fn test_blank_cell_border_only() {
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);

        let plain = CellProjector::default().project(None, &cell).unwrap();
        assert!(plain.ops.is_empty());
        assert!(!plain.has_content());

        let bordered = CellProjector::new(ProjectionOptions {
            add_border: true,
            ..Default::default()
        })
        .project(None, &cell)
        .unwrap();
        assert!(
            bordered
                .ops
                .iter()
                .all(|op| !matches!(op, DrawOp::DrawContent { .. }))
        );
        assert!(
            bordered
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::StrokeRect { .. }))
        );
    }

    #[test]
    fn test_scale_factor_and_degenerate_cell() {
        let projector = CellProjector::new(ProjectionOptions {
            scale_factor: 0.5,
            ..Default::default()
        });
        let source = page(100.0, 100.0, PageRotation::None);
        let projection = projector
            .project(Some(&source), &Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        assert!(approx(projection.scale, 0.5));
        assert!(approx(projection.drawn.unwrap().x, 25.0));

        let err = projector.project(Some(&source), &Rect::new(0.0, 0.0, 0.0, 100.0));
        assert!(matches!(err, Err(LayoutError::InvalidLayout(_))));
    }

    #[test]
    fn test_slice_translation_and_clip() {
        let projector = CellProjector::default();
        let source = page(300.0, 200.0, PageRotation::None);
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let projection = projector
            .project_slice(&source, &cell, (-100.0, -100.0))
            .unwrap();

        assert_eq!(projection.ops[1], DrawOp::ClipRect(cell));
        let (x, y) = projection.composed().apply(150.0, 150.0);
        assert!(approx(x, 50.0) && approx(y, 50.0));
    }

    #[test]
    fn test_region_fit() {
        let projector = CellProjector::default();
        let source = page(400.0, 400.0, PageRotation::None);
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let region = Rect::new(200.0, 200.0, 200.0, 200.0);
        let projection = projector.project_region(&source, &cell, &region).unwrap();

        assert!(approx(projection.scale, 0.5));
        let (x, y) = projection.composed().apply(200.0, 200.0);
        assert!(approx(x, 0.0) && approx(y, 0.0));
        let (x, y) = projection.composed().apply(400.0, 400.0);
        assert!(approx(x, 100.0) && approx(y, 100.0));
    }
}
