use crate::color::Rgb;
use crate::transform::ViewTransform;

/// Abstract drawing surface the raster renderer paints onto.
///
/// The renderer decides *what* to paint; the surface decides *how*. A wasm
/// frontend implements this over a canvas 2D context; tests use
/// [`RecordingSurface`] and assert on the recorded operations, so the whole
/// pipeline runs without any graphics context.
pub trait PaintSurface {
    /// Wipe the surface to its background.
    fn clear(&mut self, width: f64, height: f64);

    /// Apply a translate-then-scale transform to everything painted until
    /// [`PaintSurface::end_transform`].
    fn begin_transform(&mut self, transform: &ViewTransform);

    /// Restore the untransformed state.
    fn end_transform(&mut self);

    /// Fill an axis-aligned rectangle in (possibly transformed) surface
    /// coordinates.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);
}

/// A single recorded paint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Clear { width: f64, height: f64 },
    BeginTransform(ViewTransform),
    EndTransform,
    FillRect { x: f64, y: f64, width: f64, height: f64, color: Rgb },
}

/// A [`PaintSurface`] that records every operation instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<PaintOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Just the fill operations, in paint order.
    pub fn fills(&self) -> Vec<&PaintOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, PaintOp::FillRect { .. }))
            .collect()
    }
}

impl PaintSurface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(PaintOp::Clear { width, height });
    }

    fn begin_transform(&mut self, transform: &ViewTransform) {
        self.ops.push(PaintOp::BeginTransform(*transform));
    }

    fn end_transform(&mut self) {
        self.ops.push(PaintOp::EndTransform);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.ops.push(PaintOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }
}
