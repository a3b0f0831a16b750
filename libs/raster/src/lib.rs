//! Numeric-array-to-raster rendering pipeline.
//!
//! Turns the 2D tensors an inference endpoint ships back — spectrograms,
//! CNN feature maps — into colored rectangles on an abstract drawing
//! surface, under a clamped pan/zoom transform and a configurable
//! decibel-range window. Everything here is pure and synchronous; the one
//! trait, [`PaintSurface`], is the seam where a real canvas plugs in.

mod color;
mod dynamics;
mod grid;
mod render;
mod surface;
mod transform;
pub mod waveform;

pub use color::{Gradient, Rgb};
pub use dynamics::DynamicRange;
pub use grid::NumericGrid;
pub use render::render_grid;
pub use surface::{PaintOp, PaintSurface, RecordingSurface};
pub use transform::{ViewTransform, MAX_SCALE, MIN_SCALE};
