use crate::color::Rgb;
use crate::dynamics::DynamicRange;
use crate::grid::NumericGrid;
use crate::surface::PaintSurface;
use crate::transform::ViewTransform;

/// Paint a numeric grid onto a surface of known pixel dimensions.
///
/// Each cell gets `width / cols` by `height / rows` pixels. Row 0 of the
/// grid is painted at the *bottom* of the surface — spectrogram
/// orientation, frequency increasing upward. The flip is a fixed rule, not
/// an option.
///
/// Cells whose value is missing (ragged row) or non-finite are skipped
/// silently; partial data still produces a partial picture. An empty grid
/// clears the surface and draws nothing. The call holds no state between
/// runs, so it is safe to re-run on every resize or transform change, and
/// identical inputs paint identical output as long as `color` is pure.
pub fn render_grid<S, F>(
    surface: &mut S,
    grid: &NumericGrid,
    transform: &ViewTransform,
    dynamics: &DynamicRange,
    color: F,
    width: f64,
    height: f64,
) where
    S: PaintSurface,
    F: Fn(f64) -> Rgb,
{
    surface.clear(width, height);

    if grid.is_empty() {
        return;
    }

    let rows = grid.rows();
    let cols = grid.cols();
    let cell_width = width / cols as f64;
    let cell_height = height / rows as f64;

    surface.begin_transform(transform);

    for row in 0..rows {
        let y = (rows - row - 1) as f64 * cell_height;
        for col in 0..cols {
            let Some(value) = grid.value_at(row, col) else {
                continue;
            };
            let rgb = color(dynamics.normalize(value));
            surface.fill_rect(col as f64 * cell_width, y, cell_width, cell_height, rgb);
        }
    }

    surface.end_transform();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Gradient;
    use crate::surface::{PaintOp, RecordingSurface};

    fn paint(grid: &NumericGrid) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        let gradient = Gradient::grayscale();
        render_grid(
            &mut surface,
            grid,
            &ViewTransform::identity(),
            &DynamicRange::new(1.0, 1.0),
            |t| gradient.sample(t),
            100.0,
            100.0,
        );
        surface
    }

    #[test]
    fn test_empty_grid_clears_and_draws_nothing() {
        let surface = paint(&NumericGrid::new(vec![]));
        assert_eq!(
            surface.ops,
            vec![PaintOp::Clear {
                width: 100.0,
                height: 100.0
            }]
        );
    }

    #[test]
    fn test_cell_count_and_size() {
        let grid = NumericGrid::new(vec![vec![0.0, 1.0], vec![0.5, 0.25]]);
        let surface = paint(&grid);
        let fills = surface.fills();
        assert_eq!(fills.len(), 4);
        for op in fills {
            let PaintOp::FillRect { width, height, .. } = op else {
                unreachable!();
            };
            assert_eq!(*width, 50.0);
            assert_eq!(*height, 50.0);
        }
    }

    #[test]
    fn test_row_zero_paints_at_bottom() {
        let grid = NumericGrid::new(vec![vec![0.0], vec![1.0]]);
        let surface = paint(&grid);
        let fills = surface.fills();
        // row 0 (value 0.0, black) lands in the lower band
        assert_eq!(
            *fills[0],
            PaintOp::FillRect {
                x: 0.0,
                y: 50.0,
                width: 100.0,
                height: 50.0,
                color: Rgb::new(0, 0, 0),
            }
        );
        // row 1 (value 1.0, white) lands in the upper band
        assert_eq!(
            *fills[1],
            PaintOp::FillRect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 50.0,
                color: Rgb::new(255, 255, 255),
            }
        );
    }

    #[test]
    fn test_nan_cell_contributes_no_fill() {
        let with_nan = NumericGrid::new(vec![vec![0.2, f64::NAN], vec![0.4, 0.6]]);
        let surface = paint(&with_nan);
        assert_eq!(surface.fills().len(), 3);

        // the surviving cells paint exactly as they would without the NaN
        let clean = NumericGrid::new(vec![vec![0.2], vec![0.4, 0.6]]);
        let clean_surface = paint(&clean);
        assert_eq!(surface.fills(), clean_surface.fills());
    }

    #[test]
    fn test_render_is_idempotent() {
        let grid = NumericGrid::new(vec![vec![0.1, 0.9], vec![0.5, 0.3]]);
        let first = paint(&grid);
        let second = paint(&grid);
        assert_eq!(first.ops, second.ops);
    }

    #[test]
    fn test_transform_brackets_the_fills() {
        let grid = NumericGrid::new(vec![vec![0.5]]);
        let surface = paint(&grid);
        assert!(matches!(surface.ops[0], PaintOp::Clear { .. }));
        assert!(matches!(surface.ops[1], PaintOp::BeginTransform(_)));
        assert!(matches!(surface.ops.last(), Some(PaintOp::EndTransform)));
    }
}
