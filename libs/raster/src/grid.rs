use common::TensorData;

/// A rectangular 2D array of finite numbers, as rendered by the raster
/// pipeline: a spectrogram, a feature-map activation block, or any other
/// heatmap-shaped payload.
///
/// The grid is forgiving about the data it is handed. Ragged rows and
/// non-finite cells are treated as "no value" — [`NumericGrid::value_at`]
/// returns `None` and the renderer skips the cell — rather than rejecting
/// the whole tensor.
#[derive(Debug, Clone)]
pub struct NumericGrid {
    values: Vec<Vec<f64>>,
    rows: usize,
    cols: usize,
}

impl NumericGrid {
    /// Build a grid from row-major values. Column count is the widest row,
    /// so shorter rows simply have missing trailing cells.
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        let rows = values.len();
        let cols = values.iter().map(|row| row.len()).max().unwrap_or(0);
        Self { values, rows, cols }
    }

    /// Build a grid from an inference-response tensor.
    pub fn from_tensor(tensor: &TensorData) -> Self {
        Self::new(tensor.values.clone())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Value at (row, col), or `None` for out-of-range, ragged-missing,
    /// NaN or infinite cells.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        let value = *self.values.get(row)?.get(col)?;
        if value.is_finite() {
            Some(value)
        } else {
            None
        }
    }

    /// Largest finite value in the grid, if any. Typical use: picking the
    /// ceiling of a dynamic-range window for decibel data.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |max, v| match max {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    /// Smallest finite value in the grid, if any.
    pub fn min_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |min, v| match min {
                Some(m) if m <= v => Some(m),
                _ => Some(v),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let grid = NumericGrid::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_empty_grid() {
        assert!(NumericGrid::new(vec![]).is_empty());
        assert!(NumericGrid::new(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_ragged_rows_read_as_missing() {
        let grid = NumericGrid::new(vec![vec![1.0, 2.0, 3.0], vec![4.0]]);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.value_at(1, 0), Some(4.0));
        assert_eq!(grid.value_at(1, 1), None);
        assert_eq!(grid.value_at(1, 2), None);
    }

    #[test]
    fn test_non_finite_cells_read_as_missing() {
        let grid = NumericGrid::new(vec![vec![1.0, f64::NAN, f64::INFINITY]]);
        assert_eq!(grid.value_at(0, 0), Some(1.0));
        assert_eq!(grid.value_at(0, 1), None);
        assert_eq!(grid.value_at(0, 2), None);
    }

    #[test]
    fn test_max_value_ignores_nan() {
        let grid = NumericGrid::new(vec![vec![-3.0, f64::NAN], vec![-1.0, -2.0]]);
        assert_eq!(grid.max_value(), Some(-1.0));
        assert_eq!(NumericGrid::new(vec![]).max_value(), None);
    }

    #[test]
    fn test_min_value_ignores_nan() {
        let grid = NumericGrid::new(vec![vec![-3.0, f64::NAN], vec![-1.0, -2.0]]);
        assert_eq!(grid.min_value(), Some(-3.0));
        assert_eq!(NumericGrid::new(vec![]).min_value(), None);
    }
}
