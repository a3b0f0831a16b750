/// Dynamic-range window for mapping raw values into [0, 1].
///
/// Spectrogram cells arrive as decibels, typically −80 to 0. A window of
/// `range` units below `max_value` is stretched over [0, 1]; everything
/// below the window floor clamps to 0. Pure and deterministic, so a render
/// pass over the same grid always produces the same pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicRange {
    max_value: f64,
    range: f64,
}

impl DynamicRange {
    /// A window `range` units wide ending at `max_value`. Negative widths
    /// collapse to zero.
    pub fn new(max_value: f64, range: f64) -> Self {
        Self {
            max_value,
            range: range.max(0.0),
        }
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Map a raw value into [0, 1].
    ///
    /// A zero-width window maps every input to 0 rather than dividing by
    /// zero. Values above the ceiling clamp to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        let threshold = self.max_value - self.range;
        if self.max_value <= threshold {
            return 0.0;
        }
        let clamped = value.max(threshold);
        ((clamped - threshold) / (self.max_value - threshold)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_endpoints() {
        let window = DynamicRange::new(0.0, 80.0);
        assert_eq!(window.normalize(0.0), 1.0);
        assert_eq!(window.normalize(-80.0), 0.0);
        assert_eq!(window.normalize(-40.0), 0.5);
    }

    #[test]
    fn test_below_floor_clamps_to_zero() {
        let window = DynamicRange::new(0.0, 60.0);
        assert_eq!(window.normalize(-100.0), 0.0);
        assert_eq!(window.normalize(-60.0), 0.0);
    }

    #[test]
    fn test_above_ceiling_clamps_to_one() {
        let window = DynamicRange::new(0.0, 60.0);
        assert_eq!(window.normalize(5.0), 1.0);
    }

    #[test]
    fn test_zero_width_window_is_flat_zero() {
        let window = DynamicRange::new(10.0, 0.0);
        assert_eq!(window.normalize(10.0), 0.0);
        assert_eq!(window.normalize(-50.0), 0.0);
        assert_eq!(window.normalize(500.0), 0.0);
    }

    #[test]
    fn test_output_stays_in_unit_interval() {
        let window = DynamicRange::new(30.0, 30.0);
        for value in [-120.0, -30.0, 0.0, 10.0, 29.9, 30.0] {
            let t = window.normalize(value);
            assert!((0.0..=1.0).contains(&t), "normalize({}) = {}", value, t);
        }
    }

    #[test]
    fn test_nonpositive_width_collapses() {
        let window = DynamicRange::new(0.0, -5.0);
        assert_eq!(window.range(), 0.0);
        assert_eq!(window.normalize(-1.0), 0.0);
    }
}
