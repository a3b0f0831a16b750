/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS color string for canvas fill styles.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation between two colors, `t` in [0, 1].
    pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| -> u8 {
            (x as f64 * (1.0 - t) + y as f64 * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }
}

/// A multi-stop gradient over the unit interval, with stops evenly spaced.
#[derive(Debug, Clone)]
pub struct Gradient {
    stops: Vec<Rgb>,
}

impl Gradient {
    /// A gradient needs at least two stops; fewer is a caller bug.
    pub fn new(stops: Vec<Rgb>) -> Self {
        assert!(stops.len() >= 2, "gradient needs at least two color stops");
        Self { stops }
    }

    /// Palette for decibel spectrograms: near-black floor up to a bright
    /// ceiling.
    pub fn spectrogram() -> Self {
        Self::new(vec![
            Rgb::new(10, 10, 15),
            Rgb::new(26, 42, 74),
            Rgb::new(61, 90, 128),
            Rgb::new(78, 205, 196),
            Rgb::new(224, 230, 237),
        ])
    }

    /// Palette for feature-map activations.
    pub fn feature_map() -> Self {
        Self::new(vec![
            Rgb::new(18, 18, 26),
            Rgb::new(78, 205, 196),
            Rgb::new(255, 107, 107),
        ])
    }

    pub fn grayscale() -> Self {
        Self::new(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)])
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at position `t`. Out-of-range and non-finite inputs clamp into
    /// [0, 1] rather than being rejected.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

        let segments = self.stops.len() - 1;
        let position = t * segments as f64;
        let index = (position.floor() as usize).min(segments - 1);
        let fraction = position - index as f64;

        Rgb::lerp(self.stops[index], self.stops[index + 1], fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_stop_gradient_is_linear() {
        let gradient = Gradient::grayscale();
        assert_eq!(gradient.sample(0.0), Rgb::new(0, 0, 0));
        assert_eq!(gradient.sample(1.0), Rgb::new(255, 255, 255));
        assert_eq!(gradient.sample(0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_out_of_range_input_clamps() {
        let gradient = Gradient::grayscale();
        assert_eq!(gradient.sample(-5.0), gradient.sample(0.0));
        assert_eq!(gradient.sample(5.0), gradient.sample(1.0));
    }

    #[test]
    fn test_nan_input_maps_to_floor() {
        let gradient = Gradient::grayscale();
        assert_eq!(gradient.sample(f64::NAN), gradient.sample(0.0));
    }

    #[test]
    fn test_multi_stop_hits_interior_stop() {
        let stops = vec![Rgb::new(0, 0, 0), Rgb::new(10, 20, 30), Rgb::new(255, 255, 255)];
        let gradient = Gradient::new(stops);
        assert_eq!(gradient.sample(0.5), Rgb::new(10, 20, 30));
        assert_eq!(gradient.sample(0.25), Rgb::new(5, 10, 15));
    }

    #[test]
    #[should_panic(expected = "at least two color stops")]
    fn test_single_stop_panics() {
        Gradient::new(vec![Rgb::new(0, 0, 0)]);
    }

    #[test]
    fn test_css_formatting() {
        assert_eq!(Rgb::new(78, 205, 196).css(), "rgb(78,205,196)");
    }
}
