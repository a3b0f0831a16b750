/// Zoom bounds for a view transform. Scales outside this range produce
/// degenerate rendering, so setters clamp into it.
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 10.0;

/// Pan/zoom state for a rendered panel.
///
/// Screen position of a world point is `world * scale + translate`; a
/// drawing surface applies this as translate-then-scale on the whole
/// context before cells are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale_x: f64,
    scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewTransform {
    pub fn new(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale_x: scale_x.clamp(MIN_SCALE, MAX_SCALE),
            scale_y: scale_y.clamp(MIN_SCALE, MAX_SCALE),
            translate_x,
            translate_y,
        }
    }

    /// No pan, no zoom.
    pub fn identity() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Screen coordinates back to world coordinates.
    pub fn screen_to_world(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (
            (screen_x - self.translate_x) / self.scale_x,
            (screen_y - self.translate_y) / self.scale_y,
        )
    }

    /// World coordinates to screen coordinates.
    pub fn apply(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        (
            world_x * self.scale_x + self.translate_x,
            world_y * self.scale_y + self.translate_y,
        )
    }

    /// Zoom in (`factor > 1`) or out (`factor < 1`) keeping the world point
    /// under `(screen_x, screen_y)` fixed on screen.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, factor: f64) {
        let (world_x, world_y) = self.screen_to_world(screen_x, screen_y);

        self.scale_x = (self.scale_x * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.scale_y = (self.scale_y * factor).clamp(MIN_SCALE, MAX_SCALE);

        self.translate_x = screen_x - world_x * self.scale_x;
        self.translate_y = screen_y - world_y * self.scale_y;
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_round_trip() {
        let transform = ViewTransform::identity();
        assert_eq!(transform.apply(10.0, 20.0), (10.0, 20.0));
        assert_eq!(transform.screen_to_world(10.0, 20.0), (10.0, 20.0));
    }

    #[test]
    fn test_apply_inverts_screen_to_world() {
        let transform = ViewTransform::new(2.0, 3.0, 15.0, -4.0);
        let (wx, wy) = transform.screen_to_world(100.0, 50.0);
        let (sx, sy) = transform.apply(wx, wy);
        assert!((sx - 100.0).abs() < 1e-9);
        assert!((sy - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_clamped_on_construction() {
        let transform = ViewTransform::new(100.0, 0.01, 0.0, 0.0);
        assert_eq!(transform.scale_x(), MAX_SCALE);
        assert_eq!(transform.scale_y(), MIN_SCALE);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut transform = ViewTransform::identity();
        for _ in 0..100 {
            transform.zoom_at(400.0, 300.0, 1.1);
        }
        assert_eq!(transform.scale_x(), MAX_SCALE);

        for _ in 0..100 {
            transform.zoom_at(400.0, 300.0, 0.9);
        }
        assert_eq!(transform.scale_x(), MIN_SCALE);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut transform = ViewTransform::identity();
        let anchor = (200.0, 150.0);
        let (before_x, before_y) = transform.screen_to_world(anchor.0, anchor.1);

        transform.zoom_at(anchor.0, anchor.1, 2.0);

        let (after_x, after_y) = transform.screen_to_world(anchor.0, anchor.1);
        assert!((before_x - after_x).abs() < 1e-9);
        assert!((before_y - after_y).abs() < 1e-9);
    }

    #[test]
    fn test_pan() {
        let mut transform = ViewTransform::identity();
        transform.pan_by(30.0, -10.0);
        assert_eq!(transform.apply(0.0, 0.0), (30.0, -10.0));
    }
}
