use super::MARGIN;
use wheelkit::model::Entry;
use wheelkit::select;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            (self.width as f64 * factor).round() as i32,
            (self.height as f64 * factor).round() as i32,
        )
    }
}

/// Disc placement for a viewport rendered at `scale` times its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub scale: f64,
}

impl WheelGeometry {
    pub fn new(viewport: Viewport, scale: f64) -> Self {
        let (w, h) = (viewport.width as f64 * scale, viewport.height as f64 * scale);
        Self {
            cx: w / 2.0,
            cy: h / 2.0,
            radius: (w.min(h) / 2.0 - MARGIN * scale).max(1.0),
            scale,
        }
    }

    /// Point at `fraction` of the radius along `angle` degrees, clockwise
    /// from 3 o'clock.
    pub fn point_at(&self, angle: f64, fraction: f64) -> (f64, f64) {
        let rad = angle.to_radians();
        let dist = self.radius * fraction;
        (self.cx + dist * rad.cos(), self.cy + dist * rad.sin())
    }
}

/// Entries plus the rotation that persists between spins and across edits.
#[derive(Debug, Clone)]
pub struct WheelState {
    pub entries: Vec<Entry>,
    pub angle: f64,
    pub viewport: Viewport,
}

impl WheelState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            entries: Vec::new(),
            angle: 0.0,
            viewport,
        }
    }

    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = select::normalize_angle(angle);
    }

    pub fn can_spin(&self) -> bool {
        select::total_weight(&self.entries) > 0.0
    }

    /// The entry under the pointer at the current angle.
    pub fn winner(&self) -> Option<&Entry> {
        select::compute_winner(&self.entries, self.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        let g = WheelGeometry::new(Viewport::new(400, 300), 2.0);
        assert_eq!((g.cx, g.cy), (400.0, 300.0));
        assert_eq!(g.radius, 300.0 - 40.0);

        let (x, y) = g.point_at(90.0, 0.5);
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 430.0).abs() < 1e-9, "90 degrees points down on screen");
    }

    #[test]
    fn test_tiny_viewport_keeps_positive_radius() {
        assert_eq!(Viewport::new(0, -5), Viewport::new(1, 1));
        assert_eq!(WheelGeometry::new(Viewport::new(10, 10), 1.0).radius, 1.0);
    }

    #[test]
    fn test_angle_survives_entry_edits() {
        let mut state = WheelState::new(Viewport::new(400, 400));
        state.set_entries(vec![Entry::new("A", 1.0), Entry::new("B", 1.0)]);
        state.set_angle(725.0);
        assert_eq!(state.angle, 5.0);
        assert_eq!(state.winner().unwrap().label, "A");

        state.set_entries(vec![Entry::new("C", 1.0)]);
        assert_eq!(state.angle, 5.0);
        assert_eq!(state.winner().unwrap().label, "C");

        state.set_entries(Vec::new());
        assert!(!state.can_spin());
        assert!(state.winner().is_none());
    }
}
