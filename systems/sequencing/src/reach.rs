use bricklayer_core::{Geometry, Span};

/// Bottom-left corner of the robot's reach window in wall millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReachAnchor {
    x: f32,
    y: f32,
}

impl ReachAnchor {
    /// Window resting on the ground at the left edge of the wall.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates an anchor at the provided corner.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the corner.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the corner.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    fn distance(&self, other: Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned rectangle occupied by a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
}

impl Footprint {
    /// Builds the rectangle of a unit spanning `span` between two heights.
    #[must_use]
    pub fn of(span: Span, bottom: f32, top: f32) -> Self {
        Self {
            left: span.left() as f32,
            right: span.right() as f32,
            bottom,
            top,
        }
    }
}

/// Reach window of the robot together with the anchors it may jump to.
///
/// Candidate anchors sit on a half-window lattice clamped to the wall so
/// moves stay coarse; a unit that no lattice anchor covers is reached by the
/// smallest clamped shift of the current window instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Reach {
    width: f32,
    height: f32,
    max_x: f32,
    max_y: f32,
    columns: Vec<f32>,
    bands: Vec<f32>,
}

impl Reach {
    /// Derives the window and its lattice from the wall geometry.
    #[must_use]
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            width: geometry.build_width as f32,
            height: geometry.build_height as f32,
            max_x: geometry.wall_width.saturating_sub(geometry.build_width) as f32,
            max_y: geometry.wall_height.saturating_sub(geometry.build_height) as f32,
            columns: lattice(geometry.wall_width, geometry.build_width),
            bands: lattice(geometry.wall_height, geometry.build_height),
        }
    }

    /// Anchors the window may be moved to.
    pub fn anchors(&self) -> impl Iterator<Item = ReachAnchor> + '_ {
        self.bands
            .iter()
            .flat_map(move |&y| self.columns.iter().map(move |&x| ReachAnchor::new(x, y)))
    }

    /// Reports whether a window at `anchor` covers the whole footprint.
    #[must_use]
    pub fn contains(&self, anchor: ReachAnchor, footprint: &Footprint) -> bool {
        anchor.x <= footprint.left
            && footprint.right <= anchor.x + self.width
            && anchor.y <= footprint.bottom
            && footprint.top <= anchor.y + self.height
    }

    /// Cost of reaching `footprint` from `current` and the anchor to use.
    ///
    /// The cost is zero when the current window already covers the unit.
    #[must_use]
    pub fn placement(&self, current: ReachAnchor, footprint: &Footprint) -> (f32, ReachAnchor) {
        if self.contains(current, footprint) {
            return (0.0, current);
        }

        let target = self
            .anchors()
            .filter(|&anchor| self.contains(anchor, footprint))
            .min_by(|a, b| current.distance(*a).total_cmp(&current.distance(*b)))
            .unwrap_or_else(|| self.fallback(current, footprint));
        (current.distance(target), target)
    }

    fn fallback(&self, current: ReachAnchor, footprint: &Footprint) -> ReachAnchor {
        let x = shift(current.x, footprint.right - self.width, footprint.left, self.max_x);
        let y = shift(current.y, footprint.top - self.height, footprint.bottom, self.max_y);
        ReachAnchor::new(x, y)
    }
}

/// Multiples of half a window below `extent - window`, plus that limit.
fn lattice(extent: u32, window: u32) -> Vec<f32> {
    let limit = extent.saturating_sub(window);
    let step = (window / 2).max(1) as usize;
    let mut anchors: Vec<f32> = (0..=limit).step_by(step).map(|x| x as f32).collect();
    if anchors.last() != Some(&(limit as f32)) {
        anchors.push(limit as f32);
    }
    anchors
}

/// Smallest move of `value` into `[low, high]` that stays within `[0, max]`.
fn shift(value: f32, low: f32, high: f32, max: f32) -> f32 {
    let low = low.min(high);
    value.clamp(low, high).clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(left: u32, length: u32, row: usize) -> Footprint {
        let geometry = Geometry::default();
        Footprint::of(
            Span::from_start(left, length),
            geometry.course_bottom(row),
            geometry.course_top(row),
        )
    }

    #[test]
    fn lattice_ends_at_the_wall_limit() {
        assert_eq!(lattice(2300, 800), vec![0.0, 400.0, 800.0, 1200.0, 1500.0]);
        assert_eq!(lattice(2000, 1300), vec![0.0, 650.0, 700.0]);
        assert_eq!(lattice(500, 800), vec![0.0]);
    }

    #[test]
    fn covered_unit_costs_nothing() {
        let reach = Reach::new(&Geometry::default());
        let (cost, anchor) = reach.placement(ReachAnchor::ORIGIN, &unit(220, 210, 3));
        assert_eq!(cost, 0.0);
        assert_eq!(anchor, ReachAnchor::ORIGIN);
    }

    #[test]
    fn nearest_lattice_anchor_wins() {
        let reach = Reach::new(&Geometry::default());
        let (cost, anchor) = reach.placement(ReachAnchor::ORIGIN, &unit(770, 210, 0));
        assert_eq!(anchor, ReachAnchor::new(400.0, 0.0));
        assert_eq!(cost, 400.0);
    }

    #[test]
    fn oversized_unit_falls_back_to_a_clamped_shift() {
        let geometry = Geometry {
            build_width: 100,
            ..Geometry::default()
        };
        let reach = Reach::new(&geometry);
        let (cost, anchor) = reach.placement(ReachAnchor::ORIGIN, &unit(440, 210, 0));
        // No window of 100 mm covers 210 mm; the corner snaps to the left edge.
        assert_eq!(anchor, ReachAnchor::new(440.0, 0.0));
        assert_eq!(cost, 440.0);
    }
}
