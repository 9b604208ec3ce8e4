//! Horizontal cubic bezier used to draw edges, and the distance math behind
//! edge hit-testing.

use crate::geometry::Vec2;

/// Minimum horizontal control-point offset, in world units.
pub const MIN_CONTROL_OFFSET: f32 = 50.0;

/// Default number of segments an edge is flattened into for distance tests.
pub const DEFAULT_SAMPLES: usize = 20;

/// Cubic bezier curve for distance calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicBezier {
    /// Edge curve between an output terminal and an input terminal.
    ///
    /// Control points extend horizontally by half the horizontal distance,
    /// never less than `min_offset`. Very short edges degenerate to a line.
    pub fn from_endpoints(start: Vec2, end: Vec2, min_offset: f32) -> Self {
        if start.distance_sq(end) < 100.0 {
            return CubicBezier { p0: start, p1: start, p2: end, p3: end };
        }

        let offset = ((end.x - start.x).abs() * 0.5).max(min_offset);
        CubicBezier {
            p0: start,
            p1: Vec2::new(start.x + offset, start.y),
            p2: Vec2::new(end.x - offset, end.y),
            p3: end,
        }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }

    /// SVG path command, e.g. `M 10 20 C 60 20 90 80 140 80`.
    pub fn to_svg_path(&self) -> String {
        if self.p0 == self.p1 && self.p2 == self.p3 {
            return format!("M {} {} L {} {}", self.p0.x, self.p0.y, self.p3.x, self.p3.y);
        }
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.length_sq();
    if ab_len_sq < f32::EPSILON {
        return ap.length_sq();
    }

    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    point.distance_sq(a + ab * t)
}

/// Minimum distance from a point to a cubic bezier curve.
///
/// The curve is flattened into `num_samples` segments (0 means the default).
pub fn distance_to_bezier(point: Vec2, bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { DEFAULT_SAMPLES } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = bezier.eval(t);
        min_dist_sq = min_dist_sq.min(distance_to_line_segment_sq(point, prev_point, curr_point));
        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
