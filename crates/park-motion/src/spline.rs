//! Catmull-Rom spline through recent samples
//!
//! Evaluated at a real-valued index `rt`: the integer part selects the
//! segment, the fractional part the position within it. The curve passes
//! through `points[i + 1]` at `rt == i`, so the segment between the last two
//! points starts at index `len - 3`.

use park_core::Point;

/// Open Catmull-Rom spline
#[derive(Debug, Clone, Default)]
pub struct CatmullRom {
    points: Vec<Point>,
}

impl CatmullRom {
    pub fn new() -> Self {
        CatmullRom::default()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Index at which the segment ending in the newest point starts
    pub fn last_segment(&self) -> usize {
        self.points.len().saturating_sub(3)
    }

    /// Drop all but the newest `keep` points
    pub fn trim(&mut self, keep: usize) {
        if self.points.len() > keep {
            self.points.drain(..self.points.len() - keep);
        }
    }

    /// Point on the curve at real index `rt`
    pub fn point_at(&self, rt: f64) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }

        let last = self.points.len() - 1;
        let d = rt.max(0.0).trunc();
        let t = rt.max(0.0) - d;
        let d = d as usize;

        let p1 = (d + 1).min(last);
        let p2 = (p1 + 1).min(last);
        let p3 = (p2 + 1).min(last);
        let p0 = p1.saturating_sub(1);

        let tt = t * t;
        let ttt = tt * t;

        let q1 = -ttt + 2.0 * tt - t;
        let q2 = 3.0 * ttt - 5.0 * tt + 2.0;
        let q3 = -3.0 * ttt + 4.0 * tt + t;
        let q4 = ttt - tt;

        let [a, b, c, e] = [p0, p1, p2, p3].map(|i| self.points[i]);

        Some(Point::new(
            0.5 * (a.x * q1 + b.x * q2 + c.x * q3 + e.x * q4),
            0.5 * (a.y * q1 + b.y * q2 + c.y * q3 + e.y * q4),
        ))
    }
}
