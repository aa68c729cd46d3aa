//! Geometry helpers

/// Clamp `value` into `[min, max]`; `min` wins when the range is inverted
#[inline]
pub fn clamp(min: f64, value: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// 2D point (page or host-relative coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Offset of a page point relative to the rectangle origin
    pub fn relative(&self, p: &Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.0, -5.0, 10.0), 0.0);
        assert_eq!(clamp(0.0, 15.0, 10.0), 10.0);
        assert_eq!(clamp(0.0, 5.0, 10.0), 5.0);
        // Inverted range collapses to min
        assert_eq!(clamp(0.0, 5.0, -10.0), 0.0);
    }

    #[test]
    fn test_rect_contains_and_relative() {
        let r = Rect::new(100.0, 50.0, 80.0, 40.0);
        assert!(r.contains(&Point::new(110.0, 60.0)));
        assert!(!r.contains(&Point::new(90.0, 60.0)));
        assert_eq!(r.relative(&Point::new(110.0, 60.0)), Point::new(10.0, 10.0));
    }
}
