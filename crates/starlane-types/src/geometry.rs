//! Planar coordinates.
//!
//! [`Point`] is a plain `f64` pair. [`OrdPoint`] wraps a point with a total
//! order (IEEE 754 `total_cmp` on x, then y) so coordinates can key ordered
//! maps and be iterated deterministically.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A position in galaxy space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared distance; avoids the square root when only comparing.
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Offset this point by polar coordinates.
    pub fn offset_polar(self, radius: f64, angle: f64) -> Self {
        Self::new(
            radius.mul_add(angle.cos(), self.x),
            radius.mul_add(angle.sin(), self.y),
        )
    }
}

/// A point with a total order, usable as a map key.
///
/// Negative zero is normalized to positive zero so that equal coordinates
/// hash and compare identically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OrdPoint(pub Point);

impl OrdPoint {
    /// Wrap a point.
    pub fn new(point: Point) -> Self {
        Self(Point::new(normalize(point.x), normalize(point.y)))
    }

    /// Return the wrapped point.
    pub const fn point(self) -> Point {
        self.0
    }
}

fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl From<Point> for OrdPoint {
    fn from(point: Point) -> Self {
        Self::new(point)
    }
}

impl PartialEq for OrdPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdPoint {}

impl PartialOrd for OrdPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        normalize(self.0.x)
            .total_cmp(&normalize(other.0.x))
            .then_with(|| normalize(self.0.y).total_cmp(&normalize(other.0.y)))
    }
}

impl Hash for OrdPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        normalize(self.0.x).to_bits().hash(state);
        normalize(self.0.y).to_bits().hash(state);
    }
}

/// Axis-aligned rectangle: `origin` is the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rect {
    /// Minimum corner.
    pub origin: Point,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Whether `point` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x <= self.origin.x + self.width
            && point.y <= self.origin.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.contains(other.origin)
            && self.contains(Point::new(
                other.origin.x + other.width,
                other.origin.y + other.height,
            ))
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((a.distance_squared(b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn ord_point_orders_by_x_then_y() {
        let mut set = BTreeSet::new();
        set.insert(OrdPoint::new(Point::new(2.0, 1.0)));
        set.insert(OrdPoint::new(Point::new(1.0, 5.0)));
        set.insert(OrdPoint::new(Point::new(1.0, 2.0)));
        let order: Vec<(f64, f64)> = set.iter().map(|p| (p.0.x, p.0.y)).collect();
        assert_eq!(order, vec![(1.0, 2.0), (1.0, 5.0), (2.0, 1.0)]);
    }

    #[test]
    fn negative_zero_equals_zero() {
        let a = OrdPoint::new(Point::new(-0.0, 1.0));
        let b = OrdPoint::new(Point::new(0.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn rect_containment() {
        let outer = Rect::new(Point::new(0.0, 0.0), 10.0, 10.0);
        let inner = Rect::new(Point::new(2.0, 2.0), 3.0, 3.0);
        let spill = Rect::new(Point::new(8.0, 8.0), 3.0, 3.0);
        assert!(outer.contains_rect(&inner));
        assert!(!outer.contains_rect(&spill));
        assert!(outer.contains(Point::new(10.0, 0.0)));
        assert!(!outer.contains(Point::new(10.5, 0.0)));
        assert_eq!(outer.area(), 100.0);
    }
}
