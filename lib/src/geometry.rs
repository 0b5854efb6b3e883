//! Planar primitives backing the wire legality tests in [`transmission`](crate::transmission).
//!
//! All zero tests share a single epsilon; coordinates come straight from level
//! files and never stray far from the origin, so no scaling is applied.

use std::ops::Sub;

pub(crate) const EPS: f64 = 1e-6;

pub(crate) fn is_zero(x: f64) -> bool {
    x.abs() <= EPS
}

/// A point on the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Classification of the turn at the middle point of a three point chain.
///
/// "Obtuse" means the projection of the third point onto the first segment
/// falls past the middle point, not the usual angular sense.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Angle {
    /// The projection falls short of the middle point.
    Acute,
    /// The projection lands on the middle point exactly (within epsilon).
    Right,
    /// The projection falls past the middle point.
    Obtuse,
}

impl Point {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance(self, p: Point) -> f64 {
        let d = self - p;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    pub(crate) fn cross(self, p: Point) -> f64 {
        self.x * p.y - self.y * p.x
    }

    pub(crate) fn dot(self, p: Point) -> f64 {
        self.x * p.x + self.y * p.y
    }

    /// Classify the turn at `b` when walking `a` → `b` → `c`, via the sign of
    /// `(c - b) · (b - a)`.
    pub fn angle(a: Point, b: Point, c: Point) -> Angle {
        let v = (c - b).dot(b - a);
        if is_zero(v) {
            Angle::Right
        } else if v < 0.0 {
            Angle::Acute
        } else {
            Angle::Obtuse
        }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The infinite line through two points.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    /// One point on the line.
    pub a: Point,
    /// A second, distinct point on the line.
    pub b: Point,
}

impl Line {
    /// Perpendicular distance from `p` to the line.
    pub fn distance(&self, p: Point) -> f64 {
        let dy = self.b.y - self.a.y;
        let dx = self.b.x - self.a.x;
        let len = (dx * dx + dy * dy).sqrt();
        if len < EPS {
            // degenerate line, fall back to the anchor point
            return self.a.distance(p);
        }
        ((dy * p.x - dx * p.y + self.b.x * self.a.y - self.b.y * self.a.x) / len).abs()
    }
}

/// The segment between two endpoints.
#[derive(Clone, Copy, Debug)]
pub struct LineSegment {
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
}

impl LineSegment {
    pub(crate) fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub(crate) fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    /// Distance from `p` to the nearest point of the segment.
    ///
    /// The perpendicular distance applies only while the foot of the
    /// perpendicular lies between the endpoints; otherwise the nearer endpoint
    /// wins.
    pub fn distance(&self, p: Point) -> f64 {
        if self.length() < EPS {
            return self.a.distance(p);
        }
        if Point::angle(self.a, self.b, p) == Angle::Obtuse {
            return self.b.distance(p);
        }
        if Point::angle(self.b, self.a, p) == Angle::Obtuse {
            return self.a.distance(p);
        }
        Line { a: self.a, b: self.b }.distance(p)
    }

    /// Whether two segments share at least one point.
    ///
    /// Endpoints count: `t = 0` and `t = 1` are intersections. Collinear
    /// segments intersect iff their bounding boxes overlap. A degenerate
    /// segment (shorter than epsilon, e.g. after an aggressive
    /// [`shorten`](Self::shorten)) intersects nothing.
    pub fn intersect(&self, other: &LineSegment) -> bool {
        if self.length() < EPS || other.length() < EPS {
            return false;
        }
        let r = self.b - self.a;
        let s = other.b - other.a;
        let qp = other.a - self.a;
        if is_zero(r.cross(s)) {
            if is_zero(qp.cross(r)) {
                // collinear: overlap iff the boxes touch
                return self.a.x.max(self.b.x) >= other.a.x.min(other.b.x)
                    && self.a.x.min(self.b.x) <= other.a.x.max(other.b.x)
                    && self.a.y.max(self.b.y) >= other.a.y.min(other.b.y)
                    && self.a.y.min(self.b.y) <= other.a.y.max(other.b.y);
            }
            // parallel, never meeting
            return false;
        }
        let t = qp.cross(s) / r.cross(s);
        let u = (self.a - other.a).cross(r) / s.cross(r);
        (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
    }

    /// Pull both endpoints inward by `by`, keeping the midpoint fixed.
    ///
    /// Used to discount shared element endpoints when testing wires for
    /// crossings. A segment too short to absorb the shrink collapses to its
    /// midpoint rather than inverting.
    pub fn shorten(mut self, by: f64) -> Self {
        let len = self.length();
        if len <= 2.0 * by + EPS {
            let mid = Point::new((self.a.x + self.b.x) / 2.0, (self.a.y + self.b.y) / 2.0);
            self.a = mid;
            self.b = mid;
            return self;
        }
        let dx = (self.b.x - self.a.x) / len * by;
        let dy = (self.b.y - self.a.y) / len * by;
        self.a.x += dx;
        self.a.y += dy;
        self.b.x -= dx;
        self.b.y -= dy;
        self
    }
}

/// A circle given by center and radius.
#[derive(Clone, Copy, Debug)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius.
    pub r: f64,
}

impl Circle {
    /// Whether the segment passes through (or touches) the circle.
    pub fn intersect(&self, l: &LineSegment) -> bool {
        l.distance(self.center) <= self.r
    }
}
