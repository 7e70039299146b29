//! 2D affine transforms, points, sizes and rectangles.
//!
//! Transforms use the row-vector convention: `x' = a*x + c*y + tx`,
//! `y' = b*x + d*y + ty`. `t1.concat(t2)` applies `t1` first.

use std::f64::consts::PI;

const SINGULAR_EPSILON: f64 = 1e-12;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.max_x(), self.min_y()),
            Point::new(self.min_x(), self.max_y()),
            Point::new(self.max_x(), self.max_y()),
        ]
    }

    /// Smallest axis-aligned rectangle containing this one after `t`.
    pub fn apply(&self, t: &AffineTransform) -> Rect {
        let mapped = self.corners().map(|p| t.apply(p));
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in mapped {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self { tx, ty, ..Self::IDENTITY }
    }

    /// Rotation by `radians`; clockwise on screen when y grows downward.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// `self` followed by `other`.
    pub fn concat(&self, other: &AffineTransform) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.tx * other.a + self.ty * other.c + other.tx,
            ty: self.tx * other.b + self.ty * other.d + other.ty,
        }
    }

    /// Prepends a translation, the way a drawing context's CTM is translated.
    pub fn translated(&self, tx: f64, ty: f64) -> Self {
        Self::translation(tx, ty).concat(self)
    }

    pub fn rotated(&self, radians: f64) -> Self {
        Self::rotation(radians).concat(self)
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::scale(sx, sy).concat(self)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_degrees_to_radians() {
        assert!((degrees_to_radians(180.0) - PI).abs() < 1e-12);
        assert!((degrees_to_radians(90.0) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ctm_order_scale_then_rotate_then_translate() {
        let ctm = AffineTransform::IDENTITY
            .translated(10.0, 20.0)
            .rotated(degrees_to_radians(90.0))
            .scaled(1.0, -1.0);

        // (1, 2) -> flip (1, -2) -> rotate (2, 1) -> translate (12, 21)
        assert!(close(ctm.apply(Point::new(1.0, 2.0)), Point::new(12.0, 21.0)));
    }

    #[test]
    fn test_invert_round_trip() {
        let t = AffineTransform::IDENTITY
            .translated(3.0, -4.0)
            .rotated(0.7)
            .scaled(2.0, -1.0);
        let inv = t.invert().unwrap();
        let p = Point::new(5.5, -1.25);
        assert!(close(inv.apply(t.apply(p)), p));
    }

    #[test]
    fn test_singular_transform_has_no_inverse() {
        assert!(AffineTransform::scale(0.0, 1.0).invert().is_none());
    }
}
