//! An axis-aligned 2D bounding box.

use geo_traits::{
    GeometryTrait, GeometryType, RectTrait, UnimplementedGeometryCollection, UnimplementedLine,
    UnimplementedLineString, UnimplementedMultiLineString, UnimplementedMultiPoint,
    UnimplementedMultiPolygon, UnimplementedPoint, UnimplementedPolygon, UnimplementedTriangle,
};

use crate::error::{KdQuadError, Result};
use crate::r#type::Coord;

/// Tolerance applied by [`BoundingBox::intersects`].
const INTERSECTION_EPS: f64 = 1e-7;

/// Side length of the box used to query a quadtree at a single position.
pub const SINGLE_POINT_BUFFER: f64 = 1e-9;

/// An axis-aligned 2D bounding box with `f64` extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Create a new box from its minima and maxima.
    ///
    /// Returns [`KdQuadError::InvalidArgument`] if a minimum exceeds its maximum or a bound is
    /// NaN.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if [min_x, min_y, max_x, max_y].iter().any(|bound| bound.is_nan()) {
            return Err(KdQuadError::InvalidArgument(format!(
                "bounds cannot be NaN: ({}, {}, {}, {})",
                min_x, min_y, max_x, max_y
            )));
        }
        if min_x > max_x {
            return Err(KdQuadError::InvalidArgument(format!(
                "min_x ({}) cannot be greater than max_x ({})",
                min_x, max_x
            )));
        }
        if min_y > max_y {
            return Err(KdQuadError::InvalidArgument(format!(
                "min_y ({}) cannot be greater than max_y ({})",
                min_y, max_y
            )));
        }
        Ok(Self::new_unchecked(min_x, min_y, max_x, max_y))
    }

    #[inline]
    pub(crate) fn new_unchecked(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A square box with side `buffer` centred on `(x, y)`.
    pub fn from_point(x: f64, y: f64, buffer: f64) -> Self {
        let half_width = buffer.abs() / 2.0;
        Self::new_unchecked(x - half_width, y - half_width, x + half_width, y + half_width)
    }

    /// Create a box from any `geo-traits` rectangle.
    pub fn from_rect(rect: &impl RectTrait<T = f64>) -> Result<Self> {
        use geo_traits::CoordTrait;

        let min = rect.min();
        let max = rect.max();
        Self::new(min.x(), min.y(), max.x(), max.y())
    }

    #[allow(missing_docs)]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[allow(missing_docs)]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[allow(missing_docs)]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[allow(missing_docs)]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[allow(missing_docs)]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[allow(missing_docs)]
    pub fn centroid_x(&self) -> f64 {
        self.min_x + self.width() / 2.0
    }

    #[allow(missing_docs)]
    pub fn centroid_y(&self) -> f64 {
        self.min_y + self.height() / 2.0
    }

    /// Returns `true` if `(x, y)` lies inside or on the border of this box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns `true` if this box overlaps or touches `other`.
    ///
    /// The test compares the distance between the two centroids against the combined extents,
    /// with a small tolerance so that boxes sharing an edge always intersect regardless of
    /// floating point rounding.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let dx = (self.centroid_x() - other.centroid_x()).abs() * 2.0;
        if dx > self.width() + other.width() + INTERSECTION_EPS {
            return false;
        }

        let dy = (self.centroid_y() - other.centroid_y()).abs() * 2.0;
        if dy > self.height() + other.height() + INTERSECTION_EPS {
            return false;
        }

        true
    }

    /// The smallest box containing both this box and `other`.
    pub fn expand_to_include(&self, other: &BoundingBox) -> Self {
        Self::new_unchecked(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// This box grown by `amount` on every side.
    pub fn buffer(&self, amount: f64) -> Self {
        let amount = amount.max(-self.width() / 2.0).max(-self.height() / 2.0);
        Self::new_unchecked(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }
}

impl GeometryTrait for BoundingBox {
    type T = f64;
    type PointType<'a>
        = UnimplementedPoint<f64>
    where
        Self: 'a;
    type LineStringType<'a>
        = UnimplementedLineString<f64>
    where
        Self: 'a;
    type PolygonType<'a>
        = UnimplementedPolygon<f64>
    where
        Self: 'a;
    type MultiPointType<'a>
        = UnimplementedMultiPoint<f64>
    where
        Self: 'a;
    type MultiLineStringType<'a>
        = UnimplementedMultiLineString<f64>
    where
        Self: 'a;
    type MultiPolygonType<'a>
        = UnimplementedMultiPolygon<f64>
    where
        Self: 'a;
    type GeometryCollectionType<'a>
        = UnimplementedGeometryCollection<f64>
    where
        Self: 'a;
    type RectType<'a>
        = BoundingBox
    where
        Self: 'a;
    type TriangleType<'a>
        = UnimplementedTriangle<f64>
    where
        Self: 'a;
    type LineType<'a>
        = UnimplementedLine<f64>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn as_type(
        &self,
    ) -> GeometryType<
        '_,
        UnimplementedPoint<f64>,
        UnimplementedLineString<f64>,
        UnimplementedPolygon<f64>,
        UnimplementedMultiPoint<f64>,
        UnimplementedMultiLineString<f64>,
        UnimplementedMultiPolygon<f64>,
        UnimplementedGeometryCollection<f64>,
        BoundingBox,
        UnimplementedTriangle<f64>,
        UnimplementedLine<f64>,
    > {
        GeometryType::Rect(self)
    }
}

impl RectTrait for BoundingBox {
    type CoordType<'a>
        = Coord<f64>
    where
        Self: 'a;

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x,
            y: self.min_y,
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x,
            y: self.max_y,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            BoundingBox::new(1.0, 0.0, 0.0, 1.0),
            Err(KdQuadError::InvalidArgument(_))
        ));
        assert!(matches!(
            BoundingBox::new(0.0, 1.0, 1.0, 0.0),
            Err(KdQuadError::InvalidArgument(_))
        ));
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_nan_bounds() {
        for bounds in [
            [f64::NAN, 0.0, 1.0, 1.0],
            [0.0, f64::NAN, 1.0, 1.0],
            [0.0, 0.0, f64::NAN, 1.0],
            [0.0, 0.0, 1.0, f64::NAN],
        ] {
            assert!(matches!(
                BoundingBox::new(bounds[0], bounds[1], bounds[2], bounds[3]),
                Err(KdQuadError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn from_point() {
        let bb = BoundingBox::from_point(1.0, 2.0, 4.0);
        assert_eq!(bb, BoundingBox::new(-1.0, 0.0, 3.0, 4.0).unwrap());
        assert_eq!(bb.centroid_x(), 1.0);
        assert_eq!(bb.centroid_y(), 2.0);
        assert_eq!(bb.area(), 16.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let bb = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(bb.contains(0.0, 0.0));
        assert!(bb.contains(1.0, 1.0));
        assert!(bb.contains(0.5, 0.5));
        assert!(!bb.contains(1.0 + 1e-12, 0.5));
    }

    #[test]
    fn intersects() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0).unwrap();
        let c = BoundingBox::new(1.5, 1.5, 2.0, 2.0).unwrap();
        let inner = BoundingBox::new(0.25, 0.25, 0.75, 0.75).unwrap();

        // Shared edge
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&inner));
        assert!(inner.intersects(&a));
        // Within tolerance
        let near = BoundingBox::new(1.0 + 1e-9, 0.0, 2.0, 1.0).unwrap();
        assert!(a.intersects(&near));
    }

    #[test]
    fn expand_and_buffer() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = BoundingBox::new(2.0, -1.0, 3.0, 0.5).unwrap();
        let expanded = a.expand_to_include(&b);
        assert_eq!(expanded, BoundingBox::new(0.0, -1.0, 3.0, 1.0).unwrap());

        let buffered = expanded.buffer(1.0);
        assert_eq!(buffered, BoundingBox::new(-1.0, -2.0, 4.0, 2.0).unwrap());
    }

    #[test]
    fn rect_trait_round_trip() {
        let a = BoundingBox::new(0.0, 1.0, 2.0, 3.0).unwrap();
        let b = BoundingBox::from_rect(&a).unwrap();
        assert_eq!(a, b);
    }
}
