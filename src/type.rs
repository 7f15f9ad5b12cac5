use std::cmp::Ordering;
use std::fmt::Debug;

use geo_traits::CoordTrait;
use num_traits::Float;

use crate::error::{KdQuadError, Result};

/// A trait for types that can be used as k-d tree keys.
///
/// This trait is sealed and cannot be implemented for external types. Only `f32` and `f64` keys
/// are supported, so that every key domain has a representation for positive and negative
/// infinity (needed to describe unbounded search regions).
pub trait KeyNum: private::Sealed + Float + Debug + Send + Sync + 'static {}

impl KeyNum for f32 {}
impl KeyNum for f64 {}

/// Numeric strategy used by the trees to compare, combine and measure keys.
///
/// Every method has a default implementation derived from [`KeyNum`], so a new strategy normally
/// only overrides [`TypeMath::distance_squared_between_points`] to plug in a different metric.
pub trait TypeMath<K: KeyNum>: Debug {
    /// The additive identity.
    fn zero(&self) -> K {
        K::zero()
    }

    /// The smallest finite value of `K`.
    fn min_value(&self) -> K {
        K::min_value()
    }

    /// The largest finite value of `K`.
    fn max_value(&self) -> K {
        K::max_value()
    }

    /// Negative infinity.
    fn negative_infinity(&self) -> K {
        K::neg_infinity()
    }

    /// Positive infinity.
    fn positive_infinity(&self) -> K {
        K::infinity()
    }

    /// Total comparison of two keys.
    ///
    /// `NaN` sorts below every number and is equal to itself; `0.0` and `-0.0` are equal.
    fn compare(&self, a: K, b: K) -> Ordering {
        match a.partial_cmp(&b) {
            Some(ordering) => ordering,
            None => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                _ => Ordering::Greater,
            },
        }
    }

    /// Whether two keys compare equal.
    fn are_equal(&self, a: K, b: K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Whether two points have the same length and pairwise equal coordinates.
    fn points_equal(&self, a: &[K], b: &[K]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&a, &b)| self.are_equal(a, b))
    }

    #[allow(missing_docs)]
    fn add(&self, a: K, b: K) -> K {
        a + b
    }

    #[allow(missing_docs)]
    fn subtract(&self, a: K, b: K) -> K {
        a - b
    }

    #[allow(missing_docs)]
    fn multiply(&self, a: K, b: K) -> K {
        a * b
    }

    /// The smaller of two keys; `b` when they compare equal.
    fn min(&self, a: K, b: K) -> K {
        if self.compare(a, b) == Ordering::Less {
            a
        } else {
            b
        }
    }

    /// The larger of two keys; `b` when they compare equal.
    fn max(&self, a: K, b: K) -> K {
        if self.compare(a, b) == Ordering::Greater {
            a
        } else {
            b
        }
    }

    /// Squared distance between two points.
    ///
    /// The default is the squared Euclidean distance, which requires both points to have the same
    /// dimensionality.
    fn distance_squared_between_points(&self, a: &[K], b: &[K]) -> Result<K> {
        if a.len() != b.len() {
            return Err(KdQuadError::InvalidArgument(format!(
                "Input points must have same dimensionality - {} != {}",
                a.len(),
                b.len()
            )));
        }

        let mut dist = self.zero();
        for (&a, &b) in a.iter().zip(b) {
            let dist_on_axis = self.subtract(a, b);
            dist = self.add(dist, self.multiply(dist_on_axis, dist_on_axis));
        }
        Ok(dist)
    }
}

impl<K: KeyNum, M: TypeMath<K> + ?Sized> TypeMath<K> for &M {
    fn zero(&self) -> K {
        (**self).zero()
    }

    fn min_value(&self) -> K {
        (**self).min_value()
    }

    fn max_value(&self) -> K {
        (**self).max_value()
    }

    fn negative_infinity(&self) -> K {
        (**self).negative_infinity()
    }

    fn positive_infinity(&self) -> K {
        (**self).positive_infinity()
    }

    fn compare(&self, a: K, b: K) -> Ordering {
        (**self).compare(a, b)
    }

    fn are_equal(&self, a: K, b: K) -> bool {
        (**self).are_equal(a, b)
    }

    fn points_equal(&self, a: &[K], b: &[K]) -> bool {
        (**self).points_equal(a, b)
    }

    fn add(&self, a: K, b: K) -> K {
        (**self).add(a, b)
    }

    fn subtract(&self, a: K, b: K) -> K {
        (**self).subtract(a, b)
    }

    fn multiply(&self, a: K, b: K) -> K {
        (**self).multiply(a, b)
    }

    fn min(&self, a: K, b: K) -> K {
        (**self).min(a, b)
    }

    fn max(&self, a: K, b: K) -> K {
        (**self).max(a, b)
    }

    fn distance_squared_between_points(&self, a: &[K], b: &[K]) -> Result<K> {
        (**self).distance_squared_between_points(a, b)
    }
}

/// Planar math over `f32` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatMath;

impl TypeMath<f32> for FloatMath {}

/// Planar math over `f64` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleMath;

impl TypeMath<f64> for DoubleMath {}

/// Great-circle math over `f64` (longitude, latitude) keys in degrees.
///
/// Distances are measured in meters. Only the first two axes take part in the distance; any
/// further axes are ignored, and points with fewer than two axes are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeographicMath;

const DEGREES_ARC_TO_KILOMETERS: f64 = 60.0 * 1.1515 * 1.609344;
const KILOMETERS_TO_METERS: f64 = 1000.0;

impl GeographicMath {
    /// Distance in meters between two (longitude, latitude) positions.
    pub fn distance_between_meters(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> f64 {
        if lon_a == lon_b && lat_a == lat_b {
            return 0.0;
        }

        let theta = lon_a - lon_b;
        let a = lat_a.to_radians().sin() * lat_b.to_radians().sin();
        let b = lat_a.to_radians().cos() * lat_b.to_radians().cos() * theta.to_radians().cos();
        // Rounding can push nearly coincident positions just past 1.0
        let arc = (a + b).clamp(-1.0, 1.0).acos().to_degrees();

        KILOMETERS_TO_METERS * DEGREES_ARC_TO_KILOMETERS * arc
    }
}

impl TypeMath<f64> for GeographicMath {
    fn distance_squared_between_points(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() < 2 || b.len() < 2 {
            return Err(KdQuadError::InvalidArgument(
                "Input geographic position must be (at least) 2D".to_string(),
            ));
        }

        let dist = Self::distance_between_meters(a[0], a[1], b[0], b[1]);
        Ok(dist * dist)
    }
}

/// Great-circle math over `f64` (longitude, latitude) keys backed by the `geo` crate's
/// haversine metric.
#[cfg(feature = "use-geo_0_31")]
#[derive(Debug, Clone, Copy)]
pub struct HaversineMath {
    /// Earth's radius in meters
    pub earth_radius: f64,
}

#[cfg(feature = "use-geo_0_31")]
impl Default for HaversineMath {
    fn default() -> Self {
        Self {
            earth_radius: 6371008.8, // mean Earth radius used by geo's Haversine
        }
    }
}

#[cfg(feature = "use-geo_0_31")]
impl TypeMath<f64> for HaversineMath {
    fn distance_squared_between_points(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        use geo_0_31::{Distance, Haversine, Point};

        if a.len() < 2 || b.len() < 2 {
            return Err(KdQuadError::InvalidArgument(
                "Input geographic position must be (at least) 2D".to_string(),
            ));
        }

        let unit_dist = Haversine.distance(Point::new(a[0], a[1]), Point::new(b[0], b[1]))
            / 6371008.8;
        let dist = unit_dist * self.earth_radius;
        Ok(dist * dist)
    }
}

/// A 2D coordinate, used to hand positions to and from `geo-traits` consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord<N: KeyNum> {
    pub(crate) x: N,
    pub(crate) y: N,
}

impl<N: KeyNum> Coord<N> {
    /// Create a new coordinate.
    pub fn new(x: N, y: N) -> Self {
        Self { x, y }
    }
}

impl<N: KeyNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Coord only has 2 dimensions, requested {}", n),
        }
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
