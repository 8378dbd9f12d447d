use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

use crate::rtree::rtree_types::{SpatialError, SpatialResult};

/// Coordinates are kept inline for the common 2D/3D/4D cases.
pub(crate) type Coords = SmallVec<[f64; 4]>;

/// An n-dimensional point with at least two coordinates.
///
/// Points are immutable values: the coordinates are copied in at
/// construction and the dimension never changes afterwards.
///
/// # Examples
///
/// ```rust
/// use rtree_index::Point;
///
/// let p = Point::new(&[1.5, 2.0]).unwrap();
/// assert_eq!(p.dimension(), 2);
/// assert_eq!(p.int_coordinate(0), 1);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Point {
    coords: Coords,
}

impl Point {
    /// Creates a point from floating coordinates.
    ///
    /// Fails with [`SpatialError::InvalidArgument`] when fewer than two
    /// coordinates are given or a coordinate is not finite.
    pub fn new(coords: &[f64]) -> SpatialResult<Point> {
        if coords.len() < 2 {
            return Err(SpatialError::InvalidArgument(format!(
                "Point dimension should be greater than 1, got {}",
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
            return Err(SpatialError::InvalidArgument(format!(
                "Point coordinate must be finite, got {}",
                bad
            )));
        }
        Ok(Point::from_coords(coords.iter().copied().collect()))
    }

    /// Creates a point from integer coordinates.
    pub fn from_ints(coords: &[i32]) -> SpatialResult<Point> {
        let floats: Coords = coords.iter().map(|&c| f64::from(c)).collect();
        Point::new(&floats)
    }

    /// Creates the origin of the given dimension.
    pub(crate) fn origin(dimension: usize) -> Point {
        Point {
            coords: smallvec::smallvec![0.0; dimension],
        }
    }

    /// Negative zero is stored as zero so that `==`, hashing and ordering
    /// of boxes agree.
    pub(crate) fn from_coords(mut coords: Coords) -> Point {
        for c in coords.iter_mut() {
            *c += 0.0;
        }
        Point { coords }
    }

    /// Returns the number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Returns the coordinate on `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.dimension()`.
    pub fn coordinate(&self, axis: usize) -> f64 {
        self.coords[axis]
    }

    /// Returns the coordinate on `axis` truncated toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.dimension()`.
    pub fn int_coordinate(&self, axis: usize) -> i64 {
        self.coords[axis] as i64
    }

    /// Returns all coordinates in axis order.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Compares two points coordinate by coordinate.
    ///
    /// Unlike `==`, comparing points of different dimension is an error.
    pub fn checked_eq(&self, other: &Point) -> SpatialResult<bool> {
        ensure_same_dimension(self.dimension(), other.dimension())?;
        Ok(self.coords == other.coords)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

pub(crate) fn ensure_same_dimension(expected: usize, actual: usize) -> SpatialResult<()> {
    if expected != actual {
        return Err(SpatialError::dimension_mismatch(expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let p = Point::new(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(p.dimension(), 3);
        assert_eq!(p.coordinate(0), 1.0);
        assert_eq!(p.coordinate(2), 3.0);
        assert_eq!(p.coords(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_new_rejects_low_dimension() {
        assert!(matches!(
            Point::new(&[1.0]),
            Err(SpatialError::InvalidArgument(_))
        ));
        assert!(Point::new(&[]).is_err());
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let p = Point::new(&[-0.0, 1.0]).unwrap();
        assert_eq!(p.coordinate(0).to_bits(), 0.0f64.to_bits());
        assert_eq!(p, Point::new(&[0.0, 1.0]).unwrap());
    }

    #[test]
    #[should_panic]
    fn test_int_coordinate_out_of_range() {
        let p = Point::new(&[1.0, 2.0]).unwrap();
        p.int_coordinate(2);
    }

    #[test]
    fn test_new_rejects_non_finite() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                Point::new(&[0.0, bad]),
                Err(SpatialError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_from_ints() {
        let p = Point::from_ints(&[11, 22]).unwrap();
        assert_eq!(p.coordinate(0), 11.0);
        assert_eq!(p.coordinate(1), 22.0);
        assert!(Point::from_ints(&[7]).is_err());
    }

    #[test]
    fn test_int_coordinate_truncates() {
        let p = Point::new(&[1.9, -2.7]).unwrap();
        assert_eq!(p.int_coordinate(0), 1);
        assert_eq!(p.int_coordinate(1), -2);
    }

    #[test]
    fn test_value_semantics() {
        let mut source = vec![1.0, 2.0];
        let p = Point::new(&source).unwrap();
        source[0] = 99.0;
        assert_eq!(p.coordinate(0), 1.0);
    }

    #[test]
    fn test_checked_eq() {
        let a = Point::new(&[1.0, 2.0]).unwrap();
        let b = Point::new(&[1.0, 2.0]).unwrap();
        let c = Point::new(&[1.0, 3.0]).unwrap();
        assert!(a.checked_eq(&b).unwrap());
        assert!(!a.checked_eq(&c).unwrap());
    }

    #[test]
    fn test_checked_eq_dimension_mismatch() {
        let a = Point::new(&[1.0, 2.0]).unwrap();
        let b = Point::new(&[1.0, 2.0, 0.0]).unwrap();
        assert!(matches!(
            a.checked_eq(&b),
            Err(SpatialError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_origin() {
        let o = Point::origin(3);
        assert_eq!(o.coords(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_display() {
        let p = Point::new(&[1.5, 2.0]).unwrap();
        assert_eq!(format!("{}", p), "(1.5,2)");
    }
}
