use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use crate::point::{ensure_same_dimension, Coords, Point};
use crate::rtree::rtree_types::{SpatialError, SpatialResult};

/// An n-dimensional axis-aligned bounding box.
///
/// `BoundingBox` is defined by a `low` and a `high` corner of the same
/// dimension with `low[i] <= high[i]` on every axis. It is the entry type
/// stored in R-Tree leaves and the key stored for every child of an internal
/// node.
///
/// # Examples
///
/// ```rust
/// use rtree_index::BoundingBox;
///
/// let a = BoundingBox::from_coords(&[0.0, 0.0], &[10.0, 10.0]).unwrap();
/// let b = BoundingBox::from_coords(&[5.0, 5.0], &[15.0, 15.0]).unwrap();
///
/// assert_eq!(a.intersecting_area(&b).unwrap(), 25.0);
/// assert_eq!(a.union(&b).unwrap().area(), 225.0);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct BoundingBox {
    low: Point,
    high: Point,
}

impl Eq for BoundingBox {}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.low.coords().iter().chain(self.high.coords());
        let rhs = other.low.coords().iter().chain(other.high.coords());
        for (a, b) in lhs.zip(rhs) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.dimension().cmp(&other.dimension())
    }
}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.dimension().hash(state);
        for c in self.low.coords().iter().chain(self.high.coords()) {
            c.to_bits().hash(state);
        }
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox(low: {}, high: {})", self.low, self.high)
    }
}

impl BoundingBox {
    /// Creates a bounding box from its two corners.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidArgument`] if the corners differ in
    /// dimension or if `low` exceeds `high` on any axis.
    pub fn new(low: Point, high: Point) -> SpatialResult<BoundingBox> {
        ensure_same_dimension(low.dimension(), high.dimension())?;
        for axis in 0..low.dimension() {
            if low.coordinate(axis) > high.coordinate(axis) {
                return Err(SpatialError::InvalidArgument(format!(
                    "low corner exceeds high corner on axis {} ({} > {})",
                    axis,
                    low.coordinate(axis),
                    high.coordinate(axis)
                )));
            }
        }
        Ok(BoundingBox { low, high })
    }

    /// Creates a bounding box from raw corner coordinates.
    pub fn from_coords(low: &[f64], high: &[f64]) -> SpatialResult<BoundingBox> {
        BoundingBox::new(Point::new(low)?, Point::new(high)?)
    }

    /// The box of an empty node: every coordinate is zero.
    pub fn zero(dimension: usize) -> BoundingBox {
        BoundingBox {
            low: Point::origin(dimension),
            high: Point::origin(dimension),
        }
    }

    /// Returns the union of all boxes in the slice.
    pub fn union_all(boxes: &[BoundingBox]) -> SpatialResult<BoundingBox> {
        let (first, rest) = boxes.split_first().ok_or_else(|| {
            SpatialError::InvalidArgument("cannot union an empty set of boxes".into())
        })?;
        rest.iter().try_fold(first.clone(), |acc, b| acc.union(b))
    }

    pub fn low(&self) -> &Point {
        &self.low
    }

    pub fn high(&self) -> &Point {
        &self.high
    }

    pub fn dimension(&self) -> usize {
        self.low.dimension()
    }

    /// Returns the product of the per-axis extents.
    pub fn area(&self) -> f64 {
        self.low
            .coords()
            .iter()
            .zip(self.high.coords())
            .map(|(l, h)| h - l)
            .product()
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> SpatialResult<BoundingBox> {
        ensure_same_dimension(self.dimension(), other.dimension())?;
        Ok(self.merge(other))
    }

    /// Checks whether the two boxes share at least one point.
    ///
    /// Touching boxes intersect.
    pub fn intersects(&self, other: &BoundingBox) -> SpatialResult<bool> {
        ensure_same_dimension(self.dimension(), other.dimension())?;
        Ok(self.overlaps(other))
    }

    /// Checks whether the two boxes share no point at all.
    pub fn is_disjoint(&self, other: &BoundingBox) -> SpatialResult<bool> {
        self.intersects(other).map(|hit| !hit)
    }

    /// Returns the area of the overlap between the two boxes, 0 if disjoint.
    pub fn intersecting_area(&self, other: &BoundingBox) -> SpatialResult<f64> {
        ensure_same_dimension(self.dimension(), other.dimension())?;
        Ok(self.overlap_area(other))
    }

    /// Checks whether `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &BoundingBox) -> SpatialResult<bool> {
        ensure_same_dimension(self.dimension(), other.dimension())?;
        Ok(self.contains(other))
    }

    /// Exact equality of both corners; a dimension mismatch is an error.
    pub fn checked_eq(&self, other: &BoundingBox) -> SpatialResult<bool> {
        Ok(self.low.checked_eq(&other.low)? && self.high.checked_eq(&other.high)?)
    }

    // The helpers below assume both operands share a dimension. The tree
    // validates dimensions on entry, so its internals use them directly.

    pub(crate) fn merge(&self, other: &BoundingBox) -> BoundingBox {
        debug_assert_eq!(self.dimension(), other.dimension());
        let low: Coords = self
            .low
            .coords()
            .iter()
            .zip(other.low.coords())
            .map(|(a, b)| a.min(*b))
            .collect();
        let high: Coords = self
            .high
            .coords()
            .iter()
            .zip(other.high.coords())
            .map(|(a, b)| a.max(*b))
            .collect();
        BoundingBox {
            low: Point::from_coords(low),
            high: Point::from_coords(high),
        }
    }

    pub(crate) fn expand(&mut self, other: &BoundingBox) {
        *self = self.merge(other);
    }

    /// Growth in area needed for `self` to also cover `other`.
    pub(crate) fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.merge(other).area() - self.area()
    }

    pub(crate) fn contains(&self, other: &BoundingBox) -> bool {
        (0..self.dimension()).all(|axis| {
            other.low.coordinate(axis) >= self.low.coordinate(axis)
                && other.high.coordinate(axis) <= self.high.coordinate(axis)
        })
    }

    pub(crate) fn overlaps(&self, other: &BoundingBox) -> bool {
        (0..self.dimension()).all(|axis| {
            self.low.coordinate(axis) <= other.high.coordinate(axis)
                && self.high.coordinate(axis) >= other.low.coordinate(axis)
        })
    }

    pub(crate) fn overlap_area(&self, other: &BoundingBox) -> f64 {
        if !self.overlaps(other) {
            return 0.0;
        }

        let mut area = 1.0;
        for axis in 0..self.dimension() {
            let (l1, h1) = (self.low.coordinate(axis), self.high.coordinate(axis));
            let (l2, h2) = (other.low.coordinate(axis), other.high.coordinate(axis));

            if l1 <= l2 && h1 <= h2 {
                // self starts first, other ends last
                area *= (h1 - l1) - (l2 - l1);
            } else if l1 >= l2 && h1 >= h2 {
                area *= (h2 - l2) - (l1 - l2);
            } else if l1 >= l2 && h1 <= h2 {
                // self inside other
                area *= h1 - l1;
            } else if l1 <= l2 && h1 >= h2 {
                area *= h2 - l2;
            }
        }
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::hash::Hasher;

    fn bbox(low: &[f64], high: &[f64]) -> BoundingBox {
        BoundingBox::from_coords(low, high).unwrap()
    }

    #[test]
    fn test_new() {
        let b = bbox(&[1.0, 2.0], &[3.0, 4.0]);
        assert_eq!(b.low().coords(), &[1.0, 2.0]);
        assert_eq!(b.high().coords(), &[3.0, 4.0]);
        assert_eq!(b.dimension(), 2);
    }

    #[test]
    fn test_new_rejects_inverted_corners() {
        let result = BoundingBox::from_coords(&[10.0, 0.0], &[0.0, 10.0]);
        assert!(matches!(result, Err(SpatialError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_rejects_dimension_mismatch() {
        let low = Point::new(&[0.0, 0.0]).unwrap();
        let high = Point::new(&[1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            BoundingBox::new(low, high),
            Err(SpatialError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_degenerate_box_is_valid() {
        let point = bbox(&[5.0, 5.0], &[5.0, 5.0]);
        assert_eq!(point.area(), 0.0);
        let line = bbox(&[0.0, 5.0], &[10.0, 5.0]);
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_area() {
        assert_eq!(bbox(&[0.0, 0.0], &[10.0, 5.0]).area(), 50.0);
        assert_eq!(bbox(&[0.0, 0.0, 0.0], &[2.0, 3.0, 4.0]).area(), 24.0);
        assert_eq!(bbox(&[-10.0, -5.0], &[10.0, 5.0]).area(), 200.0);
    }

    #[test]
    fn test_union() {
        let a = bbox(&[0.0, 0.0], &[5.0, 5.0]);
        let b = bbox(&[3.0, 3.0], &[10.0, 10.0]);
        assert_eq!(a.union(&b).unwrap(), bbox(&[0.0, 0.0], &[10.0, 10.0]));
        assert_eq!(b.union(&a).unwrap(), a.union(&b).unwrap());
    }

    #[test]
    fn test_union_dimension_mismatch() {
        let a = bbox(&[0.0, 0.0], &[5.0, 5.0]);
        let b = bbox(&[0.0, 0.0, 0.0], &[5.0, 5.0, 5.0]);
        assert!(matches!(a.union(&b), Err(SpatialError::InvalidArgument(_))));
        assert!(a.encloses(&b).is_err());
        assert!(a.intersecting_area(&b).is_err());
        assert!(a.checked_eq(&b).is_err());
    }

    #[test]
    fn test_union_all() {
        let boxes = vec![
            bbox(&[0.0, 0.0], &[1.0, 1.0]),
            bbox(&[5.0, -2.0], &[6.0, 0.0]),
            bbox(&[2.0, 2.0], &[3.0, 8.0]),
        ];
        assert_eq!(
            BoundingBox::union_all(&boxes).unwrap(),
            bbox(&[0.0, -2.0], &[6.0, 8.0])
        );
        assert!(BoundingBox::union_all(&[]).is_err());
    }

    #[test]
    fn test_intersecting_area_cases() {
        let a = bbox(&[0.0, 0.0], &[10.0, 10.0]);
        // partial overlap on both axes
        assert_eq!(a.intersecting_area(&bbox(&[5.0, 5.0], &[15.0, 15.0])).unwrap(), 25.0);
        assert_eq!(bbox(&[5.0, 5.0], &[15.0, 15.0]).intersecting_area(&a).unwrap(), 25.0);
        // containment both ways
        assert_eq!(a.intersecting_area(&bbox(&[2.0, 2.0], &[4.0, 5.0])).unwrap(), 6.0);
        assert_eq!(bbox(&[2.0, 2.0], &[4.0, 5.0]).intersecting_area(&a).unwrap(), 6.0);
        // disjoint
        assert_eq!(a.intersecting_area(&bbox(&[20.0, 20.0], &[30.0, 30.0])).unwrap(), 0.0);
        // touching corners have no area
        assert_eq!(a.intersecting_area(&bbox(&[10.0, 10.0], &[20.0, 20.0])).unwrap(), 0.0);
    }

    #[test]
    fn test_intersecting_area_sample() {
        let re1 = bbox(&[-2.0, 0.0], &[0.0, 2.0]);
        let re2 = bbox(&[-2.0, 1.0], &[3.0, 3.0]);
        let re3 = bbox(&[1.0, 0.0], &[2.0, 4.0]);
        assert!(re1.intersects(&re2).unwrap());
        assert!(!re1.intersects(&re3).unwrap());
        assert_eq!(re1.intersecting_area(&re2).unwrap(), 2.0);
        assert_eq!(re1.intersecting_area(&re3).unwrap(), 0.0);
    }

    #[test]
    fn test_encloses() {
        let outer = bbox(&[0.0, 0.0], &[10.0, 10.0]);
        let inner = bbox(&[2.0, 2.0], &[8.0, 8.0]);
        let partial = bbox(&[5.0, 5.0], &[15.0, 15.0]);

        assert!(outer.encloses(&inner).unwrap());
        assert!(outer.encloses(&outer).unwrap());
        assert!(!outer.encloses(&partial).unwrap());
        assert!(!inner.encloses(&outer).unwrap());
    }

    #[test]
    fn test_disjoint() {
        let a = bbox(&[0.0, 0.0], &[10.0, 10.0]);
        assert!(a.is_disjoint(&bbox(&[11.0, 0.0], &[12.0, 1.0])).unwrap());
        assert!(!a.is_disjoint(&bbox(&[10.0, 10.0], &[12.0, 12.0])).unwrap());
    }

    #[test]
    fn test_enlargement() {
        let a = bbox(&[0.0, 0.0], &[2.0, 2.0]);
        assert_eq!(a.enlargement(&bbox(&[1.0, 1.0], &[2.0, 2.0])), 0.0);
        assert_eq!(a.enlargement(&bbox(&[2.0, 0.0], &[4.0, 2.0])), 4.0);
    }

    #[test]
    fn test_equality_and_hash() {
        let a = bbox(&[1.0, 2.0], &[3.0, 4.0]);
        let b = bbox(&[1.0, 2.0], &[3.0, 4.0]);
        let c = bbox(&[1.0, 2.0], &[3.0, 5.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.checked_eq(&b).unwrap());
        assert!(!a.checked_eq(&c).unwrap());

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_signed_zero_eq_hash_ord() {
        let negative = bbox(&[-0.0, 0.0], &[1.0, 1.0]);
        let positive = bbox(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(negative, positive);
        assert_eq!(negative.cmp(&positive), Ordering::Equal);

        let hash_of = |b: &BoundingBox| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            b.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash_of(&negative), hash_of(&positive));

        let mut set = HashSet::new();
        set.insert(negative);
        assert!(set.contains(&positive));

        // merging never reintroduces a negative zero
        let merged = bbox(&[-0.0, -0.0], &[0.0, 0.0]).merge(&positive);
        assert_eq!(hash_of(&merged), hash_of(&positive));
    }

    #[test]
    fn test_ordering() {
        let a = bbox(&[1.0, 2.0], &[3.0, 4.0]);
        let b = bbox(&[2.0, 2.0], &[3.0, 4.0]);
        let c = bbox(&[1.0, 3.0], &[3.0, 4.0]);
        assert!(a < b);
        assert!(a < c);
        assert!(b > c);
    }

    #[test]
    fn test_zero() {
        let z = BoundingBox::zero(3);
        assert_eq!(z.dimension(), 3);
        assert_eq!(z.area(), 0.0);
    }

    #[test]
    fn test_display() {
        let b = bbox(&[1.0, 2.0], &[3.0, 4.0]);
        assert_eq!(format!("{}", b), "BoundingBox(low: (1,2), high: (3,4))");
    }
}
