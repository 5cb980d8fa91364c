use crate::point::Point;

/// Squared euclidean distance over every attribute of `a` and `b`.
///
/// Both points must have the same dimension; callers validate this before
/// reaching here.
pub fn squared_euclidean<P: Point + ?Sized, Q: Point + ?Sized>(a: &P, b: &Q) -> f64 {
    let mut sum = 0.0;
    for axis in 0..a.dimension() {
        sum += (a.coord(axis) - b.coord(axis)).powi(2);
    }
    sum
}
