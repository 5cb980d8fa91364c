use crate::{
    error::{Error, Result},
    point::Point,
};

/// A stored point returned by a nearest neighbor query, with its squared
/// euclidean distance to the query.
#[derive(Debug, PartialEq)]
pub struct Neighbor<'a, P> {
    pub point: &'a P,
    pub distance: f64,
}

// Derived impls would demand `P: Clone`.
impl<P> Clone for Neighbor<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Neighbor<'_, P> {}

/// Exact k nearest neighbor search over a fixed set of points.
pub trait NearestNeighbors<P: Point> {
    /// The `min(k, len)` closest points to `query`, nearest first.
    fn k_nearest<Q: Point + ?Sized>(&self, query: &Q, k: usize) -> Result<Vec<Neighbor<'_, P>>>;
    fn len(&self) -> usize;
    fn dimension(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn validate_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 {
        return Err(Error::InvalidInput {
            index: 0,
            reason: "dimension must be at least 1".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_points<P: Point>(points: &[P], dimension: usize) -> Result<()> {
    validate_dimension(dimension)?;
    for (index, point) in points.iter().enumerate() {
        if point.dimension() != dimension {
            return Err(Error::InvalidInput {
                index,
                reason: format!(
                    "expected dimension {dimension}, found {}",
                    point.dimension()
                ),
            });
        }
        if let Some(axis) = (0..dimension).find(|&axis| point.coord(axis).is_nan()) {
            return Err(Error::InvalidInput {
                index,
                reason: format!("attribute {axis} is NaN"),
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_query<Q: Point + ?Sized>(query: &Q, dimension: usize) -> Result<()> {
    if query.dimension() != dimension {
        return Err(Error::InvalidQuery(format!(
            "query has dimension {}, index expects {dimension}",
            query.dimension()
        )));
    }
    if let Some(axis) = (0..dimension).find(|&axis| query.coord(axis).is_nan()) {
        return Err(Error::InvalidQuery(format!("query attribute {axis} is NaN")));
    }
    Ok(())
}

pub(crate) fn validate_k(k: isize) -> Result<usize> {
    usize::try_from(k)
        .map_err(|_| Error::InvalidQuery(format!("k must be non-negative, got {k}")))
}
