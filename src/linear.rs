use crate::{
    distance::squared_euclidean,
    error::Result,
    heap::CandidateSet,
    index::{validate_points, validate_query, NearestNeighbors, Neighbor},
    point::Point,
};

/// Brute-force exact nearest neighbor search.
///
/// Scans every point for every query. Used as the reference answer when
/// checking the k-d tree and as the baseline in benchmarks.
pub struct LinearIndex<P> {
    dimension: usize,
    data: Vec<P>,
}

impl<P: Point> LinearIndex<P> {
    pub fn build(points: Vec<P>, dimension: usize) -> Result<Self> {
        validate_points(&points, dimension)?;
        Ok(Self {
            dimension,
            data: points,
        })
    }
}

impl<P: Point> NearestNeighbors<P> for LinearIndex<P> {
    fn k_nearest<Q: Point + ?Sized>(&self, query: &Q, k: usize) -> Result<Vec<Neighbor<'_, P>>> {
        validate_query(query, self.dimension)?;
        let mut candidates = CandidateSet::new(k);
        for (i, point) in self.data.iter().enumerate() {
            candidates.offer(squared_euclidean(point, query), i);
        }
        Ok(candidates
            .into_sorted_vec()
            .into_iter()
            .map(|(distance, i)| Neighbor {
                point: &self.data[i],
                distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
