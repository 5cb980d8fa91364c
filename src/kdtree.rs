use crate::{
    distance::squared_euclidean,
    error::Result,
    heap::CandidateSet,
    index::{
        validate_dimension, validate_k, validate_points, validate_query, NearestNeighbors,
        Neighbor,
    },
    node::Node,
    point::Point,
};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{debug, trace};

/// How each subtree picks its splitting point along the current axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitStrategy {
    /// Stable sort of the whole sub-list, then take element `len / 2`.
    /// O(n log² n), reproduces the same tree shape for the same input order.
    #[default]
    Sort,
    /// Quickselect the element at `len / 2`. O(n log n) on average.
    Select,
}

/// Balanced k-d tree over points of a fixed dimension.
///
/// The tree is built once from a list of points and is immutable afterwards:
/// queries borrow it shared, so any number of threads may query the same tree
/// while nothing can rebuild or drop it underneath them. Nodes are kept in
/// an arena and refer to their children by slot.
pub struct KdTree<P> {
    dimension: usize,
    strategy: SplitStrategy,
    root: Option<usize>,
    height: usize,
    nodes: Vec<Node<P>>,
}

impl<P: Point> KdTree<P> {
    /// An empty tree for points with `dimension` attributes.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_strategy(dimension, SplitStrategy::default())
    }

    pub fn with_strategy(dimension: usize, strategy: SplitStrategy) -> Result<Self> {
        validate_dimension(dimension)?;
        Ok(KdTree {
            dimension,
            strategy,
            root: None,
            height: 0,
            nodes: Vec::new(),
        })
    }

    /// Builds a tree from `points`, all of which must have `dimension`
    /// attributes.
    pub fn build(points: Vec<P>, dimension: usize) -> Result<Self> {
        let mut tree = Self::new(dimension)?;
        tree.build_tree(points)?;
        Ok(tree)
    }

    /// Replaces the contents of the tree with `points`.
    ///
    /// On error the tree is left as it was.
    pub fn build_tree(&mut self, mut points: Vec<P>) -> Result<()> {
        validate_points(&points, self.dimension)?;
        self.clear();

        let mut builder = Builder {
            dimension: self.dimension,
            strategy: self.strategy,
            links: vec![(None, None); points.len()],
            height: 0,
        };
        let root = builder.split(&mut points, 0, 0);

        // `points` is now laid out so that slot i holds the point of node i.
        self.nodes = points
            .into_iter()
            .zip(builder.links)
            .map(|(point, (left, right))| Node::new(point, left, right))
            .collect();
        self.root = root;
        self.height = builder.height;

        debug!(
            points = self.nodes.len(),
            dimension = self.dimension,
            strategy = ?self.strategy,
            height = self.height,
            "built k-d tree"
        );
        Ok(())
    }

    /// The `min(k, len)` stored points closest to `query`, nearest first,
    /// with their squared distances.
    pub fn k_nearest<Q: Point + ?Sized>(&self, query: &Q, k: usize) -> Result<Vec<Neighbor<'_, P>>> {
        validate_query(query, self.dimension)?;
        if k == 0 || self.root.is_none() {
            return Ok(Vec::new());
        }

        let mut candidates = CandidateSet::new(k);
        self.search(self.root, query, 0, &mut candidates);

        let neighbors: Vec<Neighbor<'_, P>> = candidates
            .into_sorted_vec()
            .into_iter()
            .map(|(distance, slot)| Neighbor {
                point: &self.nodes[slot].point,
                distance,
            })
            .collect();
        trace!(k, found = neighbors.len(), "k nearest neighbors");
        Ok(neighbors)
    }

    /// Like [`KdTree::k_nearest`], returning copies of the points only.
    pub fn k_nearest_neighbors<Q: Point + ?Sized>(&self, query: &Q, k: usize) -> Result<Vec<P>>
    where
        P: Clone,
    {
        Ok(self
            .k_nearest(query, k)?
            .into_iter()
            .map(|neighbor| neighbor.point.clone())
            .collect())
    }

    /// Nearest neighbor query for callers holding a signed count.
    ///
    /// A negative `k` is rejected rather than treated as zero.
    pub fn query<Q: Point + ?Sized>(&self, point: &Q, k: isize) -> Result<Vec<P>>
    where
        P: Clone,
    {
        let k = validate_k(k)?;
        self.k_nearest_neighbors(point, k)
    }

    /// Runs one query per entry of `queries` in parallel.
    ///
    /// Results come back in the order of `queries`.
    pub fn k_nearest_batch<Q>(&self, queries: &[Q], k: usize) -> Result<Vec<Vec<Neighbor<'_, P>>>>
    where
        P: Sync,
        Q: Point + Sync,
    {
        queries
            .par_iter()
            .map(|query| self.k_nearest(query, k))
            .collect()
    }

    fn search<Q: Point + ?Sized>(
        &self,
        slot: Option<usize>,
        query: &Q,
        depth: usize,
        candidates: &mut CandidateSet<usize>,
    ) {
        let Some(slot) = slot else {
            return;
        };
        let node = &self.nodes[slot];
        candidates.offer(squared_euclidean(&node.point, query), slot);

        let axis = depth % self.dimension;
        let delta = query.coord(axis) - node.point.coord(axis);
        let (near, far) = node.sides(delta);
        self.search(near, query, depth + 1, candidates);

        // The far side can only hold a closer point if the splitting plane
        // is nearer than the current worst candidate.
        let plane = delta * delta;
        if !candidates.is_full() || candidates.worst().map_or(true, |worst| plane < worst) {
            self.search(far, query, depth + 1, candidates);
        }
    }
}

impl<P> KdTree<P> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    /// Number of levels, 0 for an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Stored points in arena order (not sorted by anything meaningful).
    pub fn iter(&self) -> impl Iterator<Item = &P> + '_ {
        self.nodes.iter().map(|node| &node.point)
    }

    /// Drops every node. Dimension and strategy are kept.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.root = None;
        self.height = 0;
    }

    /// Moves the tree out, leaving an empty tree of the same dimension.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let empty = KdTree {
            dimension: self.dimension,
            strategy: self.strategy,
            root: None,
            height: 0,
            nodes: Vec::new(),
        };
        std::mem::replace(self, empty)
    }
}

impl<P: Point> Default for KdTree<P> {
    fn default() -> Self {
        KdTree::new(3).expect("Invalid dimension")
    }
}

impl<P: Point> NearestNeighbors<P> for KdTree<P> {
    fn k_nearest<Q: Point + ?Sized>(&self, query: &Q, k: usize) -> Result<Vec<Neighbor<'_, P>>> {
        KdTree::k_nearest(self, query, k)
    }

    fn len(&self) -> usize {
        KdTree::len(self)
    }

    fn dimension(&self) -> usize {
        KdTree::dimension(self)
    }
}

struct Builder {
    dimension: usize,
    strategy: SplitStrategy,
    links: Vec<(Option<usize>, Option<usize>)>,
    height: usize,
}

impl Builder {
    // Orders `points` (which start at `offset` in the full list) so that the
    // median along this depth's axis lands in the middle, then recurses on
    // both halves. Returns the slot of the subtree root.
    fn split<P: Point>(&mut self, points: &mut [P], offset: usize, depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }
        self.height = self.height.max(depth + 1);

        let axis = depth % self.dimension;
        let median = points.len() / 2;
        match self.strategy {
            SplitStrategy::Sort => points.sort_by_key(|p| OrderedFloat(p.coord(axis))),
            SplitStrategy::Select => {
                points.select_nth_unstable_by_key(median, |p| OrderedFloat(p.coord(axis)));
            }
        }

        let (left, rest) = points.split_at_mut(median);
        let left = self.split(left, offset, depth + 1);
        let right = self.split(&mut rest[1..], offset + median + 1, depth + 1);

        let slot = offset + median;
        self.links[slot] = (left, right);
        Some(slot)
    }
}
