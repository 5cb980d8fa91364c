//! Balanced k-d tree for exact k nearest neighbor search.
//!
//! Points are any ordered list of real attributes (see [`Point`]): plain
//! arrays, vectors, or the six-attribute [`ColorPoint`] used for colored
//! point clouds. Distances are squared euclidean over every attribute, with
//! no scaling between attributes.
//!
//! ```
//! use kdindex::KdTree;
//!
//! let points = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]];
//! let tree = KdTree::build(points, 2).unwrap();
//! let nearest = tree.k_nearest(&[0.0, 0.0], 2).unwrap();
//! assert_eq!(nearest[0].point, &[0.0, 0.0]);
//! assert_eq!(nearest[1].distance, 1.0);
//! ```
mod distance;
mod error;
mod heap;
mod index;
#[allow(clippy::module_name_repetitions)]
mod kdtree;
mod linear;
mod node;
mod point;

pub use distance::squared_euclidean;
pub use error::{Error, Result};
pub use heap::CandidateSet;
pub use index::{NearestNeighbors, Neighbor};
pub use kdtree::{KdTree, SplitStrategy};
pub use linear::LinearIndex;
pub use point::{ColorPoint, Point};
