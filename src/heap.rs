use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Bounded max-heap of the `capacity` closest candidates seen so far.
///
/// The worst (largest distance) candidate sits on top so it can be compared
/// against and evicted in O(log k). Ties on distance order by `T`.
pub struct CandidateSet<T: Ord> {
    capacity: usize,
    heap: BinaryHeap<(OrderedFloat<f64>, T)>,
}

impl<T: Ord> CandidateSet<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        CandidateSet {
            capacity,
            // A huge k must not turn into a huge up-front allocation.
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
        }
    }

    /// Offers a candidate. Returns `true` if it was kept.
    pub fn offer(&mut self, distance: f64, item: T) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push((OrderedFloat(distance), item));
            return true;
        }
        match self.worst() {
            Some(worst) if distance < worst => {
                self.heap.pop();
                self.heap.push((OrderedFloat(distance), item));
                true
            }
            _ => false,
        }
    }

    /// Distance of the current worst candidate.
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        self.heap.peek().map(|(distance, _)| distance.into_inner())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drains the set into `(distance, item)` pairs, nearest first.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<(f64, T)> {
        let mut farthest_first = Vec::with_capacity(self.heap.len());
        let mut heap = self.heap;
        while let Some((distance, item)) = heap.pop() {
            farthest_first.push((distance.into_inner(), item));
        }
        farthest_first.reverse();
        farthest_first
    }
}

#[cfg(test)]
mod tests {
    use super::CandidateSet;

    #[test]
    fn keeps_smallest() {
        let mut set = CandidateSet::new(3);
        for (i, d) in [5.0, 1.0, 4.0, 2.0, 3.0, 0.5].iter().enumerate() {
            set.offer(*d, i);
        }
        assert!(set.is_full());
        assert_eq!(set.worst(), Some(2.0));
        let sorted = set.into_sorted_vec();
        assert_eq!(sorted, vec![(0.5, 5), (1.0, 1), (2.0, 3)]);
    }

    #[test]
    fn rejects_equal_to_worst() {
        let mut set = CandidateSet::new(1);
        assert!(set.offer(1.0, 0));
        assert!(!set.offer(1.0, 1));
        assert!(!set.offer(2.0, 2));
        assert!(set.offer(0.5, 3));
        assert_eq!(set.into_sorted_vec(), vec![(0.5, 3)]);
    }

    #[test]
    fn zero_capacity() {
        let mut set = CandidateSet::new(0);
        assert!(set.is_full());
        assert!(!set.offer(0.0, 0));
        assert!(set.is_empty());
        assert_eq!(set.worst(), None);
    }

    #[test]
    fn partially_filled() {
        let mut set = CandidateSet::new(10);
        set.offer(3.0, 'c');
        set.offer(1.0, 'a');
        assert!(!set.is_full());
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_sorted_vec(), vec![(1.0, 'a'), (3.0, 'c')]);
    }
}
