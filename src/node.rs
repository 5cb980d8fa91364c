/// A k-d tree node: one stored point and the arena slots of its children.
pub struct Node<P> {
    pub point: P,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl<P> Node<P> {
    #[must_use]
    pub fn new(point: P, left: Option<usize>, right: Option<usize>) -> Node<P> {
        Node { point, left, right }
    }

    /// Children in `(near, far)` order for a query lying `delta` away from
    /// this node on the split axis.
    #[must_use]
    pub fn sides(&self, delta: f64) -> (Option<usize>, Option<usize>) {
        if delta < 0.0 {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        }
    }
}
