//! Arena-backed circular doubly linked vertex rings.

use core::num::NonZeroU32;

use alloc::vec::Vec;

use crate::predicates::area;
use crate::Coord;

/// Index of a node in the arena. Slot 0 holds a dummy node, so every live index is non-zero.
pub(crate) type NodeIndex = NonZeroU32;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Node<T> {
    /// vertex index in the flattened input
    pub(crate) i: u32,
    /// z-order curve value, assigned when the ring is indexed
    pub(crate) z: Option<u32>,
    /// vertex coordinates x
    pub(crate) x: T,
    /// vertex coordinates y
    pub(crate) y: T,
    /// previous vertex node in a polygon ring
    pub(crate) prev_i: NodeIndex,
    /// next vertex node in a polygon ring
    pub(crate) next_i: NodeIndex,
    /// previous node in z-order
    pub(crate) prev_z_i: Option<NodeIndex>,
    /// next node in z-order
    pub(crate) next_z_i: Option<NodeIndex>,
}

impl<T: Coord> Node<T> {
    pub(crate) fn new(i: u32, x: T, y: T) -> Self {
        Self {
            i,
            z: None,
            x,
            y,
            prev_i: NodeIndex::MIN,
            next_i: NodeIndex::MIN,
            prev_z_i: None,
            next_z_i: None,
        }
    }

    #[inline]
    pub(crate) fn xy(&self) -> [T; 2] {
        [self.x, self.y]
    }
}

fn next_index<T>(nodes: &[Node<T>]) -> NodeIndex {
    debug_assert!(!nodes.is_empty(), "the dummy node must be in place");
    NodeIndex::new(nodes.len() as u32).unwrap_or(NodeIndex::MIN)
}

/// create a node and optionally link it with previous one (in a circular doubly linked list)
pub(crate) fn insert_node<T: Coord>(
    nodes: &mut Vec<Node<T>>,
    i: u32,
    x: T,
    y: T,
    last: Option<NodeIndex>,
) -> NodeIndex {
    let mut p = Node::new(i, x, y);
    let p_i = next_index(nodes);
    match last {
        Some(last_i) => {
            let last = node_mut!(nodes, last_i);
            let last_next_i = last.next_i;
            (p.next_i, last.next_i) = (last_next_i, p_i);
            p.prev_i = last_i;
            node_mut!(nodes, last_next_i).prev_i = p_i;
        }
        None => {
            (p.prev_i, p.next_i) = (p_i, p_i);
        }
    }
    nodes.push(p);
    p_i
}

/// unlink a node from its ring and from the z-order list; returns its former neighbours
pub(crate) fn remove_node<T: Coord>(
    nodes: &mut [Node<T>],
    p_i: NodeIndex,
) -> (NodeIndex, NodeIndex) {
    let p = *node!(nodes, p_i);

    node_mut!(nodes, p.next_i).prev_i = p.prev_i;
    node_mut!(nodes, p.prev_i).next_i = p.next_i;

    if let Some(prev_z_i) = p.prev_z_i {
        node_mut!(nodes, prev_z_i).next_z_i = p.next_z_i;
    }
    if let Some(next_z_i) = p.next_z_i {
        node_mut!(nodes, next_z_i).prev_z_i = p.prev_z_i;
    }
    (p.prev_i, p.next_i)
}

/// Eliminates duplicate and colinear points between `start_i` and `end_i`.
///
/// Scanning restarts from the predecessor of every removed node, since a removal can make
/// that neighbour degenerate too. Returns `None` once the ring collapses to a single node.
pub(crate) fn filter_points<T: Coord>(
    nodes: &mut [Node<T>],
    start_i: NodeIndex,
    end_i: Option<NodeIndex>,
) -> Option<NodeIndex> {
    let mut end_i = end_i.unwrap_or(start_i);
    let mut p_i = start_i;

    loop {
        let p = *node!(nodes, p_i);
        let p_prev = node!(nodes, p.prev_i).xy();
        let p_next = node!(nodes, p.next_i).xy();

        if p.xy() == p_next || area(p_prev, p.xy(), p_next) == T::zero() {
            let (prev_i, _) = remove_node(nodes, p_i);
            if node!(nodes, prev_i).next_i == prev_i {
                return None;
            }
            (p_i, end_i) = (prev_i, prev_i);
            continue;
        }

        p_i = p.next_i;
        if p_i == end_i {
            return Some(end_i);
        }
    }
}

/// link two polygon vertices with a bridge; if the vertices belong to the same ring, it splits polygon into two;
/// if one belongs to the outer ring and another to a hole, it merges it into a single ring
pub(crate) fn split_polygon<T: Coord>(
    nodes: &mut Vec<Node<T>>,
    a_i: NodeIndex,
    b_i: NodeIndex,
) -> NodeIndex {
    let a2_i = next_index(nodes);
    let b2_i = a2_i.saturating_add(1);

    let a = node_mut!(nodes, a_i);
    let mut a2 = Node::new(a.i, a.x, a.y);
    let an_i = a.next_i;
    a.next_i = b_i;
    a2.prev_i = b2_i;
    a2.next_i = an_i;
    node_mut!(nodes, an_i).prev_i = a2_i;

    let b = node_mut!(nodes, b_i);
    let mut b2 = Node::new(b.i, b.x, b.y);
    let bp_i = b.prev_i;
    b.prev_i = a_i;
    b2.next_i = a2_i;
    b2.prev_i = bp_i;
    node_mut!(nodes, bp_i).next_i = b2_i;

    nodes.extend([a2, b2]);

    b2_i
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec;

    pub(crate) fn ring<T: Coord>(nodes: &mut Vec<Node<T>>, points: &[[T; 2]]) -> NodeIndex {
        let mut last = None;
        for (i, &[x, y]) in points.iter().enumerate() {
            last = Some(insert_node(nodes, i as u32, x, y, last));
        }
        last.unwrap()
    }

    pub(crate) fn arena<T: Coord>() -> Vec<Node<T>> {
        vec![Node::new(0, T::zero(), T::zero())]
    }

    pub(crate) fn ring_points<T: Coord>(nodes: &[Node<T>], start: NodeIndex) -> Vec<[T; 2]> {
        let mut out = vec![];
        let mut p = start;
        loop {
            let node = node!(nodes, p);
            assert_eq!(node!(nodes, node.next_i).prev_i, p, "links must be mutual");
            out.push(node.xy());
            p = node.next_i;
            if p == start {
                return out;
            }
        }
    }

    #[test]
    fn insert_builds_circular_ring() {
        let mut nodes = arena();
        let last = ring(&mut nodes, &[[0, 0], [10, 0], [10, 10]]);
        let first = node!(nodes, last).next_i;
        assert_eq!(ring_points(&nodes, first), vec![[0, 0], [10, 0], [10, 10]]);
    }

    #[test]
    fn filter_removes_duplicates_and_colinear_points() {
        let mut nodes = arena();
        let last = ring(
            &mut nodes,
            &[[0, 0], [5, 0], [10, 0], [10, 0], [10, 10], [0, 10], [0, 5]],
        );
        let filtered = filter_points(&mut nodes, last, None).unwrap();
        let mut points = ring_points(&nodes, filtered);
        points.sort();
        assert_eq!(points, vec![[0, 0], [0, 10], [10, 0], [10, 10]]);
    }

    #[test]
    fn filter_is_idempotent() {
        let mut nodes = arena();
        let last = ring(
            &mut nodes,
            &[[0, 0], [3, 0], [6, 0], [6, 6], [6, 6], [3, 9], [0, 6]],
        );
        let once = filter_points(&mut nodes, last, None).unwrap();
        let before = ring_points(&nodes, once);
        let twice = filter_points(&mut nodes, once, None).unwrap();
        assert_eq!(once, twice);
        assert_eq!(ring_points(&nodes, twice), before);
    }

    #[test]
    fn filter_collapses_degenerate_rings() {
        let mut nodes = arena();
        let line = ring(&mut nodes, &[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(filter_points(&mut nodes, line, None), None);

        let mut nodes = arena();
        let point = ring(&mut nodes, &[[4.0, 2.0]]);
        assert_eq!(filter_points(&mut nodes, point, None), None);

        let mut nodes = arena();
        let pair = ring(&mut nodes, &[[4.0, 2.0], [4.0, 2.0], [5.0, 2.0]]);
        assert_eq!(filter_points(&mut nodes, pair, None), None);
    }

    #[test]
    fn split_polygon_divides_a_ring() {
        let mut nodes = arena();
        let last = ring(&mut nodes, &[[0, 0], [10, 0], [10, 10], [0, 10]]);
        let a = node!(nodes, last).next_i; // (0, 0)
        let b = node!(nodes, node!(nodes, a).next_i).next_i; // (10, 10)
        let c = split_polygon(&mut nodes, a, b);

        assert_eq!(ring_points(&nodes, a), vec![[0, 0], [10, 10], [0, 10]]);
        assert_eq!(ring_points(&nodes, c), vec![[10, 10], [0, 0], [10, 0]]);
    }

    #[test]
    fn split_polygon_merges_two_rings() {
        let mut nodes = arena();
        let outer = ring(&mut nodes, &[[0, 0], [10, 0], [10, 10], [0, 10]]);
        let hole = ring(&mut nodes, &[[4, 4], [4, 6], [6, 6], [6, 4]]);
        split_polygon(&mut nodes, outer, hole);
        assert_eq!(ring_points(&nodes, outer).len(), 10);
    }
}
