//! Bridging hole rings into the outer ring.

use core::cmp::Ordering;

use alloc::vec::Vec;

use crate::node::{filter_points, split_polygon, Node, NodeIndex};
use crate::predicates::{area, locally_inside};
use crate::Coord;

/// find the leftmost node of a polygon ring
pub(crate) fn get_leftmost<T: Coord>(nodes: &[Node<T>], start_i: NodeIndex) -> NodeIndex {
    let mut p_i = start_i;
    let mut p = node!(nodes, p_i);
    let mut leftmost_i = start_i;
    let mut leftmost = p;

    loop {
        if p.x < leftmost.x || (p.x == leftmost.x && p.y < leftmost.y) {
            (leftmost_i, leftmost) = (p_i, p);
        }
        p_i = p.next_i;
        if p_i == start_i {
            return leftmost_i;
        }
        p = node!(nodes, p_i);
    }
}

/// Finds a bridge between the hole's leftmost vertex and the outer ring and splices the hole in.
///
/// Returns the node to continue with as the outer ring, or `None` if filtering around the
/// bridge consumed the whole ring. A hole without a bridge is left out of the polygon.
pub(crate) fn eliminate_hole<T: Coord>(
    nodes: &mut Vec<Node<T>>,
    hole_i: NodeIndex,
    outer_node_i: NodeIndex,
) -> Option<NodeIndex> {
    let hole = *node!(nodes, hole_i);
    let Some(bridge_i) = find_hole_bridge(nodes, &hole, outer_node_i) else {
        log::warn!(
            "no bridge from hole vertex {} at ({:?}, {:?}), hole left untriangulated",
            hole.i,
            hole.x,
            hole.y
        );
        return Some(outer_node_i);
    };
    let bridge_reverse_i = split_polygon(nodes, bridge_i, hole_i);

    // filter collinear points around the cuts
    let end_i = Some(node!(nodes, bridge_reverse_i).next_i);
    filter_points(nodes, bridge_reverse_i, end_i);
    let end_i = Some(node!(nodes, bridge_i).next_i);
    filter_points(nodes, bridge_i, end_i)
}

/// David Eberly's algorithm for finding a bridge between hole and outer polygon
///
/// The ray crossing is never rounded into the geometry: touching is decided by
/// cross-multiplication and the candidate triangle is tested against the crossed segment.
pub(crate) fn find_hole_bridge<T: Coord>(
    nodes: &[Node<T>],
    hole: &Node<T>,
    outer_node_i: NodeIndex,
) -> Option<NodeIndex> {
    let h = hole.xy();
    let [hx, hy] = h;
    // nearest crossing x, with the crossed segment's endpoints (lesser x first)
    let mut nearest: Option<(f64, NodeIndex, NodeIndex)> = None;

    // find a segment intersected by a ray from the hole's leftmost point to the left;
    // segment's endpoint with lesser x will be potential connection point
    let mut p_i = outer_node_i;
    loop {
        let p = node!(nodes, p_i);
        let p_next = node!(nodes, p.next_i);
        if hy <= p.y && hy >= p_next.y && p_next.y != p.y {
            // the crossing is at p.x + run / rise with rise > 0
            let rise = p.y - p_next.y;
            let run = (p.y - hy) * (p_next.x - p.x);
            let to_hole = (hx - p.x) * rise;
            if run <= to_hole {
                let x = p.x.to_f64()? + run.to_f64()? / rise.to_f64()?;
                if nearest.map_or(true, |(qx, ..)| x > qx) {
                    let (m_i, other_i) = if p.x < p_next.x {
                        (p_i, p.next_i)
                    } else {
                        (p.next_i, p_i)
                    };
                    if run == to_hole {
                        // hole touches outer segment; pick leftmost endpoint
                        return Some(m_i);
                    }
                    nearest = Some((x, m_i, other_i));
                }
            }
        }
        p_i = p.next_i;
        if p_i == outer_node_i {
            break;
        }
    }

    let (_, mut m_i, other_i) = nearest?;

    // look for points inside the triangle of hole point, segment intersection and endpoint;
    // if there are no points found, we have a valid connection;
    // otherwise choose the point of the minimum angle with the ray as connection point
    let stop_i = m_i;
    let m = node!(nodes, m_i).xy();
    let [mx, my] = m;
    let o = node!(nodes, other_i).xy();
    let in_triangle = |p: [T; 2]| {
        if my == hy {
            // the ray ends at m itself, the triangle is the segment from m to the hole
            p[1] == hy
        } else {
            // the crossing lies on m-o, so its sides are the sides of m-o
            same_side(area(h, m, p), area(h, m, o))
                && same_side(area(m, o, p), area(m, o, h))
                && same_side(p[1] - hy, my - hy)
        }
    };
    // tangent of the current best candidate, kept as (|dy|, dx) so integers stay exact
    let mut tan_min: Option<(T, T)> = None;

    let mut p_i = m_i;
    loop {
        let p = node!(nodes, p_i);
        if (hx >= p.x && p.x >= mx && hx != p.x) && in_triangle(p.xy()) {
            let tan = ((hy - p.y).abs(), hx - p.x);
            let m = node!(nodes, m_i);
            let better = match tan_min.map(|min| compare_tan(tan, min)) {
                None | Some(Ordering::Less) => true,
                Some(Ordering::Equal) => {
                    p.x > m.x || (p.x == m.x && sector_contains_sector(nodes, m, p))
                }
                Some(Ordering::Greater) => false,
            };
            if better && locally_inside(nodes, p, hole) {
                m_i = p_i;
                tan_min = Some(tan);
            }
        }

        p_i = p.next_i;
        if p_i == stop_i {
            return Some(m_i);
        }
    }
}

/// whether `v` is zero or has the sign of `reference`
fn same_side<T: Coord>(v: T, reference: T) -> bool {
    v == T::zero() || (v < T::zero()) == (reference < T::zero())
}

/// compares `a.0 / a.1` with `b.0 / b.1` for positive denominators
fn compare_tan<T: Coord>(a: (T, T), b: (T, T)) -> Ordering {
    (a.0 * b.1)
        .partial_cmp(&(b.0 * a.1))
        .unwrap_or(Ordering::Greater)
}

/// whether sector in vertex m contains sector in vertex p in the same coordinates
fn sector_contains_sector<T: Coord>(nodes: &[Node<T>], m: &Node<T>, p: &Node<T>) -> bool {
    area(node!(nodes, m.prev_i).xy(), m.xy(), node!(nodes, p.prev_i).xy()) < T::zero()
        && area(node!(nodes, p.next_i).xy(), m.xy(), node!(nodes, m.next_i).xy()) < T::zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::tests::{arena, ring, ring_points};

    #[test]
    fn leftmost_prefers_lower_y_on_ties() {
        let mut nodes = arena();
        let start = ring(&mut nodes, &[[10, 90], [90, 90], [90, 10], [10, 10]]);
        let leftmost = get_leftmost(&nodes, start);
        assert_eq!(node!(nodes, leftmost).xy(), [10, 10]);
    }

    #[test]
    fn bridge_to_outer_corner() {
        let mut nodes = arena();
        let outer = ring(&mut nodes, &[[0, 0], [100, 0], [100, 100], [0, 100]]);
        let hole = ring(&mut nodes, &[[10, 10], [10, 90], [90, 90], [90, 10]]);
        let hole = get_leftmost(&nodes, hole);

        let bridge = find_hole_bridge(&nodes, node!(nodes, hole), outer).unwrap();
        assert_eq!(node!(nodes, bridge).xy(), [0, 0]);

        let merged = eliminate_hole(&mut nodes, hole, outer).unwrap();
        assert_eq!(ring_points(&nodes, merged).len(), 10);
    }

    #[test]
    fn bridge_prefers_the_smallest_angle() {
        let mut nodes = arena();
        // the notch tip (20, 30) hides the corner the ray ends at
        let outer = ring(
            &mut nodes,
            &[[0, 0], [20, 30], [40, 0], [100, 0], [100, 100], [0, 100]],
        );
        let hole = ring(&mut nodes, &[[50, 50], [50, 60], [60, 60], [60, 50]]);
        let hole = get_leftmost(&nodes, hole);

        let bridge = find_hole_bridge(&nodes, node!(nodes, hole), outer).unwrap();
        assert_eq!(node!(nodes, bridge).xy(), [20, 30]);
    }

    #[test]
    fn bridge_with_a_fractional_ray_crossing() {
        // the ray from (20, 20) crosses (21, 24)-(18, 17) at x = 19 2/7,
        // and the reflex corner (19, 19) hides (18, 17)
        let outer = [[18, 17], [19, 19], [40, 0], [40, 40], [21, 24]];
        let hole = [[20, 20], [22, 21], [21, 22]];

        let mut nodes = arena();
        let outer_i = ring(&mut nodes, &outer);
        let hole_i = ring(&mut nodes, &hole);
        let hole_i = get_leftmost(&nodes, hole_i);
        let bridge = find_hole_bridge(&nodes, node!(nodes, hole_i), outer_i).unwrap();
        assert_eq!(node!(nodes, bridge).xy(), [19, 19]);

        let to_float = |[x, y]: [i32; 2]| [x as f64, y as f64];
        let mut nodes = arena();
        let outer_i = ring(&mut nodes, &outer.map(to_float));
        let hole_i = ring(&mut nodes, &hole.map(to_float));
        let hole_i = get_leftmost(&nodes, hole_i);
        let bridge = find_hole_bridge(&nodes, node!(nodes, hole_i), outer_i).unwrap();
        assert_eq!(node!(nodes, bridge).xy(), [19.0, 19.0]);
    }

    #[test]
    fn no_bridge_for_a_hole_outside() {
        let mut nodes = arena();
        let outer = ring(&mut nodes, &[[0, 0], [10, 0], [10, 10], [0, 10]]);
        let hole = Node::new(7, -20, 5);
        assert_eq!(find_hole_bridge(&nodes, &hole, outer), None);
    }
}
