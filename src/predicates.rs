//! Exact geometric predicates shared by every stage of the triangulation.
//!
//! All turn and winding decisions go through [`area`], so repeated evaluations on the same
//! points always agree. Orientation names follow screen coordinates (y axis pointing down),
//! the same convention as the `clockwise` flag of [`Earcut::earcut`](crate::Earcut::earcut).

use crate::node::{Node, NodeIndex};
use crate::Coord;

/// Turn direction of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Colinear,
}

/// Signed area of a triangle (twice the area, negative for clockwise turns).
#[inline]
pub(crate) fn area<T: Coord>(p: [T; 2], q: [T; 2], r: [T; 2]) -> T {
    (q[1] - p[1]) * (r[0] - q[0]) - (q[0] - p[0]) * (r[1] - q[1])
}

/// Classifies the turn `p -> q -> r`.
pub fn orientation<T: Coord>(p: [T; 2], q: [T; 2], r: [T; 2]) -> Orientation {
    let a = area(p, q, r);
    if a < T::zero() {
        Orientation::Clockwise
    } else if a > T::zero() {
        Orientation::CounterClockwise
    } else {
        Orientation::Colinear
    }
}

/// Returns true when the segments `p1-q1` and `p2-q2` properly cross each other.
///
/// Segments that only touch, share an endpoint or overlap colinearly do not intersect.
pub fn segments_intersect<T: Coord>(p1: [T; 2], q1: [T; 2], p2: [T; 2], q2: [T; 2]) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);
    [o1, o2, o3, o4].iter().all(|&o| o != Orientation::Colinear) && o1 != o2 && o3 != o4
}

/// Barycentric weights of `p` against the edges `ca`, `ab` and `bc`.
///
/// They sum to the triangle's area with flipped sign, so for a clockwise triangle all three
/// are non-negative exactly when `p` lies in the closed triangle.
#[inline]
fn weights<T: Coord>(a: [T; 2], b: [T; 2], c: [T; 2], p: [T; 2]) -> [T; 3] {
    let [ax, ay] = a;
    let [bx, by] = b;
    let [cx, cy] = c;
    let [px, py] = p;
    [
        (cx - px) * (ay - py) - (ax - px) * (cy - py),
        (ax - px) * (by - py) - (bx - px) * (ay - py),
        (bx - px) * (cy - py) - (cx - px) * (by - py),
    ]
}

/// Check if a point lies within the closed clockwise triangle `a, b, c`.
pub fn point_in_triangle<T: Coord>(a: [T; 2], b: [T; 2], c: [T; 2], p: [T; 2]) -> bool {
    weights(a, b, c, p).iter().all(|&w| w >= T::zero())
}

/// Like [`point_in_triangle`], but a point coinciding with one of the corners is not inside.
///
/// Points on an edge still count. This is what keeps an ear from being cut.
pub fn point_in_triangle_excluding_corners<T: Coord>(
    a: [T; 2],
    b: [T; 2],
    c: [T; 2],
    p: [T; 2],
) -> bool {
    let w = weights(a, b, c, p);
    w.iter().all(|&w| w >= T::zero()) && w.iter().filter(|&&w| w != T::zero()).count() >= 2
}

/// check if a polygon diagonal is locally inside the polygon
pub(crate) fn locally_inside<T: Coord>(nodes: &[Node<T>], a: &Node<T>, b: &Node<T>) -> bool {
    let a_prev = node!(nodes, a.prev_i).xy();
    let a_next = node!(nodes, a.next_i).xy();
    let (a, b) = (a.xy(), b.xy());
    if area(a_prev, a, a_next) < T::zero() {
        area(a, b, a_next) >= T::zero() && area(a, a_prev, b) >= T::zero()
    } else {
        area(a, b, a_prev) < T::zero() || area(a, a_next, b) < T::zero()
    }
}

/// Ray-casting parity test of the point `point / denom` against the ring through `start_i`.
///
/// `denom` must be positive. The crossing is compared by cross-multiplication, so integer
/// coordinates never go through a truncating division.
pub(crate) fn point_in_ring<T: Coord>(
    nodes: &[Node<T>],
    start_i: NodeIndex,
    point: [T; 2],
    denom: T,
) -> bool {
    let [px, py] = point;
    let mut inside = false;
    let mut p = node!(nodes, start_i);
    loop {
        let p_next = node!(nodes, p.next_i);
        if (p.y * denom > py) != (p_next.y * denom > py) {
            // px / denom < crossing x, scaled by denom and by dy
            let dy = p_next.y - p.y;
            let lhs = (px - p.x * denom) * dy;
            let rhs = (p_next.x - p.x) * (py - p.y * denom);
            let left_of_crossing = if dy > T::zero() { lhs < rhs } else { lhs > rhs };
            if left_of_crossing {
                inside = !inside;
            }
        }
        if p.next_i == start_i {
            return inside;
        }
        p = p_next;
    }
}
