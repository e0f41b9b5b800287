//! The ear slicing loop and its fallback passes.

use alloc::vec::Vec;

use crate::node::{filter_points, remove_node, split_polygon, Node, NodeIndex};
use crate::predicates::{
    locally_inside, orientation, point_in_ring, point_in_triangle_excluding_corners,
    segments_intersect, Orientation,
};
use crate::zorder::{index_curve, z_order, ZBounds};
use crate::{Coord, TriangleSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pass {
    /// plain ear clipping
    Init,
    /// after filtering, curing local self-intersections
    Cure,
    /// splitting the ring by a diagonal
    Split,
}

/// Triangulates a single ring, emitting triangles into a sink.
pub(crate) struct EarSlicer<'a, T, S: ?Sized> {
    nodes: &'a mut Vec<Node<T>>,
    sink: &'a mut S,
    bounds: Option<ZBounds<T>>,
    clockwise: bool,
    max_split_depth: usize,
    emitted: usize,
}

impl<'a, T: Coord, S: TriangleSink<T> + ?Sized> EarSlicer<'a, T, S> {
    pub(crate) fn new(
        nodes: &'a mut Vec<Node<T>>,
        sink: &'a mut S,
        bounds: Option<ZBounds<T>>,
        clockwise: bool,
        max_split_depth: usize,
    ) -> Self {
        Self {
            nodes,
            sink,
            bounds,
            clockwise,
            max_split_depth,
            emitted: 0,
        }
    }

    /// Slices the ring through `start_i`, returning the number of emitted triangles.
    pub(crate) fn run(mut self, start_i: NodeIndex) -> usize {
        self.earcut_linked(start_i, Pass::Init, 0);
        self.emitted
    }

    /// main ear slicing loop which triangulates a polygon (given as a linked list)
    fn earcut_linked(&mut self, mut ear_i: NodeIndex, pass: Pass, depth: usize) {
        if pass == Pass::Init {
            if let Some(bounds) = self.bounds {
                index_curve(self.nodes, ear_i, &bounds);
                log::trace!("z-order index built (split depth {})", depth);
            }
        }

        let mut stop_i = ear_i;

        // iterate through ears, slicing them one by one
        loop {
            let ear = *node!(self.nodes, ear_i);
            if ear.prev_i == ear.next_i {
                return;
            }

            if self.is_ear(ear_i) {
                // cut off the triangle
                self.emit(ear.prev_i, ear_i, ear.next_i);
                let next_next_i = node!(self.nodes, ear.next_i).next_i;
                remove_node(self.nodes, ear_i);

                // skipping the next vertex leads to less sliver triangles
                (ear_i, stop_i) = (next_next_i, next_next_i);
                continue;
            }

            ear_i = ear.next_i;

            // if we looped through the whole remaining polygon and can't find any more ears
            if ear_i == stop_i {
                match pass {
                    Pass::Init => {
                        log::debug!("no ear left, filtering and retrying");
                        if let Some(ear_i) = filter_points(self.nodes, ear_i, None) {
                            self.earcut_linked(ear_i, Pass::Cure, depth);
                        }
                    }
                    Pass::Cure => {
                        log::debug!("no ear left, curing local self-intersections");
                        let cured = filter_points(self.nodes, ear_i, None)
                            .and_then(|ear_i| self.cure_local_intersections(ear_i));
                        if let Some(ear_i) = cured {
                            self.earcut_linked(ear_i, Pass::Split, depth);
                        }
                    }
                    Pass::Split => self.split_earcut(ear_i, depth),
                }
                return;
            }
        }
    }

    fn emit(&mut self, a_i: NodeIndex, b_i: NodeIndex, c_i: NodeIndex) {
        let a = node!(self.nodes, a_i).xy();
        let b = node!(self.nodes, b_i).xy();
        let c = node!(self.nodes, c_i).xy();
        // the ring is always wound clockwise; mirror for the other winding
        let triangle = if self.clockwise { [a, b, c] } else { [c, b, a] };
        self.sink.add_triangle(triangle);
        self.emitted += 1;
    }

    fn is_ear(&self, ear_i: NodeIndex) -> bool {
        match &self.bounds {
            Some(bounds) => is_ear_hashed(self.nodes, ear_i, bounds),
            None => is_ear(self.nodes, ear_i),
        }
    }

    /// go through all polygon nodes and cure small local self-intersections
    fn cure_local_intersections(&mut self, start_i: NodeIndex) -> Option<NodeIndex> {
        let mut start_i = start_i;
        let mut p_i = start_i;
        loop {
            let p = *node!(self.nodes, p_i);
            let p_next = *node!(self.nodes, p.next_i);
            let a = *node!(self.nodes, p.prev_i);
            let b_i = p_next.next_i;
            let b = *node!(self.nodes, b_i);

            if segments_intersect(a.xy(), p.xy(), p_next.xy(), b.xy())
                && locally_inside(self.nodes, &a, &b)
                && locally_inside(self.nodes, &b, &a)
            {
                self.emit(p.prev_i, p_i, b_i);

                // remove two nodes involved
                remove_node(self.nodes, p_i);
                remove_node(self.nodes, p.next_i);

                (p_i, start_i) = (b_i, b_i);
            }

            p_i = node!(self.nodes, p_i).next_i;
            if p_i == start_i {
                return filter_points(self.nodes, p_i, None);
            }
        }
    }

    /// try splitting polygon into two and triangulate them independently
    fn split_earcut(&mut self, start_i: NodeIndex, depth: usize) {
        if depth >= self.max_split_depth {
            log::warn!(
                "split depth limit {} reached, leaving the rest untriangulated",
                self.max_split_depth
            );
            return;
        }

        // look for a valid diagonal that divides the polygon into two
        let mut a_i = start_i;
        loop {
            let a = *node!(self.nodes, a_i);
            let mut b_i = node!(self.nodes, a.next_i).next_i;

            while b_i != a.prev_i {
                let b = *node!(self.nodes, b_i);
                if a.i != b.i && is_valid_diagonal(self.nodes, a_i, b_i) {
                    // split the polygon in two by the diagonal
                    let c_i = split_polygon(self.nodes, a_i, b_i);
                    log::trace!("split at diagonal {} -> {} (depth {})", a.i, b.i, depth);

                    // filter colinear points around the cuts
                    let end_i = Some(node!(self.nodes, a_i).next_i);
                    let first = filter_points(self.nodes, a_i, end_i);
                    let end_i = Some(node!(self.nodes, c_i).next_i);
                    let second = filter_points(self.nodes, c_i, end_i);

                    // run earcut on each half
                    for half_i in [first, second].into_iter().flatten() {
                        self.earcut_linked(half_i, Pass::Init, depth + 1);
                    }
                    return;
                }
                b_i = b.next_i;
            }

            a_i = a.next_i;
            if a_i == start_i {
                log::debug!("no valid diagonal found, giving up on the remaining ring");
                return;
            }
        }
    }
}

fn bbox<T: Coord>(a: [T; 2], b: [T; 2], c: [T; 2]) -> ([T; 2], [T; 2]) {
    let min = |u: T, v: T| if v < u { v } else { u };
    let max = |u: T, v: T| if v > u { v } else { u };
    (
        [min(a[0], min(b[0], c[0])), min(a[1], min(b[1], c[1]))],
        [max(a[0], max(b[0], c[0])), max(a[1], max(b[1], c[1]))],
    )
}

/// check whether a polygon node forms a valid ear with adjacent nodes
fn is_ear<T: Coord>(nodes: &[Node<T>], ear_i: NodeIndex) -> bool {
    let b = node!(nodes, ear_i);
    let a = node!(nodes, b.prev_i);
    let c = node!(nodes, b.next_i);

    if orientation(a.xy(), b.xy(), c.xy()) != Orientation::Clockwise {
        // reflex, can't be an ear
        return false;
    }

    // now make sure we don't have other points inside the potential ear
    let mut p_i = c.next_i;
    while p_i != b.prev_i {
        let p = node!(nodes, p_i);
        if point_in_triangle_excluding_corners(a.xy(), b.xy(), c.xy(), p.xy()) {
            return false;
        }
        p_i = p.next_i;
    }
    true
}

fn is_ear_hashed<T: Coord>(nodes: &[Node<T>], ear_i: NodeIndex, bounds: &ZBounds<T>) -> bool {
    let b = node!(nodes, ear_i);
    let (a_i, c_i) = (b.prev_i, b.next_i);
    let (a, c) = (node!(nodes, a_i).xy(), node!(nodes, c_i).xy());

    if orientation(a, b.xy(), c) != Orientation::Clockwise {
        // reflex, can't be an ear
        return false;
    }

    // z-order range for the current triangle bbox
    let ([x0, y0], [x1, y1]) = bbox(a, b.xy(), c);
    let min_z = z_order(x0, y0, bounds);
    let max_z = z_order(x1, y1, bounds);

    let blocks = |p_i: NodeIndex, p: &Node<T>| {
        p_i != a_i && p_i != c_i && point_in_triangle_excluding_corners(a, b.xy(), c, p.xy())
    };

    // look for points inside the triangle in increasing z-order
    let mut next = b.next_z_i;
    while let Some(p_i) = next {
        let p = node!(nodes, p_i);
        if !p.z.is_some_and(|z| z <= max_z) {
            break;
        }
        if blocks(p_i, p) {
            return false;
        }
        next = p.next_z_i;
    }

    // then in decreasing z-order
    let mut prev = b.prev_z_i;
    while let Some(p_i) = prev {
        let p = node!(nodes, p_i);
        if !p.z.is_some_and(|z| z >= min_z) {
            break;
        }
        if blocks(p_i, p) {
            return false;
        }
        prev = p.prev_z_i;
    }

    true
}

/// check if a diagonal between two polygon nodes is valid (lies in polygon interior)
fn is_valid_diagonal<T: Coord>(nodes: &[Node<T>], a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let a = node!(nodes, a_i);
    let b = node!(nodes, b_i);
    node!(nodes, a.next_i).i != b.i
        && node!(nodes, a.prev_i).i != b.i
        && !intersects_polygon(nodes, a_i, b_i)
        && locally_inside(nodes, a, b)
        && locally_inside(nodes, b, a)
        && middle_inside(nodes, a_i, b_i)
}

/// check if a polygon diagonal intersects any polygon segments
fn intersects_polygon<T: Coord>(nodes: &[Node<T>], a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let a = node!(nodes, a_i);
    let b = node!(nodes, b_i);
    let mut p_i = a_i;
    loop {
        let p = node!(nodes, p_i);
        let p_next = node!(nodes, p.next_i);
        if (p.i != a.i && p.i != b.i && p_next.i != a.i && p_next.i != b.i)
            && segments_intersect(p.xy(), p_next.xy(), a.xy(), b.xy())
        {
            return true;
        }
        p_i = p.next_i;
        if p_i == a_i {
            return false;
        }
    }
}

/// check if the middle point of a polygon diagonal is inside the polygon
fn middle_inside<T: Coord>(nodes: &[Node<T>], a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let [ax, ay] = node!(nodes, a_i).xy();
    let [bx, by] = node!(nodes, b_i).xy();
    point_in_ring(nodes, a_i, [ax + bx, ay + by], T::one() + T::one())
}
