//! Z-order (Morton) curve index over a vertex ring.
//!
//! The ear test only needs to look at vertices inside the candidate triangle's bounding box.
//! Sorting the ring nodes into a second linked list by their z-order code turns that box
//! into a contiguous range of the list.

use crate::node::{Node, NodeIndex};
use crate::Coord;

/// Coordinates are mapped into `0..=Z_RANGE` before their bits get interleaved.
const Z_RANGE: f64 = 1000.0;

/// Bounding box the z-order codes are computed against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZBounds<T> {
    min_x: T,
    min_y: T,
    span: f64,
}

impl<T: Coord> ZBounds<T> {
    /// bbox of the ring through `start_i`; `None` when the ring has no extent
    pub(crate) fn from_ring(nodes: &[Node<T>], start_i: NodeIndex) -> Option<Self> {
        let first = node!(nodes, start_i);
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        let mut p_i = first.next_i;
        while p_i != start_i {
            let p = node!(nodes, p_i);
            if p.x < min_x {
                min_x = p.x;
            }
            if p.y < min_y {
                min_y = p.y;
            }
            if p.x > max_x {
                max_x = p.x;
            }
            if p.y > max_y {
                max_y = p.y;
            }
            p_i = p.next_i;
        }

        let (w, h) = (max_x - min_x, max_y - min_y);
        let span = (if w > h { w } else { h }).to_f64()?;
        (span > 0.0).then_some(Self { min_x, min_y, span })
    }
}

/// z-order of a point relative to the bounds
pub(crate) fn z_order<T: Coord>(x: T, y: T, bounds: &ZBounds<T>) -> u32 {
    interleave(
        scale(x - bounds.min_x, bounds.span),
        scale(y - bounds.min_y, bounds.span),
    )
}

fn scale<T: Coord>(offset: T, span: f64) -> u32 {
    let v = offset.to_f64().unwrap_or(0.0) * Z_RANGE / span;
    v.max(0.0).min(Z_RANGE) as u32
}

/// x bits land on even positions, y bits on odd ones
fn interleave(x: u32, y: u32) -> u32 {
    spread(x) | (spread(y) << 1)
}

fn spread(mut v: u32) -> u32 {
    v = (v | (v << 8)) & 0x00FF00FF;
    v = (v | (v << 4)) & 0x0F0F0F0F;
    v = (v | (v << 2)) & 0x33333333;
    v = (v | (v << 1)) & 0x55555555;
    v
}

/// interlink polygon nodes in z-order
pub(crate) fn index_curve<T: Coord>(nodes: &mut [Node<T>], start_i: NodeIndex, bounds: &ZBounds<T>) {
    let mut p_i = start_i;
    loop {
        let p = node_mut!(nodes, p_i);
        if p.z.is_none() {
            p.z = Some(z_order(p.x, p.y, bounds));
        }
        p.prev_z_i = Some(p.prev_i);
        p.next_z_i = Some(p.next_i);
        p_i = p.next_i;
        if p_i == start_i {
            break;
        }
    }

    let start = node_mut!(nodes, start_i);
    let tail_i = start.prev_i;
    start.prev_z_i = None;
    node_mut!(nodes, tail_i).next_z_i = None;

    sort_linked(nodes, start_i);
}

/// Simon Tatham's linked list merge sort algorithm
/// http://www.chiark.greenend.org.uk/~sgtatham/algorithms/listsort.html
///
/// Returns the new head of the z-order list.
fn sort_linked<T: Coord>(nodes: &mut [Node<T>], list_i: NodeIndex) -> Option<NodeIndex> {
    let mut list = Some(list_i);
    let mut in_size: usize = 1;

    loop {
        let mut p = list;
        list = None;
        let mut tail: Option<NodeIndex> = None;
        let mut num_merges = 0;

        while let Some(p_start) = p {
            num_merges += 1;

            // step `in_size` places along from p
            let mut q = Some(p_start);
            let mut p_size = 0;
            while let Some(q_i) = q {
                if p_size == in_size {
                    break;
                }
                p_size += 1;
                q = node!(nodes, q_i).next_z_i;
            }
            let mut q_size = in_size;

            while p_size > 0 || (q_size > 0 && q.is_some()) {
                let take_p = p_size > 0
                    && (q_size == 0
                        || match (p, q) {
                            (Some(p_i), Some(q_i)) => node!(nodes, p_i).z <= node!(nodes, q_i).z,
                            _ => true,
                        });

                let e_i = if take_p {
                    let Some(e_i) = p else { break };
                    p = node!(nodes, e_i).next_z_i;
                    p_size -= 1;
                    e_i
                } else {
                    let Some(e_i) = q else { break };
                    q = node!(nodes, e_i).next_z_i;
                    q_size -= 1;
                    e_i
                };

                match tail {
                    Some(tail_i) => node_mut!(nodes, tail_i).next_z_i = Some(e_i),
                    None => list = Some(e_i),
                }
                node_mut!(nodes, e_i).prev_z_i = tail;
                tail = Some(e_i);
            }

            p = q;
        }

        if let Some(tail_i) = tail {
            node_mut!(nodes, tail_i).next_z_i = None;
        }
        if num_merges <= 1 {
            return list;
        }
        in_size *= 2;
    }
}
