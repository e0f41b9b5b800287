//! Ear clipping triangulation of polygons with holes, accelerated by a z-order curve index.
//!
//! ```
//! use earcut_rings::earcut;
//!
//! let quad = [[10, 0], [0, 50], [60, 60], [70, 10]];
//! let triangles = earcut(&[quad], true).unwrap();
//! assert_eq!(triangles.len(), 2);
//! ```

#![no_std]

extern crate alloc;

macro_rules! node {
    ($nodes:expr, $index:expr) => {
        &$nodes[$index.get() as usize]
    };
}

macro_rules! node_mut {
    ($nodes:expr, $index:expr) => {
        &mut $nodes[$index.get() as usize]
    };
}

mod error;
mod holes;
mod node;
pub mod predicates;
mod slicer;
mod zorder;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use num_traits::{Num, NumCast, Signed};

pub use error::EarcutError;

use holes::{eliminate_hole, get_leftmost};
use node::{filter_points, insert_node, remove_node, Node, NodeIndex};
use slicer::EarSlicer;
use zorder::ZBounds;

/// Coordinate type: any signed integer or float.
///
/// Integer coordinates keep every predicate exact; only the z-order scaling, the order of
/// hole bridge crossings and [`deviation`] go through `f64`.
pub trait Coord: Num + Signed + NumCast + PartialOrd + Copy + Debug {}

impl<T> Coord for T where T: Num + Signed + NumCast + PartialOrd + Copy + Debug {}

/// A triangle as three vertex coordinates.
pub type Triangle<T> = [[T; 2]; 3];

/// Receives the triangles of a triangulation as they are cut.
pub trait TriangleSink<T> {
    /// Called once per triangle, in the order the triangles are cut.
    fn add_triangle(&mut self, triangle: Triangle<T>);
}

impl<T> TriangleSink<T> for Vec<Triangle<T>> {
    fn add_triangle(&mut self, triangle: Triangle<T>) {
        self.push(triangle);
    }
}

impl<T, F: FnMut(Triangle<T>)> TriangleSink<T> for F {
    fn add_triangle(&mut self, triangle: Triangle<T>) {
        self(triangle)
    }
}

/// Tuning knobs of [`Earcut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarcutOptions {
    /// Polygons with more vertices than this (outer ring and holes together) are sliced
    /// with the z-order index.
    pub hash_threshold: usize,
    /// How deep the diagonal splitting of rings without ears may recurse.
    pub max_split_depth: usize,
}

impl Default for EarcutOptions {
    fn default() -> Self {
        Self {
            hash_threshold: 80,
            max_split_depth: 64,
        }
    }
}

/// one node per point, two bridge copies per hole and the dummy node
fn node_capacity(points: usize, rings: usize) -> usize {
    points + 2 * rings.saturating_sub(1) + 1
}

/// Vertex indices are kept in `u32`; leave room for the bridge and split copies.
const MAX_VERTICES: usize = (u32::MAX / 4) as usize;

/// Instance of the earcut algorithm.
pub struct Earcut<T> {
    data: Vec<[T; 2]>,
    ring_ends: Vec<usize>,
    nodes: Vec<Node<T>>,
    queue: Vec<NodeIndex>,
    options: EarcutOptions,
}

impl<T: Coord> Default for Earcut<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Coord> Earcut<T> {
    /// Creates a new instance of the earcut algorithm.
    ///
    /// You can reuse a single instance for multiple triangulations to reduce memory allocations.
    pub fn new() -> Self {
        Self::with_options(EarcutOptions::default())
    }

    /// Creates a new instance with custom [`EarcutOptions`].
    pub fn with_options(options: EarcutOptions) -> Self {
        Self {
            data: Vec::new(),
            ring_ends: Vec::new(),
            nodes: Vec::new(),
            queue: Vec::new(),
            options,
        }
    }

    /// The options this instance triangulates with.
    pub fn options(&self) -> &EarcutOptions {
        &self.options
    }

    fn reset(&mut self, capacity: usize) {
        self.nodes.clear();
        self.nodes.reserve(capacity);
        self.nodes.push(Node::new(0, T::zero(), T::zero())); // dummy node
    }

    /// Triangulates a polygon, feeding every triangle into `sink`.
    ///
    /// `rings[0]` is the outer boundary and any further rings are holes. The winding of
    /// the input does not matter: with `clockwise` set, triangles are emitted clockwise in
    /// screen coordinates (y axis pointing down), otherwise counter-clockwise.
    pub fn earcut<R, S>(
        &mut self,
        rings: &[R],
        clockwise: bool,
        sink: &mut S,
    ) -> Result<(), EarcutError>
    where
        R: AsRef<[[T; 2]]>,
        S: TriangleSink<T> + ?Sized,
    {
        if rings.is_empty() {
            return Err(EarcutError::MissingOuterRing);
        }

        self.data.clear();
        self.ring_ends.clear();
        for ring in rings {
            self.data.extend_from_slice(ring.as_ref());
            self.ring_ends.push(self.data.len());
        }
        if self.data.len() > MAX_VERTICES {
            return Err(EarcutError::TooManyVertices {
                actual: self.data.len(),
                max: MAX_VERTICES,
            });
        }
        self.reset(node_capacity(self.data.len(), rings.len()));

        // create nodes
        let outer_len = self.ring_ends[0];
        let outer_node_i = self
            .linked_list(0, outer_len, true)
            .and_then(|i| filter_points(&mut self.nodes, i, None))
            .ok_or(EarcutError::DegenerateOuterRing)?;

        // if the shape is not too simple, we'll use z-order curve hash later
        let bounds = if self.data.len() > self.options.hash_threshold {
            ZBounds::from_ring(&self.nodes, outer_node_i)
        } else {
            None
        };

        let outer_node_i = if rings.len() > 1 {
            match self.eliminate_holes(outer_node_i) {
                Some(i) => i,
                None => {
                    log::debug!("polygon collapsed while merging holes, nothing to triangulate");
                    return Ok(());
                }
            }
        } else {
            outer_node_i
        };

        let count = EarSlicer::new(
            &mut self.nodes,
            sink,
            bounds,
            clockwise,
            self.options.max_split_depth,
        )
        .run(outer_node_i);

        log::debug!(
            "{} vertices in {} rings cut into {} triangles (indexed: {})",
            self.data.len(),
            rings.len(),
            count,
            bounds.is_some()
        );
        Ok(())
    }

    /// Like [`Earcut::earcut`], collecting the triangles into a new vector.
    pub fn triangulate<R: AsRef<[[T; 2]]>>(
        &mut self,
        rings: &[R],
        clockwise: bool,
    ) -> Result<Vec<Triangle<T>>, EarcutError> {
        let mut triangles = Vec::new();
        self.earcut(rings, clockwise, &mut triangles)?;
        Ok(triangles)
    }

    /// create a circular doubly linked list from polygon points in the specified winding order
    fn linked_list(&mut self, start: usize, end: usize, clockwise: bool) -> Option<NodeIndex> {
        let mut last_i: Option<NodeIndex> = None;
        let iter = self.data[start..end].iter().enumerate();

        if clockwise == (signed_area(&self.data[start..end]) > T::zero()) {
            for (i, &[x, y]) in iter {
                let idx = start + i;
                last_i = Some(insert_node(&mut self.nodes, idx as u32, x, y, last_i));
            }
        } else {
            for (i, &[x, y]) in iter.rev() {
                let idx = start + i;
                last_i = Some(insert_node(&mut self.nodes, idx as u32, x, y, last_i));
            }
        };

        if let Some(li) = last_i {
            let last = node!(self.nodes, li);
            if last.xy() == node!(self.nodes, last.next_i).xy() {
                let (_, next_i) = remove_node(&mut self.nodes, li);
                last_i = Some(next_i);
            }
        }

        last_i
    }

    /// link every hole into the outer loop, producing a single-ring polygon without holes
    fn eliminate_holes(&mut self, mut outer_node_i: NodeIndex) -> Option<NodeIndex> {
        self.queue.clear();
        for r in 1..self.ring_ends.len() {
            let (start, end) = (self.ring_ends[r - 1], self.ring_ends[r]);
            let hole_i = self
                .linked_list(start, end, false)
                .and_then(|i| filter_points(&mut self.nodes, i, None));
            match hole_i {
                Some(i) => self.queue.push(get_leftmost(&self.nodes, i)),
                None => log::debug!("hole {} is degenerate, skipped", r),
            }
        }

        let nodes = &self.nodes;
        self.queue.sort_by(|&a, &b| {
            node!(nodes, a)
                .x
                .partial_cmp(&node!(nodes, b).x)
                .unwrap_or(Ordering::Equal)
        });

        // process holes from left to right
        for &hole_i in &self.queue {
            outer_node_i = eliminate_hole(&mut self.nodes, hole_i, outer_node_i)?;
        }

        Some(outer_node_i)
    }
}

/// Triangulates a polygon with a throwaway [`Earcut`] instance.
pub fn earcut<T: Coord, R: AsRef<[[T; 2]]>>(
    rings: &[R],
    clockwise: bool,
) -> Result<Vec<Triangle<T>>, EarcutError> {
    Earcut::new().triangulate(rings, clockwise)
}

/// Returns a percentage difference between the polygon area and its triangulation area;
/// used to verify correctness of triangulation
pub fn deviation<T: Coord, R: AsRef<[[T; 2]]>>(rings: &[R], triangles: &[Triangle<T>]) -> f64 {
    let to_f64 = |[x, y]: [T; 2]| [x.to_f64().unwrap_or(0.0), y.to_f64().unwrap_or(0.0)];

    let mut polygon_area: f64 = 0.0;
    for (n, ring) in rings.iter().enumerate() {
        let ring = ring.as_ref();
        if ring.len() < 3 {
            continue;
        }
        let mut points = ring.iter().map(|&p| to_f64(p));
        let mut sum: f64 = 0.0;
        let [mut bx, mut by] = to_f64(ring[ring.len() - 1]);
        for [ax, ay] in &mut points {
            sum += (bx - ax) * (ay + by);
            (bx, by) = (ax, ay);
        }
        if n == 0 {
            polygon_area += sum.abs();
        } else {
            polygon_area -= sum.abs();
        }
    }

    let mut triangles_area: f64 = 0.0;
    for &[a, b, c] in triangles {
        let ([ax, ay], [bx, by], [cx, cy]) = (to_f64(a), to_f64(b), to_f64(c));
        triangles_area += ((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs();
    }

    if polygon_area == 0.0 && triangles_area == 0.0 {
        0.0
    } else {
        ((polygon_area - triangles_area) / polygon_area).abs()
    }
}

/// twice the signed area of a ring; positive for clockwise rings in screen coordinates
fn signed_area<T: Coord>(ring: &[[T; 2]]) -> T {
    let Some(&[mut bx, mut by]) = ring.last() else {
        return T::zero();
    };
    let mut sum = T::zero();
    for &[ax, ay] in ring {
        sum = sum + (bx - ax) * (ay + by);
        (bx, by) = (ax, ay);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn signed_area_follows_screen_winding() {
        let clockwise = [[0, 0], [100, 0], [100, 100], [0, 100]];
        assert!(signed_area(&clockwise) > 0);
        let mut counter_clockwise = clockwise;
        counter_clockwise.reverse();
        assert!(signed_area(&counter_clockwise) < 0);
        assert_eq!(signed_area::<i32>(&[]), 0);
    }

    #[test]
    fn linked_list_normalizes_winding() {
        let mut earcut = Earcut::new();
        earcut.data = vec![[0, 0], [0, 100], [100, 100], [100, 0]];
        earcut.reset(8);
        let last = earcut.linked_list(0, 4, true).unwrap();
        let next = node!(earcut.nodes, last).next_i;
        let after = node!(earcut.nodes, next).next_i;
        let turn = predicates::orientation(
            node!(earcut.nodes, last).xy(),
            node!(earcut.nodes, next).xy(),
            node!(earcut.nodes, after).xy(),
        );
        assert_eq!(turn, predicates::Orientation::Clockwise);
    }

    #[test]
    fn linked_list_drops_closing_duplicate() {
        let mut earcut = Earcut::new();
        earcut.data = vec![[0, 0], [100, 0], [100, 100], [0, 0]];
        earcut.reset(8);
        let start = earcut.linked_list(0, 4, true).unwrap();
        let mut count = 1;
        let mut p = node!(earcut.nodes, start).next_i;
        while p != start {
            count += 1;
            p = node!(earcut.nodes, p).next_i;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn options_default() {
        let earcut: Earcut<f64> = Earcut::default();
        assert_eq!(earcut.options().hash_threshold, 80);
        assert_eq!(earcut.options().max_split_depth, 64);
    }

    #[test]
    fn node_arena_is_sized_from_points_and_holes() {
        let outer = vec![[0, 0], [100, 0], [100, 100], [0, 100]];
        let hole = vec![[10, 10], [90, 10], [90, 90], [10, 90]];
        let mut earcut = Earcut::new();
        let triangles = earcut.triangulate(&[outer, hole], true).unwrap();
        assert_eq!(triangles.len(), 8);
        // no split was needed: the points, one bridge and the dummy
        assert_eq!(earcut.nodes.len(), node_capacity(8, 2));
        assert_eq!(node_capacity(4, 1), 5);
    }
}
