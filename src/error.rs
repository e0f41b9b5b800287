/// Errors returned by [`Earcut::earcut`](crate::Earcut::earcut).
///
/// Only malformed outer boundaries are reported. Holes that cannot be bridged and
/// self-intersections that survive every fallback pass are handled on a best-effort
/// basis and never turn into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EarcutError {
    /// No rings were given at all.
    #[error("no outer ring given")]
    MissingOuterRing,

    /// The outer ring has fewer than 3 distinct, non-colinear vertices.
    #[error("outer ring has fewer than 3 usable vertices")]
    DegenerateOuterRing,

    /// Vertex indices are stored as `u32`.
    #[error("too many vertices: {actual} > {max}")]
    TooManyVertices { actual: usize, max: usize },
}
