//! Voronoi diagram assembly under the `v` switch.
//!
//! The diagram is the dual of the Delaunay triangulation: one Voronoi
//! vertex per triangle (its circumcenter) and one Voronoi edge per
//! triangulation edge. Edges dual to a hull edge are infinite rays,
//! encoded as `(origin, -1)` with the outward direction stored in the
//! normal array; finite edges carry a zero direction.

use rustc_hash::{FxHashMap, FxHashSet};
use spade::handles::{FixedFaceHandle, InnerTag};

use super::mesh::FaceRef;
use crate::{Index, Scalar};

pub(crate) fn build(
    kept: &[FaceRef<'_>],
    slots: &FxHashMap<FixedFaceHandle<InnerTag>, usize>,
    base: Index,
) -> (Vec<Scalar>, Vec<Index>, Vec<Scalar>) {
    let mut points = Vec::with_capacity(2 * kept.len());
    for face in kept {
        let center = face.circumcenter();
        points.push(center.x);
        points.push(center.y);
    }

    let mut edges = Vec::new();
    let mut norms = Vec::new();
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    for (fi, face) in kept.iter().enumerate() {
        for edge in face.adjacent_edges() {
            let (a, b) = (edge.from().fix().index(), edge.to().fix().index());
            let key = if a <= b { (a, b) } else { (b, a) };
            if !seen.insert(key) {
                continue;
            }
            match edge
                .rev()
                .face()
                .as_inner()
                .and_then(|neighbor| slots.get(&neighbor.fix()))
            {
                Some(&fj) => {
                    edges.push(fi as Index + base);
                    edges.push(fj as Index + base);
                    norms.push(0.0);
                    norms.push(0.0);
                }
                None => {
                    // The dual ray points away from the triangulation.
                    // `face` lies left of the directed edge, so rotating
                    // the edge direction clockwise points outward.
                    let from = edge.from().position();
                    let to = edge.to().position();
                    let (dx, dy) = (to.x - from.x, to.y - from.y);
                    edges.push(fi as Index + base);
                    edges.push(-1);
                    norms.push(dy);
                    norms.push(-dx);
                }
            }
        }
    }
    (points, edges, norms)
}
