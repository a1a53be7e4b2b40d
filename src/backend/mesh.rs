//! Constrained Delaunay meshing and output-array assembly.
//!
//! The pipeline is: validate and insert the input points, install the
//! constraint segments, optionally refine, carve away faces outside the
//! boundary and inside holes, then flatten what is left into the raw
//! arrays of the engine boundary. All carving is a flood fill over
//! triangle adjacency that never crosses a constraint edge.

use rustc_hash::{FxHashMap, FxHashSet};
use spade::handles::{FaceHandle, FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    AngleLimit, CdtEdge, ConstrainedDelaunayTriangulation, Point2, PositionInTriangulation,
    RefinementParameters, Triangulation,
};

use super::{AreaBound, EngineError, Switches};
use crate::core::io::{leak_list, view_flat, view_pairs, view_triples, TriangulateIo};
use crate::geometry::point_on_segment;
use crate::{Index, Scalar};

pub(crate) type Cdt = ConstrainedDelaunayTriangulation<Point2<Scalar>>;
pub(crate) type FaceRef<'a> = FaceHandle<'a, InnerTag, Point2<Scalar>, (), CdtEdge<()>, ()>;

/// Relative tolerance for matching a refined sub-edge back to the input
/// segment it was split from.
#[cfg(not(feature = "single-precision"))]
const LINEAGE_EPS: Scalar = 1e-9;
#[cfg(feature = "single-precision")]
const LINEAGE_EPS: Scalar = 1e-4;

/// Borrowed views over the non-null input channels.
pub(crate) struct InputChannels<'a> {
    pub points: &'a [[Scalar; 2]],
    pub point_markers: &'a [Index],
    pub segments: &'a [[Index; 2]],
    pub segment_markers: &'a [Index],
    pub triangles: &'a [[Index; 3]],
    pub areas: &'a [Scalar],
    pub holes: &'a [[Scalar; 2]],
}

impl<'a> InputChannels<'a> {
    /// # Safety
    ///
    /// Every non-null pointer in `io` must reference initialized memory
    /// of the length implied by the matching count field, live for `'a`.
    pub unsafe fn from_io(io: &TriangulateIo) -> Self {
        unsafe {
            Self {
                points: view_pairs(io.point_list, io.number_of_points),
                point_markers: view_flat(io.point_marker_list, io.number_of_points),
                segments: view_pairs(io.segment_list, io.number_of_segments),
                segment_markers: view_flat(io.segment_marker_list, io.number_of_segments),
                triangles: view_triples(io.triangle_list, io.number_of_triangles),
                areas: view_flat(io.triangle_area_list, io.number_of_triangles),
                holes: view_pairs(io.hole_list, io.number_of_holes),
            }
        }
    }
}

/// A constraint to install: decoded endpoint indices plus its marker.
#[derive(Clone, Copy, Debug)]
struct Segment {
    a: usize,
    b: usize,
    marker: Index,
}

/// Everything the engine hands back, as flat arrays ready to leak into a
/// `TriangulateIo`.
#[derive(Debug, Default)]
pub(crate) struct BuiltMesh {
    pub points: Vec<Scalar>,
    pub point_markers: Vec<Index>,
    pub triangles: Vec<Index>,
    pub neighbors: Vec<Index>,
    pub segments: Vec<Index>,
    pub segment_markers: Vec<Index>,
    pub edges: Vec<Index>,
    pub edge_markers: Vec<Index>,
    pub voronoi_points: Vec<Scalar>,
    pub voronoi_edges: Vec<Index>,
    pub voronoi_norms: Vec<Scalar>,
}

fn canon(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn decode(raw: Index, base: Index, num_points: usize) -> Option<usize> {
    let value = raw - base;
    if value < 0 || value as usize >= num_points {
        None
    } else {
        Some(value as usize)
    }
}

/// Collects the constraints to install: the input segments under `p`, or
/// the boundary edges of the input triangulation under `r`.
fn gather_segments(
    channels: &InputChannels<'_>,
    switches: &Switches,
) -> Result<Vec<Segment>, EngineError> {
    let num_points = channels.points.len();

    if switches.pslg {
        let mut gathered = Vec::with_capacity(channels.segments.len());
        for (si, raw) in channels.segments.iter().enumerate() {
            let a = decode(raw[0], switches.index_base, num_points).ok_or(
                EngineError::SegmentIndexOutOfRange {
                    segment: si,
                    index: raw[0] - switches.index_base,
                    num_points,
                },
            )?;
            let b = decode(raw[1], switches.index_base, num_points).ok_or(
                EngineError::SegmentIndexOutOfRange {
                    segment: si,
                    index: raw[1] - switches.index_base,
                    num_points,
                },
            )?;
            let marker = channels.segment_markers.get(si).copied().unwrap_or(0);
            gathered.push(Segment { a, b, marker });
        }
        return Ok(gathered);
    }

    if switches.refine {
        // The boundary of a triangulation is the set of edges that
        // belong to exactly one triangle.
        let mut counts: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut order: Vec<(usize, usize)> = Vec::new();
        for (ti, tri) in channels.triangles.iter().enumerate() {
            let mut corners = [0usize; 3];
            for (k, raw) in tri.iter().enumerate() {
                corners[k] = decode(*raw, switches.index_base, num_points).ok_or(
                    EngineError::TriangleIndexOutOfRange {
                        triangle: ti,
                        index: *raw - switches.index_base,
                        num_points,
                    },
                )?;
            }
            for k in 0..3 {
                let key = canon(corners[k], corners[(k + 1) % 3]);
                let seen = counts.entry(key).or_insert(0);
                if *seen == 0 {
                    order.push(key);
                }
                *seen += 1;
            }
        }
        return Ok(order
            .into_iter()
            .filter(|key| counts[key] == 1)
            .map(|(a, b)| Segment { a, b, marker: 0 })
            .collect());
    }

    Ok(Vec::new())
}

/// Flood fill outward from `seed`, never crossing a constraint edge,
/// collecting every reached face into `removed`.
fn flood(cdt: &Cdt, seed: FixedFaceHandle<InnerTag>, removed: &mut FxHashSet<FixedFaceHandle<InnerTag>>) {
    let mut stack = vec![seed];
    while let Some(next) = stack.pop() {
        if !removed.insert(next) {
            continue;
        }
        for edge in cdt.face(next).adjacent_edges() {
            if edge.as_undirected().is_constraint_edge() {
                continue;
            }
            if let Some(neighbor) = edge.rev().face().as_inner() {
                if !removed.contains(&neighbor.fix()) {
                    stack.push(neighbor.fix());
                }
            }
        }
    }
}

/// Faces to seed a hole flood from. A seed on a vertex or outside the
/// triangulation is silently ignored; a seed exactly on a constraint
/// edge is ambiguous and likewise ignored.
fn locate_seeds(cdt: &Cdt, hole: [Scalar; 2]) -> Vec<FixedFaceHandle<InnerTag>> {
    match cdt.locate(Point2::new(hole[0], hole[1])) {
        PositionInTriangulation::OnFace(face) => vec![face],
        PositionInTriangulation::OnEdge(fixed) => {
            let edge = cdt.directed_edge(fixed);
            if edge.as_undirected().is_constraint_edge() {
                return Vec::new();
            }
            [edge.face(), edge.rev().face()]
                .iter()
                .filter_map(|face| face.as_inner())
                .map(|face| face.fix())
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Marker for an output edge: the exact constraint it was installed as,
/// the input segment it geometrically lies on, or zero.
fn edge_marker(
    pa: [Scalar; 2],
    pb: [Scalar; 2],
    key: (usize, usize),
    is_constraint: bool,
    exact: &FxHashMap<(usize, usize), Index>,
    segments: &[Segment],
    points: &[[Scalar; 2]],
    tol: Scalar,
) -> Index {
    if !is_constraint {
        return 0;
    }
    if let Some(&marker) = exact.get(&key) {
        return marker;
    }
    for seg in segments {
        let sa = points[seg.a];
        let sb = points[seg.b];
        if point_on_segment(pa, sa, sb, tol) && point_on_segment(pb, sa, sb, tol) {
            return seg.marker;
        }
    }
    0
}

pub(crate) fn build(
    channels: &InputChannels<'_>,
    switches: &Switches,
) -> Result<BuiltMesh, EngineError> {
    let num_input = channels.points.len();
    if num_input < 3 {
        return Err(EngineError::TooFewPoints { found: num_input });
    }
    for (i, p) in channels.points.iter().enumerate() {
        if !p[0].is_finite() || !p[1].is_finite() {
            return Err(EngineError::NonFiniteCoordinate { point: i });
        }
    }

    let mut cdt = Cdt::new();
    let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(num_input);
    for p in channels.points {
        let handle = cdt
            .insert(Point2::new(p[0], p[1]))
            .map_err(EngineError::VertexInsertion)?;
        handles.push(handle);
    }
    if cdt.num_inner_faces() == 0 {
        return Err(EngineError::DegeneratePointSet);
    }

    // Constraints. Duplicates are rejected outright rather than merged,
    // and a crossing pair is reported before anything is inserted for it.
    let segments = gather_segments(channels, switches)?;
    let mut installed: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut exact_markers: FxHashMap<(usize, usize), Index> = FxHashMap::default();
    for (si, seg) in segments.iter().enumerate() {
        let (ha, hb) = (handles[seg.a], handles[seg.b]);
        if seg.a == seg.b || ha == hb {
            return Err(EngineError::DegenerateSegment { segment: si });
        }
        let key = canon(ha.index(), hb.index());
        if !installed.insert(key) {
            return Err(EngineError::DuplicateSegment { segment: si });
        }
        if !cdt.can_add_constraint(ha, hb) {
            return Err(EngineError::IntersectingSegment { segment: si });
        }
        cdt.add_constraint(ha, hb);
        exact_markers.insert(key, seg.marker);
    }

    if switches.min_angle.is_some() || switches.area.is_some() {
        // Without `q` the angle limit is zeroed so only the area bound
        // drives refinement.
        let mut params = RefinementParameters::<Scalar>::new().with_angle_limit(
            AngleLimit::from_deg(f64::from(switches.min_angle.unwrap_or(0.0))),
        );
        match switches.area {
            Some(AreaBound::Uniform(limit)) if limit > 0.0 => {
                params = params.with_max_allowed_area(limit);
            }
            Some(AreaBound::PerTriangle) => {
                // Per-triangle bounds are approximated by the tightest
                // positive bound, applied uniformly.
                let tightest = channels
                    .areas
                    .iter()
                    .copied()
                    .filter(|a| *a > 0.0)
                    .fold(Scalar::INFINITY, Scalar::min);
                if tightest.is_finite() {
                    params = params.with_max_allowed_area(tightest);
                }
            }
            _ => {}
        }
        // No S switch means an unlimited Steiner budget, not the
        // refiner's built-in cap.
        params = params.with_max_additional_vertices(switches.max_steiner.unwrap_or(usize::MAX));
        if !switches.split_boundary {
            params = params.keep_constraint_edges();
        }
        if (switches.pslg || switches.refine) && !switches.convex_hull {
            params = params.exclude_outer_faces(true);
        }
        let _ = cdt.refine(params);
    }

    // Carve: peel inward from any unconstrained hull edge, then flood
    // from each hole seed.
    let mut removed: FxHashSet<FixedFaceHandle<InnerTag>> = FxHashSet::default();
    if (switches.pslg || switches.refine) && !switches.convex_hull {
        for hull_edge in cdt.convex_hull() {
            if hull_edge.as_undirected().is_constraint_edge() {
                continue;
            }
            let inner = hull_edge
                .face()
                .as_inner()
                .or_else(|| hull_edge.rev().face().as_inner());
            if let Some(face) = inner {
                flood(&cdt, face.fix(), &mut removed);
            }
        }
    }
    if switches.pslg || switches.refine {
        for hole in channels.holes {
            for seed in locate_seeds(&cdt, *hole) {
                flood(&cdt, seed, &mut removed);
            }
        }
    }

    let kept_faces: Vec<FaceRef<'_>> = cdt
        .inner_faces()
        .filter(|face| !removed.contains(&face.fix()))
        .collect();

    // Keep every input vertex, every vertex of a surviving triangle, and
    // every constraint endpoint; drop Steiner points that only ever
    // supported carved-away faces.
    let total = cdt.num_vertices();
    let mut keep = vec![false; total];
    for handle in &handles {
        keep[handle.index()] = true;
    }
    for face in &kept_faces {
        for vertex in face.vertices() {
            keep[vertex.fix().index()] = true;
        }
    }
    for edge in cdt.undirected_edges() {
        if edge.is_constraint_edge() {
            let [va, vb] = edge.vertices();
            keep[va.fix().index()] = true;
            keep[vb.fix().index()] = true;
        }
    }

    let mut remap: Vec<Index> = vec![-1; total];
    let mut next: Index = 0;
    for (i, kept) in keep.iter().enumerate() {
        if *kept {
            remap[i] = next;
            next += 1;
        }
    }

    let mut positions = vec![[0.0 as Scalar; 2]; total];
    for vertex in cdt.vertices() {
        let p = vertex.position();
        positions[vertex.fix().index()] = [p.x, p.y];
    }
    // Steiner points keep marker zero; where duplicate inputs collapsed
    // onto one vertex the first nonzero marker wins.
    let mut markers = vec![0 as Index; total];
    for (i, handle) in handles.iter().enumerate() {
        let marker = channels.point_markers.get(i).copied().unwrap_or(0);
        let slot = &mut markers[handle.index()];
        if *slot == 0 {
            *slot = marker;
        }
    }

    let mut built = BuiltMesh::default();

    built.points = Vec::with_capacity(2 * next as usize);
    built.point_markers = Vec::with_capacity(next as usize);
    for i in 0..total {
        if keep[i] {
            built.points.extend_from_slice(&positions[i]);
            built.point_markers.push(markers[i]);
        }
    }

    let base = switches.index_base;
    let mut face_slot: FxHashMap<FixedFaceHandle<InnerTag>, usize> = FxHashMap::default();
    built.triangles = Vec::with_capacity(3 * kept_faces.len());
    for (fi, face) in kept_faces.iter().enumerate() {
        face_slot.insert(face.fix(), fi);
        for vertex in face.vertices() {
            built.triangles.push(remap[vertex.fix().index()] + base);
        }
    }

    if switches.neighbors {
        built.neighbors = vec![-1; 3 * kept_faces.len()];
        for (fi, face) in kept_faces.iter().enumerate() {
            let corners = face.vertices().map(|v| v.fix());
            for edge in face.adjacent_edges() {
                let (ef, et) = (edge.from().fix(), edge.to().fix());
                let Some(k) = corners.iter().position(|v| *v != ef && *v != et) else {
                    continue;
                };
                if let Some(&slot) = edge
                    .rev()
                    .face()
                    .as_inner()
                    .and_then(|nb| face_slot.get(&nb.fix()))
                {
                    built.neighbors[3 * fi + k] = slot as Index + base;
                }
            }
        }
    }

    let scale = channels
        .points
        .iter()
        .flat_map(|p| p.iter())
        .fold(1.0 as Scalar, |acc, c| acc.max(c.abs()));
    let tol = LINEAGE_EPS * scale;

    if switches.edges {
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        for face in &kept_faces {
            for edge in face.adjacent_edges() {
                let (a, b) = (edge.from().fix().index(), edge.to().fix().index());
                let key = canon(a, b);
                if !seen.insert(key) {
                    continue;
                }
                built.edges.push(remap[a] + base);
                built.edges.push(remap[b] + base);
                built.edge_markers.push(edge_marker(
                    positions[a],
                    positions[b],
                    key,
                    edge.as_undirected().is_constraint_edge(),
                    &exact_markers,
                    &segments,
                    channels.points,
                    tol,
                ));
            }
        }
    }

    if switches.pslg || switches.refine {
        // Constraint edges survive even where both adjacent faces were
        // carved away, so walk the full edge set rather than the kept
        // faces.
        for edge in cdt.undirected_edges() {
            if !edge.is_constraint_edge() {
                continue;
            }
            let [va, vb] = edge.vertices();
            let (a, b) = (va.fix().index(), vb.fix().index());
            let key = canon(a, b);
            built.segments.push(remap[a] + base);
            built.segments.push(remap[b] + base);
            built.segment_markers.push(edge_marker(
                positions[a],
                positions[b],
                key,
                true,
                &exact_markers,
                &segments,
                channels.points,
                tol,
            ));
        }
    } else if switches.convex_hull {
        for edge in cdt.convex_hull() {
            let (a, b) = (edge.from().fix().index(), edge.to().fix().index());
            built.segments.push(remap[a] + base);
            built.segments.push(remap[b] + base);
            built.segment_markers.push(0);
        }
    }

    if switches.voronoi {
        let (points, edges, norms) = super::voronoi::build(&kept_faces, &face_slot, base);
        built.voronoi_points = points;
        built.voronoi_edges = edges;
        built.voronoi_norms = norms;
    }

    Ok(built)
}

fn clamp_count(len: usize) -> Index {
    debug_assert!(len <= Index::MAX as usize);
    len as Index
}

/// Moves the built arrays into the output bundles. Hole and region
/// channels mirror the input pointers; everything else is leaked and
/// later reclaimed from the recorded counts.
pub(crate) fn install(
    built: BuiltMesh,
    switches: &Switches,
    input: &TriangulateIo,
    output: &mut TriangulateIo,
    voronoi: &mut TriangulateIo,
) {
    output.number_of_points = clamp_count(built.points.len() / 2);
    output.number_of_point_attributes = 0;
    output.point_list = leak_list(built.points);
    output.point_marker_list = leak_list(built.point_markers);

    output.number_of_triangles = clamp_count(built.triangles.len() / 3);
    output.number_of_corners = 3;
    output.number_of_triangle_attributes = 0;
    output.triangle_list = leak_list(built.triangles);
    if switches.neighbors {
        output.neighbor_list = leak_list(built.neighbors);
    }

    output.number_of_segments = clamp_count(built.segments.len() / 2);
    output.segment_list = leak_list(built.segments);
    output.segment_marker_list = leak_list(built.segment_markers);

    if switches.edges {
        output.number_of_edges = clamp_count(built.edges.len() / 2);
        output.edge_list = leak_list(built.edges);
        output.edge_marker_list = leak_list(built.edge_markers);
    }

    output.hole_list = input.hole_list;
    output.number_of_holes = input.number_of_holes;
    output.region_list = input.region_list;
    output.number_of_regions = input.number_of_regions;

    if switches.voronoi {
        voronoi.number_of_points = clamp_count(built.voronoi_points.len() / 2);
        voronoi.number_of_point_attributes = 0;
        voronoi.point_list = leak_list(built.voronoi_points);
        voronoi.number_of_edges = clamp_count(built.voronoi_edges.len() / 2);
        voronoi.edge_list = leak_list(built.voronoi_edges);
        voronoi.norm_list = leak_list(built.voronoi_norms);
    }
}

// ============================================================================
// Tests
// ============================================================================
