//! The zero-copy wrapper around the triangulation engine.
//!
//! [`Engine`] owns three raw I/O bundles: borrowed input channels, the
//! owned triangulation output, and the owned Voronoi output. Input
//! setters record a pointer and a count, nothing more; output buffers
//! are allocated by the engine during [`Engine::run`] and released when
//! they are replaced by the next run or when the engine drops.

use std::marker::PhantomData;

use crate::backend;
use crate::core::config::Config;
use crate::core::error::Error;
use crate::core::holes;
use crate::core::io::{view_flat, view_pairs, view_triples, OwnedIo, TriangulateIo};
use crate::core::switches::{build_switches, Advisory};
use crate::{Index, Scalar};

/// Converts a channel length into an engine count.
///
/// # Panics
///
/// Panics if `len` exceeds [`Index::MAX`]; the engine boundary stores
/// every count in an [`Index`].
fn checked_count(len: usize) -> Index {
    assert!(
        len <= Index::MAX as usize,
        "channel length {len} exceeds the engine index range"
    );
    len as Index
}

/// Triangulation driver over borrowed input channels.
///
/// The lifetime `'a` ties the engine to every slice handed to a
/// `set_in_*` method: the borrow checker keeps those slices alive for as
/// long as the engine can still read them. Outputs are owned by the
/// engine and remain valid until the next [`run`](Self::run).
///
/// # Examples
///
/// ```
/// use flatmesh::{Config, Engine};
///
/// let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
/// let segments = [[0, 1], [1, 2], [2, 3], [3, 0]];
///
/// let mut engine = Engine::new();
/// engine.set_in_points(&points);
/// engine.set_in_segments(&segments);
/// engine.run(&Config::default())?;
///
/// assert_eq!(engine.out_triangles().len(), 2);
/// # Ok::<(), flatmesh::Error>(())
/// ```
#[derive(Debug)]
pub struct Engine<'a> {
    input: TriangulateIo,
    out: OwnedIo,
    vorout: OwnedIo,
    advisories: Vec<Advisory>,
    // Lengths of the borrowed per-item channels, kept so the contract
    // can be rechecked after the counted channel they annotate changes.
    point_marker_len: Index,
    segment_marker_len: Index,
    area_len: Index,
    _borrows: PhantomData<&'a [Scalar]>,
}

impl Default for Engine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Engine<'a> {
    /// Creates an engine with every channel empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: TriangulateIo::new(),
            out: OwnedIo::new(),
            vorout: OwnedIo::new(),
            advisories: Vec::new(),
            point_marker_len: 0,
            segment_marker_len: 0,
            area_len: 0,
            _borrows: PhantomData,
        }
    }

    // ========================================================================
    // Input channels
    // ========================================================================

    /// Borrows the input vertices. No copy is made.
    pub fn set_in_points(&mut self, points: &'a [[Scalar; 2]]) {
        self.input.point_list = points.as_ptr().cast::<Scalar>().cast_mut();
        self.input.number_of_points = checked_count(points.len());
    }

    /// The currently borrowed input vertices.
    #[must_use]
    pub fn in_points(&self) -> &[[Scalar; 2]] {
        unsafe { view_pairs(self.input.point_list, self.input.number_of_points) }
    }

    /// Releases the input vertex channel.
    pub fn unset_in_points(&mut self) {
        self.input.point_list = std::ptr::null_mut();
        self.input.number_of_points = 0;
    }

    /// Borrows one marker per input vertex.
    ///
    /// Markers propagate to the matching output vertices, while
    /// engine-inserted vertices receive marker zero.
    ///
    /// # Panics
    ///
    /// Panics unless the slice is exactly as long as the point channel.
    pub fn set_in_point_markers(&mut self, markers: &'a [Index]) {
        assert_eq!(
            markers.len(),
            self.in_points().len(),
            "one marker per input vertex"
        );
        self.input.point_marker_list = markers.as_ptr().cast_mut();
        self.point_marker_len = checked_count(markers.len());
    }

    /// The currently borrowed input vertex markers.
    #[must_use]
    pub fn in_point_markers(&self) -> &[Index] {
        unsafe { view_flat(self.input.point_marker_list, self.input.number_of_points) }
    }

    /// Releases the input vertex marker channel.
    pub fn unset_in_point_markers(&mut self) {
        self.input.point_marker_list = std::ptr::null_mut();
        self.point_marker_len = 0;
    }

    /// Borrows the boundary segments, as index pairs into the point
    /// channel. A non-empty segment channel selects PSLG mode.
    pub fn set_in_segments(&mut self, segments: &'a [[Index; 2]]) {
        self.input.segment_list = segments.as_ptr().cast::<Index>().cast_mut();
        self.input.number_of_segments = checked_count(segments.len());
    }

    /// The currently borrowed input segments.
    #[must_use]
    pub fn in_segments(&self) -> &[[Index; 2]] {
        unsafe { view_pairs(self.input.segment_list, self.input.number_of_segments) }
    }

    /// Releases the input segment channel.
    pub fn unset_in_segments(&mut self) {
        self.input.segment_list = std::ptr::null_mut();
        self.input.number_of_segments = 0;
    }

    /// Borrows one marker per input segment.
    ///
    /// When this channel is unset, [`run`](Self::run) temporarily
    /// installs markers `1..=n` so each output subsegment can name the
    /// input segment it came from.
    ///
    /// # Panics
    ///
    /// Panics unless the slice is exactly as long as the segment channel.
    pub fn set_in_segment_markers(&mut self, markers: &'a [Index]) {
        assert_eq!(
            markers.len(),
            self.in_segments().len(),
            "one marker per input segment"
        );
        self.input.segment_marker_list = markers.as_ptr().cast_mut();
        self.segment_marker_len = checked_count(markers.len());
    }

    /// The currently borrowed input segment markers.
    #[must_use]
    pub fn in_segment_markers(&self) -> &[Index] {
        unsafe {
            view_flat(
                self.input.segment_marker_list,
                self.input.number_of_segments,
            )
        }
    }

    /// Releases the input segment marker channel.
    pub fn unset_in_segment_markers(&mut self) {
        self.input.segment_marker_list = std::ptr::null_mut();
        self.segment_marker_len = 0;
    }

    /// Borrows an existing triangulation to refine. A non-empty triangle
    /// channel selects refinement mode, which takes precedence over PSLG
    /// mode.
    pub fn set_in_triangles(&mut self, triangles: &'a [[Index; 3]]) {
        self.input.triangle_list = triangles.as_ptr().cast::<Index>().cast_mut();
        self.input.number_of_triangles = checked_count(triangles.len());
        self.input.number_of_corners = 3;
    }

    /// The currently borrowed input triangles.
    #[must_use]
    pub fn in_triangles(&self) -> &[[Index; 3]] {
        unsafe { view_triples(self.input.triangle_list, self.input.number_of_triangles) }
    }

    /// Releases the input triangle channel.
    pub fn unset_in_triangles(&mut self) {
        self.input.triangle_list = std::ptr::null_mut();
        self.input.number_of_triangles = 0;
        self.input.number_of_corners = 0;
    }

    /// Borrows one maximum area per input triangle, used with
    /// [`Config::max_area`] unset to drive per-triangle refinement.
    ///
    /// # Panics
    ///
    /// Panics unless the slice is exactly as long as the triangle channel.
    pub fn set_in_areas(&mut self, areas: &'a [Scalar]) {
        assert_eq!(
            areas.len(),
            self.in_triangles().len(),
            "one area bound per input triangle"
        );
        self.input.triangle_area_list = areas.as_ptr().cast_mut();
        self.area_len = checked_count(areas.len());
    }

    /// The currently borrowed per-triangle area bounds.
    #[must_use]
    pub fn in_areas(&self) -> &[Scalar] {
        unsafe {
            view_flat(
                self.input.triangle_area_list,
                self.input.number_of_triangles,
            )
        }
    }

    /// Releases the per-triangle area channel.
    pub fn unset_in_areas(&mut self) {
        self.input.triangle_area_list = std::ptr::null_mut();
        self.area_len = 0;
    }

    /// Borrows explicit hole seeds. Each seed floods its enclosing
    /// region out of the mesh. Ignored whenever
    /// [`Config::auto_hole_detection`] is set.
    pub fn set_in_holes(&mut self, holes: &'a [[Scalar; 2]]) {
        self.input.hole_list = holes.as_ptr().cast::<Scalar>().cast_mut();
        self.input.number_of_holes = checked_count(holes.len());
    }

    /// The currently borrowed hole seeds.
    #[must_use]
    pub fn in_holes(&self) -> &[[Scalar; 2]] {
        unsafe { view_pairs(self.input.hole_list, self.input.number_of_holes) }
    }

    /// Releases the hole seed channel.
    pub fn unset_in_holes(&mut self) {
        self.input.hole_list = std::ptr::null_mut();
        self.input.number_of_holes = 0;
    }

    // ========================================================================
    // Output channels
    // ========================================================================

    /// Vertices of the last run, input vertices first.
    #[must_use]
    pub fn out_points(&self) -> &[[Scalar; 2]] {
        unsafe { view_pairs(self.out.io.point_list, self.out.io.number_of_points) }
    }

    /// One marker per output vertex; engine-inserted vertices carry zero.
    #[must_use]
    pub fn out_point_markers(&self) -> &[Index] {
        unsafe { view_flat(self.out.io.point_marker_list, self.out.io.number_of_points) }
    }

    /// Triangles of the last run, as counterclockwise corner triples.
    #[must_use]
    pub fn out_triangles(&self) -> &[[Index; 3]] {
        unsafe { view_triples(self.out.io.triangle_list, self.out.io.number_of_triangles) }
    }

    /// Neighbor triples of the last run: entry `k` of triangle `t` is the
    /// triangle across from corner `k`, or `-1` on the boundary.
    #[must_use]
    pub fn out_triangle_neighbors(&self) -> &[[Index; 3]] {
        unsafe { view_triples(self.out.io.neighbor_list, self.out.io.number_of_triangles) }
    }

    /// Boundary subsegments of the last run.
    #[must_use]
    pub fn out_segments(&self) -> &[[Index; 2]] {
        unsafe { view_pairs(self.out.io.segment_list, self.out.io.number_of_segments) }
    }

    /// One marker per output subsegment, inherited from the input
    /// segment it lies on.
    #[must_use]
    pub fn out_segment_markers(&self) -> &[Index] {
        unsafe {
            view_flat(
                self.out.io.segment_marker_list,
                self.out.io.number_of_segments,
            )
        }
    }

    /// Every edge of the last run's mesh.
    #[must_use]
    pub fn out_edges(&self) -> &[[Index; 2]] {
        unsafe { view_pairs(self.out.io.edge_list, self.out.io.number_of_edges) }
    }

    /// One marker per output edge: the marker of the input segment the
    /// edge lies on, or zero for unconstrained edges.
    #[must_use]
    pub fn out_edge_markers(&self) -> &[Index] {
        unsafe { view_flat(self.out.io.edge_marker_list, self.out.io.number_of_edges) }
    }

    /// Voronoi vertices of the last point-cloud run, one circumcenter
    /// per Delaunay triangle. Empty unless the run took Voronoi mode.
    #[must_use]
    pub fn out_voronoi_points(&self) -> &[[Scalar; 2]] {
        unsafe { view_pairs(self.vorout.io.point_list, self.vorout.io.number_of_points) }
    }

    /// Voronoi edges as index pairs into the Voronoi vertices; a second
    /// index of `-1` marks an infinite ray.
    #[must_use]
    pub fn out_voronoi_edges(&self) -> &[[Index; 2]] {
        unsafe { view_pairs(self.vorout.io.edge_list, self.vorout.io.number_of_edges) }
    }

    /// One direction per Voronoi edge: the outward direction for an
    /// infinite ray, zero for a finite edge.
    #[must_use]
    pub fn out_voronoi_ray_directions(&self) -> &[[Scalar; 2]] {
        unsafe { view_pairs(self.vorout.io.norm_list, self.vorout.io.number_of_edges) }
    }

    /// Diagnostics recorded by the last run.
    #[must_use]
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    // ========================================================================
    // Triangulation
    // ========================================================================

    /// Finds the hole seeds implied by the borrowed segments.
    ///
    /// Runs a constrained pass over the current points and segments,
    /// partitions its triangles into regions that do not cross a
    /// boundary edge, and classifies each region by the winding number
    /// of the input loops around a representative interior point. A
    /// region with winding below one half is a hole; one seed per hole
    /// region is returned.
    ///
    /// [`run`](Self::run) calls this itself under
    /// [`Config::auto_hole_detection`]; it is public so callers can
    /// inspect or edit the seeds before meshing.
    ///
    /// # Errors
    ///
    /// Propagates engine failures from the constrained pass, and
    /// [`Error::InvariantViolation`] if that pass hands back an
    /// inconsistent mesh.
    pub fn detect_holes(&self) -> Result<Vec<[Scalar; 2]>, Error> {
        holes::detect(self.in_points(), self.in_segments())
    }

    /// Triangulates the borrowed input under `config`.
    ///
    /// The run proceeds in phases: detect holes when configured, build
    /// the option string, install scratch segment markers when the
    /// caller set none, triangulate, then tear the scratch channels back
    /// down. Previous outputs are released at the start of the
    /// triangulation phase; on error every output channel is left empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when no input channel selects a mode,
    /// [`Error::InvalidConfig`] for an out-of-range configuration, and
    /// [`Error::EngineFailure`] for anything the engine itself rejects.
    ///
    /// # Panics
    ///
    /// Panics if a marker or area slice installed earlier no longer
    /// matches the channel it annotates, which can happen when that
    /// channel is replaced after the slice was set.
    pub fn run(&mut self, config: &Config) -> Result<(), Error> {
        self.check_channel_lengths();
        self.advisories.clear();

        let saved_holes = (self.input.hole_list, self.input.number_of_holes);
        let saved_markers = self.input.segment_marker_list;

        let mut hole_scratch: Vec<[Scalar; 2]> = Vec::new();
        let mut marker_scratch: Vec<Index> = Vec::new();
        let result = self.run_scoped(config, &mut hole_scratch, &mut marker_scratch);

        // The scratch channels must not outlive this call: the borrowed
        // input reverts to exactly what the caller set, and the output
        // mirrors follow suit.
        self.input.hole_list = saved_holes.0;
        self.input.number_of_holes = saved_holes.1;
        self.input.segment_marker_list = saved_markers;
        self.out.io.hole_list = saved_holes.0;
        self.out.io.number_of_holes = saved_holes.1;

        result
    }

    /// Every installed per-item channel must still match the counted
    /// channel it annotates; reading past a short slice is never sound.
    fn check_channel_lengths(&self) {
        if !self.input.point_marker_list.is_null() {
            assert_eq!(
                self.point_marker_len, self.input.number_of_points,
                "point marker channel no longer matches the point channel"
            );
        }
        if !self.input.segment_marker_list.is_null() {
            assert_eq!(
                self.segment_marker_len, self.input.number_of_segments,
                "segment marker channel no longer matches the segment channel"
            );
        }
        if !self.input.triangle_area_list.is_null() {
            assert_eq!(
                self.area_len, self.input.number_of_triangles,
                "area channel no longer matches the triangle channel"
            );
        }
    }

    /// The phases of [`run`](Self::run) that may point the input bundle
    /// at the scratch vectors. The caller restores the bundle afterward.
    fn run_scoped(
        &mut self,
        config: &Config,
        hole_scratch: &mut Vec<[Scalar; 2]>,
        marker_scratch: &mut Vec<Index>,
    ) -> Result<(), Error> {
        if config.auto_hole_detection && self.input.number_of_segments > 0 {
            *hole_scratch = self.detect_holes()?;
            self.input.hole_list = hole_scratch.as_mut_ptr().cast::<Scalar>();
            self.input.number_of_holes = checked_count(hole_scratch.len());
        }

        let switches = build_switches(&self.input, config, &mut self.advisories)?;

        if self.input.number_of_segments > 0 && self.input.segment_marker_list.is_null() {
            *marker_scratch = (1..=self.input.number_of_segments).collect();
            self.input.segment_marker_list = marker_scratch.as_mut_ptr();
        }

        self.out = OwnedIo::new();
        self.vorout = OwnedIo::new();
        unsafe {
            backend::triangulate(
                &switches,
                &self.input,
                &mut self.out.io,
                &mut self.vorout.io,
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [[Scalar; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    const SQUARE_LOOP: [[Index; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

    #[test]
    fn setters_record_views_without_copying() {
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.set_in_segments(&SQUARE_LOOP);
        assert_eq!(engine.in_points(), &SQUARE);
        assert_eq!(engine.in_segments(), &SQUARE_LOOP);
        assert_eq!(engine.in_points().as_ptr(), SQUARE.as_ptr());
    }

    #[test]
    fn unset_channels_read_back_empty() {
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.unset_in_points();
        assert!(engine.in_points().is_empty());
        assert!(engine.in_segments().is_empty());
        assert!(engine.out_points().is_empty());
        assert!(engine.out_triangles().is_empty());
    }

    #[test]
    #[should_panic(expected = "one marker per input vertex")]
    fn short_point_marker_channel_is_rejected() {
        let markers = [1];
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.set_in_point_markers(&markers);
    }

    #[test]
    #[should_panic(expected = "no longer matches the point channel")]
    fn growing_the_point_channel_invalidates_installed_markers() {
        let markers = [10, 20, 30, 40];
        let grown = [
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.5],
        ];
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.set_in_point_markers(&markers);
        engine.set_in_points(&grown);
        let _ = engine.run(&Config::default());
    }

    #[test]
    fn run_without_input_is_an_input_error() {
        let mut engine = Engine::new();
        let err = engine.run(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn failed_run_leaves_no_partial_output() {
        let points = [[0.0, 0.0], [1.0, 0.0]];
        let mut engine = Engine::new();
        engine.set_in_points(&points);
        assert!(engine.run(&Config::default()).is_err());
        assert!(engine.out_points().is_empty());
        assert!(engine.out_triangles().is_empty());
        assert!(engine.out_voronoi_points().is_empty());
    }

    #[test]
    fn run_restores_scratch_channels() {
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.set_in_segments(&SQUARE_LOOP);
        let config = Config {
            auto_hole_detection: true,
            ..Config::default()
        };
        engine.run(&config).unwrap();
        assert!(engine.in_holes().is_empty());
        assert!(engine.in_segment_markers().is_empty());
    }

    #[test]
    fn rerun_replaces_previous_output() {
        let mut engine = Engine::new();
        engine.set_in_points(&SQUARE);
        engine.set_in_segments(&SQUARE_LOOP);
        engine.run(&Config::default()).unwrap();
        let first = engine.out_triangles().len();

        let config = Config {
            max_area: 0.05,
            ..Config::default()
        };
        engine.run(&config).unwrap();
        assert!(engine.out_triangles().len() > first);
    }
}
