//! The triangulation engine behind the fixed-layout boundary.
//!
//! [`triangulate`] is a drop-in equivalent of the classic engine entry
//! point: it consumes an option string plus an input
//! [`TriangulateIo`](crate::core::io::TriangulateIo) and fills freshly
//! allocated output (and Voronoi output) bundles. The constrained
//! Delaunay triangulation and refinement themselves are delegated to
//! [`spade`]; this module owns the option grammar, input validation,
//! region carving, and the exact output-array layout the wrapper frees.

pub(crate) mod mesh;
pub(crate) mod voronoi;

use thiserror::Error;

use crate::core::io::TriangulateIo;
use crate::{Index, Scalar};

/// Failures raised by the engine itself.
///
/// These are opaque to the wrapper: it propagates them unchanged as
/// [`Error::EngineFailure`](crate::Error::EngineFailure) and guarantees no
/// partial output.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The option string contains a token the engine does not know.
    #[error("unknown switch {switch:?} in option string {switches:?}")]
    UnknownSwitch {
        /// The offending character.
        switch: char,
        /// The full option string.
        switches: String,
    },
    /// A switch expected a numeric argument that did not parse.
    #[error("malformed value for switch {switch:?} in option string {switches:?}")]
    MalformedSwitchValue {
        /// The switch whose argument was malformed.
        switch: char,
        /// The full option string.
        switches: String,
    },
    /// Fewer than three input points.
    #[error("input must contain at least 3 points, found {found}")]
    TooFewPoints {
        /// Number of points that were provided.
        found: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("point {point} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending input point.
        point: usize,
    },
    /// Every input point lies on one line (or collapses to fewer than
    /// three distinct locations); no triangle exists.
    #[error("input points are collinear or coincident; no triangulation exists")]
    DegeneratePointSet,
    /// A segment references a point index outside the input range.
    #[error("segment {segment} references point {index} outside 0..{num_points}")]
    SegmentIndexOutOfRange {
        /// Index of the offending segment.
        segment: usize,
        /// The out-of-range point index (after index-base decoding).
        index: Index,
        /// Number of input points.
        num_points: usize,
    },
    /// An input triangle references a point index outside the input range.
    #[error("triangle {triangle} references point {index} outside 0..{num_points}")]
    TriangleIndexOutOfRange {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-range point index (after index-base decoding).
        index: Index,
        /// Number of input points.
        num_points: usize,
    },
    /// A segment whose endpoints are the same point (by index or by
    /// coordinate).
    #[error("segment {segment} is degenerate: endpoints coincide")]
    DegenerateSegment {
        /// Index of the offending segment.
        segment: usize,
    },
    /// The same segment (in either direction) appears twice.
    #[error("segment {segment} duplicates an earlier segment")]
    DuplicateSegment {
        /// Index of the offending segment.
        segment: usize,
    },
    /// A segment crosses another segment away from their endpoints.
    #[error("segment {segment} intersects another constraint segment")]
    IntersectingSegment {
        /// Index of the offending segment.
        segment: usize,
    },
    /// The underlying triangulation rejected a vertex.
    #[error("vertex insertion failed: {0:?}")]
    VertexInsertion(spade::InsertionError),
}

/// Uniform vs. per-triangle area enforcement (`a<value>` vs. bare `a`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AreaBound {
    Uniform(Scalar),
    PerTriangle,
}

/// Decoded option string.
///
/// Every token of the grammar is represented, including the ones this
/// adapter accepts for compatibility without consulting them (verbosity,
/// algorithm choice, exact arithmetic, conforming Delaunay).
#[derive(Debug, PartialEq)]
pub(crate) struct Switches {
    /// First point index: 0 with `z`, 1 otherwise.
    pub index_base: Index,
    pub neighbors: bool,
    pub edges: bool,
    pub pslg: bool,
    pub refine: bool,
    pub voronoi: bool,
    pub min_angle: Option<Scalar>,
    pub area: Option<AreaBound>,
    pub convex_hull: bool,
    /// Parsed for grammar fidelity; refinement always conforms.
    #[allow(dead_code)]
    pub conforming: bool,
    /// Parsed for grammar fidelity; arithmetic is always exact enough.
    #[allow(dead_code)]
    pub exact: bool,
    pub split_boundary: bool,
    pub max_steiner: Option<usize>,
    /// Parsed for grammar fidelity; nothing here prints.
    #[allow(dead_code)]
    pub quiet: bool,
    /// Parsed for grammar fidelity; nothing here prints.
    #[allow(dead_code)]
    pub verbosity: u8,
    /// Parsed for grammar fidelity; the insertion order is fixed.
    #[allow(dead_code)]
    pub sweepline: bool,
    /// Parsed for grammar fidelity; the insertion order is fixed.
    #[allow(dead_code)]
    pub incremental: bool,
}

impl Default for Switches {
    fn default() -> Self {
        Self {
            index_base: 1,
            neighbors: false,
            edges: false,
            pslg: false,
            refine: false,
            voronoi: false,
            min_angle: None,
            area: None,
            convex_hull: false,
            conforming: false,
            exact: true,
            split_boundary: true,
            max_steiner: None,
            quiet: false,
            verbosity: 0,
            sweepline: false,
            incremental: false,
        }
    }
}

impl Switches {
    /// Parses an option string.
    ///
    /// Numeric arguments (`q<angle>`, `a<area>`, `S<count>`) are greedy
    /// runs of digits and dots immediately following the switch; `q` and
    /// `a` accept an absent argument (`q` defaults to 20°, bare `a`
    /// requests per-triangle enforcement).
    pub fn parse(switches: &str) -> Result<Self, EngineError> {
        let mut parsed = Self::default();
        let mut chars = switches.chars().peekable();

        while let Some(token) = chars.next() {
            match token {
                'z' => parsed.index_base = 0,
                'n' => parsed.neighbors = true,
                'e' => parsed.edges = true,
                'p' => parsed.pslg = true,
                'r' => parsed.refine = true,
                'v' => parsed.voronoi = true,
                'c' => parsed.convex_hull = true,
                'D' => parsed.conforming = true,
                'X' => parsed.exact = false,
                'Y' => parsed.split_boundary = false,
                'Q' => parsed.quiet = true,
                'V' => parsed.verbosity = parsed.verbosity.saturating_add(1),
                'F' => parsed.sweepline = true,
                'i' => parsed.incremental = true,
                'q' => {
                    let value = take_number(&mut chars);
                    parsed.min_angle = match value {
                        Some(text) => Some(text.parse::<Scalar>().map_err(|_| {
                            EngineError::MalformedSwitchValue {
                                switch: 'q',
                                switches: switches.to_owned(),
                            }
                        })?),
                        None => Some(20.0),
                    };
                }
                'a' => {
                    let value = take_number(&mut chars);
                    parsed.area = match value {
                        Some(text) => Some(AreaBound::Uniform(text.parse::<Scalar>().map_err(
                            |_| EngineError::MalformedSwitchValue {
                                switch: 'a',
                                switches: switches.to_owned(),
                            },
                        )?)),
                        None => Some(AreaBound::PerTriangle),
                    };
                }
                'S' => {
                    let value = take_number(&mut chars).unwrap_or_default();
                    parsed.max_steiner = Some(value.parse::<usize>().map_err(|_| {
                        EngineError::MalformedSwitchValue {
                            switch: 'S',
                            switches: switches.to_owned(),
                        }
                    })?);
                }
                other => {
                    return Err(EngineError::UnknownSwitch {
                        switch: other,
                        switches: switches.to_owned(),
                    });
                }
            }
        }
        Ok(parsed)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    (!text.is_empty()).then_some(text)
}

/// Triangulates `input` according to `switches`, installing freshly
/// allocated arrays into `output` (and, under `v`, `voronoi`).
///
/// `output.hole_list` and `output.region_list` are set to mirror the
/// input pointers, never allocated. Every other installed pointer is
/// owned by the caller and must be released with the exact recorded
/// counts (the wrapper's `OwnedIo` guard does this).
///
/// # Errors
///
/// Any [`EngineError`]; on error nothing has been installed into
/// `output` or `voronoi`.
///
/// # Safety
///
/// Every non-null pointer in `input` must reference initialized memory of
/// the length implied by its count field (and element width), live for
/// the whole call. `output` and `voronoi` must contain no pointers the
/// caller still expects to use: they are overwritten, not freed.
pub unsafe fn triangulate(
    switches: &str,
    input: &TriangulateIo,
    output: &mut TriangulateIo,
    voronoi: &mut TriangulateIo,
) -> Result<(), EngineError> {
    let sw = Switches::parse(switches)?;
    let channels = unsafe { mesh::InputChannels::from_io(input) };
    let built = mesh::build(&channels, &sw)?;
    mesh::install(built, &sw, input, output, voronoi);
    Ok(())
}
