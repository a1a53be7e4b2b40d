//! # flatmesh
//!
//! A 2D mesh generation library: constrained Delaunay triangulation of
//! planar straight-line graphs (PSLGs), quality refinement, Voronoi
//! companion output, and automatic interior-hole detection.
//!
//! The crate is organized as a thin, zero-copy marshaling layer around a
//! black-box triangulation engine that speaks the classic `triangulateio`
//! interface: a fixed-layout aggregate of raw pointer/count pairs plus an
//! ASCII option string (`"zneq20a0.5cY"` and friends). The [`Engine`]
//! wrapper owns that boundary:
//!
//! - **Input channels** (points, segments, triangles, holes, per-triangle
//!   areas, point/segment markers) are borrowed views over caller slices.
//!   The engine never copies or mutates them, and the borrow checker keeps
//!   them alive for as long as the wrapper can read them.
//! - **Output channels** (points, triangles, segments, edges, neighbors,
//!   markers, Voronoi data) are exclusively owned buffers, released on
//!   every [`Engine::run`] and on drop.
//! - **Auto hole detection** turns a closed, oriented boundary polygon
//!   into hole seed points by triangulating once, flood-filling the
//!   planar regions separated by boundary edges, and classifying each
//!   region by winding number.
//!
//! # Basic usage
//!
//! ```rust
//! use flatmesh::{Config, Engine};
//!
//! let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
//!
//! let mut engine = Engine::new();
//! engine.set_in_points(&points);
//!
//! let config = Config {
//!     convex_hull: true,
//!     verbose_level: 0,
//!     ..Config::default()
//! };
//! engine.run(&config).unwrap();
//!
//! assert!(engine.out_points().len() >= 3);
//! assert!(!engine.out_triangles().is_empty());
//! ```
//!
//! # Meshing a polygon with a hole
//!
//! ```rust
//! use flatmesh::{Config, Engine};
//!
//! // Outer square (counterclockwise) with an inner square wound the
//! // opposite way; the enclosed region is detected as a hole.
//! let points = [
//!     [0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0],
//!     [1.0, 1.0], [1.0, 3.0], [3.0, 3.0], [3.0, 1.0],
//! ];
//! let segments = [
//!     [0, 1], [1, 2], [2, 3], [3, 0],
//!     [4, 5], [5, 6], [6, 7], [7, 4],
//! ];
//!
//! let mut engine = Engine::new();
//! engine.set_in_points(&points);
//! engine.set_in_segments(&segments);
//!
//! let config = Config {
//!     auto_hole_detection: true,
//!     verbose_level: 0,
//!     ..Config::default()
//! };
//! engine.run(&config).unwrap();
//! assert!(!engine.out_triangles().is_empty());
//! ```
//!
//! # Precision
//!
//! All coordinates are [`Scalar`] (`f64` by default, `f32` with the
//! `single-precision` feature) and all indices are [`Index`] (`i32`, the
//! width the engine boundary requires). The two never mix.
//!
//! # Concurrency
//!
//! An [`Engine`] is a single-threaded state machine: it is neither `Send`
//! nor `Sync` (it holds raw views over caller memory), and `run` must not
//! be re-entered. Distinct instances share no state and may run on
//! separate threads independently.

pub mod backend;
pub mod core;
pub mod geometry;

/// Coordinate scalar used throughout the crate and by the engine boundary.
///
/// `f64` unless the `single-precision` feature is enabled.
#[cfg(not(feature = "single-precision"))]
pub type Scalar = f64;

/// Coordinate scalar used throughout the crate and by the engine boundary.
#[cfg(feature = "single-precision")]
pub type Scalar = f32;

/// Index type shared with the engine boundary.
///
/// The `triangulateio` layout encodes every index and count as a C `int`.
pub type Index = i32;

pub use crate::core::config::{Algorithm, Config};
pub use crate::core::engine::Engine;
pub use crate::core::error::Error;
pub use crate::core::switches::Advisory;

/// Convenience re-exports for the common entry points.
pub mod prelude {
    pub use crate::backend::EngineError;
    pub use crate::core::config::{Algorithm, Config};
    pub use crate::core::engine::Engine;
    pub use crate::core::error::Error;
    pub use crate::core::switches::Advisory;
    pub use crate::{Index, Scalar};
}
