//! Meshing configuration.
//!
//! [`Config`] is the structured form of the engine's option string; the
//! translation itself lives in [`crate::core::switches`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Index, Scalar};

/// Triangulation algorithm selector.
///
/// The choice is forwarded to the engine on its option string; it never
/// changes the produced mesh, only how the engine computes it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algorithm {
    /// Divide-and-conquer (the engine default, no option flag).
    #[default]
    DivideAndConquer,
    /// Fortune's sweepline algorithm (`F` flag).
    Sweepline,
    /// Incremental insertion (`i` flag).
    Incremental,
}

/// Mesh generation settings.
///
/// Field defaults mirror the classic engine defaults: a 20° quality bound,
/// no area bound, unlimited Steiner points, exact arithmetic, boundary
/// splitting allowed.
///
/// # Examples
///
/// ```rust
/// use flatmesh::Config;
///
/// let config = Config {
///     max_area: 0.1,
///     verbose_level: 0,
///     ..Config::default()
/// };
/// assert_eq!(config.min_angle, 20.0);
/// assert!(config.exact);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Minimum triangle angle in degrees (`q` constraint). Values above
    /// 20.7° lose the theoretical termination guarantee and values above
    /// 34° often fail to terminate; both cases emit an
    /// [`Advisory`](crate::Advisory) instead of an error. Negative values
    /// are ignored with an advisory.
    pub min_angle: Scalar,
    /// Uniform maximum triangle area (`a` constraint). Negative means
    /// unset; with per-triangle areas installed, area enforcement is
    /// requested without a uniform value.
    pub max_area: Scalar,
    /// Maximum number of Steiner points the engine may insert (`S`).
    /// Negative means unlimited.
    pub max_num_steiner: Index,
    /// Verbosity, 0 (quiet) through 4. Out-of-range values fail with
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig).
    pub verbose_level: Index,
    /// Triangulation algorithm choice.
    pub algorithm: Algorithm,
    /// Keep the convex hull: triangulate everything inside it instead of
    /// carving away regions outside the segment boundary (`c`).
    pub convex_hull: bool,
    /// Request a conforming Delaunay triangulation (`D`).
    pub conforming: bool,
    /// Use exact arithmetic. Disabling trades robustness for speed (`X`).
    pub exact: bool,
    /// Allow the engine to split boundary segments. Disabling (`Y`)
    /// guarantees no vertex is inserted on any input segment.
    pub split_boundary: bool,
    /// Detect interior holes from the (closed, consistently oriented)
    /// boundary loops and seed them automatically before the main pass.
    pub auto_hole_detection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_angle: 20.0,
            max_area: -1.0,
            max_num_steiner: -1,
            verbose_level: 1,
            algorithm: Algorithm::default(),
            convex_hull: false,
            conforming: false,
            exact: true,
            split_boundary: true,
            auto_hole_detection: false,
        }
    }
}
