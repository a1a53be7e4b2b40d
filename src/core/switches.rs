//! Config → engine option-string translation.
//!
//! The engine is driven by an ASCII token sequence (`zneq20a0.5cY`, ...).
//! [`build_switches`] derives it from the current input population plus a
//! [`Config`], validating the config up front and reporting quality-bound
//! concerns as structured [`Advisory`] values rather than stderr writes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::core::config::{Algorithm, Config};
use crate::core::error::Error;
use crate::core::io::TriangulateIo;
use crate::Scalar;

/// Practical upper bound: refinement beyond this often fails to terminate.
pub const MIN_ANGLE_PRACTICAL_LIMIT: Scalar = 34.0;
/// Theoretical bound: termination is proven only up to this angle.
pub const MIN_ANGLE_GUARANTEED_LIMIT: Scalar = 20.7;

/// Non-fatal diagnostics emitted while encoding a [`Config`].
///
/// Advisories never block a run; they are collected per
/// [`run`](crate::Engine::run) and exposed through
/// [`advisories`](crate::Engine::advisories).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Advisory {
    /// `min_angle` exceeds 34°; refinement may not terminate at all.
    MinAngleMayNotTerminate {
        /// The requested minimum angle in degrees.
        min_angle: Scalar,
    },
    /// `min_angle` exceeds 20.7°; the theoretical termination guarantee is
    /// lost, though angles up to ≈33° usually succeed in practice.
    MinAngleBeyondGuarantee {
        /// The requested minimum angle in degrees.
        min_angle: Scalar,
    },
    /// Negative `min_angle`; no quality constraint was requested.
    NegativeMinAngleIgnored {
        /// The requested minimum angle in degrees.
        min_angle: Scalar,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinAngleMayNotTerminate { min_angle } => write!(
                f,
                "min angle {min_angle}° > {MIN_ANGLE_PRACTICAL_LIMIT}°: refinement may not terminate"
            ),
            Self::MinAngleBeyondGuarantee { min_angle } => write!(
                f,
                "min angle {min_angle}° > {MIN_ANGLE_GUARANTEED_LIMIT}°: theoretical termination guarantee is lost"
            ),
            Self::NegativeMinAngleIgnored { min_angle } => {
                write!(f, "min angle {min_angle}° < 0°: ignored")
            }
        }
    }
}

/// Builds the engine option string for the current input shape and config.
///
/// Always requests zero-based indexing, neighbor output and edge output
/// (`zne`). The triangulation mode is input-shape-driven: segments present
/// ⇒ PSLG (`p`), else an existing triangulation ⇒ refinement (`r`), else a
/// bare point cloud with Voronoi companion output (`v`).
///
/// # Errors
///
/// - [`Error::InvalidInput`] when no input points are present.
/// - [`Error::InvalidConfig`] for a verbosity outside `0..=4`.
pub fn build_switches(
    input: &TriangulateIo,
    config: &Config,
    advisories: &mut Vec<Advisory>,
) -> Result<String, Error> {
    let mut opt = String::from("zne");

    if input.number_of_points == 0 {
        return Err(Error::InvalidInput {
            message: "empty input detected for triangulation".into(),
        });
    } else if input.number_of_segments > 0 {
        opt.push('p');
    } else if input.number_of_triangles > 0 {
        opt.push('r');
    } else {
        opt.push('v');
    }

    if config.min_angle > 0.0 {
        if config.min_angle > MIN_ANGLE_PRACTICAL_LIMIT {
            advisories.push(Advisory::MinAngleMayNotTerminate {
                min_angle: config.min_angle,
            });
        } else if config.min_angle > MIN_ANGLE_GUARANTEED_LIMIT {
            advisories.push(Advisory::MinAngleBeyondGuarantee {
                min_angle: config.min_angle,
            });
        }
        opt.push('q');
        opt.push_str(&config.min_angle.to_string());
    } else if config.min_angle < 0.0 {
        advisories.push(Advisory::NegativeMinAngleIgnored {
            min_angle: config.min_angle,
        });
    }

    if config.max_area > 0.0 {
        opt.push('a');
        opt.push_str(&config.max_area.to_string());
    } else if !input.triangle_area_list.is_null() {
        opt.push('a');
    }
    if config.convex_hull {
        opt.push('c');
    }
    if config.conforming {
        opt.push('D');
    }
    if !config.exact {
        opt.push('X');
    }
    if !config.split_boundary {
        opt.push('Y');
    }
    if config.max_num_steiner >= 0 {
        opt.push('S');
        opt.push_str(&config.max_num_steiner.to_string());
    }
    match config.verbose_level {
        0 => opt.push('Q'),
        1 => {}
        2 => opt.push('V'),
        3 => opt.push_str("VV"),
        4 => opt.push_str("VVVV"),
        level => {
            return Err(Error::InvalidConfig {
                message: format!("unknown verbose level: {level}"),
            });
        }
    }
    match config.algorithm {
        Algorithm::DivideAndConquer => {}
        Algorithm::Sweepline => opt.push('F'),
        Algorithm::Incremental => opt.push('i'),
    }
    Ok(opt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::TriangulateIo;
    use crate::Index;

    fn input_with(points: Index, segments: Index, triangles: Index) -> TriangulateIo {
        let mut io = TriangulateIo::new();
        io.number_of_points = points;
        io.number_of_segments = segments;
        io.number_of_triangles = triangles;
        io
    }

    fn base() -> Config {
        Config {
            min_angle: 0.0,
            verbose_level: 1,
            ..Config::default()
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut advisories = Vec::new();
        let err = build_switches(&input_with(0, 0, 0), &base(), &mut advisories).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(advisories.is_empty());
    }

    #[test]
    fn mode_is_input_shape_driven() {
        let mut advisories = Vec::new();
        let pslg = build_switches(&input_with(4, 4, 0), &base(), &mut advisories).unwrap();
        let refine = build_switches(&input_with(4, 0, 2), &base(), &mut advisories).unwrap();
        let cloud = build_switches(&input_with(4, 0, 0), &base(), &mut advisories).unwrap();
        assert_eq!(pslg, "znep");
        assert_eq!(refine, "zner");
        assert_eq!(cloud, "znev");
    }

    #[test]
    fn segments_take_precedence_over_triangles() {
        let mut advisories = Vec::new();
        let opt = build_switches(&input_with(4, 2, 2), &base(), &mut advisories).unwrap();
        assert_eq!(opt, "znep");
    }

    #[test]
    fn quality_flag_carries_the_angle() {
        let config = Config {
            min_angle: 20.0,
            ..base()
        };
        let mut advisories = Vec::new();
        let opt = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znepq20");
        assert!(advisories.is_empty());
    }

    #[test]
    fn steep_angles_emit_one_advisory_each() {
        let mut advisories = Vec::new();
        let config = Config {
            min_angle: 33.0,
            ..base()
        };
        build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(
            advisories,
            vec![Advisory::MinAngleBeyondGuarantee { min_angle: 33.0 }]
        );

        advisories.clear();
        let config = Config {
            min_angle: 35.0,
            ..base()
        };
        build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(
            advisories,
            vec![Advisory::MinAngleMayNotTerminate { min_angle: 35.0 }]
        );
    }

    #[test]
    fn negative_angle_is_ignored_with_advisory() {
        let mut advisories = Vec::new();
        let config = Config {
            min_angle: -5.0,
            ..base()
        };
        let opt = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znep");
        assert_eq!(
            advisories,
            vec![Advisory::NegativeMinAngleIgnored { min_angle: -5.0 }]
        );
    }

    #[test]
    fn uniform_area_beats_per_triangle_request() {
        let config = Config {
            max_area: 0.5,
            ..base()
        };
        let mut advisories = Vec::new();
        let mut io = input_with(4, 0, 2);
        let areas = [0.1 as Scalar, 0.2];
        io.triangle_area_list = areas.as_ptr().cast_mut();
        let opt = build_switches(&io, &config, &mut advisories).unwrap();
        assert_eq!(opt, "znera0.5");

        let opt = build_switches(&io, &base(), &mut advisories).unwrap();
        assert_eq!(opt, "znera");
    }

    #[test]
    fn independent_boolean_flags() {
        let config = Config {
            convex_hull: true,
            conforming: true,
            exact: false,
            split_boundary: false,
            ..base()
        };
        let mut advisories = Vec::new();
        let opt = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znepcDXY");
    }

    #[test]
    fn steiner_cap_and_verbosity() {
        let config = Config {
            max_num_steiner: 0,
            verbose_level: 0,
            ..base()
        };
        let mut advisories = Vec::new();
        let opt = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znepS0Q");

        let config = Config {
            verbose_level: 4,
            ..base()
        };
        let opt = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znepVVVV");
    }

    #[test]
    fn out_of_range_verbosity_is_invalid_config() {
        let config = Config {
            verbose_level: 5,
            ..base()
        };
        let mut advisories = Vec::new();
        let err = build_switches(&input_with(4, 4, 0), &config, &mut advisories).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn algorithm_flags() {
        let mut advisories = Vec::new();
        let config = Config {
            algorithm: Algorithm::Sweepline,
            ..base()
        };
        let opt = build_switches(&input_with(4, 0, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znevF");

        let config = Config {
            algorithm: Algorithm::Incremental,
            ..base()
        };
        let opt = build_switches(&input_with(4, 0, 0), &config, &mut advisories).unwrap();
        assert_eq!(opt, "znevi");
    }
}
