//! Marker flow from input channels to output channels: vertex markers,
//! segment markers through subdivision, edge markers, and the implicit
//! one-based markers installed when the caller sets none.

use flatmesh::prelude::*;

const SQUARE: [[Scalar; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const SQUARE_LOOP: [[Index; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

fn quiet() -> Config {
    Config {
        min_angle: 0.0,
        verbose_level: 0,
        ..Config::default()
    }
}

#[test]
fn input_vertices_come_first_and_keep_their_markers() {
    let markers: [Index; 4] = [10, 20, 30, 40];
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    engine.set_in_segments(&SQUARE_LOOP);
    engine.set_in_point_markers(&markers);
    let config = Config {
        max_area: 0.05,
        ..quiet()
    };
    engine.run(&config).unwrap();

    let out_points = engine.out_points();
    let out_markers = engine.out_point_markers();
    assert!(out_points.len() > 4);
    assert_eq!(out_markers.len(), out_points.len());
    // Input order is preserved at the front of the output.
    for (i, p) in SQUARE.iter().enumerate() {
        assert_eq!(out_points[i], *p);
        assert_eq!(out_markers[i], markers[i]);
    }
    // Engine-inserted vertices carry marker zero.
    for marker in &out_markers[4..] {
        assert_eq!(*marker, 0);
    }
}

#[test]
fn subsegments_inherit_their_parent_marker() {
    let markers: [Index; 4] = [4, 5, 6, 7];
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    engine.set_in_segments(&SQUARE_LOOP);
    engine.set_in_segment_markers(&markers);
    let config = Config {
        max_area: 0.02,
        ..quiet()
    };
    engine.run(&config).unwrap();

    let out_segments = engine.out_segments();
    let out_markers = engine.out_segment_markers();
    assert!(out_segments.len() > 4, "boundary was never split");
    assert_eq!(out_markers.len(), out_segments.len());
    for marker in out_markers {
        assert!(markers.contains(marker), "unexpected marker {marker}");
    }
    // Every parent segment contributed at least one subsegment.
    for parent in &markers {
        assert!(out_markers.contains(parent), "marker {parent} vanished");
    }
}

#[test]
fn edge_markers_are_parent_markers_or_zero() {
    let markers: [Index; 4] = [4, 5, 6, 7];
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    engine.set_in_segments(&SQUARE_LOOP);
    engine.set_in_segment_markers(&markers);
    let config = Config {
        max_area: 0.05,
        ..quiet()
    };
    engine.run(&config).unwrap();

    let out_edges = engine.out_edges();
    let out_markers = engine.out_edge_markers();
    assert_eq!(out_markers.len(), out_edges.len());
    let mut boundary_edges = 0;
    for marker in out_markers {
        assert!(
            *marker == 0 || markers.contains(marker),
            "unexpected edge marker {marker}"
        );
        if *marker != 0 {
            boundary_edges += 1;
        }
    }
    // The boundary subsegments all appear in the edge channel too.
    assert_eq!(boundary_edges, engine.out_segments().len());
}

#[test]
fn unset_segment_markers_default_to_one_based_positions() {
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    engine.set_in_segments(&SQUARE_LOOP);
    engine.run(&quiet()).unwrap();

    // No refinement: the four subsegments are the four inputs, and each
    // carries its one-based position.
    let mut seen: Vec<Index> = engine.out_segment_markers().to_vec();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4]);
    // The scratch channel did not leak into the borrowed input.
    assert!(engine.in_segment_markers().is_empty());
}

#[test]
fn unset_markers_survive_subdivision_too() {
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    engine.set_in_segments(&SQUARE_LOOP);
    let config = Config {
        max_area: 0.02,
        ..quiet()
    };
    engine.run(&config).unwrap();

    for marker in engine.out_segment_markers() {
        assert!((1..=4).contains(marker), "marker {marker} outside 1..=4");
    }
}

#[test]
fn cloud_mode_hull_segments_carry_no_markers() {
    let mut engine = Engine::new();
    engine.set_in_points(&SQUARE);
    let config = Config {
        convex_hull: true,
        ..quiet()
    };
    engine.run(&config).unwrap();

    assert_eq!(engine.out_segments().len(), 4);
    assert!(engine.out_segment_markers().iter().all(|m| *m == 0));
}
