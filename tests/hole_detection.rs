//! Automatic hole detection: seed placement, winding classification,
//! nesting, and the interplay with explicitly provided hole seeds.

use flatmesh::geometry::{centroid, winding_number};
use flatmesh::prelude::*;

fn quiet() -> Config {
    Config {
        min_angle: 0.0,
        verbose_level: 0,
        ..Config::default()
    }
}

fn auto() -> Config {
    Config {
        auto_hole_detection: true,
        ..quiet()
    }
}

/// Outer counterclockwise square with an inner clockwise square.
const NESTED_POINTS: [[Scalar; 2]; 8] = [
    [0.0, 0.0],
    [4.0, 0.0],
    [4.0, 4.0],
    [0.0, 4.0],
    [1.0, 1.0],
    [1.0, 3.0],
    [3.0, 3.0],
    [3.0, 1.0],
];
const NESTED_SEGMENTS: [[Index; 2]; 8] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
];

fn assert_no_triangle_in_hole(engine: &Engine<'_>, lo: Scalar, hi: Scalar) {
    for tri in engine.out_triangles() {
        let p = |i: Index| engine.out_points()[i as usize];
        let c = centroid(p(tri[0]), p(tri[1]), p(tri[2]));
        let inside = c[0] > lo && c[0] < hi && c[1] > lo && c[1] < hi;
        assert!(!inside, "triangle centroid {c:?} inside the hole");
    }
}

#[test]
fn detect_holes_seeds_the_inner_square() {
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    engine.set_in_segments(&NESTED_SEGMENTS);

    let seeds = engine.detect_holes().unwrap();
    assert_eq!(seeds.len(), 1);
    let [x, y] = seeds[0];
    assert!(x > 1.0 && x < 3.0 && y > 1.0 && y < 3.0);
    assert!(winding_number(seeds[0], &NESTED_POINTS, &NESTED_SEGMENTS) < 0.5);
}

#[test]
fn detect_holes_without_segments_is_empty() {
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    assert!(engine.detect_holes().unwrap().is_empty());
}

#[test]
fn auto_detection_carves_the_hole() {
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    engine.set_in_segments(&NESTED_SEGMENTS);
    engine.run(&auto()).unwrap();

    assert!(!engine.out_triangles().is_empty());
    assert_no_triangle_in_hole(&engine, 1.0, 3.0);
    // The inner loop's segments survive as constrained subsegments.
    assert_eq!(engine.out_segments().len(), 8);
    // The seeds were scratch state; the borrowed input is untouched.
    assert!(engine.in_holes().is_empty());
}

#[test]
fn auto_detection_refines_around_the_hole() {
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    engine.set_in_segments(&NESTED_SEGMENTS);
    let config = Config {
        min_angle: 20.0,
        max_area: 0.1,
        ..auto()
    };
    engine.run(&config).unwrap();
    assert!(engine.out_triangles().len() > 20);
    assert_no_triangle_in_hole(&engine, 1.0, 3.0);
}

#[test]
fn twice_nested_loops_keep_the_core() {
    // Square, hole ring, solid core: orientations alternate.
    let points: [[Scalar; 2]; 12] = [
        [0.0, 0.0],
        [8.0, 0.0],
        [8.0, 8.0],
        [0.0, 8.0],
        [1.0, 1.0],
        [1.0, 7.0],
        [7.0, 7.0],
        [7.0, 1.0],
        [2.0, 2.0],
        [6.0, 2.0],
        [6.0, 6.0],
        [2.0, 6.0],
    ];
    let segments: [[Index; 2]; 12] = [
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [4, 5],
        [5, 6],
        [6, 7],
        [7, 4],
        [8, 9],
        [9, 10],
        [10, 11],
        [11, 8],
    ];

    let mut engine = Engine::new();
    engine.set_in_points(&points);
    engine.set_in_segments(&segments);
    engine.run(&auto()).unwrap();

    let mut core_triangles = 0;
    let mut ring_triangles = 0;
    for tri in engine.out_triangles() {
        let p = |i: Index| engine.out_points()[i as usize];
        let c = centroid(p(tri[0]), p(tri[1]), p(tri[2]));
        let in_mid = c[0] > 1.0 && c[0] < 7.0 && c[1] > 1.0 && c[1] < 7.0;
        let in_core = c[0] > 2.0 && c[0] < 6.0 && c[1] > 2.0 && c[1] < 6.0;
        if in_core {
            core_triangles += 1;
        } else {
            assert!(!in_mid, "triangle centroid {c:?} inside the hole ring");
            ring_triangles += 1;
        }
    }
    assert!(core_triangles > 0, "solid core was carved away");
    assert!(ring_triangles > 0, "outer band was carved away");
}

#[test]
fn explicit_seeds_work_without_auto_detection() {
    let holes: [[Scalar; 2]; 1] = [[2.0, 2.0]];
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    engine.set_in_segments(&NESTED_SEGMENTS);
    engine.set_in_holes(&holes);
    engine.run(&quiet()).unwrap();

    assert_no_triangle_in_hole(&engine, 1.0, 3.0);
    // The explicitly borrowed channel is still attached afterward.
    assert_eq!(engine.in_holes(), holes.as_slice());
}

#[test]
fn without_any_seeds_the_inner_square_stays_meshed() {
    let mut engine = Engine::new();
    engine.set_in_points(&NESTED_POINTS);
    engine.set_in_segments(&NESTED_SEGMENTS);
    engine.run(&quiet()).unwrap();

    let p = |i: Index| engine.out_points()[i as usize];
    let has_inner = engine.out_triangles().iter().any(|tri| {
        let c = centroid(p(tri[0]), p(tri[1]), p(tri[2]));
        c[0] > 1.0 && c[0] < 3.0 && c[1] > 1.0 && c[1] < 3.0
    });
    assert!(has_inner, "inner square should be meshed when no seed removes it");
}

#[test]
fn disjoint_holes_each_get_a_seed() {
    let points: [[Scalar; 2]; 12] = [
        [0.0, 0.0],
        [7.0, 0.0],
        [7.0, 3.0],
        [0.0, 3.0],
        // Left hole, clockwise.
        [1.0, 1.0],
        [1.0, 2.0],
        [2.0, 2.0],
        [2.0, 1.0],
        // Right hole, clockwise.
        [5.0, 1.0],
        [5.0, 2.0],
        [6.0, 2.0],
        [6.0, 1.0],
    ];
    let segments: [[Index; 2]; 12] = [
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [4, 5],
        [5, 6],
        [6, 7],
        [7, 4],
        [8, 9],
        [9, 10],
        [10, 11],
        [11, 8],
    ];

    let mut engine = Engine::new();
    engine.set_in_points(&points);
    engine.set_in_segments(&segments);

    let seeds = engine.detect_holes().unwrap();
    assert_eq!(seeds.len(), 2);
    let in_left = seeds
        .iter()
        .filter(|s| s[0] > 1.0 && s[0] < 2.0 && s[1] > 1.0 && s[1] < 2.0)
        .count();
    let in_right = seeds
        .iter()
        .filter(|s| s[0] > 5.0 && s[0] < 6.0 && s[1] > 1.0 && s[1] < 2.0)
        .count();
    assert_eq!(in_left, 1);
    assert_eq!(in_right, 1);
}
