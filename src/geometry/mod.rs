//! Pure geometric helpers shared by the hole detector and the backend.

pub mod measures;

pub use measures::{centroid, point_on_segment, signed_area2, winding_number};
