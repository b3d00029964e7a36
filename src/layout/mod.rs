//! Geometry shared by every renderer: boxes, transforms, spacing and text runs.

pub mod geometry;
pub mod spacing;
pub mod text;

pub use geometry::{BoundingBox, Matrix, fmt_num, normalize_bbox, union_bbox};
pub use spacing::{LayoutItem, Spaceable, SpacingOptions, space_horizontally, space_vertically};
