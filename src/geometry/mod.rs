pub mod polygon;

pub use polygon::{contains, Point, Polygon};
