pub mod point;
pub mod polygon;

pub use point::{point_on_ray, Point};
pub use polygon::{Loop, Polygon};
