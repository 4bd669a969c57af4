pub mod chord_angle;
pub mod intersect;
pub mod latlng;
pub mod predicates;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// An angle in radians.
pub type Angle = f64;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-12;

/// Mean Earth radius in kilometers, used to convert surface distances to
/// angles on the unit sphere.
pub const EARTH_RADIUS_KM: f64 = 6371.01;

/// Converts a distance along the Earth's surface to an angle.
#[must_use]
pub fn km_to_angle(km: f64) -> Angle {
    km / EARTH_RADIUS_KM
}
