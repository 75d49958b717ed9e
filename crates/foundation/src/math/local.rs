use super::{GeoPoint, Vec3};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Local East-North-Up offset in meters from a ground anchor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

/// Earth-centered position of a point on the ellipsoid surface.
pub fn surface_ecef(p: GeoPoint) -> Vec3 {
    let (sin_lat, cos_lat) = p.lat.to_radians().sin_cos();
    let (sin_lng, cos_lng) = p.lng.to_radians().sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vec3::new(
        n * cos_lat * cos_lng,
        n * cos_lat * sin_lng,
        n * (1.0 - WGS84_E2) * sin_lat,
    )
}

/// Ground-level ENU offset of `point` relative to `origin`.
pub fn geo_to_enu(point: GeoPoint, origin: GeoPoint) -> Enu {
    let d = surface_ecef(point) - surface_ecef(origin);
    let (sin_lat, cos_lat) = origin.lat.to_radians().sin_cos();
    let (sin_lng, cos_lng) = origin.lng.to_radians().sin_cos();

    Enu {
        east: -sin_lng * d.x + cos_lng * d.y,
        north: -sin_lat * cos_lng * d.x - sin_lat * sin_lng * d.y + cos_lat * d.z,
        up: cos_lat * cos_lng * d.x + cos_lat * sin_lng * d.y + sin_lat * d.z,
    }
}
