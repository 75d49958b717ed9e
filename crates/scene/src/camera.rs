use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::picking::Ray;

/// Where the camera sits and what it looks at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    fn from_arrays(position: [f64; 3], target: [f64; 3]) -> Self {
        Self::new(
            Vec3::new(position[0], position[1], position[2]),
            Vec3::new(target[0], target[1], target[2]),
        )
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    Home,
    Top,
    Ground,
}

/// Tour camera and scene-placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub home_position: [f64; 3],
    pub home_target: [f64; 3],
    pub top_position: [f64; 3],
    pub top_target: [f64; 3],
    pub ground_position: [f64; 3],
    pub ground_target: [f64; 3],
    /// Camera offset from a focused location's base.
    pub focus_offset: [f64; 3],
    /// Look-at height above a focused location's base.
    pub focus_lift: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Geographic anchor of the scene origin, used to place locations that
    /// have no explicit scene footprint.
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub units_per_meter: f64,
    /// Box size `[width, height, depth]` for projected locations.
    pub default_size: [f64; 3],
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            home_position: [50.0, 30.0, 50.0],
            home_target: [0.0, 0.0, 0.0],
            top_position: [0.0, 100.0, 0.0],
            top_target: [0.0, 0.0, 0.0],
            ground_position: [0.0, 2.0, 0.0],
            ground_target: [10.0, 0.0, 0.0],
            focus_offset: [20.0, 15.0, 20.0],
            focus_lift: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
            origin_lat: 36.7118,
            origin_lng: 4.0458,
            units_per_meter: 0.35,
            default_size: [12.0, 10.0, 12.0],
        }
    }
}

impl TourConfig {
    pub fn preset(&self, preset: ViewPreset) -> CameraPose {
        match preset {
            ViewPreset::Home => CameraPose::from_arrays(self.home_position, self.home_target),
            ViewPreset::Top => CameraPose::from_arrays(self.top_position, self.top_target),
            ViewPreset::Ground => CameraPose::from_arrays(self.ground_position, self.ground_target),
        }
    }

    /// Pose looking at a location whose base sits at `base`.
    pub fn focus_on(&self, base: Vec3) -> CameraPose {
        let [ox, oy, oz] = self.focus_offset;
        CameraPose::new(
            Vec3::new(base.x + ox, base.y + oy, base.z + oz),
            Vec3::new(base.x, base.y + self.focus_lift, base.z),
        )
    }

    /// Pulls or pushes the camera along its view line so the orbit distance
    /// stays within `[min_distance, max_distance]`.
    pub fn clamp_orbit(&self, pose: CameraPose) -> CameraPose {
        let offset = pose.position - pose.target;
        let d = offset.length();
        let Some(dir) = offset.normalized() else {
            return pose;
        };
        let clamped = d.clamp(self.min_distance, self.max_distance);
        if clamped == d {
            return pose;
        }
        CameraPose::new(pose.target + dir.scale(clamped), pose.target)
    }
}

/// Perspective camera with a Y-up convention.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub pose: CameraPose,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub fn new(pose: CameraPose, config: &TourConfig, aspect: f64) -> Self {
        Self {
            pose,
            fov_y_deg: config.fov_y_deg,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// Ray from the eye through a point in normalized device coordinates
    /// (`x`, `y` in [-1, 1], `y` up).
    ///
    /// Returns `None` when the eye sits on the target.
    pub fn ray_from_ndc(&self, ndc_x: f64, ndc_y: f64) -> Option<Ray> {
        let forward = (self.pose.target - self.pose.position).normalized()?;
        // Looking straight down or up: screen-right is +X.
        let right = forward
            .cross(Vec3::UP)
            .normalized()
            .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);

        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir = forward
            + right.scale(ndc_x * tan_half * self.aspect)
            + up.scale(ndc_y * tan_half);
        Some(Ray::new(self.pose.position, dir.normalized()?))
    }

    /// Converts a pointer position in pixels to normalized device coordinates.
    pub fn ndc_from_pixels(x_px: f64, y_px: f64, width_px: f64, height_px: f64) -> (f64, f64) {
        (
            (x_px / width_px) * 2.0 - 1.0,
            -(y_px / height_px) * 2.0 + 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraPose, PerspectiveCamera, TourConfig, ViewPreset};
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn center_ray_points_at_target() {
        let config = TourConfig::default();
        let cam = PerspectiveCamera::new(config.preset(ViewPreset::Home), &config, 16.0 / 9.0);
        let ray = cam.ray_from_ndc(0.0, 0.0).expect("ray");
        let expected = Vec3::new(-50.0, -30.0, -50.0).normalized().expect("dir");
        assert_close(ray.dir.x, expected.x, 1e-12);
        assert_close(ray.dir.y, expected.y, 1e-12);
        assert_close(ray.dir.z, expected.z, 1e-12);
    }

    #[test]
    fn top_view_ray_still_resolves() {
        let config = TourConfig::default();
        let cam = PerspectiveCamera::new(config.preset(ViewPreset::Top), &config, 1.0);
        let ray = cam.ray_from_ndc(0.5, 0.5).expect("ray");
        assert!(ray.dir.y < 0.0);
    }

    #[test]
    fn right_edge_ray_leans_right() {
        let config = TourConfig::default();
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let cam = PerspectiveCamera::new(pose, &config, 1.0);
        let ray = cam.ray_from_ndc(1.0, 0.0).expect("ray");
        assert!(ray.dir.x > 0.0);
        assert_close(ray.dir.y, 0.0, 1e-12);
    }

    #[test]
    fn ndc_from_pixels_maps_corners() {
        assert_eq!(
            PerspectiveCamera::ndc_from_pixels(0.0, 0.0, 800.0, 600.0),
            (-1.0, 1.0)
        );
        assert_eq!(
            PerspectiveCamera::ndc_from_pixels(400.0, 300.0, 800.0, 600.0),
            (0.0, 0.0)
        );
    }

    #[test]
    fn focus_pose_offsets_from_base() {
        let config = TourConfig::default();
        let pose = config.focus_on(Vec3::new(25.0, 0.0, 15.0));
        assert_eq!(pose.position, Vec3::new(45.0, 15.0, 35.0));
        assert_eq!(pose.target, Vec3::new(25.0, 5.0, 15.0));
    }

    #[test]
    fn orbit_distance_is_clamped() {
        let config = TourConfig::default();
        let far = CameraPose::new(Vec3::new(0.0, 500.0, 0.0), Vec3::ZERO);
        assert_close(config.clamp_orbit(far).distance(), 200.0, 1e-9);

        let near = CameraPose::new(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert_close(config.clamp_orbit(near).distance(), 10.0, 1e-9);

        let home = config.preset(ViewPreset::Home);
        assert_eq!(config.clamp_orbit(home), home);
    }
}
