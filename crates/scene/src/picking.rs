use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::camera::PerspectiveCamera;
use crate::components::ComponentBounds;
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

impl PickOptions {
    pub fn for_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            max_distance: camera.far,
        }
    }
}

/// Deterministic ray picking against every drawable box in `world`.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple entities are hit at the same distance, the lower `EntityId::index()` wins.
///
/// Notes:
/// - Intersection uses entity bounds, seen from outside only: a box that
///   contains the ray origin is skipped, as with front-face raycasting.
/// - Despawned entities never match.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;
    let origin = ray.origin.as_array();
    let dir_a = dir.as_array();

    let mut best: Option<(f64, EntityId)> = None;

    for (entity, bounds, _drawable) in world.drawables_3d() {
        if bounds.contains(ray.origin) {
            continue;
        }
        let Some(t) = ray_aabb_hit_t(origin, dir_a, bounds, 0.0, opts.max_distance) else {
            continue;
        };

        best = match best {
            None => Some((t, entity)),
            Some((bt, be)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| entity.index().cmp(&be.index()));
                if ord.is_lt() {
                    Some((t, entity))
                } else {
                    Some((bt, be))
                }
            }
        };
    }

    let (t, entity) = best?;
    Some(PickHit {
        entity,
        distance: t,
        point: Ray::new(ray.origin, dir).at(t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies a deterministic screen->ray mapping via `make_ray`.
pub fn pick_screen<F>(
    world: &World,
    x_px: f64,
    y_px: f64,
    mut make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(world, ray, opts)
}

fn ray_aabb_hit_t(
    origin: [f64; 3],
    dir: [f64; 3],
    bounds: ComponentBounds,
    mut t_min: f64,
    mut t_max: f64,
) -> Option<f64> {
    // Slabs intersection; returns entry distance.
    let min = bounds.min.as_array();
    let max = bounds.max.as_array();
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];

        if d.abs() < 1e-12 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min[axis] - o) * inv;
        let mut t2 = (max[axis] - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }

    Some(t_min.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_ray, pick_screen};
    use crate::World;
    use crate::camera::{CameraPose, PerspectiveCamera, TourConfig};
    use crate::components::{ComponentBounds, Drawable3D};
    use crate::entity::EntityId;
    use foundation::math::Vec3;

    fn spawn_box(world: &mut World, min: Vec3, max: Vec3) -> EntityId {
        let e = world.spawn();
        world.set_bounds(e, ComponentBounds::new(min, max));
        world.set_drawable_3d(e, Drawable3D::cuboid(1.0, 1.0, 1.0, [1.0; 4]));
        e
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let mut world = World::new();
        let a = spawn_box(
            &mut world,
            Vec3::new(4.0, -1.0, -1.0),
            Vec3::new(6.0, 1.0, 1.0),
        );
        let _b = spawn_box(
            &mut world,
            Vec3::new(9.0, -1.0, -1.0),
            Vec3::new(11.0, 1.0, 1.0),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, a);
        assert_eq!(hit.distance, 4.0);
        assert_eq!(hit.point, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn tie_breaks_by_entity_index() {
        let mut world = World::new();
        let first = spawn_box(
            &mut world,
            Vec3::new(4.0, -1.0, -1.0),
            Vec3::new(6.0, 1.0, 1.0),
        );
        let _second = spawn_box(
            &mut world,
            Vec3::new(4.0, -1.0, -1.0),
            Vec3::new(6.0, 1.0, 1.0),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, first);
    }

    #[test]
    fn entities_behind_the_origin_are_ignored() {
        let mut world = World::new();
        let _behind = spawn_box(
            &mut world,
            Vec3::new(-6.0, -1.0, -1.0),
            Vec3::new(-4.0, 1.0, 1.0),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());
    }

    #[test]
    fn box_around_the_origin_does_not_occlude() {
        let mut world = World::new();
        let _around = spawn_box(
            &mut world,
            Vec3::new(-8.0, -1.0, -8.0),
            Vec3::new(8.0, 8.0, 8.0),
        );
        let ahead = spawn_box(
            &mut world,
            Vec3::new(12.0, -1.0, -1.0),
            Vec3::new(14.0, 1.0, 1.0),
        );

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, -0.1, 0.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, ahead);
        assert!(hit.distance > 12.0);
    }

    #[test]
    fn max_distance_limits_hits() {
        let mut world = World::new();
        spawn_box(
            &mut world,
            Vec3::new(40.0, -1.0, -1.0),
            Vec3::new(60.0, 1.0, 1.0),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let opts = PickOptions { max_distance: 10.0 };
        assert!(pick_ray(&world, ray, opts).is_none());
    }

    #[test]
    fn screen_center_hits_box_under_camera_target() {
        let mut world = World::new();
        let target = spawn_box(
            &mut world,
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(5.0, 8.0, 5.0),
        );
        let config = TourConfig::default();
        let cam = PerspectiveCamera::new(
            CameraPose::new(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO),
            &config,
            1.0,
        );

        let hit = pick_screen(
            &world,
            400.0,
            400.0,
            |x, y| {
                let (nx, ny) = PerspectiveCamera::ndc_from_pixels(x, y, 800.0, 800.0);
                cam.ray_from_ndc(nx, ny)
            },
            PickOptions::for_camera(&cam),
        )
        .expect("hit");
        assert_eq!(hit.entity, target);
    }
}
