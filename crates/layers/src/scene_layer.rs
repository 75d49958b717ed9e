use std::collections::BTreeMap;

use catalog::{PoiId, PointOfInterest};
use foundation::math::{GeoPoint, Vec3, geo_to_enu};
use scene::components::{ComponentBounds, Drawable3D, Label};
use scene::entity::EntityId;
use scene::picking::{PickOptions, pick_ray};
use scene::{CameraPose, PerspectiveCamera, TourConfig, ViewPreset, World};
use serde::Serialize;

use crate::layer::{
    Layer, LayerError, LayerId, MarkerHandle, MarkerLayer, MarkerRef, MarkerRegistry,
    PointerEvent,
};
use crate::symbology::MarkerStyle;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Building {
    entity: EntityId,
    base: Vec3,
    style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSnapshot {
    pub marker: MarkerRef,
    pub poi: PoiId,
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSnapshot {
    pub poi: PoiId,
    pub text: String,
    pub anchor: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourSnapshot {
    pub camera: CameraSnapshot,
    pub boxes: Vec<BoxSnapshot>,
    pub labels: Vec<LabelSnapshot>,
}

/// The 3D campus tour: one colored box per POI with a floating name label.
///
/// POIs with a scene footprint are placed as authored; the rest are projected
/// from their geographic position through a local East-North-Up frame
/// anchored at `TourConfig::origin_*` (east to +x, north to -z).
#[derive(Debug)]
pub struct SceneLayer {
    id: LayerId,
    config: TourConfig,
    aspect: f64,
    pose: CameraPose,
    world: World,
    registry: MarkerRegistry,
    buildings: BTreeMap<MarkerHandle, Building>,
    by_entity: BTreeMap<EntityId, MarkerHandle>,
}

impl SceneLayer {
    pub fn new(id: u64, config: TourConfig, aspect: f64) -> Self {
        let pose = config.preset(ViewPreset::Home);
        Self {
            id: LayerId(id),
            config,
            aspect,
            pose,
            world: World::new(),
            registry: MarkerRegistry::new(),
            buildings: BTreeMap::new(),
            by_entity: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::new(self.pose, &self.config, self.aspect)
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Moves the camera, keeping the orbit distance within the configured limits.
    pub fn set_pose(&mut self, pose: CameraPose) -> CameraPose {
        self.pose = self.config.clamp_orbit(pose);
        self.pose
    }

    pub fn apply_preset(&mut self, preset: ViewPreset) -> CameraPose {
        self.pose = self.config.preset(preset);
        self.pose
    }

    pub fn reset_view(&mut self) -> CameraPose {
        self.apply_preset(ViewPreset::Home)
    }

    pub fn top_view(&mut self) -> CameraPose {
        self.apply_preset(ViewPreset::Top)
    }

    pub fn ground_view(&mut self) -> CameraPose {
        self.apply_preset(ViewPreset::Ground)
    }

    /// Points the camera at a rendered POI. Returns `None` if it is not rendered.
    pub fn focus(&mut self, id: &str) -> Option<CameraPose> {
        let handle = self.registry.handle_for(id)?;
        let base = self.buildings.get(&handle)?.base;
        self.pose = self.config.focus_on(base);
        Some(self.pose)
    }

    /// Scene placement of `poi`: base center and `[width, height, depth]`.
    pub fn placement(&self, poi: &PointOfInterest) -> Result<(Vec3, [f64; 3]), LayerError> {
        if let Some(fp) = poi.footprint() {
            if !fp.is_valid() {
                return Err(LayerError::Unplaceable(poi.id().clone()));
            }
            return Ok((
                Vec3::new(fp.x, fp.y, fp.z),
                [fp.width, fp.height, fp.depth],
            ));
        }

        let origin = GeoPoint::new(self.config.origin_lat, self.config.origin_lng);
        let location = poi.location();
        if !location.is_valid() || !origin.is_valid() {
            return Err(LayerError::Unplaceable(poi.id().clone()));
        }
        let enu = geo_to_enu(location, origin);
        let k = self.config.units_per_meter;
        let base = Vec3::new(enu.east * k, 0.0, -enu.north * k);
        if !base.is_finite() {
            return Err(LayerError::Unplaceable(poi.id().clone()));
        }
        Ok((base, self.config.default_size))
    }

    pub fn snapshot(&self) -> TourSnapshot {
        let boxes = self
            .buildings
            .iter()
            .filter_map(|(handle, b)| {
                let bounds = self.world.bounds(b.entity)?;
                let poi = self.registry.poi_for(*handle)?;
                Some(BoxSnapshot {
                    marker: (*handle).into(),
                    poi: poi.clone(),
                    min: bounds.min.as_array(),
                    max: bounds.max.as_array(),
                    color: b.style.hex,
                })
            })
            .collect();

        let labels = self
            .world
            .labels()
            .into_iter()
            .filter_map(|(entity, anchor, text)| {
                let handle = self.by_entity.get(&entity)?;
                let poi = self.registry.poi_for(*handle)?;
                Some(LabelSnapshot {
                    poi: poi.clone(),
                    text: text.to_string(),
                    anchor: anchor.as_array(),
                })
            })
            .collect();

        TourSnapshot {
            camera: CameraSnapshot {
                position: self.pose.position.as_array(),
                target: self.pose.target.as_array(),
            },
            boxes,
            labels,
        }
    }

    fn pick_viewport(&self, ndc_x: f64, ndc_y: f64) -> Option<PoiId> {
        let camera = self.camera();
        let ray = camera.ray_from_ndc(ndc_x, ndc_y)?;
        let hit = pick_ray(&self.world, ray, PickOptions::for_camera(&camera))?;
        let handle = self.by_entity.get(&hit.entity)?;
        self.registry.poi_for(*handle).cloned()
    }
}

impl Layer for SceneLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

impl MarkerLayer for SceneLayer {
    fn render(&mut self, poi: &PointOfInterest) -> Result<MarkerHandle, LayerError> {
        if let Some(existing) = self.registry.handle_for(poi.id().as_str()) {
            return Ok(existing);
        }
        let (base, [width, height, depth]) = self.placement(poi)?;
        let handle = self
            .registry
            .insert(poi.id().clone())
            .ok_or_else(|| LayerError::Unplaceable(poi.id().clone()))?;

        let style = MarkerStyle::for_category(poi.category());
        let entity = self.world.spawn();
        self.world
            .set_bounds(entity, ComponentBounds::from_base(base, width, height, depth));
        self.world
            .set_drawable_3d(entity, Drawable3D::cuboid(width, height, depth, style.color));
        self.world.set_label(entity, Label::new(poi.name()));

        self.buildings.insert(
            handle,
            Building {
                entity,
                base,
                style,
            },
        );
        self.by_entity.insert(entity, handle);
        Ok(handle)
    }

    fn remove(&mut self, handle: MarkerHandle) -> bool {
        if self.registry.remove(handle).is_none() {
            return false;
        }
        if let Some(b) = self.buildings.remove(&handle) {
            self.by_entity.remove(&b.entity);
            self.world.despawn(b.entity);
        }
        true
    }

    /// Viewport clicks cast a ray from the camera and take the nearest box;
    /// equal distances go to the lower entity index.
    fn hit_test(&self, event: &PointerEvent) -> Option<PoiId> {
        match *event {
            PointerEvent::MarkerClicked(handle) => self.registry.poi_for(handle).cloned(),
            PointerEvent::Viewport { ndc_x, ndc_y } => self.pick_viewport(ndc_x, ndc_y),
            PointerEvent::MapTap { .. } => None,
        }
    }

    fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::SceneLayer;
    use crate::layer::{MarkerLayer, PointerEvent};
    use catalog::{Catalog, Footprint, PoiId, PoiRecord};
    use foundation::math::Vec3;
    use scene::{CameraPose, TourConfig};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn fp(x: f64, z: f64, w: f64, h: f64, d: f64) -> Footprint {
        Footprint {
            x,
            y: 0.0,
            z,
            width: w,
            height: h,
            depth: d,
        }
    }

    fn catalog() -> Catalog {
        Catalog::load(vec![
            PoiRecord::new("Entrée Principale", "admin", 36.7118, 4.0458)
                .with_id("entrance")
                .with_footprint(fp(0.0, 0.0, 15.0, 8.0, 12.0)),
            PoiRecord::new("Bibliothèque Centrale", "service", 36.7122, 4.0460)
                .with_id("library")
                .with_footprint(fp(15.0, 5.0, 20.0, 12.0, 15.0)),
            PoiRecord::new("Faculté de Droit", "faculty", 36.7110, 4.0445).with_id("droit"),
        ])
        .expect("load")
    }

    fn rendered(c: &Catalog) -> SceneLayer {
        let mut layer = SceneLayer::new(2, TourConfig::default(), 1.0);
        let all: Vec<_> = c.iter().collect();
        layer.reconcile(&all);
        layer
    }

    #[test]
    fn one_box_and_label_per_poi() {
        let c = catalog();
        let layer = rendered(&c);
        let snap = layer.snapshot();
        assert_eq!(snap.boxes.len(), 3);
        assert_eq!(snap.labels.len(), 3);
        assert_eq!(layer.world().entity_count(), 3);
        let entrance = snap
            .boxes
            .iter()
            .find(|b| b.poi.as_str() == "entrance")
            .expect("entrance");
        assert_eq!(entrance.min, [-7.5, 0.0, -6.0]);
        assert_eq!(entrance.max, [7.5, 8.0, 6.0]);
        assert_eq!(entrance.color, "#e74c3c");
    }

    #[test]
    fn unplaceable_poi_does_not_stop_the_pass() {
        let c = catalog();
        let config = TourConfig {
            origin_lat: f64::NAN,
            ..TourConfig::default()
        };
        let mut layer = SceneLayer::new(2, config, 1.0);
        let all: Vec<_> = c.iter().collect();

        let report = layer.reconcile(&all);
        assert_eq!(report.added, vec![PoiId::new("entrance"), PoiId::new("library")]);
        assert_eq!(report.unplaced, vec![PoiId::new("droit")]);
        assert_eq!(layer.world().entity_count(), 2);

        let again = layer.reconcile(&all);
        assert!(again.is_noop());
        assert_eq!(again.unplaced, vec![PoiId::new("droit")]);
    }

    #[test]
    fn projected_poi_lands_south_west_of_origin() {
        let c = catalog();
        let layer = SceneLayer::new(2, TourConfig::default(), 1.0);
        let (base, size) = layer.placement(c.lookup("droit").expect("droit")).expect("place");
        // South-west of the entrance: negative east, positive z (south).
        assert!(base.x < 0.0);
        assert!(base.z > 0.0);
        assert_eq!(base.y, 0.0);
        assert_eq!(size, [12.0, 10.0, 12.0]);
    }

    #[test]
    fn viewport_center_picks_box_under_target() {
        let c = catalog();
        let mut layer = rendered(&c);
        layer.set_pose(CameraPose::new(Vec3::new(0.0, 60.0, 0.1), Vec3::ZERO));
        let hit = layer.hit_test(&PointerEvent::Viewport {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        assert_eq!(hit, Some(PoiId::new("entrance")));
    }

    #[test]
    fn ground_view_sees_past_the_box_around_the_eye() {
        let c = catalog();
        let mut layer = rendered(&c);
        // The ground eye at (0, 2, 0) stands inside the entrance box.
        layer.ground_view();
        let hit = layer.hit_test(&PointerEvent::Viewport {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        assert_eq!(hit, Some(PoiId::new("library")));
    }

    #[test]
    fn viewport_click_on_empty_ground_is_none() {
        let c = catalog();
        let mut layer = rendered(&c);
        layer.set_pose(CameraPose::new(Vec3::new(0.0, 60.0, 0.1), Vec3::ZERO));
        let hit = layer.hit_test(&PointerEvent::Viewport {
            ndc_x: 0.0,
            ndc_y: 1.0,
        });
        assert_eq!(hit, None);
    }

    #[test]
    fn nearest_box_wins_along_the_ray() {
        let c = catalog();
        let mut layer = rendered(&c);
        // Looking along -z at eye height through the library, then the entrance behind it.
        layer.set_pose(CameraPose::new(
            Vec3::new(7.0, 4.0, 60.0),
            Vec3::new(7.0, 4.0, 0.0),
        ));
        let hit = layer.hit_test(&PointerEvent::Viewport {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        assert_eq!(hit, Some(PoiId::new("library")));
    }

    #[test]
    fn removed_box_is_not_pickable() {
        let c = catalog();
        let mut layer = rendered(&c);
        layer.set_pose(CameraPose::new(Vec3::new(0.0, 60.0, 0.1), Vec3::ZERO));
        let handle = layer.handle_for("entrance").expect("handle");
        assert!(layer.remove(handle));
        assert_eq!(layer.world().entity_count(), 2);
        assert_eq!(
            layer.hit_test(&PointerEvent::Viewport {
                ndc_x: 0.0,
                ndc_y: 0.0
            }),
            None
        );
        assert_eq!(layer.hit_test(&PointerEvent::MarkerClicked(handle)), None);
    }

    #[test]
    fn focus_and_presets_move_camera() {
        let c = catalog();
        let mut layer = rendered(&c);
        let pose = layer.focus("library").expect("focus");
        assert_eq!(pose.position, Vec3::new(35.0, 15.0, 25.0));
        assert_eq!(pose.target, Vec3::new(15.0, 5.0, 5.0));
        assert!(layer.focus("nowhere").is_none());

        let top = layer.top_view();
        assert_eq!(top.position, Vec3::new(0.0, 100.0, 0.0));
        let home = layer.reset_view();
        assert_eq!(home.position, Vec3::new(50.0, 30.0, 50.0));
        assert_eq!(layer.ground_view().target, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn set_pose_clamps_orbit_distance() {
        let c = catalog();
        let mut layer = rendered(&c);
        let pose = layer.set_pose(CameraPose::new(Vec3::new(0.0, 900.0, 0.0), Vec3::ZERO));
        assert_close(pose.distance(), 200.0, 1e-9);
    }
}
