use foundation::handles::HandleAllocator;
use foundation::math::Vec3;

use crate::components::{ComponentBounds, Drawable3D, Label};
use crate::entity::EntityId;

/// Flat component storage indexed by entity slot.
///
/// Despawned slots are recycled with a bumped generation, so a stale
/// `EntityId` never aliases the new occupant.
#[derive(Debug, Default)]
pub struct World {
    handles: HandleAllocator,
    bounds: Vec<Option<ComponentBounds>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    labels: Vec<Option<Label>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.handles.allocate());
        self.ensure_capacity(id.index() as usize);
        id
    }

    /// Removes `entity` and all its components. Returns `false` if it was
    /// already gone.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.handles.release(entity.0) {
            return false;
        }
        let idx = entity.index() as usize;
        self.bounds[idx] = None;
        self.drawables_3d[idx] = None;
        self.labels[idx] = None;
        true
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.handles.is_live(entity.0)
    }

    pub fn entity_count(&self) -> usize {
        self.handles.live_count()
    }

    pub fn set_bounds(&mut self, entity: EntityId, bounds: ComponentBounds) {
        if let Some(idx) = self.slot(entity) {
            self.bounds[idx] = Some(bounds);
        }
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        if let Some(idx) = self.slot(entity) {
            self.drawables_3d[idx] = Some(drawable);
        }
    }

    pub fn set_label(&mut self, entity: EntityId, label: Label) {
        if let Some(idx) = self.slot(entity) {
            self.labels[idx] = Some(label);
        }
    }

    pub fn bounds(&self, entity: EntityId) -> Option<ComponentBounds> {
        self.slot(entity).and_then(|idx| self.bounds[idx])
    }

    pub fn label(&self, entity: EntityId) -> Option<&Label> {
        self.slot(entity).and_then(|idx| self.labels[idx].as_ref())
    }

    /// Live entities that have both bounds and a drawable, in slot order.
    pub fn drawables_3d(&self) -> Vec<(EntityId, ComponentBounds, Drawable3D)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            let Some(bounds) = self.bounds[idx] else {
                continue;
            };
            let Some(handle) = self.handles.live_handle(idx as u32) else {
                continue;
            };
            out.push((EntityId(handle), bounds, *drawable));
        }
        out
    }

    /// Labels with their world-space anchor above the entity bounds.
    pub fn labels(&self) -> Vec<(EntityId, Vec3, &str)> {
        let mut out = Vec::new();
        for (idx, label) in self.labels.iter().enumerate() {
            let Some(label) = label else { continue };
            let Some(bounds) = self.bounds[idx] else {
                continue;
            };
            let Some(handle) = self.handles.live_handle(idx as u32) else {
                continue;
            };
            let c = bounds.center();
            let anchor = Vec3::new(c.x, bounds.max.y + label.lift, c.z);
            out.push((EntityId(handle), anchor, label.text.as_str()));
        }
        out
    }

    fn slot(&self, entity: EntityId) -> Option<usize> {
        self.is_alive(entity).then_some(entity.index() as usize)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.bounds.len() <= idx {
            let new_len = idx + 1;
            self.bounds.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.labels.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{ComponentBounds, Drawable3D, Label};
    use foundation::math::Vec3;

    fn unit_box(world: &mut World, x: f64) -> crate::entity::EntityId {
        let e = world.spawn();
        world.set_bounds(
            e,
            ComponentBounds::from_base(Vec3::new(x, 0.0, 0.0), 2.0, 2.0, 2.0),
        );
        world.set_drawable_3d(e, Drawable3D::cuboid(2.0, 2.0, 2.0, [1.0; 4]));
        e
    }

    #[test]
    fn spawn_and_collect_drawables() {
        let mut world = World::new();
        let entity = unit_box(&mut world, 0.0);

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
    }

    #[test]
    fn entities_without_bounds_are_not_drawn() {
        let mut world = World::new();
        let e = world.spawn();
        world.set_drawable_3d(e, Drawable3D::cuboid(2.0, 2.0, 2.0, [1.0; 4]));
        world.set_label(e, Label::new("floating"));

        assert!(world.drawables_3d().is_empty());
        assert!(world.labels().is_empty());
    }

    #[test]
    fn despawn_clears_components_and_invalidates_id() {
        let mut world = World::new();
        let a = unit_box(&mut world, 0.0);
        world.set_label(a, Label::new("A"));
        assert!(world.despawn(a));
        assert!(!world.despawn(a));
        assert!(world.drawables_3d().is_empty());
        assert!(world.labels().is_empty());

        let b = unit_box(&mut world, 5.0);
        assert_eq!(b.index(), a.index());
        assert_ne!(b, a);
        assert!(world.bounds(a).is_none());
        assert!(world.bounds(b).is_some());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn label_anchor_floats_above_roof() {
        let mut world = World::new();
        let e = unit_box(&mut world, 4.0);
        world.set_label(e, Label::new("Bibliothèque"));
        let labels = world.labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].1, Vec3::new(4.0, 2.0 + Label::DEFAULT_LIFT, 0.0));
        assert_eq!(labels[0].2, "Bibliothèque");
    }
}
