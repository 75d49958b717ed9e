use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use catalog::{PoiId, PointOfInterest};
use foundation::handles::{Handle, HandleAllocator};
use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// Opaque reference to one rendered marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub Handle);

impl MarkerHandle {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// A `MarkerHandle` as page scripts see it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRef {
    pub index: u32,
    pub generation: u32,
}

impl From<MarkerHandle> for MarkerRef {
    fn from(h: MarkerHandle) -> Self {
        Self {
            index: h.0.index(),
            generation: h.0.generation(),
        }
    }
}

impl From<MarkerRef> for MarkerHandle {
    fn from(r: MarkerRef) -> Self {
        MarkerHandle(Handle::new(r.index, r.generation))
    }
}

/// A pointer interaction in one of the views.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    /// The rendering surface reported a click on a specific marker.
    MarkerClicked(MarkerHandle),
    /// A tap on the planar map; resolves to the nearest pin within `tolerance_m`.
    MapTap { at: GeoPoint, tolerance_m: f64 },
    /// A click in the 3D viewport, in normalized device coordinates.
    Viewport { ndc_x: f64, ndc_y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// The POI has no usable position in this view's coordinate system.
    Unplaceable(PoiId),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::Unplaceable(id) => write!(f, "location {id} cannot be placed in this view"),
        }
    }
}

impl std::error::Error for LayerError {}

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<PoiId>,
    pub removed: Vec<PoiId>,
    /// Visible POIs this view could not place; they stay unrendered.
    pub unplaced: Vec<PoiId>,
}

impl ReconcileReport {
    /// True when nothing was added or removed. Unplaced POIs are retried on
    /// every pass, so they do not count as a change.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Explicit marker handle <-> POI id mapping.
///
/// Markers carry no payload; every click is resolved through this table.
#[derive(Debug, Default, Clone)]
pub struct MarkerRegistry {
    handles: HandleAllocator,
    by_handle: BTreeMap<MarkerHandle, PoiId>,
    by_poi: BTreeMap<PoiId, MarkerHandle>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a marker for `id`. Returns `None` if `id` already has one.
    pub fn insert(&mut self, id: PoiId) -> Option<MarkerHandle> {
        if self.by_poi.contains_key(&id) {
            return None;
        }
        let handle = MarkerHandle(self.handles.allocate());
        self.by_handle.insert(handle, id.clone());
        self.by_poi.insert(id, handle);
        Some(handle)
    }

    pub fn remove(&mut self, handle: MarkerHandle) -> Option<PoiId> {
        let id = self.by_handle.remove(&handle)?;
        self.by_poi.remove(&id);
        self.handles.release(handle.0);
        Some(id)
    }

    pub fn poi_for(&self, handle: MarkerHandle) -> Option<&PoiId> {
        self.by_handle.get(&handle)
    }

    pub fn handle_for(&self, id: &str) -> Option<MarkerHandle> {
        self.by_poi.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Live markers in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerHandle, &PoiId)> {
        self.by_handle.iter().map(|(h, id)| (*h, id))
    }
}

/// Shared contract of the planar map and the 3D tour views.
pub trait MarkerLayer: Layer {
    /// Creates exactly one marker for `poi`, or returns the existing one.
    fn render(&mut self, poi: &PointOfInterest) -> Result<MarkerHandle, LayerError>;

    /// Removes a marker. Returns `false` if it was not rendered.
    fn remove(&mut self, handle: MarkerHandle) -> bool;

    /// Resolves a pointer interaction to at most one POI.
    fn hit_test(&self, event: &PointerEvent) -> Option<PoiId>;

    fn registry(&self) -> &MarkerRegistry;

    fn handle_for(&self, id: &str) -> Option<MarkerHandle> {
        self.registry().handle_for(id)
    }

    fn rendered_ids(&self) -> BTreeSet<PoiId> {
        self.registry().iter().map(|(_, id)| id.clone()).collect()
    }

    /// Brings the rendered set in line with `visible`.
    ///
    /// Markers whose POI left the set are removed, POIs that entered it are
    /// rendered, and everything already rendered is left untouched. A second
    /// call with the same set changes nothing.
    ///
    /// A POI that cannot be placed is listed in `unplaced` and the pass goes
    /// on with the rest.
    ///
    /// Ordering contract:
    /// - `removed` follows marker handle order; `added` and `unplaced` follow `visible`.
    fn reconcile(&mut self, visible: &[&PointOfInterest]) -> ReconcileReport {
        let wanted: BTreeSet<&str> = visible.iter().map(|p| p.id().as_str()).collect();

        let stale: Vec<(MarkerHandle, PoiId)> = self
            .registry()
            .iter()
            .filter(|(_, id)| !wanted.contains(id.as_str()))
            .map(|(h, id)| (h, id.clone()))
            .collect();

        let mut report = ReconcileReport::default();
        for (handle, id) in stale {
            if self.remove(handle) {
                report.removed.push(id);
            }
        }

        for poi in visible {
            if self.handle_for(poi.id().as_str()).is_some() {
                continue;
            }
            match self.render(poi) {
                Ok(_) => report.added.push(poi.id().clone()),
                Err(e) => {
                    warn!(layer = self.id().0, "{e}");
                    report.unplaced.push(poi.id().clone());
                }
            }
        }

        debug!(
            layer = self.id().0,
            added = report.added.len(),
            removed = report.removed.len(),
            unplaced = report.unplaced.len(),
            rendered = self.registry().len(),
            "reconciled markers"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerRegistry;
    use catalog::PoiId;

    #[test]
    fn registry_maps_both_ways() {
        let mut reg = MarkerRegistry::new();
        let a = reg.insert(PoiId::new("lib")).expect("insert");
        let b = reg.insert(PoiId::new("sci")).expect("insert");
        assert_ne!(a, b);
        assert_eq!(reg.poi_for(a), Some(&PoiId::new("lib")));
        assert_eq!(reg.handle_for("sci"), Some(b));
        assert!(reg.insert(PoiId::new("lib")).is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn removed_handle_never_resolves_again() {
        let mut reg = MarkerRegistry::new();
        let a = reg.insert(PoiId::new("lib")).expect("insert");
        assert_eq!(reg.remove(a), Some(PoiId::new("lib")));
        assert_eq!(reg.remove(a), None);

        let b = reg.insert(PoiId::new("sci")).expect("insert");
        assert_eq!(a.index(), b.index());
        assert!(reg.poi_for(a).is_none());
        assert_eq!(reg.poi_for(b), Some(&PoiId::new("sci")));
    }
}
