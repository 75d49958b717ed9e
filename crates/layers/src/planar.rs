use std::collections::{BTreeMap, BTreeSet};

use catalog::{PoiId, PointOfInterest};
use foundation::bounds::GeoBounds;
use foundation::math::GeoPoint;
use foundation::math::precision::stable_total_cmp_f64;
use serde::{Deserialize, Serialize};

use crate::layer::{
    Layer, LayerError, LayerId, MarkerHandle, MarkerLayer, MarkerRef, MarkerRegistry,
    PointerEvent,
};
use crate::symbology::MarkerStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub max_zoom: u8,
}

/// Planar map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    pub home_lat: f64,
    pub home_lng: f64,
    pub home_zoom: u8,
    pub max_zoom: u8,
    pub tile_layers: Vec<TileLayer>,
    /// Fraction of the span added on every side when fitting markers.
    pub fit_padding: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            home_lat: 36.7118,
            home_lng: 4.0458,
            home_zoom: 15,
            max_zoom: 19,
            tile_layers: vec![
                TileLayer {
                    name: "Plan".to_string(),
                    url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: "© OpenStreetMap contributors".to_string(),
                    max_zoom: 19,
                },
                TileLayer {
                    name: "Satellite".to_string(),
                    url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
                    attribution: "© Esri".to_string(),
                    max_zoom: 19,
                },
            ],
            fit_padding: 0.1,
        }
    }
}

impl MapView {
    pub fn home_center(&self) -> GeoPoint {
        GeoPoint::new(self.home_lat, self.home_lng)
    }
}

/// What part of the map is on screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MapFrame {
    Center { center: GeoPoint, zoom: u8 },
    Bounds(GeoBounds),
}

/// Popup content shown when a pin is opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub description: String,
    pub facilities: Vec<String>,
}

impl Popup {
    pub fn for_poi(poi: &PointOfInterest) -> Self {
        Self {
            title: poi.name().to_string(),
            description: poi.description().to_string(),
            facilities: poi.facilities().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub poi: PoiId,
    pub position: GeoPoint,
    pub style: MarkerStyle,
    pub popup: Popup,
}

/// Serializable view of one pin, for page scripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinSnapshot {
    pub marker: MarkerRef,
    pub poi: PoiId,
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
    pub popup: Popup,
    pub popup_open: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PlanarSnapshot {
    pub pins: Vec<PinSnapshot>,
}

/// The 2D campus map: one round pin per POI at its geographic position.
#[derive(Debug, Clone)]
pub struct PlanarMapLayer {
    id: LayerId,
    view: MapView,
    frame: MapFrame,
    registry: MarkerRegistry,
    pins: BTreeMap<MarkerHandle, Pin>,
    open_popups: BTreeSet<MarkerHandle>,
}

impl PlanarMapLayer {
    pub fn new(id: u64, view: MapView) -> Self {
        let frame = MapFrame::Center {
            center: view.home_center(),
            zoom: view.home_zoom,
        };
        Self {
            id: LayerId(id),
            view,
            frame,
            registry: MarkerRegistry::new(),
            pins: BTreeMap::new(),
            open_popups: BTreeSet::new(),
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn frame(&self) -> MapFrame {
        self.frame
    }

    pub fn pin(&self, handle: MarkerHandle) -> Option<&Pin> {
        self.pins.get(&handle)
    }

    pub fn reset_view(&mut self) -> MapFrame {
        self.frame = MapFrame::Center {
            center: self.view.home_center(),
            zoom: self.view.home_zoom,
        };
        self.frame
    }

    /// Frames every rendered pin with the configured padding.
    ///
    /// With nothing rendered the frame is left unchanged.
    pub fn fit_rendered(&mut self) -> MapFrame {
        if let Some(bounds) = GeoBounds::from_points(self.pins.values().map(|p| p.position)) {
            self.frame = MapFrame::Bounds(bounds.pad(self.view.fit_padding));
        }
        self.frame
    }

    /// Opens the popup of every rendered pin, as a search result list does.
    pub fn open_popups(&mut self) {
        self.open_popups = self.pins.keys().copied().collect();
    }

    pub fn close_popups(&mut self) {
        self.open_popups.clear();
    }

    pub fn is_popup_open(&self, handle: MarkerHandle) -> bool {
        self.open_popups.contains(&handle)
    }

    pub fn snapshot(&self) -> PlanarSnapshot {
        PlanarSnapshot {
            pins: self
                .pins
                .iter()
                .map(|(handle, pin)| PinSnapshot {
                    marker: (*handle).into(),
                    poi: pin.poi.clone(),
                    lat: pin.position.lat,
                    lng: pin.position.lng,
                    color: pin.style.hex,
                    popup: pin.popup.clone(),
                    popup_open: self.open_popups.contains(handle),
                })
                .collect(),
        }
    }

    fn nearest_within(&self, at: GeoPoint, tolerance_m: f64) -> Option<&Pin> {
        if !at.is_valid() || !tolerance_m.is_finite() || tolerance_m < 0.0 {
            return None;
        }
        let mut best: Option<(f64, MarkerHandle)> = None;
        for (handle, pin) in &self.pins {
            let d_m = at.distance_km(&pin.position) * 1000.0;
            if d_m.is_nan() || d_m > tolerance_m {
                continue;
            }
            best = match best {
                None => Some((d_m, *handle)),
                Some((bd, bh)) => {
                    let ord = stable_total_cmp_f64(d_m, bd).then_with(|| handle.cmp(&bh));
                    if ord.is_lt() {
                        Some((d_m, *handle))
                    } else {
                        Some((bd, bh))
                    }
                }
            };
        }
        let (_, handle) = best?;
        self.pins.get(&handle)
    }
}

impl Layer for PlanarMapLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

impl MarkerLayer for PlanarMapLayer {
    fn render(&mut self, poi: &PointOfInterest) -> Result<MarkerHandle, LayerError> {
        if let Some(existing) = self.registry.handle_for(poi.id().as_str()) {
            return Ok(existing);
        }
        let position = poi.location();
        if !position.is_valid() {
            return Err(LayerError::Unplaceable(poi.id().clone()));
        }
        let handle = self
            .registry
            .insert(poi.id().clone())
            .ok_or_else(|| LayerError::Unplaceable(poi.id().clone()))?;
        self.pins.insert(
            handle,
            Pin {
                poi: poi.id().clone(),
                position,
                style: MarkerStyle::for_category(poi.category()),
                popup: Popup::for_poi(poi),
            },
        );
        Ok(handle)
    }

    fn remove(&mut self, handle: MarkerHandle) -> bool {
        if self.registry.remove(handle).is_none() {
            return false;
        }
        self.pins.remove(&handle);
        self.open_popups.remove(&handle);
        true
    }

    /// Marker clicks resolve directly; map taps pick the nearest pin within
    /// tolerance, lower handle first on equal distance.
    fn hit_test(&self, event: &PointerEvent) -> Option<PoiId> {
        match *event {
            PointerEvent::MarkerClicked(handle) => self.registry.poi_for(handle).cloned(),
            PointerEvent::MapTap { at, tolerance_m } => self
                .nearest_within(at, tolerance_m)
                .map(|pin| pin.poi.clone()),
            PointerEvent::Viewport { .. } => None,
        }
    }

    fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }
}
