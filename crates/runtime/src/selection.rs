use std::fmt;

use catalog::{Catalog, CatalogError, Category, PoiId, PointOfInterest};
use foundation::math::GeoPoint;
use layers::{MarkerLayer, PointerEvent, category_hex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::event_bus::{EventBus, NoticeId, NoticeKind};
use crate::frame::Frame;
use crate::providers::{
    CapabilityUnavailable, NavigationProvider, ShareConfig, ShareOutcome, ShareProvider,
};

pub const COPIED_NOTICE: &str = "Lien copié dans le presse-papiers";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(PoiId),
}

/// Everything the detail panel shows for the selected location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDetail {
    pub id: PoiId,
    pub name: String,
    pub category: Category,
    pub color: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub facilities: Vec<String>,
    pub details: Vec<String>,
}

impl LocationDetail {
    pub fn of(poi: &PointOfInterest) -> Self {
        let location = poi.location();
        Self {
            id: poi.id().clone(),
            name: poi.name().to_string(),
            category: poi.category(),
            color: category_hex(poi.category()),
            lat: location.lat,
            lng: location.lng,
            description: poi.description().to_string(),
            facilities: poi.facilities().to_vec(),
            details: poi.details().to_vec(),
        }
    }
}

/// Why a navigation or share request did nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    NothingSelected,
    NotFound(PoiId),
    Unavailable(CapabilityUnavailable),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NothingSelected => f.write_str("no location is selected"),
            RequestError::NotFound(id) => write!(f, "location {id} is not in the catalog"),
            RequestError::Unavailable(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Unavailable(e) => Some(e),
            _ => None,
        }
    }
}

/// Owns the single current selection and the notices raised by UI events.
///
/// States are `Idle` and `Selected`; selecting while selected replaces the
/// current location without passing through `Idle`. Hook failures leave the
/// state untouched and raise exactly one notice.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
    frame: Frame,
    notices: EventBus,
    share: ShareConfig,
}

impl SelectionController {
    pub fn new(share: ShareConfig) -> Self {
        Self {
            share,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn current(&self) -> Option<&PoiId> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected(id) => Some(id),
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Starts handling the next UI event.
    pub fn next_frame(&mut self) -> Frame {
        self.frame = self.frame.next();
        self.frame
    }

    pub fn notices(&self) -> &EventBus {
        &self.notices
    }

    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        self.notices.dismiss(id)
    }

    /// Raises an info notice in the current frame.
    pub fn inform(&mut self, message: impl Into<String>) -> NoticeId {
        self.notices.emit(self.frame, NoticeKind::Info, message)
    }

    pub fn share_config(&self) -> &ShareConfig {
        &self.share
    }

    pub fn set_share_url(&mut self, url: impl Into<String>) {
        self.share.url = url.into();
    }

    pub fn select(&mut self, poi: &PointOfInterest) -> LocationDetail {
        debug!(frame = self.frame.index, from = ?self.current(), to = %poi.id(), "select");
        self.state = SelectionState::Selected(poi.id().clone());
        LocationDetail::of(poi)
    }

    /// Selects by id. An unknown id raises a notice and keeps the current state.
    pub fn select_id(&mut self, catalog: &Catalog, id: &str) -> Result<LocationDetail, CatalogError> {
        match catalog.lookup(id) {
            Ok(poi) => Ok(self.select(poi)),
            Err(err) => {
                self.notices
                    .emit(self.frame, NoticeKind::NotFound, format!("Lieu introuvable: {id}"));
                Err(err)
            }
        }
    }

    pub fn deselect(&mut self) {
        if self.state != SelectionState::Idle {
            debug!(frame = self.frame.index, "deselect");
        }
        self.state = SelectionState::Idle;
    }

    pub fn detail(&self, catalog: &Catalog) -> Option<LocationDetail> {
        let id = self.current()?;
        catalog.get(id.as_str()).map(LocationDetail::of)
    }

    pub fn request_navigation(
        &mut self,
        catalog: &Catalog,
        origin: Option<GeoPoint>,
        provider: &dyn NavigationProvider,
    ) -> Result<(), RequestError> {
        let poi = self.selected(catalog)?;
        let destination = poi.location();
        provider
            .navigate(origin, destination)
            .map_err(|e| self.unavailable(e))
    }

    pub fn request_share(
        &mut self,
        catalog: &Catalog,
        provider: &dyn ShareProvider,
    ) -> Result<ShareOutcome, RequestError> {
        let poi = self.selected(catalog)?;
        let payload = self.share.payload(poi.name());
        let outcome = provider.share(&payload).map_err(|e| self.unavailable(e))?;
        if outcome == ShareOutcome::Copied {
            self.notices.emit(self.frame, NoticeKind::Info, COPIED_NOTICE);
        }
        Ok(outcome)
    }

    fn selected<'c>(&self, catalog: &'c Catalog) -> Result<&'c PointOfInterest, RequestError> {
        let id = self.current().ok_or(RequestError::NothingSelected)?;
        catalog
            .get(id.as_str())
            .ok_or_else(|| RequestError::NotFound(id.clone()))
    }

    fn unavailable(&mut self, err: CapabilityUnavailable) -> RequestError {
        warn!(frame = self.frame.index, capability = %err.capability, reason = %err.reason, "capability unavailable");
        self.notices.emit(
            self.frame,
            NoticeKind::CapabilityUnavailable,
            format!("{} indisponible", err.capability.label()),
        );
        RequestError::Unavailable(err)
    }
}

/// Resolves a pointer event on `layer` and, on a hit, selects that location.
pub fn activate<L: MarkerLayer + ?Sized>(
    layer: &L,
    event: &PointerEvent,
    catalog: &Catalog,
    controller: &mut SelectionController,
) -> Option<LocationDetail> {
    let id = layer.hit_test(event)?;
    controller.select_id(catalog, id.as_str()).ok()
}
