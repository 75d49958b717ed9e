use catalog::{Catalog, CatalogError, CategoryFilter, FilterState, UnknownCategory};
use foundation::math::GeoPoint;
use layers::{
    MapFrame, MapView, MarkerHandle, MarkerLayer, PlanarMapLayer, PlanarSnapshot,
    PointerEvent, ReconcileReport, SceneLayer, TourSnapshot,
};
use runtime::{
    LocationDetail, NavigationProvider, Notice, NoticeId, RequestError, SelectionController,
    ShareConfig, ShareOutcome, ShareProvider, activate,
};
use scene::{CameraPose, TourConfig, ViewPreset};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TRAFFIC_NOTICE: &str = "Fonctionnalité trafic bientôt disponible";

const MAP_LAYER: u64 = 1;
const TOUR_LAYER: u64 = 2;

/// Page-supplied overrides; every field falls back to the campus defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub map: MapView,
    pub tour: TourConfig,
    pub share: ShareConfig,
    /// Initial viewport aspect ratio of the tour canvas.
    pub aspect: f64,
}

/// One page's map and tour state, owned by whoever drives the UI loop.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    filter: FilterState,
    map: PlanarMapLayer,
    tour: SceneLayer,
    selection: SelectionController,
}

impl Session {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        let aspect = if config.aspect > 0.0 {
            config.aspect
        } else {
            16.0 / 9.0
        };
        Self {
            catalog,
            filter: FilterState::default(),
            map: PlanarMapLayer::new(MAP_LAYER, config.map),
            tour: SceneLayer::new(TOUR_LAYER, config.tour, aspect),
            selection: SelectionController::new(config.share),
        }
    }

    pub fn from_json(catalog_json: Option<&str>, config: SessionConfig) -> Result<Self, CatalogError> {
        let catalog = match catalog_json {
            Some(json) => Catalog::from_json_str(json)?,
            None => Catalog::bundled()?,
        };
        Ok(Self::new(catalog, config))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn set_share_url(&mut self, url: &str) {
        self.selection.set_share_url(url);
    }

    /// Sets the category from a filter button value (`all` or a category).
    pub fn set_filter(&mut self, value: &str) -> Result<(), UnknownCategory> {
        self.selection.next_frame();
        self.filter.category = value.parse::<CategoryFilter>()?;
        Ok(())
    }

    pub fn set_search(&mut self, text: &str) {
        self.selection.next_frame();
        self.filter.search = text.to_string();
    }

    /// Renders the visible pins. While a search is active every match shows
    /// its popup.
    pub fn reconcile_map(&mut self) -> ReconcileReport {
        let visible = self.filter.visible(&self.catalog);
        let report = self.map.reconcile(&visible);
        if self.filter.search.trim().is_empty() {
            self.map.close_popups();
        } else {
            self.map.open_popups();
        }
        report
    }

    pub fn reconcile_tour(&mut self) -> ReconcileReport {
        let visible = self.filter.visible(&self.catalog);
        self.tour.reconcile(&visible)
    }

    pub fn map_snapshot(&self) -> PlanarSnapshot {
        self.map.snapshot()
    }

    pub fn tour_snapshot(&self) -> TourSnapshot {
        self.tour.snapshot()
    }

    pub fn reset_map(&mut self) -> MapFrame {
        self.map.reset_view()
    }

    pub fn show_all_on_map(&mut self) -> MapFrame {
        self.map.fit_rendered()
    }

    pub fn tour_view(&mut self, preset: ViewPreset) -> CameraPose {
        self.tour.apply_preset(preset)
    }

    pub fn set_tour_aspect(&mut self, aspect: f64) {
        self.tour.set_aspect(aspect);
    }

    pub fn click_marker(&mut self, handle: MarkerHandle) -> Option<LocationDetail> {
        self.pointer_on_map(PointerEvent::MarkerClicked(handle))
    }

    pub fn tap_map(&mut self, at: GeoPoint, tolerance_m: f64) -> Option<LocationDetail> {
        self.pointer_on_map(PointerEvent::MapTap { at, tolerance_m })
    }

    /// Resolves a tour click and, on a hit, also flies the camera to it.
    pub fn click_viewport(&mut self, ndc_x: f64, ndc_y: f64) -> Option<LocationDetail> {
        self.selection.next_frame();
        let event = PointerEvent::Viewport { ndc_x, ndc_y };
        let detail = activate(&self.tour, &event, &self.catalog, &mut self.selection)?;
        self.tour.focus(detail.id.as_str());
        Some(detail)
    }

    /// Selects by id, e.g. from a list entry outside the views.
    pub fn select(&mut self, id: &str) -> Result<LocationDetail, CatalogError> {
        self.selection.next_frame();
        let detail = self.selection.select_id(&self.catalog, id)?;
        self.tour.focus(id);
        Ok(detail)
    }

    pub fn detail(&self) -> Option<LocationDetail> {
        self.selection.detail(&self.catalog)
    }

    pub fn deselect(&mut self) {
        self.selection.next_frame();
        self.selection.deselect();
    }

    pub fn navigate(
        &mut self,
        origin: Option<GeoPoint>,
        provider: &dyn NavigationProvider,
    ) -> Result<(), RequestError> {
        self.selection.next_frame();
        self.selection
            .request_navigation(&self.catalog, origin, provider)
    }

    pub fn share(&mut self, provider: &dyn ShareProvider) -> Result<ShareOutcome, RequestError> {
        self.selection.next_frame();
        self.selection.request_share(&self.catalog, provider)
    }

    /// The traffic overlay is not available yet; the toggle only says so.
    pub fn toggle_traffic(&mut self) -> NoticeId {
        self.selection.next_frame();
        self.selection.inform(TRAFFIC_NOTICE)
    }

    pub fn notices(&self) -> &[Notice] {
        self.selection.notices().notices()
    }

    pub fn dismiss_notice(&mut self, id: NoticeId) -> bool {
        self.selection.dismiss(id)
    }

    fn pointer_on_map(&mut self, event: PointerEvent) -> Option<LocationDetail> {
        let frame = self.selection.next_frame();
        let detail = activate(&self.map, &event, &self.catalog, &mut self.selection);
        debug!(frame = frame.index, hit = detail.is_some(), "map pointer");
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionConfig, TRAFFIC_NOTICE};
    use catalog::{CategoryFilter, Category};
    use foundation::math::GeoPoint;
    use layers::MarkerLayer;
    use runtime::{
        Capability, CapabilityUnavailable, ClipboardWriter, FallbackShare, NavigationProvider,
        NoticeKind, ShareOutcome, SharePayload, ShareProvider,
    };
    use std::cell::RefCell;

    fn session() -> Session {
        let mut s = Session::from_json(None, SessionConfig::default()).expect("session");
        s.reconcile_map();
        s.reconcile_tour();
        s
    }

    struct Blocked;

    impl NavigationProvider for Blocked {
        fn navigate(&self, _: Option<GeoPoint>, _: GeoPoint) -> Result<(), CapabilityUnavailable> {
            Err(CapabilityUnavailable::new(Capability::Navigation, "popup blocked"))
        }
    }

    struct NoShare;

    impl ShareProvider for NoShare {
        fn share(&self, _: &SharePayload) -> Result<ShareOutcome, CapabilityUnavailable> {
            Err(CapabilityUnavailable::new(Capability::Share, "missing"))
        }
    }

    #[derive(Default)]
    struct Clipboard(RefCell<Vec<String>>);

    impl ClipboardWriter for Clipboard {
        fn write_text(&self, text: &str) -> Result<(), CapabilityUnavailable> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn filter_then_reconcile_shrinks_both_views() {
        let mut s = session();
        s.set_filter("sports").expect("filter");
        assert_eq!(s.filter().category, CategoryFilter::Only(Category::Sports));
        let map = s.reconcile_map();
        let tour = s.reconcile_tour();
        assert!(map.added.is_empty());
        assert_eq!(map.removed, tour.removed);
        assert_eq!(s.map_snapshot().pins.len(), s.tour_snapshot().boxes.len());

        assert!(s.set_filter("cafeteria").is_err());
        assert_eq!(s.filter().category, CategoryFilter::Only(Category::Sports));
    }

    #[test]
    fn search_narrows_rendered_markers() {
        let mut s = session();
        s.set_search("biblioth");
        s.reconcile_map();
        let pins = s.map_snapshot().pins;
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].poi.as_str(), "library");
        assert!(pins[0].popup_open);

        s.set_search("  ");
        s.reconcile_map();
        let pins = s.map_snapshot().pins;
        assert!(pins.len() > 1);
        assert!(pins.iter().all(|p| !p.popup_open));
    }

    #[test]
    fn traffic_toggle_only_raises_a_notice() {
        let mut s = session();
        let before = s.map_snapshot();
        let id = s.toggle_traffic();
        let notices = s.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id, id);
        assert_eq!(notices[0].kind, NoticeKind::Info);
        assert_eq!(notices[0].message, TRAFFIC_NOTICE);
        assert_eq!(s.map_snapshot(), before);
        assert!(s.detail().is_none());
    }

    #[test]
    fn marker_click_then_share_falls_back_to_clipboard() {
        let mut s = session();
        s.set_share_url("https://campus.example/maps");
        let pin = s.map_snapshot().pins[0].clone();
        let detail = s.click_marker(pin.marker.into()).expect("detail");
        assert_eq!(detail.id, pin.poi);

        let share = FallbackShare::new(Some(NoShare), Clipboard::default());
        assert_eq!(s.share(&share), Ok(ShareOutcome::Copied));
        let notices = s.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Info);
    }

    #[test]
    fn blocked_navigation_keeps_selection() {
        let mut s = session();
        s.select("library").expect("select");
        assert!(s.navigate(None, &Blocked).is_err());
        assert_eq!(s.detail().expect("detail").id.as_str(), "library");
        let id = s.notices()[0].id;
        assert!(s.dismiss_notice(id));
        assert!(s.notices().is_empty());
    }

    #[test]
    fn viewport_click_selects_and_focuses() {
        let mut s = session();
        s.select("library").expect("focus via select");
        s.deselect();
        assert!(s.detail().is_none());

        let detail = s.click_viewport(0.0, 0.0).expect("hit");
        assert_eq!(detail.id.as_str(), "library");
        assert!(s.tour.handle_for("library").is_some());
    }

    #[test]
    fn stale_marker_after_filter_resolves_to_nothing() {
        let mut s = session();
        let handle = s.map.handle_for("library").expect("handle");
        s.set_filter("sports").expect("filter");
        s.reconcile_map();
        assert!(s.click_marker(handle).is_none());
        assert!(s.detail().is_none());
    }
}
