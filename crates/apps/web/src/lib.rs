use console_error_panic_hook::set_once;
use foundation::math::GeoPoint;
use layers::MarkerRef;
use runtime::{DirectionsLink, NoticeId};
use scene::ViewPreset;
use serde::Serialize;
use wasm_bindgen::prelude::*;

mod browser;
pub mod session;

use browser::{WindowOpener, page_url, share_provider};
use session::{Session, SessionConfig};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

fn parse_view(name: &str) -> Result<ViewPreset, JsValue> {
    match name {
        "home" => Ok(ViewPreset::Home),
        "top" => Ok(ViewPreset::Top),
        "ground" => Ok(ViewPreset::Ground),
        other => Err(JsValue::from_str(&format!("unknown view: {other}"))),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Map and tour state for one page.
///
/// Page scripts construct it once and keep it; every method is one UI event.
/// Structured results come back as JSON strings.
#[wasm_bindgen]
pub struct CampusSession {
    inner: Session,
}

#[wasm_bindgen]
impl CampusSession {
    /// `catalog_json` replaces the bundled dataset; `config_json` overrides
    /// map, tour and share settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        catalog_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<CampusSession, JsValue> {
        let config: SessionConfig = match config_json.as_deref() {
            Some(json) => serde_json::from_str(json).map_err(js_err)?,
            None => SessionConfig::default(),
        };
        let mut inner = Session::from_json(catalog_json.as_deref(), config).map_err(js_err)?;
        if inner.selection().share_config().url.is_empty()
            && let Some(url) = page_url()
        {
            inner.set_share_url(&url);
        }
        Ok(CampusSession { inner })
    }

    pub fn set_filter(&mut self, value: &str) -> Result<(), JsValue> {
        self.inner.set_filter(value).map_err(js_err)
    }

    pub fn set_search(&mut self, text: &str) {
        self.inner.set_search(text);
    }

    pub fn reconcile_map(&mut self) -> Result<String, JsValue> {
        to_json(&self.inner.reconcile_map())
    }

    pub fn reconcile_tour(&mut self) -> Result<String, JsValue> {
        to_json(&self.inner.reconcile_tour())
    }

    pub fn map_snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.inner.map_snapshot())
    }

    pub fn tour_snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.inner.tour_snapshot())
    }

    /// Frames every rendered pin; returns `[south, west, north, east]` or the
    /// home `[lat, lng, zoom]` when nothing is rendered.
    pub fn show_all_on_map(&mut self) -> Vec<f64> {
        frame_array(self.inner.show_all_on_map())
    }

    pub fn reset_map(&mut self) -> Vec<f64> {
        frame_array(self.inner.reset_map())
    }

    /// Moves the tour camera to `home`, `top` or `ground`; returns the pose as
    /// `[px, py, pz, tx, ty, tz]`.
    pub fn tour_view(&mut self, name: &str) -> Result<Vec<f64>, JsValue> {
        let pose = self.inner.tour_view(parse_view(name)?);
        let [px, py, pz] = pose.position.as_array();
        let [tx, ty, tz] = pose.target.as_array();
        Ok(vec![px, py, pz, tx, ty, tz])
    }

    pub fn set_tour_aspect(&mut self, aspect: f64) {
        self.inner.set_tour_aspect(aspect);
    }

    /// Marker click from the map library; returns the detail JSON or `null`.
    pub fn click_marker(&mut self, index: u32, generation: u32) -> Result<String, JsValue> {
        let handle = MarkerRef { index, generation }.into();
        to_json(&self.inner.click_marker(handle))
    }

    pub fn tap_map(&mut self, lat: f64, lng: f64, tolerance_m: f64) -> Result<String, JsValue> {
        to_json(&self.inner.tap_map(GeoPoint::new(lat, lng), tolerance_m))
    }

    pub fn click_viewport(&mut self, ndc_x: f64, ndc_y: f64) -> Result<String, JsValue> {
        to_json(&self.inner.click_viewport(ndc_x, ndc_y))
    }

    pub fn select(&mut self, id: &str) -> Result<String, JsValue> {
        let detail = self.inner.select(id).map_err(js_err)?;
        to_json(&detail)
    }

    pub fn detail_json(&self) -> Result<String, JsValue> {
        to_json(&self.inner.detail())
    }

    pub fn deselect(&mut self) {
        self.inner.deselect();
    }

    /// Opens directions to the selected location. Returns `false` on failure;
    /// the reason is queued as a notice.
    pub fn navigate(&mut self, from_lat: Option<f64>, from_lng: Option<f64>) -> bool {
        let origin = from_lat
            .zip(from_lng)
            .map(|(lat, lng)| GeoPoint::new(lat, lng));
        let provider = DirectionsLink::new(WindowOpener);
        self.inner.navigate(origin, &provider).is_ok()
    }

    /// Shares the selected location; returns `"shared"`, `"copied"` or `null`.
    pub fn share(&mut self) -> Result<String, JsValue> {
        let outcome = self.inner.share(&share_provider()).ok();
        to_json(&outcome)
    }

    /// Returns the id of the notice explaining that traffic is not available.
    pub fn toggle_traffic(&mut self) -> u32 {
        u32::try_from(self.inner.toggle_traffic().0).unwrap_or(u32::MAX)
    }

    pub fn notices_json(&self) -> Result<String, JsValue> {
        to_json(self.inner.notices())
    }

    pub fn dismiss_notice(&mut self, id: u32) -> bool {
        self.inner.dismiss_notice(NoticeId(u64::from(id)))
    }
}

fn frame_array(frame: layers::MapFrame) -> Vec<f64> {
    match frame {
        layers::MapFrame::Center { center, zoom } => vec![center.lat, center.lng, f64::from(zoom)],
        layers::MapFrame::Bounds(b) => vec![
            b.south_west.lat,
            b.south_west.lng,
            b.north_east.lat,
            b.north_east.lng,
        ],
    }
}
