use js_sys::{Function, Object, Reflect};
use runtime::{
    Capability, CapabilityUnavailable, ClipboardWriter, FallbackShare, ShareOutcome, SharePayload,
    ShareProvider, UrlOpener,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

fn window(capability: Capability) -> Result<Window, CapabilityUnavailable> {
    web_sys::window().ok_or_else(|| CapabilityUnavailable::new(capability, "no window"))
}

fn describe(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Looks up `target[name]` and returns it if it is callable.
fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Current page URL, used as the shared link.
pub fn page_url() -> Option<String> {
    web_sys::window()?.location().href().ok()
}

/// `window.open(url, "_blank")`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowOpener;

impl UrlOpener for WindowOpener {
    fn open(&self, url: &str) -> Result<(), CapabilityUnavailable> {
        let opened = window(Capability::Navigation)?
            .open_with_url_and_target(url, "_blank")
            .map_err(|e| CapabilityUnavailable::new(Capability::Navigation, describe(e)))?;
        match opened {
            Some(_) => Ok(()),
            None => Err(CapabilityUnavailable::new(
                Capability::Navigation,
                "popup blocked",
            )),
        }
    }
}

/// `navigator.share({title, text, url})`, when the browser has it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigatorShare;

impl ShareProvider for NavigatorShare {
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, CapabilityUnavailable> {
        let navigator: JsValue = window(Capability::Share)?.navigator().into();
        let share = method(&navigator, "share").ok_or_else(|| {
            CapabilityUnavailable::new(Capability::Share, "navigator.share is not available")
        })?;

        let data = Object::new();
        for (key, value) in [
            ("title", payload.title.as_str()),
            ("text", payload.text.as_str()),
            ("url", payload.url.as_str()),
        ] {
            Reflect::set(&data, &JsValue::from_str(key), &JsValue::from_str(value))
                .map_err(|e| CapabilityUnavailable::new(Capability::Share, describe(e)))?;
        }

        // The returned promise is not awaited; a share is a single attempt.
        share
            .call1(&navigator, &data)
            .map(|_| ShareOutcome::Shared)
            .map_err(|e| CapabilityUnavailable::new(Capability::Share, describe(e)))
    }
}

/// `navigator.clipboard.writeText(text)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigatorClipboard;

impl ClipboardWriter for NavigatorClipboard {
    fn write_text(&self, text: &str) -> Result<(), CapabilityUnavailable> {
        let navigator: JsValue = window(Capability::Clipboard)?.navigator().into();
        let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                CapabilityUnavailable::new(Capability::Clipboard, "navigator.clipboard is not available")
            })?;
        let write = method(&clipboard, "writeText").ok_or_else(|| {
            CapabilityUnavailable::new(Capability::Clipboard, "clipboard.writeText is not available")
        })?;
        write
            .call1(&clipboard, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| CapabilityUnavailable::new(Capability::Clipboard, describe(e)))
    }
}

pub fn share_provider() -> FallbackShare<NavigatorShare, NavigatorClipboard> {
    FallbackShare::new(Some(NavigatorShare), NavigatorClipboard)
}
