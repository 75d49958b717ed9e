use std::fmt;

use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Navigation,
    Share,
    Clipboard,
}

impl Capability {
    /// User-facing name, in the campus site's language.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Navigation => "Itinéraire",
            Capability::Share => "Partage",
            Capability::Clipboard => "Presse-papiers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::Navigation => "navigation",
            Capability::Share => "share",
            Capability::Clipboard => "clipboard",
        };
        f.write_str(s)
    }
}

/// An external capability was missing or refused the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityUnavailable {
    pub capability: Capability,
    pub reason: String,
}

impl CapabilityUnavailable {
    pub fn new(capability: Capability, reason: impl Into<String>) -> Self {
        Self {
            capability,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CapabilityUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unavailable: {}", self.capability, self.reason)
    }
}

impl std::error::Error for CapabilityUnavailable {}

/// Directions link for an external map service.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionsUrl {
    pub origin: Option<GeoPoint>,
    pub destination: GeoPoint,
}

impl DirectionsUrl {
    pub const BASE: &'static str = "https://www.google.com/maps/dir/?api=1";

    pub fn new(origin: Option<GeoPoint>, destination: GeoPoint) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

impl fmt::Display for DirectionsUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}&destination={},{}",
            Self::BASE,
            self.destination.lat,
            self.destination.lng
        )?;
        if let Some(o) = self.origin {
            write!(f, "&origin={},{}", o.lat, o.lng)?;
        }
        Ok(())
    }
}

pub trait NavigationProvider {
    fn navigate(
        &self,
        origin: Option<GeoPoint>,
        destination: GeoPoint,
    ) -> Result<(), CapabilityUnavailable>;
}

/// Opens a URL in a new browsing context.
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<(), CapabilityUnavailable>;
}

/// Navigation through a directions link opened by `O`.
#[derive(Debug, Clone)]
pub struct DirectionsLink<O> {
    opener: O,
}

impl<O: UrlOpener> DirectionsLink<O> {
    pub fn new(opener: O) -> Self {
        Self { opener }
    }
}

impl<O: UrlOpener> NavigationProvider for DirectionsLink<O> {
    fn navigate(
        &self,
        origin: Option<GeoPoint>,
        destination: GeoPoint,
    ) -> Result<(), CapabilityUnavailable> {
        self.opener
            .open(&DirectionsUrl::new(origin, destination).to_string())
    }
}

/// Share text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Page URL to share; empty means the caller fills it in.
    pub url: String,
    pub title_prefix: String,
    /// `{name}` is replaced by the location name.
    pub text_template: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            title_prefix: "UMMTO - ".to_string(),
            text_template: "Découvrez {name} sur le campus UMMTO".to_string(),
        }
    }
}

impl ShareConfig {
    pub fn payload(&self, name: &str) -> SharePayload {
        SharePayload {
            name: name.to_string(),
            title: format!("{}{}", self.title_prefix, name),
            text: self.text_template.replace("{name}", name),
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub name: String,
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    /// Text written to the clipboard when the platform cannot share.
    pub fn clipboard_text(&self) -> String {
        format!("{} - {}", self.name, self.url)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareOutcome {
    Shared,
    Copied,
}

pub trait ShareProvider {
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, CapabilityUnavailable>;
}

pub trait ClipboardWriter {
    fn write_text(&self, text: &str) -> Result<(), CapabilityUnavailable>;
}

/// Platform share when present, clipboard copy otherwise.
#[derive(Debug, Clone)]
pub struct FallbackShare<P, C> {
    platform: Option<P>,
    clipboard: C,
}

impl<P, C> FallbackShare<P, C> {
    pub fn new(platform: Option<P>, clipboard: C) -> Self {
        Self {
            platform,
            clipboard,
        }
    }
}

impl<P: ShareProvider, C: ClipboardWriter> ShareProvider for FallbackShare<P, C> {
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, CapabilityUnavailable> {
        if let Some(platform) = &self.platform {
            match platform.share(payload) {
                Ok(outcome) => return Ok(outcome),
                Err(err) => tracing::debug!(%err, "platform share failed, copying instead"),
            }
        }
        self.clipboard
            .write_text(&payload.clipboard_text())
            .map(|()| ShareOutcome::Copied)
    }
}
