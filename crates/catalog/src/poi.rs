use std::fmt;
use std::str::FromStr;

use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

/// Stable POI identifier, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(String);

impl PoiId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for PoiId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Admin,
    Faculty,
    Service,
    Sports,
    Residence,
    Building,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Admin,
        Category::Faculty,
        Category::Service,
        Category::Sports,
        Category::Residence,
        Category::Building,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Admin => "admin",
            Category::Faculty => "faculty",
            Category::Service => "service",
            Category::Sports => "sports",
            Category::Residence => "residence",
            Category::Building => "building",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category {:?}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Scene-local placement of a POI for the 3D tour: base center plus box size.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Footprint {
    pub fn is_valid(&self) -> bool {
        let all = [self.x, self.y, self.z, self.width, self.height, self.depth];
        all.iter().all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
            && self.depth > 0.0
    }
}

/// Raw catalog entry as it appears in the data asset.
///
/// Only `PointOfInterest` (built by `Catalog::load`) is guaranteed valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<Footprint>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl PoiRecord {
    pub fn new(name: impl Into<String>, category: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            lat,
            lng,
            scene: None,
            description: String::new(),
            facilities: Vec::new(),
            details: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_facilities<I, S>(mut self, facilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facilities = facilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.scene = Some(footprint);
        self
    }
}

/// A validated campus location. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    id: PoiId,
    name: String,
    category: Category,
    lat: f64,
    lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    footprint: Option<Footprint>,
    description: String,
    facilities: Vec<String>,
    details: Vec<String>,
}

impl PointOfInterest {
    pub(crate) fn from_parts(id: PoiId, record: PoiRecord, category: Category) -> Self {
        Self {
            id,
            name: record.name.trim().to_string(),
            category,
            lat: record.lat,
            lng: record.lng,
            footprint: record.scene,
            description: record.description,
            facilities: record.facilities,
            details: record.details,
        }
    }

    pub fn id(&self) -> &PoiId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn footprint(&self) -> Option<&Footprint> {
        self.footprint.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn facilities(&self) -> &[String] {
        &self.facilities
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Footprint};

    #[test]
    fn category_round_trips_through_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
        assert!("library".parse::<Category>().is_err());
        assert!("Faculty".parse::<Category>().is_err());
    }

    #[test]
    fn footprint_rejects_degenerate_sizes() {
        let ok = Footprint {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        };
        assert!(ok.is_valid());
        assert!(!Footprint { height: 0.0, ..ok }.is_valid());
        assert!(!Footprint { x: f64::INFINITY, ..ok }.is_valid());
    }
}
