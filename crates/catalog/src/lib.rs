pub mod filter;
pub mod poi;
pub mod slug;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use filter::*;
pub use poi::*;

/// Campus dataset shipped with the crate.
pub const BUNDLED_CATALOG_JSON: &str = include_str!("../assets/campus.json");

/// On-disk shape of a catalog asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAsset {
    #[serde(default)]
    pub version: String,
    pub pois: Vec<PoiRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    EmptyName,
    EmptyId,
    DuplicateId(String),
    UnknownCategory(String),
    InvalidCoordinates { lat: f64, lng: f64 },
    InvalidFootprint,
}

/// A catalog entry that violates the data model. Fatal for the whole load.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub index: usize,
    pub name: String,
    pub kind: ValidationErrorKind,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry #{} ({:?}): ", self.index, self.name)?;
        match &self.kind {
            ValidationErrorKind::EmptyName => write!(f, "name is empty"),
            ValidationErrorKind::EmptyId => write!(f, "id is empty"),
            ValidationErrorKind::DuplicateId(id) => write!(f, "duplicate id {id:?}"),
            ValidationErrorKind::UnknownCategory(c) => write!(f, "unknown category {c:?}"),
            ValidationErrorKind::InvalidCoordinates { lat, lng } => {
                write!(f, "coordinates out of range: lat={lat}, lng={lng}")
            }
            ValidationErrorKind::InvalidFootprint => {
                write!(f, "scene footprint must be finite with positive size")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Validation(ValidationError),
    NotFound(String),
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Validation(e) => write!(f, "invalid catalog: {e}"),
            CatalogError::NotFound(id) => write!(f, "no location with id {id:?}"),
            CatalogError::Parse(msg) => write!(f, "catalog asset is not valid JSON: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(e: ValidationError) -> Self {
        CatalogError::Validation(e)
    }
}

/// Read-only, ordered set of campus locations.
///
/// Ordering contract:
/// - iteration yields POIs in asset order; every derived view keeps it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    version: String,
    content_hash: String,
    pois: Vec<PointOfInterest>,
    index: BTreeMap<String, usize>,
}

impl Catalog {
    /// Validates `records` and builds a catalog. Atomic: one bad entry fails
    /// the whole load.
    pub fn load(records: Vec<PoiRecord>) -> Result<Catalog, CatalogError> {
        Self::load_versioned(String::new(), records)
    }

    pub fn load_versioned(
        version: impl Into<String>,
        records: Vec<PoiRecord>,
    ) -> Result<Catalog, CatalogError> {
        let version = version.into();
        let content_hash = hash_records(&version, &records);

        let mut pois = Vec::with_capacity(records.len());
        let mut index = BTreeMap::new();

        for (i, record) in records.into_iter().enumerate() {
            let (id, category) = validate_record(i, &record, &index).inspect_err(|e| {
                warn!("catalog validation failed: {e}");
            })?;
            index.insert(id.as_str().to_string(), i);
            pois.push(PointOfInterest::from_parts(id, record, category));
        }

        info!(
            entries = pois.len(),
            version = %version,
            content_hash = %content_hash,
            "catalog loaded"
        );

        Ok(Catalog {
            version,
            content_hash,
            pois,
            index,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Catalog, CatalogError> {
        let asset: CatalogAsset =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::load_versioned(asset.version, asset.pois)
    }

    pub fn bundled() -> Result<Catalog, CatalogError> {
        Self::from_json_str(BUNDLED_CATALOG_JSON)
    }

    pub fn lookup(&self, id: &str) -> Result<&PointOfInterest, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.index.get(id).map(|&i| &self.pois[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointOfInterest> {
        self.pois.iter()
    }

    pub fn as_slice(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// blake3 hex digest of the asset content; changes whenever any entry does.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a PointOfInterest;
    type IntoIter = std::slice::Iter<'a, PointOfInterest>;

    fn into_iter(self) -> Self::IntoIter {
        self.pois.iter()
    }
}

fn validate_record(
    index: usize,
    record: &PoiRecord,
    seen: &BTreeMap<String, usize>,
) -> Result<(PoiId, Category), ValidationError> {
    let fail = |kind| ValidationError {
        index,
        name: record.name.clone(),
        kind,
    };

    if record.name.trim().is_empty() {
        return Err(fail(ValidationErrorKind::EmptyName));
    }

    let id = match &record.id {
        Some(explicit) => explicit.trim().to_string(),
        None => slug::slugify(&record.name),
    };
    if id.is_empty() {
        return Err(fail(ValidationErrorKind::EmptyId));
    }
    if seen.contains_key(&id) {
        return Err(fail(ValidationErrorKind::DuplicateId(id)));
    }

    let category = record
        .category
        .parse::<Category>()
        .map_err(|e| fail(ValidationErrorKind::UnknownCategory(e.0)))?;

    let location = foundation::math::GeoPoint::new(record.lat, record.lng);
    if !location.is_valid() {
        return Err(fail(ValidationErrorKind::InvalidCoordinates {
            lat: record.lat,
            lng: record.lng,
        }));
    }

    if let Some(footprint) = &record.scene
        && !footprint.is_valid()
    {
        return Err(fail(ValidationErrorKind::InvalidFootprint));
    }

    Ok((PoiId::new(id), category))
}

fn hash_records(version: &str, records: &[PoiRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(version.as_bytes());
    hasher.update(&[0]);
    // Serializing plain data cannot fail; an empty payload still hashes the version.
    let payload = serde_json::to_vec(records).unwrap_or_default();
    hasher.update(&payload);
    hasher.finalize().to_hex().to_string()
}
