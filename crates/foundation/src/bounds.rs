use crate::math::GeoPoint;

/// Geographic bounding box (degrees), the shape mapping libraries expect for
/// "fit to bounds".
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn from_point(p: GeoPoint) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut out = Self::from_point(iter.next()?);
        for p in iter {
            out.extend(p);
        }
        Some(out)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    /// Grows the box by `ratio` of its span on every side.
    pub fn pad(&self, ratio: f64) -> Self {
        let d_lat = (self.north_east.lat - self.south_west.lat) * ratio;
        let d_lng = (self.north_east.lng - self.south_west.lng) * ratio;
        Self {
            south_west: GeoPoint::new(self.south_west.lat - d_lat, self.south_west.lng - d_lng),
            north_east: GeoPoint::new(self.north_east.lat + d_lat, self.north_east.lng + d_lng),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) * 0.5,
            (self.south_west.lng + self.north_east.lng) * 0.5,
        )
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}
