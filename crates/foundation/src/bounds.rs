use crate::math::GeoPoint;

/// Axis-aligned lat/lon bounding box (no antimeridian wrapping).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    pub fn new(min: GeoPoint, max: GeoPoint) -> Self {
        GeoBounds { min, max }
    }

    /// Bounds of `points`, or `None` when the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = GeoBounds::new(first, first);
        for p in it {
            b.extend(p);
        }
        Some(b)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.min.lat = self.min.lat.min(p.lat);
        self.min.lon = self.min.lon.min(p.lon);
        self.max.lat = self.max.lat.max(p.lat);
        self.max.lon = self.max.lon.max(p.lon);
    }

    /// Inclusive containment with tolerance `eps` degrees on every side.
    pub fn contains(&self, p: GeoPoint, eps: f64) -> bool {
        p.lat >= self.min.lat - eps
            && p.lat <= self.max.lat + eps
            && p.lon >= self.min.lon - eps
            && p.lon <= self.max.lon + eps
    }
}
