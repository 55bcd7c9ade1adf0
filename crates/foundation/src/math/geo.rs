use serde::{Deserialize, Serialize};

/// Inclusive latitude range in degrees.
pub const LAT_RANGE_DEG: (f64, f64) = (-90.0, 90.0);
/// Inclusive longitude range in degrees.
pub const LON_RANGE_DEG: (f64, f64) = (-180.0, 180.0);

/// Metres per degree used by the planar drill-down offset.
///
/// This is a flat approximation, not a geodesic one: the same scale is
/// applied to latitude and longitude regardless of where the origin sits.
pub const PLANAR_METRES_PER_DEGREE: f64 = 10_000.0;

/// Geographic point in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Why a raw coordinate pair cannot be placed on the globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InvalidCoordinate {
    /// NaN or infinite latitude/longitude.
    NonFinite,
    /// Finite but outside `[-90, 90]` x `[-180, 180]`.
    OutOfRange,
}

impl std::fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidCoordinate::NonFinite => write!(f, "coordinate is not finite"),
            InvalidCoordinate::OutOfRange => write!(f, "coordinate is out of range"),
        }
    }
}

impl std::error::Error for InvalidCoordinate {}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Classifies a raw pair. Values are never clamped or coerced here.
    pub fn validate(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate::NonFinite);
        }
        if lat < LAT_RANGE_DEG.0 || lat > LAT_RANGE_DEG.1 {
            return Err(InvalidCoordinate::OutOfRange);
        }
        if lon < LON_RANGE_DEG.0 || lon > LON_RANGE_DEG.1 {
            return Err(InvalidCoordinate::OutOfRange);
        }
        Ok(Self { lat, lon })
    }

    pub fn is_valid(self) -> bool {
        Self::validate(self.lat, self.lon).is_ok()
    }
}

/// Euclidean distance in (lat, lon) degree space.
///
/// Not a great-circle distance: one degree of longitude counts the same as
/// one degree of latitude, so distances are overstated near the poles.
pub fn degree_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.lat - b.lat;
    let dlon = a.lon - b.lon;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Offsets `origin` by metre distances using the flat
/// [`PLANAR_METRES_PER_DEGREE`] scale on both axes.
///
/// The resulting latitude is clamped to the valid range and the longitude is
/// wrapped across the antimeridian, so the output is always a valid point.
pub fn planar_offset(origin: GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    let lat = origin.lat + north_m / PLANAR_METRES_PER_DEGREE;
    let lon = origin.lon + east_m / PLANAR_METRES_PER_DEGREE;
    GeoPoint::new(
        lat.clamp(LAT_RANGE_DEG.0, LAT_RANGE_DEG.1),
        wrap_longitude(lon),
    )
}

/// Wraps a finite longitude into `[-180, 180]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    if (LON_RANGE_DEG.0..=LON_RANGE_DEG.1).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 onto -180; keep the sign of the input there.
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, InvalidCoordinate, degree_distance, planar_offset, wrap_longitude};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn validate_accepts_inclusive_bounds() {
        assert!(GeoPoint::validate(90.0, 180.0).is_ok());
        assert!(GeoPoint::validate(-90.0, -180.0).is_ok());
        assert!(GeoPoint::validate(0.0, 0.0).is_ok());
    }

    #[test]
    fn validate_classifies_failures() {
        assert_eq!(
            GeoPoint::validate(f64::NAN, 0.0),
            Err(InvalidCoordinate::NonFinite)
        );
        assert_eq!(
            GeoPoint::validate(0.0, f64::INFINITY),
            Err(InvalidCoordinate::NonFinite)
        );
        assert_eq!(
            GeoPoint::validate(90.5, 0.0),
            Err(InvalidCoordinate::OutOfRange)
        );
        assert_eq!(
            GeoPoint::validate(0.0, -180.01),
            Err(InvalidCoordinate::OutOfRange)
        );
    }

    #[test]
    fn degree_distance_is_euclidean() {
        let d = degree_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(3.0, 4.0));
        assert_close(d, 5.0, 1e-12);
    }

    #[test]
    fn planar_offset_uses_flat_scale() {
        let p = planar_offset(GeoPoint::new(10.0, 20.0), 10_000.0, -20_000.0);
        assert_close(p.lat, 8.0, 1e-12);
        assert_close(p.lon, 21.0, 1e-12);
    }

    #[test]
    fn planar_offset_stays_on_the_globe() {
        let p = planar_offset(GeoPoint::new(85.0, 175.0), 100_000.0, 100_000.0);
        assert_eq!(p.lat, 90.0);
        assert_close(p.lon, -175.0, 1e-9);
        assert!(p.is_valid());
    }

    #[test]
    fn wrap_longitude_handles_edges() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_close(wrap_longitude(190.0), -170.0, 1e-12);
        assert_close(wrap_longitude(-190.0), 170.0, 1e-12);
        assert_eq!(wrap_longitude(540.0), 180.0);
    }
}
