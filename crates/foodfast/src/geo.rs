//! Coordinates and straight-line flight paths.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Ben Thanh market, used when neither a start point nor a branch is given.
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new(10.7769, 106.7009);

/// Tan Son Nhat airport, used when no drop-off point is given.
pub const DEFAULT_DESTINATION: GeoPoint = GeoPoint::new(10.8231, 106.6297);

/// Position after `percent` of the way from `start` to `end`, linear in each component.
///
/// `percent` is not clamped; callers cap progress at 100.
pub fn interpolate(start: GeoPoint, end: GeoPoint, percent: f64) -> GeoPoint {
    let t = percent / 100.0;
    GeoPoint {
        lat: start.lat + (end.lat - start.lat) * t,
        lng: start.lng + (end.lng - start.lng) * t,
    }
}

/// GeoJSON `Point`, coordinates in `[lng, lat]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointRepr", into = "PointRepr")]
pub struct GeoJsonPoint(pub GeoPoint);

#[derive(Serialize, Deserialize)]
struct PointRepr {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl TryFrom<PointRepr> for GeoJsonPoint {
    type Error = String;

    fn try_from(repr: PointRepr) -> Result<Self, Self::Error> {
        if repr.kind != "Point" {
            return Err(format!("expected GeoJSON Point, got {}", repr.kind));
        }
        let [lng, lat] = repr.coordinates;
        Ok(Self(GeoPoint { lat, lng }))
    }
}

impl From<GeoJsonPoint> for PointRepr {
    fn from(point: GeoJsonPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.0.lng, point.0.lat],
        }
    }
}
