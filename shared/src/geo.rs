//! Geographic primitives.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Latitude in decimal degrees
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// True when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// An axis-aligned geographic window.
///
/// Used both as the particle query filter sent to the backend and as the
/// drawing extent for density rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Check that the box is finite and ordered on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_lon.is_finite()
            && self.max_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lat.is_finite()
            && self.min_lon < self.max_lon
            && self.min_lat < self.max_lat
    }

    pub fn contains(&self, position: LonLat) -> bool {
        position.lon >= self.min_lon
            && position.lon <= self.max_lon
            && position.lat >= self.min_lat
            && position.lat <= self.max_lat
    }

    /// Map a position into normalized [0,1] coordinates within the box.
    ///
    /// Positions outside the box map outside [0,1]; callers that bin into a
    /// grid clamp to the grid edges.
    pub fn normalize(&self, position: LonLat) -> (f64, f64) {
        let x = (position.lon - self.min_lon) / (self.max_lon - self.min_lon);
        let y = (position.lat - self.min_lat) / (self.max_lat - self.min_lat);
        (x, y)
    }
}

impl Default for BoundingBox {
    /// The patrol area the original viewer queried particles for.
    fn default() -> Self {
        Self {
            min_lon: -35.3,
            max_lon: -34.9,
            min_lat: -9.35,
            max_lat: -8.9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lon_lat_finite() {
        assert!(LonLat::new(-35.0, -9.0).is_finite());
        assert!(!LonLat::new(f64::NAN, -9.0).is_finite());
        assert!(!LonLat::new(-35.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_bounding_box_valid() {
        assert!(BoundingBox::default().is_valid());
        assert!(!BoundingBox::new(-34.9, -35.3, -9.35, -8.9).is_valid());
        assert!(!BoundingBox::new(-35.3, -34.9, -8.9, -9.35).is_valid());
        assert!(!BoundingBox::new(f64::NAN, -34.9, -9.35, -8.9).is_valid());
    }

    #[test]
    fn test_contains() {
        let bounds = BoundingBox::default();
        assert!(bounds.contains(LonLat::new(-35.0, -9.0)));
        assert!(!bounds.contains(LonLat::new(-34.0, -9.0)));
        assert!(!bounds.contains(LonLat::new(-35.0, -10.0)));
    }

    #[test]
    fn test_normalize() {
        let bounds = BoundingBox::new(0.0, 10.0, 0.0, 5.0);
        let (x, y) = bounds.normalize(LonLat::new(5.0, 5.0));
        assert_relative_eq!(x, 0.5);
        assert_relative_eq!(y, 1.0);

        let (x, _) = bounds.normalize(LonLat::new(-5.0, 0.0));
        assert_relative_eq!(x, -0.5);
    }
}
