//! Geographische Grundtypen: Position, Ausdehnung und Datensatz-Scope.

use serde::{Deserialize, Serialize};

use super::PlacementError;

/// Meter pro Breitengrad (über den Globus nahezu konstant).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Geographische Position in Grad (WGS84) mit Höhe in Metern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Breitengrad in Grad
    pub lat: f64,
    /// Längengrad in Grad
    pub lon: f64,
    /// Höhe über Ellipsoid in Metern
    #[serde(default)]
    pub alt: f64,
}

impl GeoPosition {
    /// Erstellt eine Position aus Breite, Länge und Höhe.
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// Verschiebt die Position um `east_m` Meter nach Osten und `north_m`
    /// Meter nach Norden (äquirektangulär, genau genug für Datensatz-Ausdehnungen).
    pub fn offset_by_meters(&self, east_m: f64, north_m: f64) -> Self {
        let lat = self.lat + north_m / METERS_PER_DEGREE;
        let lon = self.lon + east_m / (METERS_PER_DEGREE * self.lat.to_radians().cos());
        Self {
            lat,
            lon,
            alt: self.alt,
        }
    }
}

/// Reale Ausdehnung eines Datensatzes in Metern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSize {
    /// Ausdehnung Ost-West
    pub x: f64,
    /// Ausdehnung Nord-Süd
    pub y: f64,
}

/// Geographischer Anker und Ausdehnung eines Datensatzes.
///
/// `position` ist die Ecke, auf die sich die Offsets der Tabellendaten beziehen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetScope {
    /// Geographischer Anker
    pub position: GeoPosition,
    /// Ausdehnung in Metern
    pub size: GeoSize,
}

impl DatasetScope {
    /// Prüft Ausdehnung (> 0) und Breitengrad (offenes Intervall (-90, 90)).
    pub fn validate(&self) -> Result<(), PlacementError> {
        let GeoSize { x, y } = self.size;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(PlacementError::invalid_scope(format!(
                "size must be positive, got ({x}, {y})"
            )));
        }

        let lat = self.position.lat;
        if !(lat.is_finite() && lat > -90.0 && lat < 90.0) {
            return Err(PlacementError::invalid_scope(format!(
                "latitude must lie in (-90, 90), got {lat}"
            )));
        }

        if !self.position.lon.is_finite() || !self.position.alt.is_finite() {
            return Err(PlacementError::invalid_scope(
                "longitude and altitude must be finite",
            ));
        }

        Ok(())
    }

    /// Mittelpunkt des Datensatzes (Anker um die halbe Ausdehnung verschoben).
    /// Dient als Kartenzentrum der Oberfläche.
    pub fn center(&self) -> GeoPosition {
        self.position
            .offset_by_meters(self.size.x / 2.0, self.size.y / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scope(lat: f64, x: f64, y: f64) -> DatasetScope {
        DatasetScope {
            position: GeoPosition::new(lat, 4.0, 0.0),
            size: GeoSize { x, y },
        }
    }

    #[test]
    fn test_validate_accepts_regular_scope() {
        assert!(scope(52.0, 1000.0, 800.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_size() {
        assert!(matches!(
            scope(52.0, 0.0, 800.0).validate(),
            Err(PlacementError::InvalidScope { .. })
        ));
        assert!(matches!(
            scope(52.0, 100.0, -1.0).validate(),
            Err(PlacementError::InvalidScope { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_pole_latitude() {
        assert!(scope(90.0, 100.0, 100.0).validate().is_err());
        assert!(scope(-90.0, 100.0, 100.0).validate().is_err());
        assert!(scope(f64::NAN, 100.0, 100.0).validate().is_err());
    }

    #[test]
    fn test_center_at_equator() {
        let center = scope(0.0, 2.0 * METERS_PER_DEGREE, 2.0 * METERS_PER_DEGREE).center();
        assert_relative_eq!(center.lat, 1.0, epsilon = 1e-12);
        assert_relative_eq!(center.lon, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_longitude_widens_with_latitude() {
        let equator = GeoPosition::new(0.0, 0.0, 0.0).offset_by_meters(1000.0, 0.0);
        let north = GeoPosition::new(60.0, 0.0, 0.0).offset_by_meters(1000.0, 0.0);
        // cos(60°) = 0.5 → doppelte Längendifferenz
        assert_relative_eq!(north.lon, equator.lon * 2.0, epsilon = 1e-9);
    }
}
