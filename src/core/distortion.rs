//! Breitengrad-abhängige Verzerrungskorrektur für flächige Overlays.
//!
//! Die Kartenprojektion staucht Ost-West-Distanzen abseits des Äquators.
//! Overlays werden auf einer horizontalen Achse mit `1 / cos(lat)` gestreckt,
//! damit ihre reale Bodenfläche erhalten bleibt.

use std::f64::consts::PI;

use super::DatasetScope;

/// Verzerrungsfaktor für den Breitengrad des Scopes.
///
/// Immer endlich für Breitengrade im offenen Intervall (-90, 90).
pub fn factor(scope: &DatasetScope) -> f64 {
    latitude_factor(scope.position.lat)
}

/// `1 / cos(π · lat / 180)` für einen Breitengrad in Grad.
pub fn latitude_factor(lat_deg: f64) -> f64 {
    1.0 / (PI * lat_deg / 180.0).cos()
}
