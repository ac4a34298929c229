//! Feature-Record: eine validierte Zeile der Tabellendaten.

use serde::{Deserialize, Serialize};

/// Eine Zeile der Tabellendaten, bereits semantisch zugeordnet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Offset nach Osten in Metern (relativ zum Scope-Anker)
    pub offset_x: f64,
    /// Offset nach Norden in Metern (relativ zum Scope-Anker)
    pub offset_y: f64,
    /// Dritter Wert, bei Gebäuden die Höhe in Metern
    pub height: f64,
    /// Zeilennummer in der Quelldatei (0-basiert)
    pub line: usize,
}

impl FeatureRecord {
    /// Erstellt einen Record ohne Zeilenbezug (Zeile 0).
    pub fn new(offset_x: f64, offset_y: f64, height: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            height,
            line: 0,
        }
    }
}
