//! Datensatz-Kategorien und ihre festen Namen in der Szene.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kategorie eines Datensatzes. Bestimmt Holder-Name und Platzierungsart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Gebäude aus Tabellendaten (ein Feature pro Zeile)
    Buildings,
    /// Strahlungsfeld als flächiges Raster-Overlay
    Radiation,
    /// Wolken aus Windgeschwindigkeits-Daten als Raster-Overlay
    Clouds,
}

impl Category {
    /// Alle Kategorien in Aufbau-Reihenfolge einer vollständigen Szene.
    pub const BUILD_ORDER: [Category; 3] =
        [Category::Buildings, Category::Clouds, Category::Radiation];

    /// Name des Holder-Knotens unter der Oberfläche.
    pub fn holder_name(self) -> &'static str {
        match self {
            Category::Buildings => "Building Holder",
            Category::Radiation => "Radiation Holder",
            Category::Clouds => "Cloud Holder",
        }
    }

    /// `true` für flächige Raster-Overlays (Strahlung, Wolken).
    pub fn is_overlay(self) -> bool {
        !matches!(self, Category::Buildings)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Buildings => "buildings",
            Category::Radiation => "radiation",
            Category::Clouds => "clouds",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buildings" | "building" => Ok(Category::Buildings),
            "radiation" => Ok(Category::Radiation),
            "clouds" | "cloud" | "wind" => Ok(Category::Clouds),
            other => Err(format!(
                "unknown category '{other}' (expected buildings, radiation or clouds)"
            )),
        }
    }
}
