//! Fehler-Taxonomie der Platzierungs-Pipeline.
//!
//! `PlacementError` beschreibt einzelne Fehlerursachen (Datei fehlt, Zeile
//! kaputt, Raycast verfehlt). `SessionError` ergänzt den Kontext einer
//! Platzierungs-Session: Datensatz, Kategorie und Stufe.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::Category;

/// Einzelner Fehler aus Loader, Frame-Builder, Resolver oder Collaborator.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Datei oder Ressource existiert nicht
    #[error("not found: {}", path.display())]
    NotFound {
        /// Gesuchter Pfad
        path: PathBuf,
    },

    /// Tabellenzeile mit falscher Spaltenzahl oder ungültigem Zahlenwert
    #[error("{}", format_location(*line, *column, reason))]
    Format {
        /// Zeilennummer (0-basiert)
        line: usize,
        /// Spaltenindex (0-basiert), falls der Fehler einer Spalte zugeordnet ist
        column: Option<usize>,
        /// Fehlerbeschreibung
        reason: String,
    },

    /// Der Boden-Raycast eines Features hat die Oberfläche verfehlt
    #[error("no surface hit for record at line {line} (offset {offset_x}, {offset_y})")]
    NoSurfaceHit {
        /// Zeile des Records in der Quelldatei
        line: usize,
        /// X-Offset in Metern
        offset_x: f64,
        /// Y-Offset in Metern
        offset_y: f64,
    },

    /// Ungültiger Datensatz-Scope (Ausdehnung, Breitengrad oder Maßstab)
    #[error("invalid scope: {reason}")]
    InvalidScope {
        /// Fehlerbeschreibung
        reason: String,
    },

    /// Metadaten-Datei vorhanden, aber nicht lesbar
    #[error("failed to parse {}: {reason}", path.display())]
    Parse {
        /// Pfad der Metadaten-Datei
        path: PathBuf,
        /// Parser-Meldung
        reason: String,
    },

    /// Sonstiger I/O-Fehler
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_location(line: usize, column: Option<usize>, reason: &str) -> String {
    match column {
        Some(column) => format!("line {line}, column {column}: {reason}"),
        None => format!("line {line}: {reason}"),
    }
}

impl PlacementError {
    /// Erzeugt einen `Format`-Fehler ohne Spaltenangabe.
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            column: None,
            reason: reason.into(),
        }
    }

    /// Erzeugt einen `Format`-Fehler für eine bestimmte Spalte.
    pub fn format_at(line: usize, column: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            column: Some(column),
            reason: reason.into(),
        }
    }

    /// Erzeugt einen `InvalidScope`-Fehler.
    pub fn invalid_scope(reason: impl Into<String>) -> Self {
        Self::InvalidScope {
            reason: reason.into(),
        }
    }
}

/// Stufe einer Platzierungs-Session, in der ein Fehler aufgetreten ist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Scope über den Resolver ermitteln
    ResolveScope,
    /// Tabellendaten laden
    LoadRecords,
    /// Koordinaten-Frame aufbauen
    BuildFrame,
    /// Features auf der Oberfläche platzieren
    PlaceFeatures,
    /// Raster-Assets laden
    LoadRaster,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveScope => "resolve scope",
            Stage::LoadRecords => "load records",
            Stage::BuildFrame => "build frame",
            Stage::PlaceFeatures => "place features",
            Stage::LoadRaster => "load raster",
        };
        f.write_str(name)
    }
}

/// Session-Fehler mit Datensatz, Kategorie und Stufe.
#[derive(Debug, Error)]
#[error("dataset '{dataset}' ({category}), stage '{stage}': {source}")]
pub struct SessionError {
    /// Datensatz-ID der Session
    pub dataset: String,
    /// Kategorie der Session
    pub category: Category,
    /// Stufe, in der der Fehler auftrat
    pub stage: Stage,
    /// Ursprünglicher Fehler
    #[source]
    pub source: PlacementError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display_with_and_without_column() {
        let err = PlacementError::format(0, "expected 3 columns, got 2");
        assert_eq!(err.to_string(), "line 0: expected 3 columns, got 2");

        let err = PlacementError::format_at(4, 1, "not a finite float");
        assert_eq!(err.to_string(), "line 4, column 1: not a finite float");
    }

    #[test]
    fn test_session_error_names_dataset_and_stage() {
        let err = SessionError {
            dataset: "delft".to_string(),
            category: Category::Buildings,
            stage: Stage::LoadRecords,
            source: PlacementError::format_at(7, 2, "not a finite float"),
        };
        let text = err.to_string();
        assert!(text.contains("delft"));
        assert!(text.contains("load records"));
        assert!(text.contains("line 7, column 2"));
    }
}
