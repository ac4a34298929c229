//! Parser für Feature-Tabellen.

use std::path::Path;

use crate::core::{FeatureRecord, PlacementError};

/// Anzahl Spalten pro Zeile.
pub const EXPECTED_COLUMNS: usize = 3;

/// Zuordnung der drei Spalten zu Record-Feldern, je Datensatz-Kategorie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    offset_x: usize,
    offset_y: usize,
    height: usize,
}

impl ColumnLayout {
    /// Gebäudedaten: Spalte 0 = Y-Offset (m), Spalte 1 = X-Offset (m), Spalte 2 = Höhe (m).
    pub const BUILDINGS: Self = Self {
        offset_x: 1,
        offset_y: 0,
        height: 2,
    };

    /// Spalten in Feld-Reihenfolge: X-Offset, Y-Offset, dritter Wert.
    pub const XYZ: Self = Self {
        offset_x: 0,
        offset_y: 1,
        height: 2,
    };

    fn record(&self, values: [f64; EXPECTED_COLUMNS], line: usize) -> FeatureRecord {
        FeatureRecord {
            offset_x: values[self.offset_x],
            offset_y: values[self.offset_y],
            height: values[self.height],
            line,
        }
    }
}

/// Lädt alle Records einer Tabellendatei in Datei-Reihenfolge.
///
/// Fehlt die Datei, wird `NotFound` zurückgegeben; jede fehlerhafte Zeile
/// (auch ungültiges UTF-8) führt zu `Format` mit Zeilen- und ggf. Spaltenangabe.
pub fn load(path: &Path, layout: ColumnLayout) -> Result<Vec<FeatureRecord>, PlacementError> {
    if !path.is_file() {
        return Err(PlacementError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let records = parse_bytes(&bytes, layout)?;

    log::info!(
        "{} Records geladen aus: {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parsed Tabellendaten aus einem String.
pub fn parse_records(
    content: &str,
    layout: ColumnLayout,
) -> Result<Vec<FeatureRecord>, PlacementError> {
    parse_bytes(content.as_bytes(), layout)
}

/// Parsed Tabellendaten aus Rohbytes.
///
/// Zeilen und Spalten werden ab 0 gezählt. Leerzeilen zwischen zwei Records
/// sind Fehler, Leerzeilen am Dateiende werden ignoriert.
pub fn parse_bytes(
    data: &[u8],
    layout: ColumnLayout,
) -> Result<Vec<FeatureRecord>, PlacementError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut lines = LineCounter::new(data);
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| read_error(err, &mut lines))?;
        let line = lines.line_at(row.position().map_or(0, |pos| pos.byte()));

        // Der Reader überspringt Leerzeilen stillschweigend
        if line > records.len() {
            log::debug!("Leerzeile vor Tabellenzeile {}", line);
            return Err(PlacementError::format(
                records.len(),
                format!("expected {EXPECTED_COLUMNS} columns, got 0"),
            ));
        }

        let values = parse_row(&row, line)?;
        records.push(layout.record(values, line));
    }

    Ok(records)
}

/// Ordnet Byte-Offsets des Readers 0-basierten Zeilen zu.
///
/// Der Reader meldet als Position das Ende des vorherigen Records, daher
/// werden Zeilenumbrüche ab dem Offset übersprungen. Offsets müssen monoton
/// steigen.
struct LineCounter<'a> {
    data: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            line: 0,
        }
    }

    fn line_at(&mut self, byte: u64) -> usize {
        let mut start = usize::try_from(byte)
            .unwrap_or(usize::MAX)
            .clamp(self.offset, self.data.len());
        while matches!(self.data.get(start), Some(b'\r' | b'\n')) {
            start += 1;
        }
        self.line += self.data[self.offset..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.offset = start;
        self.line
    }
}

/// Validiert eine Zeile: genau drei Spalten, jede eine endliche Zahl.
fn parse_row(
    row: &csv::StringRecord,
    line: usize,
) -> Result<[f64; EXPECTED_COLUMNS], PlacementError> {
    if row.len() != EXPECTED_COLUMNS {
        log::debug!("Ungültige Tabellenzeile {}: {:?}", line, row);
        return Err(PlacementError::format(
            line,
            format!("expected {EXPECTED_COLUMNS} columns, got {}", row.len()),
        ));
    }

    let mut values = [0.0f64; EXPECTED_COLUMNS];
    for (column, (field, value)) in row.iter().zip(values.iter_mut()).enumerate() {
        *value = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                log::debug!(
                    "Ungültiger Wert in Zeile {}, Spalte {}: '{}'",
                    line,
                    column,
                    field
                );
                PlacementError::format_at(line, column, "not a finite float")
            })?;
    }

    Ok(values)
}

/// Übersetzt Reader-Fehler in Fehler mit 0-basierter Zeile.
fn read_error(err: csv::Error, lines: &mut LineCounter<'_>) -> PlacementError {
    let line = err
        .position()
        .map_or(lines.line, |pos| lines.line_at(pos.byte()));
    match err.into_kind() {
        csv::ErrorKind::Io(io) => PlacementError::Io(io),
        csv::ErrorKind::Utf8 { .. } => PlacementError::format(line, "invalid UTF-8"),
        other => PlacementError::format(line, format!("{other:?}")),
    }
}
