//! Import von Tabellendaten (CSV ohne Kopfzeile, drei Zahlenspalten).
//!
//! Das Format ist streng zeilenorientiert: eine Zeile = ein Record.
//! Eine einzige fehlerhafte Zeile bricht den gesamten Ladevorgang ab.

pub mod parser;

pub use parser::{load, parse_bytes, parse_records, ColumnLayout, EXPECTED_COLUMNS};
