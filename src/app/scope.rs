//! Scope/Attribut-Resolver: liefert Anker, Ausdehnung und Attribute eines Datensatzes.
//!
//! Die Standard-Implementierung liest `<data_root>/<dataset>/scope.toml`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{DatasetScope, GeoPosition, GeoSize, PlacementError};

/// Dateiname der Scope-Metadaten im Datensatz-Verzeichnis.
pub const SCOPE_FILE_NAME: &str = "scope.toml";

/// Alle Metadaten eines Datensatzes: Scope plus beliebige benannte Attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttributes {
    /// Geographischer Anker
    pub position: GeoPosition,
    /// Ausdehnung in Metern
    pub size: GeoSize,
    /// Weitere benannte Attribute in Datei-Reihenfolge
    #[serde(default)]
    pub attributes: IndexMap<String, toml::Value>,
}

impl FileAttributes {
    /// Scope-Anteil der Attribute
    pub fn scope(&self) -> DatasetScope {
        DatasetScope {
            position: self.position,
            size: self.size,
        }
    }
}

/// Collaborator-Schnittstelle für Datensatz-Metadaten.
pub trait ScopeResolver {
    /// Scope eines Datensatzes.
    fn scope(&self, source_id: &str) -> Result<DatasetScope, PlacementError> {
        self.attributes(source_id).map(|attrs| attrs.scope())
    }

    /// Alle Attribute eines Datensatzes.
    fn attributes(&self, source_id: &str) -> Result<FileAttributes, PlacementError>;
}

impl<T: ScopeResolver + ?Sized> ScopeResolver for &T {
    fn scope(&self, source_id: &str) -> Result<DatasetScope, PlacementError> {
        (**self).scope(source_id)
    }

    fn attributes(&self, source_id: &str) -> Result<FileAttributes, PlacementError> {
        (**self).attributes(source_id)
    }
}

/// Liest Scope-Metadaten aus TOML-Dateien unterhalb eines Wurzelverzeichnisses.
#[derive(Debug, Clone)]
pub struct TomlScopeResolver {
    data_root: PathBuf,
}

impl TomlScopeResolver {
    /// Erstellt einen Resolver für `data_root`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Pfad der Metadaten-Datei eines Datensatzes
    pub fn scope_path(&self, source_id: &str) -> PathBuf {
        self.data_root.join(source_id).join(SCOPE_FILE_NAME)
    }

    fn read(path: &Path) -> Result<FileAttributes, PlacementError> {
        if !path.is_file() {
            return Err(PlacementError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PlacementError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl ScopeResolver for TomlScopeResolver {
    fn attributes(&self, source_id: &str) -> Result<FileAttributes, PlacementError> {
        let path = self.scope_path(source_id);
        let attributes = Self::read(&path)?;
        log::debug!(
            "Scope für '{}' gelesen: ({:.6}, {:.6}), {}x{} m, {} Attribute",
            source_id,
            attributes.position.lat,
            attributes.position.lon,
            attributes.size.x,
            attributes.size.y,
            attributes.attributes.len()
        );
        Ok(attributes)
    }
}

/// Merkt sich aufgelöste Scopes für die Dauer einer Session bzw. eines Szenen-Aufbaus.
pub struct CachedScopeResolver<R> {
    inner: R,
    scopes: RefCell<HashMap<String, DatasetScope>>,
}

impl<R: ScopeResolver> CachedScopeResolver<R> {
    /// Umhüllt einen Resolver mit leerem Cache.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scopes: RefCell::new(HashMap::new()),
        }
    }

    /// Anzahl gecachter Scopes
    pub fn cached_len(&self) -> usize {
        self.scopes.borrow().len()
    }
}

impl<R: ScopeResolver> ScopeResolver for CachedScopeResolver<R> {
    fn scope(&self, source_id: &str) -> Result<DatasetScope, PlacementError> {
        if let Some(scope) = self.scopes.borrow().get(source_id) {
            return Ok(*scope);
        }
        let scope = self.inner.scope(source_id)?;
        self.scopes
            .borrow_mut()
            .insert(source_id.to_string(), scope);
        Ok(scope)
    }

    fn attributes(&self, source_id: &str) -> Result<FileAttributes, PlacementError> {
        self.inner.attributes(source_id)
    }
}
