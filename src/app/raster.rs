//! Raster-Quellen für Overlays (Strahlung, Wind, Heightmap).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageReader};

use crate::core::PlacementError;

/// Art eines Datensatz-Rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterKind {
    /// Strahlungsfeld (`RadiationData/radiation_<i>.png`)
    Radiation,
    /// Windgeschwindigkeit für Wolken (`WindData/wind_<i>.png`)
    Wind,
    /// Höhenraster des Datensatzes (`HeightMap/heightmap.png`, Index ignoriert)
    Heightmap,
}

impl RasterKind {
    /// Relativer Pfad innerhalb des Datensatz-Verzeichnisses.
    pub fn relative_path(self, index: usize) -> PathBuf {
        match self {
            RasterKind::Radiation => {
                PathBuf::from("RadiationData").join(format!("radiation_{index}.png"))
            }
            RasterKind::Wind => PathBuf::from("WindData").join(format!("wind_{index}.png")),
            RasterKind::Heightmap => PathBuf::from("HeightMap").join("heightmap.png"),
        }
    }
}

/// Dekodiertes Raster mit Herkunftsangabe.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// Bilddaten
    pub image: DynamicImage,
    /// Herkunft (Dateipfad)
    pub source: String,
}

impl RasterImage {
    /// Breite und Höhe in Pixeln
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Collaborator-Schnittstelle für Raster-Assets.
pub trait RasterSource {
    /// Lädt das `index`-te Raster der Art `kind` eines Datensatzes.
    fn load_image(
        &self,
        source_id: &str,
        kind: RasterKind,
        index: usize,
    ) -> Result<RasterImage, PlacementError>;
}

/// Lädt Raster aus `<data_root>/<dataset>/...`.
#[derive(Debug, Clone)]
pub struct DirectoryRasterSource {
    data_root: PathBuf,
}

impl DirectoryRasterSource {
    /// Erstellt eine Quelle für `data_root`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Vollständiger Pfad eines Rasters
    pub fn raster_path(&self, source_id: &str, kind: RasterKind, index: usize) -> PathBuf {
        self.data_root.join(source_id).join(kind.relative_path(index))
    }

    fn decode(path: &Path) -> Result<DynamicImage, PlacementError> {
        let parse_error = |reason: String| PlacementError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        match image::open(path) {
            Ok(img) => Ok(img),
            Err(ext_err) => {
                // Endung passt nicht zum Inhalt: Format über Magic Bytes erkennen
                log::warn!(
                    "Format-Erkennung via Dateiendung fehlgeschlagen für '{}': {}",
                    path.display(),
                    ext_err
                );
                let file = File::open(path)?;
                let reader = ImageReader::new(BufReader::new(file))
                    .with_guessed_format()?;
                reader.decode().map_err(|e| parse_error(e.to_string()))
            }
        }
    }
}

impl RasterSource for DirectoryRasterSource {
    fn load_image(
        &self,
        source_id: &str,
        kind: RasterKind,
        index: usize,
    ) -> Result<RasterImage, PlacementError> {
        let path = self.raster_path(source_id, kind, index);
        if !path.is_file() {
            return Err(PlacementError::NotFound { path });
        }

        let image = Self::decode(&path)?;
        let (width, height) = image.dimensions();
        log::info!(
            "Raster geladen: {} ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(RasterImage {
            image,
            source: path.display().to_string(),
        })
    }
}
