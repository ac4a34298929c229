//! Höhenraster der Terrain-Oberfläche.
//!
//! Graustufenbilder (8 oder 16 Bit) werden auf [0, 1] normalisiert und über
//! eine rechteckige Fläche der lokalen X/Z-Ebene gelegt. Abgefragt wird
//! bikubisch (Catmull-Rom), Randpixel werden wiederholt.

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Rechteck in der lokalen X/Z-Ebene der Oberfläche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Linker Rand
    pub min_x: f64,
    /// Unterer Rand
    pub min_z: f64,
    /// Rechter Rand
    pub max_x: f64,
    /// Oberer Rand
    pub max_z: f64,
}

impl WorldBounds {
    /// Quadrat mit Kantenlänge `size` um den Ursprung.
    pub fn from_map_size(size: f64) -> Self {
        let r = size * 0.5;
        Self {
            min_x: -r,
            min_z: -r,
            max_x: r,
            max_z: r,
        }
    }

    /// `true` wenn (x, z) innerhalb liegt, Ränder eingeschlossen.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }

    /// Relative Lage (0..1) eines Punktes innerhalb der Bounds
    fn normalize(&self, x: f64, z: f64) -> (f64, f64) {
        (
            (x - self.min_x) / (self.max_x - self.min_x),
            (z - self.min_z) / (self.max_z - self.min_z),
        )
    }
}

/// Normalisiertes Höhenraster mit Lage in der Oberflächen-Ebene.
#[derive(Debug, Clone)]
pub struct Heightmap {
    /// Zeilenweise, Werte in [0, 1]
    samples: Vec<f64>,
    columns: u32,
    rows: u32,
    bounds: WorldBounds,
    bit_depth: u8,
    /// Größter normalisierter Wert
    peak: f64,
}

impl Heightmap {
    /// Lädt ein Graustufenbild als Heightmap.
    pub fn load(path: &Path, bounds: WorldBounds) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Heightmap nicht lesbar: {}", path.display()))?;
        let heightmap = Self::from_image(image, bounds)?;

        log::info!(
            "Heightmap geladen: {} ({}x{}, {}-Bit)",
            path.display(),
            heightmap.columns,
            heightmap.rows,
            heightmap.bit_depth
        );
        Ok(heightmap)
    }

    /// Baut eine Heightmap aus normalisierten Werten (zeilenweise).
    pub fn from_samples(
        columns: u32,
        rows: u32,
        samples: Vec<f64>,
        bounds: WorldBounds,
    ) -> Result<Self> {
        if columns < 2 || rows < 2 {
            anyhow::bail!("Heightmap braucht mindestens 2x2 Pixel, nicht {columns}x{rows}");
        }
        let expected = columns as usize * rows as usize;
        if samples.len() != expected {
            anyhow::bail!(
                "Heightmap {}x{} erwartet {} Werte, erhalten {}",
                columns,
                rows,
                expected,
                samples.len()
            );
        }

        let peak = samples.iter().copied().fold(0.0, f64::max);
        Ok(Self {
            samples,
            columns,
            rows,
            bounds,
            bit_depth: 16,
            peak,
        })
    }

    /// Ebene Heightmap auf dem normalisierten Niveau `level`.
    pub fn flat(bounds: WorldBounds, level: f64) -> Self {
        Self {
            samples: vec![level; 4],
            columns: 2,
            rows: 2,
            bounds,
            bit_depth: 16,
            peak: level,
        }
    }

    fn from_image(image: DynamicImage, bounds: WorldBounds) -> Result<Self> {
        let (columns, rows) = image.dimensions();
        let (samples, bit_depth) = normalized_luma(image);
        Self::from_samples(columns, rows, samples, bounds).map(|hm| Self { bit_depth, ..hm })
    }

    /// Höhe bei (x, z) in lokalen Einheiten: normalisierter Wert × `height_scale`.
    ///
    /// `None` außerhalb der Bounds.
    pub fn sample_height(&self, x: f64, z: f64, height_scale: f64) -> Option<f64> {
        if !self.bounds.contains(x, z) {
            return None;
        }

        let (u, v) = self.bounds.normalize(x, z);
        let px = u.clamp(0.0, 1.0) * f64::from(self.columns - 1);
        let pz = v.clamp(0.0, 1.0) * f64::from(self.rows - 1);
        Some(self.bicubic(px, pz) * height_scale)
    }

    /// Catmull-Rom erst entlang X für vier Zeilen, dann entlang Z.
    fn bicubic(&self, px: f64, pz: f64) -> f64 {
        let (x0, z0) = (px.floor() as i64, pz.floor() as i64);
        let row = |dz: i64| {
            let z = z0 + dz;
            catmull_rom(
                [
                    self.pixel(x0 - 1, z),
                    self.pixel(x0, z),
                    self.pixel(x0 + 1, z),
                    self.pixel(x0 + 2, z),
                ],
                px.fract(),
            )
        };
        catmull_rom([row(-1), row(0), row(1), row(2)], pz.fract())
    }

    /// Pixel mit Randwiederholung
    fn pixel(&self, x: i64, z: i64) -> f64 {
        let x = x.clamp(0, i64::from(self.columns) - 1) as usize;
        let z = z.clamp(0, i64::from(self.rows) - 1) as usize;
        self.samples[z * self.columns as usize + x]
    }

    /// Breite und Höhe in Pixeln
    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Bit-Tiefe der Quelle (8 oder 16)
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Größter normalisierter Höhenwert
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Lage in der Oberflächen-Ebene
    pub fn world_bounds(&self) -> &WorldBounds {
        &self.bounds
    }
}

/// Graustufen in [0, 1] plus erkannte Bit-Tiefe.
fn normalized_luma(image: DynamicImage) -> (Vec<f64>, u8) {
    use image::ColorType::{La16, Rgb16, Rgba16, L16};

    if matches!(image.color(), L16 | La16 | Rgb16 | Rgba16) {
        let max = f64::from(u16::MAX);
        let values = image.into_luma16().into_raw();
        (values.into_iter().map(|v| f64::from(v) / max).collect(), 16)
    } else {
        let max = f64::from(u8::MAX);
        let values = image.into_luma8().into_raw();
        (values.into_iter().map(|v| f64::from(v) / max).collect(), 8)
    }
}

/// Catmull-Rom zwischen `p[1]` und `p[2]` für `t` in [0, 1), Horner-Form.
fn catmull_rom(p: [f64; 4], t: f64) -> f64 {
    let [p0, p1, p2, p3] = p;
    let c1 = 0.5 * (p2 - p0);
    let c2 = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c3 = 0.5 * (p3 - p0) + 1.5 * (p1 - p2);
    ((c3 * t + c2) * t + c1) * t + p1
}
