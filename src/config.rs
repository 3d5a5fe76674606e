// src/config.rs
//! Конфигурация карты
//!
//! Параметры построения сетки, уровень моря и список элементов рельефа,
//! которые накладываются на карту по порядку. Загружается из TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MapError;
use crate::geometry::Vec2;
use crate::terrain::RangeSpec;

/// Элемент рельефа: один вызов соответствующего ядра.
///
/// ```toml
/// [[features]]
/// kind = "hill"
/// center = [50.0, 50.0]
/// radius = 20.0
/// height = 5.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainFeature {
    Hill {
        center: Vec2,
        radius: f64,
        height: f64,
    },
    Cone {
        center: Vec2,
        radius: f64,
        height: f64,
    },
    Slope {
        anchor: Vec2,
        direction: Vec2,
        radius: f64,
        height: f64,
    },
    Range {
        anchor: Vec2,
        direction: Vec2,
        a: f64,
        b: f64,
        height: f64,
        count: usize,
    },
}

impl TerrainFeature {
    /// Параметры хребта, если это хребет.
    #[must_use]
    pub fn range_spec(&self) -> Option<RangeSpec> {
        match *self {
            TerrainFeature::Range {
                anchor,
                direction,
                a,
                b,
                height,
                count,
            } => Some(RangeSpec {
                anchor,
                direction,
                a,
                b,
                height,
                count,
            }),
            _ => None,
        }
    }
}

/// Основные параметры карты
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты (по умолчанию 100)
    #[serde(default = "default_width")]
    pub width: f64,

    /// Высота карты (по умолчанию 100)
    #[serde(default = "default_height")]
    pub height: f64,

    /// Минимальное расстояние между центрами регионов (по умолчанию 10)
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Уровень моря: всё строго выше — суша (по умолчанию 2)
    #[serde(default = "default_sea_level")]
    pub sea_level: f64,

    /// Максимум полных проходов по карте при размещении одного хребта
    #[serde(default = "default_max_range_scans")]
    pub max_range_scans: usize,

    /// Элементы рельефа в порядке наложения
    #[serde(default)]
    pub features: Vec<TerrainFeature>,
}

fn default_width() -> f64 {
    100.0
}
fn default_height() -> f64 {
    100.0
}
fn default_min_distance() -> f64 {
    10.0
}
fn default_sea_level() -> f64 {
    2.0
}
fn default_max_range_scans() -> usize {
    1000
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 100.0,
            height: 100.0,
            min_distance: 10.0,
            sea_level: 2.0,
            max_range_scans: 1000,
            features: Vec::new(),
        }
    }
}

impl MapParams {
    /// Параметры с заданными размерами и значениями по умолчанию для остального.
    #[must_use]
    pub fn new(width: f64, height: f64, min_distance: f64) -> Self {
        Self {
            width,
            height,
            min_distance,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Загружает параметры из TOML-файла
    ///
    /// ```toml
    /// # map.toml
    /// seed = 42
    /// width = 200.0
    /// height = 120.0
    /// min_distance = 6.0
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, MapError> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Ширина, высота и минимальное расстояние должны быть конечными и больше нуля.
    pub fn validate(&self) -> Result<(), MapError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) && ok(self.min_distance) {
            Ok(())
        } else {
            Err(MapError::InvalidParams {
                width: self.width,
                height: self.height,
                min_distance: self.min_distance,
            })
        }
    }

    /// Масштаб радиусов вершин хребта: `min(width, height) / 20`.
    #[must_use]
    pub fn unit(&self) -> f64 {
        self.width.min(self.height) / 20.0
    }
}
