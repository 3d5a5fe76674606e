// src/map.rs
//! Карта целиком: сайты → диаграмма → сетка → рельеф → суша/море → берега.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::coast::CoastLine;
use crate::config::{MapParams, TerrainFeature};
use crate::error::MapError;
use crate::geometry::{Bounds, Vec2};
use crate::mesh::{BuildStats, Mesh, build_mesh};
use crate::sampling::{PoissonDiskSampler, SiteSampler};
use crate::terrain::{RangePlacement, RangeSpec};
use crate::voronoi::{ClippedVoronoi, Subdivider};

/// Сдвиг сида для генератора хребтов, чтобы он не совпадал с генератором сайтов.
const RANGE_SEED_OFFSET: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct TerrainMap {
    pub params: MapParams,
    pub width: f64,
    pub height: f64,
    /// Масштаб радиусов хребтов: `min(width, height) / 20`.
    pub unit: f64,
    pub mesh: Mesh,
    pub build_stats: BuildStats,
    rng: ChaCha8Rng,
}

impl TerrainMap {
    /// Строит карту штатными движками: выборка Пуассона + обрезанный Вороной.
    pub fn new(params: MapParams) -> Result<Self, MapError> {
        let mut sampler = PoissonDiskSampler::new(params.seed);
        Self::with_engines(params, &mut sampler, &ClippedVoronoi)
    }

    /// Строит карту с заданными источником сайтов и движком разбиения.
    pub fn with_engines<S, D>(
        params: MapParams,
        sampler: &mut S,
        subdivider: &D,
    ) -> Result<Self, MapError>
    where
        S: SiteSampler + ?Sized,
        D: Subdivider + ?Sized,
    {
        params.validate()?;
        let bounds = Bounds::from_size(params.width, params.height);

        let sites = sampler.sample(params.width, params.height, params.min_distance);
        let diagram = subdivider.subdivide(&sites, bounds);
        let (mesh, build_stats) = build_mesh(&diagram);

        info!(
            sites = sites.len(),
            points = mesh.points.len(),
            borders = mesh.borders.len(),
            regions = mesh.regions.len(),
            skipped_lookups = build_stats.skipped_lookups,
            "Сетка карты построена"
        );

        Ok(Self {
            width: params.width,
            height: params.height,
            unit: params.unit(),
            mesh,
            build_stats,
            rng: ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(RANGE_SEED_OFFSET)),
            params,
        })
    }

    pub fn add_hill(&mut self, center: Vec2, radius: f64, height: f64) {
        self.mesh.add_hill(center, radius, height);
    }

    pub fn add_cone(&mut self, center: Vec2, radius: f64, height: f64) {
        self.mesh.add_cone(center, radius, height);
    }

    pub fn add_slope(&mut self, anchor: Vec2, direction: Vec2, radius: f64, height: f64) {
        self.mesh.add_slope(anchor, direction, radius, height);
    }

    /// Хребет с бюджетом проходов из параметров карты.
    pub fn add_range(&mut self, spec: &RangeSpec) -> RangePlacement {
        self.mesh
            .add_range(spec, self.unit, self.params.max_range_scans, &mut self.rng)
    }

    /// Накладывает один элемент рельефа. Для хребта возвращает итог размещения.
    pub fn apply_feature(&mut self, feature: &TerrainFeature) -> Option<RangePlacement> {
        match *feature {
            TerrainFeature::Hill {
                center,
                radius,
                height,
            } => self.add_hill(center, radius, height),
            TerrainFeature::Cone {
                center,
                radius,
                height,
            } => self.add_cone(center, radius, height),
            TerrainFeature::Slope {
                anchor,
                direction,
                radius,
                height,
            } => self.add_slope(anchor, direction, radius, height),
            TerrainFeature::Range { .. } => {
                return feature.range_spec().map(|spec| self.add_range(&spec));
            }
        }
        None
    }

    /// Накладывает все элементы из параметров по порядку.
    pub fn apply_configured_features(&mut self) -> Vec<RangePlacement> {
        let features = self.params.features.clone();
        features
            .iter()
            .filter_map(|f| self.apply_feature(f))
            .collect()
    }

    pub fn set_land_and_sea(&mut self, sea_level: f64) {
        self.mesh.set_land_and_sea(sea_level);
    }

    /// Разметка по уровню моря из параметров.
    pub fn classify(&mut self) {
        self.mesh.set_land_and_sea(self.params.sea_level);
    }

    #[must_use]
    pub fn coast_lines(&self) -> Vec<CoastLine> {
        self.mesh.coast_lines()
    }
}
