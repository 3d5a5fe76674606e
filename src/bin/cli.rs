use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voronoi_mapgen::geometry::Vec2;
use voronoi_mapgen::{MapError, MapParams, RangePlacement, TerrainMap};

/// Генератор карт на сетке Вороного
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения отчёта (по умолчанию: ./map.json)
    #[arg(short, long, default_value = "map.json")]
    output: PathBuf,
}

#[derive(Serialize)]
struct MapReport {
    width: f64,
    height: f64,
    sea_level: f64,
    points: usize,
    borders: usize,
    regions: usize,
    skipped_lookups: usize,
    /// Число пар соседних регионов.
    region_adjacencies: usize,
    land_regions: usize,
    landmasses: Vec<Vec<usize>>,
    ranges: Vec<RangePlacement>,
    /// Каждая линия — список отрезков `[начало, конец]`.
    coast_lines: Vec<Vec<[Vec2; 2]>>,
}

fn main() -> Result<(), MapError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("Загрузка конфигурации {:?}", cli.config);
    let params = MapParams::from_toml_file(&cli.config)?;

    tracing::info!(
        "Построение сетки (размер: {}×{}, шаг: {})...",
        params.width,
        params.height,
        params.min_distance
    );
    let mut map = TerrainMap::new(params)?;

    let ranges = map.apply_configured_features();
    map.classify();
    let lines = map.coast_lines();

    let mesh = &map.mesh;
    let report = MapReport {
        width: map.width,
        height: map.height,
        sea_level: map.params.sea_level,
        points: mesh.points.len(),
        borders: mesh.borders.len(),
        regions: mesh.regions.len(),
        skipped_lookups: map.build_stats.skipped_lookups,
        region_adjacencies: mesh.region_graph().edge_count(),
        land_regions: mesh.land_regions().count(),
        landmasses: mesh.landmasses(),
        ranges,
        coast_lines: lines
            .iter()
            .map(|line| line.iter().map(|&b| mesh.borders[b].edge).collect())
            .collect(),
    };

    tracing::info!(
        "Сетка: {} регионов, {} пар соседей",
        report.regions,
        report.region_adjacencies
    );
    tracing::info!(
        "Суша: {} регионов, {} массивов, {} береговых линий",
        report.land_regions,
        report.landmasses.len(),
        report.coast_lines.len()
    );

    tracing::info!("Сохранение в {:?}", cli.output);
    fs::write(&cli.output, serde_json::to_string_pretty(&report)?)?;

    tracing::info!("Готово!");
    Ok(())
}
