// src/mesh/builder.rs
//! Сборка сетки из диаграммы Вороного.
//!
//! Четыре прохода:
//! 1. точки и регионы (по одной на вершину и ячейку диаграммы);
//! 2. границы и связь точка↔граница;
//! 3. связи регион↔точка, регион↔граница, регион↔регион;
//! 4. замыкание: соседние границы через общую точку, соседние точки через общую границу.
//!
//! Промах поиска по ключу позиции (обрезанные рёбра у края карты, индексы вне
//! таблицы вершин) не считается ошибкой: связь просто пропускается и
//! учитывается в [`BuildStats::skipped_lookups`].

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use super::{Border, Mesh, Point, Region, link};
use crate::geometry::{BorderKey, PositionKey, Vec2};
use crate::voronoi::Diagram;

/// Диагностика сборки.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Сколько связей пропущено из-за отсутствующего ключа.
    pub skipped_lookups: usize,
    /// Вершины диаграммы, совпавшие по позиции с уже созданной точкой.
    pub duplicate_points: usize,
    /// Ячейки диаграммы, совпавшие по сайту с уже созданным регионом.
    pub duplicate_regions: usize,
    /// Рёбра диаграммы, совпавшие по концам с уже созданной границей.
    pub duplicate_borders: usize,
}

#[derive(Default)]
struct Lookup {
    points: HashMap<PositionKey, usize>,
    regions: HashMap<PositionKey, usize>,
    borders: HashMap<BorderKey, usize>,
}

impl Lookup {
    fn point(&self, pos: Option<Vec2>, stats: &mut BuildStats) -> Option<usize> {
        let found = pos.and_then(|p| self.points.get(&PositionKey::from_pos(p)).copied());
        if found.is_none() {
            stats.skipped_lookups += 1;
        }
        found
    }

    fn region(&self, pos: Vec2, stats: &mut BuildStats) -> Option<usize> {
        let found = self.regions.get(&PositionKey::from_pos(pos)).copied();
        if found.is_none() {
            stats.skipped_lookups += 1;
        }
        found
    }

    fn border(&self, ends: Option<(Vec2, Vec2)>, stats: &mut BuildStats) -> Option<usize> {
        let found =
            ends.and_then(|(a, b)| self.borders.get(&BorderKey::from_endpoints(a, b)).copied());
        if found.is_none() {
            stats.skipped_lookups += 1;
        }
        found
    }
}

/// Строит полностью связанную сетку из диаграммы.
#[must_use]
pub fn build_mesh(diagram: &Diagram) -> (Mesh, BuildStats) {
    let started = Instant::now();
    let mut mesh = Mesh::default();
    let mut lookup = Lookup::default();
    let mut stats = BuildStats::default();

    // === 1. Точки и регионы ===
    for v in &diagram.vertices {
        let key = PositionKey::from_pos(*v);
        if lookup.points.contains_key(&key) {
            stats.duplicate_points += 1;
            continue;
        }
        let id = mesh.points.len();
        mesh.points.push(Point::new(id, *v));
        lookup.points.insert(key, id);
    }

    for cell in &diagram.cells {
        let key = PositionKey::from_pos(cell.site);
        if lookup.regions.contains_key(&key) {
            stats.duplicate_regions += 1;
            continue;
        }
        let id = mesh.regions.len();
        mesh.regions.push(Region::new(id, cell.site));
        lookup.regions.insert(key, id);
    }
    debug!(
        points = mesh.points.len(),
        regions = mesh.regions.len(),
        "Точки и регионы созданы"
    );

    // === 2. Границы ===
    for edge in &diagram.edges {
        let a = diagram.vertex(edge.va);
        let b = diagram.vertex(edge.vb);
        let (Some(pa), Some(pb)) = (a, b) else {
            stats.skipped_lookups += 1;
            continue;
        };
        let key = BorderKey::from_endpoints(pa, pb);
        if lookup.borders.contains_key(&key) {
            stats.duplicate_borders += 1;
            continue;
        }

        let id = mesh.borders.len();
        let mut border = Border::new(id, [pa, pb]);
        for end in [a, b] {
            if let Some(pi) = lookup.point(end, &mut stats) {
                link(&mut border.points, pi);
                link(&mut mesh.points[pi].borders, id);
            }
        }
        mesh.borders.push(border);
        lookup.borders.insert(key, id);
    }

    // === 3. Связи регионов ===
    for cell in &diagram.cells {
        let Some(ri) = lookup.region(cell.site, &mut stats) else {
            continue;
        };

        for &ei in &cell.halfedges {
            let Some(edge) = diagram.edges.get(ei) else {
                stats.skipped_lookups += 1;
                continue;
            };
            let a = diagram.vertex(edge.va);
            let b = diagram.vertex(edge.vb);

            for end in [a, b] {
                if let Some(pi) = lookup.point(end, &mut stats) {
                    link(&mut mesh.regions[ri].points, pi);
                    link(&mut mesh.points[pi].regions, ri);
                }
            }

            if let Some(bi) = lookup.border(a.zip(b), &mut stats) {
                link(&mut mesh.regions[ri].borders, bi);
                link(&mut mesh.borders[bi].regions, ri);
            }
        }

        for &n in &cell.neighbors {
            let Some(n_cell) = diagram.cells.get(n) else {
                stats.skipped_lookups += 1;
                continue;
            };
            if let Some(ni) = lookup.region(n_cell.site, &mut stats) {
                if ni != ri {
                    link(&mut mesh.regions[ri].neighbors, ni);
                    link(&mut mesh.regions[ni].neighbors, ri);
                }
            }
        }
    }

    // === 4. Соседние границы и точки ===
    for bi in 0..mesh.borders.len() {
        let ends = mesh.borders[bi].points.clone();
        for &pa in &ends {
            let incident = mesh.points[pa].borders.clone();
            for nb in incident {
                if nb != bi {
                    link(&mut mesh.borders[bi].neighbors, nb);
                    link(&mut mesh.borders[nb].neighbors, bi);
                }
            }
            for &pb in &ends {
                if pa != pb {
                    link(&mut mesh.points[pa].neighbors, pb);
                    link(&mut mesh.points[pb].neighbors, pa);
                }
            }
        }
    }

    debug!(
        borders = mesh.borders.len(),
        skipped = stats.skipped_lookups,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Связи сетки построены"
    );
    (mesh, stats)
}
