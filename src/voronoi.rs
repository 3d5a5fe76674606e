// src/voronoi.rs
//! Диаграмма Вороного, обрезанная прямоугольником карты.
//!
//! [`Diagram`] — граница между ядром карты и алгоритмом разбиения плоскости.
//! Сборщик сетки опирается только на эти структуры, поэтому в тестах движок
//! легко подменить детерминированной заглушкой через трейт [`Subdivider`].

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};
use voronoice::{BoundingBox, ClipBehavior, Point, VoronoiBuilder};

use crate::geometry::{Bounds, POSITION_QUANTUM, Vec2, distance_sq};

/// Ячейка диаграммы: один сайт, упорядоченный обход рёбер и соседние ячейки.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub site: Vec2,
    /// Индексы рёбер в [`Diagram::edges`] в порядке обхода многоугольника.
    pub halfedges: Vec<usize>,
    /// Индексы соседних ячеек в [`Diagram::cells`].
    pub neighbors: Vec<usize>,
}

/// Ребро диаграммы. `va`/`vb` — индексы в [`Diagram::vertices`].
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub va: usize,
    pub vb: usize,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub vertices: Vec<Vec2>,
    pub cells: Vec<Cell>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    /// Позиция вершины ребра; `None`, если индекс выходит за таблицу вершин.
    #[must_use]
    pub fn vertex(&self, idx: usize) -> Option<Vec2> {
        self.vertices.get(idx).copied()
    }
}

/// Движок разбиения плоскости: сайты + прямоугольник → диаграмма.
pub trait Subdivider {
    fn subdivide(&self, sites: &[Vec2], bounds: Bounds) -> Diagram;
}

/// Вершины многоугольника ячейки в порядке обхода.
type Polygon = Vec<Vec2>;

/// Диаграмма Вороного, обрезанная прямоугольником карты средствами `voronoice`.
///
/// `voronoice` отдаёт каждую ячейку отдельным многоугольником, а вершины на
/// линии отсечения у соседних ячеек не общие, поэтому они склеиваются по
/// позиции перед сборкой рёбер.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClippedVoronoi;

impl Subdivider for ClippedVoronoi {
    fn subdivide(&self, sites: &[Vec2], bounds: Bounds) -> Diagram {
        let started = Instant::now();
        let polygons = cell_polygons(sites, bounds);
        let diagram = assemble(sites, &polygons, POSITION_QUANTUM);

        debug!(
            sites = sites.len(),
            vertices = diagram.vertices.len(),
            edges = diagram.edges.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Диаграмма Вороного построена"
        );
        diagram
    }
}

/// Многоугольники ячеек в порядке сайтов.
fn cell_polygons(sites: &[Vec2], bounds: Bounds) -> Vec<Polygon> {
    if sites.len() == 1 {
        return vec![bounds.corners().to_vec()];
    }

    let center = Point {
        x: (bounds.left + bounds.right) * 0.5,
        y: (bounds.top + bounds.bottom) * 0.5,
    };
    let voronoi = VoronoiBuilder::default()
        .set_sites(sites.iter().map(|p| Point { x: p[0], y: p[1] }).collect())
        .set_bounding_box(BoundingBox::new(center, bounds.width(), bounds.height()))
        .set_clip_behavior(ClipBehavior::Clip)
        .build();

    let Some(voronoi) = voronoi else {
        warn!(
            sites = sites.len(),
            "Диаграмма не построена: сайты вырождены"
        );
        return vec![Polygon::new(); sites.len()];
    };

    voronoi
        .iter_cells()
        .map(|cell| cell.iter_vertices().map(|p| [p.x, p.y]).collect())
        .collect()
}

/// Склейка многоугольников в общую таблицу вершин и рёбер.
fn assemble(sites: &[Vec2], polygons: &[Polygon], snap: f64) -> Diagram {
    let mut vertices = VertexTable::new(snap);
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_lookup: HashMap<(usize, usize), usize> = HashMap::new();
    let mut cells: Vec<Cell> = sites
        .iter()
        .map(|&site| Cell {
            site,
            ..Cell::default()
        })
        .collect();

    for (ci, polygon) in polygons.iter().enumerate() {
        let ids: Vec<usize> = polygon.iter().map(|&p| vertices.resolve(p)).collect();
        for k in 0..ids.len() {
            let va = ids[k];
            let vb = ids[(k + 1) % ids.len()];
            if va == vb {
                continue;
            }
            let key = if va < vb { (va, vb) } else { (vb, va) };
            let ei = *edge_lookup.entry(key).or_insert_with(|| {
                edges.push(Edge {
                    va,
                    vb,
                    left: None,
                    right: None,
                });
                edges.len() - 1
            });

            let edge = &mut edges[ei];
            if edge.left.is_none() {
                edge.left = Some(ci);
            } else if edge.left != Some(ci) && edge.right.is_none() {
                edge.right = Some(ci);
            }
            if !cells[ci].halfedges.contains(&ei) {
                cells[ci].halfedges.push(ei);
            }
        }
    }

    for edge in &edges {
        if let (Some(l), Some(r)) = (edge.left, edge.right) {
            if !cells[l].neighbors.contains(&r) {
                cells[l].neighbors.push(r);
            }
            if !cells[r].neighbors.contains(&l) {
                cells[r].neighbors.push(l);
            }
        }
    }

    Diagram {
        vertices: vertices.points,
        cells,
        edges,
    }
}

/// Таблица вершин со склейкой точек, лежащих ближе `snap` друг к другу.
struct VertexTable {
    snap: f64,
    points: Vec<Vec2>,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl VertexTable {
    fn new(snap: f64) -> Self {
        Self {
            snap,
            points: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    fn bucket(&self, p: Vec2) -> (i64, i64) {
        (
            (p[0] / self.snap).floor() as i64,
            (p[1] / self.snap).floor() as i64,
        )
    }

    fn resolve(&mut self, p: Vec2) -> usize {
        let (bx, by) = self.bucket(p);
        let snap_sq = self.snap * self.snap;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(list) = self.buckets.get(&(bx + dx, by + dy)) {
                    if let Some(&idx) = list
                        .iter()
                        .find(|&&idx| distance_sq(self.points[idx], p) <= snap_sq)
                    {
                        return idx;
                    }
                }
            }
        }
        let idx = self.points.len();
        self.points.push(p);
        self.buckets.entry((bx, by)).or_default().push(idx);
        idx
    }
}
