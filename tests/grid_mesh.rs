//! Сетка 3×3 квадратных ячеек со стороной 2 на [0, 6]×[0, 6], построенная
//! детерминированной заглушкой вместо диаграммы Вороного.

use std::collections::BTreeSet;

use voronoi_mapgen::geometry::{Bounds, Vec2};
use voronoi_mapgen::sampling::SiteSampler;
use voronoi_mapgen::voronoi::{Cell, Diagram, Edge, Subdivider};
use voronoi_mapgen::{MapParams, TerrainMap, build_mesh};

const N: usize = 3;

fn vertex(ix: usize, iy: usize) -> usize {
    iy * (N + 1) + ix
}

fn h_edge(ix: usize, iy: usize) -> usize {
    iy * N + ix
}

fn v_edge(ix: usize, iy: usize) -> usize {
    N * (N + 1) + iy * (N + 1) + ix
}

fn cell(cx: usize, cy: usize) -> usize {
    cy * N + cx
}

fn cell_at(cx: isize, cy: isize) -> Option<usize> {
    let range = 0..N as isize;
    (range.contains(&cx) && range.contains(&cy)).then(|| cell(cx as usize, cy as usize))
}

struct GridEngine;

impl Subdivider for GridEngine {
    fn subdivide(&self, sites: &[Vec2], _bounds: Bounds) -> Diagram {
        let mut vertices = Vec::new();
        for iy in 0..=N {
            for ix in 0..=N {
                vertices.push([2.0 * ix as f64, 2.0 * iy as f64]);
            }
        }

        let mut edges = Vec::new();
        for iy in 0..=N {
            for ix in 0..N {
                let (ix_, iy_) = (ix as isize, iy as isize);
                let cells: Vec<usize> = [cell_at(ix_, iy_ - 1), cell_at(ix_, iy_)]
                    .into_iter()
                    .flatten()
                    .collect();
                edges.push(Edge {
                    va: vertex(ix, iy),
                    vb: vertex(ix + 1, iy),
                    left: cells.first().copied(),
                    right: cells.get(1).copied(),
                });
            }
        }
        for iy in 0..N {
            for ix in 0..=N {
                let (ix_, iy_) = (ix as isize, iy as isize);
                let cells: Vec<usize> = [cell_at(ix_ - 1, iy_), cell_at(ix_, iy_)]
                    .into_iter()
                    .flatten()
                    .collect();
                edges.push(Edge {
                    va: vertex(ix, iy),
                    vb: vertex(ix, iy + 1),
                    left: cells.first().copied(),
                    right: cells.get(1).copied(),
                });
            }
        }

        let mut cells = Vec::new();
        for cy in 0..N {
            for cx in 0..N {
                let (cx_, cy_) = (cx as isize, cy as isize);
                let neighbors = [(0, -1), (1, 0), (0, 1), (-1, 0)]
                    .iter()
                    .filter_map(|(dx, dy)| cell_at(cx_ + dx, cy_ + dy))
                    .collect();
                cells.push(Cell {
                    site: sites[cell(cx, cy)],
                    halfedges: vec![
                        h_edge(cx, cy),
                        v_edge(cx + 1, cy),
                        h_edge(cx, cy + 1),
                        v_edge(cx, cy),
                    ],
                    neighbors,
                });
            }
        }

        Diagram {
            vertices,
            cells,
            edges,
        }
    }
}

struct GridSites;

impl SiteSampler for GridSites {
    fn sample(&mut self, _width: f64, _height: f64, _min_distance: f64) -> Vec<Vec2> {
        let mut sites = Vec::new();
        for cy in 0..N {
            for cx in 0..N {
                sites.push([2.0 * cx as f64 + 1.0, 2.0 * cy as f64 + 1.0]);
            }
        }
        sites
    }
}

fn grid_diagram() -> Diagram {
    GridEngine.subdivide(&GridSites.sample(6.0, 6.0, 2.0), Bounds::from_size(6.0, 6.0))
}

fn set(list: &[usize]) -> BTreeSet<usize> {
    list.iter().copied().collect()
}

#[test]
fn region_neighbors_are_four_adjacent_cells() {
    let (mesh, stats) = build_mesh(&grid_diagram());
    assert_eq!(stats.skipped_lookups, 0);
    assert_eq!(mesh.regions.len(), 9);

    for cy in 0..N as isize {
        for cx in 0..N as isize {
            let expected: BTreeSet<usize> = [(0, -1), (1, 0), (0, 1), (-1, 0)]
                .iter()
                .filter_map(|(dx, dy)| cell_at(cx + dx, cy + dy))
                .collect();
            let id = cell(cx as usize, cy as usize);
            assert_eq!(set(&mesh.regions[id].neighbors), expected, "region {id}");
            assert_eq!(mesh.regions[id].points.len(), 4);
            assert_eq!(mesh.regions[id].borders.len(), 4);
        }
    }
    assert_eq!(mesh.regions[cell(1, 1)].neighbors.len(), 4);
    assert_eq!(mesh.regions[cell(0, 0)].neighbors.len(), 2);
}

#[test]
fn point_neighbors_are_grid_adjacent_vertices() {
    let (mesh, _) = build_mesh(&grid_diagram());
    assert_eq!(mesh.points.len(), (N + 1) * (N + 1));

    for iy in 0..=N as isize {
        for ix in 0..=N as isize {
            let expected: BTreeSet<usize> = [(0, -1), (1, 0), (0, 1), (-1, 0)]
                .iter()
                .map(|(dx, dy)| (ix + dx, iy + dy))
                .filter(|&(x, y)| (0..=N as isize).contains(&x) && (0..=N as isize).contains(&y))
                .map(|(x, y)| vertex(x as usize, y as usize))
                .collect();
            let id = vertex(ix as usize, iy as usize);
            assert_eq!(set(&mesh.points[id].neighbors), expected, "point {id}");
        }
    }

    assert_eq!(mesh.points[vertex(0, 0)].regions.len(), 1);
    assert_eq!(mesh.points[vertex(1, 0)].regions.len(), 2);
    assert_eq!(mesh.points[vertex(1, 1)].regions.len(), 4);
}

#[test]
fn border_neighbors_share_an_endpoint() {
    let diagram = grid_diagram();
    let (mesh, _) = build_mesh(&diagram);
    assert_eq!(mesh.borders.len(), 2 * N * (N + 1));

    for (i, e) in diagram.edges.iter().enumerate() {
        let expected: BTreeSet<usize> = diagram
            .edges
            .iter()
            .enumerate()
            .filter(|&(j, o)| j != i && (o.va == e.va || o.va == e.vb || o.vb == e.va || o.vb == e.vb))
            .map(|(j, _)| j)
            .collect();
        assert_eq!(set(&mesh.borders[i].neighbors), expected, "border {i}");
    }

    assert_eq!(mesh.borders[h_edge(0, 0)].neighbors.len(), 3);
    assert_eq!(mesh.borders[h_edge(1, 1)].neighbors.len(), 6);
    assert_eq!(mesh.borders[h_edge(1, 0)].regions.len(), 1);
    assert_eq!(mesh.borders[h_edge(1, 1)].regions.len(), 2);
    assert_eq!(mesh.borders[v_edge(2, 1)].regions.len(), 2);
}

#[test]
fn island_in_grid_has_closed_coastline() {
    let params = MapParams::new(6.0, 6.0, 2.0);
    let mut map = TerrainMap::with_engines(params, &mut GridSites, &GridEngine).unwrap();

    // только центральная ячейка поднимается над морем
    map.add_cone([3.0, 3.0], 1.5, 4.0);
    map.set_land_and_sea(2.0);

    let land: Vec<usize> = map.mesh.land_regions().map(|r| r.id).collect();
    assert_eq!(land, vec![cell(1, 1)]);
    assert_eq!(map.mesh.landmasses(), vec![vec![cell(1, 1)]]);

    let lines = map.coast_lines();
    assert_eq!(lines.len(), 1);
    let expected = set(&[h_edge(1, 1), h_edge(1, 2), v_edge(1, 1), v_edge(2, 1)]);
    assert_eq!(set(&lines[0]), expected);
}
