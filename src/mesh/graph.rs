// src/mesh/graph.rs
use crate::mesh::Mesh;
use petgraph::graph::UnGraph;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashSet};

impl Mesh {
    /// Граф смежности регионов: вес узла — id региона.
    #[must_use]
    pub fn region_graph(&self) -> UnGraph<usize, ()> {
        let mut graph = UnGraph::with_capacity(self.regions.len(), self.regions.len() * 3);
        let nodes: Vec<_> = self.regions.iter().map(|r| graph.add_node(r.id)).collect();

        let mut edges = HashSet::new();
        for region in &self.regions {
            for &n in &region.neighbors {
                let (a, b) = if region.id < n {
                    (region.id, n)
                } else {
                    (n, region.id)
                };
                if edges.insert((a, b)) {
                    graph.add_edge(nodes[a], nodes[b], ());
                }
            }
        }
        graph
    }

    /// Связные массивы суши: группы id сухопутных регионов, упорядоченные по
    /// наименьшему id в группе.
    #[must_use]
    pub fn landmasses(&self) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::<usize>::new(self.regions.len());
        for region in self.land_regions() {
            for &n in &region.neighbors {
                if self.regions[n].land {
                    sets.union(region.id, n);
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for region in self.land_regions() {
            groups.entry(sets.find(region.id)).or_default().push(region.id);
        }

        let mut result: Vec<Vec<usize>> = groups.into_values().collect();
        result.sort_by_key(|g| g[0]);
        result
    }
}
