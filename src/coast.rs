// src/coast.rs
//! Разметка суши и моря и извлечение береговых линий.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use crate::mesh::{Border, MapLocation, Mesh};

/// Береговая линия: id прибрежных границ в порядке обхода.
pub type CoastLine = Vec<usize>;

fn classify<T: MapLocation>(items: &mut [T], sea_level: f64) -> usize {
    let mut land = 0;
    for item in items {
        let is_land = item.elevation() > sea_level;
        item.set_land(is_land);
        land += usize::from(is_land);
    }
    land
}

impl Mesh {
    /// Помечает сушу (`высота > sea_level`) и прибрежные границы.
    ///
    /// Метки пересчитываются заново при каждом вызове. Граница прибрежная,
    /// если среди её регионов есть и суша, и море.
    pub fn set_land_and_sea(&mut self, sea_level: f64) {
        let land_points = classify(&mut self.points, sea_level);
        let land_regions = classify(&mut self.regions, sea_level);

        let regions = &self.regions;
        let mut coastal = 0;
        for border in &mut self.borders {
            let has_land = border.regions.iter().any(|&r| regions[r].land);
            let has_sea = border.regions.iter().any(|&r| !regions[r].land);
            border.coast = has_land && has_sea;
            coastal += usize::from(border.coast);
        }

        debug!(
            sea_level,
            land_points, land_regions, coastal, "Суша и море размечены"
        );
    }

    fn coastal_degree(&self, border: &Border) -> usize {
        border
            .neighbors
            .iter()
            .filter(|&&n| self.borders[n].coast)
            .count()
    }

    /// Начало береговой линии для компоненты, содержащей `from`: прибрежная
    /// граница не более чем с одним прибрежным соседом. Если такой нет,
    /// компонента — замкнутый контур, и начинать можно с самой `from`.
    fn find_coast_start(&self, from: usize, visited: &[bool]) -> usize {
        let mut seen = vec![false; self.borders.len()];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;

        while let Some(cur) = queue.pop_front() {
            if self.coastal_degree(&self.borders[cur]) <= 1 {
                return cur;
            }
            for &n in &self.borders[cur].neighbors {
                if !seen[n] && !visited[n] && self.borders[n].coast {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
        from
    }

    /// Разбивает все прибрежные границы на связные береговые линии.
    ///
    /// Обход в глубину со стеком. Каждая прибрежная граница попадает ровно в
    /// одну линию. В местах ветвления соседние элементы линии не обязаны
    /// быть соседями геометрически.
    #[must_use]
    pub fn coast_lines(&self) -> Vec<CoastLine> {
        let started = Instant::now();
        let mut visited = vec![false; self.borders.len()];
        let mut lines = Vec::new();

        for border in &self.borders {
            if !border.coast || visited[border.id] {
                continue;
            }
            let start = self.find_coast_start(border.id, &visited);

            let mut line = CoastLine::new();
            let mut stack = vec![start];
            while let Some(cur) = stack.pop() {
                if !self.borders[cur].coast {
                    break;
                }
                if visited[cur] {
                    continue;
                }
                visited[cur] = true;
                line.push(cur);
                stack.extend(
                    self.borders[cur]
                        .neighbors
                        .iter()
                        .copied()
                        .filter(|&n| self.borders[n].coast),
                );
            }
            if !line.is_empty() {
                lines.push(line);
            }
        }

        debug!(
            lines = lines.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Береговые линии извлечены"
        );
        lines
    }
}
