// src/sampling.rs
//! Расстановка центров регионов (сайтов) по прямоугольнику карты.
//!
//! Ядро карты не зависит от конкретного алгоритма: ему нужен лишь набор точек
//! внутри `[0, width] × [0, height]` с попарным расстоянием не меньше заданного.

use crate::geometry::{Vec2, distance_sq};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Источник сайтов для диаграммы Вороного.
pub trait SiteSampler {
    /// Возвращает точки внутри прямоугольника с попарным расстоянием `>= min_distance`.
    fn sample(&mut self, width: f64, height: f64, min_distance: f64) -> Vec<Vec2>;
}

/// Число попыток найти нового соседа для активной точки (алгоритм Бридсона).
const DEFAULT_ATTEMPTS: usize = 30;

/// Предел числа ячеек фоновой сетки.
const MAX_GRID_CELLS: usize = 1 << 26;

/// Выборка «синего шума» по алгоритму Бридсона.
///
/// Первая точка ставится в центр прямоугольника, поэтому центр карты всегда
/// совпадает с центром какого-то региона.
#[derive(Debug, Clone)]
pub struct PoissonDiskSampler {
    rng: ChaCha8Rng,
    attempts: usize,
}

impl PoissonDiskSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

/// Фоновая сетка: в каждой ячейке со стороной `r/√2` не больше одной точки.
struct BackgroundGrid {
    cell: f64,
    cols: usize,
    rows: usize,
    slots: Vec<Option<usize>>,
}

impl BackgroundGrid {
    /// `None`, если сетка не помещается в память.
    fn new(width: f64, height: f64, min_distance: f64) -> Option<Self> {
        let cell = min_distance / std::f64::consts::SQRT_2;
        let cols = (width / cell).ceil();
        let rows = (height / cell).ceil();
        if !(cols.is_finite() && rows.is_finite()) || cols * rows > MAX_GRID_CELLS as f64 {
            return None;
        }
        let cols = (cols as usize).max(1);
        let rows = (rows as usize).max(1);
        let len = cols.checked_mul(rows).filter(|&n| n <= MAX_GRID_CELLS)?;
        Some(Self {
            cell,
            cols,
            rows,
            slots: vec![None; len],
        })
    }

    fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let cx = ((p[0] / self.cell) as usize).min(self.cols - 1);
        let cy = ((p[1] / self.cell) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: Vec2, idx: usize) {
        let (cx, cy) = self.cell_of(p);
        self.slots[cy * self.cols + cx] = Some(idx);
    }

    fn is_free(&self, p: Vec2, points: &[Vec2], min_distance: f64) -> bool {
        let (cx, cy) = self.cell_of(p);
        let min_sq = min_distance * min_distance;
        let x0 = cx.saturating_sub(2);
        let y0 = cy.saturating_sub(2);
        let x1 = (cx + 2).min(self.cols - 1);
        let y1 = (cy + 2).min(self.rows - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(idx) = self.slots[y * self.cols + x] {
                    if distance_sq(points[idx], p) < min_sq {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl SiteSampler for PoissonDiskSampler {
    fn sample(&mut self, width: f64, height: f64, min_distance: f64) -> Vec<Vec2> {
        if !(width > 0.0 && height > 0.0 && min_distance > 0.0) {
            return Vec::new();
        }
        let Some(mut grid) = BackgroundGrid::new(width, height, min_distance) else {
            warn!(width, height, min_distance, "Слишком мелкий шаг выборки");
            return Vec::new();
        };
        let mut points: Vec<Vec2> = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        let first = [width * 0.5, height * 0.5];
        grid.insert(first, 0);
        points.push(first);
        active.push(0);

        while !active.is_empty() {
            let slot = self.rng.gen_range(0..active.len());
            let origin = points[active[slot]];
            let mut found = false;

            for _ in 0..self.attempts {
                let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
                let radius = self.rng.gen_range(min_distance..2.0 * min_distance);
                let candidate = [
                    origin[0] + radius * angle.cos(),
                    origin[1] + radius * angle.sin(),
                ];
                if candidate[0] < 0.0
                    || candidate[0] >= width
                    || candidate[1] < 0.0
                    || candidate[1] >= height
                {
                    continue;
                }
                if grid.is_free(candidate, &points, min_distance) {
                    let idx = points.len();
                    points.push(candidate);
                    grid.insert(candidate, idx);
                    active.push(idx);
                    found = true;
                    break;
                }
            }

            if !found {
                active.swap_remove(slot);
            }
        }

        points
    }
}
