// src/terrain.rs
//! Ядра рельефа: холм, конус, склон и горный хребет.
//!
//! Каждое ядро прибавляет свой вклад к высоте всех точек и регионов в зоне
//! влияния. Ядра складываются (суперпозиция), ни одно не перезаписывает высоту.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MapError;
use crate::geometry::Vec2;
use crate::mesh::{MapLocation, Mesh};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Вероятность того, что кандидат внутри эллипса станет вершиной хребта.
const RANGE_ACCEPT_PROBABILITY: f64 = 0.1;
/// Доля конусов среди вершин хребта (остальные — холмы).
const RANGE_CONE_PROBABILITY: f64 = 0.5;

/// Профиль холма: гладкое ядро Вендланда, 1 в центре и 0 на краю радиуса
/// с нулевыми первой и второй производными.
#[must_use]
pub fn hill_profile(dist_sq: f64, radius: f64) -> f64 {
    let r_sq = radius * radius;
    if dist_sq >= r_sq {
        return 0.0;
    }
    let c1 = (4.0 / 9.0) * radius.powi(-6);
    let c2 = (17.0 / 9.0) * radius.powi(-4);
    let c3 = (22.0 / 9.0) * radius.powi(-2);
    1.0 - c1 * dist_sq.powi(3) + c2 * dist_sq.powi(2) - c3 * dist_sq
}

/// Профиль конуса: линейный спад от 1 в центре до 0 на краю.
#[must_use]
pub fn cone_profile(dist_sq: f64, radius: f64) -> f64 {
    if dist_sq >= radius * radius {
        return 0.0;
    }
    1.0 - dist_sq.sqrt() / radius
}

/// Вклад одностороннего склона в точке `pos`.
///
/// Поперечное расстояние до оси `anchor + t·dir` ограничивается `radius`.
/// С одной стороны оси (векторное произведение смещения и направления `>= 0`)
/// вклад растёт от `h/2` на оси до `h` на расстоянии `radius`; с другой
/// стороны остаётся `h/2`.
#[must_use]
pub fn slope_value(pos: Vec2, anchor: Vec2, dir: Vec2, radius: f64, height: f64) -> f64 {
    let dx = pos[0] - anchor[0];
    let dy = pos[1] - anchor[1];
    let along = dx * dir[0] + dy * dir[1];
    let off_x = dx - along * dir[0];
    let off_y = dy - along * dir[1];
    let dist = off_x.hypot(off_y).min(radius);

    let cross = dx * dir[1] - dy * dir[0];
    let low = 0.5 * height;
    let high = if cross < 0.0 { low } else { height };
    low + (dist / radius) * (high - low)
}

/// Добавляет вклад ядра к высоте каждой сущности, для которой он определён.
fn accumulate<T, F>(items: &mut [T], contribution: F)
where
    T: MapLocation + Send,
    F: Fn(Vec2) -> Option<f64> + Sync,
{
    #[cfg(feature = "parallel")]
    let iter = items.par_iter_mut();
    #[cfg(not(feature = "parallel"))]
    let iter = items.iter_mut();

    iter.for_each(|item| {
        if let Some(dh) = contribution(item.pos()) {
            item.location_mut().elevation += dh;
        }
    });
}

/// Вершина хребта: холм или конус.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakKind {
    Hill,
    Cone,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacedPeak {
    pub kind: PeakKind,
    pub center: Vec2,
    pub radius: f64,
    pub height: f64,
}

/// Параметры горного хребта.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeSpec {
    pub anchor: Vec2,
    pub direction: Vec2,
    /// Полуось вдоль направления (после упорядочивания — меньшая).
    pub a: f64,
    pub b: f64,
    pub height: f64,
    pub count: usize,
}

/// Итог размещения хребта. Нехватка вершин — не паника и не зависание,
/// а обычный результат с `is_exhausted() == true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangePlacement {
    pub requested: usize,
    pub scans: usize,
    pub peaks: Vec<PlacedPeak>,
}

impl RangePlacement {
    #[must_use]
    pub fn placed(&self) -> usize {
        self.peaks.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.placed() < self.requested
    }

    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed())
    }

    /// Превращает нехватку вершин в [`MapError::PlacementExhausted`].
    pub fn into_result(self) -> Result<Self, MapError> {
        if self.is_exhausted() {
            Err(MapError::PlacementExhausted {
                placed: self.placed(),
                requested: self.requested,
            })
        } else {
            Ok(self)
        }
    }
}

impl Mesh {
    /// Гладкий холм высотой `height` в `center`.
    pub fn add_hill(&mut self, center: Vec2, radius: f64, height: f64) {
        if radius <= 0.0 || !radius.is_finite() {
            warn!(radius, "Холм с неположительным радиусом пропущен");
            return;
        }
        let r_sq = radius * radius;
        let kernel = |pos: Vec2| {
            let d_sq = crate::geometry::distance_sq(pos, center);
            (d_sq < r_sq).then(|| height * hill_profile(d_sq, radius))
        };
        accumulate(&mut self.points, kernel);
        accumulate(&mut self.regions, kernel);
    }

    /// Линейный конус высотой `height` в `center`.
    pub fn add_cone(&mut self, center: Vec2, radius: f64, height: f64) {
        if radius <= 0.0 || !radius.is_finite() {
            warn!(radius, "Конус с неположительным радиусом пропущен");
            return;
        }
        let r_sq = radius * radius;
        let kernel = |pos: Vec2| {
            let d_sq = crate::geometry::distance_sq(pos, center);
            (d_sq < r_sq).then(|| height * cone_profile(d_sq, radius))
        };
        accumulate(&mut self.points, kernel);
        accumulate(&mut self.regions, kernel);
    }

    /// Односторонний склон вдоль оси `anchor + t·direction`. Затрагивает всю карту.
    ///
    /// Направление нормируется; нулевое направление или неположительный радиус
    /// оставляют высоты без изменений.
    pub fn add_slope(&mut self, anchor: Vec2, direction: Vec2, radius: f64, height: f64) {
        let len = direction[0].hypot(direction[1]);
        if len <= f64::EPSILON || radius <= 0.0 || !radius.is_finite() {
            warn!(?direction, radius, "Вырожденный склон пропущен");
            return;
        }
        let dir = [direction[0] / len, direction[1] / len];
        let kernel = |pos: Vec2| Some(slope_value(pos, anchor, dir, radius, height));
        accumulate(&mut self.points, kernel);
        accumulate(&mut self.regions, kernel);
    }

    /// Горный хребет: случайные холмы и конусы в повёрнутом эллипсе.
    ///
    /// Просматривает все точки, затем все регионы; кандидат внутри эллипса
    /// принимается с вероятностью 10%. Проходы повторяются, пока не размещено
    /// `count` вершин, но не более `max_scans` раз. Если очередной проход не
    /// нашёл ни одного кандидата внутри эллипса, размещение прекращается сразу.
    pub fn add_range<R: Rng + ?Sized>(
        &mut self,
        spec: &RangeSpec,
        unit: f64,
        max_scans: usize,
        rng: &mut R,
    ) -> RangePlacement {
        let mut result = RangePlacement {
            requested: spec.count,
            scans: 0,
            peaks: Vec::with_capacity(spec.count),
        };

        let (a, b) = if spec.a > spec.b {
            (spec.b, spec.a)
        } else {
            (spec.a, spec.b)
        };
        if spec.count == 0 {
            return result;
        }
        if a <= 0.0 || !b.is_finite() {
            warn!(a, b, "Хребет с вырожденными полуосями пропущен");
            return result;
        }
        if spec.height <= 0.0 || !spec.height.is_finite() {
            warn!(height = spec.height, "Хребет с неположительной высотой пропущен");
            return result;
        }

        let (sin, cos) = spec.direction[1].atan2(spec.direction[0]).sin_cos();
        let (a_sq, b_sq) = (a * a, b * b);
        let metric = |pos: Vec2| {
            let dx = pos[0] - spec.anchor[0];
            let dy = pos[1] - spec.anchor[1];
            let u = cos * dx + sin * dy;
            let v = sin * dx - cos * dy;
            u * u / a_sq + v * v / b_sq
        };

        let n_points = self.points.len();
        let total = n_points + self.regions.len();

        while result.placed() < spec.count && result.scans < max_scans {
            result.scans += 1;
            let mut inside = 0usize;

            for i in 0..total {
                if result.placed() >= spec.count {
                    break;
                }
                let pos = if i < n_points {
                    self.points[i].location.pos
                } else {
                    self.regions[i - n_points].location.pos
                };
                let d = metric(pos);
                if d > 1.0 {
                    continue;
                }
                inside += 1;
                if !rng.gen_bool(RANGE_ACCEPT_PROBABILITY) {
                    continue;
                }

                let radius = (a + rng.r#gen::<f64>() * (spec.height - a)) * unit;
                let height = spec.height / 2.0 + spec.height * (1.0 - d) / 2.0;
                let kind = if rng.gen_bool(RANGE_CONE_PROBABILITY) {
                    self.add_cone(pos, radius, height);
                    PeakKind::Cone
                } else {
                    self.add_hill(pos, radius, height);
                    PeakKind::Hill
                };
                result.peaks.push(PlacedPeak {
                    kind,
                    center: pos,
                    radius,
                    height,
                });
            }

            if inside == 0 {
                break;
            }
        }

        if result.is_exhausted() {
            warn!(
                placed = result.placed(),
                requested = result.requested,
                scans = result.scans,
                "Хребет размещён не полностью"
            );
        } else {
            debug!(
                placed = result.placed(),
                scans = result.scans,
                "Хребет размещён"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Point, Region};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Регионы и точки на отрезке y = 0, x = 0..=n.
    fn line_mesh(n: usize) -> Mesh {
        let mut mesh = Mesh::default();
        for i in 0..=n {
            mesh.points.push(Point::new(i, [i as f64, 0.0]));
            mesh.regions.push(Region::new(i, [i as f64, 0.0]));
        }
        mesh
    }

    #[test]
    fn hill_profile_center_and_rim() {
        assert!(close(hill_profile(0.0, 20.0), 1.0));
        assert!(close(hill_profile(400.0, 20.0), 0.0));
        // формула сама обращается в ноль на краю
        let r: f64 = 7.0;
        let at_rim = 1.0 - (4.0 / 9.0) + (17.0 / 9.0) - (22.0 / 9.0);
        assert!(close(at_rim, 0.0));
        assert!(hill_profile(r * r * 0.99, r) > 0.0);
        assert!(hill_profile(r * r * 0.99, r) < 1e-3);
    }

    #[test]
    fn cone_profile_is_linear() {
        assert!(close(cone_profile(0.0, 8.0), 1.0));
        assert!(close(cone_profile(16.0, 8.0), 0.5));
        assert!(close(cone_profile(64.0, 8.0), 0.0));
    }

    #[test]
    fn hill_accumulates_on_points_and_regions() {
        let mut mesh = line_mesh(30);
        mesh.add_hill([0.0, 0.0], 20.0, 5.0);
        mesh.add_hill([0.0, 0.0], 20.0, 5.0);

        assert!(close(mesh.points[0].location.elevation, 10.0));
        assert!(close(mesh.regions[0].location.elevation, 10.0));
        assert!(close(mesh.regions[20].location.elevation, 0.0));
        assert!(close(mesh.regions[25].location.elevation, 0.0));
        assert!(mesh.regions[10].location.elevation > 0.0);
    }

    #[test]
    fn cone_half_height_at_half_radius() {
        let mut mesh = line_mesh(10);
        mesh.add_cone([0.0, 0.0], 8.0, 3.0);
        assert!(close(mesh.regions[4].location.elevation, 1.5));
        assert!(close(mesh.points[0].location.elevation, 3.0));
        assert!(close(mesh.points[8].location.elevation, 0.0));
    }

    #[test]
    fn zero_radius_is_noop() {
        let mut mesh = line_mesh(3);
        mesh.add_hill([0.0, 0.0], 0.0, 5.0);
        mesh.add_cone([0.0, 0.0], -1.0, 5.0);
        assert!(mesh.regions.iter().all(|r| r.location.elevation == 0.0));
    }

    #[test]
    fn slope_is_one_sided() {
        let dir = [1.0, 0.0];
        // на оси — половина высоты
        assert!(close(slope_value([5.0, 0.0], [0.0, 0.0], dir, 10.0, 4.0), 2.0));
        // cross = dx*dir.y - dy*dir.x = -dy: при y < 0 сторона растёт
        assert!(close(slope_value([5.0, -5.0], [0.0, 0.0], dir, 10.0, 4.0), 3.0));
        assert!(close(slope_value([5.0, -50.0], [0.0, 0.0], dir, 10.0, 4.0), 4.0));
        // другая сторона плоская
        assert!(close(slope_value([5.0, 5.0], [0.0, 0.0], dir, 10.0, 4.0), 2.0));
        assert!(close(slope_value([5.0, 50.0], [0.0, 0.0], dir, 10.0, 4.0), 2.0));
    }

    #[test]
    fn slope_normalizes_direction() {
        let mut a = line_mesh(4);
        let mut b = line_mesh(4);
        a.add_slope([0.0, 1.0], [0.0, 1.0], 2.0, 4.0);
        b.add_slope([0.0, 1.0], [0.0, 10.0], 2.0, 4.0);
        for (pa, pb) in a.points.iter().zip(&b.points) {
            assert!(close(pa.location.elevation, pb.location.elevation));
        }
    }

    #[test]
    fn range_places_requested_peaks() {
        let mut mesh = line_mesh(40);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spec = RangeSpec {
            anchor: [20.0, 0.0],
            direction: [1.0, 0.0],
            a: 2.0,
            b: 15.0,
            height: 6.0,
            count: 5,
        };
        let placement = mesh.add_range(&spec, 1.0, 1000, &mut rng);

        assert_eq!(placement.placed(), 5);
        assert!(!placement.is_exhausted());
        for peak in &placement.peaks {
            assert!(peak.height >= 3.0 - 1e-9 && peak.height <= 6.0 + 1e-9);
            assert!(peak.radius >= 2.0 && peak.radius <= 6.0);
        }
        assert!(mesh.regions.iter().any(|r| r.location.elevation > 0.0));
    }

    #[test]
    fn range_outside_mesh_reports_exhaustion() {
        let mut mesh = line_mesh(10);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let spec = RangeSpec {
            anchor: [500.0, 500.0],
            direction: [0.0, 1.0],
            a: 1.0,
            b: 2.0,
            height: 3.0,
            count: 4,
        };
        let placement = mesh.add_range(&spec, 1.0, 1000, &mut rng);

        assert_eq!(placement.placed(), 0);
        assert_eq!(placement.scans, 1);
        assert_eq!(placement.shortfall(), 4);
        assert!(matches!(
            placement.into_result(),
            Err(MapError::PlacementExhausted {
                placed: 0,
                requested: 4
            })
        ));
    }

    #[test]
    fn range_respects_scan_budget() {
        let mut mesh = line_mesh(0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spec = RangeSpec {
            anchor: [0.0, 0.0],
            direction: [1.0, 0.0],
            a: 1.0,
            b: 1.0,
            height: 2.0,
            count: 1000,
        };
        let placement = mesh.add_range(&spec, 1.0, 7, &mut rng);
        assert_eq!(placement.scans, 7);
        assert!(placement.is_exhausted());
    }

    #[test]
    fn negative_range_height_places_nothing() {
        let mut mesh = line_mesh(40);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let spec = RangeSpec {
            anchor: [20.0, 0.0],
            direction: [1.0, 0.0],
            a: 2.0,
            b: 15.0,
            height: -4.0,
            count: 6,
        };
        let placement = mesh.add_range(&spec, 1.0, 1000, &mut rng);

        assert_eq!(placement.placed(), 0);
        assert_eq!(placement.scans, 0);
        assert!(placement.peaks.iter().all(|p| p.radius > 0.0));
        assert!(mesh.regions.iter().all(|r| r.location.elevation == 0.0));
    }
}
