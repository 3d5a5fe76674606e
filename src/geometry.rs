// src/geometry.rs
//! Базовая геометрия карты: координаты, прямоугольник карты и ключи позиций.
//!
//! Ключи позиций используются только при сборке сетки, чтобы сопоставить
//! вершины и рёбра диаграммы с уже созданными сущностями. После сборки
//! сущности идентифицируются исключительно индексами в аренах.

use serde::{Deserialize, Serialize};

/// Точка на плоскости `[x, y]`.
pub type Vec2 = [f64; 2];

/// Шаг квантования координат для ключей позиций.
pub const POSITION_QUANTUM: f64 = 1e-6;

#[must_use]
pub fn distance_sq(a: Vec2, b: Vec2) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    distance_sq(a, b).sqrt()
}

/// Ограничивающий прямоугольник карты (ось Y направлена вниз, как у растровой карты).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Прямоугольник `[0, width] × [0, height]`.
    #[must_use]
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            right: width,
            top: 0.0,
            bottom: height,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p[0] >= self.left && p[0] <= self.right && p[1] >= self.top && p[1] <= self.bottom
    }

    /// Углы прямоугольника в порядке обхода: левый верхний, правый верхний,
    /// правый нижний, левый нижний.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            [self.left, self.top],
            [self.right, self.top],
            [self.right, self.bottom],
            [self.left, self.bottom],
        ]
    }
}

/// Квантованный ключ позиции.
///
/// Две позиции, отличающиеся меньше чем на [`POSITION_QUANTUM`], как правило
/// дают один и тот же ключ; точное совпадение двоичного представления не требуется.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(i64, i64);

impl PositionKey {
    #[must_use]
    pub fn from_pos(pos: Vec2) -> Self {
        Self(quantize(pos[0]), quantize(pos[1]))
    }
}

fn quantize(v: f64) -> i64 {
    (v / POSITION_QUANTUM).round() as i64
}

/// Ключ ребра: пара ключей концов в фиксированном (отсортированном) порядке,
/// поэтому не зависит от ориентации ребра.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderKey(PositionKey, PositionKey);

impl BorderKey {
    #[must_use]
    pub fn from_endpoints(a: Vec2, b: Vec2) -> Self {
        let ka = PositionKey::from_pos(a);
        let kb = PositionKey::from_pos(b);
        if ka <= kb { Self(ka, kb) } else { Self(kb, ka) }
    }
}
