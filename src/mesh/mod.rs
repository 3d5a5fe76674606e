// src/mesh/mod.rs
//! Сетка карты: точки (вершины), границы (рёбра) и регионы (ячейки).
//!
//! Все три вида сущностей хранятся в аренах [`Mesh`] и ссылаются друг на друга
//! только индексами. Наборы связей заполняются один раз при сборке
//! ([`builder`]); дальнейшие проходы меняют лишь скалярные поля.

pub mod builder;
pub mod graph;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

pub use builder::{BuildStats, build_mesh};

/// Ссылка на точку или регион (цель стока для будущей эрозии).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationRef {
    Point(usize),
    Region(usize),
}

/// Общие данные любой позиции на карте.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub pos: Vec2,
    pub elevation: f64,
    pub precipitation: f64,
    pub temperature: f64,
    /// Накопленный поток воды. Пока не вычисляется.
    pub flux: f64,
    /// Куда стекает вода. Пока не вычисляется.
    pub flow: Option<LocationRef>,
}

impl Location {
    #[must_use]
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }
}

/// Сущность с позицией и высотой: точка или регион.
pub trait MapLocation {
    fn location(&self) -> &Location;
    fn location_mut(&mut self) -> &mut Location;

    fn pos(&self) -> Vec2 {
        self.location().pos
    }

    fn elevation(&self) -> f64 {
        self.location().elevation
    }

    fn is_land(&self) -> bool;
    fn set_land(&mut self, land: bool);
}

/// Вершина диаграммы Вороного.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: usize,
    pub location: Location,
    pub land: bool,
    pub borders: Vec<usize>,
    pub regions: Vec<usize>,
    pub neighbors: Vec<usize>,
}

impl Point {
    #[must_use]
    pub fn new(id: usize, pos: Vec2) -> Self {
        Self {
            id,
            location: Location::at(pos),
            land: false,
            borders: Vec::new(),
            regions: Vec::new(),
            neighbors: Vec::new(),
        }
    }
}

/// Ячейка Вороного вокруг одного сайта.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: usize,
    pub location: Location,
    pub land: bool,
    pub points: Vec<usize>,
    pub borders: Vec<usize>,
    pub neighbors: Vec<usize>,
}

impl Region {
    #[must_use]
    pub fn new(id: usize, site: Vec2) -> Self {
        Self {
            id,
            location: Location::at(site),
            land: false,
            points: Vec::new(),
            borders: Vec::new(),
            neighbors: Vec::new(),
        }
    }
}

/// Ребро между одним или двумя регионами.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Border {
    pub id: usize,
    /// Геометрия ребра: концы в порядке, заданном диаграммой.
    pub edge: [Vec2; 2],
    pub points: Vec<usize>,
    pub regions: Vec<usize>,
    pub neighbors: Vec<usize>,
    pub coast: bool,
    pub river: bool,
    pub settlement: bool,
}

impl Border {
    #[must_use]
    pub fn new(id: usize, edge: [Vec2; 2]) -> Self {
        Self {
            id,
            edge,
            points: Vec::new(),
            regions: Vec::new(),
            neighbors: Vec::new(),
            coast: false,
            river: false,
            settlement: false,
        }
    }
}

macro_rules! impl_map_location {
    ($ty:ty) => {
        impl MapLocation for $ty {
            fn location(&self) -> &Location {
                &self.location
            }

            fn location_mut(&mut self) -> &mut Location {
                &mut self.location
            }

            fn is_land(&self) -> bool {
                self.land
            }

            fn set_land(&mut self, land: bool) {
                self.land = land;
            }
        }
    };
}

impl_map_location!(Point);
impl_map_location!(Region);

/// Добавляет индекс в список связей, если его там ещё нет.
pub(crate) fn link(list: &mut Vec<usize>, idx: usize) {
    if !list.contains(&idx) {
        list.push(idx);
    }
}

/// Полностью связанная сетка карты.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub points: Vec<Point>,
    pub borders: Vec<Border>,
    pub regions: Vec<Region>,
}

impl Mesh {
    /// Регион, центр которого ближе всего к `pos`.
    #[must_use]
    pub fn nearest_region(&self, pos: Vec2) -> Option<&Region> {
        self.regions.iter().min_by(|a, b| {
            let da = crate::geometry::distance_sq(a.location.pos, pos);
            let db = crate::geometry::distance_sq(b.location.pos, pos);
            da.total_cmp(&db)
        })
    }

    pub fn coastal_borders(&self) -> impl Iterator<Item = &Border> {
        self.borders.iter().filter(|b| b.coast)
    }

    pub fn land_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.land)
    }
}
