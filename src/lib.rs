pub mod coast;
pub mod config;
pub mod error;
pub mod geometry;
pub mod map;
pub mod mesh;
pub mod sampling;
pub mod terrain;
pub mod voronoi;

pub use coast::CoastLine;
pub use config::{MapParams, TerrainFeature};
pub use error::MapError;
pub use map::TerrainMap;
pub use mesh::{Border, BuildStats, MapLocation, Mesh, Point, Region, build_mesh};
pub use terrain::{RangePlacement, RangeSpec};
