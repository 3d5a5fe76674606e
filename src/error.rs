// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Invalid map parameters: width={width}, height={height}, min_distance={min_distance} (all must be finite and > 0)"
    )]
    InvalidParams {
        width: f64,
        height: f64,
        min_distance: f64,
    },

    /// Горный хребет не смог разместить все запрошенные вершины.
    #[error("Range placement exhausted: placed {placed} of {requested} features")]
    PlacementExhausted { placed: usize, requested: usize },
}
