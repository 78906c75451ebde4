use serde::Serialize;
use std::fmt::{self, Display};

pub mod plan;
pub mod projection;
pub mod quadkey;

pub use plan::plan_tiles;

/// A single tile in the zoom/x/y grid. `x` and `y` are in `[0, 2^zoom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn quadkey(&self) -> String {
        quadkey::encode(self.x, self.y, self.zoom)
    }
}

impl Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
