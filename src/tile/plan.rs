use super::projection::project;
use super::TileCoord;
use crate::config::BoundingBox;

/// Inclusive rectangle of tile indices at one zoom level.
///
/// An inverted rectangle (`min > max` on either axis) is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl TileRange {
    pub fn width(&self) -> u64 {
        (self.max_x - self.min_x + 1).max(0) as u64
    }

    pub fn height(&self) -> u64 {
        (self.max_y - self.min_y + 1).max(0) as u64
    }

    pub fn len(&self) -> u64 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every tile in the rectangle, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let TileRange {
            zoom,
            min_x,
            min_y,
            max_x,
            max_y,
        } = *self;
        (min_x..=max_x).flat_map(move |x| {
            (min_y..=max_y).map(move |y| TileCoord {
                zoom,
                x: x as u32,
                y: y as u32,
            })
        })
    }
}

/// Computes the tiles covering `bbox` at `zoom`.
///
/// The top-left tile comes from the north-west corner and the bottom-right
/// tile from the south-east corner. The rectangle is intersected with the
/// `2^zoom` grid so every emitted `TileCoord` addresses a real tile.
pub fn plan_tiles(bbox: &BoundingBox, zoom: u8) -> TileRange {
    let (min_x, min_y) = project(bbox.north, bbox.west, zoom);
    let (max_x, max_y) = project(bbox.south, bbox.east, zoom);
    // TileCoord holds u32 indices, which also caps the grid for zoom > 32
    let last = 1_u64
        .checked_shl(zoom as u32)
        .map_or(u64::MAX, |n| n - 1)
        .min(u32::MAX as u64) as i64;
    TileRange {
        zoom,
        min_x: min_x.max(0),
        min_y: min_y.max(0),
        max_x: max_x.min(last),
        max_y: max_y.min(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_francisco() -> BoundingBox {
        BoundingBox {
            south: 37.7749,
            north: 37.8044,
            west: -122.4194,
            east: -122.3890,
        }
    }

    #[test]
    fn test_san_francisco_at_zoom_10_is_single_tile() {
        let range = plan_tiles(&san_francisco(), 10);
        assert_eq!((range.min_x, range.min_y), (163, 395));
        assert_eq!((range.max_x, range.max_y), (163, 395));
        let tiles: Vec<TileCoord> = range.tiles().collect();
        assert_eq!(
            tiles,
            vec![TileCoord {
                zoom: 10,
                x: 163,
                y: 395
            }]
        );
    }

    #[test]
    fn test_rectangle_size() {
        for zoom in [0_u8, 1, 10, 15, 16, 19] {
            let range = plan_tiles(&san_francisco(), zoom);
            let expected = (range.max_x - range.min_x + 1) * (range.max_y - range.min_y + 1);
            assert_eq!(range.tiles().count() as i64, expected, "zoom {}", zoom);
            assert_eq!(range.len() as i64, expected);
        }
    }

    #[test]
    fn test_san_francisco_at_zoom_16() {
        let range = plan_tiles(&san_francisco(), 16);
        assert_eq!((range.min_x, range.min_y), (10482, 25324));
        assert_eq!((range.max_x, range.max_y), (10487, 25331));
        assert_eq!(range.width(), 6);
        assert_eq!(range.height(), 8);
        assert_eq!(range.tiles().count(), 48);
    }

    #[test]
    fn test_tiles_are_unique_and_in_grid() {
        let range = plan_tiles(&san_francisco(), 15);
        let tiles: Vec<TileCoord> = range.tiles().collect();
        let unique: std::collections::HashSet<_> = tiles.iter().collect();
        assert_eq!(unique.len(), tiles.len());
        for tile in tiles {
            assert_eq!(tile.zoom, 15);
            assert!(tile.x < 1 << 15 && tile.y < 1 << 15);
        }
    }

    #[test]
    fn test_inverted_box_is_empty() {
        let bbox = BoundingBox {
            south: 37.8044,
            north: 37.7749,
            west: -122.3890,
            east: -122.4194,
        };
        let range = plan_tiles(&bbox, 16);
        assert!(range.is_empty());
        assert_eq!(range.tiles().count(), 0);
    }

    #[test]
    fn test_very_deep_zoom_stays_in_u32_grid() {
        for zoom in [32_u8, 40, 63, 64, 100] {
            let range = plan_tiles(&san_francisco(), zoom);
            assert!(range.max_x <= u32::MAX as i64, "zoom {}", zoom);
            assert!(range.max_y <= u32::MAX as i64, "zoom {}", zoom);
            assert!(range.min_x >= 0 && range.min_y >= 0, "zoom {}", zoom);
        }
    }

    #[test]
    fn test_whole_world_covers_grid() {
        let bbox = BoundingBox {
            south: -85.0,
            north: 85.0,
            west: -180.0,
            east: 180.0,
        };
        let range = plan_tiles(&bbox, 3);
        assert_eq!((range.min_x, range.min_y, range.max_x, range.max_y), (0, 0, 7, 7));
        assert_eq!(range.len(), 64);
    }
}
