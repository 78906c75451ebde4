use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TILE_URL: &str = "https://t.ssl.ak.dynamic.tiles.virtualearth.net/comp/ch/{quadkey}?mkt=en-us&it=A,G,L,LA&shading=hill";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const MAX_ZOOM: u8 = 23;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidBoundingBox(String),
    InvalidZoom(String),
    InvalidConcurrency(usize),
    InvalidUrlTemplate(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBoundingBox(reason) => write!(f, "invalid bounding box: {}", reason),
            ConfigError::InvalidZoom(reason) => write!(f, "invalid zoom levels: {}", reason),
            ConfigError::InvalidConcurrency(n) => {
                write!(f, "concurrency must be at least 1, got {}", n)
            }
            ConfigError::InvalidUrlTemplate(url) => {
                write!(f, "tile url template is missing {{quadkey}}: {}", url)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Geographic bounds in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoundingBox {
            south,
            north,
            west,
            east,
        } = *self;
        if !(south > -90.0 && north < 90.0) {
            return Err(ConfigError::InvalidBoundingBox(format!(
                "latitudes must be strictly between -90 and 90 (south {}, north {})",
                south, north
            )));
        }
        if !(west >= -180.0 && east <= 180.0) {
            return Err(ConfigError::InvalidBoundingBox(format!(
                "longitudes must be between -180 and 180 (west {}, east {})",
                west, east
            )));
        }
        if !(south < north) {
            return Err(ConfigError::InvalidBoundingBox(format!(
                "south {} must be less than north {}",
                south, north
            )));
        }
        if !(west < east) {
            return Err(ConfigError::InvalidBoundingBox(format!(
                "west {} must be less than east {}",
                west, east
            )));
        }
        Ok(())
    }
}

/// A contiguous span of zoom levels.
///
/// Parsed from `N`, `A-B`, `A..=B` (inclusive) or `A..B` (exclusive upper).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub low: u8,
    pub high: u8,
    pub inclusive: bool,
}

impl ZoomRange {
    pub fn single(zoom: u8) -> Self {
        ZoomRange {
            low: zoom,
            high: zoom,
            inclusive: true,
        }
    }

    pub fn levels(&self) -> Vec<u8> {
        if self.inclusive {
            (self.low..=self.high).collect()
        } else {
            (self.low..self.high).collect()
        }
    }
}

fn parse_zoom(s: &str) -> Result<u8, ConfigError> {
    let zoom = s
        .trim()
        .parse::<u8>()
        .map_err(|_| ConfigError::InvalidZoom(format!("'{}' is not a zoom level", s)))?;
    if zoom > MAX_ZOOM {
        return Err(ConfigError::InvalidZoom(format!(
            "{} is above the maximum zoom of {}",
            zoom, MAX_ZOOM
        )));
    }
    Ok(zoom)
}

impl FromStr for ZoomRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high, inclusive) = if let Some((low, high)) = s.split_once("..=") {
            (low, high, true)
        } else if let Some((low, high)) = s.split_once("..") {
            (low, high, false)
        } else if let Some((low, high)) = s.split_once('-') {
            (low, high, true)
        } else {
            return Ok(ZoomRange::single(parse_zoom(s)?));
        };
        let range = ZoomRange {
            low: parse_zoom(low)?,
            high: parse_zoom(high)?,
            inclusive,
        };
        if range.levels().is_empty() {
            return Err(ConfigError::InvalidZoom(format!(
                "'{}' contains no zoom levels",
                s
            )));
        }
        Ok(range)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        ZoomRange {
            low: 1,
            high: 19,
            inclusive: true,
        }
    }
}

/// Everything a run needs. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub bounding_box: BoundingBox,
    pub zoom_levels: Vec<u8>,
    pub concurrency: usize,
    pub url_template: String,
}

impl Config {
    pub fn new(
        output_dir: PathBuf,
        bounding_box: BoundingBox,
        zoom_range: ZoomRange,
        concurrency: usize,
        url_template: String,
    ) -> Result<Config, ConfigError> {
        bounding_box.validate()?;
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(concurrency));
        }
        if !url_template.contains("{quadkey}") {
            return Err(ConfigError::InvalidUrlTemplate(url_template));
        }
        Ok(Config {
            output_dir,
            bounding_box,
            zoom_levels: zoom_range.levels(),
            concurrency,
            url_template,
        })
    }
}
