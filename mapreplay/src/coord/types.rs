//! Coordinate types, projection bounds, and errors.

use std::fmt;

use thiserror::Error;

/// Minimum latitude of the global map.
pub const MIN_LAT: f64 = -90.0;

/// Maximum latitude of the global map.
pub const MAX_LAT: f64 = 90.0;

/// Minimum longitude of the global map.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude of the global map.
pub const MAX_LON: f64 = 180.0;

/// Built-in resolution tiers, largest first.
///
/// Each tier matches one of the equirectangular background images shipped
/// with the map (2:1 aspect ratio).
pub const MAP_TIERS: &[ResolutionTier] = &[
    ResolutionTier::new(7200, 3600, 4),
    ResolutionTier::new(3600, 1800, 2),
    ResolutionTier::new(1800, 900, 1),
];

/// A discrete pixel resolution the map can be drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionTier {
    /// Width of the drawable map in pixels.
    pub width: u32,
    /// Height of the drawable map in pixels.
    pub height: u32,
    /// Multiplier for marker radii, line widths and font sizes.
    pub scale: u32,
}

impl ResolutionTier {
    /// Create a new resolution tier.
    pub const fn new(width: u32, height: u32, scale: u32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Whether this tier fits strictly inside the given screen area.
    ///
    /// The comparison is strict because the available area is measured
    /// before window chrome is subtracted.
    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width < max_width && self.height < max_height
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} (x{})", self.width, self.height, self.scale)
    }
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees (north positive).
    pub lat: f64,
    /// Longitude in degrees (east positive).
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.lat, self.lon)
    }
}

/// A position in screen space.
///
/// Kept as floating point so interpolation between two projected points is
/// exact; call [`PixelPoint::truncated`] when integer pixels are required.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    /// Horizontal pixel offset from the left edge.
    pub x: f64,
    /// Vertical pixel offset from the top edge.
    pub y: f64,
}

impl PixelPoint {
    /// Create a new pixel point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `ratio` 0 yields `self`, 1 yields `other`.
    pub fn lerp(self, other: PixelPoint, ratio: f64) -> PixelPoint {
        PixelPoint {
            x: self.x + (other.x - self.x) * ratio,
            y: self.y + (other.y - self.y) * ratio,
        }
    }

    /// Integer pixel coordinates, truncated towards zero.
    pub fn truncated(self) -> (i64, i64) {
        (self.x as i64, self.y as i64)
    }
}

/// The projected region and its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    /// Zoom factor; the region spans 180/zoom × 360/zoom degrees.
    pub zoom: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Scale factor of the selected tier.
    pub scale: u32,
}

impl Viewport {
    /// Whether a geographic point falls inside the region (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Geographic center of the region.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            self.min_lat + (self.max_lat - self.min_lat) / 2.0,
            self.min_lon + (self.max_lon - self.min_lon) / 2.0,
        )
    }
}

/// Errors from coordinate parsing and projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Zoom factor must be at least 1.
    #[error("Invalid zoom factor: {0} (must be at least 1)")]
    InvalidZoom(u32),

    /// The requested crop region leaves the global map.
    #[error("Crop region ({min_lat}, {min_lon}) to ({max_lat}, {max_lon}) exceeds global bounds")]
    RegionOutOfBounds {
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    },

    /// No resolution tier fits the available screen area.
    #[error("Unsupported screen resolution {width}x{height}")]
    UnsupportedResolution { width: u32, height: u32 },

    /// A projection was requested before a resolution was selected.
    #[error("Pixel resolution must be set before projecting")]
    NotConfigured,

    /// Latitude lies outside the configured region.
    #[error("Latitude {0} is outside the projected region")]
    LatitudeOutOfRange(f64),

    /// Longitude lies outside the configured region.
    #[error("Longitude {0} is outside the projected region")]
    LongitudeOutOfRange(f64),

    /// A degree/minute/second string could not be parsed.
    #[error("Invalid degree minute second value '{0}'")]
    InvalidDms(String),
}

impl CoordError {
    /// Whether this error stems from projector configuration rather than
    /// from the point being projected.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CoordError::InvalidZoom(_)
                | CoordError::RegionOutOfBounds { .. }
                | CoordError::UnsupportedResolution { .. }
                | CoordError::NotConfigured
        )
    }

    /// Whether this error means the point lies outside the projected region.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            CoordError::LatitudeOutOfRange(_) | CoordError::LongitudeOutOfRange(_)
        )
    }
}
