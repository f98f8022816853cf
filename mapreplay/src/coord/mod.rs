//! Coordinate projection module
//!
//! Provides the equirectangular projection from geographic coordinates
//! (latitude/longitude) to screen pixels used by the replay map, along with
//! crop-region selection and the discrete resolution tiers the background
//! map is available in.
//!
//! # Example
//!
//! ```
//! use mapreplay::coord::Projector;
//!
//! let mut projector = Projector::new();
//! projector.configure(-5.0, -120.0, 2).unwrap();
//! projector.set_resolution(4000, 2200).unwrap();
//!
//! let point = projector.project(40.0, -80.0).unwrap();
//! assert!(point.x > 0.0 && point.y > 0.0);
//! ```

mod dms;
mod types;

pub use dms::{parse_coord_pair, parse_dms};
pub use types::{
    CoordError, GeoPoint, PixelPoint, ResolutionTier, Viewport, MAP_TIERS, MAX_LAT, MAX_LON,
    MIN_LAT, MIN_LON,
};

use std::fmt;

use tracing::debug;

/// Latitude/longitude to pixel converter.
///
/// A projector starts out covering the whole globe at zoom 1 with no pixel
/// resolution. [`Projector::set_resolution`] must be called before
/// [`Projector::project`]; [`Projector::configure`] optionally crops the
/// region first.
#[derive(Debug, Clone)]
pub struct Projector {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u32,
    tiers: Vec<ResolutionTier>,
    tier: Option<ResolutionTier>,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

impl Projector {
    /// Create a projector over the whole globe using the built-in tiers.
    pub fn new() -> Self {
        Self::with_tiers(MAP_TIERS.to_vec())
    }

    /// Create a projector with a custom tier table, ordered largest first.
    pub fn with_tiers(tiers: Vec<ResolutionTier>) -> Self {
        Self {
            min_lat: MIN_LAT,
            min_lon: MIN_LON,
            max_lat: MAX_LAT,
            max_lon: MAX_LON,
            zoom: 1,
            tiers,
            tier: None,
        }
    }

    /// Crop the projected region.
    ///
    /// The region starts at (`crop_min_lat`, `crop_min_lon`) and spans
    /// 180/zoom degrees of latitude and 360/zoom degrees of longitude.
    /// On error the previous region is kept.
    pub fn configure(
        &mut self,
        crop_min_lat: f64,
        crop_min_lon: f64,
        zoom: u32,
    ) -> Result<(), CoordError> {
        if zoom == 0 {
            return Err(CoordError::InvalidZoom(zoom));
        }

        let max_lat = crop_min_lat + (MAX_LAT - MIN_LAT) / zoom as f64;
        let max_lon = crop_min_lon + (MAX_LON - MIN_LON) / zoom as f64;

        let in_bounds = crop_min_lat >= MIN_LAT
            && crop_min_lon >= MIN_LON
            && max_lat <= MAX_LAT
            && max_lon <= MAX_LON;
        if !in_bounds {
            return Err(CoordError::RegionOutOfBounds {
                min_lat: crop_min_lat,
                min_lon: crop_min_lon,
                max_lat,
                max_lon,
            });
        }

        self.min_lat = crop_min_lat;
        self.min_lon = crop_min_lon;
        self.max_lat = max_lat;
        self.max_lon = max_lon;
        self.zoom = zoom;
        debug!(region = %self, "Projector region configured");
        Ok(())
    }

    /// Select the largest tier that fits within the available screen area.
    pub fn set_resolution(
        &mut self,
        max_width: u32,
        max_height: u32,
    ) -> Result<ResolutionTier, CoordError> {
        let tier = self
            .tiers
            .iter()
            .copied()
            .find(|tier| tier.fits_within(max_width, max_height))
            .ok_or(CoordError::UnsupportedResolution {
                width: max_width,
                height: max_height,
            })?;

        self.tier = Some(tier);
        debug!(%tier, max_width, max_height, "Resolution tier selected");
        Ok(tier)
    }

    /// The selected resolution tier, if any.
    pub fn tier(&self) -> Option<ResolutionTier> {
        self.tier
    }

    /// The configured zoom factor.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// The full viewport, available once a resolution has been selected.
    pub fn viewport(&self) -> Result<Viewport, CoordError> {
        let tier = self.tier.ok_or(CoordError::NotConfigured)?;
        Ok(Viewport {
            min_lat: self.min_lat,
            min_lon: self.min_lon,
            max_lat: self.max_lat,
            max_lon: self.max_lon,
            zoom: self.zoom,
            pixel_width: tier.width,
            pixel_height: tier.height,
            scale: tier.scale,
        })
    }

    /// Project a geographic coordinate to pixels.
    ///
    /// North maps to smaller y. Points on the region edge are accepted.
    #[inline]
    pub fn project(&self, lat: f64, lon: f64) -> Result<PixelPoint, CoordError> {
        let tier = self.tier.ok_or(CoordError::NotConfigured)?;

        if !(self.min_lat..=self.max_lat).contains(&lat) {
            return Err(CoordError::LatitudeOutOfRange(lat));
        }
        if !(self.min_lon..=self.max_lon).contains(&lon) {
            return Err(CoordError::LongitudeOutOfRange(lon));
        }

        let width = tier.width as f64;
        let height = tier.height as f64;
        let x = (lon - self.min_lon) * width / (self.max_lon - self.min_lon);
        let y = height - (lat - self.min_lat) * height / (self.max_lat - self.min_lat);

        Ok(PixelPoint::new(x, y))
    }

    /// Project a [`GeoPoint`] to pixels.
    pub fn project_point(&self, point: GeoPoint) -> Result<PixelPoint, CoordError> {
        self.project(point.lat, point.lon)
    }

    /// Map viewport-relative percentages to pixels.
    ///
    /// Used for overlays (clock, key, charts) whose placement does not depend
    /// on geography.
    pub fn project_percent(&self, x_percent: f64, y_percent: f64) -> Result<PixelPoint, CoordError> {
        let tier = self.tier.ok_or(CoordError::NotConfigured)?;
        Ok(PixelPoint::new(
            tier.width as f64 * x_percent / 100.0,
            tier.height as f64 * y_percent / 100.0,
        ))
    }

    /// Pixel offset at which the full-globe background image must be placed
    /// so that the cropped region lines up with the viewport.
    pub fn world_offset(&self) -> Result<PixelPoint, CoordError> {
        let tier = self.tier.ok_or(CoordError::NotConfigured)?;
        let width = tier.width as f64;
        let height = tier.height as f64;
        let x = (MIN_LON - self.min_lon) * width / (self.max_lon - self.min_lon);
        let y = height - (MAX_LAT - self.min_lat) * height / (self.max_lat - self.min_lat);
        Ok(PixelPoint::new(x, y))
    }
}

impl fmt::Display for Projector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coord[({}, {}) ({}, {})",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )?;
        if let Some(tier) = self.tier {
            write!(f, " {}x{}", tier.width, tier.height)?;
        }
        write!(f, "]")
    }
}
