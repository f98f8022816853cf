//! Degree/minute/second coordinate parsing.
//!
//! Location registries exported from spreadsheets carry coordinates in a mix
//! of notations:
//!
//! - `40°42'46"N` (hemisphere suffix)
//! - `W74°0'21.6"` (hemisphere prefix)
//! - `36°37′N` (typographic prime marks)
//! - `-74.006` (signed decimal degrees)
//! - `40*30` (asterisk for the degree sign, trailing minutes without a mark)
//!
//! All of them normalise to signed decimal degrees, north and east positive.

use regex::Regex;
use std::sync::OnceLock;

use super::types::{CoordError, GeoPoint};

/// Get the degree/minute/second regex pattern.
///
/// We capture:
/// - `pre`: optional leading hemisphere letter
/// - `neg`: optional minus sign
/// - `deg`: degrees (required)
/// - `min`: minutes, after a degree mark
/// - `sec`: seconds, after a minute mark
/// - `post`: optional trailing hemisphere letter
fn dms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"^\s*(?P<pre>[NSEWnsew])?\s*(?P<neg>-)?\s*(?P<deg>\d+(?:\.\d+)?)\s*(?:[°*]\s*(?:(?P<min>\d+(?:\.\d+)?)\s*(?:['′]\s*(?:(?P<sec>\d+(?:\.\d+)?)\s*["″]?)?)?)?)?\s*(?P<post>[NSEWnsew])?\s*$"#,
        )
        .unwrap()
    })
}

fn hemisphere_sign(letter: &str) -> f64 {
    match letter {
        "S" | "s" | "W" | "w" => -1.0,
        _ => 1.0,
    }
}

/// Parse a single degree/minute/second value into decimal degrees.
///
/// # Examples
///
/// ```
/// use mapreplay::coord::parse_dms;
///
/// let lat = parse_dms("40°30'N").unwrap();
/// assert_eq!(lat, 40.5);
///
/// let lon = parse_dms("W74.5").unwrap();
/// assert_eq!(lon, -74.5);
/// ```
pub fn parse_dms(value: &str) -> Result<f64, CoordError> {
    let invalid = || CoordError::InvalidDms(value.to_string());

    let captures = dms_pattern().captures(value).ok_or_else(invalid)?;

    let pre = captures.name("pre");
    let neg = captures.name("neg");
    let post = captures.name("post");

    // Exactly one sign indicator is allowed
    let markers = [pre.is_some(), neg.is_some(), post.is_some()]
        .iter()
        .filter(|present| **present)
        .count();
    if markers > 1 {
        return Err(invalid());
    }

    let sign = match (pre, neg, post) {
        (Some(letter), _, _) | (_, _, Some(letter)) => hemisphere_sign(letter.as_str()),
        (_, Some(_), _) => -1.0,
        _ => 1.0,
    };

    let component = |name: &str| -> Result<f64, CoordError> {
        match captures.name(name) {
            Some(m) => m.as_str().parse::<f64>().map_err(|_| invalid()),
            None => Ok(0.0),
        }
    };

    let degrees = component("deg")?;
    let minutes = component("min")?;
    let seconds = component("sec")?;

    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(invalid());
    }

    Ok(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}

/// Parse a `lat/lon` or `lat,lon` pair.
///
/// A slash takes precedence as the separator so that decimal commas inside
/// a slash-separated pair are not split.
pub fn parse_coord_pair(value: &str) -> Result<GeoPoint, CoordError> {
    let separator = if value.contains('/') { '/' } else { ',' };
    let (lat, lon) = value
        .split_once(separator)
        .ok_or_else(|| CoordError::InvalidDms(value.to_string()))?;

    Ok(GeoPoint::new(parse_dms(lat)?, parse_dms(lon)?))
}
