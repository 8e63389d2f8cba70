//! Minimal FITS header parsing and gnomonic (TAN) pixel-to-world
//! deprojection (spec §6). This reads only what `_SyncInner` needs to
//! recover a solved frame's center-of-field coordinate from its `CRVAL`,
//! `CRPIX` and `CD` WCS keywords; it is not a general FITS reader, WCS
//! fitter, or image-processing library.

use thiserror::Error;

const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

#[derive(Debug, Error)]
pub enum FitsError {
    #[error("FITS file has no END card within the header blocks read")]
    MissingEnd,
    #[error("missing required FITS header keyword {0}")]
    MissingKeyword(&'static str),
    #[error("FITS header keyword {0} has an unparseable value: {1}")]
    InvalidValue(&'static str, String),
    #[error("FITS data is smaller than NAXIS1*NAXIS2 implies")]
    Truncated,
}

/// The WCS and observation-time header keywords a solved frame carries.
#[derive(Debug, Clone)]
pub struct FitsHeader {
    pub date_obs: String,
    pub naxis1: u32,
    pub naxis2: u32,
    pub crval1: f64,
    pub crval2: f64,
    pub crpix1: f64,
    pub crpix2: f64,
    pub cd1_1: f64,
    pub cd1_2: f64,
    pub cd2_1: f64,
    pub cd2_2: f64,
}

impl FitsHeader {
    /// The timestamp `DATE-OBS` encodes, parsed as an RFC 3339 instant (FITS
    /// `DATE-OBS` is ISO 8601 without a trailing offset; it is treated as UTC).
    pub fn date_obs(&self) -> Result<chrono::DateTime<chrono::Utc>, FitsError> {
        let with_zone = if self.date_obs.ends_with('Z') {
            self.date_obs.clone()
        } else {
            format!("{}Z", self.date_obs)
        };
        chrono::DateTime::parse_from_rfc3339(&with_zone)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|_| FitsError::InvalidValue("DATE-OBS", self.date_obs.clone()))
    }
}

/// A parsed FITS frame: its header and the original bytes (re-uploaded
/// verbatim, gzip-compressed, to the catalog).
#[derive(Debug, Clone)]
pub struct FitsFrame {
    pub header: FitsHeader,
    data: Vec<u8>,
}

impl FitsFrame {
    pub fn parse(data: Vec<u8>) -> Result<Self, FitsError> {
        let header = parse_header(&data)?;
        Ok(Self { header, data })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at the frame's geometric center (1-indexed, FITS convention).
    pub fn center_pixel(&self) -> (f64, f64) {
        (self.header.naxis1 as f64 / 2.0 + 0.5, self.header.naxis2 as f64 / 2.0 + 0.5)
    }

    /// World RA/Dec (degrees) at the frame's center, via gnomonic (TAN)
    /// deprojection around the `CRVAL`/`CRPIX` reference point.
    pub fn center_world_deg(&self) -> (f64, f64) {
        let (px, py) = self.center_pixel();
        pixel_to_world_deg(&self.header, px, py)
    }
}

/// Gnomonic (TAN) deprojection of a pixel coordinate to RA/Dec in degrees,
/// following the standard WCS TAN convention: intermediate world
/// coordinates are the CD-matrix image of the pixel offset from `CRPIX`,
/// then rotated onto the sphere around `CRVAL`.
pub fn pixel_to_world_deg(header: &FitsHeader, px: f64, py: f64) -> (f64, f64) {
    let dx = px - header.crpix1;
    let dy = py - header.crpix2;

    let xi_deg = header.cd1_1 * dx + header.cd1_2 * dy;
    let eta_deg = header.cd2_1 * dx + header.cd2_2 * dy;
    let xi = xi_deg.to_radians();
    let eta = eta_deg.to_radians();

    let ra0 = header.crval1.to_radians();
    let dec0 = header.crval2.to_radians();

    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let denom = cos_dec0 - eta * sin_dec0;
    let ra = ra0 + xi.atan2(denom);
    let dec = ((sin_dec0 + eta * cos_dec0) / (1.0 + xi * xi + eta * eta).sqrt()).clamp(-1.0, 1.0).asin();

    let mut ra_deg = ra.to_degrees();
    if ra_deg < 0.0 {
        ra_deg += 360.0;
    }
    (ra_deg, dec.to_degrees())
}

fn parse_header(data: &[u8]) -> Result<FitsHeader, FitsError> {
    let mut cards = Vec::new();
    let mut offset = 0;
    loop {
        let block = data.get(offset..offset + BLOCK_SIZE).ok_or(FitsError::MissingEnd)?;
        let mut found_end = false;
        for card in block.chunks(CARD_SIZE) {
            let text = String::from_utf8_lossy(card);
            let keyword = text[..8.min(text.len())].trim();
            if keyword == "END" {
                found_end = true;
                break;
            }
            if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
                continue;
            }
            cards.push(text.into_owned());
        }
        offset += BLOCK_SIZE;
        if found_end {
            break;
        }
    }

    let naxis1 = required_int(&cards, "NAXIS1")?;
    let naxis2 = required_int(&cards, "NAXIS2")?;
    let data_len = naxis1 as usize * naxis2 as usize * 2;
    if data.len() < offset + data_len {
        return Err(FitsError::Truncated);
    }

    Ok(FitsHeader {
        date_obs: required_str(&cards, "DATE-OBS")?,
        naxis1,
        naxis2,
        crval1: required_float(&cards, "CRVAL1")?,
        crval2: required_float(&cards, "CRVAL2")?,
        crpix1: required_float(&cards, "CRPIX1")?,
        crpix2: required_float(&cards, "CRPIX2")?,
        cd1_1: required_float(&cards, "CD1_1")?,
        cd1_2: required_float(&cards, "CD1_2")?,
        cd2_1: required_float(&cards, "CD2_1")?,
        cd2_2: required_float(&cards, "CD2_2")?,
    })
}

fn find_value<'a>(cards: &'a [String], keyword: &'static str) -> Option<&'a str> {
    cards.iter().find_map(|card| {
        let (key, rest) = card.split_once('=')?;
        if key.trim() != keyword {
            return None;
        }
        // Drop a trailing FITS comment (`value / comment`), then unquote.
        let value = rest.split('/').next().unwrap_or(rest).trim();
        Some(value.trim_matches('\''))
    })
    .map(str::trim)
}

fn required_str(cards: &[String], keyword: &'static str) -> Result<String, FitsError> {
    find_value(cards, keyword).map(str::to_string).ok_or(FitsError::MissingKeyword(keyword))
}

fn required_int(cards: &[String], keyword: &'static str) -> Result<u32, FitsError> {
    let raw = find_value(cards, keyword).ok_or(FitsError::MissingKeyword(keyword))?;
    raw.parse().map_err(|_| FitsError::InvalidValue(keyword, raw.to_string()))
}

fn required_float(cards: &[String], keyword: &'static str) -> Result<f64, FitsError> {
    let raw = find_value(cards, keyword).ok_or(FitsError::MissingKeyword(keyword))?;
    raw.parse().map_err(|_| FitsError::InvalidValue(keyword, raw.to_string()))
}

#[cfg(test)]
#[path = "fits_tests.rs"]
mod tests;
