//! Astrometric helpers: Julian dates, a J2000-to-equinox-of-date
//! precession, and the RA/Dec <-> unit-vector conversions `Slew` and
//! `_SyncInner` need (spec §6).
//!
//! `original_source` leans on `kete.Vector` and a monkey-patched `.jnow`
//! property for this; there is no equivalent crate in the corpus, so the
//! precession here is a direct implementation of the IAU 1976 (Lieske)
//! series. It treats the input timestamp's UTC Julian date as TT, which is
//! off by the UT1-TT/leap-second offset (currently ~69s); at the arcsecond
//! precision a 5" slew tolerance cares about, that offset is immaterial.

const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3_600.0);

/// Julian date (UTC) of a timestamp.
pub fn julian_date(ts: chrono::DateTime<chrono::Utc>) -> f64 {
    let unix_days = ts.timestamp() as f64 / 86_400.0 + ts.timestamp_subsec_nanos() as f64 / 86_400e9;
    2_440_587.5 + unix_days
}

/// Julian date (UTC) of now.
pub fn julian_date_now() -> f64 {
    julian_date(chrono::Utc::now())
}

/// Inverse of [`julian_date`]: the UTC timestamp for a Julian date, used
/// to turn a job's `jd_start`/`jd_end` (spec §4.4.1) into the
/// `DateTime<Utc>` bounds `TimeConstrained` wraps an event with, replacing
/// `original_source/scheduler/jobs.py`'s `kete.Time(jd).to_datetime()`.
pub fn datetime_from_julian(jd: f64) -> chrono::DateTime<chrono::Utc> {
    let unix_seconds = (jd - 2_440_587.5) * 86_400.0;
    let secs = unix_seconds.floor() as i64;
    let nanos = ((unix_seconds - secs as f64) * 1e9).round() as u32;
    chrono::TimeZone::timestamp_opt(&chrono::Utc, secs, nanos).single().unwrap_or_else(chrono::Utc::now)
}

/// A unit 3-vector, used for RA/Dec <-> Cartesian round trips and the
/// angle-between check a slew's convergence threshold is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Build a unit vector from RA/Dec in degrees.
    pub fn from_ra_dec_deg(ra_deg: f64, dec_deg: f64) -> Self {
        let ra = ra_deg.to_radians();
        let dec = dec_deg.to_radians();
        Self { x: dec.cos() * ra.cos(), y: dec.cos() * ra.sin(), z: dec.sin() }
    }

    /// Recover RA/Dec in degrees, RA normalized to `[0, 360)`.
    pub fn to_ra_dec_deg(self) -> (f64, f64) {
        let dec = self.z.clamp(-1.0, 1.0).asin().to_degrees();
        let mut ra = self.y.atan2(self.x).to_degrees();
        if ra < 0.0 {
            ra += 360.0;
        }
        (ra, dec)
    }

    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Angle between two (not necessarily unit-length) vectors, in degrees.
    pub fn angle_between_deg(self, other: Self) -> f64 {
        let cos_theta = (self.dot(other) / (self.norm() * other.norm())).clamp(-1.0, 1.0);
        cos_theta.acos().to_degrees()
    }

    fn precession_rotate(self, zeta: f64, z: f64, theta: f64) -> Self {
        // R3(-z) . R2(theta) . R3(-zeta), applied directly rather than
        // materialized as a 3x3 matrix.
        let (sz, cz) = zeta.sin_cos();
        let v1 = Vector3 {
            x: cz * self.x - sz * self.y,
            y: sz * self.x + cz * self.y,
            z: self.z,
        };
        let (st, ct) = theta.sin_cos();
        let v2 = Vector3 { x: ct * v1.x - st * v1.z, y: v1.y, z: st * v1.x + ct * v1.z };
        let (sz2, cz2) = z.sin_cos();
        Vector3 { x: cz2 * v2.x - sz2 * v2.y, y: sz2 * v2.x + cz2 * v2.y, z: v2.z }
    }
}

/// Precess a J2000 (mean equator/equinox) direction to the mean
/// equinox-of-date for the given Julian date, using the IAU 1976 series.
pub fn j2000_to_equinox_of_date(v: Vector3, jd_tt: f64) -> Vector3 {
    let t = (jd_tt - J2000_JD) / DAYS_PER_JULIAN_CENTURY;
    let t2 = t * t;
    let t3 = t2 * t;

    let zeta_arcsec = 2306.2181 * t + 0.30188 * t2 + 0.017998 * t3;
    let z_arcsec = 2306.2181 * t + 1.09468 * t2 + 0.018203 * t3;
    let theta_arcsec = 2004.3109 * t - 0.42665 * t2 - 0.041833 * t3;

    v.precession_rotate(
        zeta_arcsec * ARCSEC_TO_RAD,
        z_arcsec * ARCSEC_TO_RAD,
        theta_arcsec * ARCSEC_TO_RAD,
    )
}

/// Convert a J2000 RA/Dec (degrees) into equinox-of-date RA/Dec (degrees)
/// for the given Julian date, replacing `kete.Vector.jnow` (spec §6, §9).
pub fn j2000_to_jnow_deg(ra_j2000_deg: f64, dec_j2000_deg: f64, jd: f64) -> (f64, f64) {
    let v = Vector3::from_ra_dec_deg(ra_j2000_deg, dec_j2000_deg);
    j2000_to_equinox_of_date(v, jd).to_ra_dec_deg()
}

/// Format a signed angle in degrees as `+DD:MM:SS.s` (DMS), matching the
/// sign-and-separator convention `original_source` logs slews with.
pub fn degrees_to_dms(deg: f64) -> String {
    let sign = if deg < 0.0 { '-' } else { '+' };
    let abs = deg.abs();
    let degrees = abs.trunc() as i64;
    let minutes_total = (abs - degrees as f64) * 60.0;
    let minutes = minutes_total.trunc() as i64;
    let seconds = (minutes_total - minutes as f64) * 60.0;
    format!("{sign}{degrees:02}:{minutes:02}:{seconds:04.1}")
}

#[cfg(test)]
#[path = "astro_tests.rs"]
mod tests;
