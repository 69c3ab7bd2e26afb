//! Coordinate quantization: maps floating-point `(lat, lon)` onto the integer
//! lattice `[0,Xmax] x [0,Ymax]` that the rest of this crate operates on.

use std::str::FromStr;

use thiserror::Error;

/// Decimal digits of precision retained when quantizing. `Q = 10^p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(u8);

pub const MIN_PRECISION: u8 = 0;
pub const MAX_PRECISION: u8 = 7;
pub const DEFAULT_PRECISION: u8 = 2;

#[derive(Error, Debug)]
pub enum PrecisionError {
    #[error("precision {0} is above the maximum allowed ({MAX_PRECISION})")]
    TooLarge(u8),
    #[error("could not parse precision: {0}")]
    MalformedString(#[from] std::num::ParseIntError),
}

impl Precision {
    pub fn new(p: u8) -> Result<Self, PrecisionError> {
        if p > MAX_PRECISION {
            return Err(PrecisionError::TooLarge(p));
        }
        Ok(Precision(p))
    }

    /// Panicking constructor for call sites with a compile-time-known precision.
    pub fn from_u8(p: u8) -> Self {
        match Precision::new(p) {
            Ok(precision) => precision,
            Err(e) => {
                log::error!("bad precision: {}", e);
                panic!("{}", e);
            }
        }
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// `Q = 10^p`.
    pub fn q(&self) -> u32 {
        10u32.pow(self.0 as u32)
    }

    /// Highest valid longitude index, `360*Q`.
    pub fn x_max(&self) -> u32 {
        360 * self.q()
    }

    /// Highest valid latitude index, `180*Q`.
    pub fn y_max(&self) -> u32 {
        180 * self.q()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision(DEFAULT_PRECISION)
    }
}

impl FromStr for Precision {
    type Err = PrecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let p: u8 = s.parse()?;
        Precision::new(p)
    }
}

impl From<Precision> for clap::builder::OsStr {
    fn from(precision: Precision) -> Self {
        precision.0.to_string().into()
    }
}

/// A quantized lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticePoint {
    pub ilat: u32,
    pub ilon: u32,
}

/// Round half away from zero. `x` is assumed finite; callers clamp first.
fn round_half_away_from_zero(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

fn clamp_lat(lat: f64) -> f64 {
    if !lat.is_finite() {
        return 0.0;
    }
    lat.clamp(-90.0, 90.0)
}

fn clamp_lon(lon: f64) -> f64 {
    if !lon.is_finite() {
        return 0.0;
    }
    lon.clamp(-180.0, 180.0)
}

/// `quantize(lat, lon, p) -> (ilat, ilon)`, per the coordinate invariants:
/// clamp, shift to a nonnegative range, scale by `Q`, round half away from
/// zero, then clamp once more into the lattice range as a final safety net
/// against floating-point overshoot at the extremes.
pub fn quantize(lat: f64, lon: f64, precision: Precision) -> LatticePoint {
    let q = precision.q() as f64;
    let lat = clamp_lat(lat);
    let lon = clamp_lon(lon);

    let ilat = round_half_away_from_zero((lat + 90.0) * q) as i64;
    let ilon = round_half_away_from_zero((lon + 180.0) * q) as i64;

    let y_max = precision.y_max() as i64;
    let x_max = precision.x_max() as i64;

    LatticePoint {
        ilat: ilat.clamp(0, y_max) as u32,
        ilon: ilon.clamp(0, x_max) as u32,
    }
}

/// Inverse of the latitude half of [`quantize`], useful for tests:
/// `lat = ilat/Q - 90`.
pub fn ilat_to_lat(ilat: u32, precision: Precision) -> f64 {
    ilat as f64 / precision.q() as f64 - 90.0
}

/// Inverse of the longitude half of [`quantize`]: `lon = ilon/Q - 180`.
pub fn ilon_to_lon(ilon: u32, precision: Precision) -> f64 {
    ilon as f64 / precision.q() as f64 - 180.0
}
