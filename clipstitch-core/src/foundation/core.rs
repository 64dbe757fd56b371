use std::cmp::Ordering;

use crate::foundation::error::{StitchError, StitchResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// An exact rational timestamp or duration: `value / timescale` seconds.
///
/// Container formats report time against per-stream timescales (1/1000,
/// 1/15360, 1/30000, 1/90000, ...). `MediaTime` keeps that rational form so
/// that summing segment durations across heterogeneous timescales accumulates
/// no floating-point drift. Conversions to `f64` exist only for logging and
/// for the encoder argv boundary.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct MediaTime {
    /// Numerator in `timescale` units. Durations are never negative in
    /// practice, but the sign is kept so arithmetic stays closed.
    pub value: i64,
    /// Units per second. Must be > 0.
    pub timescale: u32,
}

impl MediaTime {
    /// The zero instant.
    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
    };

    /// Build a time value, rejecting a zero timescale.
    pub fn new(value: i64, timescale: u32) -> StitchResult<Self> {
        if timescale == 0 {
            return Err(StitchError::bad_arguments("MediaTime timescale must be > 0"));
        }
        Ok(Self { value, timescale })
    }

    /// Parse a decimal seconds string (`"12.345678"`) into an exact rational.
    ///
    /// This is the form ffprobe reports in `duration` fields. Fractional
    /// digits beyond nine are dropped. Returns `None` for anything that is
    /// not a plain decimal number (ffprobe uses `"N/A"` for unknown).
    pub fn from_decimal_seconds(text: &str) -> Option<MediaTime> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let frac_part = &frac_part[..frac_part.len().min(9)];
        let timescale = 10u32.checked_pow(frac_part.len() as u32)?;
        let int: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().ok()?
        };
        let value = int.checked_mul(i64::from(timescale))?.checked_add(frac)?;
        Some(MediaTime {
            value: if negative { -value } else { value },
            timescale,
        })
    }

    /// Exact sum. Widens to `i128`, reduces by gcd, and only fails if the
    /// reduced result cannot fit back into `value`/`timescale`.
    pub fn checked_add(self, rhs: MediaTime) -> Option<MediaTime> {
        if self.timescale == rhs.timescale {
            return Some(MediaTime {
                value: self.value.checked_add(rhs.value)?,
                timescale: self.timescale,
            });
        }
        let ts_l = i128::from(self.timescale);
        let ts_r = i128::from(rhs.timescale);
        let num = i128::from(self.value) * ts_r + i128::from(rhs.value) * ts_l;
        let den = ts_l * ts_r;
        let g = gcd_u128(num.unsigned_abs(), den as u128).max(1);
        let num = num / g as i128;
        let den = den / g as i128;
        Some(MediaTime {
            value: i64::try_from(num).ok()?,
            timescale: u32::try_from(den).ok()?,
        })
    }

    /// The same instant with `value`/`timescale` divided by their gcd.
    pub fn reduced(self) -> MediaTime {
        let g = gcd_u128(self.value.unsigned_abs() as u128, u128::from(self.timescale)).max(1);
        MediaTime {
            value: self.value / g as i64,
            timescale: self.timescale / g as u32,
        }
    }

    /// True for strictly positive durations.
    pub fn is_positive(self) -> bool {
        self.value > 0
    }

    /// Lossy seconds view for logs and encoder arguments.
    pub fn as_secs_f64(self) -> f64 {
        self.value as f64 / f64::from(self.timescale)
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiplication stays exact: |value| < 2^63, timescale < 2^32.
        let lhs = i128::from(self.value) * i128::from(other.timescale);
        let rhs = i128::from(other.value) * i128::from(self.timescale);
        lhs.cmp(&rhs)
    }
}

fn gcd_u128(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Output frame rate as a rational `num / den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Frames per `den` seconds. Must be > 0.
    pub num: u32,
    /// Seconds per `num` frames. Must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build a frame rate, rejecting zero terms.
    pub fn new(num: u32, den: u32) -> StitchResult<Self> {
        if num == 0 {
            return Err(StitchError::bad_arguments("Fps num must be > 0"));
        }
        if den == 0 {
            return Err(StitchError::bad_arguments("Fps den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one output frame, exact (`den / num` seconds).
    pub fn frame_duration(self) -> MediaTime {
        MediaTime {
            value: i64::from(self.den),
            timescale: self.num,
        }
    }
}

/// Output raster size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// True when the canvas has zero area.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Float view for placement math.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}
