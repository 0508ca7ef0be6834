//! Clock frequencies with unit parsing and display.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A clock frequency stored as a whole number of Hertz.
///
/// Supports parsing from strings like "50MHz", "100KHz", "1GHz", "48000Hz",
/// "1.5MHz" and bare integers (interpreted as Hz). Displays using the largest
/// unit that divides the value exactly, so display and parse round-trip.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Frequency(u64);

impl Frequency {
    /// Creates a new frequency from a value in Hertz.
    pub fn new(hz: u64) -> Self {
        Self(hz)
    }

    /// Returns the frequency in Hertz.
    pub fn hz(&self) -> u64 {
        self.0
    }

    /// Returns `true` for a frequency that can actually clock a design.
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        if hz == 0 {
            return write!(f, "0Hz");
        }
        for (unit, scale) in UNITS {
            if hz % scale == 0 {
                return write!(f, "{}{unit}", hz / scale);
            }
        }
        write!(f, "{hz}Hz")
    }
}

const UNITS: [(&str, u64); 4] = [
    ("GHz", 1_000_000_000),
    ("MHz", 1_000_000),
    ("KHz", 1_000),
    ("Hz", 1),
];

/// Error type for parsing frequency strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency: '{input}'")]
pub struct ParseFrequencyError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        for (unit, scale) in UNITS {
            if let Some(num) = lower.strip_suffix(&unit.to_ascii_lowercase()) {
                return scaled(num.trim(), scale).ok_or_else(err);
            }
        }

        // Bare number, interpreted as Hz
        s.parse::<u64>().map(Frequency).map_err(|_| err())
    }
}

/// Multiplies a possibly fractional mantissa by `scale`, rejecting results
/// that are negative or not a whole number of Hertz.
fn scaled(num: &str, scale: u64) -> Option<Frequency> {
    if let Ok(whole) = num.parse::<u64>() {
        return whole.checked_mul(scale).map(Frequency);
    }
    let val: f64 = num.parse().ok()?;
    if !val.is_finite() || val < 0.0 {
        return None;
    }
    let hz = val * scale as f64;
    let rounded = hz.round();
    if (hz - rounded).abs() > 1e-6 || rounded > u64::MAX as f64 {
        return None;
    }
    Some(Frequency(rounded as u64))
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FrequencyVisitor;

        impl Visitor<'_> for FrequencyVisitor {
            type Value = Frequency;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a frequency in Hz or a string such as \"50MHz\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Frequency, E> {
                Ok(Frequency(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Frequency, E> {
                u64::try_from(v)
                    .map(Frequency)
                    .map_err(|_| E::custom(format!("negative frequency {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Frequency, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FrequencyVisitor)
    }
}
