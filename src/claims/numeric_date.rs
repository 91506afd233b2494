use core::{fmt, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

const MICROS_PER_SEC: i64 = 1_000_000;
// largest whole second whose microsecond count stays below 2^53
const MAX_SECS: i64 = 9_007_199_254;
const MAX_MICROS: i64 = MAX_SECS * MICROS_PER_SEC;

/// A point in time as used by the `exp`, `nbf` and `iat` claims.
///
/// [Section 2 of RFC 7519] defines a NumericDate as the number of seconds
/// since the Unix epoch, with fractional seconds permitted. This type keeps
/// microsecond precision, which is what an `f64` can carry for present day
/// timestamps without loss.
///
/// A whole number of seconds is written as a JSON integer, anything else as
/// a JSON float.
///
/// Dates are kept between [`NumericDate::MIN`] and [`NumericDate::MAX`],
/// roughly 2^53 microseconds either side of the epoch (the year 2255).
/// Constructors and arithmetic clamp to that range and decoding rejects
/// anything outside of it.
///
/// [Section 2 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-2>
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericDate {
    micros: i64,
}

impl NumericDate {
    /// The Unix epoch.
    pub const UNIX_EPOCH: Self = Self { micros: 0 };

    /// The latest representable date.
    pub const MAX: Self = Self { micros: MAX_MICROS };

    /// The earliest representable date.
    pub const MIN: Self = Self {
        micros: -MAX_MICROS,
    };

    /// Creates a date from whole seconds since the Unix epoch, clamped to
    /// [`MIN`](Self::MIN)..=[`MAX`](Self::MAX).
    pub const fn from_secs(secs: i64) -> Self {
        if secs > MAX_SECS {
            Self::MAX
        } else if secs < -MAX_SECS {
            Self::MIN
        } else {
            Self {
                micros: secs * MICROS_PER_SEC,
            }
        }
    }

    /// Creates a date from microseconds since the Unix epoch, clamped to
    /// [`MIN`](Self::MIN)..=[`MAX`](Self::MAX).
    pub const fn from_micros(micros: i64) -> Self {
        if micros > MAX_MICROS {
            Self::MAX
        } else if micros < -MAX_MICROS {
            Self::MIN
        } else {
            Self { micros }
        }
    }

    /// Creates a date from fractional seconds since the Unix epoch, rounded to
    /// the nearest microsecond.
    ///
    /// Returns [`None`] if `secs` is not finite or lies outside
    /// [`MIN`](Self::MIN)..=[`MAX`](Self::MAX).
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs.abs() > (MAX_SECS + 1) as f64 {
            return None;
        }
        // splitting off the whole seconds first keeps the rounding error of the
        // fraction below half a microsecond
        let whole = secs.trunc();
        let fraction = ((secs - whole) * MICROS_PER_SEC as f64).round();
        let micros = whole as i64 * MICROS_PER_SEC + fraction as i64;
        if !(-MAX_MICROS..=MAX_MICROS).contains(&micros) {
            return None;
        }
        Some(Self { micros })
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Whole seconds since the Unix epoch, rounded towards negative infinity.
    pub const fn as_secs(&self) -> i64 {
        self.micros.div_euclid(MICROS_PER_SEC)
    }

    /// Microseconds since the Unix epoch.
    pub const fn as_micros(&self) -> i64 {
        self.micros
    }

    /// Fractional seconds since the Unix epoch.
    pub fn as_secs_f64(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SEC as f64
    }

    /// Whether this date has a fractional second.
    pub const fn has_fraction(&self) -> bool {
        self.micros % MICROS_PER_SEC != 0
    }

    /// Converts this date into a [`SystemTime`].
    pub fn to_system_time(&self) -> SystemTime {
        let magnitude = Duration::from_micros(self.micros.unsigned_abs());
        if self.micros >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }

    /// Adds `duration`, saturating at the representable range.
    pub fn saturating_add(self, duration: Duration) -> Self {
        Self::from_micros(self.micros.saturating_add(duration_micros(duration)))
    }

    /// Subtracts `duration`, saturating at the representable range.
    pub fn saturating_sub(self, duration: Duration) -> Self {
        Self::from_micros(self.micros.saturating_sub(duration_micros(duration)))
    }
}

fn duration_micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

impl From<SystemTime> for NumericDate {
    /// Sub-microsecond precision is truncated.
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::from_micros(duration_micros(after)),
            Err(before) => Self::from_micros(duration_micros(before.duration()).saturating_neg()),
        }
    }
}

impl From<NumericDate> for SystemTime {
    fn from(date: NumericDate) -> Self {
        date.to_system_time()
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_fraction() {
            write!(f, "{}", self.as_secs_f64())
        } else {
            write!(f, "{}", self.as_secs())
        }
    }
}

impl Serialize for NumericDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.has_fraction() {
            let secs = self.as_secs_f64();
            // above 2^33 seconds an f64 no longer resolves single microseconds
            if Self::from_secs_f64(secs) != Some(*self) {
                return Err(ser::Error::custom(
                    "NumericDate has more precision than a JSON number can carry",
                ));
            }
            serializer.serialize_f64(secs)
        } else {
            serializer.serialize_i64(self.as_secs())
        }
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumericDateVisitor;

        impl de::Visitor<'_> for NumericDateVisitor {
            type Value = NumericDate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a number of seconds since the Unix epoch")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                if !(-MAX_SECS..=MAX_SECS).contains(&v) {
                    return Err(E::custom("NumericDate out of range"));
                }
                Ok(NumericDate::from_secs(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v).map_err(|_| E::custom("NumericDate out of range"))?;
                self.visit_i64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                NumericDate::from_secs_f64(v).ok_or_else(|| E::custom("NumericDate out of range"))
            }
        }

        deserializer.deserialize_any(NumericDateVisitor)
    }
}
