use core::time::Duration;
use std::time::SystemTime;

use thiserror::Error;

use super::{Claims, NumericDate};

/// The clock skew used if none is configured.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Options for [`Claims::validate_timing`].
///
/// By default the current wall-clock time is read when validating, and a
/// clock skew of [`DEFAULT_CLOCK_SKEW`] is tolerated in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingOptions {
    clock_skew: Duration,
    now: Option<SystemTime>,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingOptions {
    /// Wall-clock time with the default clock skew.
    pub const fn new() -> Self {
        Self {
            clock_skew: DEFAULT_CLOCK_SKEW,
            now: None,
        }
    }

    /// Sets the tolerated clock skew between issuer and verifier.
    #[must_use]
    pub const fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Validates against a fixed point in time instead of the wall clock.
    #[must_use]
    pub const fn at(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    /// The tolerated clock skew.
    pub const fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// The time validation compares against.
    pub fn now(&self) -> NumericDate {
        self.now.map_or_else(NumericDate::now, NumericDate::from)
    }
}

/// Reasons why [`Claims::validate_timing`] rejected a claim set.
///
/// Unlike format errors these may go away on their own: a token that is not
/// yet valid becomes valid later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TimingError {
    /// The `exp` claim lies in the past, even after allowing for clock skew.
    #[error("token expired at {expired_at} (now {now})")]
    Expired {
        /// Value of the `exp` claim
        expired_at: NumericDate,
        /// The time validation compared against
        now: NumericDate,
    },
    /// The `nbf` claim lies in the future, even after allowing for clock
    /// skew.
    #[error("token is not valid before {not_before} (now {now})")]
    NotYetValid {
        /// Value of the `nbf` claim
        not_before: NumericDate,
        /// The time validation compared against
        now: NumericDate,
    },
}

impl Claims {
    /// Checks the `exp` and `nbf` claims against the time configured in
    /// `options`.
    ///
    /// A claim set without `exp` and `nbf` always passes. [RFC 7519] makes
    /// every claim optional, so callers that require an expiry must check
    /// [`Claims::expiration`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::Expired`] if `now > exp + skew`, and
    /// [`TimingError::NotYetValid`] if `now < nbf - skew`.
    ///
    /// [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-4.1>
    pub fn validate_timing(&self, options: &TimingOptions) -> Result<(), TimingError> {
        let now = options.now();
        let skew = options.clock_skew();

        if let Some(exp) = self.expiration {
            if now > exp.saturating_add(skew) {
                tracing::debug!(%exp, %now, "token expired");
                return Err(TimingError::Expired {
                    expired_at: exp,
                    now,
                });
            }
        }

        if let Some(nbf) = self.not_before {
            if now < nbf.saturating_sub(skew) {
                tracing::debug!(%nbf, %now, "token not yet valid");
                return Err(TimingError::NotYetValid {
                    not_before: nbf,
                    now,
                });
            }
        }

        Ok(())
    }

    /// Whether the `exp` claim lies before `now`, without any clock skew.
    ///
    /// Returns `false` if there is no `exp` claim.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expiration
            .is_some_and(|exp| NumericDate::from(now) > exp)
    }
}
