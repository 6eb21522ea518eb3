//! Wall-clock deadline threaded through every blocking session step.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A point in time after which no new work may start.
///
/// The deadline reads time from an injected clock, so tests can expire it
/// deterministically. An unbounded deadline never expires.
#[derive(Clone)]
pub struct Deadline {
    clock: Arc<dyn Clock + Send + Sync>,
    expires_at: Option<DateTime<Utc>>,
}

impl Deadline {
    /// Creates a deadline `timeout` from now.
    #[must_use]
    pub fn after(clock: Arc<dyn Clock + Send + Sync>, timeout: Duration) -> Self {
        let expires_at = TimeDelta::from_std(timeout)
            .ok()
            .and_then(|delta| clock.utc().checked_add_signed(delta));
        Self { clock, expires_at }
    }

    /// Creates a deadline that never expires.
    #[must_use]
    pub fn unbounded(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            expires_at: None,
        }
    }

    /// Returns the expiry instant, `None` when unbounded.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Time left before expiry; `None` when unbounded, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires_at| {
            (expires_at - self.clock.utc())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    /// Returns `true` once the expiry instant has been reached.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Shortens `timeout` so it ends no later than the deadline.
    #[must_use]
    pub fn clamp(&self, timeout: Duration) -> Duration {
        self.remaining().map_or(timeout, |left| timeout.min(left))
    }
}

impl fmt::Debug for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deadline")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
