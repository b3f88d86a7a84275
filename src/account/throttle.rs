/// Cooldown between self-service profile edits
use crate::error::{PlatformError, PlatformResult};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy)]
pub struct ProfileMutationThrottle {
    cooldown: Duration,
}

impl ProfileMutationThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Earliest instant at which the next edit is allowed
    pub fn next_allowed_at(&self, last_update: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        last_update.map(|last| last + self.cooldown)
    }

    /// An edit at `now` is allowed only if the last one is at or before this instant
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.cooldown
    }

    /// Reject an edit at `now` if the cooldown since `last_update` has not elapsed.
    /// Accounts that never edited their profile are never throttled.
    pub fn check(&self, last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> PlatformResult<()> {
        match self.next_allowed_at(last_update) {
            Some(next_allowed_at) if now < next_allowed_at => {
                Err(PlatformError::RateLimited { next_allowed_at })
            }
            _ => Ok(()),
        }
    }
}
