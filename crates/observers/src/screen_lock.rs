//! Screen wake lock with optional dim hold on release.

use devactions_host::{PowerManagerRef, Timestamp, WakeResource};
use std::time::Duration;

/// Holds the bright screen resource while an object is in front of the screen.
///
/// Not synchronized on its own: the owning observer keeps it under the same
/// mutex as the proximity state it is derived from.
pub struct ScreenLock {
    power: PowerManagerRef,
    dim_hold: Option<Duration>,
    locked: bool,
    dim_until: Option<Timestamp>,
}

impl ScreenLock {
    /// `dim_hold` is the timed dim hold taken on every graceful unlock.
    pub fn new(power: PowerManagerRef, dim_hold: Option<Duration>) -> Self {
        Self {
            power,
            dim_hold,
            locked: false,
            dim_until: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Expiry of the dim hold taken by the last unlock, if it is still running.
    ///
    /// A later lock does not cut the hold short, so this keeps reporting it
    /// while the bright resource is held again.
    pub fn pending_dim_release(&self, now: Timestamp) -> Option<Timestamp> {
        self.dim_until.filter(|until| now < *until)
    }

    /// Acquire the bright resource. Returns `false` if it was already held.
    ///
    /// A dim hold still running from a previous unlock is left to expire on
    /// its own; it never releases the bright resource.
    pub fn lock(&mut self, now: Timestamp) -> bool {
        if self.locked {
            return false;
        }
        if let Some(until) = self.pending_dim_release(now) {
            tracing::debug!(until, "re-locking during dim hold");
        }
        tracing::debug!("acquiring screen wakelock");
        self.locked = true;
        self.power.acquire(WakeResource::ScreenBright);
        true
    }

    /// Release the bright resource, taking the dim hold first if configured.
    /// Returns `false` if nothing was held.
    pub fn unlock(&mut self, now: Timestamp) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        if let Some(hold) = self.dim_hold {
            self.power.acquire_for(WakeResource::ScreenDim, hold);
            let hold_ms = i64::try_from(hold.as_millis()).unwrap_or(i64::MAX);
            self.dim_until = Some(now.saturating_add(hold_ms));
        }
        self.power.release(WakeResource::ScreenBright);
        tracing::debug!("released screen wakelock");
        true
    }

    /// Release the bright resource without any dim hold.
    pub fn release_now(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        self.power.release(WakeResource::ScreenBright);
        tracing::debug!("released screen wakelock immediately");
        true
    }
}

impl std::fmt::Debug for ScreenLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenLock")
            .field("locked", &self.locked)
            .field("dim_hold", &self.dim_hold)
            .field("dim_until", &self.dim_until)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devactions_host::{InMemoryPower, PowerCall};
    use std::sync::Arc;

    const HOLD: Duration = Duration::from_millis(3000);

    #[test]
    fn test_lock_is_acquire_once() {
        let power = Arc::new(InMemoryPower::new());
        let mut lock = ScreenLock::new(power.clone(), None);

        assert!(lock.lock(0));
        assert!(!lock.lock(10));
        assert!(lock.is_locked());
        assert_eq!(power.acquire_count(WakeResource::ScreenBright), 1);
    }

    #[test]
    fn test_unlock_when_not_locked_is_noop() {
        let power = Arc::new(InMemoryPower::new());
        let mut lock = ScreenLock::new(power.clone(), Some(HOLD));

        assert!(!lock.unlock(0));
        assert!(!lock.release_now());
        assert!(power.calls().is_empty());
    }

    #[test]
    fn test_graceful_unlock_takes_dim_hold_then_releases() {
        let power = Arc::new(InMemoryPower::new());
        let mut lock = ScreenLock::new(power.clone(), Some(HOLD));

        lock.lock(1_000);
        assert!(lock.unlock(2_000));

        assert_eq!(
            power.calls(),
            vec![
                PowerCall::Acquire(WakeResource::ScreenBright),
                PowerCall::AcquireFor(WakeResource::ScreenDim, HOLD),
                PowerCall::Release(WakeResource::ScreenBright),
            ]
        );
        assert_eq!(lock.pending_dim_release(2_500), Some(5_000));
        assert_eq!(lock.pending_dim_release(5_000), None);
    }

    #[test]
    fn test_relock_during_dim_hold_is_plain_acquire() {
        let power = Arc::new(InMemoryPower::new());
        let mut lock = ScreenLock::new(power.clone(), Some(HOLD));

        lock.lock(0);
        lock.unlock(100);
        assert!(lock.lock(200));

        assert!(lock.is_locked());
        assert!(power.is_held(WakeResource::ScreenBright));
        assert_eq!(power.acquire_count(WakeResource::ScreenBright), 2);
        assert_eq!(power.release_count(WakeResource::ScreenBright), 1);
        // The dim hold expires on its own; nobody releases it.
        assert_eq!(power.release_count(WakeResource::ScreenDim), 0);
        assert_eq!(lock.pending_dim_release(300), Some(3_100));
        assert_eq!(lock.pending_dim_release(3_100), None);
    }

    #[test]
    fn test_release_now_skips_dim_hold() {
        let power = Arc::new(InMemoryPower::new());
        let mut lock = ScreenLock::new(power.clone(), Some(HOLD));

        lock.lock(0);
        assert!(lock.release_now());
        assert_eq!(power.timed_acquire_count(WakeResource::ScreenDim), 0);
        assert!(!power.is_held(WakeResource::ScreenBright));
    }
}
