//! Login lockout.
//!
//! Failed attempts are counted per username in a sliding window. Once the
//! count reaches the limit the username is locked and further attempts are
//! refused before any password is checked.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::sync::Cache;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::error::{EngineError, EngineResult};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Default)]
struct AttemptState {
    failures: Vec<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
}

/// Tracks failed logins and locks usernames that fail too often.
pub struct LoginGuard {
    attempts: Cache<String, AttemptState>,
    clock: Arc<dyn Clock>,
    max_failed_attempts: usize,
    window: TimeDelta,
    lockout: TimeDelta,
}

impl fmt::Debug for LoginGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGuard")
            .field("tracked", &self.attempts.entry_count())
            .field("max_failed_attempts", &self.max_failed_attempts)
            .field("window", &self.window)
            .field("lockout", &self.lockout)
            .finish()
    }
}

impl LoginGuard {
    /// Creates a guard on the wall clock.
    pub fn new(config: &SecurityConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a guard on a supplied clock.
    pub fn with_clock(config: &SecurityConfig, clock: Arc<dyn Clock>) -> Self {
        // Entries idle out after the longer of the two periods so a lock is
        // never forgotten early.
        let idle_secs = config.failure_window_secs.max(config.lockout_secs).max(1);
        let attempts = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_idle(Duration::from_secs(idle_secs.unsigned_abs()))
            .build();

        Self {
            attempts,
            clock,
            max_failed_attempts: config.max_failed_attempts.max(1) as usize,
            window: TimeDelta::seconds(config.failure_window_secs),
            lockout: TimeDelta::seconds(config.lockout_secs),
        }
    }

    /// Refuses a username that is currently locked.
    pub fn check(&self, username: &str) -> EngineResult<()> {
        let key = username.to_lowercase();
        let Some(state) = self.attempts.get(&key) else {
            return Ok(());
        };
        let now = self.clock.now();

        match state.locked_until {
            Some(until) if now < until => Err(EngineError::AccountLocked {
                username: key,
                retry_after_secs: (until - now).num_seconds().max(1),
            }),
            Some(_) => {
                self.attempts.invalidate(&key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Records a failed attempt. Returns `true` when this failure locked the
    /// username.
    pub fn record_failure(&self, username: &str) -> bool {
        let key = username.to_lowercase();
        let now = self.clock.now();
        let window_start = now - self.window;
        let limit = self.max_failed_attempts;
        let lockout = self.lockout;

        let entry = self.attempts.entry(key.clone()).and_upsert_with(|existing| {
            let mut state = existing.map(|e| e.into_value()).unwrap_or_default();
            if state.locked_until.is_some_and(|until| until <= now) {
                state = AttemptState::default();
            }
            state.failures.retain(|at| *at > window_start);
            state.failures.push(now);
            if state.failures.len() >= limit {
                state.locked_until = Some(now + lockout);
            }
            state
        });

        let state = entry.into_value();
        let locked = state.locked_until.is_some();
        if locked {
            warn!(
                username = %key,
                failures = state.failures.len(),
                "Username locked after repeated login failures"
            );
        }
        locked
    }

    /// Clears the failure history after a successful login.
    pub fn record_success(&self, username: &str) {
        self.attempts.invalidate(&username.to_lowercase());
    }

    /// Failures counted inside the current window.
    pub fn failure_count(&self, username: &str) -> usize {
        let window_start = self.clock.now() - self.window;
        self.attempts
            .get(&username.to_lowercase())
            .map_or(0, |state| {
                state.failures.iter().filter(|at| **at > window_start).count()
            })
    }
}
