// src/vault/lock_state.rs
//
// Lock State Machine - session state governing secret materialization
//
// Locked is the initial state and the only state in which no secret
// material may be materialized. Transitions: PIN verification unlocks;
// explicit lock, inactivity timeout or host backgrounding lock again.

use std::time::{Duration, Instant};

/// Session lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Unlocked,
}

/// Lock State Machine with an inactivity auto-lock.
///
/// The machine mutates only in-memory state. The host drives
/// [`check_timeout`](LockStateMachine::check_timeout) from a periodic
/// timer; an in-flight scoped secret operation always completes and
/// self-cleans, so the timer only affects future operations.
#[derive(Debug)]
pub struct LockStateMachine {
    state: LockState,
    last_activity: Instant,
    timeout: Duration,
}

impl LockStateMachine {
    /// New machine in the `Locked` state.
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: LockState::Locked,
            last_activity: Instant::now(),
            timeout,
        }
    }

    #[inline]
    pub fn state(&self) -> LockState {
        self.state
    }

    #[inline]
    pub fn is_unlocked(&self) -> bool {
        self.state == LockState::Unlocked
    }

    /// Transition to `Unlocked` after successful PIN verification and
    /// reset the idle clock.
    pub fn mark_unlocked(&mut self) {
        self.state = LockState::Unlocked;
        self.last_activity = Instant::now();
    }

    /// Explicit lock.
    pub fn lock(&mut self) {
        self.state = LockState::Locked;
    }

    /// The host application moved to the background: lock immediately,
    /// regardless of the idle timer.
    pub fn on_background(&mut self) {
        self.lock();
    }

    /// A scoped secret operation completed successfully: reset the idle clock.
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Periodic auto-lock check. Transitions to `Locked` when the idle time
    /// has reached the configured timeout. Returns `true` if this call
    /// performed the transition.
    pub fn check_timeout(&mut self) -> bool {
        if self.state == LockState::Unlocked && self.last_activity.elapsed() >= self.timeout {
            self.state = LockState::Locked;
            return true;
        }
        false
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// =============================================================================
// TESTS
// =============================================================================
