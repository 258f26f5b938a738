//! # Core Traits (Ports)
//!
//! Pluggable strategies the store and guard depend on. Plugins implement
//! `IdentityHasher`; tests swap in deterministic randomness and time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

/// One-way digest of a raw network identity.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait IdentityHasher: Send + Sync {
    /// Same input yields the same fixed-length hex digest for the life of the process.
    fn hash_identity(&self, raw_identity: &str) -> String;
}

/// Source of ids and random draws for aliases.
pub trait RandomSource: Send + Sync {
    fn next_id(&self) -> Uuid;
    /// Uniform in `[0, upper)`. `upper` must be non-zero.
    fn next_below(&self, upper: usize) -> usize;
    /// Uniform in `[low, high]`.
    fn next_between(&self, low: u32, high: u32) -> u32;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Thread-local RNG with time-ordered ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }

    fn next_below(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }

    fn next_between(&self, low: u32, high: u32) -> u32 {
        rand::rng().random_range(low..=high)
    }
}

/// Deterministic source: ids count up from 1, draws cycle through the counter.
#[derive(Debug, Default)]
pub struct SequenceRandom {
    counter: AtomicU64,
}

impl SequenceRandom {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl RandomSource for SequenceRandom {
    fn next_id(&self) -> Uuid {
        Uuid::from_u128(self.tick() as u128)
    }

    fn next_below(&self, upper: usize) -> usize {
        (self.tick() % upper as u64) as usize
    }

    fn next_between(&self, low: u32, high: u32) -> u32 {
        let span = u64::from(high - low) + 1;
        low + (self.tick() % span) as u32
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
