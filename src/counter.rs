//! Usage counters (page visits, files converted).
//!
//! The server records every successful conversion through a
//! [`UsageCounter`]. Tracking is advisory: a failed increment is logged by
//! the caller and never fails the request that triggered it.
//!
//! [`InMemoryCounter`] is process-local and resets on restart. Persistent
//! backends implement the same trait.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("Counter backend unavailable: {0}")]
    Unavailable(String),
}

/// A monotonically increasing counter.
pub trait UsageCounter: Send + Sync {
    /// Add one and return the new total.
    fn increment(&self) -> Result<u64, CounterError>;

    /// Current total.
    fn get(&self) -> u64;

    /// When the counter last changed, if it has.
    fn last_updated(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Atomic process-local counter.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    value: AtomicU64,
    /// Milliseconds since the epoch; 0 = never updated.
    updated_ms: AtomicI64,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageCounter for InMemoryCounter {
    fn increment(&self) -> Result<u64, CounterError> {
        let total = self.value.fetch_add(1, Ordering::SeqCst) + 1;
        self.updated_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
        Ok(total)
    }

    fn get(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        match self.updated_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }
}

/// RFC 3339 timestamp with millisecond precision, as reported by the
/// tracking endpoints.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_at_zero_and_counts_up() {
        let c = InMemoryCounter::new();
        assert_eq!(c.get(), 0);
        assert!(c.last_updated().is_none());
        assert_eq!(c.increment().unwrap(), 1);
        assert_eq!(c.increment().unwrap(), 2);
        assert_eq!(c.get(), 2);
        assert!(c.last_updated().is_some());
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let c = Arc::new(InMemoryCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        c.increment().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.get(), 800);
    }

    #[test]
    fn timestamp_format() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(timestamp(at), "2023-11-14T22:13:20.123Z");
    }
}
