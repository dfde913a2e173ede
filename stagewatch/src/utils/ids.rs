//! Monotonic, creation-time-derived event identifiers.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues step event ids derived from the receipt time in milliseconds.
///
/// Ids are strictly increasing: when two events arrive within the same
/// millisecond (or the clock steps backwards) the previous id plus one is
/// issued instead.
#[derive(Debug, Default)]
pub struct EventIdGenerator {
    last: AtomicU64,
}

impl EventIdGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id.
    pub fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    fn next_at(&self, now_ms: u64) -> u64 {
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let issued = if now_ms > last { now_ms } else { last + 1 };
            match self
                .last
                .compare_exchange_weak(last, issued, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return issued,
                Err(current) => last = current,
            }
        }
    }

    /// Returns the most recently issued id, or zero.
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let ids = EventIdGenerator::new();
        let mut prev = 0;
        for _ in 0..1000 {
            let id = ids.next_id();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_same_millisecond_bumps() {
        let ids = EventIdGenerator::new();
        assert_eq!(ids.next_at(1_000), 1_000);
        assert_eq!(ids.next_at(1_000), 1_001);
        assert_eq!(ids.next_at(1_000), 1_002);
        assert_eq!(ids.next_at(5_000), 5_000);
    }

    #[test]
    fn test_clock_going_backwards() {
        let ids = EventIdGenerator::new();
        ids.next_at(10_000);
        assert_eq!(ids.next_at(9_000), 10_001);
        assert_eq!(ids.last_id(), 10_001);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = std::sync::Arc::new(EventIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..500).map(|_| ids.next_at(1_000)).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 2_000);
        assert_eq!(ids.last_id(), 2_999);
    }
}
