//! Synthetic status ids.
//!
//! Every action invocation draws an id from this counter for log
//! correlation; `create` also uses it to mint placeholder record ids for
//! payloads that have none yet.

use parking_lot::Mutex;

/// A process-wide counter. Wraps back to the start once `max` is
/// exceeded when `max` is positive; never wraps when it is negative.
#[derive(Debug)]
pub struct StatusCounter {
    max: i64,
    next: Mutex<u64>,
}

impl StatusCounter {
    pub fn new(max: i64) -> Self {
        Self {
            max,
            next: Mutex::new(0),
        }
    }

    /// Hand out the next id.
    pub fn next_id(&self) -> u64 {
        let mut next = self.next.lock();
        *next += 1;
        if self.max > 0 && *next > self.max as u64 {
            *next = 1;
        }
        *next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_counter_never_wraps() {
        let counter = StatusCounter::new(-1);
        for expected in 1..=100 {
            assert_eq!(counter.next_id(), expected);
        }
    }

    #[test]
    fn positive_max_wraps() {
        let counter = StatusCounter::new(3);
        let ids: Vec<_> = (0..7).map(|_| counter.next_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 1, 2, 3, 1]);
    }
}
