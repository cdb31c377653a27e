//! Sliding-window admission control for contact submissions.
//!
//! Tracks submission timestamps per client key and admits at most
//! `max_per_window` within the trailing window. Expiry is lazy: a key's
//! timestamps are pruned when that key is next checked, and a compaction pass
//! runs on the request path once the map grows past half capacity. There is
//! no background sweeper and no internal clock; callers pass `now` in epoch
//! milliseconds, which keeps every path deterministic under test.

use std::collections::{HashMap, HashSet};

/// One hour.
pub const DEFAULT_WINDOW_MS: i64 = 60 * 60 * 1000;
/// Submissions admitted per key per window.
pub const DEFAULT_MAX_PER_WINDOW: usize = 5;
/// Hard cap on tracked keys.
pub const DEFAULT_MAX_KEYS: usize = 1000;

/// Outcome of a [`SubmissionLimiter::check_and_record`] call.
///
/// Rejection is an expected outcome, not an error; callers surface
/// `retry_after_secs` as a Retry-After hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed {
        /// Submissions left in the window after this one.
        remaining: u32,
    },
    Limited {
        /// Whole seconds until the oldest tracked submission leaves the
        /// window, rounded up. Always at least 1.
        retry_after_secs: u64,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

/// Per-client submission tracking with bounded memory.
///
/// A plain value with no interior locking; the HTTP layer wraps it in a mutex
/// so check-and-record stays atomic across concurrent submissions.
#[derive(Debug)]
pub struct SubmissionLimiter {
    window_ms: i64,
    max_per_window: usize,
    max_keys: usize,
    entries: HashMap<String, Vec<i64>>,
}

impl Default for SubmissionLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_MAX_PER_WINDOW, DEFAULT_MAX_KEYS)
    }
}

impl SubmissionLimiter {
    pub fn new(window_ms: i64, max_per_window: usize, max_keys: usize) -> Self {
        Self {
            window_ms,
            max_per_window,
            max_keys,
            entries: HashMap::new(),
        }
    }

    /// Number of keys currently tracked, pruned or not.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn max_per_window(&self) -> usize {
        self.max_per_window
    }

    /// Decide whether `key` may submit at `now_ms`, recording the submission
    /// if admitted. The check is the record; there is no peek variant, so a
    /// single lock acquisition covers the whole decision.
    pub fn check_and_record(&mut self, key: &str, now_ms: i64) -> Admission {
        if self.entries.len() > self.max_keys / 2 {
            self.compact(now_ms);
        }

        let window_start = now_ms - self.window_ms;
        let mut timestamps = self.entries.remove(key).unwrap_or_default();
        // Strict inequality: a submission exactly one window old has expired.
        timestamps.retain(|&ts| ts > window_start);

        if timestamps.len() >= self.max_per_window {
            let oldest = timestamps[0];
            let retry_after_ms = (oldest + self.window_ms - now_ms).max(0);
            let retry_after_secs = ((retry_after_ms + 999) / 1000) as u64;
            self.entries.insert(key.to_string(), timestamps);
            return Admission::Limited { retry_after_secs };
        }

        timestamps.push(now_ms);
        let remaining = self.max_per_window.saturating_sub(timestamps.len()) as u32;
        self.entries.insert(key.to_string(), timestamps);
        Admission::Allowed { remaining }
    }

    /// Drop aged-out entries; under sustained pressure, forget the least
    /// recently active keys until half the capacity is free again.
    pub fn compact(&mut self, now_ms: i64) {
        let window_start = now_ms - self.window_ms;
        self.entries.retain(|_, timestamps| {
            timestamps.retain(|&ts| ts > window_start);
            !timestamps.is_empty()
        });

        if self.entries.len() > self.max_keys {
            let keep = self.max_keys / 2;
            let mut by_recency: Vec<(i64, &String)> = self
                .entries
                .iter()
                .map(|(key, timestamps)| (timestamps.last().copied().unwrap_or(i64::MIN), key))
                .collect();
            by_recency.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            by_recency.truncate(keep);

            let survivors: HashSet<String> =
                by_recency.into_iter().map(|(_, key)| key.clone()).collect();
            let evicted = self.entries.len() - survivors.len();
            self.entries.retain(|key, _| survivors.contains(key));

            tracing::warn!(
                evicted,
                tracked = self.entries.len(),
                "Submission limiter at capacity, evicted least recently active keys"
            );
        }
    }
}
