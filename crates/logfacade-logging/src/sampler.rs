//! Per-call-site sampling
//!
//! Each call site gets a counter that resets every tick. Within a tick the
//! first `first` records pass, then only every `thereafter`-th one. Fatal
//! records are never sampled out.

use crate::clock::Clock;
use crate::config::SamplingConfig;
use chrono::{DateTime, Duration, Utc};
use logfacade_core_types::schema::FIELD_FATAL;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

#[derive(Debug)]
struct Counter {
    window_start: DateTime<Utc>,
    count: u64,
}

/// Sampling layer keyed by callsite identity
#[derive(Debug)]
pub struct Sampler {
    first: u64,
    thereafter: u64,
    tick: Duration,
    clock: Arc<dyn Clock>,
    counters: Mutex<HashMap<u64, Counter>>,
}

impl Sampler {
    pub fn new(config: SamplingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            first: config.first,
            thereafter: config.thereafter,
            tick: Duration::milliseconds(i64::try_from(config.tick_ms).unwrap_or(i64::MAX)),
            clock,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Count one record for `key` and decide whether it is emitted
    pub fn check<K: Hash>(&self, key: &K) -> bool {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let slot = hasher.finish();
        let now = self.clock.now();

        let count = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            let counter = counters.entry(slot).or_insert(Counter {
                window_start: now,
                count: 0,
            });
            if now - counter.window_start >= self.tick {
                counter.window_start = now;
                counter.count = 0;
            }
            counter.count += 1;
            counter.count
        };

        self.admits(count)
    }

    fn admits(&self, count: u64) -> bool {
        if count <= self.first {
            return true;
        }
        self.thereafter > 0 && (count - self.first) % self.thereafter == 0
    }
}

impl<S: Subscriber> Layer<S> for Sampler {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let metadata = event.metadata();
        if metadata.fields().field(FIELD_FATAL).is_some() {
            return true;
        }
        self.check(&metadata.callsite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn sampler(first: u64, thereafter: u64) -> (Sampler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        ));
        let config = SamplingConfig {
            first,
            thereafter,
            tick_ms: 1_000,
        };
        (Sampler::new(config, clock.clone()), clock)
    }

    #[test]
    fn test_default_thresholds() {
        let (sampler, _clock) = sampler(100, 100);
        let passed: Vec<u64> = (1..=350).filter(|_| sampler.check(&"site")).collect();

        // 100 straight through, then the 200th and the 300th record.
        assert_eq!(passed.len(), 102);
    }

    #[test]
    fn test_emitted_positions() {
        let (sampler, _clock) = sampler(2, 3);
        let pattern: Vec<bool> = (0..9).map(|_| sampler.check(&"site")).collect();
        assert_eq!(
            pattern,
            vec![true, true, false, false, true, false, false, true, false]
        );
    }

    #[test]
    fn test_zero_thereafter_drops_rest_of_tick() {
        let (sampler, clock) = sampler(1, 0);
        assert!(sampler.check(&"site"));
        assert!(!sampler.check(&"site"));
        assert!(!sampler.check(&"site"));

        clock.advance(Duration::seconds(1));
        assert!(sampler.check(&"site"));
    }

    #[test]
    fn test_counter_resets_each_tick() {
        let (sampler, clock) = sampler(1, 100);
        assert!(sampler.check(&"site"));
        assert!(!sampler.check(&"site"));

        clock.advance(Duration::milliseconds(999));
        assert!(!sampler.check(&"site"));

        clock.advance(Duration::milliseconds(1));
        assert!(sampler.check(&"site"));
    }

    #[test]
    fn test_sites_are_independent() {
        let (sampler, _clock) = sampler(1, 0);
        assert!(sampler.check(&"a"));
        assert!(sampler.check(&"b"));
        assert!(!sampler.check(&"a"));
    }

    proptest! {
        #[test]
        fn prop_emitted_count_within_one_tick(
            first in 0u64..50,
            thereafter in 0u64..20,
            calls in 0u64..500,
        ) {
            let (sampler, _clock) = sampler(first, thereafter);
            let emitted = (0..calls).filter(|_| sampler.check(&"site")).count() as u64;

            let past_first = calls.saturating_sub(first);
            let expected = calls.min(first)
                + if thereafter == 0 { 0 } else { past_first / thereafter };
            prop_assert_eq!(emitted, expected);
        }
    }
}
