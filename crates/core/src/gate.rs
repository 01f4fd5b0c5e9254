//! Rate-limited fetch gate in front of the metadata provider.
//!
//! The gate owns every piece of mutable fetch state behind one mutex:
//! the TTL cache, per-key failure counters, the in-flight map, the global
//! circuit breaker and the pacing clock. Admission is decided entirely
//! inside the lock, so two near-simultaneous calls for the same key can
//! never both dispatch — the second always joins the first's in-flight
//! future.
//!
//! Outcome handling per failure class:
//! - 429 trips the global circuit breaker for 15 minutes and counts as a
//!   failure for the key that triggered it.
//! - 404 and other 4xx are stable answers, negative-cached for the full
//!   success TTL without touching the failure counter.
//! - 5xx and transport errors are negative-cached briefly; three in a row
//!   blacklist the key for an exponentially growing window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use folio_common::constants::{
    BLACKLIST_THRESHOLD, FAILURE_TTL, MAX_ACTIVE_FETCHES, MIN_FETCH_SPACING, RATE_LIMIT_COOLDOWN,
    SUCCESS_TTL,
};
use folio_common::error::FetchError;
use folio_common::traits::MetadataProvider;
use folio_common::types::TokenAttributes;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::cache::{cache_key, CacheLookup, TokenCache};

type SharedFetch = Shared<BoxFuture<'static, Option<TokenAttributes>>>;

struct InFlight {
    generation: u64,
    fut: SharedFetch,
}

struct FailureState {
    count: u32,
    last_failure: Instant,
}

#[derive(Default)]
struct GateState {
    cache: TokenCache,
    failures: HashMap<String, FailureState>,
    in_flight: HashMap<String, InFlight>,
    /// Per-key refresh generation; a driver only writes the cache if its
    /// generation is still current.
    generations: HashMap<String, u64>,
    rate_limited_until: Option<Instant>,
    active: usize,
    last_dispatch: Option<Instant>,
}

/// Concurrency limiter + circuit breaker + backoff blacklist gating all
/// outbound metadata lookups.
pub struct FetchGate {
    provider: Arc<dyn MetadataProvider>,
    state: Mutex<GateState>,
}

/// Exponential blacklist window once a key has crossed the threshold:
/// `5min × 2^(count - 3)`, exponent capped so the window stays bounded.
fn blacklist_window(count: u32) -> Duration {
    let exp = count.saturating_sub(BLACKLIST_THRESHOLD).min(6);
    FAILURE_TTL * 2u32.pow(exp)
}

impl FetchGate {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(GateState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().expect("fetch gate mutex poisoned")
    }

    /// Fetch metadata for `(network, address)` through the gate.
    ///
    /// Returns `None` when the lookup is suppressed (circuit breaker,
    /// blacklist, fresh negative cache, admission cap) or when the
    /// upstream has no data. Callers cannot distinguish these — by
    /// design the gate never surfaces errors, only absence.
    pub async fn fetch(
        self: &Arc<Self>,
        network: &str,
        address: &str,
        fallback_image: Option<String>,
    ) -> Option<TokenAttributes> {
        let key = cache_key(network, address);

        let shared = {
            let mut st = self.state();
            let now = Instant::now();

            // Global circuit breaker suppresses every key while active.
            if let Some(until) = st.rate_limited_until {
                if now < until {
                    debug!(%key, "fetch suppressed: global rate limit active");
                    return None;
                }
                st.rate_limited_until = None;
            }

            // Per-key blacklist.
            if let Some(f) = st.failures.get(&key) {
                if f.count >= BLACKLIST_THRESHOLD
                    && now < f.last_failure + blacklist_window(f.count)
                {
                    debug!(%key, failures = f.count, "fetch suppressed: key blacklisted");
                    return None;
                }
            }

            match st.cache.lookup(&key) {
                CacheLookup::Hit(attrs) => return Some(attrs),
                CacheLookup::NegativeHit => return None,
                CacheLookup::Miss => {}
            }

            // Coalesce onto an existing in-flight request for this key.
            if let Some(in_flight) = st.in_flight.get(&key) {
                in_flight.fut.clone()
            } else {
                // Soft admission control: drop, don't queue.
                if st.active >= MAX_ACTIVE_FETCHES {
                    debug!(%key, active = st.active, "fetch dropped: admission cap reached");
                    return None;
                }
                st.active += 1;

                // Reserve a pacing slot ≥ 1s after the previous dispatch.
                let start = match st.last_dispatch {
                    Some(prev) if prev + MIN_FETCH_SPACING > now => prev + MIN_FETCH_SPACING,
                    _ => now,
                };
                st.last_dispatch = Some(start);
                let delay = start - now;

                let generation = *st.generations.entry(key.clone()).or_insert(0);
                let task = tokio::spawn(Self::drive(
                    Arc::clone(self),
                    key.clone(),
                    network.to_string(),
                    address.to_string(),
                    fallback_image,
                    delay,
                    generation,
                ));
                let fut: SharedFetch = async move { task.await.unwrap_or(None) }.boxed().shared();
                st.in_flight.insert(
                    key,
                    InFlight {
                        generation,
                        fut: fut.clone(),
                    },
                );
                fut
            }
        };

        shared.await
    }

    /// Evict any cached/failure state for the key and fetch anew.
    ///
    /// An in-flight request for the same key is abandoned: it still
    /// completes for its awaiters, but its result no longer reaches the
    /// cache (its generation is stale).
    pub async fn force_refresh(
        self: &Arc<Self>,
        network: &str,
        address: &str,
        fallback_image: Option<String>,
    ) -> Option<TokenAttributes> {
        let key = cache_key(network, address);
        {
            let mut st = self.state();
            st.cache.evict(&key);
            st.failures.remove(&key);
            *st.generations.entry(key.clone()).or_insert(0) += 1;
            st.in_flight.remove(&key);
        }
        self.fetch(network, address, fallback_image).await
    }

    /// Driver task for one outbound request. Runs to completion even if
    /// every caller drops, so the result still lands in the cache.
    async fn drive(
        gate: Arc<FetchGate>,
        key: String,
        network: String,
        address: String,
        fallback_image: Option<String>,
        delay: Duration,
        generation: u64,
    ) -> Option<TokenAttributes> {
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let result = gate.provider.token_metadata(&network, &address).await;

        let mut st = gate.state();
        st.active -= 1;
        st.cache.purge_expired();
        if st
            .in_flight
            .get(&key)
            .is_some_and(|i| i.generation == generation)
        {
            st.in_flight.remove(&key);
        }
        let superseded = st.generations.get(&key).copied().unwrap_or(0) != generation;

        match result {
            Ok(mut attrs) => {
                if attrs.image_url.is_none() {
                    attrs.image_url = fallback_image;
                }
                if !superseded {
                    st.failures.remove(&key);
                    st.cache.insert_success(key, attrs.clone(), SUCCESS_TTL);
                }
                Some(attrs)
            }
            Err(err) => {
                // The breaker is global state: trip it even for a
                // superseded request.
                if err == FetchError::RateLimited {
                    warn!(%key, "upstream rate limit: pausing all metadata fetches");
                    st.rate_limited_until = Some(Instant::now() + RATE_LIMIT_COOLDOWN);
                }
                if !superseded {
                    if err.is_stable_miss() {
                        debug!(%key, %err, "stable miss, negative-cached for full TTL");
                        st.cache.insert_negative(key, SUCCESS_TTL);
                    } else {
                        let count = Self::record_failure(&mut st, &key);
                        warn!(%key, %err, failures = count, "metadata fetch failed");
                        st.cache.insert_negative(key, FAILURE_TTL);
                    }
                }
                None
            }
        }
    }

    fn record_failure(st: &mut GateState, key: &str) -> u32 {
        let entry = st.failures.entry(key.to_string()).or_insert(FailureState {
            count: 0,
            last_failure: Instant::now(),
        });
        entry.count += 1;
        entry.last_failure = Instant::now();
        entry.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::time::advance;

    fn attrs(symbol: &str) -> TokenAttributes {
        TokenAttributes {
            address: "0xabc".into(),
            name: symbol.into(),
            symbol: symbol.into(),
            decimals: Some(18),
            image_url: None,
            price_usd: None,
            market_cap_usd: None,
            price_change_h24: None,
        }
    }

    /// Scripted provider: pops pre-programmed responses; once the script
    /// is exhausted every call succeeds. Optionally blocks each call
    /// until notified.
    struct ScriptedProvider {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Result<TokenAttributes, FetchError>>>,
        hold: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn ok() -> Self {
            Self::with_script(vec![])
        }

        fn with_script(script: Vec<Result<TokenAttributes, FetchError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
                hold: None,
            }
        }

        fn holding(hold: Arc<Notify>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(VecDeque::new()),
                hold: Some(hold),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataProvider for ScriptedProvider {
        async fn token_metadata(
            &self,
            _network: &str,
            address: &str,
        ) -> Result<TokenAttributes, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(attrs(address)))
        }
    }

    fn gate_with(provider: Arc<ScriptedProvider>) -> Arc<FetchGate> {
        Arc::new(FetchGate::new(provider))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_coalesce_to_one_call() {
        let provider = Arc::new(ScriptedProvider::ok());
        let gate = gate_with(provider.clone());

        let (a, b) = tokio::join!(
            gate.fetch("base", "0xAAA", None),
            gate.fetch("base", "0xAAA", None),
        );

        assert_eq!(provider.calls(), 1);
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_provider() {
        let provider = Arc::new(ScriptedProvider::ok());
        let gate = gate_with(provider.clone());

        assert!(gate.fetch("base", "0xAAA", None).await.is_some());
        assert!(gate.fetch("base", "0xAAA", None).await.is_some());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_negative_cached_for_full_ttl() {
        let provider = Arc::new(ScriptedProvider::with_script(vec![Err(FetchError::NotFound)]));
        let gate = gate_with(provider.clone());

        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 1);

        // Still suppressed just inside the success TTL.
        advance(Duration::from_secs(29 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 1);

        // Expired — the gate asks upstream again.
        advance(Duration::from_secs(2 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_some());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forbidden_is_a_stable_miss_not_a_failure() {
        let provider = Arc::new(ScriptedProvider::with_script(vec![Err(
            FetchError::Rejected { status: 403 },
        )]));
        let gate = gate_with(provider.clone());

        assert!(gate.fetch("base", "0xAAA", None).await.is_none());

        // Not counted as a failure: a short failure-TTL wait changes nothing.
        advance(Duration::from_secs(6 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_transient_failures_blacklist_the_key() {
        let provider = Arc::new(ScriptedProvider::with_script(vec![
            Err(FetchError::Upstream { status: 500 }),
            Err(FetchError::Upstream { status: 502 }),
            Err(FetchError::Network("connection reset".into())),
        ]));
        let gate = gate_with(provider.clone());

        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        advance(Duration::from_secs(6 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        advance(Duration::from_secs(6 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 3);

        // Third strike: blacklisted, no outbound call at all.
        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 3);

        // Backoff window (5min × 2^0) elapsed — retried and healed.
        advance(Duration::from_secs(6 * 60)).await;
        assert!(gate.fetch("base", "0xAAA", None).await.is_some());
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_trips_global_breaker_for_unrelated_keys() {
        let provider = Arc::new(ScriptedProvider::with_script(vec![Err(
            FetchError::RateLimited,
        )]));
        let gate = gate_with(provider.clone());

        assert!(gate.fetch("base", "0xAAA", None).await.is_none());
        assert_eq!(provider.calls(), 1);

        // A never-failed key is suppressed too.
        assert!(gate.fetch("ethereum", "0xBBB", None).await.is_none());
        assert_eq!(provider.calls(), 1);

        advance(RATE_LIMIT_COOLDOWN + Duration::from_secs(1)).await;
        assert!(gate.fetch("ethereum", "0xBBB", None).await.is_some());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_cap_drops_third_concurrent_fetch() {
        let hold = Arc::new(Notify::new());
        let provider = Arc::new(ScriptedProvider::holding(hold.clone()));
        let gate = gate_with(provider.clone());

        let f1 = tokio::spawn({
            let gate = gate.clone();
            async move { gate.fetch("base", "0xAAA", None).await }
        });
        let f2 = tokio::spawn({
            let gate = gate.clone();
            async move { gate.fetch("base", "0xBBB", None).await }
        });

        // Let both drivers pass pacing and block inside the provider.
        sleep(Duration::from_secs(2)).await;
        assert_eq!(provider.calls(), 2);

        // Two slots occupied — the third key is dropped, not queued.
        assert!(gate.fetch("base", "0xCCC", None).await.is_none());
        assert_eq!(provider.calls(), 2);

        hold.notify_waiters();
        assert!(f1.await.unwrap().is_some());
        assert!(f2.await.unwrap().is_some());

        // Slots released — the dropped key goes through on re-poll.
        // notify_one stores a permit, so the third driver is released
        // even though it has not parked on the Notify yet.
        hold.notify_one();
        assert!(gate.fetch("base", "0xCCC", None).await.is_some());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_bypasses_fresh_cache() {
        let provider = Arc::new(ScriptedProvider::with_script(vec![
            Ok(attrs("OLD")),
            Ok(attrs("NEW")),
        ]));
        let gate = gate_with(provider.clone());

        let first = gate.fetch("base", "0xAAA", None).await.unwrap();
        assert_eq!(first.symbol, "OLD");
        assert_eq!(provider.calls(), 1);

        let refreshed = gate.force_refresh("base", "0xAAA", None).await.unwrap();
        assert_eq!(refreshed.symbol, "NEW");
        assert_eq!(provider.calls(), 2);

        // Refreshed value is what stays cached.
        let cached = gate.fetch("base", "0xAAA", None).await.unwrap();
        assert_eq!(cached.symbol, "NEW");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_logo_takes_caller_fallback() {
        let provider = Arc::new(ScriptedProvider::ok());
        let gate = gate_with(provider);

        let got = gate
            .fetch("base", "0xAAA", Some("https://cdn.example/eth.png".into()))
            .await
            .unwrap();
        assert_eq!(got.image_url.as_deref(), Some("https://cdn.example/eth.png"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_fetches_sweep_expired_entries() {
        let provider = Arc::new(ScriptedProvider::ok());
        let gate = gate_with(provider);

        assert!(gate.fetch("base", "0xAAA", None).await.is_some());
        advance(SUCCESS_TTL + Duration::from_secs(1)).await;

        // The next completed fetch purges the expired entry on its way
        // out, so only its own fresh entry remains.
        assert!(gate.fetch("base", "0xBBB", None).await.is_some());
        assert_eq!(gate.state().cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_are_paced_a_second_apart() {
        let provider = Arc::new(ScriptedProvider::ok());
        let gate = gate_with(provider.clone());

        let started = Instant::now();
        let (a, b) = tokio::join!(
            gate.fetch("base", "0xAAA", None),
            gate.fetch("base", "0xBBB", None),
        );
        assert!(a.is_some() && b.is_some());
        assert_eq!(provider.calls(), 2);
        assert!(started.elapsed() >= MIN_FETCH_SPACING);
    }
}
