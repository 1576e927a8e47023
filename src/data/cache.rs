use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::data::coingecko::PriceSource;
use crate::data::types::AssetMetadata;

/// A settled fetch result. `None` is remembered too, so a failing or unlisted
/// asset is retried at most once per TTL window.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: Option<f64>,
    expiry: Instant,
}

type SharedFetch = Shared<BoxFuture<'static, Option<f64>>>;

/// Cache-aside layer over a [`PriceSource`].
///
/// Fresh entries are served without touching the network. A miss (or a stale
/// entry) blocks on a fetch, and concurrent callers racing on the same key
/// join the single in-flight fetch instead of issuing their own. A periodic
/// background task re-fetches every known key so the cache stays warm across
/// idle stretches.
pub struct PriceCache<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: S,
    ttl: Duration,
    refresh_interval: Duration,
    entries: DashMap<String, CacheEntry>,
    in_flight: DashMap<String, SharedFetch>,
    refresh_started: AtomicBool,
}

impl<S> Clone for PriceCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PriceSource + 'static> PriceCache<S> {
    pub fn new(source: S, ttl: Duration, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                ttl,
                refresh_interval,
                entries: DashMap::new(),
                in_flight: DashMap::new(),
                refresh_started: AtomicBool::new(false),
            }),
        }
    }

    /// Current price of an asset in the reference currency.
    ///
    /// Returns `None` when the asset has no derivable CoinGecko key, when the
    /// provider has no data for it, or when the last fetch failed within the
    /// TTL window. Fetch errors never surface here; they are logged and
    /// negatively cached.
    pub async fn get_price(&self, asset: &AssetMetadata) -> Option<f64> {
        let key = asset.price_key()?;

        if let Some(entry) = self.inner.entries.get(&key) {
            if entry.expiry > Instant::now() {
                return entry.value;
            }
        }

        Inner::fetch_deduped(Arc::clone(&self.inner), key).await
    }

    /// Start the periodic refresh task: every `refresh_interval`, re-fetch
    /// every key currently in the cache so cold page loads after an idle
    /// period don't stack up on the provider.
    ///
    /// Calling this more than once is a no-op; only one timer ever runs.
    pub fn start_refresh_task(&self) {
        if self.inner.refresh_started.swap(true, Ordering::SeqCst) {
            tracing::warn!("price refresh task already running, ignoring second start");
            return;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.refresh_interval);
            // An interval's first tick completes immediately; the first real
            // sweep should happen one full interval from now.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let keys: Vec<String> =
                    inner.entries.iter().map(|entry| entry.key().clone()).collect();
                if keys.is_empty() {
                    continue;
                }

                tracing::debug!("refreshing cached prices for: {}", keys.join(", "));
                for key in keys {
                    let inner = Arc::clone(&inner);
                    tokio::spawn(async move {
                        Inner::fetch_deduped(inner, key).await;
                    });
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

impl<S: PriceSource + 'static> Inner<S> {
    /// Join the in-flight fetch for `key`, or start one if none exists.
    ///
    /// The fetch runs on a detached task, so once started it settles and
    /// writes a cache entry even if every waiting caller is cancelled; the
    /// registry entry is removed when it settles, success or failure. Every
    /// caller racing on a cold key observes the same single network round
    /// trip.
    async fn fetch_deduped(self: Arc<Self>, key: String) -> Option<f64> {
        // A racer's fetch may have settled between the caller's freshness
        // check and here; don't hit the network again over a fresh entry.
        if let Some(entry) = self.entries.get(&key) {
            if entry.expiry > Instant::now() {
                return entry.value;
            }
        }

        let fetch = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let inner = Arc::clone(&self);
                let handle = tokio::spawn(async move {
                    let value = inner.fetch_and_store(&key).await;
                    inner.in_flight.remove(&key);
                    value
                });
                let fetch = async move { handle.await.ok().flatten() }.boxed().shared();
                vacant.insert(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    /// One fetch against the source, always settling into a cache entry.
    /// Errors become an absent entry with a full TTL.
    async fn fetch_and_store(&self, key: &str) -> Option<f64> {
        let value = match self.source.fetch_price(key).await {
            Ok(price) => price,
            Err(err) => {
                tracing::warn!("failed to fetch price for {}: {}", key, err);
                None
            }
        };

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expiry: Instant::now() + self.ttl,
            },
        );

        value
    }
}
