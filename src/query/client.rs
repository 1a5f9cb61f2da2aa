// src/query/client.rs
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::errors::{LabelerError, Result};

const EVENT_CAPACITY: usize = 64;

/// Stable address of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKey {
    #[serde(rename = "evaluation")]
    Evaluation,
    #[serde(rename = "labeling-message")]
    LabelingMessage,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Evaluation => "evaluation",
            QueryKey::LabelingMessage => "labeling-message",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a fetch or mutation, cloneable so every waiter on a shared fetch gets a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
    pub status: Option<u16>,
}

impl From<LabelerError> for QueryError {
    fn from(err: LabelerError) -> Self {
        QueryError {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Published on every invalidation and every stored fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "key", rename_all = "lowercase")]
pub enum CacheEvent {
    Invalidated(QueryKey),
    Updated(QueryKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing fetched yet.
    Pending,
    Error,
    Success,
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub status: QueryStatus,
    /// `None` on success means the service had nothing to return.
    pub data: Option<T>,
    pub error: Option<QueryError>,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub data_updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryResult<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;
type FetchOutcome = std::result::Result<CachedValue, QueryError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchOutcome> + Send + Sync>;

#[derive(Default)]
struct Entry {
    /// Holds an `Option<T>`; `None` inside is a successful empty answer.
    data: Option<CachedValue>,
    error: Option<QueryError>,
    data_updated_at: Option<DateTime<Utc>>,
    stale: bool,
    in_flight: Option<SharedFetch>,
    fetcher: Option<Fetcher>,
    observers: usize,
    fetch_seq: u64,
    fetches: u64,
    invalidations: u64,
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<CacheEvent>,
}

/// Keyed store of query results shared by every view.
///
/// Reads go through [`QueryObserver`]s; writes happen only by storing fetch
/// results and by [`QueryClient::invalidate`].
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an active observer of `key`, fetching with `fetch`.
    ///
    /// The observer keeps the key "active": invalidations re-fetch it until it is dropped.
    pub fn observe<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryObserver<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let fut = fetch();
            async move {
                fut.await
                    .map(|data| Arc::new(data) as CachedValue)
                    .map_err(QueryError::from)
            }
            .boxed()
        });

        let mut entries = self.entries();
        let entry = entries.entry(key).or_default();
        entry.observers += 1;
        entry.fetcher = Some(fetcher);
        log::debug!("Observer attached to '{}' ({} active)", key, entry.observers);
        drop(entries);

        QueryObserver {
            client: self.clone(),
            key,
            _marker: PhantomData,
        }
    }

    /// Mark `key` stale and re-fetch it if anything observes it.
    pub fn invalidate(&self, key: QueryKey) {
        let active = {
            let mut entries = self.entries();
            let entry = entries.entry(key).or_default();
            entry.stale = true;
            entry.invalidations += 1;
            entry.observers > 0
        };
        log::debug!("Invalidated '{}' (active: {})", key, active);
        let _ = self.inner.events.send(CacheEvent::Invalidated(key));

        if active {
            // An in-flight fetch may predate the invalidation, so start a fresh one.
            self.start_fetch(key, true);
        }
    }

    pub fn invalidation_count(&self, key: QueryKey) -> u64 {
        self.entries().get(&key).map_or(0, |e| e.invalidations)
    }

    pub fn fetch_count(&self, key: QueryKey) -> u64 {
        self.entries().get(&key).map_or(0, |e| e.fetches)
    }

    pub fn observer_count(&self, key: QueryKey) -> usize {
        self.entries().get(&key).map_or(0, |e| e.observers)
    }

    /// Join the fetch in flight for `key`, or start one. With `supersede`, always
    /// start a new fetch; results of older fetches are then discarded.
    fn start_fetch(&self, key: QueryKey, supersede: bool) -> Option<SharedFetch> {
        let mut entries = self.entries();
        let entry = entries.entry(key).or_default();

        if !supersede {
            if let Some(in_flight) = &entry.in_flight {
                return Some(in_flight.clone());
            }
        }

        let Some(fetcher) = entry.fetcher.clone() else {
            log::debug!("No observer for '{}', skipping fetch", key);
            return None;
        };

        entry.fetch_seq += 1;
        let seq = entry.fetch_seq;

        let client = self.clone();
        let task = tokio::spawn(async move {
            let outcome = fetcher().await;
            client.store(key, seq, &outcome);
            outcome
        });

        let client = self.clone();
        let shared = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let outcome = Err(QueryError {
                        message: format!("fetch task for '{}' failed: {}", key, e),
                        status: None,
                    });
                    client.store(key, seq, &outcome);
                    outcome
                }
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(shared.clone());
        Some(shared)
    }

    fn store(&self, key: QueryKey, seq: u64, outcome: &FetchOutcome) {
        {
            let mut entries = self.entries();
            let entry = entries.entry(key).or_default();
            if seq != entry.fetch_seq {
                log::debug!("Discarding superseded fetch #{} for '{}'", seq, key);
                return;
            }

            entry.in_flight = None;
            entry.fetches += 1;
            match outcome {
                Ok(data) => {
                    entry.data = Some(data.clone());
                    entry.error = None;
                    entry.stale = false;
                    entry.data_updated_at = Some(Utc::now());
                }
                Err(e) => {
                    log::warn!("Fetch for '{}' failed: {}", key, e);
                    entry.error = Some(e.clone());
                }
            }
        }
        let _ = self.inner.events.send(CacheEvent::Updated(key));
    }

    fn needs_fetch(&self, key: QueryKey) -> bool {
        self.entries().get(&key).is_none_or(|e| {
            e.in_flight.is_none() && (e.stale || (e.data.is_none() && e.error.is_none()))
        })
    }

    fn in_flight(&self, key: QueryKey) -> Option<SharedFetch> {
        self.entries().get(&key).and_then(|e| e.in_flight.clone())
    }

    fn snapshot<T: Clone + 'static>(&self, key: QueryKey) -> QueryResult<T> {
        let entries = self.entries();
        let Some(entry) = entries.get(&key) else {
            return QueryResult {
                status: QueryStatus::Pending,
                data: None,
                error: None,
                is_fetching: false,
                is_stale: false,
                data_updated_at: None,
            };
        };

        let status = if entry.error.is_some() {
            QueryStatus::Error
        } else if entry.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Pending
        };

        let data = entry.data.as_ref().and_then(|value| {
            let typed = value.downcast_ref::<Option<T>>();
            if typed.is_none() {
                log::error!("Cached value for '{}' has an unexpected type", key);
            }
            typed.cloned().flatten()
        });

        QueryResult {
            status,
            data,
            error: entry.error.clone(),
            is_fetching: entry.in_flight.is_some(),
            is_stale: entry.stale,
            data_updated_at: entry.data_updated_at,
        }
    }

    fn release(&self, key: QueryKey) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(&key) {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 {
                entry.fetcher = None;
            }
            log::debug!("Observer detached from '{}' ({} active)", key, entry.observers);
        }
    }
}

/// Typed, scoped subscription to one cache key. Dropping it deactivates the key.
pub struct QueryObserver<T> {
    client: QueryClient,
    key: QueryKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Clone + Send + Sync + 'static> QueryObserver<T> {
    pub fn result(&self) -> QueryResult<T> {
        self.client.snapshot(self.key)
    }

    /// Fetch now, joining a fetch already in flight for the same key.
    pub async fn refetch(&self) -> QueryResult<T> {
        if let Some(fetch) = self.client.start_fetch(self.key, false) {
            let _ = fetch.await;
        }
        self.result()
    }

    /// Fetch only if the entry was never fetched or has been invalidated.
    pub async fn ensure_fresh(&self) -> QueryResult<T> {
        if self.client.needs_fetch(self.key) {
            self.client.start_fetch(self.key, false);
        }
        self.settle().await
    }

    /// Wait for whatever fetch is in flight, then snapshot.
    pub async fn settle(&self) -> QueryResult<T> {
        while let Some(fetch) = self.client.in_flight(self.key) {
            let _ = fetch.await;
        }
        self.result()
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.client.release(self.key);
    }
}
