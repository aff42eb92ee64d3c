/// Query cache in front of the analysis source and the settings store
///
/// Analysis results are cached per video id for a freshness window, and
/// concurrent reads of the same id share one in-flight fetch. Settings are
/// loaded once per session and replaced wholesale on every successful write,
/// so a read issued after a write completes always observes that write.
///
/// Everything runs on the single-threaded WASM event loop: state lives in
/// `Rc`/`RefCell`, and no borrow is held across an `.await`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{debug, error, info};

use crate::analysis::AnalysisResult;
use crate::error::QueryError;
use crate::settings::Settings;
use crate::source::AnalysisSource;
use crate::storage::SettingsStore;

/// Milliseconds since the epoch
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `Date.now()` in the browser
#[derive(Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Unfetched,
    Fetching,
    Fresh,
    Stale,
    Errored,
}

/// Broadcast to analysis subscribers after a successful fetch
#[derive(Debug, Clone)]
pub struct AnalysisUpdate {
    pub video_id: String,
    pub result: Rc<AnalysisResult>,
}

type FetchOutput = Result<Rc<AnalysisResult>, QueryError>;
type SharedFetch = Shared<LocalBoxFuture<'static, FetchOutput>>;
type SharedLoad = Shared<LocalBoxFuture<'static, Settings>>;

struct Cached {
    data: Rc<AnalysisResult>,
    fetched_at: f64,
    invalidated: bool,
}

#[derive(Default)]
struct AnalysisEntry {
    cached: Option<Cached>,
    in_flight: Option<SharedFetch>,
    error: Option<QueryError>,
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct Subscribers<T> {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Listener<T>>>,
}

impl<T: 'static> Subscribers<T> {
    fn new() -> Rc<Self> {
        Rc::new(Subscribers {
            next_id: Cell::new(0),
            listeners: RefCell::new(BTreeMap::new()),
        })
    }

    fn subscribe(self: &Rc<Self>, listener: Listener<T>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, listener);

        let subscribers: Weak<Self> = Rc::downgrade(self);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(subscribers) = subscribers.upgrade() {
                    subscribers.listeners.borrow_mut().remove(&id);
                }
            })),
        }
    }

    fn notify(&self, value: &T) {
        // Snapshot first: a listener may subscribe or unsubscribe while running
        let listeners: Vec<Listener<T>> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(value);
        }
    }
}

/// Keeps a listener registered. Dropping it unregisters the listener.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

struct Inner {
    source: Rc<dyn AnalysisSource>,
    store: Rc<SettingsStore>,
    clock: Rc<dyn Clock>,
    stale_ms: f64,
    analyses: RefCell<HashMap<String, AnalysisEntry>>,
    analysis_subscribers: Rc<Subscribers<AnalysisUpdate>>,
    settings: RefCell<Settings>,
    settings_loaded: Cell<bool>,
    settings_load: RefCell<Option<SharedLoad>>,
    settings_subscribers: Rc<Subscribers<Settings>>,
}

impl Inner {
    /// Fresh strictly below the window; an entry exactly at the window is stale
    fn is_fresh(&self, cached: &Cached) -> bool {
        !cached.invalidated && self.clock.now_ms() - cached.fetched_at < self.stale_ms
    }

    fn settle_fetch(&self, video_id: &str, result: &FetchOutput) {
        {
            let mut analyses = self.analyses.borrow_mut();
            let entry = analyses.entry(video_id.to_string()).or_default();
            entry.in_flight = None;

            match result {
                Ok(data) => {
                    entry.cached = Some(Cached {
                        data: data.clone(),
                        fetched_at: self.clock.now_ms(),
                        invalidated: false,
                    });
                    entry.error = None;
                }
                Err(e) => {
                    error!("Analysis fetch for {} failed: {}", video_id, e);
                    entry.error = Some(e.clone());
                }
            }
        }

        if let Ok(data) = result {
            self.analysis_subscribers.notify(&AnalysisUpdate {
                video_id: video_id.to_string(),
                result: data.clone(),
            });
        }
    }

    /// Drop other ids that are neither fresh nor being fetched
    fn evict_stale(&self, analyses: &mut HashMap<String, AnalysisEntry>, keep: &str) {
        let before = analyses.len();
        analyses.retain(|id, entry| {
            id == keep
                || entry.in_flight.is_some()
                || entry.cached.as_ref().is_some_and(|cached| self.is_fresh(cached))
        });
        if analyses.len() < before {
            debug!("Evicted {} stale analysis entries", before - analyses.len());
        }
    }

    /// A write that completed while the load was in flight takes precedence
    fn adopt_loaded_settings(&self, loaded: Settings) -> Settings {
        self.settings_load.borrow_mut().take();

        if self.settings_loaded.get() {
            debug!("Discarding settings load superseded by a write");
            return self.settings.borrow().clone();
        }

        *self.settings.borrow_mut() = loaded.clone();
        self.settings_loaded.set(true);
        self.settings_subscribers.notify(&loaded);
        loaded
    }
}

/// Shared handle to the cache. Clones point at the same cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Rc<Inner>,
}

impl PartialEq for QueryClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl QueryClient {
    pub fn new(
        source: Rc<dyn AnalysisSource>,
        store: Rc<SettingsStore>,
        clock: Rc<dyn Clock>,
        stale_time: Duration,
    ) -> QueryClient {
        QueryClient {
            inner: Rc::new(Inner {
                source,
                store,
                clock,
                stale_ms: stale_time.as_secs_f64() * 1000.0,
                analyses: RefCell::new(HashMap::new()),
                analysis_subscribers: Subscribers::new(),
                settings: RefCell::new(Settings::default()),
                settings_loaded: Cell::new(false),
                settings_load: RefCell::new(None),
                settings_subscribers: Subscribers::new(),
            }),
        }
    }

    /// Cached analysis if fresh, otherwise the result of a (shared) fetch
    pub async fn get_analysis(&self, video_id: &str) -> Result<Rc<AnalysisResult>, QueryError> {
        let fetch = {
            let mut analyses = self.inner.analyses.borrow_mut();
            let entry = analyses.entry(video_id.to_string()).or_default();

            if let Some(cached) = entry.cached.as_ref().filter(|c| self.inner.is_fresh(c)) {
                debug!("Analysis cache hit for {}", video_id);
                return Ok(cached.data.clone());
            }

            match entry.in_flight.clone() {
                Some(fetch) => {
                    debug!("Joining in-flight fetch for {}", video_id);
                    fetch
                }
                None => {
                    debug!("Analysis cache miss for {}", video_id);
                    let fetch = self.start_fetch(video_id);
                    entry.in_flight = Some(fetch.clone());
                    self.inner.evict_stale(&mut analyses, video_id);
                    fetch
                }
            }
        };

        fetch.await
    }

    fn start_fetch(&self, video_id: &str) -> SharedFetch {
        let source = self.inner.source.clone();
        let inner = Rc::downgrade(&self.inner);
        let video_id = video_id.to_string();

        async move {
            info!("Fetching analysis for {}", video_id);
            let result = source
                .fetch(&video_id)
                .await
                .map(Rc::new)
                .map_err(QueryError::from);

            // The cache may be gone if the popup closed mid-fetch
            if let Some(inner) = inner.upgrade() {
                inner.settle_fetch(&video_id, &result);
            }
            result
        }
        .boxed_local()
        .shared()
    }

    pub fn analysis_status(&self, video_id: &str) -> EntryStatus {
        let analyses = self.inner.analyses.borrow();
        let Some(entry) = analyses.get(video_id) else {
            return EntryStatus::Unfetched;
        };

        if entry.in_flight.is_some() {
            EntryStatus::Fetching
        } else if entry.error.is_some() {
            EntryStatus::Errored
        } else {
            match &entry.cached {
                Some(cached) if self.inner.is_fresh(cached) => EntryStatus::Fresh,
                Some(_) => EntryStatus::Stale,
                None => EntryStatus::Unfetched,
            }
        }
    }

    /// Last fetched value regardless of freshness; never fetches
    pub fn cached_analysis(&self, video_id: &str) -> Option<Rc<AnalysisResult>> {
        self.inner
            .analyses
            .borrow()
            .get(video_id)
            .and_then(|entry| entry.cached.as_ref())
            .map(|cached| cached.data.clone())
    }

    /// Mark the entry stale so the next read fetches again
    pub fn invalidate_analysis(&self, video_id: &str) {
        if let Some(cached) = self
            .inner
            .analyses
            .borrow_mut()
            .get_mut(video_id)
            .and_then(|entry| entry.cached.as_mut())
        {
            cached.invalidated = true;
        }
    }

    pub fn subscribe_analysis<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AnalysisUpdate) + 'static,
    {
        self.inner.analysis_subscribers.subscribe(Rc::new(listener))
    }

    /// Current cached settings; the defaults until the first load completes
    pub fn settings_snapshot(&self) -> Settings {
        self.inner.settings.borrow().clone()
    }

    /// Settings for this session, loading them from the store on first use
    pub async fn get_settings(&self) -> Settings {
        if self.inner.settings_loaded.get() {
            return self.settings_snapshot();
        }

        let load = {
            let mut slot = self.inner.settings_load.borrow_mut();
            match slot.clone() {
                Some(load) => load,
                None => {
                    let load = self.start_settings_load();
                    *slot = Some(load.clone());
                    load
                }
            }
        };

        load.await
    }

    fn start_settings_load(&self) -> SharedLoad {
        let store = self.inner.store.clone();
        let inner = Rc::downgrade(&self.inner);

        async move {
            let loaded = store.load().await;
            match inner.upgrade() {
                Some(inner) => inner.adopt_loaded_settings(loaded),
                None => loaded,
            }
        }
        .boxed_local()
        .shared()
    }

    /// Persist `new_settings` wholesale, then make it the cached value.
    /// On failure the cache is left untouched.
    pub async fn update_settings(&self, new_settings: Settings) -> Result<Settings, QueryError> {
        let store = self.inner.store.clone();

        let saved = store.save(new_settings).await.map_err(|e| {
            error!("Failed to save settings: {}", e);
            QueryError::from(e)
        })?;

        *self.inner.settings.borrow_mut() = saved.clone();
        self.inner.settings_loaded.set(true);
        self.inner.settings_subscribers.notify(&saved);
        Ok(saved)
    }

    pub fn subscribe_settings<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Settings) + 'static,
    {
        self.inner.settings_subscribers.subscribe(Rc::new(listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, StorageError};
    use crate::source::FixtureSource;
    use crate::storage::tests::FlakyStorage;
    use crate::storage::{KeyValueStore, MemoryStorage, SETTINGS_KEY};
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use serde_json::Value;

    #[derive(Default)]
    struct ManualClock {
        now: Cell<f64>,
    }

    impl ManualClock {
        fn advance(&self, ms: f64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.now.get()
        }
    }

    /// Counts fetches; optionally waits on a gate or fails
    #[derive(Default)]
    struct CountingSource {
        calls: Cell<usize>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        fail: Cell<bool>,
    }

    impl CountingSource {
        fn gate(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.gate.borrow_mut() = Some(rx);
            tx
        }
    }

    #[async_trait(?Send)]
    impl AnalysisSource for CountingSource {
        async fn fetch(&self, _video_id: &str) -> Result<AnalysisResult, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let gate = self.gate.borrow_mut().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            if self.fail.get() {
                Err(FetchError::Transport("connection refused".to_string()))
            } else {
                Ok(FixtureSource::fixture())
            }
        }
    }

    /// Reads the stored value, then waits on a gate before returning it
    #[derive(Default)]
    struct GatedStorage {
        inner: MemoryStorage,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl KeyValueStore for GatedStorage {
        async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
            let value = self.inner.get(key).await;
            let gate = self.gate.borrow_mut().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            value
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }
    }

    struct Harness {
        client: QueryClient,
        source: Rc<CountingSource>,
        clock: Rc<ManualClock>,
        storage: Rc<FlakyStorage>,
    }

    fn create_test_client() -> Harness {
        let source = Rc::new(CountingSource::default());
        let clock = Rc::new(ManualClock::default());
        let storage = Rc::new(FlakyStorage::default());
        let client = QueryClient::new(
            source.clone(),
            Rc::new(SettingsStore::new(storage.clone())),
            clock.clone(),
            Duration::from_secs(60),
        );

        Harness {
            client,
            source,
            clock,
            storage,
        }
    }

    #[test]
    fn test_second_read_within_window_is_served_from_cache() {
        let h = create_test_client();

        let first = block_on(h.client.get_analysis("abc123")).unwrap();
        h.clock.advance(1000.0);
        let second = block_on(h.client.get_analysis("abc123")).unwrap();

        assert_eq!(h.source.calls.get(), 1);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Fresh);
    }

    #[test]
    fn test_concurrent_reads_share_one_fetch() {
        let h = create_test_client();
        let release = h.source.gate();

        let (a, b) = block_on(async {
            let (a, b, _) = futures::join!(
                h.client.get_analysis("vid1"),
                h.client.get_analysis("vid1"),
                async {
                    assert_eq!(h.client.analysis_status("vid1"), EntryStatus::Fetching);
                    release.send(()).unwrap();
                }
            );
            (a, b)
        });

        assert_eq!(h.source.calls.get(), 1);
        assert!(Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[test]
    fn test_entry_at_freshness_boundary_is_stale() {
        let h = create_test_client();

        block_on(h.client.get_analysis("abc123")).unwrap();
        h.clock.advance(59_999.0);
        block_on(h.client.get_analysis("abc123")).unwrap();
        assert_eq!(h.source.calls.get(), 1);

        h.clock.advance(1.0);
        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Stale);
        block_on(h.client.get_analysis("abc123")).unwrap();
        assert_eq!(h.source.calls.get(), 2);
        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Fresh);
    }

    #[test]
    fn test_failed_fetch_is_not_cached_and_retries() {
        let h = create_test_client();
        h.source.fail.set(true);

        let err = block_on(h.client.get_analysis("abc123")).unwrap_err();
        assert!(matches!(err, QueryError::Fetch(FetchError::Transport(_))));
        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Errored);
        assert!(h.client.cached_analysis("abc123").is_none());

        h.source.fail.set(false);
        block_on(h.client.get_analysis("abc123")).unwrap();

        assert_eq!(h.source.calls.get(), 2);
        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Fresh);
    }

    #[test]
    fn test_distinct_ids_fetch_separately() {
        let h = create_test_client();

        block_on(h.client.get_analysis("a")).unwrap();
        block_on(h.client.get_analysis("b")).unwrap();

        assert_eq!(h.source.calls.get(), 2);
        assert_eq!(h.client.analysis_status("c"), EntryStatus::Unfetched);
    }

    #[test]
    fn test_new_id_evicts_stale_entries() {
        let h = create_test_client();

        block_on(h.client.get_analysis("old")).unwrap();
        block_on(h.client.get_analysis("recent")).unwrap();
        h.client.invalidate_analysis("old");

        block_on(h.client.get_analysis("new")).unwrap();

        assert_eq!(h.client.analysis_status("old"), EntryStatus::Unfetched);
        assert!(h.client.cached_analysis("old").is_none());
        assert_eq!(h.client.analysis_status("recent"), EntryStatus::Fresh);
        assert_eq!(h.client.analysis_status("new"), EntryStatus::Fresh);
        assert_eq!(h.client.inner.analyses.borrow().len(), 2);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let h = create_test_client();

        block_on(h.client.get_analysis("abc123")).unwrap();
        h.client.invalidate_analysis("abc123");

        assert_eq!(h.client.analysis_status("abc123"), EntryStatus::Stale);
        assert!(h.client.cached_analysis("abc123").is_some());

        block_on(h.client.get_analysis("abc123")).unwrap();
        assert_eq!(h.source.calls.get(), 2);
    }

    #[test]
    fn test_abandoned_fetch_is_cached_for_next_reader() {
        let h = create_test_client();
        let release = h.source.gate();

        block_on(async {
            let mut abandoned = Box::pin(h.client.get_analysis("vid1"));
            assert!(futures::poll!(abandoned.as_mut()).is_pending());
        });
        // Still registered as in flight; the next reader drives it to completion
        assert_eq!(h.client.analysis_status("vid1"), EntryStatus::Fetching);
        release.send(()).unwrap();

        block_on(h.client.get_analysis("vid1")).unwrap();
        assert_eq!(h.source.calls.get(), 1);
    }

    #[test]
    fn test_analysis_subscribers() {
        let h = create_test_client();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let subscription = {
            let seen = seen.clone();
            h.client.subscribe_analysis(move |update| seen.borrow_mut().push(update.video_id.clone()))
        };
        block_on(h.client.get_analysis("a")).unwrap();
        drop(subscription);
        block_on(h.client.get_analysis("b")).unwrap();

        assert_eq!(*seen.borrow(), vec!["a".to_string()]);
    }

    #[test]
    fn test_settings_default_before_load() {
        let h = create_test_client();
        block_on(h.storage.set(SETTINGS_KEY, serde_json::to_value(Settings::default().with_intensity(2)).unwrap())).unwrap();

        assert_eq!(h.client.settings_snapshot(), Settings::default());

        let loaded = block_on(h.client.get_settings());
        assert_eq!(loaded.intensity.level(), 2);
        assert_eq!(h.client.settings_snapshot().intensity.level(), 2);
    }

    #[test]
    fn test_read_after_write() {
        let h = create_test_client();

        let current = block_on(h.client.get_settings());
        block_on(h.client.update_settings(current.with_intensity(5))).unwrap();

        assert_eq!(block_on(h.client.get_settings()).intensity.level(), 5);
        assert_eq!(h.client.settings_snapshot().intensity.level(), 5);
    }

    #[test]
    fn test_failed_save_leaves_cache_unchanged() {
        let h = create_test_client();
        let before = block_on(h.client.get_settings());
        h.storage.fail_writes.set(true);

        let result = block_on(h.client.update_settings(before.with_intensity(5)));

        assert!(matches!(result, Err(QueryError::Storage(StorageError::Write(_)))));
        assert_eq!(h.client.settings_snapshot(), before);
        assert_eq!(block_on(h.client.get_settings()), before);
    }

    #[test]
    fn test_write_during_load_wins() {
        let storage = Rc::new(GatedStorage::default());
        block_on(storage.set(SETTINGS_KEY, serde_json::to_value(Settings::default().with_intensity(2)).unwrap())).unwrap();
        let (release, rx) = oneshot::channel();
        *storage.gate.borrow_mut() = Some(rx);

        let client = QueryClient::new(
            Rc::new(CountingSource::default()),
            Rc::new(SettingsStore::new(storage)),
            Rc::new(ManualClock::default()),
            Duration::from_secs(60),
        );

        let (loaded, written) = block_on(async {
            let (loaded, written, _) = futures::join!(
                client.get_settings(),
                client.update_settings(Settings::default().with_intensity(5)),
                async { release.send(()).unwrap() }
            );
            (loaded, written)
        });

        assert_eq!(written.unwrap().intensity.level(), 5);
        assert_eq!(loaded.intensity.level(), 5);
        assert_eq!(client.settings_snapshot().intensity.level(), 5);
    }

    #[test]
    fn test_settings_subscription_dropped_is_not_notified() {
        let h = create_test_client();
        let seen = Rc::new(Cell::new(0u8));

        let subscription = {
            let seen = seen.clone();
            h.client.subscribe_settings(move |s| seen.set(s.intensity.level()))
        };
        block_on(h.client.update_settings(Settings::default().with_intensity(4))).unwrap();
        assert_eq!(seen.get(), 4);

        drop(subscription);
        block_on(h.client.update_settings(Settings::default().with_intensity(1))).unwrap();
        assert_eq!(seen.get(), 4);
    }
}
