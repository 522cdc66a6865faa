use std::{
    sync::{Arc, mpsc},
    thread,
    time::{Duration, Instant},
};

use tokio::runtime::Runtime;

use crate::config::{DF, SAVE_DEBOUNCE_MS};
use crate::data::AnnotationStorage;
use crate::overlay::annotation::Annotation;
use crate::overlay::store::DrawingStore;

enum StorageJob {
    Load {
        user: String,
        symbol: String,
    },
    Save {
        user: String,
        symbol: String,
        annotations: Vec<Annotation>,
    },
}

enum StorageEvent {
    Loaded {
        symbol: String,
        annotations: Vec<Annotation>,
    },
    LoadFailed {
        symbol: String,
        error: String,
    },
    SaveFailed {
        symbol: String,
        error: String,
    },
}

/// Arm-on-mutation debounce timer. Re-arming on every observed revision
/// means a burst of edits settles into a single write once the burst stops.
struct SaveDebouncer {
    quiet_period: Duration,
    last_seen_revision: u64,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_seen_revision: 0,
            deadline: None,
        }
    }

    /// Observe the store revision; returns true when the timer fires and a
    /// save should be issued now.
    fn poll(&mut self, revision: u64, now: Instant) -> bool {
        if revision != self.last_seen_revision {
            self.last_seen_revision = revision;
            self.deadline = Some(now + self.quiet_period);
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Forget everything observed so far; used when a fresh store replaces
    /// the one this timer was tracking.
    fn reset(&mut self) {
        self.last_seen_revision = 0;
        self.cancel();
    }

    /// Drop any armed timer and report whether `revision` still needs a
    /// write: either a timer was pending, or the store mutated since the
    /// last poll.
    fn settle(&mut self, revision: u64) -> bool {
        let dirty = self.pending() || revision != self.last_seen_revision;
        self.last_seen_revision = revision;
        self.cancel();
        dirty
    }

    fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Debounced synchronization of the drawing store to durable per-user,
/// per-symbol storage, plus one-shot hydration on load.
///
/// Storage IO runs on a dedicated worker thread with its own tokio runtime
/// (the UI thread never blocks); results come back over an mpsc channel and
/// are drained in [`PersistenceBridge::tick`] each frame. A failed save
/// leaves the in-memory store untouched and surfaces as a notice; the next
/// mutation's debounce cycle is the retry.
pub struct PersistenceBridge {
    user: String,
    job_tx: mpsc::Sender<StorageJob>,
    event_rx: mpsc::Receiver<StorageEvent>,
    debouncer: SaveDebouncer,
    /// Symbol hydration is currently outstanding for, if any.
    loading: Option<String>,
}

impl PersistenceBridge {
    pub fn new(storage: Arc<dyn AnnotationStorage>, user: impl Into<String>) -> Self {
        Self::with_quiet_period(storage, user, Duration::from_millis(SAVE_DEBOUNCE_MS))
    }

    pub fn with_quiet_period(
        storage: Arc<dyn AnnotationStorage>,
        user: impl Into<String>,
        quiet_period: Duration,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<StorageJob>();
        let (event_tx, event_rx) = mpsc::channel::<StorageEvent>();

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    log::error!("Annotation storage worker failed to start: {err}");
                    return;
                }
            };
            while let Ok(job) = job_rx.recv() {
                if let Some(event) = rt.block_on(run_job(storage.as_ref(), job)) {
                    if event_tx.send(event).is_err() {
                        break; // bridge dropped, nobody is listening
                    }
                }
            }
        });

        Self {
            user: user.into(),
            job_tx,
            event_rx,
            debouncer: SaveDebouncer::new(quiet_period),
            loading: None,
        }
    }

    /// Kick off hydration for a freshly opened symbol. The store is expected
    /// to be brand new (pristine) at this point.
    pub fn begin_symbol(&mut self, symbol: &str) {
        self.debouncer.reset();
        self.loading = Some(symbol.to_string());
        let _ = self.job_tx.send(StorageJob::Load {
            user: self.user.clone(),
            symbol: symbol.to_string(),
        });
    }

    /// Write the store out immediately if anything is still unpersisted: a
    /// pending debounce, or an edit the timer has not even observed yet.
    /// Called on symbol switch and teardown so nothing survives against a
    /// store that is about to be discarded.
    pub fn flush(&mut self, store: &DrawingStore) {
        if self.debouncer.settle(store.revision()) {
            self.send_save(store);
        }
    }

    /// Per-frame pump: apply hydration results, surface storage failures,
    /// and run the debounce timer. Failure notices are pushed to `notices`
    /// for the status bar.
    pub fn tick(&mut self, store: &mut DrawingStore, notices: &mut Vec<String>) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                StorageEvent::Loaded {
                    symbol,
                    annotations,
                } => {
                    // A late-arriving load for a symbol the user already
                    // navigated away from is dropped on the floor.
                    if self.loading.as_deref() != Some(symbol.as_str())
                        || symbol != store.symbol()
                    {
                        continue;
                    }
                    self.loading = None;
                    let count = annotations.len();
                    if store.hydrate(annotations) {
                        if DF.log_persistence {
                            log::info!("Hydrated {count} annotation(s) for {symbol}");
                        }
                    } else if count > 0 {
                        // User drew before the load resolved: their edits win.
                        log::info!("Skipped hydration for {symbol}: store already modified");
                    }
                }
                StorageEvent::LoadFailed { symbol, error } => {
                    self.loading = None;
                    log::error!("Failed to load annotations for {symbol}: {error}");
                    notices.push(format!("Could not load drawings for {symbol}"));
                }
                StorageEvent::SaveFailed { symbol, error } => {
                    log::error!("Failed to save annotations for {symbol}: {error}");
                    notices.push(format!("Could not save drawings for {symbol}"));
                }
            }
        }

        if self.debouncer.poll(store.revision(), Instant::now()) {
            self.send_save(store);
        }
    }

    fn send_save(&self, store: &DrawingStore) {
        if DF.log_persistence {
            log::info!(
                "Saving {} annotation(s) for {}",
                store.len(),
                store.symbol()
            );
        }
        // The payload carries its own symbol, so a write queued just before
        // a symbol switch can never land on the wrong ticker.
        let _ = self.job_tx.send(StorageJob::Save {
            user: self.user.clone(),
            symbol: store.symbol().to_string(),
            annotations: store.annotations().to_vec(),
        });
    }
}

/// Returns `None` for a successful save: the UI needs no event for it.
async fn run_job(storage: &dyn AnnotationStorage, job: StorageJob) -> Option<StorageEvent> {
    match job {
        StorageJob::Load { user, symbol } => match storage.load(&user, &symbol).await {
            Ok(annotations) => Some(StorageEvent::Loaded {
                symbol,
                annotations,
            }),
            Err(err) => Some(StorageEvent::LoadFailed {
                symbol,
                error: err.to_string(),
            }),
        },
        StorageJob::Save {
            user,
            symbol,
            annotations,
        } => match storage.save(&user, &symbol, &annotations).await {
            Ok(()) => None,
            Err(err) => Some(StorageEvent::SaveFailed {
                symbol,
                error: err.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::annotation::{Anchor, AnnotationKind};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn trend() -> Annotation {
        Annotation::new(
            AnnotationKind::TrendLine,
            vec![Anchor::new(0, 1.0), Anchor::new(10, 2.0)],
        )
    }

    #[test]
    fn debouncer_coalesces_a_burst_into_one_fire() {
        let mut d = SaveDebouncer::new(Duration::from_millis(1_000));
        let t0 = Instant::now();

        assert!(!d.poll(1, t0)); // add
        assert!(!d.poll(2, t0 + Duration::from_millis(300))); // add
        assert!(!d.poll(3, t0 + Duration::from_millis(600))); // remove
        // Timer restarted on every edit: nothing due 1s after the first.
        assert!(!d.poll(3, t0 + Duration::from_millis(1_100)));
        // Due once 1s after the last edit.
        assert!(d.poll(3, t0 + Duration::from_millis(1_700)));
        // And only once.
        assert!(!d.poll(3, t0 + Duration::from_millis(2_700)));
    }

    #[test]
    fn debouncer_cancel_drops_the_pending_write() {
        let mut d = SaveDebouncer::new(Duration::from_millis(1_000));
        let t0 = Instant::now();
        assert!(!d.poll(1, t0));
        assert!(d.pending());
        d.cancel();
        assert!(!d.poll(1, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn debouncer_settle_flags_pending_and_unseen_revisions() {
        let mut d = SaveDebouncer::new(Duration::from_millis(1_000));
        let t0 = Instant::now();

        // Nothing has happened: nothing to write.
        assert!(!d.settle(0));

        // Timer armed but not yet fired.
        assert!(!d.poll(1, t0));
        assert!(d.settle(1));
        assert!(!d.pending());

        // Timer already fired for revision 2, then revision 3 arrives
        // without an intervening poll.
        assert!(!d.poll(2, t0));
        assert!(d.poll(2, t0 + Duration::from_millis(1_100)));
        assert!(d.settle(3));
        // Settled: a repeat is a no-op.
        assert!(!d.settle(3));
    }

    #[test]
    fn debouncer_reset_forgets_observed_revisions() {
        let mut d = SaveDebouncer::new(Duration::from_millis(1_000));
        assert!(!d.poll(5, Instant::now()));
        d.reset();
        assert!(!d.pending());
        // A fresh store starts at revision 0 again; no phantom write due.
        assert!(!d.settle(0));
    }

    /// In-memory storage that records every save call.
    struct RecordingStorage {
        saves: Mutex<Vec<(String, String, Vec<Annotation>)>>,
        preloaded: Vec<Annotation>,
    }

    #[async_trait]
    impl AnnotationStorage for RecordingStorage {
        async fn load(&self, _user: &str, _symbol: &str) -> Result<Vec<Annotation>> {
            Ok(self.preloaded.clone())
        }

        async fn save(
            &self,
            user: &str,
            symbol: &str,
            annotations: &[Annotation],
        ) -> Result<()> {
            self.saves
                .lock()
                .unwrap()
                .push((user.into(), symbol.into(), annotations.to_vec()));
            Ok(())
        }
    }

    fn pump(bridge: &mut PersistenceBridge, store: &mut DrawingStore, for_ms: u64) {
        let mut notices = Vec::new();
        let end = Instant::now() + Duration::from_millis(for_ms);
        while Instant::now() < end {
            bridge.tick(store, &mut notices);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(notices.is_empty(), "unexpected notices: {notices:?}");
    }

    #[test]
    fn rapid_edits_produce_exactly_one_save_with_the_final_state() {
        let storage = Arc::new(RecordingStorage {
            saves: Mutex::new(Vec::new()),
            preloaded: Vec::new(),
        });
        let mut bridge = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_millis(50),
        );
        let mut store = DrawingStore::new("BTCUSDT");
        bridge.begin_symbol("BTCUSDT");

        let keeper = trend();
        let doomed = trend();
        store.add(keeper.clone());
        store.add(doomed.clone());
        store.remove(doomed.id);

        pump(&mut bridge, &mut store, 200);

        let saves = storage.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        let (user, symbol, saved) = &saves[0];
        assert_eq!(user, "local");
        assert_eq!(symbol, "BTCUSDT");
        assert_eq!(saved, &vec![keeper]);
    }

    #[test]
    fn hydration_fills_a_pristine_store_but_never_clobbers_edits() {
        let persisted = vec![trend(), trend()];
        let storage = Arc::new(RecordingStorage {
            saves: Mutex::new(Vec::new()),
            preloaded: persisted.clone(),
        });

        // Pristine store: hydration applies.
        let mut bridge = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_millis(50),
        );
        let mut store = DrawingStore::new("BTCUSDT");
        bridge.begin_symbol("BTCUSDT");
        pump(&mut bridge, &mut store, 100);
        assert_eq!(store.annotations(), persisted.as_slice());

        // Store the user already drew in: the load result is discarded.
        let mut bridge2 = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_millis(5_000), // keep the debouncer quiet
        );
        let mut store2 = DrawingStore::new("BTCUSDT");
        bridge2.begin_symbol("BTCUSDT");
        let mine = trend();
        store2.add(mine.clone());
        pump(&mut bridge2, &mut store2, 100);
        assert_eq!(store2.annotations(), &[mine]);
    }

    #[test]
    fn flush_writes_pending_changes_before_a_symbol_switch() {
        let storage = Arc::new(RecordingStorage {
            saves: Mutex::new(Vec::new()),
            preloaded: Vec::new(),
        });
        let mut bridge = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_secs(60), // debounce would never fire on its own
        );
        let mut store = DrawingStore::new("BTCUSDT");
        bridge.begin_symbol("BTCUSDT");

        store.add(trend());
        let mut notices = Vec::new();
        bridge.tick(&mut store, &mut notices); // arms the debouncer

        bridge.flush(&store);
        thread::sleep(Duration::from_millis(100)); // let the worker drain

        let saves = storage.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].1, "BTCUSDT");

        // Timer is gone: nothing further fires.
        assert!(!bridge.debouncer.pending());
    }

    #[test]
    fn flush_catches_an_edit_the_timer_never_observed() {
        let storage = Arc::new(RecordingStorage {
            saves: Mutex::new(Vec::new()),
            preloaded: Vec::new(),
        });
        let mut bridge = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_millis(20),
        );
        let mut store = DrawingStore::new("BTCUSDT");
        bridge.begin_symbol("BTCUSDT");

        // First edit settles into a save on its own.
        store.add(trend());
        pump(&mut bridge, &mut store, 100);

        // Clear-all right before the switch, with no tick in between.
        store.clear();
        bridge.flush(&store);
        thread::sleep(Duration::from_millis(100)); // let the worker drain

        let saves = storage.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert!(saves[1].2.is_empty(), "the clear-all must be persisted");
    }

    #[test]
    fn flush_with_nothing_unpersisted_writes_nothing() {
        let storage = Arc::new(RecordingStorage {
            saves: Mutex::new(Vec::new()),
            preloaded: Vec::new(),
        });
        let mut bridge = PersistenceBridge::with_quiet_period(
            storage.clone(),
            "local",
            Duration::from_millis(20),
        );
        let mut store = DrawingStore::new("BTCUSDT");
        bridge.begin_symbol("BTCUSDT");

        // Pristine store: flush on an immediate symbol switch is a no-op.
        bridge.flush(&store);

        store.add(trend());
        pump(&mut bridge, &mut store, 100); // debounce fires, one save
        bridge.flush(&store);
        thread::sleep(Duration::from_millis(100));

        assert_eq!(storage.saves.lock().unwrap().len(), 1);
    }
}
