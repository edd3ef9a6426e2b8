//! Delayed single-fire scheduler.
//!
//! Every `ScheduleKey` gets its own actor: a tokio task that owns the key's
//! pending timer and processes its mailbox one message at a time. Arming is
//! therefore a plain check-then-insert inside the actor, with no lock held
//! across keys.
//!
//! Per key:
//! ```text
//! IDLE  --arm-->           ARMED
//! ARMED --arm-->           ARMED   (rejected, nothing changes)
//! ARMED --expiry|cancel--> IDLE
//! ```
//!
//! The actor sleeps until the deadline inside its own event loop. On expiry
//! it invokes the deferred target once, logs the result and deletes the
//! persisted timer whatever the outcome. If that delete fails the actor keeps
//! retrying it and stays alive until it succeeds, so a respawned actor never
//! reloads a timer that already fired. Idle actors retire after
//! `scheduler.idle_secs` and are respawned on demand; a freshly spawned actor
//! reloads its key's timer from the store, which is also how timers survive
//! a restart (see [`DelayedActionScheduler::recover`]).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use portier_core::config::{DelayConfig, SchedulerConfig};
use portier_core::{ArmOutcome, PendingTimer, PortierError, Result, ScheduleKey, Target, TimerStore};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::invoker::ActionInvoker;

/// A message racing a retiring actor is re-sent to a fresh one at most this
/// many times.
const MAX_DELIVERY_ATTEMPTS: usize = 3;

/// Retry interval for deleting the record of a timer that already fired.
const CLEAR_RETRY: Duration = Duration::from_secs(5);

/// Stand-in deadline when `now + delay` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 86_400);

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

enum Command {
    Arm {
        delay_secs: u64,
        reply: oneshot::Sender<Result<ArmOutcome>>,
    },
    Cancel {
        reply: oneshot::Sender<Result<bool>>,
    },
}

struct ActorHandle {
    id: u64,
    tx: mpsc::Sender<Command>,
}

struct Inner {
    store: Arc<dyn TimerStore>,
    invoker: Arc<dyn ActionInvoker>,
    delay: DelayConfig,
    settings: SchedulerConfig,
    deferred: Target,
    actors: Mutex<HashMap<ScheduleKey, ActorHandle>>,
    next_id: AtomicU64,
}

// ---------------------------------------------------------------------------
// DelayedActionScheduler
// ---------------------------------------------------------------------------

/// Cheap to clone; all clones share the same actors and store.
#[derive(Clone)]
pub struct DelayedActionScheduler {
    inner: Arc<Inner>,
}

impl DelayedActionScheduler {
    /// `deferred` is the target unlocked when a timer expires.
    pub fn new(
        store: Arc<dyn TimerStore>,
        invoker: Arc<dyn ActionInvoker>,
        delay: DelayConfig,
        settings: SchedulerConfig,
        deferred: Target,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                invoker,
                delay,
                settings,
                deferred,
                actors: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Arm a single-fire timer for `key`.
    ///
    /// `None` or `Some(0)` uses the default delay. Returns `Rejected` without
    /// touching anything when the key already has a pending timer.
    pub async fn arm(&self, key: &ScheduleKey, delay_secs: Option<u64>) -> Result<ArmOutcome> {
        let delay_secs = self.inner.delay.effective(delay_secs)?;
        self.request(key, |reply| Command::Arm { delay_secs, reply })
            .await
    }

    /// Drop the pending timer for `key`. Returns whether one existed.
    pub async fn cancel(&self, key: &ScheduleKey) -> Result<bool> {
        self.request(key, |reply| Command::Cancel { reply }).await
    }

    pub fn status(&self, key: &ScheduleKey) -> Result<Option<PendingTimer>> {
        self.inner.store.get(key)
    }

    pub fn pending(&self) -> Result<Vec<PendingTimer>> {
        self.inner.store.list()
    }

    /// Start an actor for every persisted timer so each fires at its stored
    /// deadline, or immediately if the deadline passed while we were down.
    pub fn recover(&self) -> Result<usize> {
        let timers = self.inner.store.list()?;
        for timer in &timers {
            self.actor_for(&timer.key)?;
        }
        if !timers.is_empty() {
            tracing::info!(count = timers.len(), "recovered pending timers");
        }
        Ok(timers.len())
    }

    async fn request<T>(
        &self,
        key: &ScheduleKey,
        make: impl Fn(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        for _ in 0..MAX_DELIVERY_ATTEMPTS {
            let (id, tx) = self.actor_for(key)?;
            let (reply_tx, reply_rx) = oneshot::channel();
            if tx.send(make(reply_tx)).await.is_err() {
                self.forget(key, id);
                continue;
            }
            match reply_rx.await {
                Ok(result) => return result,
                Err(_) => self.forget(key, id),
            }
        }
        Err(PortierError::SchedulerUnavailable(key.to_string()))
    }

    fn actor_for(&self, key: &ScheduleKey) -> Result<(u64, mpsc::Sender<Command>)> {
        let mut actors = self.lock_actors()?;
        if let Some(handle) = actors.get(key).filter(|h| !h.tx.is_closed()) {
            return Ok((handle.id, handle.tx.clone()));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.settings.mailbox.max(1));
        actors.insert(
            key.clone(),
            ActorHandle {
                id,
                tx: tx.clone(),
            },
        );
        drop(actors);

        let actor = KeyActor::start(id, key.clone(), Arc::clone(&self.inner));
        tokio::spawn(actor.run(rx));
        Ok((id, tx))
    }

    fn forget(&self, key: &ScheduleKey, id: u64) {
        if let Ok(mut actors) = self.lock_actors() {
            if actors.get(key).is_some_and(|h| h.id == id) {
                actors.remove(key);
            }
        }
    }

    fn lock_actors(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ScheduleKey, ActorHandle>>> {
        self.inner
            .actors
            .lock()
            .map_err(|_| PortierError::SchedulerUnavailable("actor registry poisoned".to_string()))
    }

    #[cfg(test)]
    fn live_actors(&self) -> usize {
        self.lock_actors().map(|a| a.len()).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// KeyActor
// ---------------------------------------------------------------------------

struct Armed {
    timer: PendingTimer,
    deadline: Instant,
}

impl Armed {
    fn from_stored(timer: PendingTimer) -> Self {
        let remaining = Duration::from_millis(timer.remaining_ms(Utc::now()));
        Self {
            deadline: deadline_after(remaining),
            timer,
        }
    }
}

struct KeyActor {
    id: u64,
    key: ScheduleKey,
    inner: Arc<Inner>,
    armed: Option<Armed>,
    /// Deadline of a fired timer whose record could not be deleted yet.
    uncleared: Option<i64>,
}

impl KeyActor {
    fn start(id: u64, key: ScheduleKey, inner: Arc<Inner>) -> Self {
        let armed = match inner.store.get(&key) {
            Ok(found) => found.map(Armed::from_stored),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "could not load pending timer");
                None
            }
        };
        Self {
            id,
            key,
            inner,
            armed,
            uncleared: None,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        let idle = Duration::from_secs(self.inner.settings.idle_secs);
        loop {
            let next = match self.armed.as_ref().map(|a| a.deadline) {
                Some(deadline) => tokio::select! {
                    cmd = rx.recv() => cmd,
                    () = tokio::time::sleep_until(deadline) => {
                        self.on_expiry().await;
                        continue;
                    }
                },
                None if self.uncleared.is_some() => {
                    match tokio::time::timeout(CLEAR_RETRY, rx.recv()).await {
                        Ok(cmd) => cmd,
                        Err(_) => {
                            self.clear_fired();
                            continue;
                        }
                    }
                }
                None => match tokio::time::timeout(idle, rx.recv()).await {
                    Ok(cmd) => cmd,
                    Err(_) if self.retire(&rx) => break,
                    Err(_) => continue,
                },
            };

            match next {
                Some(cmd) => self.handle(cmd),
                None => {
                    // Unregistered while still armed: fire before leaving.
                    if let Some(deadline) = self.armed.as_ref().map(|a| a.deadline) {
                        tokio::time::sleep_until(deadline).await;
                        self.on_expiry().await;
                    }
                    break;
                }
            }
        }
        tracing::debug!(key = %self.key, "scheduler actor stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Arm { delay_secs, reply } => {
                let _ = reply.send(self.arm(delay_secs));
            }
            Command::Cancel { reply } => {
                let _ = reply.send(self.cancel());
            }
        }
    }

    fn arm(&mut self, delay_secs: u64) -> Result<ArmOutcome> {
        if let Some(armed) = &self.armed {
            tracing::warn!(key = %self.key, "timer already set");
            return Ok(ArmOutcome::Rejected {
                fire_at_ms: armed.timer.fire_at_ms,
            });
        }

        let timer = PendingTimer::new(self.key.clone(), self.inner.deferred, Utc::now(), delay_secs);
        match self.persist(&timer)? {
            None => {
                let fire_at_ms = timer.fire_at_ms;
                self.armed = Some(Armed {
                    deadline: deadline_after(Duration::from_secs(delay_secs)),
                    timer,
                });
                tracing::info!(key = %self.key, delay_secs, "timer set");
                Ok(ArmOutcome::Accepted {
                    delay_secs,
                    fire_at_ms,
                })
            }
            Some(existing) => {
                tracing::warn!(key = %self.key, "timer already set in store");
                let fire_at_ms = existing.fire_at_ms;
                self.armed = Some(Armed::from_stored(existing));
                Ok(ArmOutcome::Rejected { fire_at_ms })
            }
        }
    }

    /// Store `timer`, replacing a leftover record of the timer we last fired.
    fn persist(&mut self, timer: &PendingTimer) -> Result<Option<PendingTimer>> {
        match self.inner.store.insert_if_absent(timer)? {
            Some(stale) if self.uncleared == Some(stale.fire_at_ms) => {
                self.inner.store.remove(&self.key)?;
                self.uncleared = None;
                self.inner.store.insert_if_absent(timer)
            }
            other => Ok(other),
        }
    }

    /// Retry deleting the record of the timer we already fired.
    fn clear_fired(&mut self) {
        let Some(fired_at) = self.uncleared else {
            return;
        };
        let outcome = match self.inner.store.get(&self.key) {
            Ok(Some(stored)) if stored.fire_at_ms == fired_at => {
                self.inner.store.remove(&self.key).map(|_| ())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                tracing::info!(key = %self.key, "cleared fired timer");
                self.uncleared = None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "still cannot clear fired timer");
            }
        }
    }

    fn cancel(&mut self) -> Result<bool> {
        let removed = self.inner.store.remove(&self.key)?;
        self.uncleared = None;
        let was_armed = self.armed.take().is_some();
        if was_armed || removed {
            tracing::info!(key = %self.key, "timer cancelled");
        }
        Ok(was_armed || removed)
    }

    async fn on_expiry(&mut self) {
        let Some(armed) = self.armed.take() else {
            return;
        };
        let timer = armed.timer;

        let result = self.inner.invoker.invoke(timer.target).await;
        if result.success {
            tracing::info!(key = %self.key, door = %timer.target, "delayed unlock fired");
        } else {
            tracing::warn!(
                key = %self.key,
                door = %timer.target,
                message = %result.message,
                "delayed unlock failed"
            );
        }

        if let Err(e) = self.inner.store.remove(&self.key) {
            tracing::error!(key = %self.key, error = %e, "could not clear fired timer");
            self.uncleared = Some(timer.fire_at_ms);
        }
    }

    /// Leave the registry if nothing is queued. Returns true when the actor
    /// should stop.
    fn retire(&self, rx: &mpsc::Receiver<Command>) -> bool {
        if self.uncleared.is_some() {
            return false;
        }
        let Ok(mut actors) = self.inner.actors.lock() else {
            return false;
        };
        if !rx.is_empty() {
            return false;
        }
        match actors.get(&self.key) {
            Some(handle) if handle.id == self.id => {
                actors.remove(&self.key);
                true
            }
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portier_core::{ActionResult, MemoryTimerStore};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingInvoker {
        street: AtomicUsize,
        floor: AtomicUsize,
        fail: bool,
    }

    impl CountingInvoker {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn floor_calls(&self) -> usize {
            self.floor.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActionInvoker for CountingInvoker {
        async fn invoke(&self, target: Target) -> ActionResult {
            match target {
                Target::Street => self.street.fetch_add(1, Ordering::SeqCst),
                Target::Floor => self.floor.fetch_add(1, Ordering::SeqCst),
            };
            if self.fail {
                ActionResult::failed(target, "lock api returned 500")
            } else {
                ActionResult::ok(target, "unlocked")
            }
        }
    }

    /// Memory store whose first `remove` calls fail.
    struct FlakyRemoveStore {
        inner: MemoryTimerStore,
        failures_left: AtomicUsize,
    }

    impl FlakyRemoveStore {
        fn failing(times: usize) -> Self {
            Self {
                inner: MemoryTimerStore::new(),
                failures_left: AtomicUsize::new(times),
            }
        }
    }

    impl TimerStore for FlakyRemoveStore {
        fn get(&self, key: &ScheduleKey) -> Result<Option<PendingTimer>> {
            self.inner.get(key)
        }

        fn insert_if_absent(&self, timer: &PendingTimer) -> Result<Option<PendingTimer>> {
            self.inner.insert_if_absent(timer)
        }

        fn remove(&self, key: &ScheduleKey) -> Result<bool> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(PortierError::TimerStore("disk full".to_string()));
            }
            self.inner.remove(key)
        }

        fn list(&self) -> Result<Vec<PendingTimer>> {
            self.inner.list()
        }
    }

    fn scheduler_with(
        store: Arc<dyn TimerStore>,
        invoker: Arc<CountingInvoker>,
    ) -> DelayedActionScheduler {
        DelayedActionScheduler::new(
            store,
            invoker,
            DelayConfig::default(),
            SchedulerConfig::default(),
            Target::Floor,
        )
    }

    fn setup() -> (DelayedActionScheduler, Arc<CountingInvoker>, Arc<MemoryTimerStore>) {
        let invoker = Arc::new(CountingInvoker::default());
        let store = Arc::new(MemoryTimerStore::new());
        (scheduler_with(store.clone(), invoker.clone()), invoker, store)
    }

    fn key(path: &str) -> ScheduleKey {
        ScheduleKey::from_path(path).unwrap()
    }

    async fn secs(n: u64) {
        tokio::time::sleep(Duration::from_secs(n)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn second_arm_is_rejected_until_first_fires() {
        let (scheduler, invoker, _store) = setup();
        let k = key("/");

        let first = scheduler.arm(&k, None).await.unwrap();
        assert!(matches!(first, ArmOutcome::Accepted { delay_secs: 50, .. }));

        let second = scheduler.arm(&k, Some(5)).await.unwrap();
        let ArmOutcome::Rejected { fire_at_ms } = second else {
            panic!("expected Rejected, got {second:?}");
        };
        let ArmOutcome::Accepted { fire_at_ms: first_at, .. } = first else {
            unreachable!()
        };
        assert_eq!(fire_at_ms, first_at, "rejected arm must not move the deadline");

        secs(51).await;
        assert_eq!(invoker.floor_calls(), 1);

        let third = scheduler.arm(&k, Some(10)).await.unwrap();
        assert!(matches!(third, ArmOutcome::Accepted { delay_secs: 10, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn never_fires_before_deadline() {
        let (scheduler, invoker, store) = setup();
        let k = key("/");
        scheduler.arm(&k, Some(30)).await.unwrap();

        secs(29).await;
        assert_eq!(invoker.floor_calls(), 0);
        assert!(store.get(&k).unwrap().is_some());

        secs(2).await;
        assert_eq!(invoker.floor_calls(), 1);
        assert!(store.get(&k).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once() {
        let (scheduler, invoker, _store) = setup();
        let k = key("/");
        scheduler.arm(&k, Some(5)).await.unwrap();

        secs(60).await;
        assert_eq!(invoker.floor_calls(), 1);
        assert_eq!(invoker.street.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fire_still_clears_state() {
        let invoker = Arc::new(CountingInvoker::failing());
        let store = Arc::new(MemoryTimerStore::new());
        let scheduler = scheduler_with(store.clone(), invoker.clone());
        let k = key("/");

        scheduler.arm(&k, Some(5)).await.unwrap();
        secs(6).await;

        assert_eq!(invoker.floor_calls(), 1);
        assert!(store.list().unwrap().is_empty());
        assert!(scheduler.arm(&k, Some(5)).await.unwrap().is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_do_not_interfere() {
        let (scheduler, invoker, _store) = setup();

        assert!(scheduler.arm(&key("/"), Some(10)).await.unwrap().is_accepted());
        assert!(scheduler.arm(&key("/office"), Some(20)).await.unwrap().is_accepted());
        assert_eq!(scheduler.pending().unwrap().len(), 2);

        secs(11).await;
        assert_eq!(invoker.floor_calls(), 1);
        assert!(scheduler.status(&key("/office")).unwrap().is_some());

        secs(10).await;
        assert_eq!(invoker.floor_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_arms_for_one_key_accept_exactly_one() {
        let (scheduler, invoker, store) = setup();
        let k = key("/");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let scheduler = scheduler.clone();
            let k = k.clone();
            handles.push(tokio::spawn(async move { scheduler.arm(&k, None).await }));
        }
        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_accepted() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(store.list().unwrap().len(), 1);

        secs(51).await;
        assert_eq!(invoker.floor_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_removes_timer_and_is_noop_when_idle() {
        let (scheduler, invoker, store) = setup();
        let k = key("/");

        assert!(!scheduler.cancel(&k).await.unwrap());
        scheduler.arm(&k, Some(5)).await.unwrap();
        assert!(scheduler.cancel(&k).await.unwrap());
        assert!(store.get(&k).unwrap().is_none());

        secs(10).await;
        assert_eq!(invoker.floor_calls(), 0);
        assert!(scheduler.arm(&k, Some(5)).await.unwrap().is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_above_max_is_rejected_before_arming() {
        let (scheduler, _invoker, store) = setup();
        let err = scheduler.arm(&key("/"), Some(99_999)).await.unwrap_err();
        assert!(matches!(err, PortierError::DelayTooLong { .. }));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recover_fires_persisted_timers() {
        let invoker = Arc::new(CountingInvoker::default());
        let store = Arc::new(MemoryTimerStore::new());
        let overdue = PendingTimer::new(
            key("/"),
            Target::Floor,
            Utc::now() - chrono::Duration::seconds(120),
            50,
        );
        store.insert_if_absent(&overdue).unwrap();

        let scheduler = scheduler_with(store.clone(), invoker.clone());
        assert_eq!(scheduler.recover().unwrap(), 1);

        secs(1).await;
        assert_eq!(invoker.floor_calls(), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recovered_timer_rejects_new_arm() {
        let (_, invoker, store) = setup();
        let pending = PendingTimer::new(key("/"), Target::Floor, Utc::now(), 50);
        store.insert_if_absent(&pending).unwrap();

        let scheduler = scheduler_with(store.clone(), invoker.clone());
        let outcome = scheduler.arm(&key("/"), Some(5)).await.unwrap();
        assert_eq!(
            outcome,
            ArmOutcome::Rejected {
                fire_at_ms: pending.fire_at_ms
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn idle_actor_retires_and_respawns() {
        let (scheduler, _invoker, _store) = setup();
        let k = key("/");

        assert!(!scheduler.cancel(&k).await.unwrap());
        assert_eq!(scheduler.live_actors(), 1);

        secs(SchedulerConfig::default().idle_secs + 1).await;
        assert_eq!(scheduler.live_actors(), 0);

        assert!(scheduler.arm(&k, Some(5)).await.unwrap().is_accepted());
        assert_eq!(scheduler.live_actors(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delete_after_fire_never_fires_twice() {
        let invoker = Arc::new(CountingInvoker::default());
        let store = Arc::new(FlakyRemoveStore::failing(1));
        let scheduler = scheduler_with(store.clone(), invoker.clone());
        let k = key("/");

        scheduler.arm(&k, Some(5)).await.unwrap();
        secs(6).await;
        assert_eq!(invoker.floor_calls(), 1);
        assert!(store.get(&k).unwrap().is_some(), "first delete failed");

        secs(SchedulerConfig::default().idle_secs + 20).await;
        assert!(store.get(&k).unwrap().is_none(), "delete was retried");
        assert_eq!(scheduler.live_actors(), 0);

        assert!(scheduler.arm(&k, Some(5)).await.unwrap().is_accepted());
        assert_eq!(invoker.floor_calls(), 1);

        secs(6).await;
        assert_eq!(invoker.floor_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn actor_stays_alive_while_delete_keeps_failing() {
        let invoker = Arc::new(CountingInvoker::default());
        let store = Arc::new(FlakyRemoveStore::failing(usize::MAX));
        let scheduler = scheduler_with(store.clone(), invoker.clone());
        let k = key("/");

        scheduler.arm(&k, Some(5)).await.unwrap();
        secs(SchedulerConfig::default().idle_secs * 2).await;

        assert_eq!(invoker.floor_calls(), 1);
        assert_eq!(scheduler.live_actors(), 1);
        // Same actor: the leftover record is recognised, not re-fired.
        assert!(scheduler.arm(&k, Some(5)).await.is_err());
        assert_eq!(invoker.floor_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_delay_does_not_overflow_deadline() {
        let invoker = Arc::new(CountingInvoker::default());
        let store = Arc::new(MemoryTimerStore::new());
        let scheduler = DelayedActionScheduler::new(
            store,
            invoker.clone(),
            DelayConfig {
                default_secs: 50,
                max_secs: u64::MAX,
            },
            SchedulerConfig::default(),
            Target::Floor,
        );

        let outcome = scheduler.arm(&key("/"), Some(u64::MAX / 2)).await.unwrap();
        assert!(outcome.is_accepted());
        secs(60).await;
        assert_eq!(invoker.floor_calls(), 0);
    }
}
