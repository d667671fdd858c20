//! Debounced change notification
//!
//! Every committed state replacement marks the notifier pending and kicks a
//! worker task. The worker waits until no further kick arrives for one
//! debounce window, then publishes a single payload-free notification.
//! Subscribers read the latest state themselves; intermediate states are not
//! guaranteed to be observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// Default debounce window, one frame at 60Hz
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(16);

struct Shared {
    pending: AtomicBool,
    kick: Notify,
    /// Generation counter, bumped once per published notification
    tx: watch::Sender<u64>,
}

impl Shared {
    fn publish(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

/// Single-slot coalescing notifier
pub struct ChangeNotifier {
    shared: Arc<Shared>,
    window: Duration,
    /// Runtime the notifier was created on, used for changes from other threads
    runtime: Option<Handle>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeNotifier {
    /// Create a notifier, remembering the current tokio runtime if there is one
    pub fn new(window: Duration) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                pending: AtomicBool::new(false),
                kick: Notify::new(),
                tx,
            }),
            window,
            runtime: Handle::try_current().ok(),
            worker: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn subscribe(&self) -> ChangeStream {
        ChangeStream {
            rx: self.shared.tx.subscribe(),
        }
    }

    /// Number of notifications published so far
    pub fn published(&self) -> u64 {
        *self.shared.tx.borrow()
    }

    /// Record a state replacement
    ///
    /// Callable from any thread. The debounce worker runs on the caller's
    /// runtime, or on the one the notifier was created on. With a zero window,
    /// or when neither exists, the notification is published right away.
    pub fn mark_changed(&self) {
        if self.window.is_zero() {
            self.shared.publish();
            return;
        }

        let Some(handle) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            log::trace!("No runtime for debounced notification, publishing immediately");
            self.shared.publish();
            return;
        };

        self.shared.pending.store(true, Ordering::Release);
        self.ensure_worker(&handle);
        self.shared.kick.notify_one();
    }

    fn ensure_worker(&self, handle: &Handle) {
        let mut worker = self.worker.lock();
        if worker.as_ref().map_or(true, |w| w.is_finished()) {
            log::trace!("Starting change notifier ({:?} window)", self.window);
            *worker = Some(handle.spawn(debounce_loop(self.shared.clone(), self.window)));
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.abort();
        }
    }
}

async fn debounce_loop(shared: Arc<Shared>, window: Duration) {
    loop {
        shared.kick.notified().await;

        // Trailing edge: each kick inside the window restarts it
        loop {
            tokio::select! {
                _ = tokio::time::sleep(window) => break,
                _ = shared.kick.notified() => continue,
            }
        }

        if shared.pending.swap(false, Ordering::AcqRel) {
            shared.publish();
        }
    }
}

/// Subscription to the debounced "state changed" signal
///
/// Carries no payload; read the store's state after each notification.
#[derive(Clone)]
pub struct ChangeStream {
    rx: watch::Receiver<u64>,
}

impl ChangeStream {
    /// Wait for the next notification
    ///
    /// Returns `false` once the store has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Whether a notification arrived that hasn't been waited for yet
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Forget any notification received so far
    pub fn mark_seen(&mut self) {
        self.rx.borrow_and_update();
    }
}
