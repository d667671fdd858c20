//! Background autosave driven by the store's change signal

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use planstore::{ChangeStream, Store, WeakStore};
use tokio::task::JoinHandle;

use crate::codec::StateCodec;

/// Saves the store's state after each burst of changes
///
/// The task holds only a weak handle and ends on its own once the store is
/// dropped. Dropping the `Autosave` stops it as well.
pub struct Autosave {
    task: JoinHandle<()>,
    saves: Arc<AtomicU64>,
}

impl Autosave {
    /// Start saving through `codec` once no change arrived for `quiet`
    pub fn spawn<S, A, C>(store: &Store<S, A>, codec: Arc<C>, quiet: Duration) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        A: Send + 'static,
        C: StateCodec<S> + 'static,
    {
        let handle =
            tokio::runtime::Handle::try_current().context("Autosave needs a tokio runtime")?;
        let saves = Arc::new(AtomicU64::new(0));

        log::info!("Autosave started ({:?} quiet period)", quiet);
        let task = handle.spawn(autosave_loop(
            store.downgrade(),
            store.did_change(),
            codec,
            quiet,
            saves.clone(),
        ));

        Ok(Self { task, saves })
    }

    /// Number of successful saves
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn autosave_loop<S, A, C>(
    store: WeakStore<S, A>,
    mut changes: ChangeStream,
    codec: Arc<C>,
    quiet: Duration,
    saves: Arc<AtomicU64>,
) where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    C: StateCodec<S> + 'static,
{
    while changes.changed().await {
        // Wait out the burst
        while let Ok(true) = tokio::time::timeout(quiet, changes.changed()).await {}

        let Some(state) = store.upgrade().map(|store| store.state()) else {
            break;
        };

        let codec = codec.clone();
        match tokio::task::spawn_blocking(move || codec.save(&state)).await {
            Ok(true) => {
                let total = saves.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("Autosave: state saved ({} so far)", total);
            }
            Ok(false) => log::warn!("Autosave: state not saved"),
            Err(e) => log::error!("Autosave: save task failed: {}", e),
        }
    }

    log::debug!("Autosave stopped, store is gone");
}

/// Replace the store's state with the saved one, if any
pub fn restore_into<S, A, C>(store: &Store<S, A>, codec: &C) -> bool
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    C: StateCodec<S> + ?Sized,
{
    match codec.restore() {
        Some(state) => {
            store.replace_state(state);
            log::info!("Restored saved state");
            true
        }
        None => {
            log::debug!("No saved state to restore");
            false
        }
    }
}
