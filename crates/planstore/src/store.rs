use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use planstore_config::StoreConfig;

use crate::action::{Action, Plan, PlanBody, PlanContext, PublishingPlan};
use crate::completion::Completion;
use crate::error::DispatchError;
use crate::middleware::{BoxedMiddleware, Dispatcher, Middleware, Next};
use crate::notify::{ChangeNotifier, ChangeStream, DEFAULT_DEBOUNCE};
use crate::proxy::{Rewrite, StoreProxy};
use crate::reducer::{BoxedReducer, Reducer};

/// Store - holds application state and runs the dispatch loop
///
/// - State is owned by the store and replaced, never mutated in place
/// - Plain actions run through the middleware chain, then the reducer
/// - Plans run with dispatch and state-read capabilities bound to this store
/// - Every committed replacement schedules one debounced change notification
///
/// `Store` is a cheap handle; clones share the same state. Dispatches are
/// serialized, so `send` can be called from any thread or task. Calling back
/// into the store from inside a reducer or middleware would deadlock; queue a
/// follow-up through the middleware [`Dispatcher`] instead.
///
/// Middleware post phases run before the new state is committed: the commit
/// only happens once the whole chain has returned `Ok`, so an error raised
/// on the way back out still leaves the state untouched. Middleware sees the
/// new state through [`Reduced::state`](crate::middleware::Reduced::state).
///
/// ```ignore
/// let store = Store::builder(AppState::default(), reduce)
///     .middleware(LoggingMiddleware::new())
///     .build();
///
/// store.dispatch(AppAction::SetName("A".into()))?;
/// store.send(Action::plan_async(|ctx| async move {
///     let user = fetch_user().await?;
///     ctx.dispatch(AppAction::SetName(user.name))?;
///     Ok(())
/// })).await?;
/// ```
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

struct StoreInner<S, A> {
    state: RwLock<S>,
    /// Held for the whole read-reduce-commit cycle of a plain action
    pipeline: Mutex<Pipeline<S, A>>,
    notifier: ChangeNotifier,
}

struct Pipeline<S, A> {
    reducer: BoxedReducer<S, A>,
    middleware: Vec<BoxedMiddleware<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    /// Create a store without middleware and with the default debounce window
    pub fn new<R>(initial_state: S, reducer: R) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self::builder(initial_state, reducer).build()
    }

    pub fn builder<R>(initial_state: S, reducer: R) -> StoreBuilder<S, A>
    where
        R: Reducer<S, A> + 'static,
    {
        StoreBuilder {
            state: initial_state,
            reducer: Box::new(reducer),
            middleware: Vec::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Send any kind of action
    ///
    /// Plain actions and synchronous plans have run by the time this returns;
    /// asynchronous plans and publishing plans are spawned on the current
    /// tokio runtime.
    pub fn send(&self, action: Action<S, A>) -> Completion {
        log::trace!("Store: send {}", action.kind());
        match action {
            Action::Plain(action) => Completion::ready(self.dispatch(action)),
            Action::Plan(plan) => self.run_plan(plan),
            Action::Publishing(plan) => self.run_publishing(plan),
        }
    }

    /// Reduce a plain action through the middleware chain
    ///
    /// On error the state is left unchanged and follow-ups queued by
    /// middleware for this action are discarded. Once the action has
    /// committed, follow-up failures are logged but not returned.
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        let dispatcher = Dispatcher::new();
        let follow_ups = {
            let mut pipeline = self.inner.pipeline.lock();
            let Pipeline {
                reducer,
                middleware,
            } = &mut *pipeline;

            let current = self.inner.state.read().clone();
            let result = Next::new(
                middleware,
                &**reducer,
                &current,
                &dispatcher,
            )
            .run(&action);
            let follow_ups = dispatcher.drain();

            match result {
                Ok(reduced) => {
                    if let Some(next) = reduced.into_state() {
                        *self.inner.state.write() = next;
                        self.inner.notifier.mark_changed();
                    }
                    follow_ups
                }
                Err(e) => {
                    if !follow_ups.is_empty() {
                        log::warn!(
                            "Discarding {} follow-up action(s) of aborted dispatch",
                            follow_ups.len()
                        );
                    }
                    return Err(e);
                }
            }
        };

        self.send_follow_ups(follow_ups);
        Ok(())
    }

    /// Snapshot of the latest committed state
    pub fn state(&self) -> S {
        self.inner.state.read().clone()
    }

    /// Read the committed state without cloning it
    ///
    /// `f` runs under the state read lock: dispatching from inside it blocks
    /// forever. Use [`Store::state`] when the closure needs to dispatch.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Replace the whole state, e.g. after restoring a saved snapshot
    ///
    /// Bypasses middleware and reducer but still notifies subscribers.
    pub fn replace_state(&self, state: S) {
        let _pipeline = self.inner.pipeline.lock();
        *self.inner.state.write() = state;
        self.inner.notifier.mark_changed();
    }

    /// Subscribe to the debounced change signal
    pub fn did_change(&self) -> ChangeStream {
        self.inner.notifier.subscribe()
    }

    pub fn debounce(&self) -> Duration {
        self.inner.notifier.window()
    }

    /// Non-owning handle, for tasks that must not keep the store alive
    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Scoped dispatcher that rewrites or drops actions before forwarding
    pub fn proxy<F>(&self, modifier: F) -> StoreProxy<S, A>
    where
        F: Fn(&Action<S, A>) -> Rewrite<S, A> + Send + Sync + 'static,
    {
        StoreProxy::new(Arc::new(self.clone()), Some(Arc::new(modifier)))
    }

    /// Scoped dispatcher that forwards everything unchanged
    pub fn proxy_passthrough(&self) -> StoreProxy<S, A> {
        StoreProxy::new(Arc::new(self.clone()), None)
    }

    fn run_plan(&self, plan: Plan<S, A>) -> Completion {
        let ctx = PlanContext::new(self.clone());
        match plan.body {
            PlanBody::Sync(body) => Completion::ready(body(&ctx).map_err(DispatchError::Plan)),
            PlanBody::Async(body) => {
                self.spawn(async move { body(ctx).await.map_err(DispatchError::Plan) })
            }
        }
    }

    fn run_publishing(&self, plan: PublishingPlan<S, A>) -> Completion {
        let store = self.clone();
        self.spawn(async move {
            let mut actions = (plan.body)(PlanContext::new(store.clone()));
            let mut emitted = 0usize;

            while let Some(item) = actions.next().await {
                match item.map_err(DispatchError::Publishing)? {
                    Some(action) => {
                        emitted += 1;
                        store.send(action).await?;
                    }
                    None => log::trace!("Publishing plan emitted an empty item, skipping"),
                }
            }

            log::debug!("Publishing plan finished after {} action(s)", emitted);
            Ok::<(), DispatchError>(())
        })
    }

    fn spawn<F>(&self, run: F) -> Completion
    where
        F: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Completion::spawned(handle.spawn(run)),
            Err(_) => {
                log::error!("Store: asynchronous plan sent outside of a tokio runtime");
                Completion::ready(Err(DispatchError::NoRuntime))
            }
        }
    }

    /// Send actions queued by middleware, in the order they were queued
    ///
    /// Every follow-up is sent even if an earlier one fails. Failures belong
    /// to the follow-up, not to the committed action, so they are only
    /// logged. Spawned runs are detached.
    fn send_follow_ups(&self, actions: Vec<Action<S, A>>) {
        for action in actions {
            let mut completion = self.send(action);
            if let Some(Err(e)) = completion.take_ready() {
                log::error!("Follow-up action failed: {}", e);
            }
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.read())
            .field("debounce", &self.inner.notifier.window())
            .finish()
    }
}

/// Weak counterpart of [`Store`]
pub struct WeakStore<S, A> {
    inner: Weak<StoreInner<S, A>>,
}

impl<S, A> WeakStore<S, A> {
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Builder for [`Store`]
pub struct StoreBuilder<S, A> {
    state: S,
    reducer: BoxedReducer<S, A>,
    middleware: Vec<BoxedMiddleware<S, A>>,
    debounce: Duration,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    /// Add middleware; middleware runs in the order it was added
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S, A> + 'static,
    {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn boxed_middleware(mut self, middleware: BoxedMiddleware<S, A>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Debounce window of the change notification
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Apply settings from a loaded config
    pub fn config(self, config: &StoreConfig) -> Self {
        self.debounce(config.debounce())
    }

    pub fn build(self) -> Store<S, A> {
        log::debug!(
            "Building store with {} middleware, {:?} debounce",
            self.middleware.len(),
            self.debounce
        );
        Store {
            inner: Arc::new(StoreInner {
                state: RwLock::new(self.state),
                pipeline: Mutex::new(Pipeline {
                    reducer: self.reducer,
                    middleware: self.middleware,
                }),
                notifier: ChangeNotifier::new(self.debounce),
            }),
        }
    }
}
