//! Action model
//!
//! An [`Action`] is one of three kinds:
//! - `Plain`: data only, consumed by the reducer
//! - `Plan`: a procedure given dispatch and state-read capabilities
//! - `Publishing`: a procedure producing a stream of further actions
//!
//! Plans never reach a reducer. They run once per `send`, and everything
//! they dispatch goes back through the same store.

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::completion::Completion;
use crate::error::DispatchError;
use crate::store::Store;

/// Stream of follow-up actions produced by a publishing plan.
///
/// `Ok(None)` items are skipped, an `Err` item terminates the run.
pub type ActionStream<S, A> = BoxStream<'static, anyhow::Result<Option<Action<S, A>>>>;

type SyncBody<S, A> = Box<dyn FnOnce(&PlanContext<S, A>) -> anyhow::Result<()> + Send>;
type AsyncBody<S, A> =
    Box<dyn FnOnce(PlanContext<S, A>) -> BoxFuture<'static, anyhow::Result<()>> + Send>;
type PublishingBody<S, A> = Box<dyn FnOnce(PlanContext<S, A>) -> ActionStream<S, A> + Send>;

/// A message sent to the store
pub enum Action<S, A> {
    /// Data consumed directly by the reducer
    Plain(A),
    /// Procedure run with dispatch + state capabilities
    Plan(Plan<S, A>),
    /// Procedure producing further actions over time
    Publishing(PublishingPlan<S, A>),
}

/// Procedure wrapped by [`Action::Plan`]
pub struct Plan<S, A> {
    pub(crate) body: PlanBody<S, A>,
}

pub(crate) enum PlanBody<S, A> {
    /// Runs inside `send`, before it returns
    Sync(SyncBody<S, A>),
    /// Spawned on the tokio runtime
    Async(AsyncBody<S, A>),
}

/// Procedure wrapped by [`Action::Publishing`]
pub struct PublishingPlan<S, A> {
    pub(crate) body: PublishingBody<S, A>,
}

impl<S, A> Action<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn plain(action: A) -> Self {
        Self::Plain(action)
    }

    /// Synchronous plan, executed before `send` returns
    ///
    /// ```ignore
    /// store.send(Action::plan(|ctx| {
    ///     ctx.dispatch(ProfileAction::SetName("B".into()))?;
    ///     let name = ctx.state().name + "C";
    ///     ctx.dispatch(ProfileAction::SetName(name))?;
    ///     Ok(())
    /// }));
    /// ```
    pub fn plan<F>(body: F) -> Self
    where
        F: FnOnce(&PlanContext<S, A>) -> anyhow::Result<()> + Send + 'static,
    {
        Self::Plan(Plan {
            body: PlanBody::Sync(Box::new(body)),
        })
    }

    /// Asynchronous plan, spawned on the current tokio runtime
    pub fn plan_async<F, Fut>(body: F) -> Self
    where
        F: FnOnce(PlanContext<S, A>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Plan(Plan {
            body: PlanBody::Async(Box::new(move |ctx| body(ctx).boxed())),
        })
    }

    /// Publishing plan whose stream cannot fail
    ///
    /// `None` items are skipped without dispatching anything.
    pub fn publishing<F, St>(body: F) -> Self
    where
        F: FnOnce(PlanContext<S, A>) -> St + Send + 'static,
        St: Stream<Item = Option<Action<S, A>>> + Send + 'static,
    {
        Self::Publishing(PublishingPlan {
            body: Box::new(move |ctx| body(ctx).map(Ok).boxed()),
        })
    }

    /// Publishing plan whose stream may terminate with an error
    pub fn try_publishing<F, St>(body: F) -> Self
    where
        F: FnOnce(PlanContext<S, A>) -> St + Send + 'static,
        St: Stream<Item = anyhow::Result<Option<Action<S, A>>>> + Send + 'static,
    {
        Self::Publishing(PublishingPlan {
            body: Box::new(move |ctx| body(ctx).boxed()),
        })
    }
}

impl<S, A> Action<S, A> {
    /// Short label of the action kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Plan(plan) => match plan.body {
                PlanBody::Sync(_) => "plan",
                PlanBody::Async(_) => "async-plan",
            },
            Self::Publishing(_) => "publishing-plan",
        }
    }

    pub fn as_plain(&self) -> Option<&A> {
        match self {
            Self::Plain(action) => Some(action),
            _ => None,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }
}

impl<S, A: fmt::Debug> fmt::Debug for Action<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(action) => f.debug_tuple("Plain").field(action).finish(),
            other => write!(f, "Action::<{}>", other.kind()),
        }
    }
}

/// Capabilities handed to a plan body
///
/// `state()` reads the store at call time, so a plan always observes the
/// effect of its own earlier dispatches. The store keeps no reference to the
/// plan once it has been started.
pub struct PlanContext<S, A> {
    store: Store<S, A>,
}

impl<S, A> Clone for PlanContext<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S, A> PlanContext<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    pub(crate) fn new(store: Store<S, A>) -> Self {
        Self { store }
    }

    /// Reduce a plain action right away
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        self.store.dispatch(action)
    }

    /// Send any kind of action, including further plans
    pub fn send(&self, action: Action<S, A>) -> Completion {
        self.store.send(action)
    }

    /// Snapshot of the latest committed state
    pub fn state(&self) -> S {
        self.store.state()
    }

    /// Run `f` on a snapshot; `f` may dispatch
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.state())
    }
}
