//! Completion signal returned by `send`

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::{AbortHandle, JoinHandle};

use crate::error::DispatchError;

/// Resolves when the synchronous part of a dispatch is done
///
/// - plain action / synchronous plan: already resolved when `send` returns
/// - asynchronous plan: resolves when the plan body's future completes
/// - publishing plan: resolves when the action stream ends
///
/// Dropping a completion detaches the run; it keeps going. Use
/// [`Completion::cancel`] or a [`Subscription`] to tear it down.
#[must_use = "dropping a Completion detaches the run and discards its result"]
pub struct Completion {
    signal: Signal,
}

enum Signal {
    Ready(Option<Result<(), DispatchError>>),
    Task(JoinHandle<Result<(), DispatchError>>),
}

impl Completion {
    pub(crate) fn ready(result: Result<(), DispatchError>) -> Self {
        Self {
            signal: Signal::Ready(Some(result)),
        }
    }

    pub(crate) fn spawned(handle: JoinHandle<Result<(), DispatchError>>) -> Self {
        Self {
            signal: Signal::Task(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.signal {
            Signal::Ready(_) => true,
            Signal::Task(handle) => handle.is_finished(),
        }
    }

    /// Handle to tear down a spawned run, `None` for runs that already finished inline
    pub fn subscription(&self) -> Option<Subscription> {
        match &self.signal {
            Signal::Ready(_) => None,
            Signal::Task(handle) => Some(Subscription {
                abort: handle.abort_handle(),
            }),
        }
    }

    /// Tear down a spawned run; awaiting afterwards yields `Cancelled`
    pub fn cancel(&self) {
        if let Signal::Task(handle) = &self.signal {
            handle.abort();
        }
    }

    /// Result of an inline run, without awaiting
    pub(crate) fn take_ready(&mut self) -> Option<Result<(), DispatchError>> {
        match &mut self.signal {
            Signal::Ready(result) => result.take(),
            Signal::Task(_) => None,
        }
    }
}

impl Future for Completion {
    type Output = Result<(), DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.signal {
            Signal::Ready(result) => Poll::Ready(result.take().unwrap_or(Ok(()))),
            Signal::Task(handle) => Pin::new(handle).poll(cx).map(|joined| match joined {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(DispatchError::Cancelled),
                Err(e) => Err(DispatchError::Plan(anyhow::anyhow!(
                    "plan task panicked: {}",
                    e
                ))),
            }),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Cancellation handle for a spawned plan or publishing plan run
#[derive(Debug, Clone)]
pub struct Subscription {
    abort: AbortHandle,
}

impl Subscription {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}
