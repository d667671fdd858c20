//! Scoped dispatch
//!
//! A [`StoreProxy`] forwards actions to an upstream [`Dispatch`] (the store or
//! another proxy), optionally rewriting or dropping them first. Handing a proxy
//! to a feature gives it dispatch and state reads without the rest of the
//! store's surface. Proxies chain; the proxy that receives an action first
//! rewrites it first.

use std::sync::Arc;

use crate::action::Action;
use crate::completion::Completion;
use crate::store::Store;

/// Something actions can be sent to
pub trait Dispatch<S, A>: Send + Sync {
    fn send(&self, action: Action<S, A>) -> Completion;

    /// Snapshot of the latest committed state
    fn state(&self) -> S;
}

impl<S, A> Dispatch<S, A> for Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    fn send(&self, action: Action<S, A>) -> Completion {
        Store::send(self, action)
    }

    fn state(&self) -> S {
        Store::state(self)
    }
}

/// What a proxy does with an incoming action
pub enum Rewrite<S, A> {
    /// Forward the original action unchanged
    Keep,
    /// Forward this action instead
    Replace(Action<S, A>),
    /// Forward nothing
    Drop,
}

/// Action modifier held by a proxy
pub type Modifier<S, A> = Arc<dyn Fn(&Action<S, A>) -> Rewrite<S, A> + Send + Sync>;

/// Forwarding facade over a dispatcher
pub struct StoreProxy<S, A> {
    upstream: Arc<dyn Dispatch<S, A>>,
    modifier: Option<Modifier<S, A>>,
}

impl<S, A> Clone for StoreProxy<S, A> {
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            modifier: self.modifier.clone(),
        }
    }
}

impl<S, A> StoreProxy<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn new(upstream: Arc<dyn Dispatch<S, A>>, modifier: Option<Modifier<S, A>>) -> Self {
        Self { upstream, modifier }
    }

    /// Proxy on top of this one
    pub fn proxy<F>(&self, modifier: F) -> StoreProxy<S, A>
    where
        F: Fn(&Action<S, A>) -> Rewrite<S, A> + Send + Sync + 'static,
    {
        StoreProxy::new(Arc::new(self.clone()), Some(Arc::new(modifier)))
    }

    pub fn send(&self, action: Action<S, A>) -> Completion {
        let action = match &self.modifier {
            None => action,
            Some(modifier) => match modifier(&action) {
                Rewrite::Keep => action,
                Rewrite::Replace(replacement) => {
                    log::trace!(
                        "StoreProxy: {} action replaced by {} action",
                        action.kind(),
                        replacement.kind()
                    );
                    replacement
                }
                Rewrite::Drop => {
                    log::debug!("StoreProxy: dropped {} action", action.kind());
                    return Completion::ready(Ok(()));
                }
            },
        };
        self.upstream.send(action)
    }

    /// Send a plain action
    pub fn dispatch(&self, action: A) -> Completion {
        self.send(Action::Plain(action))
    }

    pub fn state(&self) -> S {
        self.upstream.state()
    }
}

impl<S, A> Dispatch<S, A> for StoreProxy<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    fn send(&self, action: Action<S, A>) -> Completion {
        StoreProxy::send(self, action)
    }

    fn state(&self) -> S {
        StoreProxy::state(self)
    }
}

/// Modifier that drops plain actions matching `predicate`
pub fn drop_matching<S, A, P>(predicate: P) -> impl Fn(&Action<S, A>) -> Rewrite<S, A>
where
    P: Fn(&A) -> bool,
{
    move |action| match action {
        Action::Plain(plain) if predicate(plain) => Rewrite::Drop,
        _ => Rewrite::Keep,
    }
}

/// Modifier that rewrites plain actions; `None` keeps the original
pub fn map_plain<S, A, F>(f: F) -> impl Fn(&Action<S, A>) -> Rewrite<S, A>
where
    F: Fn(&A) -> Option<A>,
{
    move |action| match action.as_plain().and_then(&f) {
        Some(replacement) => Rewrite::Replace(Action::Plain(replacement)),
        None => Rewrite::Keep,
    }
}
