//! Reducer - pure function that produces new state from current state + action
//!
//! Leaf reducers return the state unchanged for actions they don't handle.
//! [`CombinedReducer`] runs several reducers in order over the evolving state,
//! so independent reducers can each react to the same action.

use std::marker::PhantomData;

/// Maps `(State, Action)` to the next `State`
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: S, action: &A) -> S;

    /// Fallible form used by the store
    ///
    /// Override this for reducers that can reject an action; the store keeps
    /// its previous state when an error is returned.
    fn try_reduce(&self, state: S, action: &A) -> anyhow::Result<S> {
        Ok(self.reduce(state, action))
    }
}

/// Type-erased reducer held by the store
pub type BoxedReducer<S, A> = Box<dyn Reducer<S, A>>;

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(S, &A) -> S + Send + Sync,
{
    fn reduce(&self, state: S, action: &A) -> S {
        self(state, action)
    }
}

/// Reducer built from a closure that can fail
pub struct Fallible<F> {
    f: F,
}

/// Wrap a fallible closure as a reducer
pub fn fallible<S, A, F>(f: F) -> Fallible<F>
where
    F: Fn(S, &A) -> anyhow::Result<S> + Send + Sync,
{
    Fallible { f }
}

impl<S: Clone, A, F> Reducer<S, A> for Fallible<F>
where
    F: Fn(S, &A) -> anyhow::Result<S> + Send + Sync,
{
    /// Infallible view: a rejected action leaves the state as it was
    fn reduce(&self, state: S, action: &A) -> S {
        match (self.f)(state.clone(), action) {
            Ok(next) => next,
            Err(e) => {
                log::warn!("Reducer rejected action: {:#}", e);
                state
            }
        }
    }

    fn try_reduce(&self, state: S, action: &A) -> anyhow::Result<S> {
        (self.f)(state, action)
    }
}

/// Root reducer made of several reducers over the same state type
pub struct CombinedReducer<S, A> {
    reducers: Vec<BoxedReducer<S, A>>,
}

impl<S, A> CombinedReducer<S, A> {
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    /// Append a reducer; reducers run in the order they were added
    pub fn with<R>(mut self, reducer: R) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        self.reducers.push(Box::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A> Default for CombinedReducer<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Reducer<S, A> for CombinedReducer<S, A> {
    fn reduce(&self, state: S, action: &A) -> S {
        self.reducers
            .iter()
            .fold(state, |state, reducer| reducer.reduce(state, action))
    }

    fn try_reduce(&self, state: S, action: &A) -> anyhow::Result<S> {
        self.reducers
            .iter()
            .try_fold(state, |state, reducer| reducer.try_reduce(state, action))
    }
}

/// Merge reducers into one root reducer
pub fn combine_reducers<S, A>(reducers: Vec<BoxedReducer<S, A>>) -> CombinedReducer<S, A> {
    CombinedReducer { reducers }
}

/// Reducer over a slice of the root state
///
/// Lifts a reducer for `T` into a reducer for `S` through a getter/setter
/// pair, so slice reducers compose into one root reducer.
pub struct Scoped<G, P, R, T> {
    get: G,
    set: P,
    reducer: R,
    _slice: PhantomData<fn() -> T>,
}

pub fn scoped<S, A, T, G, P, R>(get: G, set: P, reducer: R) -> Scoped<G, P, R, T>
where
    G: Fn(&S) -> T + Send + Sync,
    P: Fn(&mut S, T) + Send + Sync,
    R: Reducer<T, A>,
{
    Scoped {
        get,
        set,
        reducer,
        _slice: PhantomData,
    }
}

impl<S, A, T, G, P, R> Reducer<S, A> for Scoped<G, P, R, T>
where
    G: Fn(&S) -> T + Send + Sync,
    P: Fn(&mut S, T) + Send + Sync,
    R: Reducer<T, A>,
{
    fn reduce(&self, mut state: S, action: &A) -> S {
        let slice = self.reducer.reduce((self.get)(&state), action);
        (self.set)(&mut state, slice);
        state
    }

    fn try_reduce(&self, mut state: S, action: &A) -> anyhow::Result<S> {
        let slice = self.reducer.try_reduce((self.get)(&state), action)?;
        (self.set)(&mut state, slice);
        Ok(state)
    }
}
