//! Unidirectional state store
//!
//! This crate provides:
//! - An action model with plain actions, plans and publishing plans
//! - Reducer composition over a single state type
//! - An ordered middleware chain around the reducer
//! - A store serializing dispatches and debouncing change notifications
//! - Scoped dispatchers (proxies) that rewrite or drop actions
//!
//! ```text
//! send ─┬─ Plain ──────────► middleware (pre) → reducer → middleware (post) → swap → notify
//!       ├─ Plan ───────────► body(dispatch, state) ─┐
//!       └─ Publishing ─────► stream of actions ─────┴─► send …
//! ```

pub mod action;
pub mod completion;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod proxy;
pub mod reducer;
pub mod store;

pub use action::{Action, ActionStream, Plan, PlanContext, PublishingPlan};
pub use completion::{Completion, Subscription};
pub use error::DispatchError;
pub use middleware::{
    filter, handle_action, BoxedMiddleware, CombinedMiddleware, Dispatcher, Filter, HandleAction,
    LoggingMiddleware, Middleware, Next, Reduced,
};
pub use notify::{ChangeNotifier, ChangeStream, DEFAULT_DEBOUNCE};
pub use proxy::{drop_matching, map_plain, Dispatch, Modifier, Rewrite, StoreProxy};
pub use reducer::{combine_reducers, fallible, scoped, BoxedReducer, CombinedReducer, Reducer};
pub use store::{Store, StoreBuilder, WeakStore};
