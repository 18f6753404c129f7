//! State store with reducer pattern and middleware hooks

use crate::message::Message;
use crate::state::{self, DashboardState, SliceAction};
use std::marker::PhantomData;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// State container with Redux-like reducer pattern
///
/// The store holds the state tree and is the single point through which
/// slice actions are applied.
///
/// # Example
/// ```
/// use dashboard_dispatch_core::model::DateFilter;
/// use dashboard_dispatch_core::state::FilterContextAction;
/// use dashboard_dispatch_core::Store;
///
/// let mut store = Store::dashboard();
/// let changed = store.dispatch(
///     FilterContextAction::UpsertDateFilter(DateFilter::Absolute {
///         from: "2024-01-01".into(),
///         to: "2024-03-31".into(),
///     })
///     .into(),
/// );
/// assert!(changed);
/// assert!(!store.state().filter_context.date_filter().is_all_time());
/// ```
pub struct Store<S, A: Message> {
    state: S,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Message> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Apply an action through the reducer
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(&mut self.state, action)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Use sparingly - prefer dispatching actions. Mainly useful for tests
    /// and initialization.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl Store<DashboardState, SliceAction> {
    /// Store over an empty dashboard state with the root slice reducer
    pub fn dashboard() -> Self {
        Store::new(DashboardState::initial(), state::reduce)
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and lets middleware observe actions before and after
/// the reducer runs.
pub struct StoreWithMiddleware<S, A: Message, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Message, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

/// Store interface used by the dispatcher to commit slice actions
pub trait DispatchStore<S, A: Message> {
    /// Apply an action and return whether the state changed
    fn dispatch(&mut self, action: A) -> bool;
    /// Current state
    fn state(&self) -> &S;
}

impl<S, A: Message> DispatchStore<S, A> for Store<S, A> {
    fn dispatch(&mut self, action: A) -> bool {
        Store::dispatch(self, action)
    }

    fn state(&self) -> &S {
        Store::state(self)
    }
}

impl<S, A: Message, M: Middleware<A>> DispatchStore<S, A> for StoreWithMiddleware<S, A, M> {
    fn dispatch(&mut self, action: A) -> bool {
        StoreWithMiddleware::dispatch(self, action)
    }

    fn state(&self) -> &S {
        StoreWithMiddleware::state(self)
    }
}

/// Middleware trait for intercepting actions
pub trait Middleware<A: Message> {
    /// Called before the action reaches the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer processed the action
    fn after(&mut self, action: &A, state_changed: bool);
}

impl<A: Message> Middleware<A> for Box<dyn Middleware<A> + Send> {
    fn before(&mut self, action: &A) {
        (**self).before(action);
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        (**self).after(action, state_changed);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Message> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Middleware that traces every action
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Log after dispatch only
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Message> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(
                action = %action.name(),
                category = action.category().unwrap_or("-"),
                "Applying slice action"
            );
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                category = action.category().unwrap_or("-"),
                state_changed = state_changed,
                "Slice action applied"
            );
        }
    }
}

/// Compose multiple middleware into one
pub struct ComposedMiddleware<A: Message> {
    middlewares: Vec<Box<dyn Middleware<A> + Send>>,
}

impl<A: Message> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Message> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Message> ComposedMiddleware<A> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Message> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        // reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}
