//! Dashboard session: one store, one dispatcher, one emitter
//!
//! Everything runs on the caller's thread. `dispatch` only queues; the
//! queue is drained by [`DashboardSession::process_pending`] (or by the
//! async [`DashboardRuntime`](crate::runtime::DashboardRuntime)). Commands
//! are processed one at a time and all events of a command are delivered
//! before the next queued command starts.

use tokio::sync::mpsc;
use tracing::info;

use crate::command::Command;
use crate::config::SessionConfig;
use crate::context::DashboardContext;
use crate::dispatcher::{HandlerRegistry, RootDispatcher};
use crate::emitter::{DispatchHandle, EventEmitter, EventHandler, EventHandlerRegistry, HandlerId};
use crate::event::Event;
use crate::log::{MessageLog, MessageLoggerMiddleware};
use crate::message::Message;
use crate::state::{self, DashboardState, SliceAction};
use crate::store::{ComposedMiddleware, Middleware, StoreWithMiddleware};

/// Store type used by sessions
pub type SessionStore =
    StoreWithMiddleware<DashboardState, SliceAction, ComposedMiddleware<SliceAction>>;

pub struct DashboardSession {
    ctx: DashboardContext,
    store: SessionStore,
    dispatcher: RootDispatcher,
    emitter: EventEmitter,
    registry: EventHandlerRegistry,
    tx: mpsc::UnboundedSender<Command>,
    pub(crate) rx: mpsc::UnboundedReceiver<Command>,
    command_log: MessageLog,
    event_log: MessageLog,
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession")
            .field("ctx", &self.ctx)
            .field("dispatcher", &self.dispatcher)
            .field("handlers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl DashboardSession {
    /// Session with the default configuration and every built-in handler
    pub fn new(ctx: DashboardContext) -> Self {
        Self::with_config(ctx, SessionConfig::default())
    }

    pub fn with_config(ctx: DashboardContext, config: SessionConfig) -> Self {
        Self::with_registry(ctx, config, HandlerRegistry::with_defaults())
    }

    /// Session routing commands through a custom handler registry
    pub fn with_registry(
        ctx: DashboardContext,
        config: SessionConfig,
        handlers: HandlerRegistry,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut middleware = ComposedMiddleware::new();
        middleware.add(MessageLoggerMiddleware::new(config.action_log.clone()));
        let store = StoreWithMiddleware::new(DashboardState::initial(), state::reduce, middleware);

        let registry = EventHandlerRegistry::new();
        let emitter = EventEmitter::new(registry.clone(), DispatchHandle::new(tx.clone()));
        let dispatcher =
            RootDispatcher::new(handlers).generate_correlation_ids(config.generate_correlation_ids);

        info!(
            workspace = ctx.workspace(),
            backend = %ctx.backend().kind,
            dashboard = ?ctx.dashboard().map(|d| d.key()),
            "dashboard session created"
        );

        Self {
            ctx,
            store,
            dispatcher,
            emitter,
            registry,
            tx,
            rx,
            command_log: MessageLog::new(config.command_log_config()),
            event_log: MessageLog::new(config.event_log_config()),
        }
    }

    /// Add a middleware observing every committed slice action
    pub fn add_middleware<M: Middleware<SliceAction> + Send + 'static>(&mut self, middleware: M) {
        self.store.middleware_mut().add(middleware);
    }

    pub fn context(&self) -> &DashboardContext {
        &self.ctx
    }

    pub fn state(&self) -> &DashboardState {
        self.store.state()
    }

    /// Queue a command; it runs on the next [`process_pending`](Self::process_pending)
    pub fn dispatch(&self, command: Command) {
        // the session owns the receiver, so the channel cannot be closed here
        let _ = self.tx.send(command);
    }

    /// Handle for queuing commands from elsewhere
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle::new(self.tx.clone())
    }

    pub fn register_handler(&self, handler: EventHandler) -> HandlerId {
        self.registry.register(handler)
    }

    pub fn unregister_handler(&self, id: HandlerId) -> bool {
        self.registry.unregister(id)
    }

    pub fn handlers(&self) -> &EventHandlerRegistry {
        &self.registry
    }

    pub fn command_log(&self) -> &MessageLog {
        &self.command_log
    }

    pub fn event_log(&self) -> &MessageLog {
        &self.event_log
    }

    /// Process queued commands until none are left, including commands
    /// queued by event handlers along the way. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(command) = self.rx.try_recv() {
            self.process(command);
            processed += 1;
        }
        processed
    }

    /// Run one command and deliver its events
    pub(crate) fn process(&mut self, command: Command) {
        let events = self.dispatcher.dispatch(&mut self.store, &self.ctx, command);
        self.record(&events);
        self.emitter.enqueue(events);
        self.emitter.process();
    }

    fn record(&mut self, events: &[Event]) {
        let Some(started) = events.first() else {
            return;
        };
        let correlation_id = started.correlation_id();
        if let crate::event::EventPayload::CommandStarted { command } = &started.payload {
            if self.command_log.log(command, correlation_id).is_some() {
                self.command_log
                    .update_last_outcome(!events.iter().any(Event::is_failure));
            }
        }
        for event in events {
            if self.event_log.log(event, correlation_id).is_some() {
                tracing::trace!(event = event.name(), "event recorded");
            }
        }
    }
}
