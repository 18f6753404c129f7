//! dashboard-dispatch: typed command/event dispatch for analytical dashboards
//!
//! Commands go in, events come out. Handlers stage writes to the state
//! slices they own; the writes are committed only when the handler
//! succeeds, otherwise a single `CommandFailed` event is emitted.
//!
//! # Example
//! ```ignore
//! use dashboard_dispatch::prelude::*;
//!
//! let mut session = DashboardSession::new(ctx);
//! session.dispatch(Command::load_dashboard(snapshot));
//! session.process_pending();
//!
//! #[derive(Message, Clone, Debug)]
//! #[message(category = "ui")]
//! enum UiMessage {
//!     Refresh,
//!     #[message(category = "navigation")]
//!     Open { dashboard: ObjRef },
//! }
//! ```

// Re-export everything from core
pub use dashboard_dispatch_core::*;

// Re-export derive macros
pub use dashboard_dispatch_macros::Message;

/// Prelude for convenient imports
pub mod prelude {
    pub use dashboard_dispatch_core::prelude::*;

    // Dispatch
    pub use dashboard_dispatch_core::{
        CommandHandler, HandlerContext, HandlerRegistry, RootDispatcher, SliceAction, SliceId,
    };

    // Logging
    pub use dashboard_dispatch_core::{MessageLog, MessageLoggerConfig, MessageLoggerMiddleware};

    // Derive macros
    pub use dashboard_dispatch_macros::Message;
}
