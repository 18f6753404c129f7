//! Core types for dashboard-dispatch
//!
//! A command/event dispatch model for an analytical dashboard: typed
//! commands go in, a handler stages writes to the state slices it owns,
//! and on success the writes are committed and typed events come out.
//!
//! # Core Concepts
//!
//! - **Command**: a typed request with an optional correlation id
//! - **Handler**: processes one command type and writes only the slices it owns
//! - **State slices**: catalog, user, filter context, layout, drill targets
//! - **Event**: a typed notification carrying the command's correlation id
//! - **Session**: one store, one dispatcher and one ordered event emitter
//!
//! # Basic Example
//!
//! ```ignore
//! use dashboard_dispatch_core::prelude::*;
//!
//! let mut session = DashboardSession::new(ctx);
//! session.register_handler(EventHandler::on("DateFilterChanged", |event, _| {
//!     println!("{:?}", event.payload);
//!     Ok(())
//! }));
//!
//! session.dispatch(Command::load_dashboard(snapshot));
//! session.dispatch(Command::change_date_filter(DateFilterSelection::all_time()));
//! session.process_pending();
//! ```
//!
//! Handler failures never escape `dispatch`: they become a single
//! `CommandFailed` event and leave every slice untouched.

// the Message derive expands to `::dashboard_dispatch::Message`
extern crate self as dashboard_dispatch;

pub mod command;
pub mod config;
pub mod context;
pub mod convert;
pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod event;
pub mod handler;
pub mod log;
pub mod message;
pub mod model;
pub mod obj_ref;
pub mod runtime;
pub mod session;
pub mod state;
pub mod store;
pub mod testing;

// Core trait exports
pub use dashboard_dispatch_macros::Message;
pub use message::{Message, MessageSummary};

// Reference exports
pub use obj_ref::{are_obj_refs_equal, ObjRef, ObjRefMap, ObjectType, Referenced};

// Command and event exports
pub use command::{Command, CommandPayload, DateBound, DateFilterKind, DateFilterSelection};
pub use context::{BackendInfo, BackendKind, DashboardContext};
pub use event::{CommandFailureReason, Event, EventPayload};

// Error exports
pub use error::{CommandError, ConfigError, ConversionError, HandlerError};

// State exports
pub use state::{DashboardState, SliceAction, SliceId};

// Store exports
pub use store::{
    ComposedMiddleware, DispatchStore, LoggingMiddleware, Middleware, NoopMiddleware, Reducer,
    Store, StoreWithMiddleware,
};

// Dispatch exports
pub use dispatcher::{HandlerRegistry, RootDispatcher};
pub use emitter::{DispatchHandle, EventEmitter, EventHandler, EventHandlerRegistry, HandlerId};
pub use handler::{CommandHandler, HandlerContext};
pub use runtime::DashboardRuntime;
pub use session::{DashboardSession, SessionStore};

// Config and logging exports
pub use config::SessionConfig;
pub use log::{
    glob_match, MessageLog, MessageLogConfig, MessageLogEntry, MessageLoggerConfig,
    MessageLoggerMiddleware,
};

// Testing exports
pub use testing::{fixtures, EventRecorder, SessionHarness};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time, resume_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::command::{Command, CommandPayload, DateFilterSelection};
    pub use crate::config::SessionConfig;
    pub use crate::context::{BackendInfo, BackendKind, DashboardContext};
    pub use crate::emitter::{DispatchHandle, EventHandler, HandlerId};
    pub use crate::error::{CommandError, ConversionError, HandlerError};
    pub use crate::event::{CommandFailureReason, Event, EventPayload};
    pub use crate::message::{Message, MessageSummary};
    pub use crate::model::{
        AttributeElements, AttributeFilter, AttributeFilterSelectionType, Dashboard,
        DashboardLayout, DashboardSnapshot, DateFilter, DateGranularity, FilterContext,
        LayoutItem, LayoutSection, SectionHeader, Widget, WidgetHeader,
    };
    pub use crate::obj_ref::{ObjRef, Referenced};
    pub use crate::runtime::DashboardRuntime;
    pub use crate::session::DashboardSession;
    pub use crate::store::{ComposedMiddleware, LoggingMiddleware, Middleware};
}
