//! Root dispatcher: routes commands to handlers and turns failures into events

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::Command;
use crate::context::DashboardContext;
use crate::error::CommandError;
use crate::event::{Event, EventPayload};
use crate::handler::{self, CommandHandler, HandlerContext};
use crate::message::Message;
use crate::state::{DashboardState, SliceAction};
use crate::store::DispatchStore;

/// Command handlers keyed by command type tag
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry")
            .field("commands", &names)
            .finish()
    }
}

impl HandlerRegistry {
    /// Empty registry; every command is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a handler for every built-in command
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("LoadDashboard", handler::LoadDashboardHandler);
        registry.register(
            "ChangeDateFilterSelection",
            handler::ChangeDateFilterSelectionHandler,
        );
        registry.register(
            "ChangeAttributeFilterSelection",
            handler::ChangeAttributeFilterSelectionHandler,
        );
        registry.register("AddAttributeFilter", handler::AddAttributeFilterHandler);
        registry.register("RemoveAttributeFilters", handler::RemoveAttributeFiltersHandler);
        registry.register("MoveAttributeFilter", handler::MoveAttributeFilterHandler);
        registry.register("AddLayoutSection", handler::AddLayoutSectionHandler);
        registry.register("RemoveLayoutSection", handler::RemoveLayoutSectionHandler);
        registry.register("MoveLayoutSection", handler::MoveLayoutSectionHandler);
        registry.register(
            "ChangeLayoutSectionHeader",
            handler::ChangeLayoutSectionHeaderHandler,
        );
        registry.register("AddSectionItems", handler::AddSectionItemsHandler);
        registry.register("RemoveSectionItem", handler::RemoveSectionItemHandler);
        registry.register("MoveSectionItem", handler::MoveSectionItemHandler);
        registry.register(
            "ChangeInsightWidgetHeader",
            handler::ChangeInsightWidgetHeaderHandler,
        );
        registry.register("ChangeKpiWidgetHeader", handler::ChangeKpiWidgetHeaderHandler);
        registry.register("AddDrillTargets", handler::AddDrillTargetsHandler);
        registry
    }

    /// Register `handler` for `command_type`, replacing any previous one
    pub fn register<H: CommandHandler + 'static>(&mut self, command_type: &'static str, handler: H) {
        self.handlers.insert(command_type, Arc::new(handler));
    }

    pub fn unregister(&mut self, command_type: &str) -> bool {
        self.handlers.remove(command_type).is_some()
    }

    pub fn get(&self, command_type: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(command_type)
    }

    pub fn contains(&self, command_type: &str) -> bool {
        self.handlers.contains_key(command_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Routes one command at a time to its handler.
///
/// `dispatch` never fails: validation errors and unknown commands come
/// back as a single `CommandFailed` event and leave the store untouched.
#[derive(Debug, Clone)]
pub struct RootDispatcher {
    registry: HandlerRegistry,
    generate_correlation_ids: bool,
}

impl Default for RootDispatcher {
    fn default() -> Self {
        Self::new(HandlerRegistry::with_defaults())
    }
}

impl RootDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            generate_correlation_ids: true,
        }
    }

    /// Whether commands without a correlation id get a generated one
    pub fn generate_correlation_ids(mut self, enabled: bool) -> Self {
        self.generate_correlation_ids = enabled;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Process `command` to completion and return the events it produced
    ///
    /// The first event is always `CommandStarted`. On success the handler's
    /// slice actions are committed to `store` in order.
    pub fn dispatch<St>(&self, store: &mut St, ctx: &DashboardContext, mut command: Command) -> Vec<Event>
    where
        St: DispatchStore<DashboardState, SliceAction>,
    {
        if command.correlation_id.is_none() && self.generate_correlation_ids {
            command.correlation_id = Some(uuid::Uuid::new_v4().to_string());
        }
        let correlation_id = command.correlation_id.clone();
        let event = |payload| Event::new(ctx.clone(), correlation_id.clone(), payload);

        let name = command.name();
        let mut events = vec![event(EventPayload::CommandStarted {
            command: command.clone(),
        })];

        let Some(handler) = self.registry.get(name) else {
            let error = CommandError::UnknownCommand(format!("no handler registered for {}", name));
            tracing::warn!(command = name, correlation_id = ?correlation_id, "unknown command");
            events.push(event(EventPayload::command_failed(&error, &command)));
            return events;
        };

        let mut cx = HandlerContext::new(ctx, name, handler.owned_slices(), store.state().clone());
        match handler.handle(&mut cx, &command) {
            Ok(()) => {
                let (actions, emitted) = cx.into_parts();
                debug_assert!(
                    !emitted.is_empty(),
                    "handler for {} succeeded without emitting an event",
                    name
                );
                let mut changed = false;
                for action in actions {
                    changed |= store.dispatch(action);
                }
                tracing::debug!(
                    command = name,
                    correlation_id = ?correlation_id,
                    events = emitted.len(),
                    changed,
                    "command processed"
                );
                events.extend(emitted.into_iter().map(event));
            }
            Err(error) => {
                tracing::warn!(
                    command = name,
                    correlation_id = ?correlation_id,
                    %error,
                    "command failed"
                );
                events.push(event(EventPayload::command_failed(&error, &command)));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandPayload, DateFilterSelection};
    use crate::event::CommandFailureReason;
    use crate::model::DateFilter;
    use crate::obj_ref::ObjRef;
    use crate::store::Store;
    use crate::testing::fixtures;

    fn names(events: &[Event]) -> Vec<&'static str> {
        events.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_defaults_cover_every_command() {
        let registry = HandlerRegistry::with_defaults();
        for name in CommandPayload::all_names() {
            assert!(registry.contains(name), "no default handler for {}", name);
        }
        assert_eq!(registry.len(), CommandPayload::all_names().len());
    }

    #[test]
    fn test_generates_correlation_id() {
        let dispatcher = RootDispatcher::default();
        let mut store = Store::dashboard();
        let events = dispatcher.dispatch(
            &mut store,
            &fixtures::context(),
            Command::change_date_filter(DateFilterSelection::all_time()),
        );

        let id = events[0].correlation_id().unwrap().to_string();
        assert!(events.iter().all(|e| e.correlation_id() == Some(id.as_str())));
    }

    #[test]
    fn test_keeps_missing_correlation_id_when_disabled() {
        let dispatcher = RootDispatcher::default().generate_correlation_ids(false);
        let mut store = Store::dashboard();
        let events = dispatcher.dispatch(
            &mut store,
            &fixtures::context(),
            Command::change_date_filter(DateFilterSelection::all_time()),
        );
        assert!(events.iter().all(|e| e.correlation_id().is_none()));
    }

    #[test]
    fn test_unknown_command() {
        let mut registry = HandlerRegistry::with_defaults();
        assert!(registry.unregister("ChangeDateFilterSelection"));
        let dispatcher = RootDispatcher::new(registry);
        let mut store = Store::dashboard();

        let events = dispatcher.dispatch(
            &mut store,
            &fixtures::context(),
            Command::change_date_filter(DateFilterSelection::all_time()).with_correlation_id("u1"),
        );

        assert_eq!(names(&events), vec!["CommandStarted", "CommandFailed"]);
        assert_eq!(
            events[1].failure_reason(),
            Some(CommandFailureReason::UnknownCommand)
        );
        assert_eq!(events[1].correlation_id(), Some("u1"));
    }

    #[test]
    fn test_failure_leaves_store_untouched() {
        let dispatcher = RootDispatcher::default();
        let mut store = Store::dashboard();
        let ctx = fixtures::context();
        dispatcher.dispatch(&mut store, &ctx, Command::load_dashboard(fixtures::snapshot()));
        let before = store.state().clone();

        let events = dispatcher.dispatch(
            &mut store,
            &ctx,
            Command::change_insight_widget_header(ObjRef::id("no-such-widget"), "Title")
                .with_correlation_id("c-404"),
        );

        assert_eq!(names(&events), vec!["CommandStarted", "CommandFailed"]);
        assert_eq!(events[1].correlation_id(), Some("c-404"));
        assert_eq!(store.state().layout, before.layout);
        assert_eq!(store.state().filter_context, before.filter_context);
    }

    #[test]
    fn test_success_commits_staged_writes() {
        let dispatcher = RootDispatcher::default();
        let mut store = Store::dashboard();

        let events = dispatcher.dispatch(
            &mut store,
            &fixtures::context(),
            Command::change_date_filter(DateFilterSelection::absolute("2024-01-01", "2024-01-31")),
        );

        assert_eq!(
            names(&events),
            vec!["CommandStarted", "DateFilterChanged", "FilterContextChanged"]
        );
        assert_eq!(
            store.state().filter_context.date_filter(),
            &DateFilter::Absolute {
                from: "2024-01-01".into(),
                to: "2024-01-31".into()
            }
        );
    }
}
