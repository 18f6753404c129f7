//! Command handlers
//!
//! A handler validates one command type against the current state, writes
//! the result to the slices it owns and emits the events describing the
//! outcome. Handlers never touch the store directly: they run against a
//! [`HandlerContext`], which interprets three effects:
//!
//! - [`select`](HandlerContext::select): read the staged state
//! - [`put`](HandlerContext::put): apply a slice action to the staged state
//! - [`emit`](HandlerContext::emit): queue an event
//!
//! The dispatcher commits the recorded slice actions only when the handler
//! succeeds, so a failed command never leaves a partial write behind.

pub mod dashboard;
pub mod drill;
pub mod filter;
pub mod layout;
pub mod widget;

use crate::command::Command;
use crate::context::DashboardContext;
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::message::Message;
use crate::state::array::{resolve_element_index, resolve_insert_index};
use crate::state::{self, DashboardState, SliceAction, SliceId};

pub use dashboard::LoadDashboardHandler;
pub use drill::AddDrillTargetsHandler;
pub use filter::{
    canonical_date_filter, AddAttributeFilterHandler, ChangeAttributeFilterSelectionHandler,
    ChangeDateFilterSelectionHandler, MoveAttributeFilterHandler, RemoveAttributeFiltersHandler,
};
pub use layout::{
    AddLayoutSectionHandler, AddSectionItemsHandler, ChangeLayoutSectionHeaderHandler,
    MoveLayoutSectionHandler, MoveSectionItemHandler, RemoveLayoutSectionHandler,
    RemoveSectionItemHandler,
};
pub use widget::{ChangeInsightWidgetHeaderHandler, ChangeKpiWidgetHeaderHandler};

/// Processes one command type
pub trait CommandHandler: Send + Sync {
    /// Slices this handler may write
    fn owned_slices(&self) -> &'static [SliceId];

    /// Validate `command`, write state and emit events through `cx`
    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError>;
}

/// Effect interpreter a handler runs against
///
/// Reads see every write made earlier in the same handler run.
pub struct HandlerContext<'a> {
    ctx: &'a DashboardContext,
    handler: &'static str,
    owned: &'static [SliceId],
    state: DashboardState,
    actions: Vec<SliceAction>,
    events: Vec<EventPayload>,
}

impl<'a> HandlerContext<'a> {
    /// Stage `state` for a handler owning `owned`
    pub fn new(
        ctx: &'a DashboardContext,
        handler: &'static str,
        owned: &'static [SliceId],
        state: DashboardState,
    ) -> Self {
        Self {
            ctx,
            handler,
            owned,
            state,
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn dashboard_context(&self) -> &DashboardContext {
        self.ctx
    }

    /// Staged state, including writes made so far
    pub fn select(&self) -> &DashboardState {
        &self.state
    }

    /// Apply `action` to the staged state and record it for commit
    ///
    /// # Panics
    ///
    /// Panics if the action targets a slice the handler does not own.
    pub fn put(&mut self, action: impl Into<SliceAction>) -> bool {
        let action = action.into();
        let slice = action.slice();
        if !self.owned.contains(&slice) {
            panic!(
                "handler for {} wrote slice `{}` which it does not own (owns {:?})",
                self.handler,
                slice,
                self.owned
            );
        }
        let changed = state::reduce(&mut self.state, action.clone());
        tracing::trace!(
            handler = self.handler,
            action = action.name(),
            changed,
            "staged slice action"
        );
        self.actions.push(action);
        changed
    }

    pub fn emit(&mut self, payload: EventPayload) {
        self.events.push(payload);
    }

    /// Recorded slice actions and emitted events, in order
    pub fn into_parts(self) -> (Vec<SliceAction>, Vec<EventPayload>) {
        (self.actions, self.events)
    }
}

/// Error for a command routed to a handler of another type
pub(crate) fn mismatched(handler: &str, command: &Command) -> CommandError {
    CommandError::UnknownCommand(format!(
        "{} handler cannot process {}",
        handler,
        command.name()
    ))
}

/// Resolve a relative insertion index or fail with `InvalidArguments`
pub(crate) fn insert_index(len: usize, index: isize, what: &str) -> Result<usize, CommandError> {
    resolve_insert_index(len, index).ok_or_else(|| {
        CommandError::invalid(format!(
            "{} index {} is out of range, there are {} {}s",
            what, index, len, what
        ))
    })
}

/// Resolve a relative element index or fail with `InvalidArguments`
pub(crate) fn element_index(len: usize, index: isize, what: &str) -> Result<usize, CommandError> {
    resolve_element_index(len, index).ok_or_else(|| {
        CommandError::invalid(format!(
            "{} index {} does not address an existing {}, there are {}",
            what, index, what, len
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DashboardLayout;
    use crate::state::{LayoutAction, UserAction};
    use crate::testing::fixtures;

    #[test]
    fn test_put_is_visible_to_select() {
        let ctx = fixtures::context();
        let mut cx = HandlerContext::new(&ctx, "test", &[SliceId::Layout], DashboardState::initial());

        assert!(cx.put(LayoutAction::SetLayout(fixtures::layout())));
        assert_eq!(cx.select().layout.layout, fixtures::layout());

        let (actions, events) = cx.into_parts();
        assert_eq!(actions.len(), 1);
        assert!(events.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not own")]
    fn test_put_to_foreign_slice_panics() {
        let ctx = fixtures::context();
        let mut cx = HandlerContext::new(&ctx, "test", &[SliceId::Layout], DashboardState::initial());
        cx.put(UserAction::SetUser(None));
    }

    #[test]
    fn test_index_validation() {
        assert_eq!(insert_index(2, -1, "section"), Ok(2));
        assert_eq!(insert_index(2, 2, "section"), Ok(2));
        assert!(insert_index(2, 3, "section").is_err());
        assert_eq!(element_index(2, -1, "item"), Ok(1));
        assert!(element_index(0, 0, "item").is_err());

        let layout = DashboardLayout::default();
        assert!(element_index(layout.sections.len(), 0, "section").is_err());
    }
}
