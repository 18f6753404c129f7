//! Typed events emitted while processing commands
//!
//! Events are the only outcome channel of a dispatch: success is a domain
//! event such as [`EventPayload::DateFilterChanged`], failure is a single
//! [`EventPayload::CommandFailed`]. Every event carries the correlation id of
//! the command that produced it.

use serde::Serialize;

use crate::command::Command;
use crate::context::DashboardContext;
use crate::error::CommandError;
use crate::message::MessageSummary;
use crate::Message;
use crate::model::{
    AttributeFilter, AvailableDrillTargets, Dashboard, DateFilter, FilterContext, LayoutItem,
    LayoutSection, SectionHeader, WidgetHeader,
};
use crate::obj_ref::ObjRef;

/// Why a command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandFailureReason {
    InvalidArguments,
    UnknownCommand,
}

#[derive(Message, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum EventPayload {
    #[message(category = "command")]
    CommandStarted { command: Command },

    #[message(category = "command")]
    CommandFailed {
        reason: CommandFailureReason,
        message: String,
        command: Command,
    },

    #[message(category = "dashboard")]
    DashboardLoaded { dashboard: Box<Dashboard> },

    #[message(category = "filter_context")]
    DateFilterChanged { filter: DateFilter },

    #[message(category = "filter_context")]
    AttributeFilterSelectionChanged { filter: AttributeFilter },

    #[message(category = "filter_context")]
    AttributeFilterAdded { added: AttributeFilter, index: usize },

    #[message(category = "filter_context")]
    AttributeFiltersRemoved { removed: Vec<AttributeFilter> },

    #[message(category = "filter_context")]
    AttributeFilterMoved {
        moved: AttributeFilter,
        from_index: usize,
        to_index: usize,
    },

    /// Follows every successful filter change with the whole new context
    #[message(category = "filter_context")]
    FilterContextChanged { filter_context: FilterContext },

    #[message(category = "layout")]
    LayoutSectionAdded { section: LayoutSection, index: usize },

    #[message(category = "layout")]
    LayoutSectionRemoved { section: LayoutSection, index: usize },

    #[message(category = "layout")]
    LayoutSectionMoved {
        section: LayoutSection,
        from_index: usize,
        to_index: usize,
    },

    #[message(category = "layout")]
    LayoutSectionHeaderChanged {
        new_header: SectionHeader,
        section_index: usize,
    },

    #[message(category = "layout")]
    LayoutSectionItemsAdded {
        section_index: usize,
        start_index: usize,
        items_added: Vec<LayoutItem>,
    },

    #[message(category = "layout")]
    LayoutSectionItemRemoved {
        item: LayoutItem,
        section_index: usize,
        item_index: usize,
    },

    #[message(category = "layout")]
    LayoutSectionItemMoved {
        item: LayoutItem,
        from_section_index: usize,
        to_section_index: usize,
        from_index: usize,
        to_index: usize,
    },

    #[message(category = "widget")]
    InsightWidgetHeaderChanged {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        header: WidgetHeader,
    },

    #[message(category = "widget")]
    KpiWidgetHeaderChanged {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        header: WidgetHeader,
    },

    #[message(category = "drill_targets")]
    DrillTargetsAdded {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        available: AvailableDrillTargets,
    },
}

impl EventPayload {
    /// Failure event for `command`
    pub fn command_failed(error: &CommandError, command: &Command) -> Self {
        let reason = match error {
            CommandError::InvalidArguments(_) => CommandFailureReason::InvalidArguments,
            CommandError::UnknownCommand(_) => CommandFailureReason::UnknownCommand,
        };
        EventPayload::CommandFailed {
            reason,
            message: error.message().to_string(),
            command: command.clone(),
        }
    }
}

/// Something that happened in a dashboard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip)]
    pub ctx: DashboardContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(ctx: DashboardContext, correlation_id: Option<String>, payload: EventPayload) -> Self {
        Self {
            ctx,
            correlation_id,
            payload,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.payload, EventPayload::CommandFailed { .. })
    }

    /// Failure reason, if this is a `CommandFailed` event
    pub fn failure_reason(&self) -> Option<CommandFailureReason> {
        match &self.payload {
            EventPayload::CommandFailed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl Message for Event {
    fn name(&self) -> &'static str {
        self.payload.name()
    }

    fn category(&self) -> Option<&'static str> {
        self.payload.category()
    }
}

impl MessageSummary for Event {
    fn summary(&self) -> String {
        match &self.payload {
            EventPayload::CommandStarted { command } => {
                format!("CommandStarted {{ command: {} }}", command.name())
            }
            EventPayload::CommandFailed {
                reason,
                message,
                command,
            } => format!(
                "CommandFailed {{ command: {}, reason: {:?}, message: {:?} }}",
                command.name(),
                reason,
                message
            ),
            EventPayload::DashboardLoaded { dashboard } => {
                format!("DashboardLoaded {{ dashboard: {} }}", dashboard.obj_ref)
            }
            EventPayload::FilterContextChanged { filter_context } => format!(
                "FilterContextChanged {{ attribute_filters: {}, all_time: {} }}",
                filter_context.attribute_filters.len(),
                filter_context.date_filter.is_all_time()
            ),
            other => format!("{:?}", other),
        }
    }
}
