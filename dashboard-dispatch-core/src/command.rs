//! Typed commands accepted by the dispatcher
//!
//! A command is `{ "type": <tag>, "correlationId": <optional>, "payload": {...} }`
//! on the wire. The tag doubles as the [`Message::name`] used to route the
//! command to its handler.

use serde::{Deserialize, Serialize};

use crate::message::MessageSummary;
use crate::Message;
use crate::model::{
    AttributeElements, AttributeFilterSelectionType, AvailableDrillTargets, DashboardSnapshot,
    DateGranularity, LayoutItem, SectionHeader, WidgetHeader,
};
use crate::obj_ref::ObjRef;

/// Whether a date filter selection is relative to today or a fixed range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateFilterKind {
    Relative,
    Absolute,
}

/// One end of a date filter selection: a granularity offset or a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateBound {
    Offset(i32),
    Date(String),
}

/// Requested date filter, before canonicalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilterSelection {
    #[serde(rename = "type")]
    pub kind: DateFilterKind,
    pub granularity: DateGranularity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateBound>,
}

impl DateFilterSelection {
    /// Relative selection with no bounds, i.e. "all time"
    pub fn all_time() -> Self {
        Self {
            kind: DateFilterKind::Relative,
            granularity: DateGranularity::Date,
            from: None,
            to: None,
        }
    }

    pub fn relative(granularity: DateGranularity, from: i32, to: i32) -> Self {
        Self {
            kind: DateFilterKind::Relative,
            granularity,
            from: Some(DateBound::Offset(from)),
            to: Some(DateBound::Offset(to)),
        }
    }

    pub fn absolute(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: DateFilterKind::Absolute,
            granularity: DateGranularity::Date,
            from: Some(DateBound::Date(from.into())),
            to: Some(DateBound::Date(to.into())),
        }
    }
}

#[derive(Message, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum CommandPayload {
    /// Initialize every slice from a dashboard snapshot
    #[message(category = "dashboard")]
    LoadDashboard(Box<DashboardSnapshot>),

    #[message(category = "filter_context")]
    ChangeDateFilterSelection(DateFilterSelection),

    #[message(category = "filter_context")]
    ChangeAttributeFilterSelection {
        filter_local_id: String,
        elements: AttributeElements,
        selection_type: AttributeFilterSelectionType,
    },

    #[message(category = "filter_context")]
    AddAttributeFilter {
        display_form: ObjRef,
        index: isize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_selection: Option<AttributeElements>,
        #[serde(default)]
        initial_is_negative_selection: bool,
    },

    #[message(category = "filter_context")]
    RemoveAttributeFilters { filter_local_ids: Vec<String> },

    #[message(category = "filter_context")]
    MoveAttributeFilter { filter_local_id: String, index: isize },

    #[message(category = "layout")]
    AddLayoutSection {
        index: isize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_header: Option<SectionHeader>,
        #[serde(default)]
        initial_items: Vec<LayoutItem>,
    },

    #[message(category = "layout")]
    RemoveLayoutSection { index: isize },

    #[message(category = "layout")]
    MoveLayoutSection { section_index: isize, to_index: isize },

    #[message(category = "layout")]
    ChangeLayoutSectionHeader {
        index: usize,
        header: SectionHeader,
        #[serde(default)]
        merge: bool,
    },

    #[message(category = "layout")]
    AddSectionItems {
        section_index: usize,
        item_index: isize,
        items: Vec<LayoutItem>,
    },

    #[message(category = "layout")]
    RemoveSectionItem { section_index: usize, item_index: isize },

    #[message(category = "layout")]
    MoveSectionItem {
        section_index: usize,
        item_index: isize,
        to_section_index: usize,
        to_item_index: isize,
    },

    #[message(category = "widget")]
    ChangeInsightWidgetHeader {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        header: WidgetHeader,
    },

    #[message(category = "widget")]
    ChangeKpiWidgetHeader {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        header: WidgetHeader,
    },

    #[message(category = "drill_targets")]
    AddDrillTargets {
        #[serde(rename = "ref")]
        widget_ref: ObjRef,
        available: AvailableDrillTargets,
    },
}

/// A request to change dashboard state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(flatten)]
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(payload: CommandPayload) -> Self {
        Self {
            correlation_id: None,
            payload,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn load_dashboard(snapshot: DashboardSnapshot) -> Self {
        Self::new(CommandPayload::LoadDashboard(Box::new(snapshot)))
    }

    pub fn change_date_filter(selection: DateFilterSelection) -> Self {
        Self::new(CommandPayload::ChangeDateFilterSelection(selection))
    }

    pub fn change_insight_widget_header(widget_ref: ObjRef, title: impl Into<String>) -> Self {
        Self::new(CommandPayload::ChangeInsightWidgetHeader {
            widget_ref,
            header: WidgetHeader {
                title: Some(title.into()),
            },
        })
    }

    pub fn change_kpi_widget_header(widget_ref: ObjRef, title: impl Into<String>) -> Self {
        Self::new(CommandPayload::ChangeKpiWidgetHeader {
            widget_ref,
            header: WidgetHeader {
                title: Some(title.into()),
            },
        })
    }
}

impl From<CommandPayload> for Command {
    fn from(payload: CommandPayload) -> Self {
        Command::new(payload)
    }
}

impl Message for Command {
    fn name(&self) -> &'static str {
        self.payload.name()
    }

    fn category(&self) -> Option<&'static str> {
        self.payload.category()
    }
}

impl MessageSummary for Command {
    fn summary(&self) -> String {
        match &self.payload {
            CommandPayload::LoadDashboard(snapshot) => format!(
                "LoadDashboard {{ dashboard: {}, attributes: {} }}",
                snapshot.dashboard.obj_ref,
                snapshot.catalog.attributes.len()
            ),
            CommandPayload::AddSectionItems {
                section_index,
                item_index,
                items,
            } => format!(
                "AddSectionItems {{ section: {}, index: {}, items: {} }}",
                section_index,
                item_index,
                items.len()
            ),
            other => format!("{:?}", other),
        }
    }
}
