//! Domain object model shared by the state slices, commands and converters

pub mod catalog;
pub mod filter;
pub mod layout;

use serde::{Deserialize, Serialize};

use crate::obj_ref::ObjRef;

pub use catalog::{Catalog, CatalogAttribute, CatalogDateDataset, CatalogMeasure, DisplayForm};
pub use filter::{
    AttributeElements, AttributeFilter, AttributeFilterSelectionType, DateFilter,
    DateGranularity, FilterContext,
};
pub use layout::{
    DashboardLayout, InsightWidget, ItemSize, KpiWidget, LayoutItem, LayoutSection,
    SectionHeader, Widget, WidgetHeader,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

/// Drill targets available on an insight widget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDrillTargets {
    #[serde(default)]
    pub measures: Vec<ObjRef>,
    #[serde(default)]
    pub attributes: Vec<ObjRef>,
}

impl AvailableDrillTargets {
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty() && self.attributes.is_empty()
    }
}

/// Analytical dashboard metadata object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unlisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_context: Option<FilterContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<DashboardLayout>,
}

/// Everything a session needs to render a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub dashboard: Dashboard,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Recurrence window of a scheduled email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWhen {
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub recurrence: String,
    pub time_zone: String,
}

/// PDF export of a whole dashboard, the only attachment kind with a domain mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAttachment {
    pub dashboard: ObjRef,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_context: Option<ObjRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMail {
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub obj_ref: Option<ObjRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub when: ScheduleWhen,
    pub to: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<DashboardAttachment>,
    #[serde(default)]
    pub unlisted: bool,
}
