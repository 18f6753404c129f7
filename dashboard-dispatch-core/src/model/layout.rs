//! Dashboard layout and widgets

use serde::{Deserialize, Serialize};

use crate::obj_ref::{ObjRef, ObjRefMap, ObjectType, Referenced};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    #[serde(default)]
    pub sections: Vec<LayoutSection>,
}

impl DashboardLayout {
    /// All widgets in the layout, keyed by reference
    pub fn widgets(&self) -> ObjRefMap<Widget> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .map(|item| item.widget.clone())
            .collect()
    }

    /// Position (section, item) of the widget with the given reference
    pub fn widget_position(&self, widget_ref: &ObjRef) -> Option<(usize, usize)> {
        let widgets = self.widgets();
        let target = widgets.get(widget_ref)?;
        self.sections.iter().enumerate().find_map(|(si, section)| {
            section
                .items
                .iter()
                .position(|item| item.widget.obj_ref() == target.obj_ref())
                .map(|ii| (si, ii))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<SectionHeader>,
    #[serde(default)]
    pub items: Vec<LayoutItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionHeader {
    /// Overlay the set fields of `other` on top of this header
    pub fn merged_with(&self, other: &SectionHeader) -> SectionHeader {
        SectionHeader {
            title: other.title.clone().or_else(|| self.title.clone()),
            description: other.description.clone().or_else(|| self.description.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSize {
    pub grid_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_height: Option<u32>,
}

impl Default for ItemSize {
    fn default() -> Self {
        Self {
            grid_width: 6,
            grid_height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    #[serde(default)]
    pub size: ItemSize,
    pub widget: Widget,
}

impl LayoutItem {
    pub fn new(widget: Widget) -> Self {
        Self {
            size: ItemSize::default(),
            widget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightWidget {
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
    pub insight: ObjRef,
    #[serde(default)]
    pub ignore_dashboard_filters: Vec<ObjRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_data_set: Option<ObjRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiWidget {
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
    pub measure: ObjRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Widget {
    Insight(InsightWidget),
    Kpi(KpiWidget),
}

impl Widget {
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Insight(_) => "insight",
            Widget::Kpi(_) => "kpi",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Widget::Insight(w) => &w.title,
            Widget::Kpi(w) => &w.title,
        }
    }

    pub fn as_insight(&self) -> Option<&InsightWidget> {
        match self {
            Widget::Insight(w) => Some(w),
            Widget::Kpi(_) => None,
        }
    }

    pub fn as_kpi(&self) -> Option<&KpiWidget> {
        match self {
            Widget::Kpi(w) => Some(w),
            Widget::Insight(_) => None,
        }
    }
}

impl Referenced for Widget {
    fn obj_ref(&self) -> &ObjRef {
        match self {
            Widget::Insight(w) => &w.obj_ref,
            Widget::Kpi(w) => &w.obj_ref,
        }
    }

    fn uri(&self) -> Option<&str> {
        let uri = match self {
            Widget::Insight(w) => &w.uri,
            Widget::Kpi(w) => &w.uri,
        };
        (!uri.is_empty()).then_some(uri.as_str())
    }

    fn identifier(&self) -> Option<&str> {
        let identifier = match self {
            Widget::Insight(w) => &w.identifier,
            Widget::Kpi(w) => &w.identifier,
        };
        (!identifier.is_empty()).then_some(identifier.as_str())
    }

    fn object_type(&self) -> Option<ObjectType> {
        Some(ObjectType::Widget)
    }
}
