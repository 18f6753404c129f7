//! Filter context domain model

use serde::{Deserialize, Serialize};

use crate::obj_ref::{ObjRef, ObjectType};

/// Granularity of a relative date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateGranularity {
    #[serde(rename = "GDC.time.date")]
    Date,
    #[serde(rename = "GDC.time.week_us")]
    Week,
    #[serde(rename = "GDC.time.month")]
    Month,
    #[serde(rename = "GDC.time.quarter")]
    Quarter,
    #[serde(rename = "GDC.time.year")]
    Year,
}

/// Dashboard-wide date filter
///
/// `AllTime` is the canonical form of "no date restriction"; a relative
/// selection without bounds is stored as `AllTime`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DateFilter {
    #[default]
    AllTime,
    Relative {
        granularity: DateGranularity,
        from: i32,
        to: i32,
    },
    Absolute {
        from: String,
        to: String,
    },
}

impl DateFilter {
    pub fn is_all_time(&self) -> bool {
        matches!(self, DateFilter::AllTime)
    }
}

/// Selected attribute elements, addressed by URI (bear) or by value (tiger)
///
/// An empty selection carries no addressing, so empty lists of either form
/// compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeElements {
    Uris(Vec<String>),
    Values(Vec<String>),
}

impl AttributeElements {
    pub fn len(&self) -> usize {
        match self {
            AttributeElements::Uris(items) | AttributeElements::Values(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for AttributeElements {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeElements::Uris(a), AttributeElements::Uris(b))
            | (AttributeElements::Values(a), AttributeElements::Values(b)) => a == b,
            _ => self.is_empty() && other.is_empty(),
        }
    }
}

impl Eq for AttributeElements {}

impl Default for AttributeElements {
    fn default() -> Self {
        AttributeElements::Uris(Vec::new())
    }
}

/// Whether the listed elements are included or excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeFilterSelectionType {
    In,
    NotIn,
}

impl AttributeFilterSelectionType {
    pub fn is_negative(self) -> bool {
        matches!(self, AttributeFilterSelectionType::NotIn)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFilter {
    pub local_identifier: String,
    /// Always a display form; an untyped identifier implies that type
    pub display_form: ObjRef,
    pub negative_selection: bool,
    pub attribute_elements: AttributeElements,
}

/// Compare display form refs, treating an untyped identifier as a display form
fn same_display_form(a: &ObjRef, b: &ObjRef) -> bool {
    fn implied(obj_ref: &ObjRef) -> ObjRef {
        match obj_ref {
            ObjRef::Identifier {
                identifier,
                object_type: None,
            } => ObjRef::typed(identifier.clone(), ObjectType::DisplayForm),
            other => other.clone(),
        }
    }
    implied(a) == implied(b)
}

impl PartialEq for AttributeFilter {
    fn eq(&self, other: &Self) -> bool {
        self.local_identifier == other.local_identifier
            && same_display_form(&self.display_form, &other.display_form)
            && self.negative_selection == other.negative_selection
            && self.attribute_elements == other.attribute_elements
    }
}

impl Eq for AttributeFilter {}

impl AttributeFilter {
    /// A filter that selects everything (negative selection of nothing)
    pub fn select_all(local_identifier: impl Into<String>, display_form: ObjRef) -> Self {
        Self {
            local_identifier: local_identifier.into(),
            display_form,
            negative_selection: true,
            attribute_elements: AttributeElements::default(),
        }
    }
}

/// Saved filter context of a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContext {
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub obj_ref: Option<ObjRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_filter: DateFilter,
    #[serde(default)]
    pub attribute_filters: Vec<AttributeFilter>,
}

impl FilterContext {
    /// Copy of this context without server-assigned identity
    pub fn without_identity(&self) -> Self {
        Self {
            obj_ref: None,
            identifier: None,
            uri: None,
            ..self.clone()
        }
    }

    pub fn attribute_filter(&self, local_identifier: &str) -> Option<&AttributeFilter> {
        self.attribute_filters
            .iter()
            .find(|f| f.local_identifier == local_identifier)
    }

    pub fn attribute_filter_index(&self, local_identifier: &str) -> Option<usize> {
        self.attribute_filters
            .iter()
            .position(|f| f.local_identifier == local_identifier)
    }
}
