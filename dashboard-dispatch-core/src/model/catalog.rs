//! Catalog of attributes, date datasets and measures available to a dashboard

use serde::{Deserialize, Serialize};

use crate::obj_ref::{ObjRef, ObjectType, Referenced};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayForm {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    pub attribute: ObjRef,
}

impl Referenced for DisplayForm {
    fn obj_ref(&self) -> &ObjRef {
        &self.obj_ref
    }

    fn uri(&self) -> Option<&str> {
        (!self.uri.is_empty()).then_some(self.uri.as_str())
    }

    fn identifier(&self) -> Option<&str> {
        (!self.identifier.is_empty()).then_some(self.identifier.as_str())
    }

    fn object_type(&self) -> Option<ObjectType> {
        Some(ObjectType::DisplayForm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAttribute {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    pub default_display_form: DisplayForm,
    #[serde(default)]
    pub display_forms: Vec<DisplayForm>,
}

impl CatalogAttribute {
    /// Default display form first, then the remaining ones
    pub fn all_display_forms(&self) -> impl Iterator<Item = &DisplayForm> {
        std::iter::once(&self.default_display_form).chain(
            self.display_forms
                .iter()
                .filter(move |df| df.obj_ref != self.default_display_form.obj_ref),
        )
    }
}

impl Referenced for CatalogAttribute {
    fn obj_ref(&self) -> &ObjRef {
        &self.obj_ref
    }

    fn uri(&self) -> Option<&str> {
        (!self.uri.is_empty()).then_some(self.uri.as_str())
    }

    fn identifier(&self) -> Option<&str> {
        (!self.identifier.is_empty()).then_some(self.identifier.as_str())
    }

    fn object_type(&self) -> Option<ObjectType> {
        Some(ObjectType::Attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDateDataset {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
}

impl Referenced for CatalogDateDataset {
    fn obj_ref(&self) -> &ObjRef {
        &self.obj_ref
    }

    fn identifier(&self) -> Option<&str> {
        (!self.identifier.is_empty()).then_some(self.identifier.as_str())
    }

    fn object_type(&self) -> Option<ObjectType> {
        Some(ObjectType::DataSet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeasure {
    #[serde(rename = "ref")]
    pub obj_ref: ObjRef,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
}

impl Referenced for CatalogMeasure {
    fn obj_ref(&self) -> &ObjRef {
        &self.obj_ref
    }

    fn identifier(&self) -> Option<&str> {
        (!self.identifier.is_empty()).then_some(self.identifier.as_str())
    }

    fn object_type(&self) -> Option<ObjectType> {
        Some(ObjectType::Measure)
    }
}

/// Catalog items as loaded from the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub attributes: Vec<CatalogAttribute>,
    #[serde(default)]
    pub date_datasets: Vec<CatalogDateDataset>,
    #[serde(default)]
    pub measures: Vec<CatalogMeasure>,
}
