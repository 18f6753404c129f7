//! Catalog slice

use crate::message::MessageSummary;
use crate::model::{
    Catalog, CatalogAttribute, CatalogDateDataset, CatalogMeasure, DisplayForm,
};
use crate::obj_ref::{ObjRef, ObjRefMap};
use crate::Message;

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub attributes: Vec<CatalogAttribute>,
    pub date_datasets: Vec<CatalogDateDataset>,
    pub measures: Vec<CatalogMeasure>,
    pub loaded: bool,
    display_forms: ObjRefMap<DisplayForm>,
    attribute_index: ObjRefMap<CatalogAttribute>,
    date_dataset_index: ObjRefMap<CatalogDateDataset>,
}

impl CatalogState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn display_form(&self, obj_ref: &ObjRef) -> Option<&DisplayForm> {
        self.display_forms.get(obj_ref)
    }

    pub fn attribute_for_display_form(&self, obj_ref: &ObjRef) -> Option<&CatalogAttribute> {
        let display_form = self.display_form(obj_ref)?;
        self.attribute_index.get(&display_form.attribute)
    }

    pub fn date_dataset(&self, obj_ref: &ObjRef) -> Option<&CatalogDateDataset> {
        self.date_dataset_index.get(obj_ref)
    }

    fn set(&mut self, catalog: Catalog) {
        self.display_forms = catalog
            .attributes
            .iter()
            .flat_map(|a| a.all_display_forms().cloned())
            .collect();
        self.attribute_index = catalog.attributes.iter().cloned().collect();
        self.date_dataset_index = catalog.date_datasets.iter().cloned().collect();
        self.attributes = catalog.attributes;
        self.date_datasets = catalog.date_datasets;
        self.measures = catalog.measures;
        self.loaded = true;
    }
}

#[derive(Message, Clone, Debug)]
#[message(category = "catalog")]
pub enum CatalogAction {
    SetCatalog(Catalog),
    ClearCatalog,
}

impl MessageSummary for CatalogAction {
    fn summary(&self) -> String {
        match self {
            CatalogAction::SetCatalog(catalog) => format!(
                "SetCatalog {{ attributes: {}, date_datasets: {}, measures: {} }}",
                catalog.attributes.len(),
                catalog.date_datasets.len(),
                catalog.measures.len()
            ),
            CatalogAction::ClearCatalog => "ClearCatalog".to_string(),
        }
    }
}

pub fn reduce(state: &mut CatalogState, action: CatalogAction) -> bool {
    match action {
        CatalogAction::SetCatalog(catalog) => {
            state.set(catalog);
            true
        }
        CatalogAction::ClearCatalog => {
            if !state.loaded {
                return false;
            }
            *state = CatalogState::initial();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_set_catalog_indexes_display_forms() {
        let mut state = CatalogState::initial();
        assert!(!state.loaded);

        assert!(reduce(&mut state, CatalogAction::SetCatalog(fixtures::catalog())));
        assert!(state.loaded);

        let region = fixtures::region_display_form();
        let by_uri = state.display_form(&ObjRef::uri(region.uri.clone())).unwrap();
        let by_id = state.display_form(&ObjRef::id(region.identifier.clone())).unwrap();
        assert_eq!(by_uri, by_id);
        assert_eq!(
            state
                .attribute_for_display_form(&region.obj_ref)
                .map(|a| a.title.as_str()),
            Some("Region")
        );
    }

    #[test]
    fn test_attribute_resolves_through_either_ref_form() {
        let mut catalog = fixtures::catalog();
        let region = &mut catalog.attributes[0];
        region.default_display_form.attribute = ObjRef::id(region.identifier.clone());

        let mut state = CatalogState::initial();
        reduce(&mut state, CatalogAction::SetCatalog(catalog));

        let attribute = state
            .attribute_for_display_form(&fixtures::region_display_form().obj_ref)
            .unwrap();
        assert_eq!(attribute.title, "Region");
        assert!(attribute.obj_ref.is_uri());
    }

    #[test]
    fn test_clear_catalog() {
        let mut state = CatalogState::initial();
        assert!(!reduce(&mut state, CatalogAction::ClearCatalog));

        reduce(&mut state, CatalogAction::SetCatalog(fixtures::catalog()));
        assert!(reduce(&mut state, CatalogAction::ClearCatalog));
        assert!(state.attributes.is_empty());
        assert!(state
            .display_form(&fixtures::region_display_form().obj_ref)
            .is_none());
    }
}
