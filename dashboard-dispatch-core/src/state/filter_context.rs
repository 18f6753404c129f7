//! Filter context slice

use crate::message::MessageSummary;
use crate::model::{AttributeElements, AttributeFilter, DateFilter, FilterContext};
use crate::obj_ref::ObjRef;
use crate::state::array::{add_array_elements, move_array_element, remove_array_element};
use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterContextState {
    pub filter_context: FilterContext,
}

impl FilterContextState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn date_filter(&self) -> &DateFilter {
        &self.filter_context.date_filter
    }

    pub fn attribute_filters(&self) -> &[AttributeFilter] {
        &self.filter_context.attribute_filters
    }

    pub fn attribute_filter(&self, local_identifier: &str) -> Option<&AttributeFilter> {
        self.filter_context.attribute_filter(local_identifier)
    }

    pub fn attribute_filter_by_display_form(&self, display_form: &ObjRef) -> Option<&AttributeFilter> {
        self.filter_context
            .attribute_filters
            .iter()
            .find(|f| &f.display_form == display_form)
    }
}

#[derive(Message, Clone, Debug)]
#[message(category = "filter_context")]
pub enum FilterContextAction {
    SetFilterContext(FilterContext),
    UpsertDateFilter(DateFilter),
    UpdateAttributeFilterSelection {
        filter_local_id: String,
        elements: AttributeElements,
        negative_selection: bool,
    },
    AddAttributeFilter {
        filter: AttributeFilter,
        index: isize,
    },
    RemoveAttributeFilters {
        filter_local_ids: Vec<String>,
    },
    MoveAttributeFilter {
        filter_local_id: String,
        index: isize,
    },
}

impl MessageSummary for FilterContextAction {
    fn summary(&self) -> String {
        match self {
            FilterContextAction::SetFilterContext(ctx) => format!(
                "SetFilterContext {{ attribute_filters: {} }}",
                ctx.attribute_filters.len()
            ),
            FilterContextAction::UpdateAttributeFilterSelection {
                filter_local_id,
                elements,
                negative_selection,
            } => format!(
                "UpdateAttributeFilterSelection {{ {}: {} elements, negative: {} }}",
                filter_local_id,
                elements.len(),
                negative_selection
            ),
            _ => format!("{:?}", self),
        }
    }
}

pub fn reduce(state: &mut FilterContextState, action: FilterContextAction) -> bool {
    let ctx = &mut state.filter_context;
    match action {
        FilterContextAction::SetFilterContext(filter_context) => {
            *ctx = filter_context;
            true
        }

        FilterContextAction::UpsertDateFilter(date_filter) => {
            if ctx.date_filter == date_filter {
                return false;
            }
            ctx.date_filter = date_filter;
            true
        }

        FilterContextAction::UpdateAttributeFilterSelection {
            filter_local_id,
            elements,
            negative_selection,
        } => {
            let Some(filter) = ctx
                .attribute_filters
                .iter_mut()
                .find(|f| f.local_identifier == filter_local_id)
            else {
                return false;
            };
            filter.attribute_elements = elements;
            filter.negative_selection = negative_selection;
            true
        }

        FilterContextAction::AddAttributeFilter { filter, index } => {
            add_array_elements(&mut ctx.attribute_filters, index, vec![filter]);
            true
        }

        FilterContextAction::RemoveAttributeFilters { filter_local_ids } => {
            let before = ctx.attribute_filters.len();
            for local_id in &filter_local_ids {
                if let Some(at) = ctx.attribute_filter_index(local_id) {
                    remove_array_element(&mut ctx.attribute_filters, at as isize);
                }
            }
            before != ctx.attribute_filters.len()
        }

        FilterContextAction::MoveAttributeFilter {
            filter_local_id,
            index,
        } => {
            let Some(from) = ctx.attribute_filter_index(&filter_local_id) else {
                return false;
            };
            move_array_element(&mut ctx.attribute_filters, from as isize, index);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateGranularity;

    fn state_with_filters(ids: &[&str]) -> FilterContextState {
        FilterContextState {
            filter_context: FilterContext {
                attribute_filters: ids
                    .iter()
                    .map(|id| AttributeFilter::select_all(*id, ObjRef::id(format!("label.{id}"))))
                    .collect(),
                ..Default::default()
            },
        }
    }

    fn ids(state: &FilterContextState) -> Vec<&str> {
        state
            .attribute_filters()
            .iter()
            .map(|f| f.local_identifier.as_str())
            .collect()
    }

    #[test]
    fn test_initial_is_all_time() {
        let state = FilterContextState::initial();
        assert!(state.date_filter().is_all_time());
        assert!(state.attribute_filters().is_empty());
    }

    #[test]
    fn test_upsert_date_filter_reports_change() {
        let mut state = FilterContextState::initial();
        let filter = DateFilter::Relative {
            granularity: DateGranularity::Month,
            from: -2,
            to: 0,
        };

        assert!(reduce(&mut state, FilterContextAction::UpsertDateFilter(filter.clone())));
        assert!(!reduce(&mut state, FilterContextAction::UpsertDateFilter(filter.clone())));
        assert_eq!(state.date_filter(), &filter);
    }

    #[test]
    fn test_add_remove_move_attribute_filters() {
        let mut state = state_with_filters(&["a", "b"]);

        reduce(
            &mut state,
            FilterContextAction::AddAttributeFilter {
                filter: AttributeFilter::select_all("c", ObjRef::id("label.c")),
                index: 0,
            },
        );
        assert_eq!(ids(&state), vec!["c", "a", "b"]);

        reduce(
            &mut state,
            FilterContextAction::MoveAttributeFilter {
                filter_local_id: "c".into(),
                index: -1,
            },
        );
        assert_eq!(ids(&state), vec!["a", "b", "c"]);

        assert!(reduce(
            &mut state,
            FilterContextAction::RemoveAttributeFilters {
                filter_local_ids: vec!["a".into(), "c".into()],
            },
        ));
        assert_eq!(ids(&state), vec!["b"]);

        assert!(!reduce(
            &mut state,
            FilterContextAction::RemoveAttributeFilters {
                filter_local_ids: vec!["zz".into()],
            },
        ));
    }

    #[test]
    fn test_update_selection() {
        let mut state = state_with_filters(&["a"]);
        let changed = reduce(
            &mut state,
            FilterContextAction::UpdateAttributeFilterSelection {
                filter_local_id: "a".into(),
                elements: AttributeElements::Values(vec!["East".into()]),
                negative_selection: false,
            },
        );

        assert!(changed);
        let filter = state.attribute_filter("a").unwrap();
        assert!(!filter.negative_selection);
        assert_eq!(
            filter.attribute_elements,
            AttributeElements::Values(vec!["East".into()])
        );
    }
}
