//! Filter context handlers

use crate::command::{Command, CommandPayload, DateBound, DateFilterKind, DateFilterSelection};
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::handler::{insert_index, mismatched, CommandHandler, HandlerContext};
use crate::model::{AttributeFilter, DateFilter};
use crate::state::{FilterContextAction, SliceId};

const OWNS: &[SliceId] = &[SliceId::FilterContext];

/// Turn a requested selection into the stored date filter.
///
/// A relative selection without bounds is "all time", which is stored as
/// [`DateFilter::AllTime`] rather than as an unbounded relative filter.
pub fn canonical_date_filter(selection: &DateFilterSelection) -> Result<DateFilter, CommandError> {
    match (selection.kind, &selection.from, &selection.to) {
        (DateFilterKind::Relative, None, None) => Ok(DateFilter::AllTime),
        (DateFilterKind::Relative, Some(DateBound::Offset(from)), Some(DateBound::Offset(to))) => {
            Ok(DateFilter::Relative {
                granularity: selection.granularity,
                from: *from,
                to: *to,
            })
        }
        (DateFilterKind::Relative, _, _) => Err(CommandError::invalid(
            "relative date filter needs numeric from and to offsets, or neither",
        )),
        (DateFilterKind::Absolute, Some(DateBound::Date(from)), Some(DateBound::Date(to))) => {
            Ok(DateFilter::Absolute {
                from: from.clone(),
                to: to.clone(),
            })
        }
        (DateFilterKind::Absolute, _, _) => Err(CommandError::invalid(
            "absolute date filter needs both from and to dates",
        )),
    }
}

fn emit_filter_context_changed(cx: &mut HandlerContext<'_>) {
    let filter_context = cx.select().filter_context.filter_context.clone();
    cx.emit(EventPayload::FilterContextChanged { filter_context });
}

fn filter_not_found(local_id: &str) -> CommandError {
    CommandError::invalid(format!(
        "attribute filter with local identifier {} not found",
        local_id
    ))
}

pub struct ChangeDateFilterSelectionHandler;

impl CommandHandler for ChangeDateFilterSelectionHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::ChangeDateFilterSelection(selection) = &command.payload else {
            return Err(mismatched("ChangeDateFilterSelection", command));
        };

        let filter = canonical_date_filter(selection)?;
        cx.put(FilterContextAction::UpsertDateFilter(filter.clone()));
        cx.emit(EventPayload::DateFilterChanged { filter });
        emit_filter_context_changed(cx);
        Ok(())
    }
}

pub struct ChangeAttributeFilterSelectionHandler;

impl CommandHandler for ChangeAttributeFilterSelectionHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::ChangeAttributeFilterSelection {
            filter_local_id,
            elements,
            selection_type,
        } = &command.payload
        else {
            return Err(mismatched("ChangeAttributeFilterSelection", command));
        };

        if cx.select().filter_context.attribute_filter(filter_local_id).is_none() {
            return Err(filter_not_found(filter_local_id));
        }

        cx.put(FilterContextAction::UpdateAttributeFilterSelection {
            filter_local_id: filter_local_id.clone(),
            elements: elements.clone(),
            negative_selection: selection_type.is_negative(),
        });

        let filter = cx
            .select()
            .filter_context
            .attribute_filter(filter_local_id)
            .cloned()
            .ok_or_else(|| filter_not_found(filter_local_id))?;
        cx.emit(EventPayload::AttributeFilterSelectionChanged { filter });
        emit_filter_context_changed(cx);
        Ok(())
    }
}

pub struct AddAttributeFilterHandler;

impl CommandHandler for AddAttributeFilterHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::AddAttributeFilter {
            display_form,
            index,
            initial_selection,
            initial_is_negative_selection,
        } = &command.payload
        else {
            return Err(mismatched("AddAttributeFilter", command));
        };

        let state = cx.select();
        let Some(attribute) = state.catalog.attribute_for_display_form(display_form) else {
            return Err(CommandError::invalid(format!(
                "display form {} does not exist in the catalog",
                display_form
            )));
        };

        // one filter per attribute, whichever display form the existing one uses
        let duplicate = state.filter_context.attribute_filters().iter().any(|f| {
            state
                .catalog
                .attribute_for_display_form(&f.display_form)
                .is_some_and(|a| a.obj_ref == attribute.obj_ref)
        });
        if duplicate {
            return Err(CommandError::invalid(format!(
                "filter for attribute {} already exists",
                attribute.title
            )));
        }

        let at = insert_index(state.filter_context.attribute_filters().len(), *index, "filter")?;

        let filter = match initial_selection {
            Some(elements) => AttributeFilter {
                local_identifier: new_local_identifier(),
                display_form: display_form.clone(),
                negative_selection: *initial_is_negative_selection,
                attribute_elements: elements.clone(),
            },
            None => AttributeFilter::select_all(new_local_identifier(), display_form.clone()),
        };

        cx.put(FilterContextAction::AddAttributeFilter {
            filter: filter.clone(),
            index: at as isize,
        });
        cx.emit(EventPayload::AttributeFilterAdded {
            added: filter,
            index: at,
        });
        emit_filter_context_changed(cx);
        Ok(())
    }
}

fn new_local_identifier() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub struct RemoveAttributeFiltersHandler;

impl CommandHandler for RemoveAttributeFiltersHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::RemoveAttributeFilters { filter_local_ids } = &command.payload else {
            return Err(mismatched("RemoveAttributeFilters", command));
        };

        if filter_local_ids.is_empty() {
            return Err(CommandError::invalid("no attribute filters to remove"));
        }

        let mut unique: Vec<String> = Vec::with_capacity(filter_local_ids.len());
        for id in filter_local_ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let removed = unique
            .iter()
            .map(|id| {
                cx.select()
                    .filter_context
                    .attribute_filter(id)
                    .cloned()
                    .ok_or_else(|| filter_not_found(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        cx.put(FilterContextAction::RemoveAttributeFilters {
            filter_local_ids: unique,
        });
        cx.emit(EventPayload::AttributeFiltersRemoved { removed });
        emit_filter_context_changed(cx);
        Ok(())
    }
}

pub struct MoveAttributeFilterHandler;

impl CommandHandler for MoveAttributeFilterHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::MoveAttributeFilter {
            filter_local_id,
            index,
        } = &command.payload
        else {
            return Err(mismatched("MoveAttributeFilter", command));
        };

        let filters = &cx.select().filter_context.filter_context;
        let Some(from_index) = filters.attribute_filter_index(filter_local_id) else {
            return Err(filter_not_found(filter_local_id));
        };
        let moved = filters.attribute_filters[from_index].clone();
        let to_index = insert_index(filters.attribute_filters.len() - 1, *index, "filter")?;

        cx.put(FilterContextAction::MoveAttributeFilter {
            filter_local_id: filter_local_id.clone(),
            index: to_index as isize,
        });
        cx.emit(EventPayload::AttributeFilterMoved {
            moved,
            from_index,
            to_index,
        });
        emit_filter_context_changed(cx);
        Ok(())
    }
}
