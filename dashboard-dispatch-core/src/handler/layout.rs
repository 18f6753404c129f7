//! Layout section and item handlers

use std::collections::HashSet;

use crate::command::{Command, CommandPayload};
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::handler::{element_index, insert_index, mismatched, CommandHandler, HandlerContext};
use crate::model::{LayoutItem, LayoutSection};
use crate::obj_ref::Referenced;
use crate::state::{DashboardState, LayoutAction, SliceId};

const OWNS: &[SliceId] = &[SliceId::Layout];

fn section<'s>(state: &'s DashboardState, index: usize) -> Result<&'s LayoutSection, CommandError> {
    state.layout.section(index).ok_or_else(|| {
        CommandError::invalid(format!(
            "section index {} does not address an existing section, there are {}",
            index,
            state.layout.sections().len()
        ))
    })
}

/// New items must not place a widget that is already on the dashboard
fn validate_new_items(state: &DashboardState, items: &[LayoutItem]) -> Result<(), CommandError> {
    let existing = state.layout.widgets();
    let mut seen = HashSet::new();
    for item in items {
        let widget_ref = item.widget.obj_ref();
        if existing.contains(widget_ref) || !seen.insert(widget_ref.key()) {
            return Err(CommandError::invalid(format!(
                "widget {} is already placed on the dashboard",
                widget_ref
            )));
        }
    }
    Ok(())
}

pub struct AddLayoutSectionHandler;

impl CommandHandler for AddLayoutSectionHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::AddLayoutSection {
            index,
            initial_header,
            initial_items,
        } = &command.payload
        else {
            return Err(mismatched("AddLayoutSection", command));
        };

        let at = insert_index(cx.select().layout.sections().len(), *index, "section")?;
        validate_new_items(cx.select(), initial_items)?;

        let section = LayoutSection {
            header: initial_header.clone(),
            items: initial_items.clone(),
        };
        cx.put(LayoutAction::AddSection {
            index: at as isize,
            section: section.clone(),
        });
        cx.emit(EventPayload::LayoutSectionAdded { section, index: at });
        Ok(())
    }
}

pub struct RemoveLayoutSectionHandler;

impl CommandHandler for RemoveLayoutSectionHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::RemoveLayoutSection { index } = &command.payload else {
            return Err(mismatched("RemoveLayoutSection", command));
        };

        let sections = cx.select().layout.sections();
        let at = element_index(sections.len(), *index, "section")?;
        let section = sections[at].clone();

        cx.put(LayoutAction::RemoveSection { index: at as isize });
        cx.emit(EventPayload::LayoutSectionRemoved { section, index: at });
        Ok(())
    }
}

pub struct MoveLayoutSectionHandler;

impl CommandHandler for MoveLayoutSectionHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::MoveLayoutSection {
            section_index,
            to_index,
        } = &command.payload
        else {
            return Err(mismatched("MoveLayoutSection", command));
        };

        let sections = cx.select().layout.sections();
        let from_index = element_index(sections.len(), *section_index, "section")?;
        let to_index = insert_index(sections.len() - 1, *to_index, "section")?;
        let section = sections[from_index].clone();

        cx.put(LayoutAction::MoveSection {
            section_index: from_index as isize,
            to_index: to_index as isize,
        });
        cx.emit(EventPayload::LayoutSectionMoved {
            section,
            from_index,
            to_index,
        });
        Ok(())
    }
}

pub struct ChangeLayoutSectionHeaderHandler;

impl CommandHandler for ChangeLayoutSectionHeaderHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::ChangeLayoutSectionHeader {
            index,
            header,
            merge,
        } = &command.payload
        else {
            return Err(mismatched("ChangeLayoutSectionHeader", command));
        };

        let current = section(cx.select(), *index)?;
        let new_header = match (&current.header, merge) {
            (Some(existing), true) => existing.merged_with(header),
            _ => header.clone(),
        };

        cx.put(LayoutAction::ChangeSectionHeader {
            index: *index,
            header: new_header.clone(),
        });
        cx.emit(EventPayload::LayoutSectionHeaderChanged {
            new_header,
            section_index: *index,
        });
        Ok(())
    }
}

pub struct AddSectionItemsHandler;

impl CommandHandler for AddSectionItemsHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::AddSectionItems {
            section_index,
            item_index,
            items,
        } = &command.payload
        else {
            return Err(mismatched("AddSectionItems", command));
        };

        if items.is_empty() {
            return Err(CommandError::invalid("no items to add"));
        }
        let target = section(cx.select(), *section_index)?;
        let start_index = insert_index(target.items.len(), *item_index, "item")?;
        validate_new_items(cx.select(), items)?;

        cx.put(LayoutAction::AddSectionItems {
            section_index: *section_index,
            item_index: start_index as isize,
            items: items.clone(),
        });
        cx.emit(EventPayload::LayoutSectionItemsAdded {
            section_index: *section_index,
            start_index,
            items_added: items.clone(),
        });
        Ok(())
    }
}

pub struct RemoveSectionItemHandler;

impl CommandHandler for RemoveSectionItemHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::RemoveSectionItem {
            section_index,
            item_index,
        } = &command.payload
        else {
            return Err(mismatched("RemoveSectionItem", command));
        };

        let target = section(cx.select(), *section_index)?;
        let at = element_index(target.items.len(), *item_index, "item")?;
        let item = target.items[at].clone();

        cx.put(LayoutAction::RemoveSectionItem {
            section_index: *section_index,
            item_index: at as isize,
        });
        cx.emit(EventPayload::LayoutSectionItemRemoved {
            item,
            section_index: *section_index,
            item_index: at,
        });
        Ok(())
    }
}

pub struct MoveSectionItemHandler;

impl CommandHandler for MoveSectionItemHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::MoveSectionItem {
            section_index,
            item_index,
            to_section_index,
            to_item_index,
        } = &command.payload
        else {
            return Err(mismatched("MoveSectionItem", command));
        };

        let source = section(cx.select(), *section_index)?;
        let from_index = element_index(source.items.len(), *item_index, "item")?;
        let item = source.items[from_index].clone();

        let target = section(cx.select(), *to_section_index)?;
        // within one section the target index applies after removal
        let target_len = if section_index == to_section_index {
            target.items.len() - 1
        } else {
            target.items.len()
        };
        let to_index = insert_index(target_len, *to_item_index, "item")?;

        cx.put(LayoutAction::MoveSectionItem {
            section_index: *section_index,
            item_index: from_index as isize,
            to_section_index: *to_section_index,
            to_item_index: to_index as isize,
        });
        cx.emit(EventPayload::LayoutSectionItemMoved {
            item,
            from_section_index: *section_index,
            to_section_index: *to_section_index,
            from_index,
            to_index,
        });
        Ok(())
    }
}
