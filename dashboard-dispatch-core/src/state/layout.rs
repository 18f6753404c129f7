//! Layout slice: sections of items, each item holding a widget

use crate::message::MessageSummary;
use crate::model::{DashboardLayout, LayoutItem, LayoutSection, SectionHeader, Widget};
use crate::obj_ref::{ObjRef, ObjRefMap};
use crate::state::array::{add_array_elements, move_array_element, remove_array_element};
use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutState {
    pub layout: DashboardLayout,
}

impl LayoutState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[LayoutSection] {
        &self.layout.sections
    }

    pub fn section(&self, index: usize) -> Option<&LayoutSection> {
        self.layout.sections.get(index)
    }

    /// Widgets of the current layout, keyed by reference
    pub fn widgets(&self) -> ObjRefMap<Widget> {
        self.layout.widgets()
    }
}

#[derive(Message, Clone, Debug)]
#[message(category = "layout")]
pub enum LayoutAction {
    SetLayout(DashboardLayout),
    AddSection {
        index: isize,
        section: LayoutSection,
    },
    RemoveSection {
        index: isize,
    },
    MoveSection {
        section_index: isize,
        to_index: isize,
    },
    ChangeSectionHeader {
        index: usize,
        header: SectionHeader,
    },
    AddSectionItems {
        section_index: usize,
        item_index: isize,
        items: Vec<LayoutItem>,
    },
    RemoveSectionItem {
        section_index: usize,
        item_index: isize,
    },
    MoveSectionItem {
        section_index: usize,
        item_index: isize,
        to_section_index: usize,
        to_item_index: isize,
    },
    ReplaceWidget {
        widget_ref: ObjRef,
        widget: Widget,
    },
}

impl MessageSummary for LayoutAction {
    fn summary(&self) -> String {
        match self {
            LayoutAction::SetLayout(layout) => {
                format!("SetLayout {{ sections: {} }}", layout.sections.len())
            }
            LayoutAction::AddSection { index, section } => format!(
                "AddSection {{ index: {}, items: {} }}",
                index,
                section.items.len()
            ),
            LayoutAction::AddSectionItems {
                section_index,
                item_index,
                items,
            } => format!(
                "AddSectionItems {{ section: {}, index: {}, items: {} }}",
                section_index,
                item_index,
                items.len()
            ),
            LayoutAction::ReplaceWidget { widget_ref, .. } => {
                format!("ReplaceWidget {{ widget: {} }}", widget_ref)
            }
            _ => format!("{:?}", self),
        }
    }
}

fn section_items(state: &mut LayoutState, index: usize) -> &mut Vec<LayoutItem> {
    let len = state.layout.sections.len();
    match state.layout.sections.get_mut(index) {
        Some(section) => &mut section.items,
        None => panic!("layout section {} out of range for length {}", index, len),
    }
}

pub fn reduce(state: &mut LayoutState, action: LayoutAction) -> bool {
    match action {
        LayoutAction::SetLayout(layout) => {
            state.layout = layout;
            true
        }

        LayoutAction::AddSection { index, section } => {
            add_array_elements(&mut state.layout.sections, index, vec![section]);
            true
        }

        LayoutAction::RemoveSection { index } => {
            remove_array_element(&mut state.layout.sections, index);
            true
        }

        LayoutAction::MoveSection {
            section_index,
            to_index,
        } => {
            move_array_element(&mut state.layout.sections, section_index, to_index);
            true
        }

        LayoutAction::ChangeSectionHeader { index, header } => {
            let len = state.layout.sections.len();
            let Some(section) = state.layout.sections.get_mut(index) else {
                panic!("layout section {} out of range for length {}", index, len);
            };
            if section.header.as_ref() == Some(&header) {
                return false;
            }
            section.header = Some(header);
            true
        }

        LayoutAction::AddSectionItems {
            section_index,
            item_index,
            items,
        } => {
            add_array_elements(section_items(state, section_index), item_index, items);
            true
        }

        LayoutAction::RemoveSectionItem {
            section_index,
            item_index,
        } => {
            remove_array_element(section_items(state, section_index), item_index);
            true
        }

        LayoutAction::MoveSectionItem {
            section_index,
            item_index,
            to_section_index,
            to_item_index,
        } => {
            if section_index == to_section_index {
                move_array_element(section_items(state, section_index), item_index, to_item_index);
            } else {
                // validate the target before taking the item out
                section_items(state, to_section_index);
                let item = remove_array_element(section_items(state, section_index), item_index);
                add_array_elements(section_items(state, to_section_index), to_item_index, vec![item]);
            }
            true
        }

        LayoutAction::ReplaceWidget { widget_ref, widget } => {
            let Some((si, ii)) = state.layout.widget_position(&widget_ref) else {
                return false;
            };
            let slot = &mut state.layout.sections[si].items[ii].widget;
            if *slot == widget {
                return false;
            }
            *slot = widget;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj_ref::Referenced;
    use crate::testing::fixtures;

    fn titles(state: &LayoutState, section: usize) -> Vec<String> {
        state.layout.sections[section]
            .items
            .iter()
            .map(|i| i.widget.title().to_string())
            .collect()
    }

    fn loaded() -> LayoutState {
        let mut state = LayoutState::initial();
        reduce(&mut state, LayoutAction::SetLayout(fixtures::layout()));
        state
    }

    #[test]
    fn test_add_and_remove_sections() {
        let mut state = loaded();
        let count = state.sections().len();

        reduce(
            &mut state,
            LayoutAction::AddSection {
                index: 0,
                section: LayoutSection {
                    header: Some(SectionHeader {
                        title: Some("First".into()),
                        description: None,
                    }),
                    items: vec![],
                },
            },
        );
        assert_eq!(state.sections().len(), count + 1);
        assert_eq!(
            state.section(0).and_then(|s| s.header.as_ref()).and_then(|h| h.title.as_deref()),
            Some("First")
        );

        reduce(&mut state, LayoutAction::RemoveSection { index: 0 });
        assert_eq!(state.sections().len(), count);
    }

    #[test]
    fn test_move_item_within_section() {
        let mut state = loaded();
        let before = titles(&state, 0);

        reduce(
            &mut state,
            LayoutAction::MoveSectionItem {
                section_index: 0,
                item_index: 0,
                to_section_index: 0,
                to_item_index: -1,
            },
        );

        let after = titles(&state, 0);
        assert_eq!(after.last(), before.first());
        assert_eq!(after.len(), before.len());
    }

    #[test]
    fn test_move_item_across_sections() {
        let mut state = loaded();
        let moved = state.layout.sections[0].items[0].widget.clone();
        let second_len = state.layout.sections[1].items.len();

        reduce(
            &mut state,
            LayoutAction::MoveSectionItem {
                section_index: 0,
                item_index: 0,
                to_section_index: 1,
                to_item_index: 0,
            },
        );

        assert_eq!(state.layout.sections[1].items.len(), second_len + 1);
        assert_eq!(state.layout.sections[1].items[0].widget, moved);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_section_panics() {
        let mut state = loaded();
        reduce(
            &mut state,
            LayoutAction::RemoveSectionItem {
                section_index: 42,
                item_index: 0,
            },
        );
    }

    #[test]
    fn test_replace_widget() {
        let mut state = loaded();
        let kpi = fixtures::kpi_widget();
        let mut changed = kpi.clone();
        if let Widget::Kpi(ref mut w) = changed {
            w.title = "Renamed".into();
        }

        assert!(reduce(
            &mut state,
            LayoutAction::ReplaceWidget {
                widget_ref: kpi.obj_ref().clone(),
                widget: changed.clone(),
            }
        ));
        assert_eq!(
            state.widgets().get(kpi.obj_ref()).map(|w| w.title()),
            Some("Renamed")
        );
        assert!(!reduce(
            &mut state,
            LayoutAction::ReplaceWidget {
                widget_ref: kpi.obj_ref().clone(),
                widget: changed,
            }
        ));
    }
}
