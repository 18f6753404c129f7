//! Drill targets slice

use std::collections::HashMap;

use crate::message::MessageSummary;
use crate::model::AvailableDrillTargets;
use crate::obj_ref::ObjRef;
use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDrillTargets {
    pub widget_ref: ObjRef,
    pub available: AvailableDrillTargets,
}

/// Drill targets per insight widget, keyed by the widget's reference key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrillTargetsState {
    targets: HashMap<String, WidgetDrillTargets>,
}

impl DrillTargetsState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn for_widget(&self, widget_ref: &ObjRef) -> Option<&WidgetDrillTargets> {
        self.targets.get(&widget_ref.key())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Message, Clone, Debug)]
#[message(category = "drill_targets")]
pub enum DrillTargetsAction {
    AddDrillTargets {
        widget_ref: ObjRef,
        available: AvailableDrillTargets,
    },
    ClearDrillTargets {
        widget_ref: ObjRef,
    },
    ResetDrillTargets,
}

impl MessageSummary for DrillTargetsAction {}

pub fn reduce(state: &mut DrillTargetsState, action: DrillTargetsAction) -> bool {
    match action {
        DrillTargetsAction::AddDrillTargets {
            widget_ref,
            available,
        } => {
            let entry = WidgetDrillTargets {
                widget_ref: widget_ref.clone(),
                available,
            };
            state.targets.insert(widget_ref.key(), entry);
            true
        }
        DrillTargetsAction::ClearDrillTargets { widget_ref } => {
            state.targets.remove(&widget_ref.key()).is_some()
        }
        DrillTargetsAction::ResetDrillTargets => {
            let changed = !state.targets.is_empty();
            state.targets.clear();
            changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_and_clear_removes() {
        let mut state = DrillTargetsState::initial();
        let widget = ObjRef::id("widget.1");

        reduce(
            &mut state,
            DrillTargetsAction::AddDrillTargets {
                widget_ref: widget.clone(),
                available: AvailableDrillTargets {
                    measures: vec![ObjRef::id("m1")],
                    attributes: vec![],
                },
            },
        );
        reduce(
            &mut state,
            DrillTargetsAction::AddDrillTargets {
                widget_ref: widget.clone(),
                available: AvailableDrillTargets {
                    measures: vec![ObjRef::id("m2")],
                    attributes: vec![ObjRef::id("a1")],
                },
            },
        );

        assert_eq!(state.len(), 1);
        let targets = state.for_widget(&widget).unwrap();
        assert_eq!(targets.available.measures, vec![ObjRef::id("m2")]);

        assert!(reduce(
            &mut state,
            DrillTargetsAction::ClearDrillTargets {
                widget_ref: widget.clone()
            }
        ));
        assert!(state.is_empty());
        assert!(!reduce(
            &mut state,
            DrillTargetsAction::ClearDrillTargets { widget_ref: widget }
        ));
    }

    #[test]
    fn test_reset() {
        let mut state = DrillTargetsState::initial();
        assert!(!reduce(&mut state, DrillTargetsAction::ResetDrillTargets));

        reduce(
            &mut state,
            DrillTargetsAction::AddDrillTargets {
                widget_ref: ObjRef::id("widget.1"),
                available: AvailableDrillTargets::default(),
            },
        );
        assert!(reduce(&mut state, DrillTargetsAction::ResetDrillTargets));
        assert!(state.is_empty());
    }
}
