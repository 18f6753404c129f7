//! Drill target handler

use crate::command::{Command, CommandPayload};
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::handler::widget::insight_widget;
use crate::handler::{mismatched, CommandHandler, HandlerContext};
use crate::state::{DrillTargetsAction, SliceId};

/// Records the drill targets an insight widget offers
pub struct AddDrillTargetsHandler;

impl CommandHandler for AddDrillTargetsHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        &[SliceId::DrillTargets]
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::AddDrillTargets {
            widget_ref,
            available,
        } = &command.payload
        else {
            return Err(mismatched("AddDrillTargets", command));
        };

        let widget = insight_widget(cx.select(), widget_ref)?;

        cx.put(DrillTargetsAction::AddDrillTargets {
            widget_ref: widget.obj_ref.clone(),
            available: available.clone(),
        });
        cx.emit(EventPayload::DrillTargetsAdded {
            widget_ref: widget.obj_ref,
            available: available.clone(),
        });
        Ok(())
    }
}
