//! Widget header handlers

use crate::command::{Command, CommandPayload};
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::handler::{mismatched, CommandHandler, HandlerContext};
use crate::model::{InsightWidget, KpiWidget, Widget};
use crate::obj_ref::{ObjRef, Referenced};
use crate::state::{DashboardState, LayoutAction, SliceId};

const OWNS: &[SliceId] = &[SliceId::Layout];

/// Resolve `widget_ref` to an insight widget of the current layout
pub(crate) fn insight_widget(
    state: &DashboardState,
    widget_ref: &ObjRef,
) -> Result<InsightWidget, CommandError> {
    match state.layout.widgets().get(widget_ref) {
        Some(Widget::Insight(widget)) => Ok(widget.clone()),
        Some(Widget::Kpi(_)) => Err(CommandError::invalid(format!(
            "widget with ref {} is not an insight widget",
            widget_ref
        ))),
        None => Err(CommandError::invalid(format!(
            "cannot find insight widget with ref {}",
            widget_ref
        ))),
    }
}

fn kpi_widget(state: &DashboardState, widget_ref: &ObjRef) -> Result<KpiWidget, CommandError> {
    match state.layout.widgets().get(widget_ref) {
        Some(Widget::Kpi(widget)) => Ok(widget.clone()),
        Some(Widget::Insight(_)) => Err(CommandError::invalid(format!(
            "widget with ref {} is not a KPI widget",
            widget_ref
        ))),
        None => Err(CommandError::invalid(format!(
            "cannot find KPI widget with ref {}",
            widget_ref
        ))),
    }
}

pub struct ChangeInsightWidgetHeaderHandler;

impl CommandHandler for ChangeInsightWidgetHeaderHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::ChangeInsightWidgetHeader { widget_ref, header } = &command.payload
        else {
            return Err(mismatched("ChangeInsightWidgetHeader", command));
        };

        let mut widget = insight_widget(cx.select(), widget_ref)?;
        widget.title = header.title.clone().unwrap_or_default();
        let canonical_ref = widget.obj_ref.clone();

        cx.put(LayoutAction::ReplaceWidget {
            widget_ref: canonical_ref.clone(),
            widget: Widget::Insight(widget),
        });
        cx.emit(EventPayload::InsightWidgetHeaderChanged {
            widget_ref: canonical_ref,
            header: header.clone(),
        });
        Ok(())
    }
}

pub struct ChangeKpiWidgetHeaderHandler;

impl CommandHandler for ChangeKpiWidgetHeaderHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::ChangeKpiWidgetHeader { widget_ref, header } = &command.payload else {
            return Err(mismatched("ChangeKpiWidgetHeader", command));
        };

        let mut widget = kpi_widget(cx.select(), widget_ref)?;
        widget.title = header.title.clone().unwrap_or_default();
        let canonical_ref = widget.obj_ref.clone();

        cx.put(LayoutAction::ReplaceWidget {
            widget_ref: canonical_ref.clone(),
            widget: Widget::Kpi(widget),
        });
        cx.emit(EventPayload::KpiWidgetHeaderChanged {
            widget_ref: canonical_ref,
            header: header.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn loaded() -> DashboardState {
        let mut state = DashboardState::initial();
        state.layout.layout = fixtures::layout();
        state
    }

    #[test]
    fn test_kpi_is_not_an_insight() {
        let state = loaded();
        let kpi = fixtures::kpi_widget();

        let err = insight_widget(&state, kpi.obj_ref()).unwrap_err();
        assert!(err.message().contains("is not an insight widget"));
        assert!(kpi_widget(&state, kpi.obj_ref()).is_ok());
    }

    #[test]
    fn test_insight_resolves_by_identifier() {
        let state = loaded();
        let insight = fixtures::insight_widget();
        let by_id = ObjRef::id(insight.identifier().unwrap());

        assert_eq!(
            insight_widget(&state, &by_id).map(|w| w.obj_ref),
            Ok(insight.obj_ref().clone())
        );
        assert!(insight_widget(&state, &ObjRef::id("missing")).is_err());
    }
}
