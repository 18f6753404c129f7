//! Dashboard load handler

use std::collections::HashSet;

use crate::command::{Command, CommandPayload};
use crate::error::CommandError;
use crate::event::EventPayload;
use crate::handler::{mismatched, CommandHandler, HandlerContext};
use crate::model::Dashboard;
use crate::obj_ref::{ObjRef, Referenced};
use crate::state::{
    CatalogAction, DrillTargetsAction, FilterContextAction, LayoutAction, SliceId, UserAction,
};

const OWNS: &[SliceId] = &[
    SliceId::Catalog,
    SliceId::FilterContext,
    SliceId::DrillTargets,
    SliceId::User,
    SliceId::Layout,
];

/// Whether `obj_ref` points at `dashboard` by its ref, uri or identifier
fn refers_to(dashboard: &Dashboard, obj_ref: &ObjRef) -> bool {
    if dashboard.obj_ref == *obj_ref {
        return true;
    }
    match obj_ref {
        ObjRef::Uri { uri } => !dashboard.uri.is_empty() && dashboard.uri == *uri,
        ObjRef::Identifier { identifier, .. } => {
            !dashboard.identifier.is_empty() && dashboard.identifier == *identifier
        }
    }
}

/// Initializes every slice from a dashboard snapshot
pub struct LoadDashboardHandler;

impl CommandHandler for LoadDashboardHandler {
    fn owned_slices(&self) -> &'static [SliceId] {
        OWNS
    }

    fn handle(&self, cx: &mut HandlerContext<'_>, command: &Command) -> Result<(), CommandError> {
        let CommandPayload::LoadDashboard(snapshot) = &command.payload else {
            return Err(mismatched("LoadDashboard", command));
        };
        let dashboard = &snapshot.dashboard;

        if let Some(expected) = cx.dashboard_context().dashboard() {
            if !refers_to(dashboard, expected) {
                return Err(CommandError::invalid(format!(
                    "snapshot holds dashboard {} but the session is bound to {}",
                    dashboard.obj_ref, expected
                )));
            }
        }

        let layout = dashboard.layout.clone().unwrap_or_default();
        let mut seen = HashSet::new();
        for widget in layout.sections.iter().flat_map(|s| s.items.iter()).map(|i| &i.widget) {
            if !seen.insert(widget.obj_ref().key()) {
                return Err(CommandError::invalid(format!(
                    "widget {} appears more than once in the layout",
                    widget.obj_ref()
                )));
            }
        }

        let filter_context = dashboard.filter_context.clone().unwrap_or_default();
        {
            let mut local_ids = HashSet::new();
            for filter in &filter_context.attribute_filters {
                if !local_ids.insert(filter.local_identifier.as_str()) {
                    return Err(CommandError::invalid(format!(
                        "attribute filter local identifier {} is not unique",
                        filter.local_identifier
                    )));
                }
            }
        }

        cx.put(CatalogAction::SetCatalog(snapshot.catalog.clone()));
        cx.put(UserAction::SetUser(snapshot.user.clone()));
        cx.put(FilterContextAction::SetFilterContext(filter_context));
        cx.put(LayoutAction::SetLayout(layout));
        cx.put(DrillTargetsAction::ResetDrillTargets);

        cx.emit(EventPayload::DashboardLoaded {
            dashboard: Box::new(dashboard.clone()),
        });
        Ok(())
    }
}
