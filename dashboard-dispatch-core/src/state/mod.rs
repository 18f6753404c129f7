//! Normalized dashboard state, split into independently owned slices
//!
//! Each slice has an explicit initial state and a pure reducer
//! `fn(&mut SliceState, SliceAction) -> bool` returning whether anything
//! changed. [`DashboardState`] aggregates the slices and [`reduce`] routes a
//! [`SliceAction`] to the owning slice.

pub mod array;
pub mod catalog;
pub mod drill_targets;
pub mod filter_context;
pub mod layout;
pub mod user;

use std::fmt;

use crate::message::{Message, MessageSummary};

pub use catalog::{CatalogAction, CatalogState};
pub use drill_targets::{DrillTargetsAction, DrillTargetsState, WidgetDrillTargets};
pub use filter_context::{FilterContextAction, FilterContextState};
pub use layout::{LayoutAction, LayoutState};
pub use user::{UserAction, UserState};

/// Identifies a state slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SliceId {
    Catalog,
    FilterContext,
    DrillTargets,
    User,
    Layout,
}

impl SliceId {
    pub fn name(self) -> &'static str {
        match self {
            SliceId::Catalog => "catalog",
            SliceId::FilterContext => "filterContext",
            SliceId::DrillTargets => "drillTargets",
            SliceId::User => "user",
            SliceId::Layout => "layout",
        }
    }
}

impl fmt::Display for SliceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A write to exactly one slice
#[derive(Clone, Debug)]
pub enum SliceAction {
    Catalog(CatalogAction),
    FilterContext(FilterContextAction),
    DrillTargets(DrillTargetsAction),
    User(UserAction),
    Layout(LayoutAction),
}

impl SliceAction {
    pub fn slice(&self) -> SliceId {
        match self {
            SliceAction::Catalog(_) => SliceId::Catalog,
            SliceAction::FilterContext(_) => SliceId::FilterContext,
            SliceAction::DrillTargets(_) => SliceId::DrillTargets,
            SliceAction::User(_) => SliceId::User,
            SliceAction::Layout(_) => SliceId::Layout,
        }
    }
}

impl Message for SliceAction {
    fn name(&self) -> &'static str {
        match self {
            SliceAction::Catalog(a) => a.name(),
            SliceAction::FilterContext(a) => a.name(),
            SliceAction::DrillTargets(a) => a.name(),
            SliceAction::User(a) => a.name(),
            SliceAction::Layout(a) => a.name(),
        }
    }

    fn category(&self) -> Option<&'static str> {
        match self {
            SliceAction::Catalog(a) => a.category(),
            SliceAction::FilterContext(a) => a.category(),
            SliceAction::DrillTargets(a) => a.category(),
            SliceAction::User(a) => a.category(),
            SliceAction::Layout(a) => a.category(),
        }
    }
}

impl MessageSummary for SliceAction {
    fn summary(&self) -> String {
        match self {
            SliceAction::Catalog(a) => a.summary(),
            SliceAction::FilterContext(a) => a.summary(),
            SliceAction::DrillTargets(a) => a.summary(),
            SliceAction::User(a) => a.summary(),
            SliceAction::Layout(a) => a.summary(),
        }
    }
}

impl From<CatalogAction> for SliceAction {
    fn from(action: CatalogAction) -> Self {
        SliceAction::Catalog(action)
    }
}

impl From<FilterContextAction> for SliceAction {
    fn from(action: FilterContextAction) -> Self {
        SliceAction::FilterContext(action)
    }
}

impl From<DrillTargetsAction> for SliceAction {
    fn from(action: DrillTargetsAction) -> Self {
        SliceAction::DrillTargets(action)
    }
}

impl From<UserAction> for SliceAction {
    fn from(action: UserAction) -> Self {
        SliceAction::User(action)
    }
}

impl From<LayoutAction> for SliceAction {
    fn from(action: LayoutAction) -> Self {
        SliceAction::Layout(action)
    }
}

/// The whole state tree of one dashboard session
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub catalog: CatalogState,
    pub filter_context: FilterContextState,
    pub drill_targets: DrillTargetsState,
    pub user: UserState,
    pub layout: LayoutState,
}

impl DashboardState {
    pub fn initial() -> Self {
        Self {
            catalog: CatalogState::initial(),
            filter_context: FilterContextState::initial(),
            drill_targets: DrillTargetsState::initial(),
            user: UserState::initial(),
            layout: LayoutState::initial(),
        }
    }
}

/// Root reducer: route the action to its slice
pub fn reduce(state: &mut DashboardState, action: SliceAction) -> bool {
    match action {
        SliceAction::Catalog(a) => catalog::reduce(&mut state.catalog, a),
        SliceAction::FilterContext(a) => filter_context::reduce(&mut state.filter_context, a),
        SliceAction::DrillTargets(a) => drill_targets::reduce(&mut state.drill_targets, a),
        SliceAction::User(a) => user::reduce(&mut state.user, a),
        SliceAction::Layout(a) => layout::reduce(&mut state.layout, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateFilter;

    #[test]
    fn test_slice_action_routing() {
        let mut state = DashboardState::initial();
        let action: SliceAction = FilterContextAction::UpsertDateFilter(DateFilter::Absolute {
            from: "2024-01-01".into(),
            to: "2024-12-31".into(),
        })
        .into();

        assert_eq!(action.slice(), SliceId::FilterContext);
        assert_eq!(action.name(), "UpsertDateFilter");
        assert_eq!(action.category(), Some("filter_context"));
        assert!(reduce(&mut state, action));
        assert!(!state.filter_context.date_filter().is_all_time());
        assert_eq!(state.layout, LayoutState::initial());
    }
}
