//! Test utilities for dashboard-dispatch sessions
//!
//! - [`fixtures`]: a small sales dashboard with a catalog, a filter context
//!   and a two-section layout
//! - [`EventRecorder`]: an event handler that keeps every delivered event
//! - [`SessionHarness`]: a session wired to a recorder
//! - Assertion macros for verifying emitted events
//!
//! # Example
//!
//! ```ignore
//! use dashboard_dispatch::testing::SessionHarness;
//! use dashboard_dispatch::{assert_emitted, Command, DateFilterSelection, EventPayload};
//!
//! let mut harness = SessionHarness::loaded();
//! let events = harness.dispatch_and_drain(Command::change_date_filter(
//!     DateFilterSelection::all_time(),
//! ));
//! assert_emitted!(events, EventPayload::DateFilterChanged { .. });
//! ```

use std::sync::{Arc, Mutex};

use crate::command::Command;
use crate::config::SessionConfig;
use crate::emitter::{EventHandler, HandlerId};
use crate::event::Event;
use crate::session::DashboardSession;

/// Canned domain objects shared by unit and integration tests
pub mod fixtures {
    use crate::context::{BackendInfo, BackendKind, DashboardContext};
    use crate::model::{
        AttributeElements, AttributeFilter, Catalog, CatalogAttribute, CatalogDateDataset,
        CatalogMeasure, Dashboard, DashboardLayout, DashboardSnapshot, DateFilter, DisplayForm,
        FilterContext, InsightWidget, KpiWidget, LayoutItem, LayoutSection, SectionHeader, User,
        Widget,
    };
    use crate::obj_ref::ObjRef;

    pub const WORKSPACE: &str = "sales-ws";
    pub const DASHBOARD_URI: &str = "/gdc/md/sales-ws/obj/100";

    pub fn context() -> DashboardContext {
        DashboardContext::new(
            BackendInfo {
                kind: BackendKind::Bear,
                endpoint: "https://analytics.example.com".into(),
            },
            WORKSPACE,
            Some(ObjRef::uri(DASHBOARD_URI)),
        )
    }

    fn display_form(id: &str, obj: u32, title: &str, attribute: &ObjRef) -> DisplayForm {
        let uri = format!("/gdc/md/{}/obj/{}", WORKSPACE, obj);
        DisplayForm {
            obj_ref: ObjRef::uri(uri.clone()),
            identifier: id.into(),
            uri,
            title: title.into(),
            attribute: attribute.clone(),
        }
    }

    pub fn region_display_form() -> DisplayForm {
        display_form("label.region.name", 11, "Region Name", &region_attribute())
    }

    pub fn product_display_form() -> DisplayForm {
        display_form("label.product.name", 21, "Product Name", &product_attribute())
    }

    fn region_attribute() -> ObjRef {
        ObjRef::uri(format!("/gdc/md/{}/obj/10", WORKSPACE))
    }

    fn product_attribute() -> ObjRef {
        ObjRef::uri(format!("/gdc/md/{}/obj/20", WORKSPACE))
    }

    /// Region (two display forms) and Product attributes, one date dataset
    pub fn catalog() -> Catalog {
        Catalog {
            attributes: vec![
                CatalogAttribute {
                    obj_ref: region_attribute(),
                    identifier: "attr.region".into(),
                    uri: format!("/gdc/md/{}/obj/10", WORKSPACE),
                    title: "Region".into(),
                    default_display_form: region_display_form(),
                    display_forms: vec![display_form(
                        "label.region.code",
                        12,
                        "Region Code",
                        &region_attribute(),
                    )],
                },
                CatalogAttribute {
                    obj_ref: product_attribute(),
                    identifier: "attr.product".into(),
                    uri: format!("/gdc/md/{}/obj/20", WORKSPACE),
                    title: "Product".into(),
                    default_display_form: product_display_form(),
                    display_forms: vec![],
                },
            ],
            date_datasets: vec![CatalogDateDataset {
                obj_ref: ObjRef::uri(format!("/gdc/md/{}/obj/30", WORKSPACE)),
                identifier: "closed.dataset.dt".into(),
                title: "Date (Closed)".into(),
            }],
            measures: vec![CatalogMeasure {
                obj_ref: ObjRef::uri(format!("/gdc/md/{}/obj/40", WORKSPACE)),
                identifier: "revenue".into(),
                title: "Revenue".into(),
            }],
        }
    }

    /// Filter context with a single product filter and no date restriction
    pub fn filter_context() -> FilterContext {
        FilterContext {
            obj_ref: Some(ObjRef::uri(format!("/gdc/md/{}/obj/900", WORKSPACE))),
            identifier: Some("fc-sales".into()),
            uri: Some(format!("/gdc/md/{}/obj/900", WORKSPACE)),
            title: "filterContext".into(),
            description: String::new(),
            date_filter: DateFilter::AllTime,
            attribute_filters: vec![AttributeFilter {
                local_identifier: "product".into(),
                display_form: product_display_form().obj_ref,
                negative_selection: false,
                attribute_elements: AttributeElements::Uris(vec![format!(
                    "/gdc/md/{}/obj/20/elements?id=1",
                    WORKSPACE
                )]),
            }],
        }
    }

    pub fn kpi_widget() -> Widget {
        let uri = format!("/gdc/md/{}/obj/301", WORKSPACE);
        Widget::Kpi(KpiWidget {
            obj_ref: ObjRef::uri(uri.clone()),
            identifier: "kpi-revenue".into(),
            uri,
            title: "Revenue".into(),
            description: String::new(),
            measure: ObjRef::uri(format!("/gdc/md/{}/obj/40", WORKSPACE)),
        })
    }

    fn insight(obj: u32, identifier: &str, title: &str) -> Widget {
        let uri = format!("/gdc/md/{}/obj/{}", WORKSPACE, obj);
        Widget::Insight(InsightWidget {
            obj_ref: ObjRef::uri(uri.clone()),
            identifier: identifier.into(),
            uri,
            title: title.into(),
            description: String::new(),
            insight: ObjRef::uri(format!("/gdc/md/{}/obj/{}", WORKSPACE, obj + 100)),
            ignore_dashboard_filters: vec![],
            date_data_set: None,
        })
    }

    pub fn insight_widget() -> Widget {
        insight(302, "widget-revenue-by-region", "Revenue by Region")
    }

    /// Insight placed alone in the second section
    pub fn second_insight_widget() -> Widget {
        insight(303, "widget-top-products", "Top Products")
    }

    /// An insight that is not part of [`layout`]
    pub fn unplaced_insight_widget() -> Widget {
        insight(304, "widget-churn", "Churn")
    }

    /// Section 0: KPI then insight. Section 1: one insight.
    pub fn layout() -> DashboardLayout {
        DashboardLayout {
            sections: vec![
                LayoutSection {
                    header: Some(SectionHeader {
                        title: Some("Overview".into()),
                        description: Some("Key numbers".into()),
                    }),
                    items: vec![LayoutItem::new(kpi_widget()), LayoutItem::new(insight_widget())],
                },
                LayoutSection {
                    header: Some(SectionHeader {
                        title: Some("Products".into()),
                        description: None,
                    }),
                    items: vec![LayoutItem::new(second_insight_widget())],
                },
            ],
        }
    }

    pub fn user() -> User {
        User {
            obj_ref: ObjRef::uri("/gdc/account/profile/7"),
            login: "analyst@example.com".into(),
            email: Some("analyst@example.com".into()),
            first_name: Some("Sam".into()),
            last_name: Some("Rivera".into()),
        }
    }

    pub fn dashboard() -> Dashboard {
        Dashboard {
            obj_ref: ObjRef::uri(DASHBOARD_URI),
            identifier: "sales-dashboard".into(),
            uri: DASHBOARD_URI.into(),
            title: "Sales".into(),
            description: "Quarterly sales overview".into(),
            unlisted: false,
            filter_context: Some(filter_context()),
            layout: Some(layout()),
        }
    }

    pub fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            dashboard: dashboard(),
            catalog: catalog(),
            user: Some(user()),
        }
    }
}

/// Collects every event delivered to it, in delivery order
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event handler feeding this recorder
    pub fn handler(&self) -> EventHandler {
        let events = self.events.clone();
        EventHandler::any(move |event, _| {
            events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(event.clone());
            Ok(())
        })
    }

    /// Take every recorded event, leaving the recorder empty
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|p| p.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A session with an [`EventRecorder`] registered first
pub struct SessionHarness {
    pub session: DashboardSession,
    recorder: EventRecorder,
    recorder_id: HandlerId,
}

impl SessionHarness {
    /// Empty session bound to [`fixtures::context`]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let session = DashboardSession::with_config(fixtures::context(), config);
        Self::wrap(session)
    }

    /// Attach a recorder to an existing session
    pub fn wrap(session: DashboardSession) -> Self {
        let recorder = EventRecorder::new();
        let recorder_id = session.register_handler(recorder.handler());
        Self {
            session,
            recorder,
            recorder_id,
        }
    }

    /// Session with [`fixtures::snapshot`] loaded and the recorder emptied
    pub fn loaded() -> Self {
        let mut harness = Self::new();
        let events = harness.dispatch_and_drain(Command::load_dashboard(fixtures::snapshot()));
        assert!(
            !events.iter().any(Event::is_failure),
            "fixture snapshot failed to load: {:?}",
            events
        );
        harness
    }

    /// Queue `command`, process the queue, and return every delivered event
    pub fn dispatch_and_drain(&mut self, command: Command) -> Vec<Event> {
        self.session.dispatch(command);
        self.session.process_pending();
        self.recorder.drain()
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    pub fn recorder_id(&self) -> HandlerId {
        self.recorder_id
    }
}

impl Default for SessionHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Pause tokio time (requires the `testing-time` feature)
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

#[cfg(feature = "testing-time")]
pub fn resume_time() {
    tokio::time::resume();
}

#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
}

/// Assert that an event with a matching payload was emitted.
///
/// # Example
///
/// ```ignore
/// let events = harness.dispatch_and_drain(command);
/// assert_emitted!(events, EventPayload::DateFilterChanged { .. });
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($events:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $events.iter().any(|e| matches!(&e.payload, $pattern $(if $guard)?)),
            "Expected event matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $events.iter().map(|e| e.payload.clone()).collect::<Vec<_>>()
        );
    };
}

/// Assert that no event with a matching payload was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($events:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$events.iter().any(|e| matches!(&e.payload, $pattern $(if $guard)?)),
            "Expected event matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $events.iter().map(|e| e.payload.clone()).collect::<Vec<_>>()
        );
    };
}

/// First event whose payload matches a pattern.
///
/// # Example
///
/// ```ignore
/// if let Some(event) = find_emitted!(events, EventPayload::CommandFailed { .. }) {
///     assert_eq!(event.correlation_id(), Some("c-1"));
/// }
/// ```
#[macro_export]
macro_rules! find_emitted {
    ($events:expr, $pattern:pat $(if $guard:expr)?) => {
        $events.iter().find(|e| matches!(&e.payload, $pattern $(if $guard)?))
    };
}

/// How many events have a payload matching a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($events:expr, $pattern:pat $(if $guard:expr)?) => {
        $events.iter().filter(|e| matches!(&e.payload, $pattern $(if $guard)?)).count()
    };
}

/// Number of events of a category.
#[macro_export]
macro_rules! count_category {
    ($events:expr, $category:expr) => {{
        use $crate::Message;
        $events
            .iter()
            .filter(|e| e.category() == Some($category))
            .count()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DateFilterSelection;
    use crate::event::EventPayload;
    use crate::message::Message;

    #[test]
    fn test_harness_records_events() {
        let mut harness = SessionHarness::loaded();
        assert!(harness.recorder().is_empty());

        let events =
            harness.dispatch_and_drain(Command::change_date_filter(DateFilterSelection::all_time()));

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].name(), "CommandStarted");
        assert!(harness.recorder().is_empty());
    }

    #[test]
    fn test_assert_macros() {
        let mut harness = SessionHarness::new();
        let events = harness.dispatch_and_drain(Command::load_dashboard(fixtures::snapshot()));

        assert_emitted!(events, EventPayload::DashboardLoaded { .. });
        assert_emitted!(events, EventPayload::DashboardLoaded { dashboard } if dashboard.title == "Sales");
        assert_not_emitted!(events, EventPayload::CommandFailed { .. });

        let found = find_emitted!(events, EventPayload::CommandStarted { .. });
        assert!(found.is_some());

        assert_eq!(count_emitted!(events, EventPayload::CommandStarted { .. }), 1);
        assert_eq!(count_category!(events, "dashboard"), 1);
    }

    #[test]
    fn test_fixture_layout_is_consistent() {
        use crate::obj_ref::Referenced;

        let layout = fixtures::layout();
        let widgets = layout.widgets();
        assert_eq!(widgets.len(), 3);
        assert!(widgets.contains(fixtures::kpi_widget().obj_ref()));
        assert!(!widgets.contains(fixtures::unplaced_insight_widget().obj_ref()));
        assert_eq!(layout.widget_position(fixtures::insight_widget().obj_ref()), Some((0, 1)));
    }
}
