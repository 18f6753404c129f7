//! End-to-end command dispatch through a session

use std::sync::{Arc, Mutex};

use dashboard_dispatch::model::{
    AttributeElements, AvailableDrillTargets, DateFilter, DateGranularity, LayoutItem,
    SectionHeader,
};
use dashboard_dispatch::testing::{fixtures, SessionHarness};
use dashboard_dispatch::{
    assert_emitted, assert_not_emitted, count_emitted, find_emitted, Command,
    CommandFailureReason, CommandPayload, DashboardSession, DateFilterSelection, Event,
    EventHandler, EventPayload, HandlerRegistry, Message, ObjRef, Referenced, SessionConfig,
};

fn names(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(|e| e.name()).collect()
}

fn section_titles(harness: &SessionHarness) -> Vec<Option<String>> {
    harness
        .session
        .state()
        .layout
        .sections()
        .iter()
        .map(|s| s.header.as_ref().and_then(|h| h.title.clone()))
        .collect()
}

#[test]
fn test_unbounded_relative_date_filter_is_stored_as_all_time() {
    let mut harness = SessionHarness::loaded();
    harness.dispatch_and_drain(Command::change_date_filter(DateFilterSelection::relative(
        DateGranularity::Month,
        -3,
        0,
    )));

    let command: Command = serde_json::from_value(serde_json::json!({
        "type": "ChangeDateFilterSelection",
        "correlationId": "all-time",
        "payload": {"type": "relative", "granularity": "GDC.time.date"}
    }))
    .unwrap();
    let events = harness.dispatch_and_drain(command);

    assert_eq!(
        harness.session.state().filter_context.date_filter(),
        &DateFilter::AllTime
    );
    let changed = find_emitted!(events, EventPayload::DateFilterChanged { .. }).unwrap();
    assert_eq!(changed.correlation_id(), Some("all-time"));
    assert_eq!(
        changed.payload,
        EventPayload::DateFilterChanged {
            filter: DateFilter::AllTime
        }
    );
    assert_eq!(
        serde_json::to_value(changed).unwrap()["payload"]["filter"],
        serde_json::json!({"type": "allTime"})
    );
}

#[test]
fn test_kpi_where_insight_is_required() {
    let mut harness = SessionHarness::loaded();
    let kpi = fixtures::kpi_widget().obj_ref().clone();

    let events = harness.dispatch_and_drain(
        Command::change_insight_widget_header(kpi, "Renamed").with_correlation_id("kpi-1"),
    );

    assert_eq!(count_emitted!(events, EventPayload::CommandFailed { .. }), 1);
    let failed = find_emitted!(events, EventPayload::CommandFailed { .. }).unwrap();
    assert_eq!(failed.correlation_id(), Some("kpi-1"));
    assert_eq!(failed.failure_reason(), Some(CommandFailureReason::InvalidArguments));
    let EventPayload::CommandFailed { message, .. } = &failed.payload else {
        unreachable!()
    };
    assert!(message.contains("is not an insight widget"), "{}", message);
    assert_not_emitted!(events, EventPayload::InsightWidgetHeaderChanged { .. });
}

#[test]
fn test_unresolvable_refs_fail_once_without_mutation() {
    let mut harness = SessionHarness::loaded();
    let missing = ObjRef::uri("/gdc/md/sales-ws/obj/999");

    let commands = vec![
        Command::change_insight_widget_header(missing.clone(), "x"),
        Command::change_kpi_widget_header(missing.clone(), "x"),
        Command::new(CommandPayload::AddDrillTargets {
            widget_ref: missing.clone(),
            available: AvailableDrillTargets::default(),
        }),
        Command::new(CommandPayload::AddAttributeFilter {
            display_form: missing.clone(),
            index: 0,
            initial_selection: None,
            initial_is_negative_selection: false,
        }),
        Command::new(CommandPayload::AddSectionItems {
            section_index: 0,
            item_index: -1,
            items: vec![LayoutItem::new(fixtures::kpi_widget())],
        }),
        Command::new(CommandPayload::RemoveAttributeFilters {
            filter_local_ids: vec!["no-such-filter".into()],
        }),
    ];

    for (i, command) in commands.into_iter().enumerate() {
        let correlation_id = format!("bad-{}", i);
        let before = harness.session.state().clone();

        let events = harness.dispatch_and_drain(command.with_correlation_id(&correlation_id));

        assert_eq!(names(&events), vec!["CommandStarted", "CommandFailed"]);
        assert_eq!(events[1].correlation_id(), Some(correlation_id.as_str()));
        assert_eq!(
            events[1].failure_reason(),
            Some(CommandFailureReason::InvalidArguments)
        );

        let after = harness.session.state();
        assert_eq!(after.layout, before.layout);
        assert_eq!(after.filter_context, before.filter_context);
        assert_eq!(after.drill_targets, before.drill_targets);
    }
}

#[test]
fn test_repeated_date_filter_change_does_not_drift() {
    let mut harness = SessionHarness::loaded();
    let command = || {
        Command::change_date_filter(DateFilterSelection::absolute("2024-04-01", "2024-06-30"))
    };

    let first = harness.dispatch_and_drain(command());
    let after_first = harness.session.state().filter_context.clone();
    let second = harness.dispatch_and_drain(command());

    assert_eq!(harness.session.state().filter_context, after_first);
    assert_emitted!(second, EventPayload::DateFilterChanged { .. });
    assert_eq!(names(&first), names(&second));
    assert_ne!(first[0].correlation_id(), second[0].correlation_id());
}

#[test]
fn test_overlapping_handlers_run_in_order_despite_failures() {
    let mut harness = SessionHarness::loaded();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let log = calls.clone();
    harness
        .session
        .register_handler(EventHandler::on_category("filter_context", move |event, _| {
            log.lock().unwrap().push(("first", event.name()));
            Err("first handler always fails".into())
        }));
    let log = calls.clone();
    harness
        .session
        .register_handler(EventHandler::on("DateFilterChanged", move |event, _| {
            log.lock().unwrap().push(("second", event.name()));
            Ok(())
        }));

    harness.dispatch_and_drain(Command::change_date_filter(DateFilterSelection::all_time()));

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            ("first", "DateFilterChanged"),
            ("second", "DateFilterChanged"),
            ("first", "FilterContextChanged"),
        ]
    );
}

#[test]
fn test_unknown_command() {
    let mut registry = HandlerRegistry::with_defaults();
    registry.unregister("AddDrillTargets");
    let session = DashboardSession::with_registry(
        fixtures::context(),
        SessionConfig::default(),
        registry,
    );
    let mut harness = SessionHarness::wrap(session);

    let events = harness.dispatch_and_drain(
        Command::new(CommandPayload::AddDrillTargets {
            widget_ref: fixtures::insight_widget().obj_ref().clone(),
            available: AvailableDrillTargets::default(),
        })
        .with_correlation_id("u-1"),
    );

    assert_eq!(names(&events), vec!["CommandStarted", "CommandFailed"]);
    assert_eq!(events[1].failure_reason(), Some(CommandFailureReason::UnknownCommand));
    assert_eq!(events[1].correlation_id(), Some("u-1"));
}

#[test]
fn test_relative_index_convention_for_sections() {
    let mut harness = SessionHarness::loaded();
    let header = |title: &str| SectionHeader {
        title: Some(title.into()),
        description: None,
    };
    let add = |index: isize, title: &str| {
        Command::new(CommandPayload::AddLayoutSection {
            index,
            initial_header: Some(header(title)),
            initial_items: vec![],
        })
    };

    harness.dispatch_and_drain(add(0, "Front"));
    harness.dispatch_and_drain(add(-1, "Back"));
    harness.dispatch_and_drain(add(2, "Middle"));

    let title = |s: &str| Some(s.to_string());
    assert_eq!(
        section_titles(&harness),
        vec![
            title("Front"),
            title("Overview"),
            title("Middle"),
            title("Products"),
            title("Back")
        ]
    );

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::MoveLayoutSection {
        section_index: 0,
        to_index: -1,
    }));
    assert_emitted!(events, EventPayload::LayoutSectionMoved { from_index: 0, to_index: 4, .. });

    harness.dispatch_and_drain(Command::new(CommandPayload::RemoveLayoutSection { index: -1 }));
    assert_eq!(
        section_titles(&harness),
        vec![title("Overview"), title("Middle"), title("Products"), title("Back")]
    );

    let events = harness.dispatch_and_drain(add(9, "Nowhere"));
    assert_emitted!(events, EventPayload::CommandFailed { .. });
    assert_eq!(section_titles(&harness).len(), 4);
}

#[test]
fn test_move_item_across_sections_keeps_identity() {
    let mut harness = SessionHarness::loaded();
    let kpi = fixtures::kpi_widget();

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::MoveSectionItem {
        section_index: 0,
        item_index: 0,
        to_section_index: 1,
        to_item_index: -1,
    }));

    assert_emitted!(events, EventPayload::LayoutSectionItemMoved { to_section_index: 1, to_index: 1, .. });
    let layout = &harness.session.state().layout.layout;
    assert_eq!(layout.widget_position(kpi.obj_ref()), Some((1, 1)));
    assert_eq!(layout.sections[0].items.len(), 1);
}

#[test]
fn test_attribute_filter_lifecycle() {
    let mut harness = SessionHarness::loaded();
    let region = fixtures::region_display_form();

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::AddAttributeFilter {
        display_form: region.obj_ref.clone(),
        index: -1,
        initial_selection: None,
        initial_is_negative_selection: false,
    }));
    let Some(Event {
        payload: EventPayload::AttributeFilterAdded { added, index },
        ..
    }) = find_emitted!(events, EventPayload::AttributeFilterAdded { .. })
    else {
        panic!("filter not added: {:?}", names(&events));
    };
    assert_eq!(*index, 1);
    assert!(added.negative_selection);
    assert!(added.attribute_elements.is_empty());
    let local_id = added.local_identifier.clone();

    // a second filter on the same attribute through another display form
    let events = harness.dispatch_and_drain(Command::new(CommandPayload::AddAttributeFilter {
        display_form: ObjRef::id("label.region.code"),
        index: 0,
        initial_selection: None,
        initial_is_negative_selection: false,
    }));
    assert_emitted!(events, EventPayload::CommandFailed { .. });

    harness.dispatch_and_drain(Command::new(CommandPayload::ChangeAttributeFilterSelection {
        filter_local_id: local_id.clone(),
        elements: AttributeElements::Uris(vec!["/gdc/md/sales-ws/obj/10/elements?id=3".into()]),
        selection_type: dashboard_dispatch::model::AttributeFilterSelectionType::In,
    }));
    let stored = harness
        .session
        .state()
        .filter_context
        .attribute_filter(&local_id)
        .cloned()
        .unwrap();
    assert!(!stored.negative_selection);
    assert_eq!(stored.attribute_elements.len(), 1);

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::MoveAttributeFilter {
        filter_local_id: local_id.clone(),
        index: 0,
    }));
    assert_emitted!(events, EventPayload::AttributeFilterMoved { from_index: 1, to_index: 0, .. });

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::RemoveAttributeFilters {
        filter_local_ids: vec![local_id, "product".into()],
    }));
    assert_emitted!(events, EventPayload::AttributeFiltersRemoved { removed } if removed.len() == 2);
    assert!(harness
        .session
        .state()
        .filter_context
        .attribute_filters()
        .is_empty());
}

#[test]
fn test_repeated_local_id_is_removed_once() {
    let mut harness = SessionHarness::loaded();
    let before = harness.session.state().filter_context.attribute_filters().len();

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::RemoveAttributeFilters {
        filter_local_ids: vec!["product".into(), "product".into()],
    }));

    assert_emitted!(events, EventPayload::AttributeFiltersRemoved { removed } if removed.len() == 1);
    assert_eq!(
        harness.session.state().filter_context.attribute_filters().len(),
        before - 1
    );
}

#[test]
fn test_drill_targets_and_reload() {
    let mut harness = SessionHarness::loaded();
    let insight = fixtures::insight_widget().obj_ref().clone();

    let events = harness.dispatch_and_drain(Command::new(CommandPayload::AddDrillTargets {
        widget_ref: ObjRef::id("widget-revenue-by-region"),
        available: AvailableDrillTargets {
            measures: vec![ObjRef::id("revenue")],
            attributes: vec![],
        },
    }));
    assert_emitted!(events, EventPayload::DrillTargetsAdded { widget_ref, .. } if *widget_ref == insight);
    assert!(harness.session.state().drill_targets.for_widget(&insight).is_some());

    // loading the dashboard again starts from a clean slate
    harness.dispatch_and_drain(Command::load_dashboard(fixtures::snapshot()));
    assert!(harness.session.state().drill_targets.is_empty());
}

#[test]
fn test_snapshot_for_another_dashboard_is_rejected() {
    let mut harness = SessionHarness::new();
    let mut snapshot = fixtures::snapshot();
    snapshot.dashboard.obj_ref = ObjRef::uri("/gdc/md/sales-ws/obj/555");
    snapshot.dashboard.uri = "/gdc/md/sales-ws/obj/555".into();
    snapshot.dashboard.identifier = "other-dashboard".into();

    let events = harness.dispatch_and_drain(Command::load_dashboard(snapshot));

    assert_emitted!(events, EventPayload::CommandFailed { .. });
    assert!(!harness.session.state().catalog.loaded);
}

#[test]
fn test_follow_up_commands_from_event_handlers() {
    let mut harness = SessionHarness::loaded();
    let kpi = fixtures::kpi_widget().obj_ref().clone();

    harness
        .session
        .register_handler(EventHandler::on("DateFilterChanged", move |_, dispatch| {
            dispatch.dispatch(
                Command::change_kpi_widget_header(kpi.clone(), "Revenue (filtered)")
                    .with_correlation_id("follow-up"),
            );
            Ok(())
        }));

    let events =
        harness.dispatch_and_drain(Command::change_date_filter(DateFilterSelection::all_time()));

    let renamed = find_emitted!(events, EventPayload::KpiWidgetHeaderChanged { .. }).unwrap();
    assert_eq!(renamed.correlation_id(), Some("follow-up"));
    assert_eq!(
        harness
            .session
            .state()
            .layout
            .widgets()
            .get(fixtures::kpi_widget().obj_ref())
            .map(|w| w.title().to_string()),
        Some("Revenue (filtered)".to_string())
    );
}
