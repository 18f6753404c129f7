//! Async runtime driving a session

use std::sync::{Arc, Mutex};

use dashboard_dispatch::model::DateFilter;
use dashboard_dispatch::testing::{fixtures, EventRecorder};
use dashboard_dispatch::{
    Command, DashboardRuntime, DashboardSession, DateFilterSelection, EventHandler, Message,
};

#[tokio::test]
async fn test_commands_from_other_tasks_are_processed_in_order() {
    let session = DashboardSession::new(fixtures::context());
    let recorder = EventRecorder::new();
    session.register_handler(recorder.handler());

    let runtime = DashboardRuntime::new(session);
    let shutdown = runtime.shutdown_token();
    let handle = runtime.handle();

    let seen = Arc::new(Mutex::new(0usize));
    let counter = seen.clone();
    let stop = shutdown.clone();
    runtime
        .session()
        .register_handler(EventHandler::on("DateFilterChanged", move |_, _| {
            let mut count = counter.lock().unwrap();
            *count += 1;
            if *count == 2 {
                stop.cancel();
            }
            Ok(())
        }));

    let task = tokio::spawn(runtime.run());

    let producer = tokio::spawn(async move {
        handle.dispatch(Command::load_dashboard(fixtures::snapshot()).with_correlation_id("load"));
        handle.dispatch(
            Command::change_date_filter(DateFilterSelection::absolute("2024-01-01", "2024-01-31"))
                .with_correlation_id("jan"),
        );
        handle.dispatch(
            Command::change_date_filter(DateFilterSelection::absolute("2024-02-01", "2024-02-29"))
                .with_correlation_id("feb"),
        );
    });
    producer.await.unwrap();

    let session = task.await.unwrap();
    assert_eq!(*seen.lock().unwrap(), 2);
    assert_eq!(
        session.state().filter_context.date_filter(),
        &DateFilter::Absolute {
            from: "2024-02-01".into(),
            to: "2024-02-29".into()
        }
    );

    let started: Vec<_> = recorder
        .drain()
        .into_iter()
        .filter(|e| e.name() == "CommandStarted")
        .filter_map(|e| e.correlation_id().map(str::to_string))
        .collect();
    assert_eq!(started, vec!["load", "jan", "feb"]);
}

#[tokio::test]
async fn test_shutdown_returns_session_with_logs() {
    let session = DashboardSession::new(fixtures::context());
    session.dispatch(Command::load_dashboard(fixtures::snapshot()));

    let runtime = DashboardRuntime::new(session);
    runtime.shutdown_token().cancel();
    let session = runtime.run().await;

    assert!(session.state().catalog.loaded);
    assert_eq!(session.command_log().len(), 1);
    assert_eq!(
        session.command_log().entries().next().map(|e| e.outcome),
        Some(Some(true))
    );
}
