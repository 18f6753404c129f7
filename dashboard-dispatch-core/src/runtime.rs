//! Async runtime driving a [`DashboardSession`]
//!
//! Wraps the session in a `tokio::select!` loop that waits for queued
//! commands and processes each to quiescence. The loop stops when the
//! shutdown token is cancelled.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::emitter::DispatchHandle;
use crate::session::DashboardSession;

pub struct DashboardRuntime {
    session: DashboardSession,
    shutdown: CancellationToken,
}

impl DashboardRuntime {
    pub fn new(session: DashboardSession) -> Self {
        Self {
            session,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handle for submitting commands while the runtime runs
    pub fn handle(&self) -> DispatchHandle {
        self.session.handle()
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DashboardSession {
        &mut self.session
    }

    /// Process commands until shutdown; returns the session for inspection
    pub async fn run(mut self) -> DashboardSession {
        info!("dashboard runtime started");
        let mut processed = 0usize;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    break;
                }

                Some(command) = self.session.rx.recv() => {
                    self.session.process(command);
                    processed += 1 + self.session.process_pending();
                    debug!(processed, "command queue drained");
                }
            }
        }

        // commands queued before shutdown still get their events
        processed += self.session.process_pending();
        info!(processed, "dashboard runtime stopped");
        self.session
    }
}
