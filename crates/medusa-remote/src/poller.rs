//! Repeating status poll for one playing view.
//!
//! The poller task exclusively owns the [`Reconciler`]. Each tick awaits the
//! status fetch and any metadata fetch it triggers before the next tick may
//! start, so two polls are never in flight at once.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::reconcile::{Reconciler, TickOutcome};
use crate::transport::MedusaClient;
use crate::view::{ViewBinder, ViewUpdate};

/// Why a poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerExit {
    Cancelled,
    SessionEnded,
}

/// Poll `session` every `interval` until cancelled or the session ends.
pub async fn run_poller<V: ViewBinder>(
    client: MedusaClient,
    session: String,
    mut engine: Reconciler,
    mut view: V,
    interval: Duration,
    token: CancellationToken,
) -> PollerExit {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("polling {} every {:?}", session, interval);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("poller for {} cancelled", session);
                return PollerExit::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let status = tokio::select! {
            _ = token.cancelled() => return PollerExit::Cancelled,
            r = client.fetch_status(&session) => r,
        };
        let status = match status {
            Ok(s) => s,
            Err(e) => {
                debug!("status poll for {} skipped: {}", session, e);
                engine.skip_tick();
                continue;
            }
        };

        match engine.observe(&status, &mut view) {
            TickOutcome::Terminal(route) => {
                info!("{} finished, redirecting to {}", session, route);
                tokio::select! {
                    _ = token.cancelled() => return PollerExit::Cancelled,
                    _ = view.deliver(ViewUpdate::Redirect(route)) => {}
                }
                return PollerExit::SessionEnded;
            }
            TickOutcome::Debounced { .. } | TickOutcome::Reconciled { fetch: None } => {}
            TickOutcome::Reconciled { fetch: Some(id) } => {
                let metadata = tokio::select! {
                    _ = token.cancelled() => return PollerExit::Cancelled,
                    r = client.fetch_metadata(id) => r,
                };
                match metadata {
                    Ok(meta) => {
                        engine.apply_metadata(id, &meta, &mut view);
                    }
                    Err(e) => warn!("metadata for media {} unavailable: {}", id, e),
                }
            }
        }
    }
}

/// A running poller. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<PollerExit>>,
}

impl PollerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel and wait for the task to stop.
    pub async fn shutdown(mut self) -> Option<PollerExit> {
        self.token.cancel();
        self.task.take()?.await.ok()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Start a poller for `session` on the current runtime.
pub fn spawn_poller<V>(
    client: MedusaClient,
    session: String,
    engine: Reconciler,
    view: V,
    interval: Duration,
) -> PollerHandle
where
    V: ViewBinder + Send + 'static,
{
    let token = CancellationToken::new();
    let task = tokio::spawn(run_poller(
        client,
        session,
        engine,
        view,
        interval,
        token.clone(),
    ));
    PollerHandle {
        token,
        task: Some(task),
    }
}
