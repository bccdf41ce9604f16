//! Fixed-period status pollers
//!
//! One loop per status module, each on its own cadence, all feeding the one
//! shared `Dashboard`. A cycle is: wait for the tick, fetch, parse, diff,
//! dispatch. The request is awaited inside the loop body, so a slow backend
//! delays the next cycle instead of stacking overlapping requests.
//!
//! Fetch failures skip the cycle: status is re-polled moments later anyway,
//! so the dashboard just holds its last-known-good display.

use crate::client::StatusSource;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use vehicle_dash_sync::{Dashboard, SyncError};

/// Which endpoint a poll loop serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTask {
    Connection,
    Door,
    Ranging,
    User,
    /// The welcome light re-reads `/api/connection` on its own cadence
    WelcomeLight,
}

impl PollTask {
    fn name(&self) -> &'static str {
        match self {
            PollTask::Connection => "connection",
            PollTask::Door => "door",
            PollTask::Ranging => "ranging",
            PollTask::User => "user",
            PollTask::WelcomeLight => "welcome-light",
        }
    }
}

/// Shared handle to the dashboard state
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Run one poll loop until the shutdown flag flips.
///
/// Errors never break the loop; they are logged at debug level and the next
/// tick retries.
pub async fn run_poller(
    task: PollTask,
    source: Arc<dyn StatusSource>,
    dashboard: SharedDashboard,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    log::info!("{} poller started ({}ms period)", task.name(), period.as_millis());

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        if let Err(err) = poll_once(task, source.as_ref(), &dashboard).await {
            // Best effort by design: skip this cycle, the next tick retries
            log::debug!("{} poll skipped: {}", task.name(), err);
        }
    }

    log::info!("{} poller stopped", task.name());
}

/// One fetch-diff-dispatch cycle for `task`
pub async fn poll_once(
    task: PollTask,
    source: &dyn StatusSource,
    dashboard: &SharedDashboard,
) -> Result<(), SyncError> {
    match task {
        PollTask::Connection => {
            let snap = source.connection().await?;
            lock(dashboard).apply_connection(&snap);
        }
        PollTask::WelcomeLight => {
            let snap = source.connection().await?;
            lock(dashboard).apply_welcome(&snap);
        }
        PollTask::Door => {
            let snap = source.door().await?;
            lock(dashboard).apply_doors(&snap);
        }
        PollTask::Ranging => {
            let snap = source.ranging().await?;
            lock(dashboard).apply_ranging(&snap);
        }
        PollTask::User => {
            let snap = source.user().await?;
            lock(dashboard).apply_user(&snap);
        }
    }
    Ok(())
}

/// Drive the dashboard animations at a fixed frame period until shutdown
pub async fn run_render_driver(
    dashboard: SharedDashboard,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let dt = period.as_secs_f32();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                lock(&dashboard).advance(dt);
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

fn lock(dashboard: &SharedDashboard) -> std::sync::MutexGuard<'_, Dashboard> {
    // A poisoned mutex means another poller panicked; propagating the panic
    // is the only sensible option for this process
    dashboard.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vehicle_dash_sync::{
        BleStatus, ConnectionSnapshot, DoorSnapshot, RangingSnapshot, UserSnapshot,
    };

    /// Scripted source: serves a fixed connection snapshot, counts requests,
    /// and can be told to fail
    struct ScriptedSource {
        snapshot: Mutex<ConnectionSnapshot>,
        fail: Mutex<bool>,
        requests: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(snapshot: ConnectionSnapshot) -> Self {
            Self {
                snapshot: Mutex::new(snapshot),
                fail: Mutex::new(false),
                requests: AtomicUsize::new(0),
            }
        }

        fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn connection(&self) -> Result<ConnectionSnapshot, SyncError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(SyncError::Network("connection refused".into()));
            }
            Ok(*self.snapshot.lock().unwrap())
        }

        async fn door(&self) -> Result<DoorSnapshot, SyncError> {
            Ok(DoorSnapshot::all_closed_locked())
        }

        async fn ranging(&self) -> Result<RangingSnapshot, SyncError> {
            Ok(RangingSnapshot {
                first_path_power: 0.0,
                aoa: 0.0,
                distance: 0.0,
            })
        }

        async fn user(&self) -> Result<UserSnapshot, SyncError> {
            Ok(UserSnapshot::default())
        }
    }

    fn shared_dashboard() -> SharedDashboard {
        let mut dash = Dashboard::new(100);
        dash.view.set_model_ready();
        Arc::new(Mutex::new(dash))
    }

    #[tokio::test]
    async fn test_poll_once_dispatches_changes() {
        let source = ScriptedSource::new(ConnectionSnapshot {
            ble: BleStatus::Connected,
            ..ConnectionSnapshot::default()
        });
        let dashboard = shared_dashboard();

        poll_once(PollTask::Connection, &source, &dashboard)
            .await
            .unwrap();

        let dash = dashboard.lock().unwrap();
        assert_eq!(dash.log.len(), 1);
        assert_eq!(dash.connection_cache().ble, BleStatus::Connected);
    }

    #[tokio::test]
    async fn test_poll_once_propagates_fetch_errors() {
        let source = ScriptedSource::new(ConnectionSnapshot::default());
        source.set_fail(true);
        let dashboard = shared_dashboard();

        let result = poll_once(PollTask::Connection, &source, &dashboard).await;
        assert!(result.is_err());
        assert!(dashboard.lock().unwrap().log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_keeps_running_through_failures() {
        let source = Arc::new(ScriptedSource::new(ConnectionSnapshot::default()));
        source.set_fail(true);
        let dashboard = shared_dashboard();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_poller(
            PollTask::Connection,
            source.clone() as Arc<dyn StatusSource>,
            dashboard.clone(),
            Duration::from_millis(100),
            shutdown_rx,
        ));

        // Several failing cycles pass without the loop dying
        tokio::time::sleep(Duration::from_millis(550)).await;
        assert!(source.requests() >= 4);

        // Backend recovers: the next cycles succeed
        source.set_fail(false);
        tokio::time::sleep(Duration::from_millis(300)).await;
        let before = source.requests();
        assert!(before > 4);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_poller() {
        let source = Arc::new(ScriptedSource::new(ConnectionSnapshot::default()));
        let dashboard = shared_dashboard();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_poller(
            PollTask::Connection,
            source.clone() as Arc<dyn StatusSource>,
            dashboard,
            Duration::from_millis(100),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(250)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // No further requests after the loop exits
        let after_stop = source.requests();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(source.requests(), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_driver_advances_animations() {
        let dashboard = shared_dashboard();
        dashboard.lock().unwrap().apply_connection(&ConnectionSnapshot {
            ble: BleStatus::Connected,
            ..ConnectionSnapshot::default()
        });
        assert!(dashboard.lock().unwrap().view.active_animations() > 0);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_render_driver(
            dashboard.clone(),
            Duration::from_millis(33),
            shutdown_rx,
        ));

        // Plenty of frames for every effect to settle
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(dashboard.lock().unwrap().view.active_animations(), 0);
    }
}
