//! Console data panel
//!
//! Stand-in for the dashboard's on-screen table: renders transition events
//! as aligned rows on stdout as they arrive. Remembers the last sequence
//! number it printed, so each flush only emits what is new.

use crate::poller::SharedDashboard;
use chrono::{DateTime, Local};
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use vehicle_dash_sync::TransitionEvent;

/// Incremental renderer over the shared event log
pub struct ConsolePanel {
    next_seq: u64,
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self { next_seq: 0 }
    }

    /// Print the column header once at startup
    pub fn print_header(&self) {
        println!(
            "{:<14} {:<22} {:<16} {:<20} {}",
            "SOURCE", "FIELD", "PREVIOUS", "NEW", "TIME"
        );
        println!("{}", "-".repeat(84));
    }

    /// Write any events not yet rendered, oldest first
    pub fn flush(&mut self, dashboard: &SharedDashboard, out: &mut impl Write) -> std::io::Result<()> {
        let dash = dashboard.lock().unwrap_or_else(|e| e.into_inner());
        let mut last_seen = self.next_seq;
        for event in dash.log.since(self.next_seq) {
            writeln!(out, "{}", format_row(event))?;
            last_seen = event.seq + 1;
        }
        self.next_seq = last_seen;
        Ok(())
    }
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new()
    }
}

fn format_row(event: &TransitionEvent) -> String {
    let local: DateTime<Local> = event.timestamp.into();
    format!(
        "{:<14} {:<22} {:<16} {:<20} {}",
        event.source.to_string(),
        event.field,
        event.previous,
        event.new,
        local.format("%H:%M:%S%.3f")
    )
}

/// Periodically flush new events to stdout until shutdown
pub async fn run_panel(
    dashboard: SharedDashboard,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut panel = ConsolePanel::new();
    panel.print_header();
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut stdout = std::io::stdout().lock();
                if let Err(err) = panel.flush(&dashboard, &mut stdout) {
                    log::warn!("panel write failed: {}", err);
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
