//! Common test utilities

pub mod mock_device;

pub use mock_device::MockDeviceServer;

use espdash_rust::DashboardEvent;
use tokio::sync::broadcast;

/// Drain every event currently queued on a broadcast receiver.
pub fn drain_events(rx: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
