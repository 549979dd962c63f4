/// Background scanning loop and its start/stop lifecycle
use log::{error, info, warn};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::bluetooth::{decode_advertisement, AdvertisementSource};
use crate::models::{AddressSet, DeviceAddress};
use crate::registry::SensorRegistry;

const POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopping,
    /// Terminal; construct a new monitor to resume scanning.
    Stopped,
}

/// Everything the background task owns while the loop runs.
struct LoopParts<S> {
    registry: SensorRegistry,
    source: S,
    addresses: AddressSet,
}

/// Periodically queries an advertisement source and fans decoded readings
/// out to the sensor registry.
///
/// Exactly one background task runs the loop, so registry updates and host
/// notifications are sequential. `start` must be called exactly once,
/// matched by exactly one `stop`; `stop` returns only after the task has
/// exited, so no notification can fire afterwards.
pub struct Monitor<S: AdvertisementSource> {
    state: MonitorState,
    interval: Duration,
    parts: Option<LoopParts<S>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl<S: AdvertisementSource> Monitor<S> {
    pub fn new(registry: SensorRegistry, source: S) -> Self {
        Self::with_interval(registry, source, Duration::from_secs(POLL_INTERVAL_SECS))
    }

    pub fn with_interval(registry: SensorRegistry, source: S, interval: Duration) -> Self {
        let addresses = registry.addresses();
        Monitor {
            state: MonitorState::Idle,
            interval,
            parts: Some(LoopParts {
                registry,
                source,
                addresses,
            }),
            shutdown: None,
            handle: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Spawn the scanning loop and return immediately.
    pub fn start(&mut self) {
        debug_assert_eq!(
            self.state,
            MonitorState::Idle,
            "start() must be called exactly once"
        );
        let Some(parts) = self.parts.take() else {
            error!("Monitor already started; ignoring");
            return;
        };

        info!(
            "Starting scanner for {} RuuviTag beacons",
            parts.addresses.len()
        );
        let (tx, rx) = oneshot::channel();
        self.shutdown = Some(tx);
        self.handle = Some(tokio::spawn(run_loop(parts, rx, self.interval)));
        self.state = MonitorState::Running;
    }

    /// Signal the loop to exit and wait until its task has terminated.
    ///
    /// The loop wakes from its timed wait as soon as the signal arrives, so
    /// stop latency is bounded by one poll interval plus any scan already in
    /// progress. Once this returns, no further notification will fire.
    pub async fn stop(&mut self) {
        debug_assert_eq!(
            self.state,
            MonitorState::Running,
            "stop() must match exactly one start()"
        );
        if self.state != MonitorState::Running {
            error!("stop() called on a monitor that is not running");
            return;
        }

        info!("Stopping scanner for RuuviTag beacons");
        self.state = MonitorState::Stopping;
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Monitor task did not shut down cleanly: {}", e);
            }
        }
        self.state = MonitorState::Stopped;
    }
}

async fn run_loop<S: AdvertisementSource>(
    mut parts: LoopParts<S>,
    mut shutdown: oneshot::Receiver<()>,
    interval: Duration,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = sleep(interval) => {}
        }

        match parts.source.query(&parts.addresses).await {
            Ok(payloads) => apply_payloads(&mut parts.registry, payloads),
            Err(e) => {
                // A transient radio failure must not disable monitoring.
                error!("Scan failed: {}", e);
            }
        }
    }
}

/// Decode and apply one cycle's scan result. A payload that fails to decode
/// only skips its own address.
fn apply_payloads(registry: &mut SensorRegistry, payloads: HashMap<DeviceAddress, Vec<u8>>) {
    for (address, raw) in payloads {
        match decode_advertisement(&raw) {
            Ok(reading) => registry.update(&address, &reading),
            Err(e) => warn!("Discarding advertisement from {}: {}", address, e),
        }
    }
}
