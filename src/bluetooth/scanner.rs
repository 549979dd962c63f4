/// Bluetooth Low Energy scanning via the system bluetoothd
use futures_util::StreamExt;
use log::{debug, error, warn};
use std::collections::HashMap;
use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::bluetooth::{AdvertisementSource, ScanError};
use crate::models::{AddressSet, DeviceAddress};

// RuuviTag protocol constants
const RUUVI_MANUFACTURER_ID: u16 = 0x0499; // Ruuvi Innovations Ltd. manufacturer ID
const SCAN_WINDOW_SECS: u64 = 5; // How long to actively scan per query

/// Advertisement source backed by a BlueZ adapter.
///
/// Each `query` runs one bounded discovery window and returns the latest
/// Ruuvi manufacturer payload for every address of interest that advertised
/// during the window. Payloads are returned raw; decoding happens in the
/// monitor loop.
pub struct BluerScanner {
    _session: bluer::Session,
    adapter: bluer::Adapter,
}

impl BluerScanner {
    /// Connect to the default Bluetooth adapter and power it on.
    pub async fn new() -> Result<Self, ScanError> {
        let session = match bluer::Session::new().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to create Bluetooth session: {}", e);
                return Err(e.into());
            }
        };

        let adapter = match session.default_adapter().await {
            Ok(adapter) => adapter,
            Err(e) => {
                error!("Failed to get default Bluetooth adapter: {}", e);
                return Err(e.into());
            }
        };

        if let Err(e) = adapter.set_powered(true).await {
            error!("Failed to power on adapter: {}", e);
            return Err(e.into());
        }

        Ok(BluerScanner {
            _session: session,
            adapter,
        })
    }
}

impl AdvertisementSource for BluerScanner {
    fn query(
        &mut self,
        addresses: &AddressSet,
    ) -> impl Future<Output = Result<HashMap<DeviceAddress, Vec<u8>>, ScanError>> + Send {
        async move {
            let mut data = HashMap::new();

            // Low Energy only, without duplicate advertisements
            let filter = bluer::DiscoveryFilter {
                transport: bluer::DiscoveryTransport::Le,
                duplicate_data: false,
                ..Default::default()
            };

            if let Err(e) = self.adapter.set_discovery_filter(filter).await {
                warn!("Failed to set discovery filter: {}", e);
            }

            // Run discovery in the background for the scan window
            let discovery_handle = {
                match self.adapter.discover_devices().await {
                    Ok(discovery_stream) => tokio::spawn(async move {
                        let mut stream = discovery_stream;
                        while let Some(event) = stream.next().await {
                            debug!("Discovery event: {:?}", event);
                        }
                    }),
                    Err(e) => {
                        error!("Failed to start device discovery: {}", e);
                        return Err(e.into());
                    }
                }
            };

            sleep(Duration::from_secs(SCAN_WINDOW_SECS)).await;
            discovery_handle.abort();

            let discovered = match self.adapter.device_addresses().await {
                Ok(discovered) => discovered,
                Err(e) => {
                    error!("Failed to get device addresses: {}", e);
                    return Err(e.into());
                }
            };

            for addr in discovered {
                let device = match self.adapter.device(addr) {
                    Ok(device) => device,
                    Err(_) => continue,
                };

                // BlueZ reports well-formed addresses; skip anything else
                let Ok(address) = DeviceAddress::parse(&device.address().to_string()) else {
                    continue;
                };
                if !addresses.contains(&address) {
                    continue;
                }

                match device.manufacturer_data().await {
                    Ok(Some(manufacturer_data)) => {
                        if let Some(payload) = manufacturer_data.get(&RUUVI_MANUFACTURER_ID) {
                            debug!(
                                "Received {} byte advertisement from {}",
                                payload.len(),
                                address
                            );
                            data.insert(address, payload.clone());
                        }
                    }
                    Ok(None) => {
                        debug!("No manufacturer data for {}", address);
                    }
                    Err(e) => {
                        debug!("Failed to get manufacturer data for {}: {}", address, e);
                    }
                }
            }

            Ok(data)
        }
    }
}
