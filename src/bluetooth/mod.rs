pub mod decoder;
pub mod scanner;

pub use decoder::{decode_advertisement, DecodeError, PayloadDecoder};
pub use scanner::BluerScanner;

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::models::{AddressSet, DeviceAddress};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("bluetooth error: {0}")]
    Bluetooth(#[from] bluer::Error),
    #[error("scan source unavailable: {0}")]
    Unavailable(String),
}

/// Source of raw advertisement payloads, one scan window per call.
///
/// `query` returns the most recent Ruuvi manufacturer payload per address of
/// interest observed during the window. Addresses without a fresh
/// advertisement are simply absent from the result.
pub trait AdvertisementSource: Send + 'static {
    fn query(
        &mut self,
        addresses: &AddressSet,
    ) -> impl Future<Output = Result<HashMap<DeviceAddress, Vec<u8>>, ScanError>> + Send;
}
