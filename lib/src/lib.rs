// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Zilliqa API Library (and CLI)
//!
//! Provides a [DeviceHandle] for streaming transactions to a Zilliqa
//! hardware wallet for signing, transaction construction and chunking
//! helpers in [txn], and an offline [preview] of the on-device display.

/// Re-export transports for consumer use
pub mod transport;
pub use ledger_lib::{Device, Exchange};

/// Re-export `ledger-zil-apdu` for consumers
pub use ledger_zil_apdu::{self as apdu};

mod handle;
pub use handle::DeviceHandle;

mod error;
pub use error::Error;

pub mod txn;

pub mod preview;
pub use preview::{preview, Preview};

#[cfg(feature = "transport_tcp")]
/// Speculos (TCP) device handle
pub type TcpHandle = DeviceHandle<ledger_lib::transport::GenericDevice>;

#[cfg(feature = "transport_tcp")]
impl TcpHandle {
    /// Connect to a speculos instance at the provided address
    pub async fn connect_tcp(addr: std::net::SocketAddr) -> Result<Self, Error> {
        let d = transport::connect_tcp(addr).await?;
        Ok(Self::from(d))
    }
}
