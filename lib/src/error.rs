// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_zil_apdu::{ApduError, StatusWord};
use tokio::time::error::Elapsed;

/// Ledger Zilliqa API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Device transport error
    #[error("Transport error: {0}")]
    Transport(#[from] ledger_lib::Error),

    /// APDU encode / decode error
    #[error("APDU error: {0:?}")]
    Apdu(ApduError),

    /// Command APDU exceeds the maximum payload length
    #[error("Invalid APDU length")]
    InvalidLength,

    /// Transaction exceeds the maximum streamed size
    #[error("Transaction too large ({0} bytes)")]
    TxnTooLarge(usize),

    /// Unexpected APDU response
    #[error("Unexpected APDU response")]
    UnexpectedResponse,

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// Device returned an error status
    #[error("Device error: {0} ({1:#06x})")]
    Status(StatusWord, u16),

    /// Device returned an unrecognised status word
    #[error("Unknown device status: {0:#06x}")]
    UnknownStatus(u16),

    /// User denied operation
    #[error("Operation rejected by user")]
    UserDenied,

    /// Local transaction decoding failed
    #[error("Transaction decode failed: {0}")]
    Engine(ledger_zil_core::engine::Error),
}

impl Error {
    /// Map a response status word to a result
    pub fn check_status(sw: u16) -> Result<(), Error> {
        match StatusWord::try_from(sw) {
            Ok(StatusWord::Ok) => Ok(()),
            Ok(StatusWord::UserRejected) => Err(Error::UserDenied),
            Ok(s) => Err(Error::Status(s, sw)),
            Err(_) => Err(Error::UnknownStatus(sw)),
        }
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        Error::Apdu(e)
    }
}

impl From<ledger_zil_core::engine::Error> for Error {
    fn from(e: ledger_zil_core::engine::Error) -> Self {
        Error::Engine(e)
    }
}
