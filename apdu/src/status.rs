// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU response status words
//!

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Status word appended to every APDU response
///
/// During transaction streaming [`StatusWord::Ok`] with an empty payload
/// requests the next chunk from the host.
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u16)]
pub enum StatusWord {
    /// Command complete (or more transaction data required)
    Ok = 0x9000,
    /// Operation rejected by the user
    UserRejected = 0x6985,
    /// Request length / framing inconsistent
    WrongDataLength = 0x6A87,
    /// Internal failure (display or signing)
    DeveloperError = 0x6B00,
    /// Malformed request parameters or transaction encoding
    InvalidParam = 0x6B01,
    /// Command issued in an invalid state
    ImproperInit = 0x6B02,
    /// Unsupported instruction
    InsNotSupported = 0x6D00,
    /// Unsupported class
    ClaNotSupported = 0x6E00,
}

impl From<StatusWord> for u16 {
    fn from(s: StatusWord) -> Self {
        s as u16
    }
}
