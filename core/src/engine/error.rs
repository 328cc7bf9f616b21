// Copyright (c) 2022-2023 The MobileCoin Foundation

use strum::Display;

use ledger_proto::ApduError;

use ledger_zil_apdu::StatusWord;

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid request length
    #[cfg_attr(feature = "thiserror", error("Invalid request length"))]
    InvalidLength = 0x00,

    /// Declared chunk length does not match received bytes
    #[cfg_attr(feature = "thiserror", error("Chunk length mismatch"))]
    ChunkLengthMismatch = 0x01,

    /// Chunk exceeds local buffer capacity
    #[cfg_attr(feature = "thiserror", error("Chunk exceeds buffer capacity"))]
    ChunkTooLarge = 0x02,

    /// Declared transaction exceeds maximum size
    #[cfg_attr(feature = "thiserror", error("Transaction too large"))]
    TxnTooLarge = 0x03,

    /// Host owed count inconsistent with delivered chunk
    #[cfg_attr(feature = "thiserror", error("Owed byte count mismatch"))]
    OwedMismatch = 0x04,

    /// Empty refill chunk
    #[cfg_attr(feature = "thiserror", error("Empty chunk"))]
    EmptyChunk = 0x05,

    /// Host has no more bytes but the decoder requires more
    #[cfg_attr(feature = "thiserror", error("Host exhausted"))]
    HostExhausted = 0x06,

    /// Transport reset by host, command aborted
    #[cfg_attr(feature = "thiserror", error("Transport reset"))]
    TransportReset = 0x07,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x08,

    /// Invalid engine state
    #[cfg_attr(feature = "thiserror", error("Invalid engine state"))]
    InvalidState = 0x09,

    /// Instruction not handled by the engine
    #[cfg_attr(feature = "thiserror", error("Unsupported instruction"))]
    UnsupportedInstruction = 0x0a,

    /// Malformed varint
    #[cfg_attr(feature = "thiserror", error("Invalid varint"))]
    InvalidVarint = 0x10,

    /// Unsupported (group) wire type
    #[cfg_attr(feature = "thiserror", error("Unsupported wire type"))]
    UnsupportedWireType = 0x11,

    /// Known field with unexpected wire type
    #[cfg_attr(feature = "thiserror", error("Unexpected wire type"))]
    UnexpectedWireType = 0x12,

    /// Field extends beyond the end of the transaction
    #[cfg_attr(feature = "thiserror", error("Truncated field"))]
    Truncated = 0x13,

    /// Field length differs from the expected length
    #[cfg_attr(feature = "thiserror", error("Invalid field length"))]
    InvalidFieldLength = 0x14,

    /// Required field missing
    #[cfg_attr(feature = "thiserror", error("Missing field"))]
    MissingField = 0x15,

    /// Read beyond declared field length
    #[cfg_attr(feature = "thiserror", error("Field overrun"))]
    FieldOverrun = 0x16,

    /// Rendered text exceeds buffer capacity
    #[cfg_attr(feature = "thiserror", error("Display overflow"))]
    DisplayOverflow = 0x20,

    /// Address encoding failed
    #[cfg_attr(feature = "thiserror", error("Address encoding failed"))]
    AddressEncoding = 0x21,

    /// Invalid decimal digits
    #[cfg_attr(feature = "thiserror", error("Invalid decimal digits"))]
    InvalidDigits = 0x22,

    /// Key derivation failed
    #[cfg_attr(feature = "thiserror", error("Key derivation failed"))]
    KeyDerivation = 0x30,

    /// Signing failed
    #[cfg_attr(feature = "thiserror", error("Signing failed"))]
    SignFailed = 0x31,
}

/// Error classification
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// Host-supplied length / shape inconsistency
    Protocol,
    /// Malformed transaction encoding
    Decode,
    /// Display rendering failure
    Display,
    /// Key derivation or signing failure
    Crypto,
}

impl Error {
    /// Fetch the [ErrorKind] for an error
    pub fn kind(&self) -> ErrorKind {
        use Error::*;

        match self {
            InvalidLength | ChunkLengthMismatch | ChunkTooLarge | TxnTooLarge | OwedMismatch
            | EmptyChunk | HostExhausted | TransportReset | UnexpectedEvent | InvalidState
            | UnsupportedInstruction => ErrorKind::Protocol,
            InvalidVarint | UnsupportedWireType | UnexpectedWireType | Truncated
            | InvalidFieldLength | MissingField | FieldOverrun => ErrorKind::Decode,
            DisplayOverflow | AddressEncoding | InvalidDigits => ErrorKind::Display,
            KeyDerivation | SignFailed => ErrorKind::Crypto,
        }
    }

    /// Status word reported to the host for this error
    pub fn status(&self) -> StatusWord {
        match (self, self.kind()) {
            (Error::UnexpectedEvent | Error::InvalidState, _) => StatusWord::ImproperInit,
            (Error::UnsupportedInstruction, _) => StatusWord::InsNotSupported,
            (_, ErrorKind::Protocol) => StatusWord::WrongDataLength,
            (_, ErrorKind::Decode) => StatusWord::InvalidParam,
            (_, ErrorKind::Display | ErrorKind::Crypto) => StatusWord::DeveloperError,
        }
    }
}

/// APDU decode failures are framing errors
impl From<ApduError> for Error {
    fn from(_e: ApduError) -> Self {
        Error::InvalidLength
    }
}
