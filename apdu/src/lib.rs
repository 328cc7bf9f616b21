// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Zilliqa app communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! with Zilliqa hardware wallets.
//!
//! APDUs use a primitive binary encoding, all integer fields are little-endian `u32`s to match the
//! existing host tooling. Transactions larger than a single APDU are streamed, the device
//! responds [`StatusWord::Ok`] with an empty payload to request each subsequent [`SignTxnNext`]
//! chunk until the host reports no more bytes owed.
//!

#![no_std]

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod prelude;
pub mod sign_hash;
pub mod sign_txn;
pub mod status;

mod helpers;

pub use status::StatusWord;

/// Zilliqa APDU Class
pub const ZIL_APDU_CLA: u8 = 0xe0;

/// Maximum APDU payload length
pub const APDU_PAYLOAD_MAX: usize = 255;

/// Local chunk buffer capacity, chunks larger than this are rejected
pub const TXN_CHUNK_MAX: usize = 256;

/// Maximum serialised transaction size
pub const TXN_SIZE_MAX: u32 = 8 * 1024 * 1024;

/// Schnorr signature length (`r || s`)
pub const SIGNATURE_LEN: usize = 64;

/// Zilliqa APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x01,

    /// Fetch public key / address
    GetPublicKey = 0x02,

    /// Stream and sign a serialised transaction
    SignTxn = 0x04,

    /// Sign a 32-byte hash
    SignHash = 0x08,
}
