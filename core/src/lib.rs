// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Zilliqa hardware wallet core
//!
//! This provides a common [Engine][engine::Engine] supporting streamed transaction
//! decoding, display and signing for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine::Engine] are performed via [Event][engine::Event]s
//! and [Output][engine::Output]s, see [ledger_zil_apdu] for APDU objects and wire encodings.
//!
//! ## Pipeline
//!
//! Serialised transactions rarely fit a single APDU, so the engine pulls them
//! from the host incrementally:
//!
//! - [`stream`] presents the transaction as a continuous byte source backed by
//!   a 256-byte chunk buffer, requesting refills from the host via an
//!   [`Exchange`][engine::Exchange] and feeding every received chunk to the
//!   signer before the decoder can observe it
//! - [`decode`] walks the protobuf transaction schema, dispatching fields of
//!   interest to a [`FieldVisitor`][decode::FieldVisitor] and skipping the rest
//! - [`signer`] accumulates the Schnorr signature over the streamed bytes
//! - [`render`] produces bounded display strings for the recipient, amounts,
//!   code, data and (for known contracts) the decoded call parameters
//!
//! ## Operations
//!
//! ### Signing a transaction
//!
//! 1. Issue [`SignTxnReq`][ledger_zil_apdu::sign_txn::SignTxnReq] with the key index,
//!    the first transaction chunk and the number of bytes still to be sent
//! 2. While the device responds `0x9000` with an empty payload, issue
//!    [`SignTxnNext`][ledger_zil_apdu::sign_txn::SignTxnNext] with the next chunk
//! 3. Once the transaction is fully consumed the device displays the transaction
//!    and returns a [`SignatureResp`][ledger_zil_apdu::sign_txn::SignatureResp]
//!    on approval, or `0x6985` if rejected
//!
//! ### Signing a hash
//!
//! Issue [`SignHashReq`][ledger_zil_apdu::sign_hash::SignHashReq], the hash is
//! displayed and signed following approval.
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_zil_apdu::{self as apdu};

pub mod decode;

pub mod engine;

pub mod helpers;

pub mod json;

pub mod render;

pub mod signer;

pub mod stream;
