// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tests for Zilliqa wallet integration.
//!
//! Generic over [ledger_zil::Exchange] for reuse against the
//! in-process [engine::EngineTransport] or a speculos instance.
//!

mod driver;
pub use driver::{TestDriver, MNEMONIC};

pub mod engine;

pub mod vectors;

pub mod transaction;

pub mod hash;
