// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Per-command session state
//!
//! Only one command is live at a time, sessions are replaced wholesale at
//! the start of each command so no state carries over between commands.

use heapless::String;

use crate::{
    apdu::sign_hash::HASH_LEN,
    helpers::fmt_hex,
    render::DisplayBuffers,
    signer::Signature,
    stream::StreamCursor,
};

use super::Error;

/// Hex-encoded hash length
pub const HASH_HEX_LEN: usize = HASH_LEN * 2;

/// Transaction signing session
pub struct TxnSession {
    pub key_index: u32,
    pub cursor: StreamCursor,
    pub display: DisplayBuffers,
    pub signature: Option<Signature>,
}

impl TxnSession {
    pub const fn new(key_index: u32) -> Self {
        Self {
            key_index,
            cursor: StreamCursor::new(),
            display: DisplayBuffers::new(),
            signature: None,
        }
    }
}

/// Hash signing session
pub struct HashSession {
    pub key_index: u32,
    pub hash: [u8; HASH_LEN],
    pub hex: String<HASH_HEX_LEN>,
}

impl HashSession {
    pub fn new(key_index: u32, hash: [u8; HASH_LEN]) -> Result<Self, Error> {
        let mut hex = String::new();
        fmt_hex(&hash, &mut hex)?;

        Ok(Self {
            key_index,
            hash,
            hex,
        })
    }
}

/// Active command session
pub enum Session {
    None,
    Txn(TxnSession),
    Hash(HashSession),
}

impl Session {
    pub const fn new() -> Self {
        Session::None
    }

    /// Drop any active session
    pub fn clear(&mut self) {
        *self = Session::None;
    }

    /// Replace the active session with a fresh transaction session
    pub fn txn_init(&mut self, key_index: u32) -> &mut TxnSession {
        *self = Session::Txn(TxnSession::new(key_index));

        match self {
            Session::Txn(s) => s,
            // Assigned above
            _ => unreachable!(),
        }
    }

    /// Replace the active session with a hash session
    pub fn hash_init(&mut self, key_index: u32, hash: &[u8; HASH_LEN]) -> Result<(), Error> {
        self.clear();
        *self = Session::Hash(HashSession::new(key_index, *hash)?);
        Ok(())
    }

    /// Key index for the active session
    pub fn key_index(&self) -> Option<u32> {
        match self {
            Session::None => None,
            Session::Txn(s) => Some(s.key_index),
            Session::Hash(s) => Some(s.key_index),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
