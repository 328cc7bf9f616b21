// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hash signing APDU
//!

use encdec::{Decode, Encode};

use crate::{helpers::arr, ApduError, ApduStatic, Instruction, ZIL_APDU_CLA};

/// Hash length accepted by [`SignHashReq`]
pub const HASH_LEN: usize = 32;

/// Request a signature over a 32-byte hash, responds with a
/// [`SignatureResp`](crate::sign_txn::SignatureResp) following user approval
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                         HASH (32-byte)                        /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Trailing bytes are not consumed by [`Decode`], callers requiring an exact
/// payload length should check the returned length.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignHashReq {
    /// Key index for BIP-0032 derivation
    pub key_index: u32,
    /// Hash to be signed
    #[encdec(with = "arr")]
    pub hash: [u8; HASH_LEN],
}

impl ApduStatic for SignHashReq {
    const CLA: u8 = ZIL_APDU_CLA;
    const INS: u8 = Instruction::SignHash as u8;
}

impl SignHashReq {
    pub fn new(key_index: u32, hash: [u8; HASH_LEN]) -> Self {
        Self { key_index, hash }
    }
}
