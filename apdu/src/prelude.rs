//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    sign_hash::{SignHashReq, HASH_LEN},
    sign_txn::{SignTxnNext, SignTxnReq, SignatureResp, NEXT_HEADER_LEN, REQ_HEADER_LEN},
    status::StatusWord,
    ApduError, ApduReq, ApduStatic, Instruction,
};

pub use encdec::{Decode, Encode};
