// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;
use ledger_proto::ApduError;

use crate::{apdu, signer::Signature};

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    None,

    /// Indicate the device is waiting for user input
    Pending,

    /// Approved signature
    Signature(Signature),
}

impl Output {
    /// Encode an [`Output`] object to a response [APDU]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None | Output::Pending => Ok(0),
            Output::Signature(signature) => apdu::sign_txn::SignatureResp {
                signature: *signature,
            }
            .encode(buff),
        }
    }

    /// Fetch signature for outputs containing this
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Output::Signature(s) => Some(s),
            _ => None,
        }
    }
}
