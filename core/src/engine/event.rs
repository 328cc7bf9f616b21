// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_zil_apdu::prelude::*;

use super::Error;

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, Debug, PartialEq)]
pub enum Event<'a> {
    None,

    /// Start signing a streamed transaction
    SignTxn {
        key_index: u32,
        bytes_owed: u32,
        chunk: &'a [u8],
    },

    /// Sign a 32-byte hash
    SignHash {
        key_index: u32,
        hash: [u8; HASH_LEN],
    },
}

impl<'a> From<SignTxnReq<'a>> for Event<'a> {
    fn from(a: SignTxnReq<'a>) -> Self {
        Event::SignTxn {
            key_index: a.key_index,
            bytes_owed: a.bytes_owed,
            chunk: a.chunk,
        }
    }
}

impl<'a> From<SignHashReq> for Event<'a> {
    fn from(a: SignHashReq) -> Self {
        Event::SignHash {
            key_index: a.key_index,
            hash: a.hash,
        }
    }
}

/// Helper for decoding APDUs to events, the APDU must consume the whole payload
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, ApduError>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    match T::decode(buff) {
        Ok((v, n)) if n == buff.len() => Ok(Event::from(v)),
        Ok(_) => Err(ApduError::InvalidLength),
        Err(e) => Err(e),
    }
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    ///
    /// Refill chunks ([`SignTxnNext`]) are consumed mid-command via
    /// [`Exchange`][super::Exchange] and are not events.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, Error> {
        match ins {
            SignTxnReq::INS => match decode_event::<SignTxnReq>(buff) {
                Ok(e) => Ok(e),
                // Complete header, declared chunk length disagrees with payload
                Err(_) if buff.len() >= REQ_HEADER_LEN => Err(Error::ChunkLengthMismatch),
                Err(e) => Err(e.into()),
            },
            SignHashReq::INS => decode_event::<SignHashReq>(buff).map_err(Error::from),
            _ => Err(Error::UnsupportedInstruction),
        }
    }

    /// Key index for signing events
    pub fn key_index(&self) -> Option<u32> {
        match self {
            Event::None => None,
            Event::SignTxn { key_index, .. } | Event::SignHash { key_index, .. } => {
                Some(*key_index)
            }
        }
    }
}
