// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction construction and chunking for streamed signing
//!

use ledger_zil_apdu::{APDU_PAYLOAD_MAX, TXN_SIZE_MAX};

use crate::Error;

/// Maximum chunk carried by the initial [`SignTxnReq`](crate::apdu::prelude::SignTxnReq)
/// (key index, bytes owed and chunk length precede the chunk)
pub const FIRST_CHUNK_MAX: usize = APDU_PAYLOAD_MAX - 12;

/// Maximum chunk carried by each [`SignTxnNext`](crate::apdu::prelude::SignTxnNext)
pub const NEXT_CHUNK_MAX: usize = APDU_PAYLOAD_MAX - 8;

/// Transaction chunk with the number of bytes remaining after it
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Chunk<'a> {
    pub data: &'a [u8],
    pub bytes_owed: u32,
}

/// Split a serialised transaction into APDU-sized chunks
///
/// The first chunk is always present (and may be empty), `bytes_owed`
/// reaches zero on the final chunk.
pub fn plan_chunks(txn: &[u8]) -> Result<Vec<Chunk<'_>>, Error> {
    if txn.len() > TXN_SIZE_MAX as usize {
        return Err(Error::TxnTooLarge(txn.len()));
    }

    let (first, mut rest) = txn.split_at(txn.len().min(FIRST_CHUNK_MAX));

    let mut chunks = vec![Chunk {
        data: first,
        bytes_owed: rest.len() as u32,
    }];

    while !rest.is_empty() {
        let (data, r) = rest.split_at(rest.len().min(NEXT_CHUNK_MAX));
        rest = r;

        chunks.push(Chunk {
            data,
            bytes_owed: rest.len() as u32,
        });
    }

    Ok(chunks)
}

/// Zilliqa transaction, serialised to the protobuf `ProtoTransactionCoreInfo`
/// message for signing
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Transaction {
    /// Chain identifier (upper half of the version field)
    pub chain_id: u16,
    /// Message version (lower half of the version field)
    pub msg_version: u16,
    pub nonce: u64,
    /// Recipient address
    pub to_addr: [u8; 20],
    /// Compressed sender public key, omitted when empty
    pub sender_pubkey: Vec<u8>,
    /// Amount in Qa
    pub amount: u128,
    /// Gas price in Qa
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Contract code, omitted when empty
    pub code: Vec<u8>,
    /// Contract call data, omitted when empty
    pub data: Vec<u8>,
}

impl Transaction {
    /// Combined version field, `chain_id << 16 | msg_version`
    pub fn version(&self) -> u32 {
        ((self.chain_id as u32) << 16) | self.msg_version as u32
    }
}

#[cfg(feature = "prost")]
pub use proto::*;

#[cfg(feature = "prost")]
mod proto {
    use prost::Message;

    use super::Transaction;

    /// Wrapped byte array, used for public keys and big-endian amounts
    #[derive(Clone, PartialEq, Message)]
    pub struct ByteArray {
        #[prost(bytes = "vec", required, tag = "1")]
        pub data: Vec<u8>,
    }

    /// Transaction message as signed by the device
    #[derive(Clone, PartialEq, Message)]
    pub struct ProtoTransactionCoreInfo {
        #[prost(uint32, optional, tag = "1")]
        pub version: Option<u32>,
        #[prost(uint64, optional, tag = "2")]
        pub nonce: Option<u64>,
        #[prost(bytes = "vec", optional, tag = "3")]
        pub toaddr: Option<Vec<u8>>,
        #[prost(message, optional, tag = "4")]
        pub senderpubkey: Option<ByteArray>,
        #[prost(message, optional, tag = "5")]
        pub amount: Option<ByteArray>,
        #[prost(message, optional, tag = "6")]
        pub gasprice: Option<ByteArray>,
        #[prost(uint64, optional, tag = "7")]
        pub gaslimit: Option<u64>,
        #[prost(bytes = "vec", optional, tag = "8")]
        pub code: Option<Vec<u8>>,
        #[prost(bytes = "vec", optional, tag = "9")]
        pub data: Option<Vec<u8>>,
    }

    fn non_empty(b: &[u8]) -> Option<Vec<u8>> {
        match b.is_empty() {
            true => None,
            false => Some(b.to_vec()),
        }
    }

    impl From<&Transaction> for ProtoTransactionCoreInfo {
        fn from(t: &Transaction) -> Self {
            Self {
                version: Some(t.version()),
                nonce: Some(t.nonce),
                toaddr: Some(t.to_addr.to_vec()),
                senderpubkey: non_empty(&t.sender_pubkey).map(|data| ByteArray { data }),
                amount: Some(ByteArray {
                    data: t.amount.to_be_bytes().to_vec(),
                }),
                gasprice: Some(ByteArray {
                    data: t.gas_price.to_be_bytes().to_vec(),
                }),
                gaslimit: Some(t.gas_limit),
                code: non_empty(&t.code),
                data: non_empty(&t.data),
            }
        }
    }

    impl Transaction {
        /// Serialise the transaction for signing
        pub fn encode(&self) -> Vec<u8> {
            ProtoTransactionCoreInfo::from(self).encode_to_vec()
        }
    }
}
