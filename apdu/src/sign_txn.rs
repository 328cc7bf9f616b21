// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing APDUs
//!
//! Serialised transactions are streamed to the device as a [`SignTxnReq`]
//! carrying the first chunk followed by zero or more [`SignTxnNext`] chunks,
//! each issued in response to an empty [`StatusWord::Ok`](crate::StatusWord::Ok)
//! reply. The completed signature is returned as a [`SignatureResp`].
//!
//! Chunk decoding checks framing only, enforcing chunk capacity is left to
//! the receiver.

use encdec::{Decode, Encode};

use crate::{helpers::arr, ApduError, ApduStatic, Instruction, SIGNATURE_LEN, ZIL_APDU_CLA};

/// [`SignTxnReq`] header length (key index, bytes owed, chunk length)
pub const REQ_HEADER_LEN: usize = 12;

/// [`SignTxnNext`] header length (bytes owed, chunk length)
pub const NEXT_HEADER_LEN: usize = 8;

/// Start a streamed transaction signing operation
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          BYTES_OWED                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           CHUNK_LEN                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                             CHUNK                             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `BYTES_OWED` is the number of transaction bytes remaining with the host
/// _after_ this chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct SignTxnReq<'a> {
    /// Key index for BIP-0032 derivation
    pub key_index: u32,
    /// Bytes remaining to be sent by the host
    pub bytes_owed: u32,
    /// First transaction chunk
    pub chunk: &'a [u8],
}

impl<'a> ApduStatic for SignTxnReq<'a> {
    const CLA: u8 = ZIL_APDU_CLA;
    const INS: u8 = Instruction::SignTxn as u8;
}

impl<'a> SignTxnReq<'a> {
    /// Create a new [`SignTxnReq`]
    pub fn new(key_index: u32, bytes_owed: u32, chunk: &'a [u8]) -> Self {
        Self {
            key_index,
            bytes_owed,
            chunk,
        }
    }
}

impl<'a> Encode for SignTxnReq<'a> {
    type Error = ApduError;

    /// Encode a [`SignTxnReq`] APDU into the provided buffer
    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        // Check buffer length is valid
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        // Write key index
        index += self.key_index.encode(&mut buff[index..])?;

        // Write owed length, chunk length and chunk
        index += encode_chunk(&mut buff[index..], self.bytes_owed, self.chunk)?;

        Ok(index)
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(REQ_HEADER_LEN + self.chunk.len())
    }
}

impl<'a> Decode<'a> for SignTxnReq<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`SignTxnReq`] APDU from the provided buffer
    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Check header length
        if buff.len() < REQ_HEADER_LEN {
            return Err(ApduError::InvalidLength);
        }

        // Read key index
        let (key_index, n) = u32::decode(&buff[index..])?;
        index += n;

        // Read owed length and chunk
        let (bytes_owed, chunk, n) = decode_chunk(&buff[index..])?;
        index += n;

        Ok((
            Self {
                key_index,
                bytes_owed,
                chunk,
            },
            index,
        ))
    }
}

/// Subsequent transaction chunk, sent in response to a request for more data
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          BYTES_OWED                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           CHUNK_LEN                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                             CHUNK                             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Instruction is unchanged from [`SignTxnReq`], the device distinguishes
/// continuation chunks by its streaming state.
#[derive(Clone, Debug, PartialEq)]
pub struct SignTxnNext<'a> {
    /// Bytes remaining to be sent by the host
    pub bytes_owed: u32,
    /// Transaction chunk
    pub chunk: &'a [u8],
}

impl<'a> ApduStatic for SignTxnNext<'a> {
    const CLA: u8 = ZIL_APDU_CLA;
    const INS: u8 = Instruction::SignTxn as u8;
}

impl<'a> SignTxnNext<'a> {
    /// Create a new [`SignTxnNext`]
    pub fn new(bytes_owed: u32, chunk: &'a [u8]) -> Self {
        Self { bytes_owed, chunk }
    }
}

impl<'a> Encode for SignTxnNext<'a> {
    type Error = ApduError;

    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        encode_chunk(buff, self.bytes_owed, self.chunk)
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(NEXT_HEADER_LEN + self.chunk.len())
    }
}

impl<'a> Decode<'a> for SignTxnNext<'a> {
    type Output = Self;
    type Error = ApduError;

    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let (bytes_owed, chunk, n) = decode_chunk(buff)?;
        Ok((Self { bytes_owed, chunk }, n))
    }
}

/// Write `BYTES_OWED | CHUNK_LEN | CHUNK`
fn encode_chunk(buff: &mut [u8], bytes_owed: u32, chunk: &[u8]) -> Result<usize, ApduError> {
    let mut index = 0;

    if buff.len() < NEXT_HEADER_LEN + chunk.len() {
        return Err(ApduError::InvalidLength);
    }

    index += bytes_owed.encode(&mut buff[index..])?;
    index += (chunk.len() as u32).encode(&mut buff[index..])?;

    buff[index..][..chunk.len()].copy_from_slice(chunk);
    index += chunk.len();

    Ok(index)
}

/// Read `BYTES_OWED | CHUNK_LEN | CHUNK`, the declared chunk length must
/// match the bytes actually received
fn decode_chunk(buff: &[u8]) -> Result<(u32, &[u8], usize), ApduError> {
    let mut index = 0;

    if buff.len() < NEXT_HEADER_LEN {
        return Err(ApduError::InvalidLength);
    }

    let (bytes_owed, n) = u32::decode(&buff[index..])?;
    index += n;

    let (chunk_len, n) = u32::decode(&buff[index..])?;
    index += n;

    let chunk = &buff[index..];
    if chunk_len as usize != chunk.len() {
        return Err(ApduError::InvalidLength);
    }

    Ok((bytes_owed, chunk, index + chunk.len()))
}

/// Signature response, `r || s` as 32-byte big-endian scalars
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        R (32-byte, BE)                        /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        S (32-byte, BE)                        /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignatureResp {
    #[encdec(with = "arr")]
    pub signature: [u8; SIGNATURE_LEN],
}

impl SignatureResp {
    pub fn new(signature: [u8; SIGNATURE_LEN]) -> Self {
        Self { signature }
    }
}
