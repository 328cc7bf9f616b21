// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Streaming protobuf decoder for Zilliqa transactions
//!
//! Transactions are encoded as `ProtoTransactionCoreInfo`:
//!
//! ```text
//! message ByteArray { required bytes data = 1; }
//!
//! message ProtoTransactionCoreInfo {
//!     optional uint32 version = 1;
//!     optional uint64 nonce = 2;
//!     optional bytes toaddr = 3;
//!     optional ByteArray senderpubkey = 4;
//!     optional ByteArray amount = 5;
//!     optional ByteArray gasprice = 6;
//!     optional uint64 gaslimit = 7;
//!     optional bytes code = 8;
//!     optional bytes data = 9;
//! }
//! ```
//!
//! Fields of interest are dispatched to a [`FieldVisitor`], all other fields
//! are skipped without being buffered.

use num_enum::TryFromPrimitive;
use strum::Display;

use crate::{
    engine::Error,
    helpers::{Address, RawAmount, ADDR_LEN},
    stream::{ByteRead, Limited},
};

/// Protobuf wire types
#[derive(Copy, Clone, PartialEq, Debug, Display, TryFromPrimitive)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

/// Transaction field tags
#[derive(Copy, Clone, PartialEq, Debug, Display, TryFromPrimitive)]
#[repr(u8)]
pub enum TxnField {
    Version = 1,
    Nonce = 2,
    ToAddr = 3,
    SenderPubKey = 4,
    Amount = 5,
    GasPrice = 6,
    GasLimit = 7,
    Code = 8,
    Data = 9,
}

/// Discriminator for the (structurally identical) amount fields
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum AmountKind {
    Amount,
    GasPrice,
}

/// Discriminator for variable-length payload fields
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum PayloadKind {
    Code,
    Data,
}

/// `ByteArray.data` length for amount fields
pub const AMOUNT_LEN: usize = 16;

/// Receives decoded fields of interest
pub trait FieldVisitor {
    /// Select fields to be decoded, unselected fields are skipped
    fn wants(&self, _field: TxnField) -> bool {
        true
    }

    /// Recipient address
    fn recipient(&mut self, addr: &Address) -> Result<(), Error>;

    /// Amount or gas price
    fn amount(&mut self, kind: AmountKind, value: &RawAmount) -> Result<(), Error>;

    /// Code or data payload, `src` is limited to the declared field length
    /// and any bytes not read by the visitor are skipped
    fn payload<R: ByteRead>(&mut self, kind: PayloadKind, src: &mut R) -> Result<(), Error>;
}

/// Decode a transaction from `src`, dispatching fields to `visitor`
///
/// Reads until `src` is exhausted, returning an error for malformed encodings.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn decode_txn<R: ByteRead, V: FieldVisitor>(src: &mut R, visitor: &mut V) -> Result<(), Error> {
    while src.remaining() > 0 {
        let (tag, wire) = read_key(src)?;

        let field = match u8::try_from(tag).ok().and_then(|t| TxnField::try_from(t).ok()) {
            Some(f) if visitor.wants(f) => f,
            _ => {
                skip_field(src, wire)?;
                continue;
            }
        };

        #[cfg(feature = "log")]
        log::trace!("field: {} ({})", field, wire);

        match field {
            TxnField::ToAddr => {
                let len = read_len(src, wire)?;
                if len != ADDR_LEN {
                    return Err(Error::InvalidFieldLength);
                }

                let mut addr = [0u8; ADDR_LEN];
                src.read_exact(&mut addr)?;
                visitor.recipient(&addr)?;
            }
            TxnField::Amount => decode_amount(src, wire, AmountKind::Amount, visitor)?,
            TxnField::GasPrice => decode_amount(src, wire, AmountKind::GasPrice, visitor)?,
            TxnField::Code => decode_payload(src, wire, PayloadKind::Code, visitor)?,
            TxnField::Data => decode_payload(src, wire, PayloadKind::Data, visitor)?,
            // Remaining fields are not displayed
            _ => skip_field(src, wire)?,
        }
    }

    Ok(())
}

/// Decode a `ByteArray` wrapped 128-bit amount
fn decode_amount<R: ByteRead, V: FieldVisitor>(
    src: &mut R,
    wire: WireType,
    kind: AmountKind,
    visitor: &mut V,
) -> Result<(), Error> {
    let len = read_len(src, wire)?;
    let mut inner = Limited::new(src, len)?;

    let mut seen = false;
    while inner.remaining() > 0 {
        let (tag, wire) = read_key(&mut inner)?;
        if tag != 1 {
            skip_field(&mut inner, wire)?;
            continue;
        }

        if read_len(&mut inner, wire)? != AMOUNT_LEN {
            return Err(Error::InvalidFieldLength);
        }

        let mut value = [0u8; AMOUNT_LEN];
        inner.read_exact(&mut value)?;
        visitor.amount(kind, &value)?;
        seen = true;
    }

    // `ByteArray.data` is required
    match seen {
        true => Ok(()),
        false => Err(Error::MissingField),
    }
}

/// Pass a length-delimited payload to the visitor
fn decode_payload<R: ByteRead, V: FieldVisitor>(
    src: &mut R,
    wire: WireType,
    kind: PayloadKind,
    visitor: &mut V,
) -> Result<(), Error> {
    let len = read_len(src, wire)?;

    let mut inner = Limited::new(src, len)?;
    visitor.payload(kind, &mut inner)?;
    inner.finish()
}

/// Read a field key, returning the tag and wire type
pub fn read_key<R: ByteRead>(src: &mut R) -> Result<(u32, WireType), Error> {
    let key = read_varint(src)?;

    let wire = WireType::try_from((key & 0x07) as u8).map_err(|_| Error::UnsupportedWireType)?;
    let tag = key >> 3;
    if tag == 0 || tag > u32::MAX as u64 {
        return Err(Error::InvalidVarint);
    }

    Ok((tag as u32, wire))
}

/// Read a base-128 varint (at most 10 bytes)
pub fn read_varint<R: ByteRead>(src: &mut R) -> Result<u64, Error> {
    let mut v = 0u64;

    for i in 0..10 {
        let b = src.read_u8()?;

        // Tenth byte may only carry the final bit
        if i == 9 && b > 0x01 {
            return Err(Error::InvalidVarint);
        }

        v |= ((b & 0x7f) as u64) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(v);
        }
    }

    Err(Error::InvalidVarint)
}

/// Read the length prefix of a length-delimited field
fn read_len<R: ByteRead>(src: &mut R, wire: WireType) -> Result<usize, Error> {
    if wire != WireType::LengthDelimited {
        return Err(Error::UnexpectedWireType);
    }

    let len = read_varint(src)?;
    if len > src.remaining() as u64 {
        return Err(Error::Truncated);
    }

    Ok(len as usize)
}

/// Skip a field value without buffering its content
pub fn skip_field<R: ByteRead>(src: &mut R, wire: WireType) -> Result<(), Error> {
    match wire {
        WireType::Varint => read_varint(src).map(|_| ()),
        WireType::Fixed64 => src.skip(8),
        WireType::Fixed32 => src.skip(4),
        WireType::LengthDelimited => {
            let len = read_len(src, wire)?;
            src.skip(len)
        }
        WireType::StartGroup | WireType::EndGroup => Err(Error::UnsupportedWireType),
    }
}
