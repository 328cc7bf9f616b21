// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Zilliqa address encoding
//!
//! Addresses are the last 20 bytes of the SHA-256 digest of a compressed
//! secp256k1 public key, displayed as bech32 with a `zil` human-readable part.

use bech32::{primitives::decode::CheckedHrpstring, Bech32, Hrp};
use heapless::String;
use sha2::{Digest as _, Sha256};

use crate::engine::Error;

/// Raw address length
pub const ADDR_LEN: usize = 20;

/// Encoded bech32 address length (`zil1` + 32 data + 6 checksum)
pub const BECH32_ADDR_LEN: usize = 42;

/// Hex-encoded address length (without prefix)
pub const HEX_ADDR_LEN: usize = ADDR_LEN * 2;

/// Human-readable part for Zilliqa bech32 addresses
pub const ZIL_HRP: &str = "zil";

// Human-readable part, separator, 32 data and 6 checksum characters
static_assertions::const_assert_eq!(BECH32_ADDR_LEN, ZIL_HRP.len() + 1 + 32 + 6);

/// Raw address bytes
pub type Address = [u8; ADDR_LEN];

/// Bech32 address string
pub type AddressStr = String<BECH32_ADDR_LEN>;

/// Encode a raw address to bech32
pub fn encode_address(addr: &Address, out: &mut AddressStr) -> Result<(), Error> {
    out.clear();

    let hrp = Hrp::parse_unchecked(ZIL_HRP);
    bech32::encode_lower_to_fmt::<Bech32, _>(out, hrp, addr).map_err(|_| Error::AddressEncoding)?;

    // Encoded addresses are always fixed length
    if out.len() != BECH32_ADDR_LEN {
        return Err(Error::AddressEncoding);
    }

    Ok(())
}

/// Decode a bech32 address, checking the checksum and human-readable part
pub fn decode_address(s: &str) -> Result<Address, Error> {
    let c = CheckedHrpstring::new::<Bech32>(s).map_err(|_| Error::AddressEncoding)?;
    if c.hrp() != Hrp::parse_unchecked(ZIL_HRP) {
        return Err(Error::AddressEncoding);
    }

    let mut addr = [0u8; ADDR_LEN];
    let mut n = 0;
    for b in c.byte_iter() {
        if n >= ADDR_LEN {
            return Err(Error::AddressEncoding);
        }
        addr[n] = b;
        n += 1;
    }

    match n == ADDR_LEN {
        true => Ok(addr),
        false => Err(Error::AddressEncoding),
    }
}

/// Decode a 40 character hex address, with or without a `0x` prefix
pub fn decode_hex_address(s: &str) -> Result<Address, Error> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if s.len() != HEX_ADDR_LEN {
        return Err(Error::AddressEncoding);
    }

    let mut addr = [0u8; ADDR_LEN];
    hex::decode_to_slice(s, &mut addr).map_err(|_| Error::AddressEncoding)?;

    Ok(addr)
}

/// Compute the address for a compressed secp256k1 public key
pub fn address_from_public_key(public_key: &[u8; 33]) -> Address {
    let h = Sha256::digest(public_key);

    let mut addr = [0u8; ADDR_LEN];
    addr.copy_from_slice(&h[32 - ADDR_LEN..]);
    addr
}
