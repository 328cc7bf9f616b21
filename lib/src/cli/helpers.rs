// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_zil_core::helpers::{decode_address, decode_hex_address, Address};

#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 32>(pub [u8; N]);

impl<const N: usize> std::str::FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; N];

        hex::decode_to_slice(s.trim_start_matches("0x"), &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> AsRef<[u8; N]> for HexData<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> std::fmt::Display for HexData<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Recipient address, accepting bech32 (`zil1...`) or hex encodings
#[derive(Clone, PartialEq, Debug)]
pub struct ZilAddress(pub Address);

impl std::str::FromStr for ZilAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let r = match s.starts_with("zil1") {
            true => decode_address(s),
            false => decode_hex_address(s),
        };

        r.map(ZilAddress)
            .map_err(|e| anyhow::anyhow!("invalid address '{}': {}", s, e))
    }
}
