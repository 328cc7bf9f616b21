// Copyright (c) 2022-2023 The MobileCoin Foundation

use bip32::{ChildNumber, DerivationPath, Language, Mnemonic, XPrv};

use ledger_zil_core::{
    engine::Driver,
    signer::{public_key, PublicKey},
};

/// Default test mnemonic, shared with simulator configurations
pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

/// Driver implementation for test use
#[derive(Clone)]
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl TestDriver {
    /// Create a driver from a BIP39 mnemonic phrase
    pub fn new(phrase: &str) -> anyhow::Result<Self> {
        let m = Mnemonic::new(phrase, Language::English)
            .map_err(|e| anyhow::anyhow!("invalid mnemonic: {}", e))?;

        let mut seed = [0u8; 64];
        seed.copy_from_slice(m.to_seed("").as_bytes());

        Ok(Self { seed })
    }

    /// Fetch the compressed public key for a key index
    pub fn public_key(&self, key_index: u32) -> PublicKey {
        public_key(self, key_index).expect("key derivation failed")
    }
}

impl Default for TestDriver {
    fn default() -> Self {
        Self::new(MNEMONIC).expect("invalid default mnemonic")
    }
}

impl Driver for TestDriver {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> [u8; 32] {
        let mut p = DerivationPath::default();
        p.extend(path.iter().map(|i| ChildNumber(*i)));

        let k = XPrv::derive_from_path(self.seed, &p).expect("derivation failed");
        k.to_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derive_keys() {
        let d = TestDriver::default();

        let a = d.public_key(0);
        let b = d.public_key(1);

        assert_ne!(a, b);
        assert!(a[0] == 0x02 || a[0] == 0x03);
        assert_eq!(d.public_key(0), a);
    }
}
