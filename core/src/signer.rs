// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Streaming Schnorr signatures over secp256k1
//!
//! Signatures are computed over the full serialised transaction, which is
//! never held in memory at once. The [`Accumulator`] is driven in three phases,
//! [`begin`][Accumulator::begin] commits to a nonce and the public key,
//! [`update`][Accumulator::update] absorbs transaction chunks in order, and
//! [`finish`][Accumulator::finish] produces the `r || s` signature.
//!
//! The scheme computes `Q = kG`, `r = H(Q || P || m) mod n` and `s = k - r.x mod n`
//! with compressed point encodings and SHA-256.

use k256::{
    elliptic_curve::{
        ops::Reduce,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field, PrimeField,
    },
    EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256,
};
use rand_core::CryptoRngCore;
use sha2::{Digest as _, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::engine::{Driver, Error};

pub use ledger_zil_apdu::SIGNATURE_LEN;

/// Schnorr signature (`r || s`, big-endian)
pub type Signature = [u8; SIGNATURE_LEN];

/// Compressed secp256k1 public key
pub type PublicKey = [u8; 33];

/// BIP-0044 coin type for Zilliqa
pub const ZIL_COIN_TYPE: u32 = 313;

const HARDENED: u32 = 0x8000_0000;

/// Derivation path for a given key index (`44'/313'/index'/0'/0'`)
pub const fn key_path(key_index: u32) -> [u32; 5] {
    [
        44 | HARDENED,
        ZIL_COIN_TYPE | HARDENED,
        key_index | HARDENED,
        HARDENED,
        HARDENED,
    ]
}

/// Three-phase streaming signer
pub trait Accumulator {
    /// Derive session key material and initialise signing state
    fn begin(&mut self, key_index: u32) -> Result<(), Error>;

    /// Absorb the next run of message bytes
    fn update(&mut self, bytes: &[u8]);

    /// Re-derive key material and produce the signature
    fn finish(&mut self, key_index: u32) -> Result<Signature, Error>;
}

/// Per-signature state, the nonce is zeroized on drop
struct SchnorrState {
    nonce: Zeroizing<Scalar>,
    hasher: Sha256,
}

/// Schnorr [Accumulator] using keys derived by a [Driver]
pub struct SchnorrSigner<'a, DRV: Driver, RNG: CryptoRngCore> {
    drv: &'a DRV,
    rng: &'a mut RNG,
    state: Option<SchnorrState>,
}

impl<'a, DRV: Driver, RNG: CryptoRngCore> SchnorrSigner<'a, DRV, RNG> {
    pub fn new(drv: &'a DRV, rng: &'a mut RNG) -> Self {
        Self {
            drv,
            rng,
            state: None,
        }
    }
}

impl<'a, DRV: Driver, RNG: CryptoRngCore> Accumulator for SchnorrSigner<'a, DRV, RNG> {
    #[cfg_attr(feature = "noinline", inline(never))]
    fn begin(&mut self, key_index: u32) -> Result<(), Error> {
        // Drop (and zeroize) any prior state
        self.state = None;

        let secret = derive_secret(self.drv, key_index)?;
        let public_key = point_bytes(&(ProjectivePoint::GENERATOR * *secret));
        drop(secret);

        let nonce = Zeroizing::new(random_nonzero(&mut *self.rng));
        let q = point_bytes(&(ProjectivePoint::GENERATOR * *nonce));

        let mut hasher = Sha256::new();
        hasher.update(q);
        hasher.update(public_key);

        self.state = Some(SchnorrState { nonce, hasher });

        Ok(())
    }

    fn update(&mut self, bytes: &[u8]) {
        if let Some(s) = &mut self.state {
            s.hasher.update(bytes);
        }
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn finish(&mut self, key_index: u32) -> Result<Signature, Error> {
        let SchnorrState { nonce, hasher } = self.state.take().ok_or(Error::InvalidState)?;

        let r = <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize());
        if bool::from(r.is_zero()) {
            return Err(Error::SignFailed);
        }

        let secret = derive_secret(self.drv, key_index)?;
        let mut rx = r * *secret;
        drop(secret);

        let s = *nonce - rx;
        rx.zeroize();
        drop(nonce);

        if bool::from(s.is_zero()) {
            return Err(Error::SignFailed);
        }

        let mut sig = [0u8; SIGNATURE_LEN];
        sig[..32].copy_from_slice(&r.to_bytes());
        sig[32..].copy_from_slice(&s.to_bytes());

        Ok(sig)
    }
}

/// Derive the secret scalar for `key_index`, zeroizing intermediate bytes
fn derive_secret<DRV: Driver>(drv: &DRV, key_index: u32) -> Result<Zeroizing<Scalar>, Error> {
    let mut raw = drv.bip32_derive_secp256k1(&key_path(key_index));

    let mut b = FieldBytes::from(raw);
    raw.zeroize();

    let secret = Option::<Scalar>::from(Scalar::from_repr(b)).map(Zeroizing::new);
    b.zeroize();

    match secret {
        Some(s) if !bool::from(s.is_zero()) => Ok(s),
        _ => Err(Error::KeyDerivation),
    }
}

/// Draw a non-zero scalar
fn random_nonzero<RNG: CryptoRngCore>(rng: &mut RNG) -> Scalar {
    loop {
        let k = Scalar::random(&mut *rng);
        if !bool::from(k.is_zero()) {
            return k;
        }
    }
}

/// Compressed SEC1 point encoding
fn point_bytes(p: &ProjectivePoint) -> PublicKey {
    let e = p.to_affine().to_encoded_point(true);

    let mut b = [0u8; 33];
    b.copy_from_slice(e.as_bytes());
    b
}

/// Fetch the compressed public key for `key_index`
pub fn public_key<DRV: Driver>(drv: &DRV, key_index: u32) -> Result<PublicKey, Error> {
    let secret = derive_secret(drv, key_index)?;
    Ok(point_bytes(&(ProjectivePoint::GENERATOR * *secret)))
}

/// Sign a complete message in one call
pub fn sign<DRV: Driver, RNG: CryptoRngCore>(
    drv: &DRV,
    rng: &mut RNG,
    key_index: u32,
    msg: &[u8],
) -> Result<Signature, Error> {
    let mut s = SchnorrSigner::new(drv, rng);
    s.begin(key_index)?;
    s.update(msg);
    s.finish(key_index)
}

/// Verify a signature over `msg` for the provided public key
pub fn verify(public_key: &PublicKey, msg: &[u8], sig: &Signature) -> bool {
    let p = match EncodedPoint::from_bytes(public_key)
        .ok()
        .and_then(|e| {
            Option::<k256::AffinePoint>::from(k256::AffinePoint::from_encoded_point(&e))
        })
    {
        Some(p) => ProjectivePoint::from(p),
        None => return false,
    };

    let scalar = |b: &[u8]| -> Option<Scalar> {
        let s = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(b)))?;
        match bool::from(s.is_zero()) {
            true => None,
            false => Some(s),
        }
    };

    let (r, s) = match (scalar(&sig[..32]), scalar(&sig[32..])) {
        (Some(r), Some(s)) => (r, s),
        _ => return false,
    };

    let q = ProjectivePoint::GENERATOR * s + p * r;
    if q == ProjectivePoint::IDENTITY {
        return false;
    }

    let mut hasher = Sha256::new();
    hasher.update(point_bytes(&q));
    hasher.update(public_key);
    hasher.update(msg);

    <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize()) == r
}
