// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides transaction and hash signing for Zilliqa hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! Transactions are streamed from the host via an [Exchange], decoded for
//! display and signed in a single pass. The signature is held until the user
//! approves or denies the request.

use core::fmt::Write;

use heapless::String;
use rand_core::{CryptoRngCore, OsRng};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::{
    decode::decode_txn,
    json::{Tokens, MAX_TOKENS},
    render::{DisplayBuffers, TxnRenderer},
    signer::{sign, Accumulator, SchnorrSigner},
    stream::ByteSource,
};

pub use crate::render::{ContractPolicy, KNOWN_CONTRACTS};

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::{Error, ErrorKind};

mod exchange;
pub use exchange::{Exchange, NoExchange};

mod session;
pub use session::{HashSession, Session, TxnSession, HASH_HEX_LEN};

/// Maximum length of the key prompt (`with Key #4294967295?`)
pub const KEY_PROMPT_MAX: usize = 24;

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no request running
    Init,
    /// Request decoded and signed, pending user approval
    Pending,
    /// Request approved and signature returned
    Complete,
    /// Request denied by the user
    Denied,
    /// Request failed
    Error,
}

/// [Engine] provides hardware-independent support for Zilliqa wallet operations
pub struct Engine<DRV: Driver, RNG: CryptoRngCore = OsRng> {
    state: State,
    session: Session,
    policy: ContractPolicy,
    tokens: Tokens<MAX_TOKENS>,

    drv: DRV,
    rng: RNG,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// BIP-0032 derivation for secp256k1 keys, returning the private key
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> [u8; 32];
}

impl<T: Driver> Driver for &T {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> [u8; 32] {
        T::bip32_derive_secp256k1(self, path)
    }
}

impl<T: Driver> Driver for &mut T {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> [u8; 32] {
        T::bip32_derive_secp256k1(self, path)
    }
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver,
    /// using the default [OsRng]
    pub const fn new(drv: DRV) -> Self {
        Self::new_with_rng(drv, OsRng {})
    }
}

impl<DRV: Driver, RNG: CryptoRngCore> Engine<DRV, RNG> {
    /// Create a new engine instance with the provided driver and rng
    pub const fn new_with_rng(drv: DRV, rng: RNG) -> Self {
        Self {
            state: State::Init,
            session: Session::new(),
            policy: ContractPolicy::KnownContracts,
            tokens: Tokens::new(),
            drv,
            rng,
        }
    }

    /// Handle incoming events, pulling further transaction chunks via `host`
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update<H: Exchange>(&mut self, evt: &Event, host: &mut H) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => Ok(Output::None),

            // New requests are rejected until the pending request is resolved
            (State::Pending, _) => Err(Error::UnexpectedEvent),

            (
                _,
                Event::SignTxn {
                    key_index,
                    bytes_owed,
                    chunk,
                },
            ) => {
                if let Err(e) = self.sign_txn(*key_index, *bytes_owed, chunk, host) {
                    #[cfg(feature = "log")]
                    log::debug!("sign txn failed: {}", e);

                    self.session.clear();
                    self.state = State::Error;
                    return Err(e);
                }

                self.state = State::Pending;
                Ok(Output::Pending)
            }

            (_, Event::SignHash { key_index, hash }) => {
                if let Err(e) = self.session.hash_init(*key_index, hash) {
                    self.session.clear();
                    self.state = State::Error;
                    return Err(e);
                }

                self.state = State::Pending;
                Ok(Output::Pending)
            }
        }
    }

    /// Stream, decode and sign a transaction
    fn sign_txn<H: Exchange>(
        &mut self,
        key_index: u32,
        bytes_owed: u32,
        chunk: &[u8],
        host: &mut H,
    ) -> Result<(), Error> {
        let s = self.session.txn_init(key_index);

        // Size checks prior to any signing
        s.cursor.reset(chunk, bytes_owed)?;

        let mut signer = SchnorrSigner::new(&self.drv, &mut self.rng);
        signer.begin(key_index)?;
        signer.update(s.cursor.unread());

        let mut src = ByteSource::new(&mut s.cursor, host, &mut signer);
        decode_txn(&mut src, &mut TxnRenderer::new(&mut s.display))?;

        #[cfg(feature = "log")]
        log::debug!("decoded txn ({} refills)", src.refills());

        s.signature = Some(signer.finish(key_index)?);

        // Contract message failures only omit the message
        if let Err(_e) = s.display.render_contract(self.policy, &mut self.tokens) {
            #[cfg(feature = "log")]
            log::debug!("contract message omitted: {}", _e);
        }

        Ok(())
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch the active contract message policy
    pub fn contract_policy(&self) -> ContractPolicy {
        self.policy
    }

    /// Set the contract message policy for subsequent transactions
    pub fn set_contract_policy(&mut self, policy: ContractPolicy) {
        self.policy = policy;
    }

    /// Fetch display buffers for a transaction pending approval
    pub fn display(&self) -> Option<&DisplayBuffers> {
        match (self.state, &self.session) {
            (State::Pending, Session::Txn(s)) => Some(&s.display),
            _ => None,
        }
    }

    /// Fetch the hex-encoded hash for a hash pending approval
    pub fn hash(&self) -> Option<&str> {
        match (self.state, &self.session) {
            (State::Pending, Session::Hash(s)) => Some(&s.hex),
            _ => None,
        }
    }

    /// Fetch the key prompt (`with Key #N?`) for a pending request
    pub fn key_prompt(&self) -> Option<String<KEY_PROMPT_MAX>> {
        let key_index = match self.state {
            State::Pending => self.session.key_index()?,
            _ => return None,
        };

        let mut s = String::new();
        write!(&mut s, "with Key #{key_index}?").ok()?;
        Some(s)
    }

    /// Approve a pending request, returning the signature
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn approve(&mut self) -> Result<Output, Error> {
        if self.state != State::Pending {
            return Err(Error::InvalidState);
        }

        let r = match &self.session {
            Session::Txn(s) => s.signature.ok_or(Error::InvalidState),
            Session::Hash(s) => sign(&self.drv, &mut self.rng, s.key_index, &s.hash),
            Session::None => Err(Error::InvalidState),
        };

        self.session.clear();
        self.state = match r {
            Ok(_) => State::Complete,
            Err(_) => State::Error,
        };

        r.map(Output::Signature)
    }

    /// Deny a pending request, discarding any signature
    pub fn deny(&mut self) {
        self.session.clear();
        self.state = State::Denied;
    }

    /// Reset engine state
    pub fn reset(&mut self) {
        self.session.clear();
        self.state = State::Init;
    }
}
