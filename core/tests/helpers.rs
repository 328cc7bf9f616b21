#![allow(unused)]

use std::{collections::VecDeque, sync::OnceLock};

use log::{debug, trace, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};

use ledger_zil_core::{
    apdu::prelude::*,
    engine::{Engine, Error, Event, Exchange, Output},
};
use ledger_zil_tests::TestDriver;

pub type TestEngine = Engine<TestDriver, StdRng>;

/// Shared driver, seed derivation is slow
pub fn driver() -> &'static TestDriver {
    static DRIVER: OnceLock<TestDriver> = OnceLock::new();

    DRIVER.get_or_init(|| {
        let _ = simplelog::SimpleLogger::init(LevelFilter::Info, simplelog::Config::default());
        TestDriver::default()
    })
}

/// Create an engine with a fixed rng seed
pub fn engine(seed: u64) -> TestEngine {
    Engine::new_with_rng(driver().clone(), StdRng::seed_from_u64(seed))
}

/// Host holding queued refill payloads
#[derive(Default)]
pub struct VecHost {
    pub payloads: VecDeque<Vec<u8>>,
    pub current: Vec<u8>,
    pub requests: usize,
}

impl VecHost {
    /// Queue refill chunks for `rest`, split at the provided chunk lengths
    /// (the final length repeats)
    pub fn split(rest: &[u8], lens: &[usize]) -> Self {
        let mut h = Self::default();
        let mut rest = rest;
        let mut i = 0;

        while !rest.is_empty() {
            let n = lens[i.min(lens.len() - 1)].min(rest.len());
            let (c, r) = rest.split_at(n);
            rest = r;
            i += 1;

            h.push(r.len() as u32, c);
        }

        h
    }

    /// Queue an encoded refill payload
    pub fn push(&mut self, bytes_owed: u32, chunk: &[u8]) {
        let next = SignTxnNext::new(bytes_owed, chunk);

        let mut buff = vec![0u8; next.encode_len().unwrap()];
        next.encode(&mut buff).unwrap();

        self.payloads.push_back(buff);
    }
}

impl Exchange for VecHost {
    fn request_more(&mut self) -> Result<&[u8], Error> {
        self.requests += 1;

        self.current = self.payloads.pop_front().ok_or(Error::TransportReset)?;
        trace!("refill {}: {:02x?}", self.requests, self.current);

        Ok(&self.current)
    }
}

/// Issue a signing request with the first `first` bytes of `txn`,
/// refilling the remainder in chunks of `lens`
pub fn sign_txn(
    e: &mut TestEngine,
    key_index: u32,
    txn: &[u8],
    first: usize,
    lens: &[usize],
) -> (Result<Output, Error>, VecHost) {
    let (head, rest) = txn.split_at(first.min(txn.len()));
    let mut host = VecHost::split(rest, lens);

    debug!(
        "sign {} bytes, first chunk {}, refill lengths {:?}",
        txn.len(),
        head.len(),
        lens
    );

    let r = e.update(
        &Event::SignTxn {
            key_index,
            bytes_owed: rest.len() as u32,
            chunk: head,
        },
        &mut host,
    );

    (r, host)
}
