use ledger_zil_core::{
    apdu::{prelude::*, TXN_CHUNK_MAX, TXN_SIZE_MAX},
    engine::{ContractPolicy, Error, Event, Output, State},
    signer::verify,
};
use ledger_zil_tests::vectors::vectors;

mod helpers;
use helpers::{driver, engine, sign_txn, VecHost};

/// Encode a refill payload without length checks
fn raw_next(bytes_owed: u32, chunk_len: u32, chunk: &[u8]) -> Vec<u8> {
    let mut b = bytes_owed.to_le_bytes().to_vec();
    b.extend_from_slice(&chunk_len.to_le_bytes());
    b.extend_from_slice(chunk);
    b
}

/// Start signing `txn` with a 16-byte first chunk and the provided host
fn start(txn: &[u8], host: &mut VecHost) -> (Result<Output, Error>, State) {
    let mut e = engine(0);

    let r = e.update(
        &Event::SignTxn {
            key_index: 0,
            bytes_owed: (txn.len() - 16) as u32,
            chunk: &txn[..16],
        },
        host,
    );

    (r, e.state())
}

#[test]
fn refill_chunk_too_large() {
    let txn = vectors()[2].encode();

    let mut host = VecHost::default();
    let rest = &txn[16..];
    let chunk = &rest[..TXN_CHUNK_MAX + 1];
    host.payloads.push_back(raw_next(
        (rest.len() - chunk.len()) as u32,
        chunk.len() as u32,
        chunk,
    ));

    assert_eq!(start(&txn, &mut host), (Err(Error::ChunkTooLarge), State::Error));
}

#[test]
fn refill_length_mismatch() {
    let txn = vectors()[0].encode();
    let rest = &txn[16..];

    let mut host = VecHost::default();
    host.payloads
        .push_back(raw_next(0, rest.len() as u32 + 1, rest));

    assert_eq!(
        start(&txn, &mut host),
        (Err(Error::ChunkLengthMismatch), State::Error)
    );
}

#[test]
fn refill_owed_mismatch() {
    let txn = vectors()[0].encode();
    let rest = &txn[16..];

    // Host claims more bytes remain than were declared
    let mut host = VecHost::default();
    host.push(1, rest);

    assert_eq!(start(&txn, &mut host), (Err(Error::OwedMismatch), State::Error));
}

#[test]
fn refill_empty_chunk() {
    let txn = vectors()[0].encode();
    let rest = &txn[16..];

    let mut host = VecHost::default();
    host.push(rest.len() as u32, &[]);

    assert_eq!(start(&txn, &mut host), (Err(Error::EmptyChunk), State::Error));
}

#[test]
fn host_aborts_stream() {
    let txn = vectors()[0].encode();

    let mut host = VecHost::default();

    assert_eq!(
        start(&txn, &mut host),
        (Err(Error::TransportReset), State::Error)
    );
    assert_eq!(host.requests, 1);
}

#[test]
fn declared_size_limit() {
    let mut e = engine(0);
    let mut host = VecHost::default();

    let r = e.update(
        &Event::SignTxn {
            key_index: 0,
            bytes_owed: TXN_SIZE_MAX - 3,
            chunk: &[0x08, 0x01, 0x10, 0x01],
        },
        &mut host,
    );

    assert_eq!(r, Err(Error::TxnTooLarge));
    assert_eq!(host.requests, 0);
    assert_eq!(e.state(), State::Error);
}

#[test]
fn truncated_transaction() {
    let txn = vectors()[0].encode();
    let txn = &txn[..txn.len() - 1];

    let mut e = engine(0);
    let (r, _) = sign_txn(&mut e, 0, txn, 20, &[8]);

    assert_eq!(r, Err(Error::Truncated));
    assert_eq!(r.unwrap_err().status(), StatusWord::InvalidParam);
    assert!(e.display().is_none());
}

#[test]
fn recovers_after_error() {
    let v = &vectors()[1];
    let txn = v.encode();
    let mut e = engine(0);

    let (r, _) = sign_txn(&mut e, v.key_index, &txn[..txn.len() - 1], 32, &[32]);
    assert!(r.is_err());
    assert_eq!(e.state(), State::Error);

    let (r, _) = sign_txn(&mut e, v.key_index, &txn, 32, &[32]);
    assert_eq!(r, Ok(Output::Pending));
    assert_eq!(e.display().unwrap().contract.as_str(), v.message);

    let sig = *e.approve().unwrap().signature().unwrap();
    assert!(verify(&driver().public_key(v.key_index), &txn, &sig));
}

#[test]
fn contract_policy_never() {
    let v = &vectors()[1];
    let txn = v.encode();

    let mut e = engine(0);
    e.set_contract_policy(ContractPolicy::Never);

    let (r, _) = sign_txn(&mut e, v.key_index, &txn, 64, &[64]);
    assert_eq!(r, Ok(Output::Pending));

    let d = e.display().unwrap();
    assert_eq!(d.contract.as_str(), "");
    assert_eq!(d.data.as_str(), v.data);
}

#[test]
fn sign_hash_on_approval() {
    let mut e = engine(0);
    let hash = [0x17u8; HASH_LEN];

    let r = e.update(
        &Event::SignHash {
            key_index: 5,
            hash,
        },
        &mut VecHost::default(),
    );
    assert_eq!(r, Ok(Output::Pending));
    assert_eq!(e.hash(), Some("17".repeat(HASH_LEN).as_str()));
    assert_eq!(e.key_prompt().unwrap().as_str(), "with Key #5?");

    let sig = *e.approve().unwrap().signature().unwrap();
    assert!(verify(&driver().public_key(5), &hash, &sig));
    assert_eq!(e.hash(), None);
}

#[test]
fn known_contract_without_params() {
    let mut v = vectors().remove(1);
    v.txn.amount = 1_000_000_000_000;
    v.txn.data = br#"{"_tag":"Ping"}"#.to_vec();

    let txn = v.encode();
    let mut e = engine(0);

    let (r, host) = sign_txn(&mut e, v.key_index, &txn, 16, &[7]);
    assert_eq!(r, Ok(Output::Pending));
    assert!(host.payloads.is_empty());
    assert!(host.requests > 1);

    let d = e.display().unwrap();
    assert_eq!(d.contract.as_str(), "");
    assert_eq!(d.to_addr.as_str(), v.to);
    assert_eq!(d.amount.as_str(), "1");
    assert_eq!(d.gas_price.as_str(), v.gas_price);
    assert_eq!(d.data.as_str(), r#"{"_tag":"Ping"}"#);

    let sig = *e.approve().unwrap().signature().unwrap();
    assert!(verify(&driver().public_key(v.key_index), &txn, &sig));
}
