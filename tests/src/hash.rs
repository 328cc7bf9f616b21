// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{future::Future, time::Duration};

use log::info;

use ledger_zil::{apdu::prelude::HASH_LEN, DeviceHandle, Exchange};
use ledger_zil_core::signer::{verify, PublicKey};

/// Sign a hash and verify the returned signature
pub async fn test<T, F>(
    t: T,
    approve: impl FnOnce() -> F,
    key_index: u32,
    hash: &[u8; HASH_LEN],
    public_key: &PublicKey,
) -> anyhow::Result<()>
where
    T: Exchange + Send,
    F: Future<Output = ()>,
{
    let d = DeviceHandle::from(t).with_timeouts(Duration::from_secs(2), Duration::from_secs(10));

    info!("Signing hash {} with key {}", hex::encode(hash), key_index);

    let (r, _) = tokio::join!(d.sign_hash(key_index, hash), approve());
    let signature = r?;

    assert!(
        verify(public_key, hash, &signature),
        "hash signature verification failed"
    );

    Ok(())
}
