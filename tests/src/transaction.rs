// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{future::Future, time::Duration};

use log::{debug, info};

use ledger_zil::{preview, DeviceHandle, Error, Exchange};
use ledger_zil_core::{
    engine::ContractPolicy,
    signer::{verify, PublicKey},
};

use crate::vectors::TxnVector;

/// Check the offline preview for a transaction vector
pub fn check_preview(v: &TxnVector) -> anyhow::Result<()> {
    let p = preview(&v.encode(), ContractPolicy::default())?;

    debug!("preview '{}': {:?}", v.name, p);

    assert_eq!(p.to, v.to, "recipient for '{}'", v.name);
    assert_eq!(p.amount, v.amount, "amount for '{}'", v.name);
    assert_eq!(p.gas_price, v.gas_price, "gas price for '{}'", v.name);
    assert_eq!(p.code.as_deref().unwrap_or(""), v.code, "code for '{}'", v.name);
    assert_eq!(p.data.as_deref().unwrap_or(""), v.data, "data for '{}'", v.name);
    assert_eq!(
        p.message.as_deref().unwrap_or(""),
        v.message,
        "message for '{}'",
        v.name
    );

    Ok(())
}

/// Sign a transaction vector and verify the returned signature
///
/// `approve` is invoked once the transaction has been issued, for
/// targets requiring external approval.
pub async fn test<T, F>(
    t: T,
    approve: impl FnOnce() -> F,
    v: &TxnVector,
    public_key: &PublicKey,
) -> anyhow::Result<()>
where
    T: Exchange + Send,
    F: Future<Output = ()>,
{
    let txn = v.encode();
    let d = DeviceHandle::from(t).with_timeouts(Duration::from_secs(2), Duration::from_secs(10));

    info!("Signing '{}' ({} bytes)", v.name, txn.len());

    let (r, _) = tokio::join!(d.sign_txn(v.key_index, &txn), approve());
    let signature = r?;

    debug!("signature: {}", hex::encode(signature));

    assert!(
        verify(public_key, &txn, &signature),
        "signature verification failed for '{}'",
        v.name
    );

    Ok(())
}

/// Sign a transaction vector expecting the user to reject it
pub async fn test_denied<T: Exchange + Send>(t: T, v: &TxnVector) -> anyhow::Result<()> {
    let d = DeviceHandle::from(t).with_timeouts(Duration::from_secs(2), Duration::from_secs(10));

    match d.sign_txn(v.key_index, &v.encode()).await {
        Err(Error::UserDenied) => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("signing '{}' unexpectedly succeeded", v.name)),
        Err(e) => Err(e.into()),
    }
}
