// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the device
//! and is generic over [ledger_lib::Exchange] types

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ledger_lib::{Device, Exchange};
use ledger_proto::{ApduBase, ApduReq};
use log::debug;
use tokio::sync::Mutex;

use ledger_zil_apdu::prelude::*;
use ledger_zil_core::signer::Signature;

use crate::{
    transport::{encode_command, Response},
    txn::plan_chunks,
    Error,
};

/// Zilliqa handle for a connected ledger [Device].
///
/// This is generic over [Exchange] types to support different
/// underlying transports / providers
pub struct DeviceHandle<T: Exchange + Send> {
    /// Device handle for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user acknowledgements
    user_timeout: Duration,
    /// Timeout for APDU requests
    request_timeout: Duration,
}

impl<T: Exchange + Send> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            user_timeout: self.user_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange + Send> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(2),
        }
    }
}

impl<T: Exchange + Send> DeviceHandle<T> {
    /// Override request and user interaction timeouts
    pub fn with_timeouts(mut self, request_timeout: Duration, user_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.user_timeout = user_timeout;
        self
    }

    /// Stream a serialised transaction to the device for signing
    ///
    /// Each chunk is sent once the device replies with an empty
    /// [`StatusWord::Ok`], the final chunk waits on user approval.
    pub async fn sign_txn(&self, key_index: u32, txn: &[u8]) -> Result<Signature, Error> {
        let chunks = plan_chunks(txn)?;

        debug!(
            "Signing transaction ({} bytes, {} chunks) with key {}",
            txn.len(),
            chunks.len(),
            key_index
        );

        let mut t = self.t.lock().await;
        let mut resp = vec![];

        for (i, c) in chunks.iter().enumerate() {
            // Only the final reply may carry data
            if !resp.is_empty() {
                return Err(Error::UnexpectedResponse);
            }

            let cmd = match i {
                0 => encode_command(&SignTxnReq::new(key_index, c.bytes_owed, c.data))?,
                _ => encode_command(&SignTxnNext::new(c.bytes_owed, c.data))?,
            };

            resp = self.command(&mut *t, &cmd, c.bytes_owed == 0).await?;
        }

        decode_signature(&resp)
    }

    /// Sign a 32-byte hash
    pub async fn sign_hash(&self, key_index: u32, hash: &[u8; HASH_LEN]) -> Result<Signature, Error> {
        debug!("Signing hash {} with key {}", hex::encode(hash), key_index);

        let cmd = encode_command(&SignHashReq::new(key_index, *hash))?;

        let mut t = self.t.lock().await;
        let resp = self.command(&mut *t, &cmd, true).await?;

        decode_signature(&resp)
    }

    /// Helper to issue a raw command and check the response status,
    /// `user` selects the user interaction timeout
    async fn command(&self, t: &mut T, cmd: &[u8], user: bool) -> Result<Vec<u8>, Error> {
        let timeout = match user {
            true => self.user_timeout,
            false => self.request_timeout,
        };

        let resp = match tokio::time::timeout(timeout, t.exchange(cmd, timeout)).await {
            Ok(r) => Response::parse(r?)?,
            Err(_) if user => return Err(Error::UserTimeout),
            Err(_) => return Err(Error::RequestTimeout),
        };

        if let Err(e) = Error::check_status(resp.status) {
            debug!("Request failed: {}", e);
            return Err(e);
        }

        Ok(resp.data)
    }
}

/// Decode a [SignatureResp], rejecting trailing data
fn decode_signature(resp: &[u8]) -> Result<Signature, Error> {
    match SignatureResp::decode(resp) {
        Ok((r, n)) if n == resp.len() => Ok(r.signature),
        _ => Err(Error::UnexpectedResponse),
    }
}

/// Forward [Device] requests for the wrapped transport
#[async_trait]
impl<T: Device + Exchange + Send> Device for DeviceHandle<T> {
    async fn request<'a, 'b, RESP: ApduBase<'b>>(
        &mut self,
        request: impl ApduReq<'a> + Send,
        buff: &'b mut [u8],
        timeout: Duration,
    ) -> Result<RESP, ledger_lib::Error> {
        self.t.lock().await.request(request, buff, timeout).await
    }
}
