// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Helpers for exchanging raw APDUs with [ledger_lib] devices
//!
//! Commands are framed as `CLA INS P1 P2 Lc DATA`, [Exchange] responses carry
//! the payload followed by a big-endian status word.

use encdec::Encode;
use log::trace;

pub use ledger_lib::{Device, Exchange};

use ledger_zil_apdu::{ApduError, ApduStatic, APDU_PAYLOAD_MAX};

use crate::Error;

#[cfg(feature = "transport_tcp")]
pub use tcp::{connect_tcp, SPECULOS_APDU_PORT};

/// Command APDU header length
pub const APDU_HEADER_LEN: usize = 5;

/// Response status word length
pub const STATUS_LEN: usize = 2;

/// Raw APDU response
#[derive(Clone, PartialEq, Debug)]
pub struct Response {
    /// Response payload
    pub data: Vec<u8>,
    /// Response status word
    pub status: u16,
}

impl Response {
    /// Split a raw [Exchange] response into payload and status word
    pub fn parse(mut buff: Vec<u8>) -> Result<Self, Error> {
        if buff.len() < STATUS_LEN {
            return Err(Error::UnexpectedResponse);
        }

        let n = buff.len() - STATUS_LEN;
        let status = u16::from_be_bytes([buff[n], buff[n + 1]]);
        buff.truncate(n);

        Ok(Self { data: buff, status })
    }

    /// Encode to the raw `DATA SW1 SW2` form returned by [Exchange]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut buff = Vec::with_capacity(self.data.len() + STATUS_LEN);
        buff.extend_from_slice(&self.data);
        buff.extend_from_slice(&self.status.to_be_bytes());
        buff
    }
}

/// Encode a request object to a command APDU
pub fn encode_command<REQ>(req: &REQ) -> Result<Vec<u8>, Error>
where
    REQ: ApduStatic + Encode<Error = ApduError>,
{
    let n = req.encode_len()?;
    if n > APDU_PAYLOAD_MAX {
        return Err(Error::InvalidLength);
    }

    let mut buff = vec![0u8; APDU_HEADER_LEN + n];
    buff[..APDU_HEADER_LEN].copy_from_slice(&[REQ::CLA, REQ::INS, req.p1(), req.p2(), n as u8]);
    req.encode(&mut buff[APDU_HEADER_LEN..])?;

    trace!("command: {:02x?}", buff);

    Ok(buff)
}

#[cfg(feature = "transport_tcp")]
mod tcp {
    use std::net::SocketAddr;

    use ledger_lib::{
        transport::{GenericDevice, TcpInfo, TcpTransport},
        Transport,
    };
    use log::debug;

    use crate::Error;

    /// Default speculos APDU port
    pub const SPECULOS_APDU_PORT: u16 = 9999;

    /// Connect to a speculos instance APDU socket
    pub async fn connect_tcp(addr: SocketAddr) -> Result<GenericDevice, Error> {
        debug!("Connecting TCP APDU transport to {}", addr);

        let mut t = TcpTransport::new()?;
        let device = t.connect(TcpInfo { addr }).await?;

        Ok(device.into())
    }
}
