// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-process [ledger_lib::Exchange] backed by an [Engine] on a worker thread
//!
//! Mid-command refills block the engine thread on the next command APDU,
//! matching the request / response flow of a physical device.

use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use ledger_zil::transport::{Response, APDU_HEADER_LEN};
use ledger_zil_apdu::{prelude::*, ZIL_APDU_CLA};
use ledger_zil_core::engine::{ContractPolicy, Engine, Error as EngineError, Event, Exchange, Output};

use crate::TestDriver;

/// Engine type used by test transports
pub type TestEngine = Engine<TestDriver, StdRng>;

/// User response applied to pending requests
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Approval {
    Approve,
    Deny,
    /// Leave requests pending (no response is sent)
    Ignore,
}

/// [ledger_lib::Exchange] driving a shared [Engine] instance
///
/// Timeouts are left to the caller, an unanswered command waits until the
/// engine responds.
pub struct EngineTransport {
    engine: Arc<Mutex<TestEngine>>,
    commands: mpsc::Sender<Vec<u8>>,
    responses: UnboundedReceiver<Response>,
    /// Count of command APDUs issued
    pub commands_sent: usize,
}

impl EngineTransport {
    /// Spawn an engine using the provided driver and approval behaviour
    pub fn new(drv: TestDriver, approval: Approval) -> Self {
        Self::with_policy(drv, approval, ContractPolicy::default())
    }

    /// Spawn an engine with a specific contract message policy
    pub fn with_policy(drv: TestDriver, approval: Approval, policy: ContractPolicy) -> Self {
        let mut e = Engine::new_with_rng(drv, StdRng::seed_from_u64(0));
        e.set_contract_policy(policy);

        let engine = Arc::new(Mutex::new(e));

        let (commands, command_rx) = mpsc::channel();
        let (response_tx, responses) = unbounded_channel();

        let e = engine.clone();
        thread::spawn(move || run(e, approval, command_rx, response_tx));

        Self {
            engine,
            commands,
            responses,
            commands_sent: 0,
        }
    }

    /// Fetch a handle to the underlying engine
    pub fn engine(&self) -> Arc<Mutex<TestEngine>> {
        self.engine.clone()
    }
}

#[async_trait]
impl ledger_lib::Exchange for EngineTransport {
    async fn exchange(
        &mut self,
        command: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        self.commands.send(command.to_vec()).map_err(|_| closed())?;
        self.commands_sent += 1;

        let r = self.responses.recv().await.ok_or_else(closed)?;
        Ok(r.to_vec())
    }
}

/// Engine worker exited
fn closed() -> ledger_lib::Error {
    std::io::Error::from(std::io::ErrorKind::BrokenPipe).into()
}

/// Engine worker, handles commands until the transport is dropped
fn run(
    engine: Arc<Mutex<TestEngine>>,
    approval: Approval,
    commands: mpsc::Receiver<Vec<u8>>,
    responses: UnboundedSender<Response>,
) {
    while let Ok(cmd) = commands.recv() {
        let mut e = match engine.lock() {
            Ok(e) => e,
            Err(_) => return,
        };

        let mut host = ThreadHost {
            commands: &commands,
            responses: &responses,
            current: vec![],
        };

        let r = match handle(&mut e, approval, &cmd, &mut host) {
            Some(r) => r,
            None => continue,
        };

        trace!("response: {:02x?} ({:04x})", r.data, r.status);

        if responses.send(r).is_err() {
            return;
        }
    }
}

/// Handle a command APDU, returning the final response
fn handle<H: Exchange>(
    e: &mut TestEngine,
    approval: Approval,
    cmd: &[u8],
    host: &mut H,
) -> Option<Response> {
    let (hdr, data) = match cmd.len() >= APDU_HEADER_LEN {
        true => cmd.split_at(APDU_HEADER_LEN),
        false => return Some(status(StatusWord::WrongDataLength)),
    };

    if hdr[0] != ZIL_APDU_CLA {
        return Some(status(StatusWord::ClaNotSupported));
    }
    if hdr[4] as usize != data.len() {
        return Some(status(StatusWord::WrongDataLength));
    }

    let evt = match Event::parse(hdr[1], data) {
        Ok(v) => v,
        Err(err) => return Some(status(err.status())),
    };

    debug!("event: {:?}", evt);

    match e.update(&evt, host) {
        Ok(Output::Pending) => (),
        Ok(o) => return Some(output(&o)),
        Err(err) => {
            debug!("engine error: {}", err);
            return Some(status(err.status()));
        }
    }

    match approval {
        Approval::Approve => match e.approve() {
            Ok(o) => Some(output(&o)),
            Err(err) => Some(status(err.status())),
        },
        Approval::Deny => {
            e.deny();
            Some(status(StatusWord::UserRejected))
        }
        Approval::Ignore => None,
    }
}

fn status(s: StatusWord) -> Response {
    Response {
        data: vec![],
        status: s as u16,
    }
}

fn output(o: &Output) -> Response {
    let mut buff = [0u8; 256];

    match o.encode(&mut buff) {
        Ok(n) => Response {
            data: buff[..n].to_vec(),
            status: StatusWord::Ok as u16,
        },
        Err(_) => status(StatusWord::DeveloperError),
    }
}

/// [Exchange] pulling refill chunks from the command channel
struct ThreadHost<'a> {
    commands: &'a mpsc::Receiver<Vec<u8>>,
    responses: &'a UnboundedSender<Response>,
    current: Vec<u8>,
}

impl<'a> Exchange for ThreadHost<'a> {
    fn request_more(&mut self) -> Result<&[u8], EngineError> {
        self.responses
            .send(status(StatusWord::Ok))
            .map_err(|_| EngineError::TransportReset)?;

        self.current = self
            .commands
            .recv()
            .map_err(|_| EngineError::TransportReset)?;

        // Any other command aborts the stream
        match self.current.get(..2) {
            Some([ZIL_APDU_CLA, ins]) if *ins == Instruction::SignTxn as u8 => (),
            _ => return Err(EngineError::TransportReset),
        }

        match self.current.get(APDU_HEADER_LEN..) {
            Some(d) if d.len() == self.current[4] as usize => Ok(d),
            _ => Err(EngineError::InvalidLength),
        }
    }
}
