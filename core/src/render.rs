// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction display rendering
//!
//! [`TxnRenderer`] receives decoded fields and writes them to fixed-capacity
//! [`DisplayBuffers`] for presentation to the user. Once decoding completes,
//! [`DisplayBuffers::render_contract`] optionally extracts a contract call
//! from the `data` field.

use core::{fmt::Write, str::from_utf8};

use heapless::{String, Vec};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::{
    decode::{AmountKind, FieldVisitor, PayloadKind},
    engine::Error,
    helpers::{encode_address, fmt_amount, Address, AddressStr, RawAmount, ZIL_STR_MAX},
    json::{extract_params, JsonError, Tokens},
    stream::ByteRead,
};

/// Code / data display capacity
pub const PAYLOAD_DISPLAY_MAX: usize = 500;

/// Contract message display capacity
pub const CONTRACT_DISPLAY_MAX: usize = 500;

/// Shown in place of payloads exceeding [`PAYLOAD_DISPLAY_MAX`]
pub const TOO_LARGE: &str = "[too large]";

/// Shown in place of payloads that are not valid UTF-8
pub const BINARY: &str = "[binary]";

/// Contracts for which call parameters are displayed by default
pub const KNOWN_CONTRACTS: &[&str] = &["zil1pel8hjums9yxuunv75frartsjtudz72ymeq707"];

/// Selects recipients for which contract messages are decoded
#[derive(Copy, Clone, PartialEq, Debug, Default, Display, EnumIter, EnumString, EnumVariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum ContractPolicy {
    /// Only recipients in [`KNOWN_CONTRACTS`]
    #[default]
    KnownContracts,
    /// Every recipient
    Always,
    /// Never decode contract messages
    Never,
}

impl ContractPolicy {
    /// Check whether contract messages to `recipient` should be decoded
    pub fn permits(&self, recipient: &str) -> bool {
        match self {
            ContractPolicy::KnownContracts => KNOWN_CONTRACTS.contains(&recipient),
            ContractPolicy::Always => true,
            ContractPolicy::Never => false,
        }
    }
}

/// Bounded byte payload for display
///
/// Payloads that do not fit are flagged rather than truncated.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DisplayText<const N: usize> {
    buff: Vec<u8, N>,
    overflow: bool,
}

impl<const N: usize> DisplayText<N> {
    pub const fn new() -> Self {
        Self {
            buff: Vec::new(),
            overflow: false,
        }
    }

    pub fn clear(&mut self) {
        self.buff.clear();
        self.overflow = false;
    }

    /// Fill from `src`, flagging overflow (without reading) if `src` exceeds capacity
    pub fn fill<R: ByteRead>(&mut self, src: &mut R) -> Result<(), Error> {
        self.clear();

        let n = src.remaining();
        if n > N {
            self.overflow = true;
            return Ok(());
        }

        // Capacity checked above
        let _ = self.buff.resize_default(n);
        src.read_exact(&mut self.buff[..])
    }

    /// Raw payload bytes, `None` on overflow
    pub fn bytes(&self) -> Option<&[u8]> {
        match self.overflow {
            true => None,
            false => Some(&self.buff),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.overflow && self.buff.is_empty()
    }

    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// Display string, substituting markers for oversized or binary payloads
    pub fn as_str(&self) -> &str {
        if self.overflow {
            return TOO_LARGE;
        }

        from_utf8(&self.buff).unwrap_or(BINARY)
    }
}

/// Display strings for a transaction
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DisplayBuffers {
    pub to_addr: AddressStr,
    pub amount: String<ZIL_STR_MAX>,
    pub gas_price: String<ZIL_STR_MAX>,
    pub code: DisplayText<PAYLOAD_DISPLAY_MAX>,
    pub data: DisplayText<PAYLOAD_DISPLAY_MAX>,
    pub contract: String<CONTRACT_DISPLAY_MAX>,
}

impl DisplayBuffers {
    pub const fn new() -> Self {
        Self {
            to_addr: String::new(),
            amount: String::new(),
            gas_price: String::new(),
            code: DisplayText::new(),
            data: DisplayText::new(),
            contract: String::new(),
        }
    }

    /// Clear all fields
    pub fn clear(&mut self) {
        self.to_addr.clear();
        self.amount.clear();
        self.gas_price.clear();
        self.code.clear();
        self.data.clear();
        self.contract.clear();
    }

    /// Decode contract call parameters from `data` where permitted by `policy`
    ///
    /// Failures leave the contract section empty and do not affect other fields.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn render_contract<const N: usize>(
        &mut self,
        policy: ContractPolicy,
        tokens: &mut Tokens<N>,
    ) -> Result<(), JsonError> {
        self.contract.clear();

        if !policy.permits(&self.to_addr) {
            return Ok(());
        }

        let data = match self.data.bytes() {
            Some(d) if !d.is_empty() => d,
            _ => return Ok(()),
        };

        extract_params(data, tokens, &mut self.contract)
    }

    /// Render all fields into a single buffer
    ///
    /// Unlike per-field rendering, overflow here is fatal.
    pub fn summary<const N: usize>(&self, out: &mut String<N>) -> Result<(), Error> {
        out.clear();

        let r = (|| {
            write!(out, "To: {}", self.to_addr)?;
            write!(out, " Amount: {} ZIL", self.amount)?;
            write!(out, " Gas Price: {} ZIL", self.gas_price)?;

            if !self.code.is_empty() {
                write!(out, " Code: {}", self.code.as_str())?;
            }

            match self.contract.is_empty() {
                false => write!(out, " Message: {}", self.contract),
                true if !self.data.is_empty() => write!(out, " Data: {}", self.data.as_str()),
                true => Ok(()),
            }
        })();

        r.map_err(|_| {
            out.clear();
            Error::DisplayOverflow
        })
    }
}

/// [FieldVisitor] writing decoded fields to [DisplayBuffers]
pub struct TxnRenderer<'a> {
    display: &'a mut DisplayBuffers,
}

impl<'a> TxnRenderer<'a> {
    /// Create a renderer, clearing any existing display content
    pub fn new(display: &'a mut DisplayBuffers) -> Self {
        display.clear();
        Self { display }
    }
}

impl<'a> FieldVisitor for TxnRenderer<'a> {
    fn recipient(&mut self, addr: &Address) -> Result<(), Error> {
        encode_address(addr, &mut self.display.to_addr)
    }

    fn amount(&mut self, kind: AmountKind, value: &RawAmount) -> Result<(), Error> {
        let out = match kind {
            AmountKind::Amount => &mut self.display.amount,
            AmountKind::GasPrice => &mut self.display.gas_price,
        };

        fmt_amount(value, out)
    }

    fn payload<R: ByteRead>(&mut self, kind: PayloadKind, src: &mut R) -> Result<(), Error> {
        let text = match kind {
            PayloadKind::Code => &mut self.display.code,
            PayloadKind::Data => &mut self.display.data,
        };

        text.fill(src)?;

        #[cfg(feature = "log")]
        if text.overflowed() {
            log::debug!("{} exceeds display capacity", kind);
        }

        Ok(())
    }
}
