// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Offline transaction preview
//!
//! Renders a serialised transaction with the same decoder and display
//! rules as the device, for comparison with the on-device review.

use log::debug;
use serde::Serialize;

use ledger_zil_core::{
    decode::decode_txn,
    engine::ContractPolicy,
    json::{Tokens, MAX_TOKENS},
    render::{DisplayBuffers, TxnRenderer},
    stream::SliceReader,
};

use crate::Error;

/// Rendered transaction fields
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Preview {
    pub to: String,
    pub amount: String,
    pub gas_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Decode and render a serialised transaction
pub fn preview(txn: &[u8], policy: ContractPolicy) -> Result<Preview, Error> {
    let mut display = DisplayBuffers::new();

    let mut src = SliceReader::new(txn);
    decode_txn(&mut src, &mut TxnRenderer::new(&mut display))?;

    let mut tokens = Tokens::<MAX_TOKENS>::new();
    if let Err(e) = display.render_contract(policy, &mut tokens) {
        debug!("Contract message omitted: {}", e);
    }

    Ok(Preview::from(&display))
}

impl From<&DisplayBuffers> for Preview {
    fn from(d: &DisplayBuffers) -> Self {
        let text = |s: &str| match s.is_empty() {
            true => None,
            false => Some(s.to_string()),
        };

        Self {
            to: d.to_addr.to_string(),
            amount: d.amount.to_string(),
            gas_price: d.gas_price.to_string(),
            code: text(d.code.as_str()),
            data: text(d.data.as_str()),
            message: text(d.contract.as_str()),
        }
    }
}
