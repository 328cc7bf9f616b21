// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction vectors with their expected on-device rendering

use ledger_zil::txn::Transaction;

/// Recipient used for plain payments
pub const PAYMENT_ADDR: &str = "8ad0357ebb5515f694de597eda6f3f6bdbad0fd9";

/// Known contract recipient (contract messages are rendered by default)
pub const CONTRACT_ADDR: &str = "0e7e7bcb9b81486e726cf5123e8d7092f8d17944";

pub struct TxnVector {
    pub name: &'static str,
    pub key_index: u32,
    pub txn: Transaction,
    pub to: &'static str,
    pub amount: &'static str,
    pub gas_price: &'static str,
    pub code: &'static str,
    pub data: &'static str,
    pub message: &'static str,
}

impl TxnVector {
    /// Serialised transaction
    pub fn encode(&self) -> Vec<u8> {
        self.txn.encode()
    }
}

fn addr(s: &str) -> [u8; 20] {
    let mut a = [0u8; 20];
    hex::decode_to_slice(s, &mut a).expect("invalid address");
    a
}

const TRANSFER_DATA: &str = r#"{"_tag":"Transfer","params":[{"vname":"to","type":"ByStr20","value":"0x8ad0357ebb5515f694de597eda6f3f6bdbad0fd9"},{"vname":"amount","type":"Uint128","value":"1000"}]}"#;

/// Build the standard vector set
pub fn vectors() -> Vec<TxnVector> {
    let mut deploy = b"scilla_version 0\n".to_vec();
    deploy.resize(2048, b'#');

    vec![
        TxnVector {
            name: "payment",
            key_index: 0,
            txn: Transaction {
                chain_id: 1,
                msg_version: 1,
                nonce: 1,
                to_addr: addr(PAYMENT_ADDR),
                amount: 1_000_000_000_000,
                gas_price: 2_000_000_000,
                gas_limit: 50,
                ..Default::default()
            },
            to: "zil13tgr2l4m252ld9x7t9ld5meld0d66r7e22ty4f",
            amount: "1",
            gas_price: "0.002",
            code: "",
            data: "",
            message: "",
        },
        TxnVector {
            name: "contract call",
            key_index: 1,
            txn: Transaction {
                chain_id: 1,
                msg_version: 1,
                nonce: 7,
                to_addr: addr(CONTRACT_ADDR),
                amount: 0,
                gas_price: 2_000_000_000,
                gas_limit: 10_000,
                data: TRANSFER_DATA.as_bytes().to_vec(),
                ..Default::default()
            },
            to: "zil1pel8hjums9yxuunv75frartsjtudz72ymeq707",
            amount: "0",
            gas_price: "0.002",
            code: "",
            data: TRANSFER_DATA,
            message: "to:zil13tgr2l4m252ld9x7t9ld5meld0d66r7e22ty4f amount:1000",
        },
        TxnVector {
            name: "large deploy",
            key_index: 2,
            txn: Transaction {
                chain_id: 333,
                msg_version: 1,
                nonce: 42,
                to_addr: [0u8; 20],
                sender_pubkey: vec![0x02; 33],
                amount: 123_456_789,
                gas_price: 1_000_000_000,
                gas_limit: 30_000,
                code: deploy,
                data: br#"[{"vname":"_scilla_version","type":"Uint32","value":"0"}]"#.to_vec(),
            },
            to: "zil1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq9yf6pz",
            amount: "0.000123456789",
            gas_price: "0.001",
            code: "[too large]",
            data: r#"[{"vname":"_scilla_version","type":"Uint32","value":"0"}]"#,
            message: "",
        },
        TxnVector {
            name: "maximum amount",
            key_index: 0,
            txn: Transaction {
                chain_id: 1,
                msg_version: 1,
                nonce: u64::MAX,
                to_addr: addr(PAYMENT_ADDR),
                amount: u128::MAX,
                gas_price: u128::MAX,
                gas_limit: u64::MAX,
                ..Default::default()
            },
            to: "zil13tgr2l4m252ld9x7t9ld5meld0d66r7e22ty4f",
            amount: "340282366920938463463374607.431768211455",
            gas_price: "340282366920938463463374607.431768211455",
            code: "",
            data: "",
            message: "",
        },
    ]
}
