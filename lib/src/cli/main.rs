// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger Zilliqa NanoApp

use std::{net::SocketAddr, path::Path, time::Duration};

use clap::Parser;
use log::{debug, info, LevelFilter};
use serde::Serialize;

use ledger_zil::{
    preview,
    transport::SPECULOS_APDU_PORT,
    txn::{plan_chunks, Transaction},
    TcpHandle,
};
use ledger_zil_core::{
    engine::ContractPolicy,
    helpers::{address_from_public_key, encode_address, AddressStr},
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Speculos APDU socket address
    #[clap(long, env = "SPECULOS_ADDR", default_value_t = SocketAddr::from(([127, 0, 0, 1], SPECULOS_APDU_PORT)))]
    target: SocketAddr,

    /// Timeout for user approval (seconds)
    #[clap(long, default_value = "30")]
    user_timeout_s: u64,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Transaction fields
#[derive(Clone, PartialEq, Debug, clap::Args)]
struct TxnArgs {
    /// Recipient address (bech32 or hex)
    #[clap(long)]
    to: ZilAddress,

    /// Amount in Qa
    #[clap(long)]
    amount: u128,

    /// Gas price in Qa
    #[clap(long, default_value = "2000000000")]
    gas_price: u128,

    /// Gas limit
    #[clap(long, default_value = "50")]
    gas_limit: u64,

    /// Sender account nonce
    #[clap(long, default_value = "1")]
    nonce: u64,

    /// Chain identifier
    #[clap(long, default_value = "1")]
    chain_id: u16,

    /// Compressed sender public key
    #[clap(long)]
    sender_pubkey: Option<HexData<33>>,

    /// Contract code
    #[clap(long)]
    code: Option<String>,

    /// Contract call data (JSON)
    #[clap(long)]
    data: Option<String>,
}

impl From<&TxnArgs> for Transaction {
    fn from(a: &TxnArgs) -> Self {
        Transaction {
            chain_id: a.chain_id,
            msg_version: 1,
            nonce: a.nonce,
            to_addr: a.to.0,
            sender_pubkey: a
                .sender_pubkey
                .as_ref()
                .map(|k| k.0.to_vec())
                .unwrap_or_default(),
            amount: a.amount,
            gas_price: a.gas_price,
            gas_limit: a.gas_limit,
            code: a.code.clone().unwrap_or_default().into_bytes(),
            data: a.data.clone().unwrap_or_default().into_bytes(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Parser, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
enum Actions {
    /// Sign a transaction on the device
    SignTxn {
        /// Key index for BIP-0032 derivation
        #[clap(long, default_value = "0")]
        key_index: u32,

        #[clap(flatten)]
        txn: TxnArgs,

        /// Write the serialised transaction and signature to a JSON file
        #[clap(long)]
        output: Option<String>,
    },

    /// Sign a 32-byte hash on the device
    SignHash {
        /// Key index for BIP-0032 derivation
        #[clap(long, default_value = "0")]
        key_index: u32,

        /// Hex-encoded hash
        #[clap(long)]
        hash: HexData<32>,
    },

    /// Render a transaction as displayed on the device (offline)
    Preview {
        #[clap(flatten)]
        txn: TxnArgs,

        /// Contract message display policy
        #[clap(long, default_value = "known-contracts")]
        policy: ContractPolicy,
    },

    /// Encode a transaction and show the APDU chunk plan (offline)
    Encode {
        #[clap(flatten)]
        txn: TxnArgs,
    },

    /// Compute the bech32 address for a public key (offline)
    Address {
        /// Compressed secp256k1 public key
        #[clap(long)]
        public_key: HexData<33>,
    },
}

/// Signed transaction output
#[derive(Clone, Debug, Serialize)]
struct SignedTxn {
    txn: String,
    signature: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    debug!("Executing {}: {:?}", args.cmd, args.cmd);

    match &args.cmd {
        Actions::SignTxn {
            key_index,
            txn,
            output,
        } => {
            let txn = Transaction::from(txn).encode();

            let p = preview(&txn, ContractPolicy::default())?;
            info!("Transaction: {}", serde_json::to_string_pretty(&p)?);

            let t = connect(&args).await?;

            info!("Waiting for user approval");
            let signature = t.sign_txn(*key_index, &txn).await?;

            info!("Signature: {}", hex::encode(signature));

            if let Some(o) = output {
                let v = SignedTxn {
                    txn: hex::encode(&txn),
                    signature: hex::encode(signature),
                };
                write_output(o, &v).await?;
            }
        }
        Actions::SignHash { key_index, hash } => {
            let t = connect(&args).await?;

            info!("Signing hash: {}", hash);
            let signature = t.sign_hash(*key_index, hash.as_ref()).await?;

            info!("Signature: {}", hex::encode(signature));
        }
        Actions::Preview { txn, policy } => {
            let p = preview(&Transaction::from(txn).encode(), *policy)?;

            println!("{}", serde_json::to_string_pretty(&p)?);
        }
        Actions::Encode { txn } => {
            let txn = Transaction::from(txn).encode();

            println!("{}", hex::encode(&txn));

            for (i, c) in plan_chunks(&txn)?.iter().enumerate() {
                info!(
                    "chunk {}: {} bytes ({} owed)",
                    i,
                    c.data.len(),
                    c.bytes_owed
                );
            }
        }
        Actions::Address { public_key } => {
            let mut s = AddressStr::new();
            encode_address(&address_from_public_key(public_key.as_ref()), &mut s)
                .map_err(|e| anyhow::anyhow!("address encoding failed: {}", e))?;

            println!("{}", s);
        }
    }

    Ok(())
}

/// Connect to the configured device
async fn connect(args: &Options) -> anyhow::Result<TcpHandle> {
    let t = TcpHandle::connect_tcp(args.target).await?;

    Ok(t.with_timeouts(
        Duration::from_secs(2),
        Duration::from_secs(args.user_timeout_s),
    ))
}

/// Helper to write output files
async fn write_output(file_name: &str, value: &impl Serialize) -> anyhow::Result<()> {
    debug!("Writing output to '{}'", file_name);

    // Determine format from file name
    let p = Path::new(file_name);
    match p.extension().and_then(|e| e.to_str()) {
        // Encode to JSON for `.json` files
        Some("json") => {
            let s = serde_json::to_string(value)?;
            tokio::fs::write(p, s).await?;
        }
        _ => return Err(anyhow::anyhow!("unsupported output file format")),
    }

    Ok(())
}
