// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::net::SocketAddr;

use clap::Parser;
use log::{debug, info, LevelFilter};
use strum::{Display, EnumString, EnumVariantNames};

use ledger_zil::transport::{connect_tcp, SPECULOS_APDU_PORT};
use ledger_zil_tests::{vectors::vectors, TestDriver};

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Speculos APDU socket address
    #[clap(long, env = "SPECULOS_ADDR", default_value_t = SocketAddr::from(([127, 0, 0, 1], SPECULOS_APDU_PORT)))]
    pub target: SocketAddr,

    /// bip39 Mnemonic (must be shared between test util and target)
    #[clap(long, env, default_value = ledger_zil_tests::MNEMONIC)]
    pub mnemonic: String,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,

    /// Enable logging for transports
    #[clap(long)]
    pub log_transports: bool,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Parser, Display, EnumString, EnumVariantNames)]
pub enum Tests {
    /// Sign the standard transaction vectors
    Txn {
        /// Run only the named vector
        #[clap(long)]
        name: Option<String>,
    },
    /// Sign a random hash
    Hash {
        /// Key index for BIP-0032 derivation
        #[clap(long, default_value = "0")]
        key_index: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    if !opts.log_transports {
        c.add_filter_ignore_str("ledger_zil::transport");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via {}", opts.test, opts.target);

    let drv = TestDriver::new(&opts.mnemonic)?;

    match &opts.test {
        Tests::Txn { name } => {
            for v in vectors() {
                if name.as_deref().map(|n| n != v.name).unwrap_or(false) {
                    continue;
                }

                let t = connect_tcp(opts.target).await?;
                let pk = drv.public_key(v.key_index);

                info!("Approve '{}' on the device", v.name);
                ledger_zil_tests::transaction::test(t, || async {}, &v, &pk).await?;
            }
        }
        Tests::Hash { key_index } => {
            let t = connect_tcp(opts.target).await?;
            let pk = drv.public_key(*key_index);
            let hash: [u8; 32] = rand::random();

            info!("Approve hash signing on the device");
            ledger_zil_tests::hash::test(t, || async {}, *key_index, &hash, &pk).await?;
        }
    }

    info!("Tests complete");

    Ok(())
}
