#![allow(unused)]

use std::{
    net::{Ipv4Addr, SocketAddr},
    str::FromStr,
};

use log::{debug, LevelFilter};
use portpicker::pick_unused_port;
use simplelog::SimpleLogger;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use ledger_zil::{transport::Response, Exchange};
use ledger_zil_tests::{
    engine::{Approval, EngineTransport},
    TestDriver,
};

/// Setup logging and an in-process engine transport
pub fn setup(approval: Approval) -> (TestDriver, EngineTransport) {
    // Setup logging
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());

    let t = EngineTransport::new(TestDriver::default(), approval);

    (TestDriver::default(), t)
}

/// Serve speculos-framed APDUs on a local port, forwarding them to `t`
pub async fn serve_tcp(mut t: EngineTransport) -> anyhow::Result<SocketAddr> {
    let port = pick_unused_port().ok_or_else(|| anyhow::anyhow!("no free ports"))?;
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), port);

    let listener = TcpListener::bind(addr).await?;

    tokio::spawn(async move {
        let (mut s, _) = match listener.accept().await {
            Ok(v) => v,
            Err(_) => return,
        };

        loop {
            let n = match s.read_u32().await {
                Ok(n) => n as usize,
                Err(_) => return,
            };

            let mut cmd = vec![0u8; n];
            if s.read_exact(&mut cmd).await.is_err() {
                return;
            }

            let r = match t
                .exchange(&cmd, std::time::Duration::from_secs(5))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|r| Response::parse(r).map_err(anyhow::Error::from))
            {
                Ok(r) => r,
                Err(e) => {
                    debug!("engine exchange failed: {}", e);
                    return;
                }
            };

            // Speculos lengths exclude the trailing status word
            let mut buff = (r.data.len() as u32).to_be_bytes().to_vec();
            buff.extend_from_slice(&r.to_vec());

            if s.write_all(&buff).await.is_err() {
                return;
            }
        }
    });

    Ok(addr)
}
