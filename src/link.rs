//! Module that opens the single bidirectional link between the two peers.
//!
//! Each peer accepts exactly one connection from the other and dials exactly one connection
//! to it. Tokens are read from the accepted stream and written to the dialed one.

use crate::{
    error::{MisraError, Result},
    log,
};
use color_print::cformat;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{
    net::{TcpListener, TcpStream},
    time::sleep,
};

/// Struct that paces the attempts to dial the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// `None` keeps dialing until the peer shows up.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 50,
            max_delay_ms: 2_000,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Function that returns how long to wait after the given number of failed attempts.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(32);
        let delay = self.initial_delay_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    fn exhausted(&self, failures: u32) -> bool {
        matches!(self.max_attempts, Some(max) if failures >= max)
    }
}

/// Struct that holds both halves of the link.
#[derive(Debug)]
pub struct Link {
    /// Accepted from the peer; tokens are read from it.
    pub inbound: TcpStream,
    /// Dialed to the peer; tokens are written to it.
    pub outbound: TcpStream,
}

/// Function that binds `port` on every interface and accepts the peer's connection.
pub async fn listen(port: u16) -> Result<TcpStream> {
    let listener = bind(port).await?;
    listen_on(listener).await
}

pub async fn bind(port: u16) -> Result<TcpListener> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| MisraError::Bind { port, source })
}

/// Function that accepts exactly one connection and then stops listening.
pub async fn listen_on(listener: TcpListener) -> Result<TcpStream> {
    let (stream, address) = listener.accept().await.map_err(MisraError::Accept)?;
    log::info(&cformat!("I am connected to <bold>{address}</bold>."));

    Ok(stream)
}

/// Function that dials the peer until it answers or the retry budget runs out.
pub async fn connect(address: &str, retry: &RetryPolicy) -> Result<TcpStream> {
    let mut failures = 0u32;

    loop {
        match TcpStream::connect(address).await {
            Ok(stream) => {
                log::info(&cformat!("Connected to <bold>{address}</bold>."));
                return Ok(stream);
            }
            Err(source) => {
                failures += 1;
                if retry.exhausted(failures) {
                    return Err(MisraError::Connect {
                        address: address.to_string(),
                        attempts: failures,
                        source,
                    });
                }

                let delay = retry.delay_after(failures);
                log::warn(&format!(
                    "Couldn't connect to {address} ({source}), retrying in {delay:?}."
                ));
                sleep(delay).await;
            }
        }
    }
}

/// Function that accepts and dials concurrently, returning once both are done.
pub async fn establish(listener: TcpListener, address: &str, retry: &RetryPolicy) -> Result<Link> {
    let (inbound, outbound) = tokio::try_join!(listen_on(listener), connect(address, retry))?;

    Ok(Link { inbound, outbound })
}
