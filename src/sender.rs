//! Module that writes tokens to the peer, simulating PING loss.

use crate::{log, loss::Loss, token, token::TokenType};
use color_print::cformat;
use futures::SinkExt;
use rand::rngs::SmallRng;
use tokio::io::AsyncWrite;
use tokio_util::codec::{FramedWrite, LinesCodec};

/// Enum that tells what became of a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Written,
    /// Suppressed by the loss simulation.
    Dropped,
    /// The write itself failed.
    Failed,
}

pub struct TokenSender<W> {
    lines: FramedWrite<W, LinesCodec>,
    loss: Loss<SmallRng>,
    dropped: u64,
    failed: u64,
}

impl<W: AsyncWrite + Unpin> TokenSender<W> {
    pub fn new(writer: W, loss: Loss<SmallRng>) -> Self {
        Self {
            lines: FramedWrite::new(writer, LinesCodec::new()),
            loss,
            dropped: 0,
            failed: 0,
        }
    }

    /// Function that returns how many PINGs the loss simulation has swallowed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Function that sends a token value to the peer.
    ///
    /// Only PING transmissions go through the loss simulation. A failed write is logged and
    /// not retried.
    pub async fn transmit(&mut self, token_type: TokenType, value: i64) -> Delivery {
        if token_type == TokenType::Ping && self.loss.is_lost() {
            self.dropped += 1;
            log::warn(&cformat!(
                "Simulating the loss of <yellow, bold>{token_type}</yellow, bold> <bold>{value}</bold>."
            ));
            return Delivery::Dropped;
        }

        match self.lines.send(token::to_line(value)).await {
            Ok(()) => Delivery::Written,
            Err(e) => {
                self.failed += 1;
                log::error(&format!("Couldn't send {token_type} {value}: {e}"));
                Delivery::Failed
            }
        }
    }
}
