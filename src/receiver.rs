//! Module that reads tokens from the peer in the background.
//!
//! The receiver never touches node state. Every parsed value goes through a bounded queue to
//! the decision loop; when the link fails the task ends, closing the queue, and the error is
//! handed back through its [`JoinHandle`].

use crate::{
    error::{MisraError, Result},
    log, token,
};
use futures::StreamExt;
use tokio::{
    io::AsyncRead,
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// One pending value of each sign.
pub const INBOUND_CAPACITY: usize = 2;

/// Longer than any decimal `i64`.
pub const MAX_LINE_LENGTH: usize = 64;

pub type Inbound = Receiver<i64>;

/// Function that starts the receiver task on the read side of the link.
pub fn spawn<R>(reader: R, capacity: usize) -> (Inbound, JoinHandle<Result<()>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<i64>(capacity);
    let handle = tokio::spawn(read_tokens(reader, tx));

    (rx, handle)
}

async fn read_tokens<R: AsyncRead + Unpin>(reader: R, tx: Sender<i64>) -> Result<()> {
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    loop {
        let line = match lines.next().await {
            Some(Ok(line)) => line,
            Some(Err(LinesCodecError::Io(e))) => return Err(MisraError::Read(e)),
            Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                return Err(MisraError::Parse {
                    line: String::from("<line too long>"),
                })
            }
            None => return Err(MisraError::LinkClosed),
        };

        let value = token::from_line(&line)?;
        log::debug(&format!("Received token {value}."));

        if tx.send(value).await.is_err() {
            // decision loop is gone
            return Ok(());
        }
    }
}
