//! Module that drives a peer through Misra's ping-pong protocol.
//!
//! A [`Node`] is the single owner of the token state. The receiver task only reaches it
//! through the inbound queue, so every change to the state happens on the decision loop.

use crate::{
    error::{MisraError, Result},
    log,
    machine::{Received, TokenMachine},
    receiver::Inbound,
    sender::{Delivery, TokenSender},
    token::{HoldState, TokenType},
};
use color_print::cformat;
use std::{future::Future, time::Duration};
use tokio::{
    io::AsyncWrite,
    sync::mpsc::error::TryRecvError,
    task::{JoinError, JoinHandle},
};

/// Trait for the work done while holding the PING token.
///
/// The returned future runs to completion; inbound tokens are only looked at afterwards.
pub trait CriticalSection {
    fn enter(&mut self, ping: i64) -> impl Future<Output = ()> + Send;
}

/// Struct that occupies the critical section for a fixed amount of time.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl CriticalSection for FixedDelay {
    fn enter(&mut self, _ping: i64) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.0)
    }
}

pub struct Node<W, C> {
    machine: TokenMachine,
    sender: TokenSender<W>,
    inbound: Inbound,
    critical_section: C,
}

impl<W: AsyncWrite + Unpin, C: CriticalSection> Node<W, C> {
    pub fn new(sender: TokenSender<W>, inbound: Inbound, critical_section: C) -> Self {
        Self {
            machine: TokenMachine::new(),
            sender,
            inbound,
            critical_section,
        }
    }

    pub fn machine(&self) -> &TokenMachine {
        &self.machine
    }

    pub fn sender(&self) -> &TokenSender<W> {
        &self.sender
    }

    pub fn critical_section(&self) -> &C {
        &self.critical_section
    }

    /// Function that creates the token pair and hands both tokens to the peer.
    pub async fn originate(&mut self) {
        self.machine.originate();
        log::info(&cformat!(
            "Starting with both tokens: <yellow, bold>PING</yellow, bold> <bold>{}</bold> and <yellow, bold>PONG</yellow, bold> <bold>{}</bold>.",
            self.machine.ping(),
            self.machine.pong()
        ));

        self.send(TokenType::Ping).await;
        self.send(TokenType::Pong).await;
    }

    /// Function that passes a held token on to the peer.
    ///
    /// The state moves on whatever became of the transmission: a dropped or failed write
    /// is bookkept as if the token had left.
    pub async fn send(&mut self, token_type: TokenType) -> Delivery {
        let value = self.machine.value_of(token_type);
        let delivery = self.sender.transmit(token_type, value).await;
        self.machine.record_send(token_type);

        if delivery == Delivery::Written {
            log::info(&cformat!(
                "Token sent: <yellow, bold>{token_type}</yellow, bold>, value: <bold>{value}</bold>."
            ));
        }
        delivery
    }

    /// Function that hands an inbound value to the state machine.
    pub fn receive(&mut self, value: i64) -> Received {
        let received = self.machine.receive_token(value);

        match received {
            Received::Stale => log::info(&cformat!("Received an old token <bold>{value}</bold>.")),
            Received::Lost(lost) => log::warn(&cformat!(
                "<yellow, bold>{lost}</yellow, bold> is lost, regenerating."
            )),
            Received::Accepted(token_type) => log::debug(&format!(
                "Holding {token_type} {value}, state is now {}.",
                self.machine.state()
            )),
            Received::Unexpected(token_type) => log::warn(&cformat!(
                "Received <yellow, bold>{token_type}</yellow, bold> <bold>{value}</bold> while already holding it."
            )),
        }
        received
    }

    /// Function that runs one iteration of the decision loop.
    pub async fn step(&mut self) -> Result<()> {
        match self.machine.state() {
            HoldState::None => {
                let value = self.inbound.recv().await.ok_or(MisraError::InboundClosed)?;
                self.receive(value);
            }
            HoldState::HoldPing => {
                let ping = self.machine.ping();
                log::info(&cformat!(
                    "I have the <yellow, bold>PING</yellow, bold> token <bold>{ping}</bold>, entering the critical section."
                ));
                self.critical_section.enter(ping).await;
                log::info("Exiting the critical section.");

                match self.inbound.try_recv() {
                    Ok(value) => {
                        self.receive(value);
                    }
                    Err(TryRecvError::Empty) => {
                        self.send(TokenType::Ping).await;
                    }
                    Err(TryRecvError::Disconnected) => return Err(MisraError::InboundClosed),
                }
            }
            HoldState::HoldPong => {
                self.send(TokenType::Pong).await;
            }
            HoldState::HoldBoth => {
                self.machine.regenerate();
                log::info(&cformat!(
                    "I have both tokens, new values: <yellow, bold>PING</yellow, bold> <bold>{}</bold> <yellow, bold>PONG</yellow, bold> <bold>{}</bold>.",
                    self.machine.ping(),
                    self.machine.pong()
                ));
                self.send(TokenType::Ping).await;
                self.send(TokenType::Pong).await;
            }
        }
        Ok(())
    }

    async fn run_loop(&mut self) -> MisraError {
        loop {
            if let Err(e) = self.step().await {
                return e;
            }
        }
    }

    /// Function that runs the decision loop until the link fails.
    ///
    /// A fatal error reported by the receiver task wins over the loop's own view of the
    /// closed queue.
    pub async fn run(&mut self, mut receiver: JoinHandle<Result<()>>) -> MisraError {
        tokio::select! {
            biased;

            joined = &mut receiver => receiver_failure(joined),
            failed = self.run_loop() => match failed {
                MisraError::InboundClosed => receiver_failure(receiver.await),
                e => e,
            },
        }
    }
}

fn receiver_failure(joined: std::result::Result<Result<()>, JoinError>) -> MisraError {
    match joined {
        Ok(Err(e)) => e,
        Ok(Ok(())) => MisraError::InboundClosed,
        Err(_) => MisraError::ReceiverPanicked,
    }
}
