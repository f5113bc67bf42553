//! Misra's ping-pong token algorithm for mutual exclusion between two peers.
//!
//! Data flows `link` → `receiver` → bounded queue → `node` → `machine` / `sender` → `link`.

use crate::{
    config::NodeConfig,
    error::Result,
    loss::Loss,
    node::{FixedDelay, Node},
    sender::TokenSender,
};
use color_print::cformat;

pub mod config;
pub mod error;
pub mod link;
pub mod log;
pub mod loss;
pub mod machine;
pub mod node;
pub mod receiver;
pub mod sender;
pub mod token;

pub const DEFAULT_CRITICAL_SECTION_MS: u64 = 1_000;

/// Function that joins the link and plays the protocol until something fatal happens.
///
/// It only ever returns an error: the protocol itself runs forever.
pub async fn run(config: NodeConfig) -> Result<()> {
    config.validate()?;

    let loss = Loss::new(config.loss_probability, config.seed)?;
    let listener = link::bind(config.listen_port).await?;
    log::info(&cformat!(
        "Listening on port <bold>{}</bold>, dialing <bold>{}</bold>.",
        config.listen_port,
        config.peer_address
    ));

    let link = link::establish(listener, &config.peer_address, &config.retry).await?;

    let (inbound, receiver) = receiver::spawn(link.inbound, receiver::INBOUND_CAPACITY);
    let sender = TokenSender::new(link.outbound, loss);
    let mut node = Node::new(sender, inbound, FixedDelay(config.critical_section()));

    if config.initiator {
        node.originate().await;
    }

    Err(node.run(receiver).await)
}
