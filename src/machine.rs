//! Module that contains the token state machine of Misra's ping-pong algorithm.
//!
//! The machine only does bookkeeping: it never touches the link. The decision loop in
//! [`crate::node`] feeds it every inbound value and tells it about every token it passes on.

use crate::token::{HoldState, TokenType};

/// Enum that tells what happened to an inbound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// Older than the last token sent; discarded.
    Stale,
    /// The last token sent came back unchanged, so the given token was lost in transit.
    Lost(TokenType),
    /// A token this node did not hold arrived.
    Accepted(TokenType),
    /// A token this node already held arrived; its values were overwritten.
    Unexpected(TokenType),
}

/// Struct that counts what the machine has gone through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub transitions: u64,
    pub received: u64,
    pub stale: u64,
    pub regenerations: u64,
    pub sent: u64,
}

#[derive(Debug, Clone)]
pub struct TokenMachine {
    state: HoldState,
    ping: i64,
    pong: i64,
    last_sent: i64,
    stats: Stats,
}

impl Default for TokenMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenMachine {
    pub fn new() -> Self {
        Self {
            state: HoldState::None,
            ping: 1,
            pong: -1,
            last_sent: 0,
            stats: Stats::default(),
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn ping(&self) -> i64 {
        self.ping
    }

    pub fn pong(&self) -> i64 {
        self.pong
    }

    pub fn last_sent(&self) -> i64 {
        self.last_sent
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Function that returns the value currently carried by a token.
    pub fn value_of(&self, token_type: TokenType) -> i64 {
        match token_type {
            TokenType::Ping => self.ping,
            TokenType::Pong => self.pong,
        }
    }

    fn set_state(&mut self, state: HoldState) {
        if self.state != state {
            self.state = state;
            self.stats.transitions += 1;
        }
    }

    /// Function that creates the initial token pair on the initiating node.
    pub fn originate(&mut self) {
        self.ping = 1;
        self.pong = -1;
        self.last_sent = 0;
        self.set_state(HoldState::HoldBoth);
    }

    /// Function that processes an inbound token value.
    pub fn receive_token(&mut self, value: i64) -> Received {
        self.stats.received += 1;

        if value.unsigned_abs() < self.last_sent.unsigned_abs() {
            self.stats.stale += 1;
            return Received::Stale;
        }

        if value == self.last_sent {
            // the counterpart of the returning token never made it around
            let lost = TokenType::of(self.last_sent)
                .map(TokenType::counterpart)
                .unwrap_or(TokenType::Ping);
            self.set_state(HoldState::HoldBoth);
            return Received::Lost(lost);
        }

        let token_type = if value > 0 {
            TokenType::Ping
        } else {
            TokenType::Pong
        };

        // i64::MIN has no positive mirror
        self.ping = value.checked_abs().unwrap_or(i64::MAX);
        self.pong = -self.ping;

        let already_held = match token_type {
            TokenType::Ping => self.state.holds_ping(),
            TokenType::Pong => self.state.holds_pong(),
        };
        self.set_state(self.state.with(token_type));

        if already_held {
            Received::Unexpected(token_type)
        } else {
            Received::Accepted(token_type)
        }
    }

    /// Function that records that a token has been passed on and returns the value sent.
    pub fn record_send(&mut self, token_type: TokenType) -> i64 {
        self.last_sent = self.value_of(token_type);
        self.stats.sent += 1;
        self.set_state(self.state.without(token_type));
        self.last_sent
    }

    /// Function that gives both tokens a fresh generation.
    pub fn regenerate(&mut self) {
        self.ping = self.ping.saturating_add(1);
        self.pong = -self.ping;
        self.stats.regenerations += 1;
    }
}
