//! Module that contains the tokens exchanged between the two peers and their wire format.
//!
//! On the wire a token is a single line holding a base-10 `i64`. The sign tells which token
//! it is (positive for PING, negative for PONG) and the magnitude carries its generation.

use crate::error::{MisraError, Result};
use std::fmt;

/// Enum that tells which of the two tokens is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Ping,
    Pong,
}

/// Enum that tells which tokens a node is currently holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    #[default]
    None,
    HoldPing,
    HoldPong,
    HoldBoth,
}

impl TokenType {
    /// Function that returns the token type encoded by the sign of a value.
    ///
    /// Zero carries no token identity and yields `None`.
    pub fn of(value: i64) -> Option<Self> {
        match value {
            v if v > 0 => Some(Self::Ping),
            v if v < 0 => Some(Self::Pong),
            _ => None,
        }
    }

    pub fn counterpart(self) -> Self {
        match self {
            Self::Ping => Self::Pong,
            Self::Pong => Self::Ping,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ping => write!(f, "PING"),
            Self::Pong => write!(f, "PONG"),
        }
    }
}

impl HoldState {
    pub fn holds_ping(self) -> bool {
        matches!(self, Self::HoldPing | Self::HoldBoth)
    }

    pub fn holds_pong(self) -> bool {
        matches!(self, Self::HoldPong | Self::HoldBoth)
    }

    /// Function that returns the state after a token of the given type arrives.
    pub fn with(self, token_type: TokenType) -> Self {
        match (self, token_type) {
            (Self::None, TokenType::Ping) => Self::HoldPing,
            (Self::None, TokenType::Pong) => Self::HoldPong,
            (Self::HoldPong, TokenType::Ping) | (Self::HoldPing, TokenType::Pong) => {
                Self::HoldBoth
            }
            (state, _) => state,
        }
    }

    /// Function that returns the state after a token of the given type is passed on.
    pub fn without(self, token_type: TokenType) -> Self {
        match (self, token_type) {
            (Self::HoldPing, TokenType::Ping) | (Self::HoldPong, TokenType::Pong) => Self::None,
            (Self::HoldBoth, TokenType::Ping) => Self::HoldPong,
            (Self::HoldBoth, TokenType::Pong) => Self::HoldPing,
            (state, _) => state,
        }
    }
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::HoldPing => write!(f, "PING"),
            Self::HoldPong => write!(f, "PONG"),
            Self::HoldBoth => write!(f, "BOTH"),
        }
    }
}

/// Function that returns a token value as a wire line, without the trailing newline.
pub fn to_line(value: i64) -> String {
    value.to_string()
}

/// Function that parses a token value from a wire line.
pub fn from_line(line: &str) -> Result<i64> {
    line.parse::<i64>().map_err(|_| MisraError::Parse {
        line: line.to_string(),
    })
}
