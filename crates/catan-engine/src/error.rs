//! Error types.
//!
//! Two families live here:
//! - [`ValidationError`]: an expected, recoverable rejection of a player action.
//!   These are collected into lists and handed back in a
//!   [`crate::processor::ProcessResult`]; they never mutate state.
//! - [`EngineError`] and friends: failures of the fallible non-action APIs
//!   (board generation, settings, game creation, wire decoding).
//!
//! Broken engine invariants (negative resource counts, a validated action that
//! names a missing player, two robbers) are neither: they panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable reason for an action rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownPlayer,
    NotYourTurn,
    InvalidPhase,
    GameOver,
    InsufficientResources,
    NoPiecesRemaining,
    InvalidLocation,
    Occupied,
    DistanceRule,
    NotConnected,
    InvalidTradeRatio,
    InvalidTrade,
    NoPortAccess,
    TradeNotFound,
    TradeExpired,
    CardNotOwned,
    CardNotYetPlayable,
    CardAlreadyPlayedThisTurn,
    EmptyDeck,
    InvalidCardPayload,
    InvalidDiscard,
    InvalidRobberTarget,
    InvalidVictim,
    InvalidDice,
}

/// A single reason an action was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The action field (or `"action"`/`"phase"`/`"playerId"`) at fault
    pub field: String,
    /// Human readable explanation
    pub message: String,
    /// Machine readable reason
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} on {}: {}", self.code, self.field, self.message)
    }
}

/// Problems building a board from a layout
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("layout has {hexes} hexes but {terrains} terrains")]
    TerrainCountMismatch { hexes: usize, terrains: usize },

    #[error("layout has {producing} producing hexes but {tokens} number tokens")]
    TokenCountMismatch { producing: usize, tokens: usize },

    #[error("number token {0} is not allowed (must be 2-12, never 7)")]
    InvalidToken(u8),

    #[error("layout must contain exactly one desert, found {0}")]
    DesertCount(usize),

    #[error("board radius must be at least 1")]
    EmptyLayout,

    #[error("board radius {radius} is too large (at most {max})")]
    TooLarge { radius: u32, max: u32 },
}

/// Problems with game settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Parse(String),

    #[error("{field} must be {expected}, got {actual}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        actual: i64,
    },
}

/// Errors from the fallible engine entry points other than `process_action`
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("need between {min} and {max} players, got {actual}")]
    PlayerCount { min: u8, max: u8, actual: usize },

    #[error("wire format error: {0}")]
    Wire(#[from] serde_json::Error),
}
