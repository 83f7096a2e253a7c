//! Game configuration and the engine context.
//!
//! [`GameSettings`] is a plain serde struct; every field has a default so a
//! partial JSON object (or `{}`) is a valid configuration. [`EngineContext`]
//! bundles the settings with the game id and a clock and is passed explicitly
//! into every engine call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::board::Terrain;
use crate::error::ConfigError;

/// Board shape and contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BoardLayout {
    /// The 19-hex board with the standard terrain and token sets
    #[default]
    Standard,
    /// A hexagonal board of any radius with caller-supplied multisets
    Custom(CustomLayout),
}

/// Terrain and token multisets for a custom board.
///
/// `terrains` needs one entry per hex (`3r(r+1) + 1`) including exactly one
/// desert; `tokens` needs one entry per non-desert hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLayout {
    pub radius: u32,
    pub terrains: Vec<Terrain>,
    pub tokens: Vec<u8>,
}

/// Rules configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    /// Points needed to win
    pub victory_points: u32,
    pub board_layout: BoardLayout,
    /// Shuffle terrain, tokens and ports; otherwise use the fixed beginner layout
    pub randomize_board: bool,
    /// A 7 makes players holding more than this many cards discard half
    pub hand_limit_before_discard: u32,
    /// Cards given to the bank per card received
    pub bank_trade_ratio: u32,
    pub longest_road_minimum: u32,
    pub largest_army_minimum: u32,
    /// How long a player trade offer stays open
    pub trade_offer_ttl_seconds: i64,
    pub min_players: u8,
    pub max_players: u8,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            victory_points: 10,
            board_layout: BoardLayout::Standard,
            randomize_board: true,
            hand_limit_before_discard: 7,
            bank_trade_ratio: 4,
            longest_road_minimum: 5,
            largest_army_minimum: 3,
            trade_offer_ttl_seconds: 120,
            min_players: 2,
            max_players: 4,
        }
    }
}

impl GameSettings {
    /// Parse settings from JSON, filling omitted keys with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(
            ok: bool,
            field: &'static str,
            expected: &'static str,
            actual: i64,
        ) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    expected,
                    actual,
                })
            }
        }

        check(self.victory_points >= 3, "victoryPoints", "at least 3", self.victory_points as i64)?;
        check(
            self.hand_limit_before_discard >= 1,
            "handLimitBeforeDiscard",
            "at least 1",
            self.hand_limit_before_discard as i64,
        )?;
        check(
            self.bank_trade_ratio >= 2,
            "bankTradeRatio",
            "at least 2",
            self.bank_trade_ratio as i64,
        )?;
        check(
            self.longest_road_minimum >= 1,
            "longestRoadMinimum",
            "at least 1",
            self.longest_road_minimum as i64,
        )?;
        check(
            self.largest_army_minimum >= 1,
            "largestArmyMinimum",
            "at least 1",
            self.largest_army_minimum as i64,
        )?;
        check(
            self.trade_offer_ttl_seconds > 0,
            "tradeOfferTtlSeconds",
            "positive",
            self.trade_offer_ttl_seconds,
        )?;
        check(self.min_players >= 2, "minPlayers", "at least 2", self.min_players as i64)?;
        check(
            self.max_players >= self.min_players,
            "maxPlayers",
            "at least minPlayers",
            self.max_players as i64,
        )?;
        Ok(())
    }
}

/// Source of event timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always the same instant; for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Immutable per-game context handed to every engine call
#[derive(Clone)]
pub struct EngineContext {
    pub game_id: Uuid,
    pub settings: GameSettings,
    clock: Arc<dyn Clock>,
    forced_dice: Option<[u8; 2]>,
}

impl EngineContext {
    /// Context using the system clock
    pub fn new(game_id: Uuid, settings: GameSettings) -> Self {
        Self {
            game_id,
            settings,
            clock: Arc::new(SystemClock),
            forced_dice: None,
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Make every roll under this context come up `dice` instead of drawing
    /// from the game's stream. Used for scripted scenarios and look-ahead.
    pub fn with_dice(mut self, dice: [u8; 2]) -> Self {
        self.forced_dice = Some(dice);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn forced_dice(&self) -> Option<[u8; 2]> {
        self.forced_dice
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("game_id", &self.game_id)
            .field("settings", &self.settings)
            .field("forced_dice", &self.forced_dice)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.victory_points, 10);
        assert_eq!(settings.hand_limit_before_discard, 7);
        assert_eq!(settings.bank_trade_ratio, 4);
        assert_eq!(settings.board_layout, BoardLayout::Standard);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = GameSettings::from_json(r#"{"victoryPoints": 12, "randomizeBoard": false}"#)
            .unwrap();
        assert_eq!(settings.victory_points, 12);
        assert!(!settings.randomize_board);
        assert_eq!(settings.bank_trade_ratio, 4);
    }

    #[test]
    fn test_layout_json() {
        let settings = GameSettings::from_json(r#"{"boardLayout": "standard"}"#).unwrap();
        assert_eq!(settings.board_layout, BoardLayout::Standard);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let err = GameSettings::from_json(r#"{"bankTradeRatio": 1}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "bankTradeRatio",
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            GameSettings::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
