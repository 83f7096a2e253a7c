//! Game state and phases.
//!
//! A [`GameState`] is an immutable snapshot. The processor clones it (cheap,
//! the maps are persistent) and edits the clone; the input is never touched.

use chrono::{DateTime, Utc};
use im::{OrdMap, Vector};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use uuid::Uuid;

use crate::board::{Board, PlayerId, VertexId};
use crate::error::EngineError;
use crate::generator;
use crate::player::{DevelopmentCard, Player, Score};
use crate::rng;
use crate::settings::EngineContext;
use crate::trade::{Trade, TradeId, TradeStatus};

/// Points awarded for Longest Road and for Largest Army
pub const ACHIEVEMENT_POINTS: u32 = 2;

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Where play continues once the robber business is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resume {
    /// A knight played before rolling; the player still has to roll
    Roll,
    Actions,
}

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GamePhase {
    /// First placement round, host to last player
    Setup1 { placing: SetupPlacing },
    /// Second placement round, last player back to host
    Setup2 { placing: SetupPlacing },
    /// Before rolling dice at start of turn
    Roll,
    /// Players over the hand limit must discard (rolled 7)
    Discard {
        /// Cards each player still owes
        #[serde(with = "crate::wire::pairs")]
        remaining: OrdMap<PlayerId, u32>,
    },
    /// Current player must move the robber
    MoveRobber { resume: Resume },
    /// Current player picks someone next to the robber to steal from
    Steal { victims: Vec<PlayerId>, resume: Resume },
    /// Main phase - trade, build, buy and play cards, end turn
    Actions,
    /// Game is over
    Ended,
}

impl GamePhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            GamePhase::Setup1 { .. } => PhaseKind::Setup1,
            GamePhase::Setup2 { .. } => PhaseKind::Setup2,
            GamePhase::Roll => PhaseKind::Roll,
            GamePhase::Discard { .. } => PhaseKind::Discard,
            GamePhase::MoveRobber { .. } => PhaseKind::MoveRobber,
            GamePhase::Steal { .. } => PhaseKind::Steal,
            GamePhase::Actions => PhaseKind::Actions,
            GamePhase::Ended => PhaseKind::Ended,
        }
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::Setup1 { .. } | GamePhase::Setup2 { .. })
    }
}

/// Phase without its data, for matching and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKind {
    Setup1,
    Setup2,
    Roll,
    Discard,
    MoveRobber,
    Steal,
    Actions,
    Ended,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Setup1 => "setup1",
            PhaseKind::Setup2 => "setup2",
            PhaseKind::Roll => "roll",
            PhaseKind::Discard => "discard",
            PhaseKind::MoveRobber => "moveRobber",
            PhaseKind::Steal => "steal",
            PhaseKind::Actions => "actions",
            PhaseKind::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: Uuid,
    pub phase: GamePhase,
    pub current_player: PlayerId,
    /// Turn number (0 during setup, then starts at 1)
    pub turn: u32,
    /// Last dice roll this turn
    pub dice: Option<[u8; 2]>,
    pub board: Board,
    #[serde(with = "crate::wire::pairs")]
    pub players: OrdMap<PlayerId, Player>,
    /// Development card draw pile, top at the back
    pub dev_deck: Vector<DevelopmentCard>,
    /// Open player trade offers
    pub trades: Vector<Trade>,
    pub winner: Option<PlayerId>,
    /// Setup phase tracking: which settlement was just placed
    pub setup_settlement: Option<VertexId>,
    /// Whether a non-VP development card has been played this turn
    pub dev_card_played_this_turn: bool,
    /// Free roads left from a road building card
    pub free_roads: u8,
    pub rng_seed: u64,
    /// Random transitions so far; with the seed this fixes the next draw
    pub rng_draws: u64,
    pub next_event_id: u64,
    pub next_trade_id: TradeId,
}

impl GameState {
    /// Create a game for the named players; player 0 is the host.
    ///
    /// `seed` fixes the board (when randomized), the development deck and every
    /// later random draw.
    pub fn new(ctx: &EngineContext, names: &[&str], seed: u64) -> Result<Self, EngineError> {
        let settings = &ctx.settings;
        settings.validate()?;
        let count = names.len();
        if count < settings.min_players as usize || count > settings.max_players as usize {
            return Err(EngineError::PlayerCount {
                min: settings.min_players,
                max: settings.max_players,
                actual: count,
            });
        }

        let board = generator::generate(settings, seed)?;

        let mut deck = DevelopmentCard::standard_deck();
        deck.shuffle(&mut rng::deck_stream(seed));

        let players: OrdMap<PlayerId, Player> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (i as PlayerId, Player::new(i as PlayerId, *name)))
            .collect();

        info!("Created game {} with {} players (seed {})", ctx.game_id, count, seed);

        Ok(Self {
            id: ctx.game_id,
            phase: GamePhase::Setup1 {
                placing: SetupPlacing::Settlement,
            },
            current_player: 0,
            turn: 0,
            dice: None,
            board,
            players,
            dev_deck: deck.into_iter().collect(),
            trades: Vector::new(),
            winner: None,
            setup_settlement: None,
            dev_card_played_this_turn: false,
            free_roads: 0,
            rng_seed: seed,
            rng_draws: 0,
            next_event_id: 1,
            next_trade_id: 1,
        })
    }

    // ==================== Players ====================

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Mutable access to a player the validator has already vouched for
    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        self.players
            .get_mut(&id)
            .unwrap_or_else(|| panic!("player {id} is not in this game"))
    }

    /// Player ids in turn order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Player ids in turn order starting with `first`
    pub fn turn_order_from(&self, first: PlayerId) -> Vec<PlayerId> {
        let ids = self.player_ids();
        let start = ids.iter().position(|p| *p == first).unwrap_or(0);
        ids[start..].iter().chain(&ids[..start]).copied().collect()
    }

    pub fn next_player_after(&self, player: PlayerId) -> PlayerId {
        self.turn_order_from(player).get(1).copied().unwrap_or(player)
    }

    pub fn previous_player_before(&self, player: PlayerId) -> PlayerId {
        self.turn_order_from(player).last().copied().unwrap_or(player)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Who the game is waiting on: the first pending discarder, otherwise
    /// the current player
    pub fn acting_player(&self) -> PlayerId {
        match &self.phase {
            GamePhase::Discard { remaining } => remaining
                .keys()
                .next()
                .copied()
                .unwrap_or(self.current_player),
            _ => self.current_player,
        }
    }

    pub fn longest_road_holder(&self) -> Option<PlayerId> {
        self.players.values().find(|p| p.has_longest_road).map(|p| p.id)
    }

    pub fn largest_army_holder(&self) -> Option<PlayerId> {
        self.players.values().find(|p| p.has_largest_army).map(|p| p.id)
    }

    pub fn trade(&self, id: TradeId) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Mark open offers whose expiry is at or before `now` as expired and
    /// return their ids.
    ///
    /// Validation only looks at a trade's status, so offers time out when the
    /// host's scheduler calls this between actions.
    pub fn expire_trades(&mut self, now: DateTime<Utc>) -> Vec<TradeId> {
        let mut expired = Vec::new();
        for trade in self.trades.iter_mut() {
            if trade.is_open() && trade.is_expired_at(now) {
                trade.status = TradeStatus::Expired;
                expired.push(trade.id);
            }
        }
        expired
    }

    // ==================== Scoring ====================

    /// Score a player from the board and their cards alone
    pub fn compute_score(&self, player: &Player) -> Score {
        let buildings: u32 = self
            .board
            .vertices()
            .filter_map(|v| v.building)
            .filter(|b| b.owner == player.id)
            .map(|b| b.kind.victory_points())
            .sum();
        let achievements = [player.has_longest_road, player.has_largest_army]
            .iter()
            .filter(|held| **held)
            .count() as u32
            * ACHIEVEMENT_POINTS;

        Score::new(
            buildings + achievements + player.revealed_victory_cards(),
            player.hidden_victory_cards(),
        )
    }

    /// Recompute every player's score from scratch
    pub fn recompute_scores(&mut self) {
        let scores: Vec<(PlayerId, Score)> = self
            .players
            .values()
            .map(|p| (p.id, self.compute_score(p)))
            .collect();
        for (id, score) in scores {
            self.player_mut(id).score = score;
        }
    }

    // ==================== Randomness & Counters ====================

    /// Stream for the next random transition
    pub(crate) fn next_rng(&mut self) -> ChaCha8Rng {
        let stream = rng::stream(self.rng_seed, self.rng_draws);
        self.rng_draws += 1;
        stream
    }

    pub(crate) fn take_event_id(&mut self) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    pub(crate) fn take_trade_id(&mut self) -> TradeId {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }
}

/// Cards a player holding `total` must give up after a 7
pub fn discard_amount(total: u32, hand_limit: u32) -> u32 {
    if total > hand_limit {
        total / 2
    } else {
        0
    }
}
