//! Actions players submit to the engine.
//!
//! Every variant carries the acting player's id. The enum is closed: adding a
//! variant forces the validator, the processor and move enumeration to handle
//! it.

use serde::{Deserialize, Serialize};

use crate::board::{BuildingType, EdgeId, HexId, PlayerId, Resource, VertexId};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::trade::TradeId;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameAction {
    // ==================== Turn Actions ====================
    /// Roll the dice from the game's seeded stream
    Roll { player_id: PlayerId },

    // ==================== Building Actions ====================
    /// Place a settlement or upgrade one to a city (setup or main phase)
    PlaceBuilding {
        player_id: PlayerId,
        vertex: VertexId,
        building: BuildingType,
    },
    /// Place a road (setup, main phase, or a free road from road building)
    PlaceRoad { player_id: PlayerId, edge: EdgeId },
    /// Generic placement entry used by build mode
    Build {
        player_id: PlayerId,
        target: BuildTarget,
    },

    // ==================== Trading Actions ====================
    /// Trade with the bank at the configured ratio
    BankTrade {
        player_id: PlayerId,
        offering: ResourceHand,
        requesting: ResourceHand,
    },
    /// Trade through a port the player has a building on
    PortTrade {
        player_id: PlayerId,
        offering: ResourceHand,
        requesting: ResourceHand,
    },
    /// Offer a trade to one player (`target`) or to everyone
    CreateTradeOffer {
        player_id: PlayerId,
        #[serde(default)]
        target: Option<PlayerId>,
        offering: ResourceHand,
        requesting: ResourceHand,
    },
    AcceptTrade { player_id: PlayerId, trade_id: TradeId },
    RejectTrade { player_id: PlayerId, trade_id: TradeId },
    /// Withdraw your own offer
    CancelTrade { player_id: PlayerId, trade_id: TradeId },

    // ==================== Development Cards ====================
    BuyCard { player_id: PlayerId },
    PlayCard { player_id: PlayerId, play: CardPlay },

    // ==================== Robber ====================
    /// Move the robber to a different hex
    MoveRobber { player_id: PlayerId, hex: HexId },
    /// Steal one random card from a player next to the robber
    StealResource { player_id: PlayerId, victim: PlayerId },
    /// Give up half a hand after a 7
    Discard {
        player_id: PlayerId,
        resources: ResourceHand,
    },

    EndTurn { player_id: PlayerId },
}

impl GameAction {
    /// The player submitting this action
    pub fn player_id(&self) -> PlayerId {
        match self {
            GameAction::Roll { player_id, .. }
            | GameAction::PlaceBuilding { player_id, .. }
            | GameAction::PlaceRoad { player_id, .. }
            | GameAction::Build { player_id, .. }
            | GameAction::BankTrade { player_id, .. }
            | GameAction::PortTrade { player_id, .. }
            | GameAction::CreateTradeOffer { player_id, .. }
            | GameAction::AcceptTrade { player_id, .. }
            | GameAction::RejectTrade { player_id, .. }
            | GameAction::CancelTrade { player_id, .. }
            | GameAction::BuyCard { player_id }
            | GameAction::PlayCard { player_id, .. }
            | GameAction::MoveRobber { player_id, .. }
            | GameAction::StealResource { player_id, .. }
            | GameAction::Discard { player_id, .. }
            | GameAction::EndTurn { player_id } => *player_id,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Roll { .. } => "roll",
            GameAction::PlaceBuilding { .. } => "placeBuilding",
            GameAction::PlaceRoad { .. } => "placeRoad",
            GameAction::Build { .. } => "build",
            GameAction::BankTrade { .. } => "bankTrade",
            GameAction::PortTrade { .. } => "portTrade",
            GameAction::CreateTradeOffer { .. } => "createTradeOffer",
            GameAction::AcceptTrade { .. } => "acceptTrade",
            GameAction::RejectTrade { .. } => "rejectTrade",
            GameAction::CancelTrade { .. } => "cancelTrade",
            GameAction::BuyCard { .. } => "buyCard",
            GameAction::PlayCard { .. } => "playCard",
            GameAction::MoveRobber { .. } => "moveRobber",
            GameAction::StealResource { .. } => "stealResource",
            GameAction::Discard { .. } => "discard",
            GameAction::EndTurn { .. } => "endTurn",
        }
    }

    /// Expand `Build` into the concrete placement it stands for
    pub fn resolve(&self) -> GameAction {
        match self {
            GameAction::Build { player_id, target } => match *target {
                BuildTarget::Settlement(vertex) => GameAction::PlaceBuilding {
                    player_id: *player_id,
                    vertex,
                    building: BuildingType::Settlement,
                },
                BuildTarget::City(vertex) => GameAction::PlaceBuilding {
                    player_id: *player_id,
                    vertex,
                    building: BuildingType::City,
                },
                BuildTarget::Road(edge) => GameAction::PlaceRoad {
                    player_id: *player_id,
                    edge,
                },
            },
            other => other.clone(),
        }
    }
}

/// What a `Build` action places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "camelCase")]
pub enum BuildTarget {
    Settlement(VertexId),
    City(VertexId),
    Road(EdgeId),
}

/// A development card being played, with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card", rename_all = "camelCase")]
pub enum CardPlay {
    /// Move the robber and steal
    Knight,
    /// Place two roads for free
    RoadBuilding,
    /// Take exactly two resources from the bank
    YearOfPlenty { resources: Vec<Resource> },
    /// Take every opponent's cards of one resource
    Monopoly { resource: Resource },
    /// Reveal a victory point card
    VictoryPoint,
}

impl CardPlay {
    pub fn card(&self) -> DevelopmentCard {
        match self {
            CardPlay::Knight => DevelopmentCard::Knight,
            CardPlay::RoadBuilding => DevelopmentCard::RoadBuilding,
            CardPlay::YearOfPlenty { .. } => DevelopmentCard::YearOfPlenty,
            CardPlay::Monopoly { .. } => DevelopmentCard::Monopoly,
            CardPlay::VictoryPoint => DevelopmentCard::VictoryPoint,
        }
    }
}
