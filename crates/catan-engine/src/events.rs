//! Events produced by accepted actions, and the append-only log that keeps them.
//!
//! The processor only ever produces events; nothing in the engine reads them
//! back. Clients use [`EventLog::since`] to catch up after reconnecting.

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};

use crate::board::{BuildingType, EdgeId, HexId, PlayerId, Resource, VertexId};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::trade::TradeId;

/// Identifier of an event, increasing within a game
pub type EventId = u64;

/// A single entry in the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: EventId,
    /// Who caused it; `None` for things like dice distribution
    pub player: Option<PlayerId>,
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl GameEvent {
    pub fn new(
        id: EventId,
        player: Option<PlayerId>,
        kind: EventKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player,
            kind,
            timestamp,
        }
    }
}

/// What happened, with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum EventKind {
    DiceRolled {
        dice: [u8; 2],
        total: u8,
    },
    /// Production after a roll, or starting resources after setup
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },
    BuildingPlaced {
        vertex: VertexId,
        building: BuildingType,
    },
    RoadPlaced {
        edge: EdgeId,
        /// Placed without paying (setup or road building)
        free: bool,
    },
    BankTradeExecuted {
        offering: ResourceHand,
        requesting: ResourceHand,
        ratio: u32,
    },
    PortTradeExecuted {
        offering: ResourceHand,
        requesting: ResourceHand,
    },
    TradeOffered {
        trade_id: TradeId,
        target: Option<PlayerId>,
        offering: ResourceHand,
        requesting: ResourceHand,
    },
    TradeAccepted {
        trade_id: TradeId,
        initiator: PlayerId,
        accepted_by: PlayerId,
    },
    TradeRejected {
        trade_id: TradeId,
        /// Whether the offer is now closed
        closed: bool,
    },
    TradeCancelled {
        trade_id: TradeId,
    },
    /// The drawn card is private; only the deck size is public
    DevelopmentCardPurchased {
        cards_left: usize,
    },
    CardPlayed {
        card: DevelopmentCard,
    },
    MonopolyCollected {
        resource: Resource,
        total: u32,
    },
    YearOfPlentyReceived {
        resources: Vec<Resource>,
    },
    RobberMoved {
        from: HexId,
        to: HexId,
    },
    ResourceStolen {
        victim: PlayerId,
        resource: Option<Resource>,
    },
    ResourcesDiscarded {
        resources: ResourceHand,
    },
    SetupAdvanced {
        next_player: PlayerId,
        /// True once the last setup road is down and play begins
        complete: bool,
    },
    TurnEnded {
        next_player: PlayerId,
        turn: u32,
    },
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },
    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        knights: u32,
    },
    GameWon {
        victory_points: u32,
    },
}

/// Append-only event history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vector<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add events to the end of the log.
    ///
    /// Ids must keep increasing; anything else means two engines wrote to one log.
    pub fn append(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            if let Some(last) = self.events.last() {
                assert!(
                    event.id > last.id,
                    "event {} appended after event {}",
                    event.id,
                    last.id
                );
            }
            self.events.push_back(event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_id(&self) -> Option<EventId> {
        self.events.last().map(|e| e.id)
    }

    /// Events strictly after `id`
    pub fn since(&self, id: EventId) -> Vec<GameEvent> {
        self.events.iter().filter(|e| e.id > id).cloned().collect()
    }
}
