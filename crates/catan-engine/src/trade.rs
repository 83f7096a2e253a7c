//! Player-to-player trade offers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::board::PlayerId;
use crate::player::ResourceHand;

/// Identifier of a trade offer, unique within a game
pub type TradeId = u64;

/// Lifecycle of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeStatus {
    Open,
    Accepted,
    Rejected,
    Cancelled,
    Expired,
}

/// A trade offer between players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    /// Player making the offer
    pub initiator: PlayerId,
    /// Specific player to trade with, or None for open offer
    pub target: Option<PlayerId>,
    /// Resources the initiator gives
    pub offering: ResourceHand,
    /// Resources the initiator wants back
    pub requesting: ResourceHand,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Players who turned an open offer down
    #[serde(default)]
    pub rejected_by: Vec<PlayerId>,
}

impl Trade {
    /// Create a new open offer that expires after `ttl_seconds`
    pub fn new(
        id: TradeId,
        initiator: PlayerId,
        target: Option<PlayerId>,
        offering: ResourceHand,
        requesting: ResourceHand,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            id,
            initiator,
            target,
            offering,
            requesting,
            status: TradeStatus::Open,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            rejected_by: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether `player` is someone this offer is addressed to
    pub fn is_addressed_to(&self, player: PlayerId) -> bool {
        player != self.initiator && self.target.map_or(true, |t| t == player)
    }

    /// Record a rejection; returns true once nobody is left to accept.
    ///
    /// A targeted offer closes on its target's rejection. An open offer closes
    /// once every other player in `players` has rejected it.
    pub fn reject(&mut self, player: PlayerId, players: impl IntoIterator<Item = PlayerId>) -> bool {
        if !self.rejected_by.contains(&player) {
            self.rejected_by.push(player);
        }
        let closed = match self.target {
            Some(_) => true,
            None => players
                .into_iter()
                .filter(|p| *p != self.initiator)
                .all(|p| self.rejected_by.contains(&p)),
        };
        if closed {
            self.status = TradeStatus::Rejected;
        }
        closed
    }
}
