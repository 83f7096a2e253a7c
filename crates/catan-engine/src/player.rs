//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, building inventory, development cards and achievements
//! - ResourceHand for managing resource counts
//! - Development card types and the standard deck
//! - Building costs

use crate::board::{PlayerId, Resource};
use im::Vector;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Settlements each player starts with
pub const STARTING_SETTLEMENTS: u32 = 5;
/// Cities each player starts with
pub const STARTING_CITIES: u32 = 4;
/// Roads each player starts with
pub const STARTING_ROADS: u32 = 15;

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP; hidden until played
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All opponents must give you all of one resource type
    Monopoly,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards), unshuffled
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }

    /// Victory point cards may be played the turn they are bought and do not
    /// count against the one-card-per-turn limit.
    pub fn is_victory_point(&self) -> bool {
        matches!(self, DevelopmentCard::VictoryPoint)
    }
}

/// A development card in a player's hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCard {
    pub card: DevelopmentCard,
    /// Turn on which the card was bought
    pub purchased_turn: u32,
    /// Turn on which the card was played, if it has been
    pub played_turn: Option<u32>,
}

impl OwnedCard {
    /// Whether the card can be played on `turn`
    pub fn is_playable_on(&self, turn: u32) -> bool {
        self.played_turn.is_none()
            && (self.card.is_victory_point() || self.purchased_turn < turn)
    }
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Wood => self.wood = count,
            Resource::Brick => self.brick = count,
            Resource::Sheep => self.sheep = count,
            Resource::Wheat => self.wheat = count,
            Resource::Ore => self.ore = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost.
    ///
    /// Panics if the hand cannot cover it: every caller has validated
    /// affordability, so reaching a negative count is an engine bug.
    pub fn subtract(&mut self, cost: &ResourceHand) {
        assert!(
            self.can_afford(cost),
            "resource count would go negative: {:?} - {:?}",
            self,
            cost
        );
        for resource in Resource::ALL {
            self.set(resource, self.get(resource) - cost.get(resource));
        }
    }

    /// Non-zero entries as `(resource, count)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(move |r| (r, self.get(r)))
            .filter(|(_, count)| *count > 0)
    }

    /// Number of distinct resource types present
    pub fn kinds(&self) -> usize {
        self.iter().count()
    }

    /// Remove one card chosen uniformly at random (for robber stealing)
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        for resource in Resource::ALL {
            let count = self.get(resource);
            if pick < count {
                self.set(resource, count - 1);
                return Some(resource);
            }
            pick -= count;
        }
        unreachable!("pick is below the hand total")
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 sheep, 1 wheat, 1 ore
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// Pieces a player still has in their supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingInventory {
    pub settlements: u32,
    pub cities: u32,
    pub roads: u32,
}

impl Default for BuildingInventory {
    fn default() -> Self {
        Self {
            settlements: STARTING_SETTLEMENTS,
            cities: STARTING_CITIES,
            roads: STARTING_ROADS,
        }
    }
}

/// Victory points, split into what opponents can see and what they cannot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub public: u32,
    pub hidden: u32,
    /// Always `public + hidden`
    pub total: u32,
}

impl Score {
    pub fn new(public: u32, hidden: u32) -> Self {
        Self {
            public,
            hidden,
            total: public + hidden,
        }
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current resources
    pub resources: ResourceHand,
    /// Pieces left to place
    pub buildings: BuildingInventory,
    /// Development cards, played and unplayed
    pub dev_cards: Vector<OwnedCard>,
    pub score: Score,
    /// Number of knights played (for Largest Army)
    pub knights_played: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            resources: ResourceHand::new(),
            buildings: BuildingInventory::default(),
            dev_cards: Vector::new(),
            score: Score::default(),
            knights_played: 0,
            has_longest_road: false,
            has_largest_army: false,
        }
    }

    /// Unplayed victory point cards (opponents can't see these)
    pub fn hidden_victory_cards(&self) -> u32 {
        self.dev_cards
            .iter()
            .filter(|c| c.card.is_victory_point() && c.played_turn.is_none())
            .count() as u32
    }

    /// Victory point cards that have been played face up
    pub fn revealed_victory_cards(&self) -> u32 {
        self.dev_cards
            .iter()
            .filter(|c| c.card.is_victory_point() && c.played_turn.is_some())
            .count() as u32
    }

    /// Whether the player holds `card` unplayed, ignoring when it was bought
    pub fn owns_unplayed(&self, card: DevelopmentCard) -> bool {
        self.dev_cards
            .iter()
            .any(|c| c.card == card && c.played_turn.is_none())
    }

    /// Index of a copy of `card` that may be played on `turn`
    pub fn playable_card_index(&self, card: DevelopmentCard, turn: u32) -> Option<usize> {
        self.dev_cards
            .iter()
            .position(|c| c.card == card && c.is_playable_on(turn))
    }

    /// Pay for and take a road piece
    pub fn buy_road(&mut self) {
        self.resources.subtract(&costs::road());
        self.take_road();
    }

    /// Take a road piece without paying (setup, road building)
    pub fn take_road(&mut self) {
        assert!(self.buildings.roads > 0, "player {} has no roads left", self.id);
        self.buildings.roads -= 1;
    }

    /// Pay for and take a settlement piece
    pub fn buy_settlement(&mut self) {
        self.resources.subtract(&costs::settlement());
        self.take_settlement();
    }

    /// Take a settlement piece without paying (setup)
    pub fn take_settlement(&mut self) {
        assert!(
            self.buildings.settlements > 0,
            "player {} has no settlements left",
            self.id
        );
        self.buildings.settlements -= 1;
    }

    /// Pay for a city (the replaced settlement piece returns to supply)
    pub fn buy_city(&mut self) {
        assert!(self.buildings.cities > 0, "player {} has no cities left", self.id);
        self.resources.subtract(&costs::city());
        self.buildings.cities -= 1;
        self.buildings.settlements += 1;
    }

    /// Pay for a development card drawn on `turn`
    pub fn buy_dev_card(&mut self, card: DevelopmentCard, turn: u32) {
        self.resources.subtract(&costs::development_card());
        self.dev_cards.push_back(OwnedCard {
            card,
            purchased_turn: turn,
            played_turn: None,
        });
    }

    /// Mark a playable copy of `card` as played on `turn`.
    ///
    /// Panics if there is none; the validator checks ownership first.
    pub fn play_card(&mut self, card: DevelopmentCard, turn: u32) {
        let index = self
            .playable_card_index(card, turn)
            .unwrap_or_else(|| panic!("player {} has no playable {:?}", self.id, card));
        if let Some(owned) = self.dev_cards.get_mut(index) {
            owned.played_turn = Some(turn);
        }
        if card == DevelopmentCard::Knight {
            self.knights_played += 1;
        }
    }
}
