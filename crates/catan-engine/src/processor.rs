//! The reducer: `(state, action) -> (new state, events)`.
//!
//! Every call runs the same pipeline:
//! 1. validate (nothing changes on failure; the input state is handed back)
//! 2. clone the snapshot and apply the action to the clone
//! 3. post-process: longest road, largest army, scores, victory
//!
//! The input state is never mutated. Randomness comes from the seed and draw
//! counter stored in the state, so the same inputs always give the same result.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actions::{CardPlay, GameAction};
use crate::board::{Building, BuildingType, EdgeId, HexId, PlayerId, Resource, VertexId};
use crate::error::ValidationError;
use crate::events::{EventKind, GameEvent};
use crate::player::ResourceHand;
use crate::rng;
use crate::settings::EngineContext;
use crate::state::{discard_amount, GamePhase, GameState, Resume, SetupPlacing};
use crate::trade::{Trade, TradeId};
use crate::validator::validate;

/// Outcome of one call to [`process_action`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub success: bool,
    /// The next state, or the unmodified input when `success` is false
    pub new_state: GameState,
    pub events: Vec<GameEvent>,
    pub error: Option<Vec<ValidationError>>,
    pub message: Option<String>,
}

/// Validate and apply one action
pub fn process_action(ctx: &EngineContext, state: &GameState, action: &GameAction) -> ProcessResult {
    if let Err(errors) = validate(ctx, state, action) {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        debug!(
            "Rejected {} from player {}: {}",
            action.name(),
            action.player_id(),
            message
        );
        return ProcessResult {
            success: false,
            new_state: state.clone(),
            events: Vec::new(),
            error: Some(errors),
            message: Some(message),
        };
    }

    let mut transition = Transition {
        ctx,
        state: state.clone(),
        events: Vec::new(),
    };
    transition.apply(&action.resolve());
    transition.post_process();

    let Transition { state, events, .. } = transition;
    debug!(
        "Accepted {} from player {} ({} events, phase {})",
        action.name(),
        action.player_id(),
        events.len(),
        state.phase.kind()
    );

    ProcessResult {
        success: true,
        new_state: state,
        events,
        error: None,
        message: None,
    }
}

/// A state being edited plus the events the edit has produced so far
struct Transition<'a> {
    ctx: &'a EngineContext,
    state: GameState,
    events: Vec<GameEvent>,
}

impl Transition<'_> {
    fn emit(&mut self, player: Option<PlayerId>, kind: EventKind) {
        let id = self.state.take_event_id();
        self.events
            .push(GameEvent::new(id, player, kind, self.ctx.now()));
    }

    fn apply(&mut self, action: &GameAction) {
        match action {
            GameAction::Roll { player_id } => self.roll(*player_id),
            GameAction::PlaceBuilding {
                player_id,
                vertex,
                building,
            } => self.place_building(*player_id, *vertex, *building),
            GameAction::PlaceRoad { player_id, edge } => self.place_road(*player_id, *edge),
            GameAction::Build { .. } => unreachable!("build actions are resolved before applying"),
            GameAction::BankTrade {
                player_id,
                offering,
                requesting,
            } => {
                self.exchange_with_bank(*player_id, offering, requesting);
                let ratio = self.ctx.settings.bank_trade_ratio;
                self.emit(
                    Some(*player_id),
                    EventKind::BankTradeExecuted {
                        offering: *offering,
                        requesting: *requesting,
                        ratio,
                    },
                );
            }
            GameAction::PortTrade {
                player_id,
                offering,
                requesting,
            } => {
                self.exchange_with_bank(*player_id, offering, requesting);
                self.emit(
                    Some(*player_id),
                    EventKind::PortTradeExecuted {
                        offering: *offering,
                        requesting: *requesting,
                    },
                );
            }
            GameAction::CreateTradeOffer {
                player_id,
                target,
                offering,
                requesting,
            } => self.offer_trade(*player_id, *target, *offering, *requesting),
            GameAction::AcceptTrade {
                player_id,
                trade_id,
            } => self.accept_trade(*player_id, *trade_id),
            GameAction::RejectTrade {
                player_id,
                trade_id,
            } => self.reject_trade(*player_id, *trade_id),
            GameAction::CancelTrade {
                player_id,
                trade_id,
            } => {
                self.remove_trade(*trade_id);
                self.emit(
                    Some(*player_id),
                    EventKind::TradeCancelled {
                        trade_id: *trade_id,
                    },
                );
            }
            GameAction::BuyCard { player_id } => self.buy_card(*player_id),
            GameAction::PlayCard { player_id, play } => self.play_card(*player_id, play),
            GameAction::MoveRobber { player_id, hex } => self.move_robber(*player_id, *hex),
            GameAction::StealResource { player_id, victim } => self.steal(*player_id, *victim),
            GameAction::Discard {
                player_id,
                resources,
            } => self.discard(*player_id, resources),
            GameAction::EndTurn { player_id } => self.end_turn(*player_id),
        }
    }

    // ==================== Dice Rolling ====================

    fn roll(&mut self, player: PlayerId) {
        let dice = match self.ctx.forced_dice() {
            Some(dice) => dice,
            None => rng::roll_dice(&mut self.state.next_rng()),
        };
        let total = dice[0] + dice[1];
        self.state.dice = Some(dice);
        self.emit(Some(player), EventKind::DiceRolled { dice, total });

        if total == 7 {
            let limit = self.ctx.settings.hand_limit_before_discard;
            let remaining: im::OrdMap<PlayerId, u32> = self
                .state
                .players
                .values()
                .map(|p| (p.id, discard_amount(p.resources.total(), limit)))
                .filter(|(_, owed)| *owed > 0)
                .collect();
            self.state.phase = if remaining.is_empty() {
                GamePhase::MoveRobber {
                    resume: Resume::Actions,
                }
            } else {
                GamePhase::Discard { remaining }
            };
            return;
        }

        let distributions = self.state.board.production_for_roll(total);
        for (owner, resource, amount) in &distributions {
            self.state.player_mut(*owner).resources.add(*resource, *amount);
        }
        if !distributions.is_empty() {
            self.emit(None, EventKind::ResourcesDistributed { distributions });
        }
        self.state.phase = GamePhase::Actions;
    }

    // ==================== Building ====================

    fn place_building(&mut self, player: PlayerId, vertex: VertexId, kind: BuildingType) {
        let setup = self.state.phase.clone();
        match (kind, &setup) {
            (BuildingType::Settlement, GamePhase::Setup1 { .. } | GamePhase::Setup2 { .. }) => {
                self.state.player_mut(player).take_settlement();
                self.state
                    .board
                    .place_building(vertex, Building::settlement(player));
                self.state.setup_settlement = Some(vertex);
                self.emit(
                    Some(player),
                    EventKind::BuildingPlaced {
                        vertex,
                        building: kind,
                    },
                );

                if matches!(setup, GamePhase::Setup2 { .. }) {
                    let granted = self.state.board.starting_resources(vertex);
                    for resource in &granted {
                        self.state.player_mut(player).resources.add(*resource, 1);
                    }
                    if !granted.is_empty() {
                        let distributions = tally(player, &granted);
                        self.emit(Some(player), EventKind::ResourcesDistributed { distributions });
                    }
                    self.state.phase = GamePhase::Setup2 {
                        placing: SetupPlacing::Road,
                    };
                } else {
                    self.state.phase = GamePhase::Setup1 {
                        placing: SetupPlacing::Road,
                    };
                }
            }
            (BuildingType::Settlement, _) => {
                self.state.player_mut(player).buy_settlement();
                self.state
                    .board
                    .place_building(vertex, Building::settlement(player));
                self.emit(
                    Some(player),
                    EventKind::BuildingPlaced {
                        vertex,
                        building: kind,
                    },
                );
            }
            (BuildingType::City, _) => {
                self.state.player_mut(player).buy_city();
                self.state.board.place_building(vertex, Building::city(player));
                self.emit(
                    Some(player),
                    EventKind::BuildingPlaced {
                        vertex,
                        building: kind,
                    },
                );
            }
        }
    }

    fn place_road(&mut self, player: PlayerId, edge: EdgeId) {
        let in_setup = self.state.phase.is_setup();
        let free = in_setup || self.state.free_roads > 0;

        if free {
            self.state.player_mut(player).take_road();
            if !in_setup {
                self.state.free_roads -= 1;
            }
        } else {
            self.state.player_mut(player).buy_road();
        }
        self.state.board.place_road(edge, player);
        self.emit(Some(player), EventKind::RoadPlaced { edge, free });

        if in_setup {
            self.advance_setup(player);
        }
    }

    /// Setup runs host to last, then last back to host
    fn advance_setup(&mut self, player: PlayerId) {
        let ids = self.state.player_ids();
        let host = ids[0];
        let last = ids[ids.len() - 1];
        self.state.setup_settlement = None;

        let (next, phase, complete) = match self.state.phase {
            GamePhase::Setup1 { .. } if player == last => (
                player,
                GamePhase::Setup2 {
                    placing: SetupPlacing::Settlement,
                },
                false,
            ),
            GamePhase::Setup1 { .. } => (
                self.state.next_player_after(player),
                GamePhase::Setup1 {
                    placing: SetupPlacing::Settlement,
                },
                false,
            ),
            GamePhase::Setup2 { .. } if player == host => (host, GamePhase::Roll, true),
            GamePhase::Setup2 { .. } => (
                self.state.previous_player_before(player),
                GamePhase::Setup2 {
                    placing: SetupPlacing::Settlement,
                },
                false,
            ),
            ref other => panic!("setup road placed during {:?}", other.kind()),
        };

        self.state.current_player = next;
        self.state.phase = phase;
        if complete {
            self.state.turn = 1;
        }
        self.emit(
            Some(player),
            EventKind::SetupAdvanced {
                next_player: next,
                complete,
            },
        );
    }

    // ==================== Trading ====================

    fn exchange_with_bank(&mut self, player: PlayerId, offering: &ResourceHand, requesting: &ResourceHand) {
        let hand = &mut self.state.player_mut(player).resources;
        hand.subtract(offering);
        hand.add_hand(requesting);
    }

    fn offer_trade(
        &mut self,
        player: PlayerId,
        target: Option<PlayerId>,
        offering: ResourceHand,
        requesting: ResourceHand,
    ) {
        let id = self.state.take_trade_id();
        let trade = Trade::new(
            id,
            player,
            target,
            offering,
            requesting,
            self.ctx.now(),
            self.ctx.settings.trade_offer_ttl_seconds,
        );
        self.state.trades.push_back(trade);
        self.emit(
            Some(player),
            EventKind::TradeOffered {
                trade_id: id,
                target,
                offering,
                requesting,
            },
        );
    }

    fn accept_trade(&mut self, player: PlayerId, trade_id: TradeId) {
        let trade = self.remove_trade(trade_id);

        let initiator = &mut self.state.player_mut(trade.initiator).resources;
        initiator.subtract(&trade.offering);
        initiator.add_hand(&trade.requesting);

        let acceptor = &mut self.state.player_mut(player).resources;
        acceptor.subtract(&trade.requesting);
        acceptor.add_hand(&trade.offering);

        self.emit(
            Some(player),
            EventKind::TradeAccepted {
                trade_id,
                initiator: trade.initiator,
                accepted_by: player,
            },
        );
    }

    fn reject_trade(&mut self, player: PlayerId, trade_id: TradeId) {
        let ids = self.state.player_ids();
        let index = self.trade_index(trade_id);
        let closed = match self.state.trades.get_mut(index) {
            Some(trade) => trade.reject(player, ids),
            None => unreachable!("trade index came from the list"),
        };
        if closed {
            self.state.trades.remove(index);
        }
        self.emit(Some(player), EventKind::TradeRejected { trade_id, closed });
    }

    fn trade_index(&self, trade_id: TradeId) -> usize {
        self.state
            .trades
            .iter()
            .position(|t| t.id == trade_id)
            .unwrap_or_else(|| panic!("trade {trade_id} is not open"))
    }

    fn remove_trade(&mut self, trade_id: TradeId) -> Trade {
        let index = self.trade_index(trade_id);
        self.state.trades.remove(index)
    }

    // ==================== Development Cards ====================

    fn buy_card(&mut self, player: PlayerId) {
        let card = self
            .state
            .dev_deck
            .pop_back()
            .unwrap_or_else(|| panic!("bought from an empty deck"));
        let turn = self.state.turn;
        self.state.player_mut(player).buy_dev_card(card, turn);
        let cards_left = self.state.dev_deck.len();
        self.emit(Some(player), EventKind::DevelopmentCardPurchased { cards_left });
    }

    fn play_card(&mut self, player: PlayerId, play: &CardPlay) {
        let card = play.card();
        let turn = self.state.turn;
        self.state.player_mut(player).play_card(card, turn);
        if !card.is_victory_point() {
            self.state.dev_card_played_this_turn = true;
        }
        self.emit(Some(player), EventKind::CardPlayed { card });

        match play {
            CardPlay::Knight => {
                let resume = if self.state.phase == GamePhase::Roll {
                    Resume::Roll
                } else {
                    Resume::Actions
                };
                self.state.phase = GamePhase::MoveRobber { resume };
            }
            CardPlay::RoadBuilding => {
                let roads_left = self.state.player_mut(player).buildings.roads;
                self.state.free_roads = roads_left.min(2) as u8;
            }
            CardPlay::YearOfPlenty { resources } => {
                let hand = &mut self.state.player_mut(player).resources;
                for resource in resources {
                    hand.add(*resource, 1);
                }
                self.emit(
                    Some(player),
                    EventKind::YearOfPlentyReceived {
                        resources: resources.clone(),
                    },
                );
            }
            CardPlay::Monopoly { resource } => {
                let total = self.collect_monopoly(player, *resource);
                self.emit(
                    Some(player),
                    EventKind::MonopolyCollected {
                        resource: *resource,
                        total,
                    },
                );
            }
            CardPlay::VictoryPoint => {}
        }
    }

    fn collect_monopoly(&mut self, player: PlayerId, resource: Resource) -> u32 {
        let mut total = 0;
        for id in self.state.player_ids() {
            if id == player {
                continue;
            }
            let hand = &mut self.state.player_mut(id).resources;
            let count = hand.get(resource);
            hand.set(resource, 0);
            total += count;
        }
        self.state.player_mut(player).resources.add(resource, total);
        total
    }

    // ==================== Robber ====================

    fn move_robber(&mut self, player: PlayerId, hex: HexId) {
        let resume = match self.state.phase {
            GamePhase::MoveRobber { resume } => resume,
            ref other => panic!("robber moved during {:?}", other.kind()),
        };
        let from = self.state.board.robber();
        self.state.board.move_robber(hex);
        self.emit(Some(player), EventKind::RobberMoved { from, to: hex });

        let victims: Vec<PlayerId> = self
            .state
            .board
            .players_adjacent_to_hex(hex)
            .into_iter()
            .filter(|p| *p != player)
            .filter(|p| {
                self.state
                    .player(*p)
                    .is_some_and(|victim| victim.resources.total() > 0)
            })
            .collect();

        self.state.phase = if victims.is_empty() {
            resume_phase(resume)
        } else {
            GamePhase::Steal { victims, resume }
        };
    }

    fn steal(&mut self, player: PlayerId, victim: PlayerId) {
        let resume = match self.state.phase {
            GamePhase::Steal { resume, .. } => resume,
            ref other => panic!("steal during {:?}", other.kind()),
        };
        let mut rng = self.state.next_rng();
        let stolen = self
            .state
            .player_mut(victim)
            .resources
            .steal_random(&mut rng);
        if let Some(resource) = stolen {
            self.state.player_mut(player).resources.add(resource, 1);
        }
        self.emit(
            Some(player),
            EventKind::ResourceStolen {
                victim,
                resource: stolen,
            },
        );
        self.state.phase = resume_phase(resume);
    }

    fn discard(&mut self, player: PlayerId, resources: &ResourceHand) {
        self.state.player_mut(player).resources.subtract(resources);
        self.emit(
            Some(player),
            EventKind::ResourcesDiscarded {
                resources: *resources,
            },
        );

        let GamePhase::Discard { remaining } = &mut self.state.phase else {
            panic!("discard outside the discard phase");
        };
        remaining.remove(&player);
        if remaining.is_empty() {
            self.state.phase = GamePhase::MoveRobber {
                resume: Resume::Actions,
            };
        }
    }

    // ==================== Turn Management ====================

    fn end_turn(&mut self, player: PlayerId) {
        let open: Vec<TradeId> = self
            .state
            .trades
            .iter()
            .filter(|t| t.is_open())
            .map(|t| t.id)
            .collect();
        self.state.trades.clear();
        for trade_id in open {
            self.emit(Some(player), EventKind::TradeCancelled { trade_id });
        }

        let next = self.state.next_player_after(player);
        self.state.current_player = next;
        self.state.turn += 1;
        self.state.dice = None;
        self.state.free_roads = 0;
        self.state.dev_card_played_this_turn = false;
        self.state.phase = GamePhase::Roll;

        let turn = self.state.turn;
        self.emit(
            Some(player),
            EventKind::TurnEnded {
                next_player: next,
                turn,
            },
        );
    }

    // ==================== Post-processing ====================

    fn post_process(&mut self) {
        self.update_longest_road();
        self.update_largest_army();
        self.state.recompute_scores();
        self.check_victory();
    }

    /// Only a strictly longer road at or above the minimum takes the title
    /// from its holder, even after the holder's own road is cut. Without a
    /// holder a single strict leader at the minimum takes it; a tie at the
    /// top leaves it unclaimed.
    fn update_longest_road(&mut self) {
        let minimum = self.ctx.settings.longest_road_minimum;
        let lengths: Vec<(PlayerId, u32)> = self
            .state
            .player_ids()
            .into_iter()
            .map(|p| (p, self.state.board.longest_road(p)))
            .collect();
        let length_of = |player: PlayerId| {
            lengths
                .iter()
                .find(|(p, _)| *p == player)
                .map_or(0, |(_, l)| *l)
        };

        let previous = self.state.longest_road_holder();
        let to_beat = previous.map_or(minimum, |h| minimum.max(length_of(h) + 1));
        let challengers: Vec<(PlayerId, u32)> = lengths
            .iter()
            .filter(|(p, l)| Some(*p) != previous && *l >= to_beat)
            .copied()
            .collect();
        let best = challengers.iter().map(|(_, l)| *l).max();
        let current = match best {
            None => previous,
            Some(best) => {
                let leaders: Vec<PlayerId> = challengers
                    .iter()
                    .filter(|(_, l)| *l == best)
                    .map(|(p, _)| *p)
                    .collect();
                if leaders.len() == 1 {
                    Some(leaders[0])
                } else {
                    None
                }
            }
        };

        if current != previous {
            for id in self.state.player_ids() {
                self.state.player_mut(id).has_longest_road = Some(id) == current;
            }
            self.emit(
                current,
                EventKind::LongestRoadChanged {
                    previous,
                    current,
                    length: best.unwrap_or(0),
                },
            );
        }
    }

    /// Knights never go down, so the army only changes hands to a player
    /// strictly ahead of the holder.
    fn update_largest_army(&mut self) {
        let minimum = self.ctx.settings.largest_army_minimum;
        let previous = self.state.largest_army_holder();
        let to_beat = previous
            .and_then(|h| self.state.player(h))
            .map(|p| p.knights_played + 1)
            .unwrap_or(minimum)
            .max(minimum);

        let challenger = self
            .state
            .players
            .values()
            .filter(|p| p.knights_played >= to_beat)
            .max_by_key(|p| p.knights_played)
            .map(|p| (p.id, p.knights_played));

        if let Some((id, knights)) = challenger {
            for pid in self.state.player_ids() {
                self.state.player_mut(pid).has_largest_army = pid == id;
            }
            self.emit(
                Some(id),
                EventKind::LargestArmyChanged {
                    previous,
                    current: Some(id),
                    knights,
                },
            );
        }
    }

    /// Current player first, then the rest in turn order
    fn check_victory(&mut self) {
        if self.state.is_over() {
            return;
        }
        let target = self.ctx.settings.victory_points;
        let winner = self
            .state
            .turn_order_from(self.state.current_player)
            .into_iter()
            .find(|p| self.state.player(*p).is_some_and(|pl| pl.score.total >= target));

        if let Some(winner) = winner {
            let victory_points = self
                .state
                .player(winner)
                .map(|p| p.score.total)
                .unwrap_or(target);
            self.state.winner = Some(winner);
            self.state.phase = GamePhase::Ended;
            self.state.trades.clear();
            info!(
                "Player {} won game {} with {} points",
                winner, self.state.id, victory_points
            );
            self.emit(Some(winner), EventKind::GameWon { victory_points });
        }
    }
}

fn resume_phase(resume: Resume) -> GamePhase {
    match resume {
        Resume::Roll => GamePhase::Roll,
        Resume::Actions => GamePhase::Actions,
    }
}

/// Count resources into `(player, resource, amount)` entries
fn tally(player: PlayerId, resources: &[Resource]) -> Vec<(PlayerId, Resource, u32)> {
    let mut hand = ResourceHand::new();
    for resource in resources {
        hand.add(*resource, 1);
    }
    hand.iter()
        .filter(|(_, n)| *n > 0)
        .map(|(r, n)| (player, r, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::player::{DevelopmentCard, OwnedCard};
    use crate::settings::{FixedClock, GameSettings};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn ctx() -> EngineContext {
        EngineContext::new(
            Uuid::nil(),
            GameSettings {
                randomize_board: false,
                ..GameSettings::default()
            },
        )
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()))
    }

    fn in_actions(players: &[&str]) -> GameState {
        let mut state = GameState::new(&ctx(), players, 7).unwrap();
        state.phase = GamePhase::Actions;
        state.turn = 2;
        state
    }

    fn give_card(state: &mut GameState, player: PlayerId, card: DevelopmentCard) {
        state.player_mut(player).dev_cards.push_back(OwnedCard {
            card,
            purchased_turn: 0,
            played_turn: None,
        });
    }

    #[test]
    fn test_rejection_returns_input() {
        let state = in_actions(&["A", "B"]);
        let action = GameAction::BuyCard { player_id: 0 };
        let result = process_action(&ctx(), &state, &action);
        assert!(!result.success);
        assert_eq!(result.new_state, state);
        assert!(result.events.is_empty());
        assert_eq!(
            result.error.unwrap()[0].code,
            ErrorCode::InsufficientResources
        );
    }

    #[test]
    fn test_input_state_untouched_on_success() {
        let mut state = in_actions(&["A", "B"]);
        state.player_mut(0).resources = ResourceHand::with_amounts(4, 0, 0, 0, 0);
        let before = state.clone();
        let action = GameAction::BankTrade {
            player_id: 0,
            offering: ResourceHand::single(Resource::Wood, 4),
            requesting: ResourceHand::single(Resource::Ore, 1),
        };
        let result = process_action(&ctx(), &state, &action);
        assert!(result.success);
        assert_eq!(state, before);
        assert_eq!(
            result.new_state.player(0).unwrap().resources,
            ResourceHand::single(Resource::Ore, 1)
        );
    }

    #[test]
    fn test_roll_seven_without_big_hands_goes_to_robber() {
        let mut state = in_actions(&["A", "B"]);
        state.phase = GamePhase::Roll;
        let action = GameAction::Roll { player_id: 0 };
        let result = process_action(&ctx().with_dice([3, 4]), &state, &action);
        assert!(result.success);
        assert_eq!(
            result.new_state.phase,
            GamePhase::MoveRobber {
                resume: Resume::Actions
            }
        );
        assert_eq!(result.new_state.dice, Some([3, 4]));
    }

    #[test]
    fn test_engine_roll_is_deterministic() {
        let mut state = in_actions(&["A", "B"]);
        state.phase = GamePhase::Roll;
        let action = GameAction::Roll { player_id: 0 };
        let a = process_action(&ctx(), &state, &action);
        let b = process_action(&ctx(), &state, &action);
        assert_eq!(a.new_state, b.new_state);
        assert_eq!(a.new_state.rng_draws, state.rng_draws + 1);
    }

    #[test]
    fn test_knight_before_roll_resumes_roll() {
        let mut state = in_actions(&["A", "B"]);
        state.phase = GamePhase::Roll;
        give_card(&mut state, 0, DevelopmentCard::Knight);

        let play = GameAction::PlayCard {
            player_id: 0,
            play: CardPlay::Knight,
        };
        let result = process_action(&ctx(), &state, &play);
        assert!(result.success, "{:?}", result.error);
        assert_eq!(
            result.new_state.phase,
            GamePhase::MoveRobber {
                resume: Resume::Roll
            }
        );

        let target = result
            .new_state
            .board
            .hexes()
            .find(|h| !h.has_robber)
            .unwrap()
            .id;
        let moved = process_action(
            &ctx(),
            &result.new_state,
            &GameAction::MoveRobber {
                player_id: 0,
                hex: target,
            },
        );
        assert!(moved.success);
        assert_eq!(moved.new_state.phase, GamePhase::Roll);
        assert_eq!(moved.new_state.player(0).unwrap().knights_played, 1);
    }

    #[test]
    fn test_monopoly_collects_from_everyone() {
        let mut state = in_actions(&["A", "B", "C"]);
        give_card(&mut state, 0, DevelopmentCard::Monopoly);
        state.player_mut(1).resources = ResourceHand::with_amounts(0, 0, 0, 3, 1);
        state.player_mut(2).resources = ResourceHand::with_amounts(0, 0, 0, 2, 0);

        let result = process_action(
            &ctx(),
            &state,
            &GameAction::PlayCard {
                player_id: 0,
                play: CardPlay::Monopoly {
                    resource: Resource::Wheat,
                },
            },
        );
        assert!(result.success);
        let next = &result.new_state;
        assert_eq!(next.player(0).unwrap().resources.wheat, 5);
        assert_eq!(next.player(1).unwrap().resources.wheat, 0);
        assert_eq!(next.player(1).unwrap().resources.ore, 1);
        assert_eq!(next.player(2).unwrap().resources.wheat, 0);
        assert!(result.events.iter().any(|e| e.kind
            == EventKind::MonopolyCollected {
                resource: Resource::Wheat,
                total: 5
            }));
    }

    #[test]
    fn test_second_card_same_turn_rejected() {
        let mut state = in_actions(&["A", "B"]);
        give_card(&mut state, 0, DevelopmentCard::YearOfPlenty);
        give_card(&mut state, 0, DevelopmentCard::Monopoly);

        let first = process_action(
            &ctx(),
            &state,
            &GameAction::PlayCard {
                player_id: 0,
                play: CardPlay::YearOfPlenty {
                    resources: vec![Resource::Ore, Resource::Ore],
                },
            },
        );
        assert!(first.success);
        assert_eq!(first.new_state.player(0).unwrap().resources.ore, 2);

        let second = process_action(
            &ctx(),
            &first.new_state,
            &GameAction::PlayCard {
                player_id: 0,
                play: CardPlay::Monopoly {
                    resource: Resource::Ore,
                },
            },
        );
        assert!(!second.success);
        assert_eq!(
            second.error.unwrap()[0].code,
            ErrorCode::CardAlreadyPlayedThisTurn
        );
    }

    #[test]
    fn test_end_turn_passes_and_cancels_trades() {
        let mut state = in_actions(&["A", "B", "C"]);
        state.player_mut(0).resources = ResourceHand::single(Resource::Wood, 1);
        let offered = process_action(
            &ctx(),
            &state,
            &GameAction::CreateTradeOffer {
                player_id: 0,
                target: None,
                offering: ResourceHand::single(Resource::Wood, 1),
                requesting: ResourceHand::single(Resource::Ore, 1),
            },
        );
        assert!(offered.success);
        assert_eq!(offered.new_state.trades.len(), 1);

        let ended = process_action(&ctx(), &offered.new_state, &GameAction::EndTurn { player_id: 0 });
        assert!(ended.success);
        let next = &ended.new_state;
        assert_eq!(next.current_player, 1);
        assert_eq!(next.phase, GamePhase::Roll);
        assert_eq!(next.turn, 3);
        assert!(next.trades.is_empty());
        assert!(next.dice.is_none());
    }

    #[test]
    fn test_event_ids_increase() {
        let mut state = in_actions(&["A", "B"]);
        state.phase = GamePhase::Roll;
        let rolled = process_action(
            &ctx().with_dice([2, 2]),
            &state,
            &GameAction::Roll { player_id: 0 },
        );
        let ended = process_action(&ctx(), &rolled.new_state, &GameAction::EndTurn { player_id: 0 });
        let ids: Vec<u64> = rolled
            .events
            .iter()
            .chain(&ended.events)
            .map(|e| e.id)
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| *id >= state.next_event_id));
    }

    #[test]
    fn test_tally() {
        let entries = tally(3, &[Resource::Ore, Resource::Wood, Resource::Ore]);
        assert_eq!(entries, vec![(3, Resource::Wood, 1), (3, Resource::Ore, 2)]);
    }
}
