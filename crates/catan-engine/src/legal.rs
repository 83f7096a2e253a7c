//! Legal move enumeration for agents, look-ahead and tests.
//!
//! Candidates are generated per phase and then passed through the validator,
//! so everything returned is accepted by [`crate::process_action`]. Some
//! action spaces are open-ended; for those a representative subset is listed:
//! - discards: one selection, taken from the largest piles first
//! - maritime trades: one rate's worth of a single resource for one card
//! - player trade offers: none (agents build their own)

use crate::actions::{CardPlay, GameAction};
use crate::board::{BuildingType, PlayerId, Resource};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::settings::EngineContext;
use crate::state::{GamePhase, GameState, SetupPlacing};
use crate::validator::validate;

/// Get all currently valid actions for a player
pub fn valid_actions(ctx: &EngineContext, state: &GameState, player: PlayerId) -> Vec<GameAction> {
    candidates(ctx, state, player)
        .into_iter()
        .filter(|action| validate(ctx, state, action).is_ok())
        .collect()
}

fn candidates(ctx: &EngineContext, state: &GameState, player: PlayerId) -> Vec<GameAction> {
    let mut actions = Vec::new();
    let Some(p) = state.player(player) else {
        return actions;
    };
    let board = &state.board;

    match &state.phase {
        GamePhase::Ended => {}

        GamePhase::Setup1 { placing } | GamePhase::Setup2 { placing } => match placing {
            SetupPlacing::Settlement => {
                for vertex in board.valid_settlement_spots(player, true) {
                    actions.push(GameAction::PlaceBuilding {
                        player_id: player,
                        vertex,
                        building: BuildingType::Settlement,
                    });
                }
            }
            SetupPlacing::Road => {
                if let Some(settlement) = state.setup_settlement {
                    for edge in board.setup_road_spots(settlement) {
                        actions.push(GameAction::PlaceRoad {
                            player_id: player,
                            edge,
                        });
                    }
                }
            }
        },

        GamePhase::Roll => {
            actions.push(GameAction::Roll { player_id: player });
            // Can play knight before rolling
            actions.push(GameAction::PlayCard {
                player_id: player,
                play: CardPlay::Knight,
            });
        }

        GamePhase::Discard { remaining } => {
            if let Some(owed) = remaining.get(&player) {
                actions.push(GameAction::Discard {
                    player_id: player,
                    resources: largest_first(&p.resources, *owed),
                });
            }
        }

        GamePhase::MoveRobber { .. } => {
            for hex in board.hexes().filter(|h| h.id != board.robber()) {
                actions.push(GameAction::MoveRobber {
                    player_id: player,
                    hex: hex.id,
                });
            }
        }

        GamePhase::Steal { victims, .. } => {
            for victim in victims {
                actions.push(GameAction::StealResource {
                    player_id: player,
                    victim: *victim,
                });
            }
        }

        GamePhase::Actions => {
            // Non-current players can only respond to trades
            for trade in state.trades.iter().filter(|t| t.is_open()) {
                if trade.initiator == player {
                    actions.push(GameAction::CancelTrade {
                        player_id: player,
                        trade_id: trade.id,
                    });
                } else if trade.is_addressed_to(player) && !trade.rejected_by.contains(&player) {
                    actions.push(GameAction::AcceptTrade {
                        player_id: player,
                        trade_id: trade.id,
                    });
                    actions.push(GameAction::RejectTrade {
                        player_id: player,
                        trade_id: trade.id,
                    });
                }
            }
            if player != state.current_player {
                return actions;
            }

            actions.push(GameAction::EndTurn { player_id: player });

            for edge in board.valid_road_spots(player) {
                actions.push(GameAction::PlaceRoad {
                    player_id: player,
                    edge,
                });
            }
            for vertex in board.valid_settlement_spots(player, false) {
                actions.push(GameAction::PlaceBuilding {
                    player_id: player,
                    vertex,
                    building: BuildingType::Settlement,
                });
            }
            for vertex in board.valid_city_spots(player) {
                actions.push(GameAction::PlaceBuilding {
                    player_id: player,
                    vertex,
                    building: BuildingType::City,
                });
            }
            actions.push(GameAction::BuyCard { player_id: player });

            // Development cards
            for card in [
                DevelopmentCard::Knight,
                DevelopmentCard::RoadBuilding,
                DevelopmentCard::VictoryPoint,
            ] {
                if p.owns_unplayed(card) {
                    let play = match card {
                        DevelopmentCard::Knight => CardPlay::Knight,
                        DevelopmentCard::RoadBuilding => CardPlay::RoadBuilding,
                        _ => CardPlay::VictoryPoint,
                    };
                    actions.push(GameAction::PlayCard {
                        player_id: player,
                        play,
                    });
                }
            }
            if p.owns_unplayed(DevelopmentCard::YearOfPlenty) {
                for (i, first) in Resource::ALL.iter().enumerate() {
                    for second in &Resource::ALL[i..] {
                        actions.push(GameAction::PlayCard {
                            player_id: player,
                            play: CardPlay::YearOfPlenty {
                                resources: vec![*first, *second],
                            },
                        });
                    }
                }
            }
            if p.owns_unplayed(DevelopmentCard::Monopoly) {
                for resource in Resource::ALL {
                    actions.push(GameAction::PlayCard {
                        player_id: player,
                        play: CardPlay::Monopoly { resource },
                    });
                }
            }

            // Maritime trading
            let bank_ratio = ctx.settings.bank_trade_ratio;
            for give in Resource::ALL {
                let port_rate = board.maritime_rate(player, give, u32::MAX);
                for receive in Resource::ALL.into_iter().filter(|r| *r != give) {
                    actions.push(GameAction::BankTrade {
                        player_id: player,
                        offering: ResourceHand::single(give, bank_ratio),
                        requesting: ResourceHand::single(receive, 1),
                    });
                    if port_rate != u32::MAX {
                        actions.push(GameAction::PortTrade {
                            player_id: player,
                            offering: ResourceHand::single(give, port_rate),
                            requesting: ResourceHand::single(receive, 1),
                        });
                    }
                }
            }
        }
    }

    actions
}

/// Discard `count` cards, always from whichever pile is currently largest
pub fn largest_first(hand: &ResourceHand, count: u32) -> ResourceHand {
    let mut discard = ResourceHand::new();
    let mut remaining = *hand;
    for _ in 0..count {
        let Some((resource, pile)) = remaining.iter().max_by_key(|(_, n)| *n) else {
            break;
        };
        if pile == 0 {
            break;
        }
        discard.add(resource, 1);
        remaining.set(resource, pile - 1);
    }
    discard
}
