//! Action validation.
//!
//! [`validate`] runs before every transition and never changes anything. The
//! universal checks (known player, game not over, turn, phase) stop at the
//! first failure; the action-specific checks report every problem they find.

use crate::actions::{CardPlay, GameAction};
use crate::board::{BuildingType, EdgeId, PlayerId, PortKind, Resource, VertexId};
use crate::error::{ErrorCode, ValidationError};
use crate::player::{costs, Player, ResourceHand};
use crate::settings::EngineContext;
use crate::state::{GamePhase, GameState, SetupPlacing};
use crate::trade::{TradeId, TradeStatus};

type Errors = Vec<ValidationError>;

/// Check `action` against `state`.
///
/// `Build` actions are checked as the placement they resolve to.
pub fn validate(ctx: &EngineContext, state: &GameState, action: &GameAction) -> Result<(), Errors> {
    let action = action.resolve();
    let player_id = action.player_id();

    let Some(player) = state.player(player_id) else {
        return Err(vec![ValidationError::new(
            "playerId",
            ErrorCode::UnknownPlayer,
            format!("player {player_id} is not in this game"),
        )]);
    };

    if state.is_over() {
        return Err(vec![ValidationError::new(
            "phase",
            ErrorCode::GameOver,
            "the game is over",
        )]);
    }

    let answers_out_of_turn = matches!(
        action,
        GameAction::Discard { .. } | GameAction::AcceptTrade { .. } | GameAction::RejectTrade { .. }
    );
    if !answers_out_of_turn && player_id != state.current_player {
        return Err(vec![ValidationError::new(
            "playerId",
            ErrorCode::NotYourTurn,
            format!("it is player {}'s turn", state.current_player),
        )]);
    }

    if let Err(e) = check_phase(state, &action) {
        return Err(vec![e]);
    }

    let errors = match &action {
        GameAction::Roll { .. } => check_roll(ctx),
        GameAction::PlaceBuilding {
            vertex, building, ..
        } => check_building(state, player, *vertex, *building),
        GameAction::PlaceRoad { edge, .. } => check_road(state, player, *edge),
        GameAction::Build { .. } => unreachable!("build actions are resolved before validation"),
        GameAction::BankTrade {
            offering,
            requesting,
            ..
        } => {
            let ratio = ctx.settings.bank_trade_ratio;
            check_exchange(player, offering, requesting, |_| Some(ratio))
        }
        GameAction::PortTrade {
            offering,
            requesting,
            ..
        } => {
            let ports = state.board.player_ports(player.id);
            check_exchange(player, offering, requesting, |resource| port_rate(&ports, resource))
        }
        GameAction::CreateTradeOffer {
            target,
            offering,
            requesting,
            ..
        } => check_offer(state, player, *target, offering, requesting),
        GameAction::AcceptTrade { trade_id, .. } => check_accept(state, player, *trade_id),
        GameAction::RejectTrade { trade_id, .. } => check_reject(state, player, *trade_id),
        GameAction::CancelTrade { trade_id, .. } => check_cancel(state, player, *trade_id),
        GameAction::BuyCard { .. } => check_buy_card(state, player),
        GameAction::PlayCard { play, .. } => check_play_card(state, player, play),
        GameAction::MoveRobber { hex, .. } => {
            let mut errors = Errors::new();
            if state.board.hex(*hex).is_none() {
                errors.push(ValidationError::new(
                    "hex",
                    ErrorCode::InvalidRobberTarget,
                    format!("{hex} is not on the board"),
                ));
            } else if *hex == state.board.robber() {
                errors.push(ValidationError::new(
                    "hex",
                    ErrorCode::InvalidRobberTarget,
                    "the robber must move to a different hex",
                ));
            }
            errors
        }
        GameAction::StealResource { victim, .. } => {
            let mut errors = Errors::new();
            if let GamePhase::Steal { victims, .. } = &state.phase {
                if !victims.contains(victim) {
                    errors.push(ValidationError::new(
                        "victim",
                        ErrorCode::InvalidVictim,
                        format!("player {victim} cannot be robbed here"),
                    ));
                }
            }
            errors
        }
        GameAction::Discard { resources, .. } => check_discard(state, player, resources),
        GameAction::EndTurn { .. } => Errors::new(),
    };

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ==================== Phase ====================

fn check_phase(state: &GameState, action: &GameAction) -> Result<(), ValidationError> {
    let phase = &state.phase;
    let setup_placing = match phase {
        GamePhase::Setup1 { placing } | GamePhase::Setup2 { placing } => Some(*placing),
        _ => None,
    };

    let allowed = match action {
        GameAction::Roll { .. } => *phase == GamePhase::Roll,
        GameAction::PlaceBuilding { .. } => {
            setup_placing == Some(SetupPlacing::Settlement) || *phase == GamePhase::Actions
        }
        GameAction::PlaceRoad { .. } => {
            setup_placing == Some(SetupPlacing::Road) || *phase == GamePhase::Actions
        }
        GameAction::PlayCard {
            play: CardPlay::Knight,
            ..
        } => matches!(phase, GamePhase::Roll | GamePhase::Actions),
        GameAction::MoveRobber { .. } => matches!(phase, GamePhase::MoveRobber { .. }),
        GameAction::StealResource { .. } => matches!(phase, GamePhase::Steal { .. }),
        GameAction::Discard { .. } => matches!(phase, GamePhase::Discard { .. }),
        GameAction::Build { .. }
        | GameAction::BankTrade { .. }
        | GameAction::PortTrade { .. }
        | GameAction::CreateTradeOffer { .. }
        | GameAction::AcceptTrade { .. }
        | GameAction::RejectTrade { .. }
        | GameAction::CancelTrade { .. }
        | GameAction::BuyCard { .. }
        | GameAction::PlayCard { .. }
        | GameAction::EndTurn { .. } => *phase == GamePhase::Actions,
    };

    if allowed {
        Ok(())
    } else {
        Err(ValidationError::new(
            "phase",
            ErrorCode::InvalidPhase,
            format!("{} is not allowed during {}", action.name(), phase.kind()),
        ))
    }
}

// ==================== Dice ====================

fn check_roll(ctx: &EngineContext) -> Errors {
    match ctx.forced_dice() {
        Some(dice) if dice.iter().any(|d| !(1..=6).contains(d)) => vec![ValidationError::new(
            "dice",
            ErrorCode::InvalidDice,
            format!("dice {dice:?} must each be between 1 and 6"),
        )],
        _ => Errors::new(),
    }
}

// ==================== Building ====================

fn check_building(
    state: &GameState,
    player: &Player,
    vertex: VertexId,
    building: BuildingType,
) -> Errors {
    let mut errors = Errors::new();
    let board = &state.board;
    let in_setup = state.phase.is_setup();

    let Some(spot) = board.vertex(vertex) else {
        return vec![ValidationError::new(
            "vertex",
            ErrorCode::InvalidLocation,
            format!("{vertex} is not on the board"),
        )];
    };

    match building {
        BuildingType::Settlement => {
            if spot.building.is_some() {
                errors.push(ValidationError::new(
                    "vertex",
                    ErrorCode::Occupied,
                    format!("{vertex} already has a building"),
                ));
            } else if !board.satisfies_distance_rule(vertex) {
                errors.push(ValidationError::new(
                    "vertex",
                    ErrorCode::DistanceRule,
                    format!("{vertex} is next to another building"),
                ));
            }
            if !in_setup && !board.vertex_connected(vertex, player.id) {
                errors.push(ValidationError::new(
                    "vertex",
                    ErrorCode::NotConnected,
                    format!("{vertex} is not on one of your roads"),
                ));
            }
            if player.buildings.settlements == 0 {
                errors.push(no_pieces("settlements"));
            }
            if !in_setup {
                check_cost(&mut errors, player, &costs::settlement(), "a settlement");
            }
        }
        BuildingType::City => {
            if in_setup {
                errors.push(ValidationError::new(
                    "building",
                    ErrorCode::InvalidPhase,
                    "only settlements are placed during setup",
                ));
                return errors;
            }
            if spot.building.map(|b| (b.kind, b.owner))
                != Some((BuildingType::Settlement, player.id))
            {
                errors.push(ValidationError::new(
                    "vertex",
                    ErrorCode::InvalidLocation,
                    format!("{vertex} is not one of your settlements"),
                ));
            }
            if player.buildings.cities == 0 {
                errors.push(no_pieces("cities"));
            }
            check_cost(&mut errors, player, &costs::city(), "a city");
        }
    }
    errors
}

fn check_road(state: &GameState, player: &Player, edge: EdgeId) -> Errors {
    let mut errors = Errors::new();
    let board = &state.board;

    let Some(spot) = board.edge(edge) else {
        return vec![ValidationError::new(
            "edge",
            ErrorCode::InvalidLocation,
            format!("{edge} is not on the board"),
        )];
    };
    if spot.road.is_some() {
        errors.push(ValidationError::new(
            "edge",
            ErrorCode::Occupied,
            format!("{edge} already has a road"),
        ));
    }

    if state.phase.is_setup() {
        let touches_settlement = state
            .setup_settlement
            .is_some_and(|v| spot.vertices.contains(&v));
        if !touches_settlement {
            errors.push(ValidationError::new(
                "edge",
                ErrorCode::NotConnected,
                "a setup road must touch the settlement just placed",
            ));
        }
    } else if !board.edge_connected(edge, player.id) {
        errors.push(ValidationError::new(
            "edge",
            ErrorCode::NotConnected,
            format!("{edge} does not connect to your roads or buildings"),
        ));
    }

    if player.buildings.roads == 0 {
        errors.push(no_pieces("roads"));
    }
    if !state.phase.is_setup() && state.free_roads == 0 {
        check_cost(&mut errors, player, &costs::road(), "a road");
    }
    errors
}

fn no_pieces(kind: &str) -> ValidationError {
    ValidationError::new(
        "buildings",
        ErrorCode::NoPiecesRemaining,
        format!("no {kind} left to place"),
    )
}

fn check_cost(errors: &mut Errors, player: &Player, cost: &ResourceHand, what: &str) {
    if !player.resources.can_afford(cost) {
        errors.push(ValidationError::new(
            "resources",
            ErrorCode::InsufficientResources,
            format!("not enough resources for {what}"),
        ));
    }
}

// ==================== Trading ====================

/// Best port rate for giving `resource`, if the player has a matching port
fn port_rate(ports: &[PortKind], resource: Resource) -> Option<u32> {
    ports
        .iter()
        .filter(|k| matches!(k, PortKind::Generic) || **k == PortKind::Specific(resource))
        .map(|k| k.rate())
        .min()
}

/// Maritime exchange: every offered type is a whole multiple of its rate and
/// the multiples add up to the number of cards requested.
fn check_exchange(
    player: &Player,
    offering: &ResourceHand,
    requesting: &ResourceHand,
    rate_for: impl Fn(Resource) -> Option<u32>,
) -> Errors {
    let mut errors = Errors::new();
    if offering.is_empty() || requesting.is_empty() {
        errors.push(ValidationError::new(
            "offering",
            ErrorCode::InvalidTrade,
            "a trade needs something offered and something requested",
        ));
        return errors;
    }
    if Resource::ALL
        .iter()
        .any(|r| offering.get(*r) > 0 && requesting.get(*r) > 0)
    {
        errors.push(ValidationError::new(
            "requesting",
            ErrorCode::InvalidTrade,
            "cannot request a resource you are offering",
        ));
    }

    let mut earned = 0;
    for (resource, amount) in offering.iter().filter(|(_, n)| *n > 0) {
        match rate_for(resource) {
            None => errors.push(ValidationError::new(
                "offering",
                ErrorCode::NoPortAccess,
                format!("no port for trading {resource:?}"),
            )),
            Some(rate) if amount % rate != 0 => errors.push(ValidationError::new(
                "offering",
                ErrorCode::InvalidTradeRatio,
                format!("{resource:?} must be offered in multiples of {rate}"),
            )),
            Some(rate) => earned += amount / rate,
        }
    }
    if errors.is_empty() && earned != requesting.total() {
        errors.push(ValidationError::new(
            "requesting",
            ErrorCode::InvalidTradeRatio,
            format!(
                "offer pays for {earned} cards but {} are requested",
                requesting.total()
            ),
        ));
    }

    check_cost(&mut errors, player, offering, "this trade");
    errors
}

fn check_offer(
    state: &GameState,
    player: &Player,
    target: Option<PlayerId>,
    offering: &ResourceHand,
    requesting: &ResourceHand,
) -> Errors {
    let mut errors = Errors::new();
    if offering.is_empty() || requesting.is_empty() {
        errors.push(ValidationError::new(
            "offering",
            ErrorCode::InvalidTrade,
            "a trade needs something offered and something requested",
        ));
    }
    if let Some(target) = target {
        if target == player.id || state.player(target).is_none() {
            errors.push(ValidationError::new(
                "target",
                ErrorCode::InvalidTrade,
                format!("cannot offer a trade to player {target}"),
            ));
        }
    }
    check_cost(&mut errors, player, offering, "this offer");
    errors
}

fn open_trade<'a>(
    state: &'a GameState,
    trade_id: TradeId,
) -> Result<&'a crate::trade::Trade, ValidationError> {
    match state.trade(trade_id) {
        Some(trade) if trade.is_open() => Ok(trade),
        Some(trade) if trade.status == TradeStatus::Expired => Err(ValidationError::new(
            "tradeId",
            ErrorCode::TradeExpired,
            format!("trade {trade_id} has expired"),
        )),
        _ => Err(ValidationError::new(
            "tradeId",
            ErrorCode::TradeNotFound,
            format!("no open trade {trade_id}"),
        )),
    }
}

fn check_accept(state: &GameState, player: &Player, trade_id: TradeId) -> Errors {
    let trade = match open_trade(state, trade_id) {
        Ok(trade) => trade,
        Err(e) => return vec![e],
    };
    let mut errors = Errors::new();
    if !trade.is_addressed_to(player.id) {
        errors.push(ValidationError::new(
            "tradeId",
            ErrorCode::InvalidTrade,
            format!("trade {trade_id} is not offered to you"),
        ));
    }
    check_cost(&mut errors, player, &trade.requesting, "this trade");
    let initiator_can_pay = state
        .player(trade.initiator)
        .is_some_and(|p| p.resources.can_afford(&trade.offering));
    if !initiator_can_pay {
        errors.push(ValidationError::new(
            "tradeId",
            ErrorCode::InsufficientResources,
            format!("player {} can no longer pay for this trade", trade.initiator),
        ));
    }
    errors
}

fn check_reject(state: &GameState, player: &Player, trade_id: TradeId) -> Errors {
    let trade = match open_trade(state, trade_id) {
        Ok(trade) => trade,
        Err(e) => return vec![e],
    };
    if !trade.is_addressed_to(player.id) || trade.rejected_by.contains(&player.id) {
        return vec![ValidationError::new(
            "tradeId",
            ErrorCode::InvalidTrade,
            format!("you cannot reject trade {trade_id}"),
        )];
    }
    Errors::new()
}

fn check_cancel(state: &GameState, player: &Player, trade_id: TradeId) -> Errors {
    let trade = match open_trade(state, trade_id) {
        Ok(trade) => trade,
        Err(e) => return vec![e],
    };
    if trade.initiator != player.id {
        return vec![ValidationError::new(
            "tradeId",
            ErrorCode::InvalidTrade,
            "only the player who made an offer can cancel it",
        )];
    }
    Errors::new()
}

// ==================== Development Cards ====================

fn check_buy_card(state: &GameState, player: &Player) -> Errors {
    let mut errors = Errors::new();
    if state.dev_deck.is_empty() {
        errors.push(ValidationError::new(
            "action",
            ErrorCode::EmptyDeck,
            "no development cards left",
        ));
    }
    check_cost(&mut errors, player, &costs::development_card(), "a development card");
    errors
}

fn check_play_card(state: &GameState, player: &Player, play: &CardPlay) -> Errors {
    let mut errors = Errors::new();
    let card = play.card();

    if !player.owns_unplayed(card) {
        errors.push(ValidationError::new(
            "play",
            ErrorCode::CardNotOwned,
            format!("you have no unplayed {card:?} card"),
        ));
        return errors;
    }
    if player.playable_card_index(card, state.turn).is_none() {
        errors.push(ValidationError::new(
            "play",
            ErrorCode::CardNotYetPlayable,
            format!("a {card:?} cannot be played on the turn it was bought"),
        ));
    }
    if !card.is_victory_point() && state.dev_card_played_this_turn {
        errors.push(ValidationError::new(
            "play",
            ErrorCode::CardAlreadyPlayedThisTurn,
            "only one development card may be played per turn",
        ));
    }

    match play {
        CardPlay::YearOfPlenty { resources } if resources.len() != 2 => {
            errors.push(ValidationError::new(
                "play.resources",
                ErrorCode::InvalidCardPayload,
                format!("year of plenty takes exactly 2 resources, got {}", resources.len()),
            ));
        }
        CardPlay::RoadBuilding if player.buildings.roads == 0 => {
            errors.push(no_pieces("roads"));
        }
        _ => {}
    }
    errors
}

// ==================== Discard ====================

fn check_discard(state: &GameState, player: &Player, resources: &ResourceHand) -> Errors {
    let owed = match &state.phase {
        GamePhase::Discard { remaining } => remaining.get(&player.id).copied(),
        _ => None,
    };
    let Some(owed) = owed else {
        return vec![ValidationError::new(
            "playerId",
            ErrorCode::InvalidDiscard,
            format!("player {} does not need to discard", player.id),
        )];
    };

    let mut errors = Errors::new();
    if resources.total() != owed {
        errors.push(ValidationError::new(
            "resources",
            ErrorCode::InvalidDiscard,
            format!("must discard exactly {owed} cards, got {}", resources.total()),
        ));
    }
    if !player.resources.can_afford(resources) {
        errors.push(ValidationError::new(
            "resources",
            ErrorCode::InsufficientResources,
            "cannot discard cards you do not have",
        ));
    }
    errors
}
