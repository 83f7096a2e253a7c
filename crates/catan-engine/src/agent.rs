//! Decision-making collaborators.
//!
//! The engine never decides anything on a player's behalf. Anything that
//! picks moves (a UI, a remote client, an AI) sits behind [`PlayerAgent`] and
//! hands the chosen action to [`crate::process_action`] like any other input.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::actions::GameAction;
use crate::board::PlayerId;
use crate::legal::{largest_first, valid_actions};
use crate::player::ResourceHand;
use crate::settings::EngineContext;
use crate::state::{discard_amount, GamePhase, GameState};

/// Something that chooses moves for a seat
pub trait PlayerAgent {
    /// Pick the next action for `player` in `state`
    fn get_action(&mut self, state: &GameState, player: PlayerId) -> GameAction;
}

/// Picks uniformly among the legal moves; useful for simulations and fuzzing
pub struct RandomAgent {
    ctx: EngineContext,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(ctx: EngineContext, seed: u64) -> Self {
        Self {
            ctx,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerAgent for RandomAgent {
    fn get_action(&mut self, state: &GameState, player: PlayerId) -> GameAction {
        let actions = valid_actions(&self.ctx, state, player);

        // Ending the turn is always among the options in the action phase;
        // prefer anything else most of the time so games make progress.
        let (ends, others): (Vec<_>, Vec<_>) = actions
            .into_iter()
            .partition(|a| matches!(a, GameAction::EndTurn { .. }));
        if !others.is_empty() && (ends.is_empty() || self.rng.gen_bool(0.8)) {
            if let Some(action) = others.choose(&mut self.rng) {
                return action.clone();
            }
        }

        ends.into_iter()
            .next()
            .unwrap_or(GameAction::EndTurn { player_id: player })
    }
}

/// Cards a player should give up while discards are pending.
///
/// Returns an empty hand if the player owes nothing.
pub fn suggested_discard(ctx: &EngineContext, state: &GameState, player: PlayerId) -> ResourceHand {
    let Some(p) = state.player(player) else {
        return ResourceHand::new();
    };
    let owed = match &state.phase {
        GamePhase::Discard { remaining } => remaining.get(&player).copied().unwrap_or(0),
        _ => discard_amount(p.resources.total(), ctx.settings.hand_limit_before_discard),
    };
    largest_first(&p.resources, owed)
}
