//! A running game: the latest snapshot, its event log and the accepted actions.

use tracing::debug;

use crate::actions::GameAction;
use crate::events::EventLog;
use crate::processor::{process_action, ProcessResult};
use crate::settings::EngineContext;
use crate::state::GameState;

/// Owns one game's state and history.
///
/// Only accepted actions are recorded, so `history` replayed on top of
/// `initial` always rebuilds `state`.
pub struct GameSession {
    ctx: EngineContext,
    initial: GameState,
    state: GameState,
    log: EventLog,
    history: Vec<GameAction>,
}

impl GameSession {
    pub fn new(ctx: EngineContext, initial: GameState) -> Self {
        Self {
            ctx,
            state: initial.clone(),
            initial,
            log: EventLog::new(),
            history: Vec::new(),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn initial_state(&self) -> &GameState {
        &self.initial
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn history(&self) -> &[GameAction] {
        &self.history
    }

    /// Run an action against the current state, keeping the result if accepted
    pub fn submit(&mut self, action: GameAction) -> ProcessResult {
        let result = process_action(&self.ctx, &self.state, &action);
        if result.success {
            self.state = result.new_state.clone();
            self.log.append(result.events.iter().cloned());
            self.history.push(action);
        }
        result
    }
}

/// Re-apply a recorded history on top of `initial`.
///
/// Actions that are rejected are skipped, matching what a session would have
/// recorded.
pub fn replay<'a>(
    ctx: &EngineContext,
    initial: &GameState,
    actions: impl IntoIterator<Item = &'a GameAction>,
) -> GameState {
    let mut state = initial.clone();
    let mut applied = 0usize;
    for action in actions {
        let result = process_action(ctx, &state, action);
        if result.success {
            state = result.new_state;
            applied += 1;
        }
    }
    debug!("Replayed {} actions for game {}", applied, state.id);
    state
}
