//! WebAssembly bindings for the engine.
//!
//! Everything crosses the boundary as JSON strings; the shapes are the same
//! serde representations the rest of the crate uses.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::agent::{suggested_discard, PlayerAgent, RandomAgent};
use crate::legal::valid_actions;
use crate::session::GameSession;
use crate::settings::{EngineContext, GameSettings};
use crate::state::GameState;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// One game hosted in the browser
#[wasm_bindgen]
pub struct WasmEngine {
    session: GameSession,
}

#[wasm_bindgen]
impl WasmEngine {
    /// Create a new game.
    ///
    /// `settings_json` may be empty for the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new(
        player_names_json: &str,
        settings_json: &str,
        seed: u64,
    ) -> Result<WasmEngine, JsValue> {
        let names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| js_error("Invalid player names", e))?;
        let settings = if settings_json.trim().is_empty() {
            GameSettings::default()
        } else {
            GameSettings::from_json(settings_json).map_err(|e| js_error("Invalid settings", e))?
        };

        let ctx = EngineContext::new(uuid::Uuid::new_v4(), settings);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let state =
            GameState::new(&ctx, &names, seed).map_err(|e| js_error("Cannot create game", e))?;

        Ok(WasmEngine {
            session: GameSession::new(ctx, state),
        })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(self.session.state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Player the game is waiting on
    #[wasm_bindgen(js_name = getActingPlayer)]
    pub fn get_acting_player(&self) -> u8 {
        self.session.state().acting_player()
    }

    /// Submit an action as JSON; returns the full `ProcessResult` as JSON
    #[wasm_bindgen(js_name = processAction)]
    pub fn process_action(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction =
            serde_json::from_str(action_json).map_err(|e| js_error("Invalid action JSON", e))?;
        let result = self.session.submit(action);
        serde_json::to_string(&result).map_err(|e| js_error("Cannot encode result", e))
    }

    /// Valid actions for a player as a JSON array
    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self, player: u8) -> String {
        let actions = valid_actions(self.session.context(), self.session.state(), player);
        serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
    }

    /// Events after `event_id` as a JSON array
    #[wasm_bindgen(js_name = getEventsSince)]
    pub fn get_events_since(&self, event_id: u64) -> String {
        serde_json::to_string(&self.session.log().since(event_id))
            .unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.session.state().is_over()
    }

    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.session.state().winner
    }

    /// A random legal action for a player, as JSON
    #[wasm_bindgen(js_name = getRandomAction)]
    pub fn get_random_action(&self, player: u8, seed: u64) -> String {
        let mut agent = RandomAgent::new(self.session.context().clone(), seed);
        let action = agent.get_action(self.session.state(), player);
        serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string())
    }

    /// Suggested discard while a 7 is being resolved
    #[wasm_bindgen(js_name = getSuggestedDiscard)]
    pub fn get_suggested_discard(&self, player: u8) -> String {
        let discard = suggested_discard(self.session.context(), self.session.state(), player);
        serde_json::to_string(&discard).unwrap_or_else(|_| "{}".to_string())
    }
}
