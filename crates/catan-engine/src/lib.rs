//! Catan Engine - a deterministic rules engine for a Settlers-style board game
//!
//! This crate provides the core game logic, including:
//! - Hex coordinate math and board generation with ports and number tokens
//! - Board adjacency queries, placement rules and longest road
//! - Player state, resources and development cards
//! - An action validator and a pure action processor driving the game phases
//! - An append-only event log and deterministic replay
//!
//! # Architecture
//!
//! The engine is a pure function from `(state, action)` to a new state plus
//! events: [`process_action`] never mutates its input and never touches the
//! outside world. Randomness comes from a seeded stream stored in the state
//! and time from the [`Clock`] on the [`EngineContext`], so the same inputs
//! always give the same outputs. It can be compiled to:
//! - Native Rust for server-side game hosting
//! - WebAssembly (with the `wasm` feature) for running in the browser
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates used while laying out the board
//! - [`board`]: Board entities and the `Board` container
//! - [`generator`]: Standard, beginner and custom board generation
//! - [`graph`]: Adjacency, placement rules, production and longest road
//! - [`player`]: Player state, resources and development cards
//! - [`actions`]: The actions players submit
//! - [`validator`]: Structured rejection of illegal actions
//! - [`processor`]: The state machine that applies accepted actions
//! - [`events`]: Events produced by accepted actions and the event log
//! - [`session`]: A running game with its history, and replay
//! - [`legal`] / [`agent`]: Move enumeration and decision-making seats
//! - [`wire`]: JSON encoding of the full state

pub mod actions;
pub mod agent;
pub mod board;
pub mod error;
pub mod events;
pub mod generator;
pub mod graph;
pub mod hex;
pub mod legal;
pub mod player;
pub mod processor;
pub mod rng;
pub mod session;
pub mod settings;
pub mod state;
pub mod trade;
pub mod validator;
#[cfg(feature = "wasm")]
pub mod wasm;
pub mod wire;

// Re-export commonly used types
pub use actions::{BuildTarget, CardPlay, GameAction};
pub use agent::{PlayerAgent, RandomAgent};
pub use board::{
    Board, Building, BuildingType, Edge, EdgeId, Hex, HexId, PlayerId, Port, PortKind, Resource,
    Terrain, Vertex, VertexId,
};
pub use error::{BoardError, ConfigError, EngineError, ErrorCode, ValidationError};
pub use events::{EventId, EventKind, EventLog, GameEvent};
pub use generator::generate;
pub use hex::HexCoord;
pub use legal::valid_actions;
pub use player::{DevelopmentCard, Player, ResourceHand, Score};
pub use processor::{process_action, ProcessResult};
pub use session::{replay, GameSession};
pub use settings::{BoardLayout, Clock, CustomLayout, EngineContext, FixedClock, GameSettings, SystemClock};
pub use state::{GamePhase, GameState, PhaseKind, Resume, SetupPlacing};
pub use trade::{Trade, TradeId, TradeStatus};
pub use validator::validate;
