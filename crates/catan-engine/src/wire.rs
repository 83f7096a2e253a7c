//! Wire format for game state.
//!
//! Map-typed fields are written as ordered lists of `[key, value]` pairs so
//! that keys which are not strings (hex ids, player ids) survive JSON intact.
//! Decoding rebuilds the maps exactly; a repeated key is an error rather than
//! a silent overwrite.

use crate::error::EngineError;
use crate::state::GameState;

/// `#[serde(with = "crate::wire::pairs")]` adapter for `im::OrdMap`
pub mod pairs {
    use im::OrdMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &OrdMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord + Clone,
        V: Serialize + Clone,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<OrdMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord + Clone + std::fmt::Debug,
        V: Deserialize<'de> + Clone,
        D: Deserializer<'de>,
    {
        let entries: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        let mut map = OrdMap::new();
        for (key, value) in entries {
            if map.contains_key(&key) {
                return Err(D::Error::custom(format!("duplicate map key {:?}", key)));
            }
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Serialize a game state to its JSON wire form
pub fn to_json(state: &GameState) -> Result<String, EngineError> {
    Ok(serde_json::to_string(state)?)
}

/// Rebuild a game state from its JSON wire form
pub fn from_json(json: &str) -> Result<GameState, EngineError> {
    Ok(serde_json::from_str(json)?)
}
