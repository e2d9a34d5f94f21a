use serde::{Deserialize, Serialize};

use crate::model::SpeciesId;

/// A scripted one-off encounter (gift or overworld legendary).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticEncounter {
    pub species: SpeciesId,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InGameTrade {
    pub nickname: String,
    pub requested: SpeciesId,
    pub given: SpeciesId,
}

/// An item lying somewhere in the overworld.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldItem {
    pub location: String,
    pub item: u16,
    /// Story items never move.
    #[serde(default)]
    pub key_item: bool,
}
