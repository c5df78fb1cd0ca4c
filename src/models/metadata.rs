//! Reference metadata for heroes and items.

use serde::{Deserialize, Serialize};

/// Hero constant as served by the upstream `/constants/heroes` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroMetadata {
    pub id: u32,

    #[serde(rename = "localized_name")]
    pub display_name: String,
}

/// Item constant as served by the upstream `/constants/items` endpoint.
///
/// Some upstream entries (recipes, removed items) carry no display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub id: u32,

    #[serde(rename = "dname", default)]
    pub display_name: Option<String>,
}
