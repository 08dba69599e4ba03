use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::ShoppingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartVerdict {
    Added,
    Blocked,
}

/// Consulted before every cart mutation. Only a completed checkout unlocks.
pub fn add_item_allowed(state: &ShoppingState) -> bool {
    !state.locked
}
