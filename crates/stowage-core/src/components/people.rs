//! Character components.

use serde::{Deserialize, Serialize};

/// Marks an entity as a character that can carry and wear items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Member of the player's company.
    pub player_company: bool,
}

impl Character {
    pub fn crew() -> Self {
        Self {
            player_company: true,
        }
    }

    pub fn stranger() -> Self {
        Self {
            player_company: false,
        }
    }
}
