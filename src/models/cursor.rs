//! Reveal cursor: the most recently revealed (team, player) slot.

use serde::{Deserialize, Serialize};

/// Position of the incremental reveal in row-major order.
///
/// `player == None` means the team card is visible but none of its members yet.
/// The derived ordering is row-major: `(t, None) < (t, Some(0)) < (t + 1, None)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RevealCursor {
    pub team: usize,
    pub player: Option<usize>,
}

impl RevealCursor {
    /// First position after a fresh generation: team 0 visible, no players.
    pub fn start() -> Self {
        Self {
            team: 0,
            player: None,
        }
    }

    /// How many members of the cursor's own team are revealed.
    pub fn revealed_in_team(&self) -> usize {
        self.player.map_or(0, |p| p + 1)
    }
}
