use serde::{Deserialize, Serialize};

use crate::core::Direction;

/// Order in which messages are updated and refreshed within one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Every edge stages both directions from current messages,
    /// then every edge refreshes both directions
    #[default]
    Synchronous,

    /// Every edge stages and refreshes node1 -> node2 messages first,
    /// then node2 -> node1 messages are staged from the refreshed ones
    Directional,
}

impl Schedule {
    /// Returns the phases of one iteration. A phase is an update of the
    /// given direction (both if None) over all edges followed by a refresh
    #[inline]
    pub fn phases(&self) -> &'static [Option<Direction>] {
        match self {
            Schedule::Synchronous => &[None],
            Schedule::Directional => &[
                Some(Direction::Node1ToNode2),
                Some(Direction::Node2ToNode1),
            ],
        }
    }
}
