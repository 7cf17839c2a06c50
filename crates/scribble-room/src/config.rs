//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a room's game loop.
///
/// The defaults are the classic rules: 80 second rounds, ten rounds per
/// cycle, 100 points per correct guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Drawing time per round, in whole seconds.
    pub round_secs: u32,

    /// Pause between the end of a round and the next one starting.
    pub restart_delay: Duration,

    /// Rounds per cycle. After the last one, results are published and
    /// scores reset.
    pub max_rounds: u32,

    /// Points for a correct guess. The drawer earns nothing.
    pub guess_points: u32,

    /// How many candidate words the drawer picks from.
    pub word_choices: usize,

    /// Players needed to start or continue a round.
    pub min_players: usize,

    /// How often the round clock refreshes the countdown.
    pub tick_interval: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            round_secs: 80,
            restart_delay: Duration::from_secs(5),
            max_rounds: 10,
            guess_points: 100,
            word_choices: 3,
            min_players: 2,
            tick_interval: Duration::from_secs(1),
        }
    }
}
