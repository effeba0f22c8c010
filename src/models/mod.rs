//! Data structures for the team divider: teams, reveal cursor, tournament state.

mod cursor;
mod team;
mod tournament;

pub use cursor::RevealCursor;
pub use team::Team;
pub use tournament::{
    RosterInput, Tournament, TournamentConfig, TournamentError, TournamentId,
    DEFAULT_REVEAL_DELAY_SECS, DEFAULT_TEAM_COUNT, DEFAULT_TITLE, MAX_REVEAL_DELAY_SECS,
};
