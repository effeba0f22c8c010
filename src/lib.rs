//! Pickleball team divider: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    advance_reveal, assign_teams, begin_export, begin_name_request, build_roster_svg,
    complete_name_request, escape_markup, export_roster, finish_export, generate_teams,
    is_terminal, next_cursor, parse_roster, rasterize_png, reveal_pending, visible_count,
    visible_roster, NameGenerationError, NameTicket, RevealTimer, RosterCard, RosterImage,
    RosterLayout, RosterSheet, TeamNameGenerator, WordListNameGenerator, EXPORT_FILENAME, SCALE,
};
pub use models::{
    RevealCursor, RosterInput, Team, Tournament, TournamentConfig, TournamentError,
    TournamentId, DEFAULT_REVEAL_DELAY_SECS, DEFAULT_TEAM_COUNT, DEFAULT_TITLE,
    MAX_REVEAL_DELAY_SECS,
};
